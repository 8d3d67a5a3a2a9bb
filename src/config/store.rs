//! Observable configuration holder
//!
//! Consumers subscribe to a `watch` receiver and see every accepted change.
//! Each change publishes a fresh `Arc<Config>`; published values are never
//! mutated in place.

use super::Config;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Application-scoped owner of the current configuration
#[derive(Debug)]
pub struct ConfigStore {
    tx: watch::Sender<Arc<Config>>,
}

impl ConfigStore {
    /// Validate and wrap an initial configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let (tx, _rx) = watch::channel(Arc::new(config));
        Ok(Self { tx })
    }

    /// Latest accepted configuration
    pub fn current(&self) -> Arc<Config> {
        self.tx.borrow().clone()
    }

    /// Subscribe to configuration changes; the receiver starts at the latest value
    pub fn subscribe(&self) -> watch::Receiver<Arc<Config>> {
        self.tx.subscribe()
    }

    /// Apply an edit to a copy of the current configuration.
    ///
    /// The edited copy is validated before it is published. Returns whether
    /// subscribers were notified (an edit that changes nothing is dropped).
    pub fn update<F>(&self, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Config),
    {
        let mut next = (*self.current()).clone();
        edit(&mut next);
        self.replace(next)
    }

    /// Replace the whole configuration
    pub fn replace(&self, config: Config) -> Result<bool> {
        config.validate()?;
        Ok(self.tx.send_if_modified(|current| {
            if **current == config {
                false
            } else {
                *current = Arc::new(config);
                true
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_notifies_subscribers() {
        let store = ConfigStore::new(Config::default()).unwrap();
        let mut rx = store.subscribe();

        let changed = store
            .update(|c| c.power_flow.should_invert_ct2 = true)
            .unwrap();
        assert!(changed);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().power_flow.should_invert_ct2);
    }

    #[test]
    fn noop_update_is_not_published() {
        let store = ConfigStore::new(Config::default()).unwrap();
        let rx = store.subscribe();
        let changed = store.update(|c| c.display.decimal_places = 2).unwrap();
        assert!(!changed);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn invalid_update_keeps_previous_value() {
        let store = ConfigStore::new(Config::default()).unwrap();
        let before = store.current();
        assert!(store.update(|c| c.battery.min_soc = Some(2.0)).is_err());
        assert!(Arc::ptr_eq(&before, &store.current()));
    }
}
