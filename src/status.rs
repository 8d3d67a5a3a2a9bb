//! Current status derivation
//!
//! [`CurrentStatusCalculator`] owns the latest telemetry snapshot and
//! publishes [`DerivedCurrentValues`] through a `watch` channel. Every
//! recomputation sends a fresh `Arc`; subscribers see the latest value as
//! soon as they subscribe. Recomputation happens on construction, on every
//! new snapshot and on every configuration change; [`CurrentStatusCalculator::run`]
//! and [`CurrentStatusCalculator::run_polling`] drive both from one task.

use crate::config::Config;
use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::source::TelemetrySource;
use crate::telemetry::{DeviceDescriptor, RawTelemetrySnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;

mod derive;
mod types;

pub use types::{BatteryStatus, DerivedCurrentValues, InverterTemperatures, StringPower};

/// Single producer of derived values for one device
pub struct CurrentStatusCalculator {
    snapshot: RawTelemetrySnapshot,
    device: DeviceDescriptor,
    config_rx: watch::Receiver<Arc<Config>>,
    values_tx: watch::Sender<Arc<DerivedCurrentValues>>,
    logger: StructuredLogger,
}

impl CurrentStatusCalculator {
    /// Create a calculator and publish the first derived values immediately
    pub fn new(
        snapshot: RawTelemetrySnapshot,
        device: DeviceDescriptor,
        mut config_rx: watch::Receiver<Arc<Config>>,
    ) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("status").with_device_sn(device.device_sn.clone()),
        );
        let config = config_rx.borrow_and_update().clone();
        let initial = derive_logged(&logger, &snapshot, &device, &config);
        let (values_tx, _) = watch::channel(initial);

        Self {
            snapshot,
            device,
            config_rx,
            values_tx,
            logger,
        }
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn snapshot(&self) -> &RawTelemetrySnapshot {
        &self.snapshot
    }

    /// Latest published values
    pub fn latest(&self) -> Arc<DerivedCurrentValues> {
        self.values_tx.borrow().clone()
    }

    /// Subscribe to derived values; the receiver starts at the latest value
    pub fn subscribe(&self) -> watch::Receiver<Arc<DerivedCurrentValues>> {
        self.values_tx.subscribe()
    }

    /// Stream of derived values, yielding the latest one first
    pub fn subscribe_stream(&self) -> WatchStream<Arc<DerivedCurrentValues>> {
        WatchStream::new(self.subscribe())
    }

    /// Recompute from the current snapshot and configuration, then publish
    pub fn recompute(&mut self) -> Arc<DerivedCurrentValues> {
        let config = self.config_rx.borrow_and_update().clone();
        let values = derive_logged(&self.logger, &self.snapshot, &self.device, &config);
        self.values_tx.send_replace(values.clone());
        values
    }

    /// Replace the snapshot (one network poll) and recompute
    pub fn update_snapshot(&mut self, snapshot: RawTelemetrySnapshot) -> Arc<DerivedCurrentValues> {
        self.snapshot = snapshot;
        self.recompute()
    }

    /// Fetch one snapshot from `source` and recompute.
    ///
    /// On error the previously published values stay in place.
    pub async fn poll_once(
        &mut self,
        source: &dyn TelemetrySource,
    ) -> Result<Arc<DerivedCurrentValues>> {
        let fetched = source.fetch_real_time(&self.device.device_sn).await;
        match fetched {
            Ok(snapshot) => Ok(self.update_snapshot(snapshot)),
            Err(e) => {
                self.logger
                    .warn(&format!("Failed to fetch real-time data: {}", e));
                Err(e)
            }
        }
    }

    /// Recompute on every configuration change and on every snapshot
    /// received from `snapshots`. Returns once the snapshot channel closes.
    pub async fn run(&mut self, mut snapshots: mpsc::Receiver<RawTelemetrySnapshot>) {
        let mut config_open = true;
        loop {
            tokio::select! {
                changed = self.config_rx.changed(), if config_open => {
                    if changed.is_ok() {
                        self.logger.debug("Configuration changed; recomputing");
                        self.recompute();
                    } else {
                        self.logger.debug("Configuration stream closed");
                        config_open = false;
                    }
                }
                snapshot = snapshots.recv() => {
                    match snapshot {
                        Some(snapshot) => {
                            self.update_snapshot(snapshot);
                        }
                        None => break,
                    }
                }
            }
        }
        self.logger.info("Snapshot stream closed; stopping");
    }

    /// Poll `source` every `interval` and recompute on configuration
    /// changes. Returns once the configuration sender is dropped.
    pub async fn run_polling(&mut self, source: &dyn TelemetrySource, interval: Duration) {
        let mut poll_interval = tokio::time::interval(interval);
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    // Failures keep the previous values and are logged by poll_once
                    let _ = self.poll_once(source).await;
                }
                changed = self.config_rx.changed() => {
                    if changed.is_err() {
                        self.logger.info("Configuration stream closed; stopping");
                        break;
                    }
                    self.logger.debug("Configuration changed; recomputing");
                    self.recompute();
                }
            }
        }
    }
}

fn derive_logged(
    logger: &StructuredLogger,
    snapshot: &RawTelemetrySnapshot,
    device: &DeviceDescriptor,
    config: &Config,
) -> Arc<DerivedCurrentValues> {
    let values = DerivedCurrentValues::derive(snapshot, device, config);
    logger.trace(&format!(
        "Derived solar={:.3} kW home={:.3} kW grid={:.3} kW",
        values.solar_power, values.home_consumption, values.grid_flow
    ));
    if !values.missing_variables.is_empty() {
        logger.debug(&format!(
            "Missing telemetry counted as zero: {}",
            values.missing_variables.join(", ")
        ));
    }
    if values.last_update.is_none() && !snapshot.time.is_empty() {
        logger.warn(&format!("Unparseable telemetry time: {:?}", snapshot.time));
    }
    Arc::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;

    fn device() -> DeviceDescriptor {
        DeviceDescriptor {
            device_sn: "SN1".to_string(),
            has_pv: true,
            ..Default::default()
        }
    }

    fn snapshot() -> RawTelemetrySnapshot {
        RawTelemetrySnapshot::new("SN1", "2024-03-01 12:00:00 CET+0100")
            .with_number("pvPower", 2.0)
            .with_number("meterPower2", 0.5)
    }

    #[tokio::test]
    async fn new_publishes_initial_values() {
        let store = ConfigStore::new(Config::default()).unwrap();
        let calc = CurrentStatusCalculator::new(snapshot(), device(), store.subscribe());
        let rx = calc.subscribe();
        assert!((rx.borrow().solar_power - 2.5).abs() < 1e-12);
        assert!(calc.latest().last_update.is_some());
    }

    #[tokio::test]
    async fn update_snapshot_replaces_value() {
        let store = ConfigStore::new(Config::default()).unwrap();
        let mut calc = CurrentStatusCalculator::new(snapshot(), device(), store.subscribe());
        let before = calc.latest();
        let after = calc.update_snapshot(snapshot().with_number("feedinPower", 1.0));
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.grid_flow, 0.0);
        assert_eq!(after.grid_flow, 1.0);
    }
}
