//! Battery capacity arithmetic
//!
//! Converts a battery's charge power and state of charge into a
//! time-to-full / time-to-empty estimate and an absolute stored charge.
//! Capacity is in Wh, charge power in kW, state of charge a fraction.

use crate::telemetry::BatteryDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Charge power magnitudes below this are treated as idle
const CHARGE_POWER_EPSILON: f64 = 1e-9;

/// At or above this SOC a charging battery is considered full
const NEARLY_FULL_SOC: f64 = 0.9899;

/// Largest state of charge reported by [`BatteryCapacityCalculator::effective_state_of_charge`]
const MAX_EFFECTIVE_SOC: f64 = 0.99;

/// A discharging battery within 2% of its minimum SOC is considered empty
const MIN_SOC_TOLERANCE: f64 = 1.02;

/// Which end of the battery an estimate points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateDirection {
    /// Charging towards full
    ToFull,
    /// Discharging towards the minimum SOC
    ToEmpty,
}

/// Time until the battery is full or empty at the current charge power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryCapacityEstimate {
    pub direction: EstimateDirection,
    pub minutes: u32,
}

impl BatteryCapacityEstimate {
    fn from_minutes(direction: EstimateDirection, minutes: f64) -> Option<Self> {
        if !minutes.is_finite() {
            return None;
        }
        Some(Self {
            direction,
            minutes: minutes.max(0.0).round().min(f64::from(u32::MAX)) as u32,
        })
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

impl fmt::Display for BatteryCapacityEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.direction {
            EstimateDirection::ToFull => "Full in",
            EstimateDirection::ToEmpty => "Empty in",
        };

        let days = self.minutes / (24 * 60);
        let hours = (self.minutes % (24 * 60)) / 60;
        let minutes = self.minutes % 60;

        let mut parts = Vec::with_capacity(2);
        if days > 0 {
            parts.push(plural(days, "day"));
            if hours > 0 {
                parts.push(plural(hours, "hour"));
            }
        } else {
            if hours > 0 {
                parts.push(plural(hours, "hour"));
            }
            if minutes > 0 {
                parts.push(plural(minutes, "minute"));
            }
        }

        if parts.is_empty() {
            write!(f, "{} under a minute", prefix)
        } else {
            write!(f, "{} {}", prefix, parts.join(" "))
        }
    }
}

/// Pure capacity calculator for one battery
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryCapacityCalculator {
    capacity_wh: u32,
    min_soc: f64,
}

impl BatteryCapacityCalculator {
    /// `capacity_wh` is the nameplate capacity, `min_soc` a fraction (0..1)
    pub fn new(capacity_wh: u32, min_soc: f64) -> Self {
        Self {
            capacity_wh,
            min_soc,
        }
    }

    pub fn from_descriptor(descriptor: &BatteryDescriptor) -> Self {
        Self::new(descriptor.capacity_wh, descriptor.min_soc)
    }

    pub fn capacity_wh(&self) -> u32 {
        self.capacity_wh
    }

    pub fn min_soc(&self) -> f64 {
        self.min_soc
    }

    /// Estimate minutes until full (charging) or until the minimum SOC
    /// (discharging). Positive `charge_power_kw` means charging.
    pub fn battery_percentage_remaining(
        &self,
        charge_power_kw: f64,
        state_of_charge: f64,
    ) -> Option<BatteryCapacityEstimate> {
        if !charge_power_kw.is_finite() || charge_power_kw.abs() < CHARGE_POWER_EPSILON {
            return None;
        }

        let capacity = f64::from(self.capacity_wh);
        let charge_power_w = charge_power_kw * 1000.0;

        if charge_power_kw > 0.0 {
            if state_of_charge >= NEARLY_FULL_SOC {
                return None;
            }
            let minutes = (capacity - capacity * state_of_charge) / charge_power_w * 60.0;
            BatteryCapacityEstimate::from_minutes(EstimateDirection::ToFull, minutes)
        } else {
            if state_of_charge <= self.min_soc * MIN_SOC_TOLERANCE {
                return None;
            }
            let minutes =
                (capacity * state_of_charge - capacity * self.min_soc) / charge_power_w.abs() * 60.0;
            BatteryCapacityEstimate::from_minutes(EstimateDirection::ToEmpty, minutes)
        }
    }

    /// Stored charge in Wh, optionally excluding the reserve below the minimum SOC
    pub fn current_estimated_charge_amount(
        &self,
        state_of_charge: f64,
        include_unusable_capacity: bool,
    ) -> f64 {
        let capacity = f64::from(self.capacity_wh);
        let amount = capacity * state_of_charge;
        if include_unusable_capacity {
            amount
        } else {
            (amount - capacity * self.min_soc).max(0.0)
        }
    }

    /// State of charge for display.
    ///
    /// Without unusable capacity the SOC is rescaled to the usable range
    /// (`min_soc` maps to 0, full maps to 1). The result never exceeds 0.99.
    pub fn effective_state_of_charge(
        &self,
        state_of_charge: f64,
        include_unusable_capacity: bool,
    ) -> f64 {
        let soc = if include_unusable_capacity {
            state_of_charge
        } else {
            let usable = 1.0 - self.min_soc;
            if usable <= 0.0 {
                return 0.0;
            }
            ((state_of_charge - self.min_soc) / usable).max(0.0)
        };

        if soc >= NEARLY_FULL_SOC {
            MAX_EFFECTIVE_SOC
        } else {
            soc.max(0.0)
        }
    }

    /// Estimate nameplate capacity from the inverter's residual energy.
    ///
    /// Returns `None` when the state of charge is zero or the inputs are not finite.
    pub fn capacity_from_residual(residual_energy_wh: f64, state_of_charge: f64) -> Option<u32> {
        if state_of_charge <= 0.0 || !state_of_charge.is_finite() || !residual_energy_wh.is_finite()
        {
            return None;
        }
        let capacity = (residual_energy_wh / state_of_charge).round();
        (capacity > 0.0 && capacity <= f64::from(u32::MAX)).then_some(capacity as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> BatteryCapacityCalculator {
        BatteryCapacityCalculator::new(10_000, 0.2)
    }

    #[test]
    fn minutes_to_full() {
        let estimate = calculator().battery_percentage_remaining(1.0, 0.5).unwrap();
        assert_eq!(estimate.direction, EstimateDirection::ToFull);
        assert_eq!(estimate.minutes, 300);
    }

    #[test]
    fn minutes_to_empty() {
        // (5000 - 2000) Wh at 2 kW
        let estimate = calculator().battery_percentage_remaining(-2.0, 0.5).unwrap();
        assert_eq!(estimate.direction, EstimateDirection::ToEmpty);
        assert_eq!(estimate.minutes, 90);
    }

    #[test]
    fn idle_battery_has_no_estimate() {
        assert!(calculator().battery_percentage_remaining(0.0, 0.5).is_none());
        assert!(calculator().battery_percentage_remaining(1e-12, 0.5).is_none());
        assert!(calculator().battery_percentage_remaining(-1e-12, 0.5).is_none());
    }

    #[test]
    fn full_battery_has_no_charge_estimate() {
        assert!(calculator().battery_percentage_remaining(1.0, 0.9899).is_none());
        assert!(calculator().battery_percentage_remaining(1.0, 1.0).is_none());
        assert!(calculator().battery_percentage_remaining(1.0, 0.98).is_some());
    }

    #[test]
    fn empty_battery_has_no_discharge_estimate() {
        assert!(calculator().battery_percentage_remaining(-1.0, 0.2).is_none());
        assert!(calculator().battery_percentage_remaining(-1.0, 0.203).is_none());
        assert!(calculator().battery_percentage_remaining(-1.0, 0.21).is_some());
    }

    #[test]
    fn charge_amount() {
        let c = calculator();
        assert_eq!(c.current_estimated_charge_amount(1.0, true), 10_000.0);
        assert!((c.current_estimated_charge_amount(0.5, false) - 3_000.0).abs() < 1e-6);
        assert_eq!(c.current_estimated_charge_amount(0.1, false), 0.0);
    }

    #[test]
    fn effective_soc() {
        let c = calculator();
        assert!((c.effective_state_of_charge(0.6, true) - 0.6).abs() < 1e-12);
        assert!((c.effective_state_of_charge(0.6, false) - 0.5).abs() < 1e-12);
        assert_eq!(c.effective_state_of_charge(0.1, false), 0.0);
        assert_eq!(c.effective_state_of_charge(1.0, true), 0.99);
        assert_eq!(c.effective_state_of_charge(1.0, false), 0.99);
    }

    #[test]
    fn capacity_from_residual_energy() {
        assert_eq!(
            BatteryCapacityCalculator::capacity_from_residual(5_180.0, 0.5),
            Some(10_360)
        );
        assert_eq!(BatteryCapacityCalculator::capacity_from_residual(100.0, 0.0), None);
    }

    #[test]
    fn display_estimate() {
        let e = |direction, minutes| BatteryCapacityEstimate { direction, minutes };
        assert_eq!(e(EstimateDirection::ToFull, 300).to_string(), "Full in 5 hours");
        assert_eq!(
            e(EstimateDirection::ToEmpty, 135).to_string(),
            "Empty in 2 hours 15 minutes"
        );
        assert_eq!(e(EstimateDirection::ToFull, 1).to_string(), "Full in 1 minute");
        assert_eq!(
            e(EstimateDirection::ToEmpty, 3 * 24 * 60 + 61).to_string(),
            "Empty in 3 days 1 hour"
        );
        assert_eq!(
            e(EstimateDirection::ToFull, 0).to_string(),
            "Full in under a minute"
        );
    }
}
