use crate::battery::BatteryCapacityEstimate;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Display-ready values derived from one telemetry snapshot.
///
/// Power values are kW. `grid_flow` is positive when exporting and
/// negative when importing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DerivedCurrentValues {
    pub grid_flow: f64,
    pub home_consumption: f64,
    pub solar_power: f64,
    /// Enabled PV strings in configured order
    pub solar_string_powers: Vec<StringPower>,
    /// CT2 reading after optional inversion
    pub ct2: f64,
    /// Loads power as reported by the inverter, unadjusted
    pub loads_power: f64,
    pub inverter_temperatures: Option<InverterTemperatures>,
    pub battery: Option<BatteryStatus>,
    /// `None` when the vendor time string could not be parsed
    pub last_update: Option<DateTime<FixedOffset>>,
    /// Variables that were absent or non-numeric and counted as zero
    pub missing_variables: Vec<String>,
}

/// Power of a single PV string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringPower {
    pub name: String,
    pub power: f64,
}

/// Inverter temperatures in °C
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InverterTemperatures {
    pub ambient: f64,
    pub inverter: f64,
}

/// Battery view of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// kW; positive while charging
    pub charge_power: f64,
    /// Raw state of charge as a fraction
    pub state_of_charge: f64,
    /// State of charge for display, honoring `include_unusable_capacity`
    pub effective_state_of_charge: f64,
    /// Stored charge in Wh, when the capacity is known
    pub charge_amount_wh: Option<f64>,
    pub temperature: Option<f64>,
    pub residual_energy_wh: Option<f64>,
    pub estimate: Option<BatteryCapacityEstimate>,
}
