use super::types::{BatteryStatus, DerivedCurrentValues, InverterTemperatures, StringPower};
use crate::battery::BatteryCapacityCalculator;
use crate::config::{BatteryConfig, Config, PowerFlowStringsConfig};
use crate::telemetry::{DeviceDescriptor, RawTelemetrySnapshot, variables};

/// Minimum SOC assumed when neither the configuration nor the device knows it
const DEFAULT_MIN_SOC: f64 = 0.1;

/// ResidualEnergy is reported in units of 10 Wh
const RESIDUAL_ENERGY_WH_PER_UNIT: f64 = 10.0;

/// Reads variables from a snapshot, remembering which required ones were missing
struct VariableReader<'a> {
    snapshot: &'a RawTelemetrySnapshot,
    missing: Vec<String>,
}

impl<'a> VariableReader<'a> {
    fn new(snapshot: &'a RawTelemetrySnapshot) -> Self {
        Self {
            snapshot,
            missing: Vec::new(),
        }
    }

    fn required(&mut self, variable: &str) -> f64 {
        self.snapshot.number(variable).unwrap_or_else(|| {
            self.missing.push(variable.to_string());
            0.0
        })
    }

    fn optional(&self, variable: &str) -> Option<f64> {
        self.snapshot.number(variable)
    }
}

impl DerivedCurrentValues {
    /// Derive display values from a snapshot. Pure: the same inputs always
    /// produce the same output.
    pub fn derive(
        snapshot: &RawTelemetrySnapshot,
        device: &DeviceDescriptor,
        config: &Config,
    ) -> Self {
        let flow = &config.power_flow;
        let mut reader = VariableReader::new(snapshot);

        let pv_power = reader.required(variables::PV_POWER);
        let feedin_power = reader.required(variables::FEEDIN_POWER);
        let grid_consumption_power = reader.required(variables::GRID_CONSUMPTION_POWER);
        let loads_power = reader.required(variables::LOADS_POWER);
        let generation_power = reader.required(variables::GENERATION_POWER);
        let meter_power_2 = reader.required(variables::METER_POWER_2);

        let grid_flow = feedin_power - grid_consumption_power;

        let ct2 = if flow.should_invert_ct2 {
            -meter_power_2
        } else {
            meter_power_2
        };

        let solar_power = if device.has_pv {
            pv_power
                + if flow.should_combine_ct2_with_pv_power {
                    ct2
                } else {
                    0.0
                }
        } else {
            ct2
        };

        let mut home_consumption = grid_consumption_power + generation_power - feedin_power
            + if flow.should_combine_ct2_with_loads_power {
                ct2.abs()
            } else {
                0.0
            };
        if !flow.allow_negative_load {
            home_consumption = home_consumption.abs();
        }

        let inverter_temperatures = match (
            reader.optional(variables::AMBIENT_TEMPERATURE),
            reader.optional(variables::INVERTER_TEMPERATURE),
        ) {
            (Some(ambient), Some(inverter)) => Some(InverterTemperatures { ambient, inverter }),
            _ => None,
        };

        let solar_string_powers = string_powers(snapshot, device, &flow.strings);
        let battery = battery_status(&mut reader, device, &config.battery);

        Self {
            grid_flow,
            home_consumption,
            solar_power,
            solar_string_powers,
            ct2,
            loads_power,
            inverter_temperatures,
            battery,
            last_update: snapshot.timestamp().ok(),
            missing_variables: reader.missing,
        }
    }
}

fn string_powers(
    snapshot: &RawTelemetrySnapshot,
    device: &DeviceDescriptor,
    strings: &PowerFlowStringsConfig,
) -> Vec<StringPower> {
    if !device.has_pv || !strings.enabled {
        return Vec::new();
    }
    strings
        .strings
        .iter()
        .filter(|s| s.enabled)
        .map(|s| StringPower {
            name: s.name.clone(),
            power: snapshot.number_or_zero(&s.variable),
        })
        .collect()
}

fn battery_status(
    reader: &mut VariableReader<'_>,
    device: &DeviceDescriptor,
    config: &BatteryConfig,
) -> Option<BatteryStatus> {
    if !device.has_battery {
        return None;
    }

    let charge_power =
        reader.required(variables::BAT_CHARGE_POWER) - reader.required(variables::BAT_DISCHARGE_POWER);
    let state_of_charge = reader.required(variables::STATE_OF_CHARGE) / 100.0;
    let temperature = reader.optional(variables::BAT_TEMPERATURE);
    let residual_energy_wh = reader
        .optional(variables::RESIDUAL_ENERGY)
        .map(|r| r * RESIDUAL_ENERGY_WH_PER_UNIT);

    let min_soc = resolve_min_soc(device, config);
    let capacity_wh = resolve_capacity_wh(device, config, residual_energy_wh, state_of_charge);
    let include_unusable = config.include_unusable_capacity;

    let calculator = BatteryCapacityCalculator::new(capacity_wh.unwrap_or(0), min_soc);
    let effective_state_of_charge =
        calculator.effective_state_of_charge(state_of_charge, include_unusable);
    let sized = capacity_wh.map(|_| calculator);

    Some(BatteryStatus {
        charge_power,
        state_of_charge,
        effective_state_of_charge,
        charge_amount_wh: sized
            .map(|c| c.current_estimated_charge_amount(state_of_charge, include_unusable)),
        temperature,
        residual_energy_wh,
        estimate: sized.and_then(|c| c.battery_percentage_remaining(charge_power, state_of_charge)),
    })
}

/// Minimum SOC: configuration override, device descriptor, then the default
fn resolve_min_soc(device: &DeviceDescriptor, config: &BatteryConfig) -> f64 {
    config
        .min_soc
        .or_else(|| device.battery.map(|b| b.min_soc))
        .unwrap_or(DEFAULT_MIN_SOC)
}

/// Capacity precedence: configuration override, device descriptor, then
/// an estimate from the residual energy reading.
fn resolve_capacity_wh(
    device: &DeviceDescriptor,
    config: &BatteryConfig,
    residual_energy_wh: Option<f64>,
    state_of_charge: f64,
) -> Option<u32> {
    config
        .capacity_wh
        .or_else(|| device.battery.map(|b| b.capacity_wh))
        .or_else(|| {
            residual_energy_wh.and_then(|residual| {
                BatteryCapacityCalculator::capacity_from_residual(residual, state_of_charge)
            })
        })
}
