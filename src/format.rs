//! Display formatting for power, energy and percentages
//!
//! OpenAPI power values are kW and energy values kWh; these helpers render
//! them for presentation code. Rounding is "scale by 10^n, round to the
//! nearest integer, scale back".

use crate::config::DisplayConfig;
use crate::status::DerivedCurrentValues;
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Upper bound on decimals accepted by [`PowerFormat`]
pub const MAX_DECIMAL_PLACES: u8 = 9;

/// Unit used when rendering power and energy values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    /// Always kW / kWh
    #[default]
    Kilowatts,
    /// Always W / Wh
    Watts,
    /// W / Wh below one kilo-unit, kW / kWh above
    Adaptive,
}

/// Formatting helpers for kW / kWh / fraction values
pub trait PowerFormat {
    /// Round to `decimals` places
    fn rounded(self, decimals: u8) -> f64;
    /// kW value as `"2.50 kW"`
    fn kw(self, decimals: u8) -> String;
    /// kWh value as `"12.3 kWh"`
    fn kwh(self, decimals: u8) -> String;
    /// kW value as whole watts, `"2500 W"`
    fn w(self) -> String;
    /// kWh value as whole watt-hours, `"1200 Wh"`
    fn wh(self) -> String;
    /// Fraction as whole percent, `"45%"`
    fn as_percent(self) -> String;
}

impl PowerFormat for f64 {
    fn rounded(self, decimals: u8) -> f64 {
        let decimals = decimals.min(MAX_DECIMAL_PLACES);
        let factor = 10f64.powi(i32::from(decimals));
        let value = (self * factor).round() / factor;
        // -0.0 renders as "-0.00"
        if value == 0.0 { 0.0 } else { value }
    }

    fn kw(self, decimals: u8) -> String {
        let decimals = decimals.min(MAX_DECIMAL_PLACES);
        format!("{:.*} kW", usize::from(decimals), self.rounded(decimals))
    }

    fn kwh(self, decimals: u8) -> String {
        let decimals = decimals.min(MAX_DECIMAL_PLACES);
        format!("{:.*} kWh", usize::from(decimals), self.rounded(decimals))
    }

    fn w(self) -> String {
        format!("{} W", (self * 1000.0).round() as i64)
    }

    fn wh(self) -> String {
        format!("{} Wh", (self * 1000.0).round() as i64)
    }

    fn as_percent(self) -> String {
        format!("{}%", (self * 100.0).round() as i64)
    }
}

/// Render a kW value in the requested unit
pub fn format_power(value_kw: f64, unit: DisplayUnit, decimals: u8) -> String {
    match unit {
        DisplayUnit::Kilowatts => value_kw.kw(decimals),
        DisplayUnit::Watts => value_kw.w(),
        DisplayUnit::Adaptive if value_kw.abs() < 1.0 => value_kw.w(),
        DisplayUnit::Adaptive => value_kw.kw(decimals),
    }
}

/// Render a kWh value in the requested unit
pub fn format_energy(value_kwh: f64, unit: DisplayUnit, decimals: u8) -> String {
    match unit {
        DisplayUnit::Kilowatts => value_kwh.kwh(decimals),
        DisplayUnit::Watts => value_kwh.wh(),
        DisplayUnit::Adaptive if value_kwh.abs() < 1.0 => value_kwh.wh(),
        DisplayUnit::Adaptive => value_kwh.kwh(decimals),
    }
}

/// Render a vendor timestamp in the given timezone
pub fn format_last_update(timestamp: &DateTime<FixedOffset>, tz: Tz) -> String {
    timestamp
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

/// Human-readable summary of derived values, one line per quantity
pub fn summary_lines(values: &DerivedCurrentValues, display: &DisplayConfig) -> Vec<String> {
    let unit = display.unit;
    let decimals = display.decimal_places;
    let power = |v: f64| format_power(v, unit, decimals);

    let mut lines = vec![format!("Solar: {}", power(values.solar_power))];
    for string in &values.solar_string_powers {
        lines.push(format!("  {}: {}", string.name, power(string.power)));
    }
    lines.push(format!("Home: {}", power(values.home_consumption)));

    let grid = if values.grid_flow > 0.0 {
        format!("Grid: exporting {}", power(values.grid_flow))
    } else if values.grid_flow < 0.0 {
        format!("Grid: importing {}", power(values.grid_flow.abs()))
    } else {
        format!("Grid: {}", power(0.0))
    };
    lines.push(grid);

    if values.ct2 != 0.0 {
        lines.push(format!("CT2: {}", power(values.ct2)));
    }

    if let Some(battery) = &values.battery {
        let mut line = format!(
            "Battery: {}",
            battery.effective_state_of_charge.as_percent()
        );
        if let Some(amount_wh) = battery.charge_amount_wh {
            line.push_str(&format!(
                " ({})",
                format_energy(amount_wh / 1000.0, unit, decimals)
            ));
        }
        if battery.charge_power > 0.0 {
            line.push_str(&format!(", charging {}", power(battery.charge_power)));
        } else if battery.charge_power < 0.0 {
            line.push_str(&format!(
                ", discharging {}",
                power(battery.charge_power.abs())
            ));
        }
        if let Some(estimate) = &battery.estimate {
            line.push_str(&format!(", {}", estimate));
        }
        lines.push(line);
    }

    if let Some(temps) = &values.inverter_temperatures {
        lines.push(format!(
            "Inverter temperature: {:.1}°C (ambient {:.1}°C)",
            temps.inverter, temps.ambient
        ));
    }

    if let Some(last_update) = &values.last_update {
        let tz = display.timezone.parse::<Tz>().unwrap_or(Tz::UTC);
        lines.push(format!(
            "Last update: {}",
            format_last_update(last_update, tz)
        ));
    }

    lines
}
