//! FoxESS OpenAPI real-time telemetry
//!
//! The real-time query answers with a flat list of `{variable, unit, name,
//! value}` entries per inverter plus a vendor-formatted time string. Values
//! are mostly numbers (kW, °C, %) but a few variables carry text.

use crate::error::{FoxflowError, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// OpenAPI variable names used by the derivation layer
pub mod variables {
    pub const PV_POWER: &str = "pvPower";
    pub const FEEDIN_POWER: &str = "feedinPower";
    pub const GRID_CONSUMPTION_POWER: &str = "gridConsumptionPower";
    pub const LOADS_POWER: &str = "loadsPower";
    pub const GENERATION_POWER: &str = "generationPower";
    pub const METER_POWER_2: &str = "meterPower2";
    pub const INVERTER_TEMPERATURE: &str = "invTemperation";
    pub const AMBIENT_TEMPERATURE: &str = "ambientTemperation";
    pub const BAT_CHARGE_POWER: &str = "batChargePower";
    pub const BAT_DISCHARGE_POWER: &str = "batDischargePower";
    pub const STATE_OF_CHARGE: &str = "SoC";
    pub const BAT_TEMPERATURE: &str = "batTemperature";
    pub const RESIDUAL_ENERGY: &str = "ResidualEnergy";
}

/// A telemetry value: numeric for measurements, text for states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Number(f64),
    Text(String),
}

impl VariableValue {
    /// Numeric view; numeric-looking text is parsed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v).filter(|v| v.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// One entry of the `datas` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryVariable {
    pub variable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<VariableValue>,
}

/// Raw real-time snapshot for a single inverter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTelemetrySnapshot {
    #[serde(rename = "deviceSN", default)]
    pub device_sn: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub datas: Vec<TelemetryVariable>,
}

impl RawTelemetrySnapshot {
    pub fn new(device_sn: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            device_sn: device_sn.into(),
            time: time.into(),
            datas: Vec::new(),
        }
    }

    /// Append a numeric variable
    pub fn with_number(mut self, variable: &str, value: f64) -> Self {
        self.datas.push(TelemetryVariable {
            variable: variable.to_string(),
            unit: None,
            name: None,
            value: Some(VariableValue::Number(value)),
        });
        self
    }

    /// Case-insensitive variable lookup; the first match wins
    pub fn value(&self, variable: &str) -> Option<&VariableValue> {
        self.datas
            .iter()
            .find(|d| d.variable.eq_ignore_ascii_case(variable))
            .and_then(|d| d.value.as_ref())
    }

    pub fn number(&self, variable: &str) -> Option<f64> {
        self.value(variable).and_then(VariableValue::as_f64)
    }

    /// Numeric value, or 0.0 when absent or not numeric
    pub fn number_or_zero(&self, variable: &str) -> f64 {
        self.number(variable).unwrap_or(0.0)
    }

    /// Parse the vendor time string
    pub fn timestamp(&self) -> Result<DateTime<FixedOffset>> {
        parse_vendor_time(&self.time)
    }
}

/// Standard OpenAPI response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub errno: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, mapping a non-zero errno to an API error
    pub fn into_result(self) -> Result<T> {
        if self.errno != 0 {
            return Err(FoxflowError::api(
                self.errno,
                self.msg.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        self.result
            .ok_or_else(|| FoxflowError::parse("response has no result"))
    }
}

impl ApiEnvelope<Vec<RawTelemetrySnapshot>> {
    /// The real-time query answers with one entry per requested device
    pub fn first_snapshot(self) -> Result<RawTelemetrySnapshot> {
        self.into_result()?
            .into_iter()
            .next()
            .ok_or_else(|| FoxflowError::parse("response contains no devices"))
    }
}

/// Parse a real-time response body.
///
/// Accepts the full OpenAPI envelope (`{"errno":0,"result":[...]}`) or a
/// bare snapshot object.
pub fn parse_real_time_response(body: &str) -> Result<RawTelemetrySnapshot> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("errno").is_some() {
        let envelope: ApiEnvelope<Vec<RawTelemetrySnapshot>> = serde_json::from_value(value)?;
        envelope.first_snapshot()
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

/// Parse a vendor time string such as `2024-03-01 12:34:56 CET+0100`.
///
/// RFC 3339 is accepted as well. A zone without a numeric offset
/// (`GMT`, `UTC`, or nothing) is treated as UTC.
pub fn parse_vendor_time(time: &str) -> Result<DateTime<FixedOffset>> {
    let time = time.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Ok(dt);
    }

    let mut parts = time.split_whitespace();
    let (Some(date), Some(clock)) = (parts.next(), parts.next()) else {
        return Err(FoxflowError::parse(format!("Unrecognized time: {:?}", time)));
    };
    let naive = NaiveDateTime::parse_from_str(&format!("{} {}", date, clock), "%Y-%m-%d %H:%M:%S")?;
    let offset = match parts.next() {
        Some(zone) => parse_zone_offset(zone)
            .ok_or_else(|| FoxflowError::parse(format!("Unrecognized zone: {:?}", zone)))?,
        None => FixedOffset::east_opt(0).ok_or_else(|| FoxflowError::parse("offset"))?,
    };

    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| FoxflowError::parse(format!("Ambiguous time: {:?}", time)))
}

fn parse_zone_offset(zone: &str) -> Option<FixedOffset> {
    let Some(idx) = zone.rfind(|c: char| c == '+' || c == '-') else {
        return zone
            .chars()
            .all(|c| c.is_ascii_alphabetic())
            .then(|| FixedOffset::east_opt(0))
            .flatten();
    };
    let (_, signed) = zone.split_at(idx);
    let sign = if signed.starts_with('-') { -1 } else { 1 };
    let digits: String = signed.chars().skip(1).filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Static facts about an inverter, from the OpenAPI device list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceDescriptor {
    #[serde(rename = "deviceSN")]
    pub device_sn: String,
    #[serde(rename = "stationName", default)]
    pub station_name: Option<String>,
    #[serde(rename = "hasPV", default)]
    pub has_pv: bool,
    #[serde(rename = "hasBattery", default)]
    pub has_battery: bool,
    #[serde(default)]
    pub battery: Option<BatteryDescriptor>,
}

/// Battery facts known for a device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryDescriptor {
    /// Nameplate capacity in Wh
    pub capacity_wh: u32,
    /// Minimum state of charge as a fraction (0..1)
    pub min_soc: f64,
}
