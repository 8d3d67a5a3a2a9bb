//! # Foxflow - FoxESS current status and battery derivation
//!
//! Turns raw FoxESS OpenAPI real-time telemetry into display-ready values:
//! grid flow, home consumption, solar power (with CT2 clamp handling),
//! per-string PV power, inverter temperatures and battery time-to-full /
//! time-to-empty estimates.
//!
//! ## Architecture
//!
//! - `telemetry`: OpenAPI response types, case-insensitive variable lookup, vendor time parsing
//! - `battery`: Battery capacity arithmetic
//! - `status`: Derivation of current values and their publication through a watch channel
//! - `format`: kW / kWh / W / Wh / percent rendering
//! - `source`: Trait seam for whatever fetches snapshots
//! - `config`: YAML configuration and the observable configuration store
//! - `logging`: Structured logging and tracing
//! - `error`: Error types

pub mod battery;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod source;
pub mod status;
pub mod telemetry;

// Re-export commonly used types
pub use battery::{BatteryCapacityCalculator, BatteryCapacityEstimate, EstimateDirection};
pub use config::{Config, ConfigStore};
pub use error::{FoxflowError, Result};
pub use format::{DisplayUnit, PowerFormat};
pub use source::TelemetrySource;
pub use status::{CurrentStatusCalculator, DerivedCurrentValues};
pub use telemetry::{DeviceDescriptor, RawTelemetrySnapshot};
