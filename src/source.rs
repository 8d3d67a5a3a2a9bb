//! Telemetry sources
//!
//! The OpenAPI HTTP client lives outside this crate; anything that can
//! produce a real-time snapshot implements [`TelemetrySource`].

use crate::error::{FoxflowError, Result};
use crate::logging::{LogContext, get_logger_with_context};
use crate::telemetry::{RawTelemetrySnapshot, parse_real_time_response};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

/// Producer of real-time snapshots
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_real_time(&self, device_sn: &str) -> Result<RawTelemetrySnapshot>;
}

/// Reads a saved real-time response from a file, or stdin for `-`
pub struct FileTelemetrySource {
    path: PathBuf,
    logger: crate::logging::StructuredLogger,
}

impl FileTelemetrySource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let logger = get_logger_with_context(
            LogContext::new("source").with_field("path", path.display().to_string()),
        );
        Self { path, logger }
    }

    async fn read_body(&self) -> Result<String> {
        if self.path.as_os_str() == "-" {
            let mut body = String::new();
            tokio::io::stdin().read_to_string(&mut body).await?;
            return Ok(body);
        }
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

#[async_trait::async_trait]
impl TelemetrySource for FileTelemetrySource {
    async fn fetch_real_time(&self, device_sn: &str) -> Result<RawTelemetrySnapshot> {
        let body = self.read_body().await?;
        let snapshot = parse_real_time_response(&body)?;

        if !device_sn.is_empty()
            && !snapshot.device_sn.is_empty()
            && !snapshot.device_sn.eq_ignore_ascii_case(device_sn)
        {
            let message = format!(
                "Snapshot belongs to {} but {} was requested",
                snapshot.device_sn, device_sn
            );
            self.logger.error(&message);
            return Err(FoxflowError::generic(message));
        }

        self.logger
            .debug(&format!("Read {} variables", snapshot.datas.len()));
        Ok(snapshot)
    }
}
