//! # Tank-Bench Telemetry
//!
//! Structured logging for the benchmark binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tb_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // tracing macros now reach stderr
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `TB_JSON_LOGS` | `false` (`true` in containers) | JSON formatted output |
//! | `TB_SERVICE_NAME` | `tank-bench` | Service name in the startup line |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_telemetry;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}
