//! # Shardline Telemetry
//!
//! Structured logging and Prometheus metrics for the execution core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shardline_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_subsystem("04", "scheduler");
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SL_JSON_LOGS` | `false` | JSON formatted logs |
//! | `SL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SL_SERVICE_NAME` | `shardline` | Service name in log records |
//! | `SL_SUBSYSTEM_ID` | `00` | Subsystem identifier |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{gather_text, register_metrics, HistogramTimer};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed, or the filter is invalid.
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)?;
    tracing::info!(
        service = %config.full_service_name(),
        "[telemetry] initialized"
    );
    Ok(())
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
