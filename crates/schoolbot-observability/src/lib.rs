//! Schoolbot Observability
//!
//! Logging setup for the bot and its CLI:
//! - [`init_basic_console_logging`]: compact console output only
//! - [`init_tracing`]: console output plus, when enabled, a daily rolling
//!   error log and a JSON log (ingestable by Loki) under the log directory
//!
//! # Examples
//!
//! ```no_run
//! use schoolbot_config::ObservabilityConfig;
//! use schoolbot_observability::init_tracing;
//!
//! init_tracing(&ObservabilityConfig::from_env());
//! tracing::info!("ready");
//! ```

mod basic_logging;
mod logging;

pub use basic_logging::init_basic_console_logging;
pub use logging::init_tracing;
