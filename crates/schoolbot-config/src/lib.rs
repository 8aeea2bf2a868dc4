//! # Schoolbot Config
//!
//! Configuration types for the school bot, loaded from environment variables:
//!
//! - [`bot`]: Bot token, admin secret code, bind address
//! - [`storage`]: Location of the JSON document stores
//! - [`observability`]: Log level and optional file logging
//!
//! # Example
//!
//! ```ignore
//! use schoolbot_config::{BotConfig, StorageConfig};
//!
//! let bot_config = BotConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod bot;
pub mod observability;
pub mod storage;

pub use bot::BotConfig;
pub use observability::ObservabilityConfig;
pub use storage::StorageConfig;
