//! # Schoolbot Core
//!
//! Core types, errors, and utilities shared by every schoolbot crate.
//!
//! - [`errors`]: Application error type with a kind taxonomy and HTTP conversion
//! - [`serde`]: Lenient serde helpers for hand-edited JSON documents
//!
//! # Example
//!
//! ```ignore
//! use schoolbot_core::errors::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//! assert!(error.is_user_facing());
//! ```

pub mod errors;
pub mod serde;

pub use errors::{AppError, ErrorKind};
