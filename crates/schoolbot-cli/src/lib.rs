//! # Schoolbot CLI
//!
//! Administrative and seeding utilities that operate directly on the bot's
//! data directory.
//!
//! ## Usage
//!
//! ```ignore
//! use schoolbot_cli::seeder::{SeedConfig, seed_students};
//!
//! let report = seed_students(&repo, SeedConfig::new(vec!["Grade 5".into()], 25)).await?;
//! ```

pub mod admin;
pub mod seeder;
