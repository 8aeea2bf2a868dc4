//! # Schoolbot DB
//!
//! Persistence for the school bot.
//!
//! Each collection (users, students, teachers) lives in its own JSON document
//! with a single top-level list key. Documents are read fully at startup and
//! rewritten fully whenever a transaction touches that collection.
//!
//! All mutation goes through [`Repository::transaction`], which serializes
//! writers behind one async mutex and applies the closure to a working copy:
//! either every change is persisted and committed, or nothing changes.
//!
//! # Example
//!
//! ```ignore
//! use schoolbot_db::Repository;
//!
//! let repo = Repository::open(&StorageConfig::from_env()).await?;
//! let student = repo
//!     .transaction(|tx| {
//!         let id = tx.generate_student_id();
//!         tx.insert_student(Student::new(id, "Ava", "Grade 5"))
//!     })
//!     .await?;
//! ```

pub mod import;
pub mod repository;
pub mod store;

pub use import::{ImportRejection, ImportReport, apply_import};
pub use repository::{Collections, Repository, Tx};
pub use store::{JsonStore, StoreError};
