//! # Schoolbot
//!
//! A conversational bot that manages a school's people: administrators,
//! teachers, parents and students.
//!
//! ## Overview
//!
//! People talk to the bot through a chat transport. Each inbound event is
//! posted to the webhook surface, handled by the conversation engine under the
//! sender's session lock, and answered with the replies for the sender.
//! Messages for anyone else (admin approval prompts, approval results,
//! announcements) go through a [`notifications::Notifier`]; the default one
//! queues them in an outbox that the transport adapter drains.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── conversation/     # Sessions, scenes, menu actions, event router
//! │   └── scenes/      # Per-scene enter / text / button / document handlers
//! ├── modules/          # Feature modules
//! │   ├── users/       # Registration, capabilities, admin login and roles
//! │   ├── students/    # Student records, classes, parent links
//! │   ├── teachers/    # Teacher records
//! │   ├── approvals/   # Parent link, teacher claim and subject approvals
//! │   ├── grades/      # Grade entry and enrollment
//! │   ├── announcements/ # Broadcasts and teacher-to-parent messages
//! │   └── webhook/     # HTTP surface for the transport adapter
//! └── notifications/   # Outgoing messages, notifier trait, outbox
//! ```
//!
//! Workspace crates hold the pieces shared with the CLI: `schoolbot-models`
//! (records, ids, value types), `schoolbot-db` (JSON document stores and the
//! transactional repository), `schoolbot-config`, `schoolbot-core` (errors)
//! and `schoolbot-observability` (tracing setup).
//!
//! ## Roles
//!
//! | Role | How it is obtained |
//! |------|--------------------|
//! | Admin | `/admin` plus the shared code, or promotion by another admin |
//! | Teacher | Claiming a teacher id issued by an admin, after approval |
//! | Parent | Linking a student id, after approval |
//! | User | First contact |
//!
//! ## Environment Variables
//!
//! ```bash
//! BOT_TOKEN=...
//! ADMIN_CODE=change-me-admin-code
//! DATA_DIR=storage/data
//! BIND_ADDR=0.0.0.0:3000
//! LOG_LEVEL=info
//! FILE_LOGGING_ENABLED=false
//! LOG_DIR=storage/logs
//! ```

pub mod conversation;
pub mod logging;
pub mod modules;
pub mod notifications;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use schoolbot_config;
pub use schoolbot_core;
pub use schoolbot_db;
pub use schoolbot_models;
