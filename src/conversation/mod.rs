//! The conversation engine: sessions, scenes and event dispatch.

pub mod actions;
pub mod callback;
pub mod event;
pub mod format;
pub mod menu;
pub mod router;
pub mod scene;
pub mod scenes;
pub mod session;

pub use event::{EventKind, InboundEvent};
pub use router::Conversation;
