//! User records and roles.

use crate::ids::{StudentId, UserIdentity};
use crate::value_types::Subject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role of a person talking to the bot.
///
/// Roles are only changed by workflow transitions (admin login, elevation,
/// approvals, unbinding), never edited directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Parent,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Parent => "parent",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person known to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub identity: UserIdentity,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub student_ids: BTreeSet<StudentId>,
    #[serde(default)]
    pub pending_student_ids: BTreeSet<StudentId>,
    #[serde(default)]
    pub subjects: BTreeSet<Subject>,
}

impl User {
    pub fn new(identity: UserIdentity, name: impl Into<String>) -> Self {
        Self {
            identity,
            role: Role::User,
            name: name.into(),
            student_ids: BTreeSet::new(),
            pending_student_ids: BTreeSet::new(),
            subjects: BTreeSet::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Linked or pending children.
    pub fn has_any_students(&self) -> bool {
        !self.student_ids.is_empty() || !self.pending_student_ids.is_empty()
    }

    /// Role a user falls back to when an elevated role is taken away.
    pub fn derived_role(&self, linked_to_teacher: bool) -> Role {
        if linked_to_teacher {
            Role::Teacher
        } else if self.has_any_students() {
            Role::Parent
        } else {
            Role::User
        }
    }

    /// Display name, falling back to the identity when none was captured.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("user {}", self.identity)
        } else {
            self.name.clone()
        }
    }
}
