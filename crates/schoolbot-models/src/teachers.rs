//! Teacher records.
//!
//! A teacher record is created by an admin and later claimed by a chat user.
//! `subjects` and `pending_subjects` are kept disjoint; `identity` and
//! `pending_identity` are never both set.

use crate::ids::{TeacherId, UserIdentity};
use crate::value_types::Subject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub teacher_id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub identity: Option<UserIdentity>,
    #[serde(default)]
    pub pending_identity: Option<UserIdentity>,
    #[serde(default)]
    pub subjects: BTreeSet<Subject>,
    #[serde(default)]
    pub pending_subjects: BTreeSet<Subject>,
}

impl Teacher {
    pub fn new(teacher_id: TeacherId, name: impl Into<String>) -> Self {
        Self {
            teacher_id,
            name: name.into(),
            identity: None,
            pending_identity: None,
            subjects: BTreeSet::new(),
            pending_subjects: BTreeSet::new(),
        }
    }

    /// Whether the subject is verified or awaiting verification.
    pub fn knows_subject(&self, subject: &Subject) -> bool {
        self.subjects.contains(subject) || self.pending_subjects.contains(subject)
    }

    pub fn is_claimed(&self) -> bool {
        self.identity.is_some() || self.pending_identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knows_subject_checks_both_sets() {
        let mut t = Teacher::new(TeacherId::new(2_000_000_000).unwrap(), "Mr. Lee");
        let chem = Subject::new("Chemistry").unwrap();
        let bio = Subject::new("Biology").unwrap();
        assert!(!t.knows_subject(&chem));
        t.pending_subjects.insert(chem.clone());
        t.subjects.insert(bio.clone());
        assert!(t.knows_subject(&chem));
        assert!(t.knows_subject(&bio));
    }

    #[test]
    fn test_is_claimed() {
        let mut t = Teacher::new(TeacherId::new(2_000_000_000).unwrap(), "Mr. Lee");
        assert!(!t.is_claimed());
        t.pending_identity = Some(UserIdentity(3));
        assert!(t.is_claimed());
    }
}
