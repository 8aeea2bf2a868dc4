//! Student domain models and DTOs.
//!
//! A student's parent relationship is a single [`ParentLink`] value, so a
//! student can never carry a linked parent and a pending parent at once.
//! Grades are kept per subject in insertion order; a subject key with an
//! empty list means the student is enrolled in that subject but not graded.

use crate::ids::{StudentId, UserIdentity};
use crate::value_types::{Score, Subject};
use chrono::{DateTime, Utc};
use schoolbot_core::serde::deserialize_optional_i64_lenient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

/// Link state between a student and a parent account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "parent_id", rename_all = "snake_case")]
pub enum ParentLink {
    #[default]
    None,
    /// A parent asked to be linked and an admin has not answered yet.
    Pending(UserIdentity),
    Linked(UserIdentity),
}

/// One grade entry. Entries are appended and edited in place by `grade_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub grade_id: Uuid,
    pub score: Score,
    pub purpose: String,
    pub date: DateTime<Utc>,
}

impl Grade {
    pub fn new(score: Score, purpose: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            grade_id: Uuid::new_v4(),
            score,
            purpose: purpose.into(),
            date,
        }
    }
}

/// A student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub parent: ParentLink,
    #[serde(default)]
    pub grades: BTreeMap<Subject, Vec<Grade>>,
    #[serde(default)]
    pub schedule: Option<String>,
}

impl Student {
    pub fn new(student_id: StudentId, name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            student_id,
            name: name.into(),
            class: class.into(),
            parent: ParentLink::None,
            grades: BTreeMap::new(),
            schedule: None,
        }
    }

    pub fn parent_id(&self) -> Option<UserIdentity> {
        match self.parent {
            ParentLink::Linked(p) => Some(p),
            _ => None,
        }
    }

    pub fn pending_parent_id(&self) -> Option<UserIdentity> {
        match self.parent {
            ParentLink::Pending(p) => Some(p),
            _ => None,
        }
    }

    /// Whether `subject` has a grade list (possibly empty) for this student.
    pub fn is_enrolled(&self, subject: &Subject) -> bool {
        self.grades.contains_key(subject)
    }

    pub fn find_grade(&self, subject: &Subject, grade_id: Uuid) -> Option<&Grade> {
        self.grades
            .get(subject)
            .and_then(|list| list.iter().find(|g| g.grade_id == grade_id))
    }
}

/// One row of a bulk student import document.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub class: String,
    #[serde(
        default,
        alias = "parentId",
        deserialize_with = "deserialize_optional_i64_lenient"
    )]
    pub parent_id: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub schedule: Option<String>,
}

impl ImportStudentDto {
    /// Parse a whole import document (a JSON array of rows).
    pub fn parse_document(bytes: &[u8]) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
