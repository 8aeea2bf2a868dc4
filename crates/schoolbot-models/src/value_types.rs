//! Validated value types for domain primitives.
//!
//! [`Subject`] names travel inside button payloads, so they are normalised and
//! restricted to characters that survive the `_`-separated callback encoding.
//! [`Score`] is a grade value on a 0..=100 scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted subject name, in characters.
pub const SUBJECT_MAX_LEN: usize = 32;

/// Byte budget of an encoded subject. `approve_subject_<10-digit id>_` takes
/// 27 of the 64 callback bytes common chat transports allow.
pub const SUBJECT_PAYLOAD_MAX_BYTES: usize = 37;

/// Highest accepted score.
pub const SCORE_MAX: u8 = 100;

/// Error type for value type parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    /// A student or teacher id that is not exactly ten digits.
    InvalidRecordId { kind: &'static str, value: String },
    /// A chat identity that is not an integer.
    InvalidIdentity(String),
    /// A subject name that is empty, too long or contains `_`.
    InvalidSubject(String),
    /// A score outside 0..=100 or not a number.
    InvalidScore(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRecordId { kind, value } => {
                write!(f, "'{}' is not a valid {} id (10 digits expected).", value, kind)
            }
            Self::InvalidIdentity(value) => write!(f, "'{}' is not a valid user id.", value),
            Self::InvalidSubject(msg) => write!(f, "Invalid subject: {}", msg),
            Self::InvalidScore(value) => write!(
                f,
                "'{}' is not a valid score (a number from 0 to {} expected).",
                value, SCORE_MAX
            ),
        }
    }
}

// ============================================================================
// Subject
// ============================================================================

/// A school subject name.
///
/// Inner whitespace is collapsed to single spaces and the ends are trimmed.
/// In callback payloads spaces are written as `_` (see [`Subject::to_payload`]).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueTypeError> {
        let normalised = raw
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if normalised.is_empty() {
            return Err(ValueTypeError::InvalidSubject(
                "subject cannot be empty".into(),
            ));
        }
        if normalised.chars().count() > SUBJECT_MAX_LEN {
            return Err(ValueTypeError::InvalidSubject(format!(
                "subject must be at most {} characters",
                SUBJECT_MAX_LEN
            )));
        }
        if normalised.contains('_') {
            return Err(ValueTypeError::InvalidSubject(
                "subject cannot contain '_'".into(),
            ));
        }

        let subject = Self(normalised);
        if subject.to_payload().len() > SUBJECT_PAYLOAD_MAX_BYTES {
            return Err(ValueTypeError::InvalidSubject(
                "subject name is too long".into(),
            ));
        }
        Ok(subject)
    }

    /// Decode the underscore form used in button payloads.
    pub fn from_payload(encoded: &str) -> Result<Self, ValueTypeError> {
        Self::new(encoded.replace('_', " "))
    }

    /// Encode for a button payload: spaces become underscores.
    pub fn to_payload(&self) -> String {
        self.0.replace(' ', "_")
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subject({})", self.0)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Subject {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Subject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for Subject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Score
// ============================================================================

/// A grade score, 0..=100.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn new(value: u8) -> Result<Self, ValueTypeError> {
        if value > SCORE_MAX {
            return Err(ValueTypeError::InvalidScore(value.to_string()));
        }
        Ok(Self(value))
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Score {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = s
            .parse::<u8>()
            .map_err(|_| ValueTypeError::InvalidScore(s.to_string()))?;
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
