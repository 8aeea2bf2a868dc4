//! Strongly-typed identifiers.
//!
//! [`UserIdentity`] wraps the chat identity of a person talking to the bot.
//! [`StudentId`] and [`TeacherId`] are 10-digit record numbers handed out by
//! the school; they are drawn uniformly at random and re-drawn until they miss
//! every id already in the target collection.
//!
//! # Example
//!
//! ```ignore
//! use schoolbot_models::ids::StudentId;
//!
//! let mut rng = rand::thread_rng();
//! let id = StudentId::generate(&mut rng, |candidate| existing.contains(candidate));
//! assert_eq!(id.to_string().len(), 10);
//! ```

use crate::value_types::ValueTypeError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest 10-digit number.
pub const RECORD_ID_MIN: u64 = 1_000_000_000;
/// Largest 10-digit number.
pub const RECORD_ID_MAX: u64 = 9_999_999_999;

/// Chat identity of a user (Telegram-style signed 64-bit chat id).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(pub i64);

impl UserIdentity {
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserIdentity({})", self.0)
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserIdentity {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for UserIdentity {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ValueTypeError::InvalidIdentity(s.trim().to_string()))
    }
}

/// Macro to define a 10-digit record id newtype.
///
/// Generates parsing (exactly ten ASCII digits, no leading zero), display,
/// string serialization and rejection-sampling generation.
macro_rules! define_record_id {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Build an id from a number, checking it has exactly ten digits.
            pub fn new(value: u64) -> Result<Self, ValueTypeError> {
                if (RECORD_ID_MIN..=RECORD_ID_MAX).contains(&value) {
                    Ok(Self(value))
                } else {
                    Err(ValueTypeError::InvalidRecordId {
                        kind: $label,
                        value: value.to_string(),
                    })
                }
            }

            /// Draw uniformly random 10-digit values until one is not taken.
            ///
            /// `taken` must reflect the whole target collection and must not
            /// change while this runs; callers hold the repository write lock.
            pub fn generate<R, F>(rng: &mut R, mut taken: F) -> Self
            where
                R: Rng,
                F: FnMut(&Self) -> bool,
            {
                loop {
                    let candidate = Self(rng.gen_range(RECORD_ID_MIN..=RECORD_ID_MAX));
                    if !taken(&candidate) {
                        return candidate;
                    }
                }
            }

            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValueTypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let invalid = || ValueTypeError::InvalidRecordId {
                    kind: $label,
                    value: s.to_string(),
                };
                if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let value = s.parse::<u64>().map_err(|_| invalid())?;
                Self::new(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_record_id!(
    /// 10-digit id of a student record.
    StudentId,
    "student"
);

define_record_id!(
    /// 10-digit id of a teacher record.
    TeacherId,
    "teacher"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_parse_valid_id() {
        let id: StudentId = "1234567890".parse().unwrap();
        assert_eq!(id.get(), 1_234_567_890);
        assert_eq!(id.to_string(), "1234567890");
    }

    #[test]
    fn test_parse_rejects_wrong_length_and_leading_zero() {
        assert!("123".parse::<StudentId>().is_err());
        assert!("12345678901".parse::<StudentId>().is_err());
        assert!("0123456789".parse::<TeacherId>().is_err());
        assert!("12345abcde".parse::<TeacherId>().is_err());
        assert!("+123456789".parse::<TeacherId>().is_err());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: TeacherId = "  9999999999 ".parse().unwrap();
        assert_eq!(id.get(), RECORD_ID_MAX);
    }

    #[test]
    fn test_generate_is_ten_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let id = StudentId::generate(&mut rng, |_| false);
            assert_eq!(id.to_string().len(), 10);
        }
    }

    #[test]
    fn test_generate_skips_taken_ids() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut taken = HashSet::new();
        for _ in 0..2000 {
            let id = TeacherId::generate(&mut rng, |c| taken.contains(c));
            assert!(taken.insert(id), "generated a duplicate id {id}");
        }
    }

    #[test]
    fn test_generate_rejects_until_miss() {
        // The first draw from this seed is forced to collide.
        let mut probe = StdRng::seed_from_u64(3);
        let first = StudentId::generate(&mut probe, |_| false);

        let mut rng = StdRng::seed_from_u64(3);
        let id = StudentId::generate(&mut rng, |c| *c == first);
        assert_ne!(id, first);
    }

    #[test]
    fn test_serialize_as_string() {
        let id = StudentId::new(1_000_000_001).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""1000000001""#);
        let back: StudentId = serde_json::from_str(r#""1000000001""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_identity_parse() {
        let id: UserIdentity = " -100200 ".parse().unwrap();
        assert_eq!(id.get(), -100200);
        assert!("abc".parse::<UserIdentity>().is_err());
    }
}
