//! Per-identity conversation state.
//!
//! A session is created on first contact and lives for the lifetime of the
//! process. The store hands out the session behind its own mutex; the event
//! dispatcher holds that guard for the whole event so one person's events are
//! processed in arrival order.

use schoolbot_models::{Score, StudentId, Subject, UserIdentity};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::scene::Scene;

/// Names of the transient fields a scene can read or clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    StudentName,
    StudentId,
    ClassName,
    Subject,
    GradeId,
    Score,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::StudentName,
        Field::StudentId,
        Field::ClassName,
        Field::Subject,
        Field::GradeId,
        Field::Score,
    ];
}

/// Input carried between the steps of a multi-step flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFields {
    pub student_name: Option<String>,
    pub student_id: Option<StudentId>,
    pub class_name: Option<String>,
    pub subject: Option<Subject>,
    pub grade_id: Option<Uuid>,
    pub score: Option<Score>,
}

impl SessionFields {
    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::StudentName => self.student_name.is_some(),
            Field::StudentId => self.student_id.is_some(),
            Field::ClassName => self.class_name.is_some(),
            Field::Subject => self.subject.is_some(),
            Field::GradeId => self.grade_id.is_some(),
            Field::Score => self.score.is_some(),
        }
    }

    pub fn clear(&mut self, field: Field) {
        match field {
            Field::StudentName => self.student_name = None,
            Field::StudentId => self.student_id = None,
            Field::ClassName => self.class_name = None,
            Field::Subject => self.subject = None,
            Field::GradeId => self.grade_id = None,
            Field::Score => self.score = None,
        }
    }

    /// Overlay every field `patch` sets.
    pub fn merge(&mut self, patch: SessionFields) {
        if patch.student_name.is_some() {
            self.student_name = patch.student_name;
        }
        if patch.student_id.is_some() {
            self.student_id = patch.student_id;
        }
        if patch.class_name.is_some() {
            self.class_name = patch.class_name;
        }
        if patch.subject.is_some() {
            self.subject = patch.subject;
        }
        if patch.grade_id.is_some() {
            self.grade_id = patch.grade_id;
        }
        if patch.score.is_some() {
            self.score = patch.score;
        }
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| !self.is_set(*f))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub scene: Option<Scene>,
    pub fields: SessionFields,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<UserIdentity, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the session of `identity`, creating it on first contact.
    ///
    /// The outer map lock is released before waiting on the session itself,
    /// so a slow session never blocks other identities.
    pub async fn acquire(&self, identity: UserIdentity) -> OwnedMutexGuard<Session> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions.entry(identity).or_default().clone()
        };
        session.lock_owned().await
    }

    /// Copy of the current session state, mostly for inspection in tests.
    pub async fn peek(&self, identity: UserIdentity) -> Option<Session> {
        let session = self.sessions.lock().await.get(&identity).cloned()?;
        let guard = session.lock().await;
        Some(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_clear() {
        let mut fields = SessionFields {
            student_name: Some("Ava".into()),
            ..Default::default()
        };
        fields.merge(SessionFields {
            class_name: Some("5A".into()),
            ..Default::default()
        });
        assert_eq!(fields.student_name.as_deref(), Some("Ava"));
        assert!(fields.is_set(Field::ClassName));

        fields.clear(Field::StudentName);
        fields.clear(Field::ClassName);
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_per_identity() {
        let store = SessionStore::new();
        {
            let mut a = store.acquire(UserIdentity(1)).await;
            a.fields.student_name = Some("Ava".into());
            // a different identity is not blocked by the held guard
            let b = store.acquire(UserIdentity(2)).await;
            assert!(b.fields.is_empty());
        }
        let a = store.peek(UserIdentity(1)).await.unwrap();
        assert_eq!(a.fields.student_name.as_deref(), Some("Ava"));
        assert!(store.peek(UserIdentity(3)).await.is_none());
    }
}
