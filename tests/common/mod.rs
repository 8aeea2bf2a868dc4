#![allow(dead_code)]

use async_trait::async_trait;
use schoolbot::conversation::{Conversation, InboundEvent};
use schoolbot::notifications::{DeliveryError, Notifier, OutgoingMessage};
use schoolbot::state::AppState;
use schoolbot_config::{BotConfig, StorageConfig};
use schoolbot_db::Repository;
use schoolbot_models::UserIdentity;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const ADMIN_CODE: &str = "s3cret";

/// Notifier that records every message and refuses the blocked recipients.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(UserIdentity, OutgoingMessage)>>>,
    blocked: Arc<Mutex<HashSet<UserIdentity>>>,
}

impl RecordingNotifier {
    pub fn block(&self, identity: i64) {
        self.blocked.lock().unwrap().insert(UserIdentity(identity));
    }

    pub fn sent_to(&self, identity: i64) -> Vec<OutgoingMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == UserIdentity(identity))
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: UserIdentity, message: OutgoingMessage) -> Result<(), DeliveryError> {
        if self.blocked.lock().unwrap().contains(&to) {
            return Err(DeliveryError::Unreachable(to));
        }
        self.sent.lock().unwrap().push((to, message));
        Ok(())
    }
}

pub struct TestBot {
    pub state: AppState,
    pub notifier: RecordingNotifier,
    _dir: TempDir,
}

pub fn bot_config() -> BotConfig {
    BotConfig {
        token: "test-token".to_string(),
        admin_code: ADMIN_CODE.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
    }
}

/// A bot over a fresh data directory whose notifications are recorded.
pub async fn setup_bot() -> TestBot {
    let dir = TempDir::new().unwrap();
    let repo = Repository::open(&StorageConfig {
        data_dir: dir.path().to_path_buf(),
    })
    .await
    .unwrap();
    let notifier = RecordingNotifier::default();
    let state = AppState::new(repo, bot_config()).with_notifier(Arc::new(notifier.clone()));
    TestBot {
        state,
        notifier,
        _dir: dir,
    }
}

/// A bot whose notifications go to the outbox, as in production.
pub async fn setup_outbox_bot() -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::open(&StorageConfig {
        data_dir: dir.path().to_path_buf(),
    })
    .await
    .unwrap();
    (AppState::new(repo, bot_config()), dir)
}

impl TestBot {
    pub async fn say(&self, from: i64, text: &str) -> Vec<OutgoingMessage> {
        let event = InboundEvent::text(UserIdentity(from), text).with_name(format!("User {from}"));
        Conversation::handle(&self.state, event).await
    }

    pub async fn press(&self, from: i64, payload: &str) -> Vec<OutgoingMessage> {
        let event = InboundEvent::callback(UserIdentity(from), payload);
        Conversation::handle(&self.state, event).await
    }

    pub async fn upload(&self, from: i64, content: &str) -> Vec<OutgoingMessage> {
        let event = InboundEvent::document(UserIdentity(from), content);
        Conversation::handle(&self.state, event).await
    }

    /// Log in as admin through `/admin` and the shared code.
    pub async fn make_admin(&self, identity: i64) {
        self.say(identity, "/start").await;
        self.say(identity, "/admin").await;
        let replies = self.say(identity, ADMIN_CODE).await;
        assert!(first_text(&replies).contains("You are now an admin"));
    }

    /// Add a student through the admin scenes and return its id.
    pub async fn add_student(&self, admin: i64, name: &str, class: &str) -> String {
        self.say(admin, "Add student").await;
        self.say(admin, name).await;
        let replies = self.say(admin, class).await;
        id_after(&replies, "Student id: ")
    }

    /// Add a teacher record through the admin scene and return its id.
    pub async fn add_teacher(&self, admin: i64, name: &str) -> String {
        self.say(admin, "Add teacher").await;
        let replies = self.say(admin, name).await;
        id_after(&replies, "Teacher id: ")
    }

    /// Register `identity` as the teacher `name`, approved by `admin`.
    pub async fn register_teacher(&self, admin: i64, identity: i64, name: &str) -> String {
        let teacher_id = self.add_teacher(admin, name).await;
        self.say(identity, "/start").await;
        self.say(identity, "I am a teacher").await;
        self.say(identity, &teacher_id).await;
        let approve = self.last_payload(admin, "approve_teacher_");
        self.press(admin, &approve).await;
        teacher_id
    }

    /// Give a registered teacher a verified subject.
    pub async fn verify_subject(&self, admin: i64, teacher: i64, subject: &str) {
        self.say(teacher, "Request subject").await;
        self.say(teacher, subject).await;
        let approve = self.last_payload(admin, "approve_subject_");
        self.press(admin, &approve).await;
    }

    /// Most recent inline payload notified to `identity` with the prefix.
    pub fn last_payload(&self, identity: i64, prefix: &str) -> String {
        self.notifier
            .sent_to(identity)
            .iter()
            .rev()
            .flat_map(|m| m.payloads().into_iter().map(str::to_string).collect::<Vec<_>>())
            .find(|p| p.starts_with(prefix))
            .unwrap_or_else(|| panic!("no {prefix} payload sent to {identity}"))
    }

    pub async fn session_is_idle(&self, identity: i64) -> bool {
        let session = self
            .state
            .sessions
            .peek(UserIdentity(identity))
            .await
            .unwrap_or_default();
        session.scene.is_none() && session.fields.is_empty()
    }
}

pub fn texts(replies: &[OutgoingMessage]) -> Vec<&str> {
    replies.iter().map(|m| m.text.as_str()).collect()
}

pub fn first_text(replies: &[OutgoingMessage]) -> &str {
    replies.first().map(|m| m.text.as_str()).unwrap_or_default()
}

/// The 10-digit id following `marker` in any reply.
pub fn id_after(replies: &[OutgoingMessage], marker: &str) -> String {
    replies
        .iter()
        .find_map(|m| {
            let start = m.text.find(marker)? + marker.len();
            Some(m.text[start..start + 10].to_string())
        })
        .unwrap_or_else(|| panic!("no {marker:?} in {:?}", texts(replies)))
}
