use schoolbot_config::{BotConfig, StorageConfig};
use schoolbot_db::{Repository, StoreError};
use std::sync::Arc;

use crate::conversation::session::SessionStore;
use crate::notifications::{Notifier, OutboxNotifier};

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub sessions: SessionStore,
    /// Delivery for everything not addressed to the actor of an event.
    pub notifier: Arc<dyn Notifier>,
    /// Queue drained by the transport adapter.
    pub outbox: OutboxNotifier,
    pub bot_config: BotConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("repo", &self.repo)
            .field("bot_config", &self.bot_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State whose notifications go to the outbox.
    pub fn new(repo: Repository, bot_config: BotConfig) -> Self {
        let outbox = OutboxNotifier::new();
        Self {
            repo,
            sessions: SessionStore::new(),
            notifier: Arc::new(outbox.clone()),
            outbox,
            bot_config,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

pub async fn init_app_state() -> Result<AppState, StoreError> {
    let repo = Repository::open(&StorageConfig::from_env()).await?;
    Ok(AppState::new(repo, BotConfig::from_env()))
}
