//! Event dispatch.
//!
//! One inbound event is handled while holding the sender's session lock. Text
//! goes to the active scene if there is one, otherwise to the commands and
//! menu labels; callbacks go to the global approval handler or to the active
//! scene's button handler.

use schoolbot_core::errors::{AppError, ErrorKind};
use schoolbot_models::UserIdentity;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, instrument, warn};

use super::actions::{MenuOutcome, run_approval, run_menu_action};
use super::callback::CallbackCommand;
use super::event::{EventKind, InboundEvent};
use super::menu::{MenuAction, menu_for};
use super::scene::{Scene, SceneOutcome, Transition};
use super::scenes::{self, SceneCtx};
use super::session::{Session, SessionFields};
use crate::modules::users::model::Capabilities;
use crate::modules::users::service::UserService;
use crate::notifications::OutgoingMessage;
use crate::state::AppState;

const UNKNOWN_COMMAND: &str = "Unknown command. Send /start to see the menu.";

pub struct Conversation;

impl Conversation {
    /// Process one event and return the replies for its sender.
    #[instrument(skip(state, event), fields(from = %event.from))]
    pub async fn handle(state: &AppState, event: InboundEvent) -> Vec<OutgoingMessage> {
        let session = state.sessions.acquire(event.from).await;
        let mut dispatcher = Dispatcher {
            state,
            actor: event.from,
            name: event.display_name().to_string(),
            session,
        };

        match event.kind {
            EventKind::Text { text } => dispatcher.text(&text).await,
            EventKind::Callback { payload } => dispatcher.callback(&payload).await,
            EventKind::Document { content, .. } => dispatcher.document(&content).await,
        }
    }
}

struct Dispatcher<'a> {
    state: &'a AppState,
    actor: UserIdentity,
    name: String,
    session: OwnedMutexGuard<Session>,
}

impl Dispatcher<'_> {
    async fn text(&mut self, text: &str) -> Vec<OutgoingMessage> {
        let text = text.trim();
        match text {
            "/start" => return self.start().await,
            "/admin" => return self.admin().await,
            "/cancel" => return self.cancel().await,
            _ => {}
        }

        if let Some(scene) = self.session.scene {
            let result = {
                let mut ctx = self.ctx();
                scenes::on_text(&mut ctx, scene, text).await
            };
            return self.settle(result).await;
        }

        let caps = self.capabilities().await;
        match MenuAction::from_label(text) {
            Some(action) if action.permitted(&caps) => {
                debug!(action = action.label(), "Menu action");
                match run_menu_action(self.state, &caps, action).await {
                    Ok(MenuOutcome::Reply(replies)) => replies,
                    Ok(MenuOutcome::Enter(scene)) => {
                        self.enter(scene, SessionFields::default()).await
                    }
                    Err(err) => vec![OutgoingMessage::text(err.user_message())],
                }
            }
            _ => vec![OutgoingMessage::text(UNKNOWN_COMMAND)],
        }
    }

    async fn callback(&mut self, payload: &str) -> Vec<OutgoingMessage> {
        let command = match payload.parse::<CallbackCommand>() {
            Ok(command) => command,
            Err(err) => {
                debug!(error = %err, "Undecodable callback");
                return vec![OutgoingMessage::text(
                    AppError::request_not_found().user_message(),
                )];
            }
        };

        if command.is_approval() {
            let reply = match run_approval(self.state, self.actor, command).await {
                Ok(reply) => reply,
                Err(err) => err.user_message(),
            };
            return vec![OutgoingMessage::text(reply)];
        }

        let Some(scene) = self.session.scene else {
            return vec![OutgoingMessage::text(
                AppError::request_not_found().user_message(),
            )];
        };

        if command == CallbackCommand::Cancel {
            return self.leave(vec![OutgoingMessage::text("Cancelled.")]).await;
        }

        let result = {
            let mut ctx = self.ctx();
            scenes::on_button(&mut ctx, scene, command).await
        };
        self.settle(result).await
    }

    async fn document(&mut self, content: &str) -> Vec<OutgoingMessage> {
        let Some(scene) = self.session.scene else {
            return vec![OutgoingMessage::text(UNKNOWN_COMMAND)];
        };
        let result = {
            let mut ctx = self.ctx();
            scenes::on_document(&mut ctx, scene, content).await
        };
        self.settle(result).await
    }

    async fn start(&mut self) -> Vec<OutgoingMessage> {
        self.drop_scene();
        if let Err(err) = UserService::register(&self.state.repo, self.actor, &self.name).await {
            return vec![OutgoingMessage::text(err.user_message())];
        }

        let caps = self.capabilities().await;
        let greeting = if caps.name.is_empty() {
            "Welcome!".to_string()
        } else {
            format!("Welcome, {}!", caps.name)
        };
        let role_line = if caps.is_admin() {
            "You are an admin of this school."
        } else if caps.is_teacher() {
            "You are registered as a teacher."
        } else if caps.parent {
            "You are registered as a parent."
        } else {
            "Are you a parent or a teacher?"
        };
        vec![
            OutgoingMessage::text(format!("{greeting}\n{role_line}")).with_keyboard(menu_for(&caps)),
        ]
    }

    async fn admin(&mut self) -> Vec<OutgoingMessage> {
        self.drop_scene();
        let caps = self.capabilities().await;
        if caps.is_admin() {
            vec![OutgoingMessage::text("Admin panel").with_keyboard(menu_for(&caps))]
        } else {
            self.enter(Scene::AdminLogin, SessionFields::default()).await
        }
    }

    async fn cancel(&mut self) -> Vec<OutgoingMessage> {
        if self.session.scene.is_some() {
            self.leave(vec![OutgoingMessage::text("Cancelled.")]).await
        } else {
            vec![OutgoingMessage::text("Nothing to cancel.")]
        }
    }

    fn ctx(&mut self) -> SceneCtx<'_> {
        SceneCtx {
            state: self.state,
            actor: self.actor,
            name: &self.name,
            fields: &mut self.session.fields,
        }
    }

    async fn capabilities(&self) -> Capabilities {
        UserService::capabilities(&self.state.repo, self.actor).await
    }

    /// Apply a handler result. Validation errors re-prompt in place; any
    /// other error ends the scene.
    async fn settle(&mut self, result: Result<SceneOutcome, AppError>) -> Vec<OutgoingMessage> {
        match result {
            Ok(outcome) => self.apply(outcome).await,
            Err(err) if err.kind == ErrorKind::Validation => {
                vec![OutgoingMessage::text(err.user_message())]
            }
            Err(err) => self.leave(vec![OutgoingMessage::text(err.user_message())]).await,
        }
    }

    async fn apply(&mut self, outcome: SceneOutcome) -> Vec<OutgoingMessage> {
        let SceneOutcome {
            mut replies,
            transition,
        } = outcome;
        match transition {
            Transition::Stay => replies,
            Transition::Enter(next, seed) => {
                if let Some(current) = self.session.scene {
                    if !current.spec().next.contains(&next) {
                        warn!(?current, ?next, "Scene handed over outside its chain");
                    }
                }
                replies.extend(self.enter(next, seed).await);
                replies
            }
            Transition::Leave => self.leave(replies).await,
        }
    }

    async fn enter(&mut self, scene: Scene, seed: SessionFields) -> Vec<OutgoingMessage> {
        debug!(?scene, "Entering scene");
        self.session.scene = Some(scene);
        self.session.fields.merge(seed);

        let result = {
            let mut ctx = self.ctx();
            scenes::on_enter(&mut ctx, scene).await
        };
        match result {
            Ok(prompt) => prompt,
            // There is no input to correct yet, so every failure ends the scene.
            Err(err) => self.leave(vec![OutgoingMessage::text(err.user_message())]).await,
        }
    }

    /// Leave the active scene and put the menu back.
    async fn leave(&mut self, mut replies: Vec<OutgoingMessage>) -> Vec<OutgoingMessage> {
        self.drop_scene();

        let menu = menu_for(&self.capabilities().await);
        match replies.last_mut() {
            Some(last) if last.keyboard.is_none() => last.keyboard = Some(menu),
            _ => replies.push(OutgoingMessage::text("Main menu").with_keyboard(menu)),
        }
        replies
    }

    /// Clear the active scene and exactly the fields it declares.
    fn drop_scene(&mut self) {
        let Some(scene) = self.session.scene.take() else {
            return;
        };
        debug!(?scene, "Leaving scene");
        for field in scene.spec().clears {
            self.session.fields.clear(*field);
        }
    }
}
