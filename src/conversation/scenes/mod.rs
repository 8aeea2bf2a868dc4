//! Scene handlers.
//!
//! Every scene has an enter hook producing its prompt, and text, button and
//! document handlers. Handlers return a [`SceneOutcome`]; the router applies
//! the transition and runs the leave hook.

mod admin;
mod grades;
mod registration;
mod teacher;

use schoolbot_core::errors::AppError;
use schoolbot_models::{Subject, UserIdentity, ValueTypeError};
use std::str::FromStr;

use super::callback::CallbackCommand;
use super::scene::{Scene, SceneOutcome};
use super::session::{Field, SessionFields};
use crate::notifications::{InlineButton, OutgoingMessage};
use crate::state::AppState;

pub struct SceneCtx<'a> {
    pub state: &'a AppState,
    pub actor: UserIdentity,
    pub name: &'a str,
    pub fields: &'a mut SessionFields,
}

pub(crate) fn prompt(text: impl Into<String>) -> Vec<OutgoingMessage> {
    vec![OutgoingMessage::text(text)]
}

pub(crate) fn parse_input<T>(text: &str) -> Result<T, AppError>
where
    T: FromStr<Err = ValueTypeError>,
{
    text.parse().map_err(AppError::validation)
}

/// A field the scene contract guarantees; its absence is a bug.
pub(crate) fn required<T>(value: Option<T>, field: Field) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::internal(anyhow::anyhow!("session field {:?} missing", field)))
}

pub(crate) fn cancel_button() -> InlineButton {
    InlineButton::new("Cancel", &CallbackCommand::Cancel)
}

pub(crate) fn subject_buttons(subjects: &[Subject]) -> Vec<InlineButton> {
    subjects
        .iter()
        .map(|s| InlineButton::new(s.as_str(), &CallbackCommand::SelectSubject(s.clone())))
        .chain(std::iter::once(cancel_button()))
        .collect()
}

fn use_buttons() -> SceneOutcome {
    SceneOutcome::stay("Please choose one of the buttons, or send /cancel.")
}

fn stale_button() -> SceneOutcome {
    SceneOutcome::stay("Request not found.")
}

pub async fn on_enter(ctx: &mut SceneCtx<'_>, scene: Scene) -> Result<Vec<OutgoingMessage>, AppError> {
    match scene {
        Scene::AdminLogin | Scene::ParentLink | Scene::TeacherClaim => {
            registration::enter(ctx, scene).await
        }
        Scene::RequestSubject
        | Scene::EnrollStudent
        | Scene::EnrollSubject
        | Scene::ContactStudent
        | Scene::ContactMessage => teacher::enter(ctx, scene).await,
        Scene::GradeStudent
        | Scene::GradeSubject
        | Scene::GradeAction
        | Scene::GradeSelect
        | Scene::GradeScore
        | Scene::GradePurpose => grades::enter(ctx, scene).await,
        _ => admin::enter(ctx, scene).await,
    }
}

pub async fn on_text(ctx: &mut SceneCtx<'_>, scene: Scene, text: &str) -> Result<SceneOutcome, AppError> {
    match scene {
        Scene::AdminLogin | Scene::ParentLink | Scene::TeacherClaim => {
            registration::text(ctx, scene, text).await
        }
        Scene::RequestSubject | Scene::EnrollStudent | Scene::ContactStudent | Scene::ContactMessage => {
            teacher::text(ctx, scene, text).await
        }
        Scene::GradeStudent | Scene::GradeScore | Scene::GradePurpose => {
            grades::text(ctx, scene, text).await
        }
        Scene::EnrollSubject | Scene::GradeSubject | Scene::GradeAction | Scene::GradeSelect => {
            Ok(use_buttons())
        }
        _ => admin::text(ctx, scene, text).await,
    }
}

pub async fn on_button(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
    command: CallbackCommand,
) -> Result<SceneOutcome, AppError> {
    match scene {
        Scene::EnrollSubject => teacher::button(ctx, scene, command).await,
        Scene::GradeSubject | Scene::GradeAction | Scene::GradeSelect => {
            grades::button(ctx, scene, command).await
        }
        _ => Ok(stale_button()),
    }
}

pub async fn on_document(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
    content: &str,
) -> Result<SceneOutcome, AppError> {
    match scene {
        Scene::ImportStudents => admin::document(ctx, content).await,
        _ => Ok(SceneOutcome::stay(
            "A file is not expected here. Send text, or /cancel.",
        )),
    }
}

/// Seed for handing a single field to the next scene.
pub(crate) fn seed(update: impl FnOnce(&mut SessionFields)) -> SessionFields {
    let mut fields = SessionFields::default();
    update(&mut fields);
    fields
}
