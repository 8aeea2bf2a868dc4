use schoolbot_core::errors::AppError;
use schoolbot_models::{StudentId, TeacherId};

use super::{SceneCtx, parse_input, prompt};
use crate::conversation::scene::{Scene, SceneOutcome};
use crate::modules::approvals::notify::{ask_admins, parent_link_prompt, teacher_claim_prompt};
use crate::modules::approvals::service::ApprovalService;
use crate::modules::users::service::UserService;
use crate::notifications::OutgoingMessage;

pub(super) async fn enter(
    _ctx: &mut SceneCtx<'_>,
    scene: Scene,
) -> Result<Vec<OutgoingMessage>, AppError> {
    Ok(match scene {
        Scene::AdminLogin => prompt("Enter the admin code:"),
        Scene::ParentLink => prompt("Enter your child's 10-digit student id:"),
        _ => prompt("Enter the 10-digit teacher id you received from the school:"),
    })
}

pub(super) async fn text(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
    text: &str,
) -> Result<SceneOutcome, AppError> {
    let state = ctx.state;
    match scene {
        Scene::AdminLogin => {
            let user = UserService::login_admin(
                &state.repo,
                &state.bot_config,
                ctx.actor,
                ctx.name,
                text,
            )
            .await?;
            Ok(SceneOutcome::done(format!(
                "Welcome, {}! You are now an admin.",
                user.display_name()
            )))
        }
        Scene::ParentLink => {
            let student_id: StudentId = parse_input(text)?;
            let request =
                ApprovalService::request_parent_link(&state.repo, ctx.actor, ctx.name, student_id)
                    .await?;
            ask_admins(
                state.notifier.as_ref(),
                &request.admins,
                &parent_link_prompt(&request),
            )
            .await;
            Ok(SceneOutcome::done(format!(
                "Request to link {} sent. An admin will review it.",
                request.student.name
            )))
        }
        _ => {
            let teacher_id: TeacherId = parse_input(text)?;
            let request =
                ApprovalService::request_teacher_claim(&state.repo, ctx.actor, ctx.name, teacher_id)
                    .await?;
            ask_admins(
                state.notifier.as_ref(),
                &request.admins,
                &teacher_claim_prompt(&request),
            )
            .await;
            Ok(SceneOutcome::done(format!(
                "Registration as {} sent. An admin will review it.",
                request.teacher.name
            )))
        }
    }
}
