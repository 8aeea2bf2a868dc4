use schoolbot_core::errors::AppError;
use schoolbot_models::{StudentId, Subject};

use super::{SceneCtx, parse_input, prompt, required, seed, stale_button, subject_buttons};
use crate::conversation::callback::CallbackCommand;
use crate::conversation::scene::{Scene, SceneOutcome};
use crate::conversation::session::Field;
use crate::modules::announcements::service::AnnouncementService;
use crate::modules::approvals::notify::{ask_admins, subject_prompt};
use crate::modules::approvals::service::ApprovalService;
use crate::modules::grades::service::GradeService;
use crate::modules::teachers::service::TeacherService;
use crate::notifications::OutgoingMessage;

pub(super) async fn enter(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
) -> Result<Vec<OutgoingMessage>, AppError> {
    let repo = &ctx.state.repo;
    Ok(match scene {
        Scene::RequestSubject => {
            TeacherService::linked_teacher(repo, ctx.actor).await?;
            prompt("Which subject do you want to teach?")
        }
        Scene::EnrollStudent => {
            GradeService::teaching_subjects(repo, ctx.actor).await?;
            prompt("Enter the id of the student to enroll:")
        }
        Scene::EnrollSubject => {
            let student_id = required(ctx.fields.student_id, Field::StudentId)?;
            let student = GradeService::student(repo, student_id).await?;
            let subjects = GradeService::teaching_subjects(repo, ctx.actor).await?;
            vec![
                OutgoingMessage::text(format!("Enroll {} in which subject?", student.name))
                    .with_buttons(subject_buttons(&subjects)),
            ]
        }
        Scene::ContactStudent => prompt("Enter the id of the student whose parent you want to contact:"),
        _ => {
            let student_id = required(ctx.fields.student_id, Field::StudentId)?;
            let student = GradeService::student(repo, student_id).await?;
            prompt(format!("Type your message for the parent of {}:", student.name))
        }
    })
}

pub(super) async fn text(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
    text: &str,
) -> Result<SceneOutcome, AppError> {
    let state = ctx.state;
    let repo = &state.repo;

    match scene {
        Scene::RequestSubject => {
            let subject: Subject = parse_input(text)?;
            let request = ApprovalService::request_subject(repo, ctx.actor, subject).await?;
            ask_admins(state.notifier.as_ref(), &request.admins, &subject_prompt(&request)).await;
            Ok(SceneOutcome::done(format!(
                "Request to teach {} sent. An admin will review it.",
                request.subject
            )))
        }
        Scene::EnrollStudent | Scene::ContactStudent => {
            let student_id: StudentId = parse_input(text)?;
            GradeService::student(repo, student_id).await?;
            let next = if scene == Scene::EnrollStudent {
                Scene::EnrollSubject
            } else {
                Scene::ContactMessage
            };
            Ok(SceneOutcome::enter(next, seed(|f| f.student_id = Some(student_id))))
        }
        _ => {
            let student_id = required(ctx.fields.student_id, Field::StudentId)?;
            AnnouncementService::contact_parent(
                repo,
                state.notifier.as_ref(),
                ctx.actor,
                student_id,
                text,
            )
            .await?;
            Ok(SceneOutcome::done("Message sent."))
        }
    }
}

pub(super) async fn button(
    ctx: &mut SceneCtx<'_>,
    _scene: Scene,
    command: CallbackCommand,
) -> Result<SceneOutcome, AppError> {
    let CallbackCommand::SelectSubject(subject) = command else {
        return Ok(stale_button());
    };
    let student_id = required(ctx.fields.student_id, Field::StudentId)?;
    let repo = &ctx.state.repo;

    let enrolled = GradeService::enroll(repo, ctx.actor, student_id, &subject).await?;
    let student = GradeService::student(repo, student_id).await?;
    Ok(SceneOutcome::done(if enrolled {
        format!("{} enrolled in {}.", student.name, subject)
    } else {
        format!("{} is already enrolled in {}.", student.name, subject)
    }))
}
