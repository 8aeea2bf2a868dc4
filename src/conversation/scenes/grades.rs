//! Grade entry: student, subject, add or edit, score, purpose.

use schoolbot_core::errors::AppError;
use schoolbot_models::{Score, StudentId};

use super::{
    SceneCtx, cancel_button, parse_input, prompt, required, seed, stale_button, subject_buttons,
};
use crate::conversation::callback::CallbackCommand;
use crate::conversation::format::grade_line;
use crate::conversation::scene::{Scene, SceneOutcome};
use crate::conversation::session::{Field, SessionFields};
use crate::modules::grades::service::GradeService;
use crate::notifications::{InlineButton, OutgoingMessage};

pub(super) async fn enter(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
) -> Result<Vec<OutgoingMessage>, AppError> {
    let repo = &ctx.state.repo;
    let fields = &ctx.fields;

    match scene {
        Scene::GradeStudent => {
            GradeService::teaching_subjects(repo, ctx.actor).await?;
            Ok(prompt("Enter the student id:"))
        }
        Scene::GradeSubject => {
            let student_id = required(fields.student_id, Field::StudentId)?;
            let student = GradeService::student(repo, student_id).await?;
            let subjects = GradeService::teaching_subjects(repo, ctx.actor).await?;
            Ok(vec![
                OutgoingMessage::text(format!(
                    "{} ({}). Choose a subject:",
                    student.name, student.class
                ))
                .with_buttons(subject_buttons(&subjects)),
            ])
        }
        Scene::GradeAction => {
            let student_id = required(fields.student_id, Field::StudentId)?;
            let subject = required(fields.subject.as_ref(), Field::Subject)?;
            let grades = GradeService::grades(repo, student_id, subject).await?;

            let mut text = format!("{} grades:", subject);
            if grades.is_empty() {
                text.push_str("\nNone yet.");
            }
            for grade in &grades {
                text.push_str(&format!("\n{}", grade_line(grade)));
            }

            let mut buttons = vec![InlineButton::new("Add grade", &CallbackCommand::GradeAdd)];
            if !grades.is_empty() {
                buttons.push(InlineButton::new("Edit grade", &CallbackCommand::GradeEdit));
            }
            buttons.push(cancel_button());
            Ok(vec![OutgoingMessage::text(text).with_buttons(buttons)])
        }
        Scene::GradeSelect => {
            let student_id = required(fields.student_id, Field::StudentId)?;
            let subject = required(fields.subject.as_ref(), Field::Subject)?;
            let grades = GradeService::grades(repo, student_id, subject).await?;
            if grades.is_empty() {
                return Err(AppError::not_found(anyhow::anyhow!("There are no grades to edit.")));
            }
            let buttons = grades
                .iter()
                .map(|g| InlineButton::new(grade_line(g), &CallbackCommand::SelectGrade(g.grade_id)))
                .chain(std::iter::once(cancel_button()))
                .collect();
            Ok(vec![
                OutgoingMessage::text("Which grade do you want to edit?").with_buttons(buttons),
            ])
        }
        Scene::GradeScore => Ok(prompt("Enter the score (0-100):")),
        _ => Ok(prompt("What is this grade for? (e.g. Quiz 1)")),
    }
}

pub(super) async fn text(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
    text: &str,
) -> Result<SceneOutcome, AppError> {
    let repo = &ctx.state.repo;

    match scene {
        Scene::GradeStudent => {
            let student_id: StudentId = parse_input(text)?;
            GradeService::student(repo, student_id).await?;
            Ok(SceneOutcome::enter(
                Scene::GradeSubject,
                seed(|f| f.student_id = Some(student_id)),
            ))
        }
        Scene::GradeScore => {
            let score: Score = parse_input(text)?;
            Ok(SceneOutcome::enter(
                Scene::GradePurpose,
                seed(|f| f.score = Some(score)),
            ))
        }
        _ => {
            let SessionFields {
                student_id,
                subject,
                grade_id,
                score,
                ..
            } = ctx.fields.clone();
            let student_id = required(student_id, Field::StudentId)?;
            let subject = required(subject, Field::Subject)?;
            let score = required(score, Field::Score)?;

            let grade = match grade_id {
                Some(grade_id) => {
                    GradeService::edit_grade(repo, ctx.actor, student_id, &subject, grade_id, score, text)
                        .await?
                }
                None => {
                    GradeService::add_grade(repo, ctx.actor, student_id, &subject, score, text).await?
                }
            };
            Ok(SceneOutcome::done(format!(
                "Saved {} grade: {}",
                subject,
                grade_line(&grade)
            )))
        }
    }
}

pub(super) async fn button(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
    command: CallbackCommand,
) -> Result<SceneOutcome, AppError> {
    match (scene, command) {
        (Scene::GradeSubject, CallbackCommand::SelectSubject(subject)) => {
            let offered = GradeService::teaching_subjects(&ctx.state.repo, ctx.actor).await?;
            if !offered.contains(&subject) {
                return Ok(stale_button());
            }
            Ok(SceneOutcome::enter(
                Scene::GradeAction,
                seed(|f| f.subject = Some(subject)),
            ))
        }
        (Scene::GradeAction, CallbackCommand::GradeAdd) => {
            Ok(SceneOutcome::enter(Scene::GradeScore, SessionFields::default()))
        }
        (Scene::GradeAction, CallbackCommand::GradeEdit) => {
            Ok(SceneOutcome::enter(Scene::GradeSelect, SessionFields::default()))
        }
        (Scene::GradeSelect, CallbackCommand::SelectGrade(grade_id)) => {
            let student_id = required(ctx.fields.student_id, Field::StudentId)?;
            let subject = required(ctx.fields.subject.clone(), Field::Subject)?;
            let student = GradeService::student(&ctx.state.repo, student_id).await?;
            if student.find_grade(&subject, grade_id).is_none() {
                return Ok(stale_button());
            }
            Ok(SceneOutcome::enter(
                Scene::GradeScore,
                seed(|f| f.grade_id = Some(grade_id)),
            ))
        }
        _ => Ok(stale_button()),
    }
}
