use schoolbot_core::errors::AppError;
use schoolbot_models::{StudentId, UserIdentity};

use super::{SceneCtx, parse_input, prompt, required, seed};
use crate::conversation::format::student_line;
use crate::conversation::scene::{Scene, SceneOutcome};
use crate::conversation::session::Field;
use crate::modules::announcements::service::AnnouncementService;
use crate::modules::students::service::StudentService;
use crate::modules::teachers::service::TeacherService;
use crate::modules::users::service::UserService;
use crate::notifications::{OutgoingMessage, notify};

const IMPORT_HELP: &str = "Send a JSON file (or paste it) with a list of students:\n\
[{\"name\": \"Ava Smith\", \"class\": \"Grade 5\", \"parent_id\": 123456789, \"schedule\": \"Mon: Math\"}]\n\
parent_id and schedule are optional.";

pub(super) async fn enter(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
) -> Result<Vec<OutgoingMessage>, AppError> {
    UserService::require_admin(&ctx.state.repo, ctx.actor).await?;

    Ok(match scene {
        Scene::AddStudentName => prompt("Enter the student's full name:"),
        Scene::AddStudentClass => {
            let name = required(ctx.fields.student_name.as_deref(), Field::StudentName)?;
            prompt(format!("Which class is {} in?", name))
        }
        Scene::ImportStudents => prompt(IMPORT_HELP),
        Scene::AddTeacher => prompt("Enter the teacher's full name:"),
        Scene::DeleteStudent => prompt("Enter the id of the student to delete:"),
        Scene::UnlinkStudent => prompt("Enter the id of the student to unlink from their parent:"),
        Scene::UnbindParent => prompt("Enter the user id of the parent to unbind:"),
        Scene::PromoteAdmin => prompt("Enter the user id of the new admin:"),
        Scene::DemoteAdmin => prompt("Enter the user id of the admin to remove:"),
        Scene::ClassRoster | Scene::ScheduleClass => {
            let classes = StudentService::classes(&ctx.state.repo, ctx.actor).await?;
            if classes.is_empty() {
                return Err(AppError::not_found(anyhow::anyhow!("There are no classes yet.")));
            }
            let names: Vec<String> = classes.into_iter().map(|c| c.class).collect();
            prompt(format!("Enter a class name. Classes: {}", names.join(", ")))
        }
        Scene::ScheduleText => {
            let class = required(ctx.fields.class_name.as_deref(), Field::ClassName)?;
            prompt(format!("Send the schedule for class {}:", class))
        }
        _ => prompt("Send the announcement text:"),
    })
}

pub(super) async fn text(
    ctx: &mut SceneCtx<'_>,
    scene: Scene,
    text: &str,
) -> Result<SceneOutcome, AppError> {
    let state = ctx.state;
    let repo = &state.repo;
    let notifier = state.notifier.as_ref();

    match scene {
        Scene::AddStudentName => {
            let name = text.trim();
            if name.is_empty() || name.chars().count() > 100 {
                return Err(AppError::validation(anyhow::anyhow!(
                    "Name must be 1 to 100 characters."
                )));
            }
            Ok(SceneOutcome::enter(
                Scene::AddStudentClass,
                seed(|f| f.student_name = Some(name.to_string())),
            ))
        }
        Scene::AddStudentClass => {
            let name = required(ctx.fields.student_name.clone(), Field::StudentName)?;
            let student = StudentService::add_student(repo, ctx.actor, &name, text).await?;
            Ok(SceneOutcome::done(format!(
                "Student {} added to {}.\nStudent id: {}",
                student.name, student.class, student.student_id
            )))
        }
        Scene::ImportStudents => document(ctx, text).await,
        Scene::AddTeacher => {
            let teacher = TeacherService::add_teacher(repo, ctx.actor, text).await?;
            Ok(SceneOutcome::done(format!(
                "Teacher {} added.\nTeacher id: {}\nShare this id with the teacher so they can register.",
                teacher.name, teacher.teacher_id
            )))
        }
        Scene::DeleteStudent => {
            let student_id: StudentId = parse_input(text)?;
            let student = StudentService::delete_student(repo, ctx.actor, student_id).await?;
            if let Some(parent) = student.parent_id() {
                notify(
                    notifier,
                    parent,
                    OutgoingMessage::text(format!("{} was removed from the school records.", student.name)),
                )
                .await;
            }
            Ok(SceneOutcome::done(format!("Student {} deleted.", student.name)))
        }
        Scene::UnlinkStudent => {
            let student_id: StudentId = parse_input(text)?;
            let (student, parent) = StudentService::unlink_student(repo, ctx.actor, student_id).await?;
            notify(
                notifier,
                parent,
                OutgoingMessage::text(format!("You are no longer linked to {}.", student.name)),
            )
            .await;
            Ok(SceneOutcome::done(format!(
                "{} is no longer linked to parent {}.",
                student.name, parent
            )))
        }
        Scene::UnbindParent => {
            let parent: UserIdentity = parse_input(text)?;
            let report = StudentService::unbind_parent(repo, ctx.actor, parent).await?;
            if !report.students.is_empty() {
                notify(
                    notifier,
                    parent,
                    OutgoingMessage::text("You have been unlinked from all students."),
                )
                .await;
            }
            Ok(SceneOutcome::done(format!(
                "Parent {} unbound from {} student(s).",
                parent,
                report.students.len()
            )))
        }
        Scene::PromoteAdmin => {
            let target: UserIdentity = parse_input(text)?;
            let user = UserService::promote(repo, ctx.actor, target).await?;
            notify(notifier, target, OutgoingMessage::text("You are now an admin. Send /admin to open the panel.")).await;
            Ok(SceneOutcome::done(format!("{} is now an admin.", user.display_name())))
        }
        Scene::DemoteAdmin => {
            let target: UserIdentity = parse_input(text)?;
            let user = UserService::demote(repo, ctx.actor, target).await?;
            notify(notifier, target, OutgoingMessage::text("You are no longer an admin.")).await;
            Ok(SceneOutcome::done(format!(
                "{} is no longer an admin (now {}).",
                user.display_name(),
                user.role
            )))
        }
        Scene::ClassRoster => {
            let roster = StudentService::class_roster(repo, ctx.actor, text).await?;
            let lines: Vec<String> = roster.iter().map(student_line).collect();
            Ok(SceneOutcome::done(format!(
                "Class {} ({} students):\n{}",
                text.trim(),
                roster.len(),
                lines.join("\n")
            )))
        }
        Scene::ScheduleClass => {
            let class = text.trim();
            StudentService::class_roster(repo, ctx.actor, class).await?;
            Ok(SceneOutcome::enter(
                Scene::ScheduleText,
                seed(|f| f.class_name = Some(class.to_string())),
            ))
        }
        Scene::ScheduleText => {
            let class = required(ctx.fields.class_name.clone(), Field::ClassName)?;
            let updated = StudentService::set_class_schedule(repo, ctx.actor, &class, text).await?;
            Ok(SceneOutcome::done(format!(
                "Schedule set for {} student(s) in class {}.",
                updated, class
            )))
        }
        _ => {
            let outcome = AnnouncementService::broadcast(repo, notifier, ctx.actor, text).await?;
            let mut reply = format!("Announcement sent to {} user(s).", outcome.delivered);
            if outcome.failed > 0 {
                reply.push_str(&format!(" {} could not be reached.", outcome.failed));
            }
            Ok(SceneOutcome::done(reply))
        }
    }
}

pub(super) async fn document(ctx: &mut SceneCtx<'_>, content: &str) -> Result<SceneOutcome, AppError> {
    let report =
        StudentService::import_students(&ctx.state.repo, ctx.actor, content.as_bytes()).await?;

    let mut reply = format!(
        "Imported {} student(s), {} linked to a parent.",
        report.created.len(),
        report.linked
    );
    for student in &report.created {
        reply.push_str(&format!("\n{} ({}): {}", student.name, student.class, student.student_id));
    }
    for rejection in &report.rejected {
        reply.push_str(&format!("\nRow {} skipped: {}", rejection.row, rejection.reason));
    }
    Ok(SceneOutcome::done(reply))
}
