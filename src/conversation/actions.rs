//! Handlers that run outside any scene: menu labels and approval buttons.

use schoolbot_core::errors::AppError;
use schoolbot_models::UserIdentity;

use super::callback::CallbackCommand;
use super::format::{report_card, student_line};
use super::menu::MenuAction;
use super::scene::Scene;
use crate::modules::approvals::model::Decision;
use crate::modules::approvals::notify::{tell_parent, tell_subject, tell_teacher_claim};
use crate::modules::approvals::service::ApprovalService;
use crate::modules::students::service::StudentService;
use crate::modules::teachers::service::TeacherService;
use crate::modules::users::model::Capabilities;
use crate::notifications::OutgoingMessage;
use crate::state::AppState;

/// What a menu action asks the router to do.
pub enum MenuOutcome {
    Reply(Vec<OutgoingMessage>),
    Enter(Scene),
}

pub async fn run_menu_action(
    state: &AppState,
    caps: &Capabilities,
    action: MenuAction,
) -> Result<MenuOutcome, AppError> {
    let repo = &state.repo;
    let reply = |text: String| Ok(MenuOutcome::Reply(vec![OutgoingMessage::text(text)]));

    match action {
        MenuAction::IAmParent | MenuAction::LinkChild => Ok(MenuOutcome::Enter(Scene::ParentLink)),
        MenuAction::IAmTeacher => Ok(MenuOutcome::Enter(Scene::TeacherClaim)),

        MenuAction::MyChildren => {
            let children = StudentService::children(repo, caps.identity).await;
            if children.is_empty() {
                return reply("You have no linked children.".to_string());
            }
            let mut text = String::from("Your children:");
            for student in &children.linked {
                text.push_str(&format!("\n{} ({}), class {}", student.name, student.student_id, student.class));
            }
            for student in &children.pending {
                text.push_str(&format!(
                    "\n{} ({}), awaiting approval",
                    student.name, student.student_id
                ));
            }
            reply(text)
        }
        MenuAction::ChildrenGrades => {
            let children = StudentService::children(repo, caps.identity).await;
            if children.linked.is_empty() {
                return reply("You have no linked children.".to_string());
            }
            let cards: Vec<String> = children.linked.iter().map(report_card).collect();
            reply(cards.join("\n\n"))
        }
        MenuAction::ChildrenSchedule => {
            let children = StudentService::children(repo, caps.identity).await;
            if children.linked.is_empty() {
                return reply("You have no linked children.".to_string());
            }
            let lines: Vec<String> = children
                .linked
                .iter()
                .map(|s| {
                    format!(
                        "{} ({}):\n{}",
                        s.name,
                        s.class,
                        s.schedule.as_deref().unwrap_or("No schedule yet.")
                    )
                })
                .collect();
            reply(lines.join("\n\n"))
        }

        MenuAction::MySubjects => {
            let teacher = TeacherService::linked_teacher(repo, caps.identity).await?;
            let list = |set: &std::collections::BTreeSet<schoolbot_models::Subject>| {
                if set.is_empty() {
                    "none".to_string()
                } else {
                    set.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
                }
            };
            reply(format!(
                "{} ({})\nSubjects: {}\nAwaiting approval: {}",
                teacher.name,
                teacher.teacher_id,
                list(&teacher.subjects),
                list(&teacher.pending_subjects)
            ))
        }
        MenuAction::RequestSubject => Ok(MenuOutcome::Enter(Scene::RequestSubject)),
        MenuAction::GradeStudent => Ok(MenuOutcome::Enter(Scene::GradeStudent)),
        MenuAction::EnrollStudent => Ok(MenuOutcome::Enter(Scene::EnrollStudent)),
        MenuAction::ContactParent => Ok(MenuOutcome::Enter(Scene::ContactStudent)),

        MenuAction::AddStudent => Ok(MenuOutcome::Enter(Scene::AddStudentName)),
        MenuAction::ImportStudents => Ok(MenuOutcome::Enter(Scene::ImportStudents)),
        MenuAction::AddTeacher => Ok(MenuOutcome::Enter(Scene::AddTeacher)),
        MenuAction::DeleteStudent => Ok(MenuOutcome::Enter(Scene::DeleteStudent)),
        MenuAction::UnlinkStudent => Ok(MenuOutcome::Enter(Scene::UnlinkStudent)),
        MenuAction::UnbindParent => Ok(MenuOutcome::Enter(Scene::UnbindParent)),
        MenuAction::ClassRoster => Ok(MenuOutcome::Enter(Scene::ClassRoster)),
        MenuAction::SetSchedule => Ok(MenuOutcome::Enter(Scene::ScheduleClass)),
        MenuAction::PromoteAdmin => Ok(MenuOutcome::Enter(Scene::PromoteAdmin)),
        MenuAction::DemoteAdmin => Ok(MenuOutcome::Enter(Scene::DemoteAdmin)),
        MenuAction::Announcement => Ok(MenuOutcome::Enter(Scene::Broadcast)),
        MenuAction::Classes => {
            let classes = StudentService::classes(repo, caps.identity).await?;
            if classes.is_empty() {
                return reply("There are no classes yet.".to_string());
            }
            let lines: Vec<String> = classes
                .iter()
                .map(|c| format!("{}: {} student(s)", c.class, c.students))
                .collect();
            reply(lines.join("\n"))
        }
        MenuAction::Statistics => {
            let snapshot = repo.snapshot().await;
            let unlinked: Vec<String> = snapshot
                .students
                .iter()
                .filter(|s| s.parent_id().is_none())
                .take(20)
                .map(student_line)
                .collect();
            let mut text = format!(
                "Users: {}\nAdmins: {}\nStudents: {}\nTeachers: {} ({} claimed)\nClasses: {}",
                snapshot.users.len(),
                snapshot.list_admins().len(),
                snapshot.students.len(),
                snapshot.teachers.len(),
                snapshot.teachers.iter().filter(|t| t.identity.is_some()).count(),
                snapshot.classes().len()
            );
            if !unlinked.is_empty() {
                text.push_str("\n\nStudents without a linked parent:\n");
                text.push_str(&unlinked.join("\n"));
            }
            reply(text)
        }
    }
}

/// Apply an admin's decision from an approval button.
///
/// The request is re-validated against current state; a stale or repeated
/// press reports "Request not found." and changes nothing.
pub async fn run_approval(
    state: &AppState,
    actor: UserIdentity,
    command: CallbackCommand,
) -> Result<String, AppError> {
    let repo = &state.repo;
    let notifier = state.notifier.as_ref();
    let decision = if command.is_approve() {
        Decision::Approve
    } else {
        Decision::Deny
    };

    match command {
        CallbackCommand::ApproveParent { parent, student }
        | CallbackCommand::DenyParent { parent, student } => {
            let record =
                ApprovalService::decide_parent_link(repo, actor, parent, student, decision).await?;
            tell_parent(notifier, parent, &record, decision).await;
            Ok(format!(
                "Link of {} to parent {} {}.",
                record.name,
                parent,
                decision.past_tense()
            ))
        }
        CallbackCommand::ApproveTeacher { identity, teacher }
        | CallbackCommand::DenyTeacher { identity, teacher } => {
            let record =
                ApprovalService::decide_teacher_claim(repo, actor, identity, teacher, decision)
                    .await?;
            tell_teacher_claim(notifier, identity, &record, decision).await;
            Ok(format!(
                "Registration of {} as {} {}.",
                identity,
                record.name,
                decision.past_tense()
            ))
        }
        CallbackCommand::ApproveSubject { teacher, subject }
        | CallbackCommand::DenySubject { teacher, subject } => {
            let record =
                ApprovalService::decide_subject(repo, actor, teacher, subject.clone(), decision)
                    .await?;
            tell_subject(notifier, &record, &subject, decision).await;
            Ok(format!(
                "{} for {} {}.",
                subject,
                record.name,
                decision.past_tense()
            ))
        }
        _ => Err(AppError::request_not_found()),
    }
}
