//! Admin prompts and decision notices for the approval workflow.

use schoolbot_models::{Student, Subject, Teacher, UserIdentity};

use crate::conversation::callback::CallbackCommand;
use crate::modules::approvals::model::{
    Decision, ParentLinkRequest, SubjectRequest, TeacherClaimRequest,
};
use crate::notifications::{FanOut, InlineButton, Notifier, OutgoingMessage, notify, notify_all};

fn approve_deny(approve: CallbackCommand, deny: CallbackCommand) -> Vec<InlineButton> {
    vec![
        InlineButton::new("✅ Approve", &approve),
        InlineButton::new("❌ Deny", &deny),
    ]
}

pub fn parent_link_prompt(request: &ParentLinkRequest) -> OutgoingMessage {
    let student = &request.student;
    OutgoingMessage::text(format!(
        "Parent link request\n\n{} ({}) wants to be linked to {} ({}, class {}).",
        request.parent_name, request.parent, student.name, student.student_id, student.class
    ))
    .with_buttons(approve_deny(
        CallbackCommand::ApproveParent {
            parent: request.parent,
            student: student.student_id,
        },
        CallbackCommand::DenyParent {
            parent: request.parent,
            student: student.student_id,
        },
    ))
}

pub fn teacher_claim_prompt(request: &TeacherClaimRequest) -> OutgoingMessage {
    let teacher = &request.teacher;
    OutgoingMessage::text(format!(
        "Teacher registration request\n\n{} ({}) claims teacher record {} ({}).",
        request.name, request.identity, teacher.teacher_id, teacher.name
    ))
    .with_buttons(approve_deny(
        CallbackCommand::ApproveTeacher {
            identity: request.identity,
            teacher: teacher.teacher_id,
        },
        CallbackCommand::DenyTeacher {
            identity: request.identity,
            teacher: teacher.teacher_id,
        },
    ))
}

pub fn subject_prompt(request: &SubjectRequest) -> OutgoingMessage {
    let teacher = &request.teacher;
    OutgoingMessage::text(format!(
        "Subject request\n\n{} ({}) wants to teach {}.",
        teacher.name, teacher.teacher_id, request.subject
    ))
    .with_buttons(approve_deny(
        CallbackCommand::ApproveSubject {
            teacher: teacher.teacher_id,
            subject: request.subject.clone(),
        },
        CallbackCommand::DenySubject {
            teacher: teacher.teacher_id,
            subject: request.subject.clone(),
        },
    ))
}

pub async fn ask_admins(
    notifier: &dyn Notifier,
    admins: &[UserIdentity],
    prompt: &OutgoingMessage,
) -> FanOut {
    notify_all(notifier, admins.iter().copied(), prompt).await
}

pub async fn tell_parent(
    notifier: &dyn Notifier,
    parent: UserIdentity,
    student: &Student,
    decision: Decision,
) {
    let text = match decision {
        Decision::Approve => format!("Your link to {} was approved.", student.name),
        Decision::Deny => format!("Your link request for {} was denied.", student.name),
    };
    notify(notifier, parent, OutgoingMessage::text(text)).await;
}

pub async fn tell_teacher_claim(
    notifier: &dyn Notifier,
    identity: UserIdentity,
    teacher: &Teacher,
    decision: Decision,
) {
    let text = match decision {
        Decision::Approve => format!(
            "Your registration as {} was approved. Send /start to open the teacher menu.",
            teacher.name
        ),
        Decision::Deny => format!("Your registration as {} was denied.", teacher.name),
    };
    notify(notifier, identity, OutgoingMessage::text(text)).await;
}

pub async fn tell_subject(
    notifier: &dyn Notifier,
    teacher: &Teacher,
    subject: &Subject,
    decision: Decision,
) {
    let Some(identity) = teacher.identity else {
        return;
    };
    let text = format!("Your request to teach {} was {}.", subject, decision.past_tense());
    notify(notifier, identity, OutgoingMessage::text(text)).await;
}
