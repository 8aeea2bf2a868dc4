//! Human-approval gates.
//!
//! Every request moves `NONE -> PENDING -> {APPROVED, DENIED}`. Filing a
//! request sets a pending marker; a decision re-checks that exact marker
//! inside the repository transaction and removes it, so a request can be
//! resolved once. Anything else reports "Request not found.".

use schoolbot_core::errors::AppError;
use schoolbot_db::{Collections, Repository};
use schoolbot_models::{ParentLink, Role, Student, StudentId, Subject, Teacher, TeacherId, UserIdentity};
use tracing::{info, instrument, warn};

use crate::modules::approvals::model::{
    Decision, ParentLinkRequest, SubjectRequest, TeacherClaimRequest,
};
use crate::modules::users::service::{ensure_admin, grant_parent_role, settle_parent_role};

fn admin_identities(c: &Collections) -> Vec<UserIdentity> {
    let admins: Vec<UserIdentity> = c.list_admins().iter().map(|u| u.identity).collect();
    if admins.is_empty() {
        warn!("No admins to review the request");
    }
    admins
}

pub struct ApprovalService;

impl ApprovalService {
    // ========================================================================
    // Parent link
    // ========================================================================

    #[instrument(skip(repo))]
    pub async fn request_parent_link(
        repo: &Repository,
        parent: UserIdentity,
        name: &str,
        student_id: StudentId,
    ) -> Result<ParentLinkRequest, AppError> {
        let request = repo
            .transaction(|tx| {
                let student = tx.student_mut(student_id).ok_or_else(|| {
                    AppError::not_found(anyhow::anyhow!("No student with id {}.", student_id))
                })?;
                match student.parent {
                    ParentLink::Linked(p) if p == parent => {
                        return Err(AppError::conflict(anyhow::anyhow!(
                            "{} is already linked to your account.",
                            student.name
                        )));
                    }
                    ParentLink::Linked(_) => {
                        return Err(AppError::conflict(anyhow::anyhow!(
                            "{} is already linked to a parent.",
                            student.name
                        )));
                    }
                    ParentLink::Pending(_) => {
                        return Err(AppError::conflict(anyhow::anyhow!(
                            "A link request for {} is already pending.",
                            student.name
                        )));
                    }
                    ParentLink::None => {}
                }
                student.parent = ParentLink::Pending(parent);
                let student = student.clone();

                let user = tx.ensure_user(parent, name);
                user.pending_student_ids.insert(student_id);
                grant_parent_role(user);
                let parent_name = user.display_name();

                Ok(ParentLinkRequest {
                    parent,
                    parent_name,
                    student,
                    admins: admin_identities(tx.view()),
                })
            })
            .await?;

        info!(parent = %parent, student_id = %student_id, "Parent link requested");
        Ok(request)
    }

    #[instrument(skip(repo))]
    pub async fn decide_parent_link(
        repo: &Repository,
        actor: UserIdentity,
        parent: UserIdentity,
        student_id: StudentId,
        decision: Decision,
    ) -> Result<Student, AppError> {
        let student = repo
            .transaction(|tx| {
                ensure_admin(tx.view(), actor)?;
                let student = tx
                    .student_mut(student_id)
                    .filter(|s| s.parent == ParentLink::Pending(parent))
                    .ok_or_else(AppError::request_not_found)?;
                student.parent = match decision {
                    Decision::Approve => ParentLink::Linked(parent),
                    Decision::Deny => ParentLink::None,
                };
                let student = student.clone();

                let user = tx.ensure_user(parent, "");
                user.pending_student_ids.remove(&student_id);
                match decision {
                    Decision::Approve => {
                        user.student_ids.insert(student_id);
                        grant_parent_role(user);
                    }
                    Decision::Deny => settle_parent_role(user),
                }
                Ok(student)
            })
            .await?;

        info!(
            parent = %parent,
            student_id = %student_id,
            decision = decision.past_tense(),
            "Parent link decided"
        );
        Ok(student)
    }

    // ========================================================================
    // Teacher registration
    // ========================================================================

    #[instrument(skip(repo))]
    pub async fn request_teacher_claim(
        repo: &Repository,
        identity: UserIdentity,
        name: &str,
        teacher_id: TeacherId,
    ) -> Result<TeacherClaimRequest, AppError> {
        let request = repo
            .transaction(|tx| {
                let view = tx.view();
                if view.find_teacher_by_identity(identity).is_some() {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "You are already registered as a teacher."
                    )));
                }
                if view
                    .teachers
                    .iter()
                    .any(|t| t.pending_identity == Some(identity))
                {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "You already have a registration request pending."
                    )));
                }

                let teacher = tx.teacher_mut(teacher_id).ok_or_else(|| {
                    AppError::not_found(anyhow::anyhow!("No teacher with id {}.", teacher_id))
                })?;
                if teacher.identity.is_some() {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "This teacher record is already claimed."
                    )));
                }
                if teacher.pending_identity.is_some() {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "A registration request for this teacher is already pending."
                    )));
                }
                teacher.pending_identity = Some(identity);
                let teacher = teacher.clone();

                let name = tx.ensure_user(identity, name).display_name();
                Ok(TeacherClaimRequest {
                    identity,
                    name,
                    teacher,
                    admins: admin_identities(tx.view()),
                })
            })
            .await?;

        info!(identity = %identity, teacher_id = %teacher_id, "Teacher registration requested");
        Ok(request)
    }

    #[instrument(skip(repo))]
    pub async fn decide_teacher_claim(
        repo: &Repository,
        actor: UserIdentity,
        identity: UserIdentity,
        teacher_id: TeacherId,
        decision: Decision,
    ) -> Result<Teacher, AppError> {
        let teacher = repo
            .transaction(|tx| {
                ensure_admin(tx.view(), actor)?;
                let teacher = tx
                    .teacher_mut(teacher_id)
                    .filter(|t| t.pending_identity == Some(identity) && t.identity.is_none())
                    .ok_or_else(AppError::request_not_found)?;
                teacher.pending_identity = None;
                if decision == Decision::Approve {
                    teacher.identity = Some(identity);
                }
                let teacher = teacher.clone();

                if decision == Decision::Approve {
                    let user = tx.ensure_user(identity, "");
                    if user.role != Role::Admin {
                        user.role = Role::Teacher;
                    }
                    user.subjects = teacher.subjects.clone();
                }
                Ok(teacher)
            })
            .await?;

        info!(
            identity = %identity,
            teacher_id = %teacher_id,
            decision = decision.past_tense(),
            "Teacher registration decided"
        );
        Ok(teacher)
    }

    // ========================================================================
    // Subject verification
    // ========================================================================

    #[instrument(skip(repo))]
    pub async fn request_subject(
        repo: &Repository,
        identity: UserIdentity,
        subject: Subject,
    ) -> Result<SubjectRequest, AppError> {
        let request = repo
            .transaction(|tx| {
                let teacher_id = tx
                    .view()
                    .find_teacher_by_identity(identity)
                    .map(|t| t.teacher_id)
                    .ok_or_else(|| {
                        AppError::forbidden(anyhow::anyhow!("You are not registered as a teacher."))
                    })?;
                let teacher = tx
                    .teacher_mut(teacher_id)
                    .ok_or_else(AppError::request_not_found)?;
                if teacher.subjects.contains(&subject) {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "You already teach {}.",
                        subject
                    )));
                }
                if teacher.pending_subjects.contains(&subject) {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "{} is already awaiting approval.",
                        subject
                    )));
                }
                teacher.pending_subjects.insert(subject.clone());
                let teacher = teacher.clone();

                Ok(SubjectRequest {
                    teacher,
                    subject: subject.clone(),
                    admins: admin_identities(tx.view()),
                })
            })
            .await?;

        info!(identity = %identity, subject = %request.subject, "Subject requested");
        Ok(request)
    }

    #[instrument(skip(repo))]
    pub async fn decide_subject(
        repo: &Repository,
        actor: UserIdentity,
        teacher_id: TeacherId,
        subject: Subject,
        decision: Decision,
    ) -> Result<Teacher, AppError> {
        let teacher = repo
            .transaction(|tx| {
                ensure_admin(tx.view(), actor)?;
                let teacher = tx
                    .teacher_mut(teacher_id)
                    .filter(|t| t.pending_subjects.contains(&subject))
                    .ok_or_else(AppError::request_not_found)?;
                teacher.pending_subjects.remove(&subject);
                if decision == Decision::Approve {
                    teacher.subjects.insert(subject.clone());
                }
                let teacher = teacher.clone();

                if decision == Decision::Approve {
                    if let Some(identity) = teacher.identity {
                        match tx.user_mut(identity) {
                            Some(user) => {
                                user.subjects.insert(subject.clone());
                            }
                            None => {
                                warn!(teacher_id = %teacher_id, identity = %identity, "Teacher linked to a missing user")
                            }
                        }
                    }
                }
                Ok(teacher)
            })
            .await?;

        info!(
            teacher_id = %teacher_id,
            subject = %subject,
            decision = decision.past_tense(),
            "Subject decided"
        );
        Ok(teacher)
    }
}
