use schoolbot_core::errors::AppError;
use schoolbot_db::{ImportReport, Repository, apply_import};
use schoolbot_models::{ImportStudentDto, ParentLink, Student, StudentId, UserIdentity};
use tracing::{info, instrument, warn};

use crate::modules::students::model::{Children, ClassSummary, NewStudentDto, UnbindReport};
use crate::modules::users::service::{ensure_admin, settle_parent_role};
use crate::validator::validate_input;

fn student_not_found(student_id: StudentId) -> AppError {
    AppError::not_found(anyhow::anyhow!("No student with id {}.", student_id))
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(repo))]
    pub async fn add_student(
        repo: &Repository,
        actor: UserIdentity,
        name: &str,
        class: &str,
    ) -> Result<Student, AppError> {
        let dto = NewStudentDto::new(name, class);
        validate_input(&dto)?;

        let student = repo
            .transaction(|tx| {
                ensure_admin(tx.view(), actor)?;
                let student_id = tx.generate_student_id();
                tx.insert_student(Student::new(student_id, dto.name, dto.class))
            })
            .await?;

        info!(student_id = %student.student_id, class = %student.class, "Student added");
        Ok(student)
    }

    #[instrument(skip(repo, document), fields(document.len = document.len()))]
    pub async fn import_students(
        repo: &Repository,
        actor: UserIdentity,
        document: &[u8],
    ) -> Result<ImportReport, AppError> {
        let rows = ImportStudentDto::parse_document(document).map_err(|e| {
            AppError::validation(anyhow::anyhow!(
                "The document is not a valid student list: {}",
                e
            ))
        })?;

        let report = repo
            .transaction(|tx| {
                ensure_admin(tx.view(), actor)?;
                Ok(apply_import(tx, rows))
            })
            .await?;

        info!(
            created = report.created.len(),
            linked = report.linked,
            rejected = report.rejected.len(),
            "Students imported"
        );
        Ok(report)
    }

    /// Remove a student and detach it from its parent, linked or pending.
    #[instrument(skip(repo))]
    pub async fn delete_student(
        repo: &Repository,
        actor: UserIdentity,
        student_id: StudentId,
    ) -> Result<Student, AppError> {
        repo.transaction(|tx| {
            ensure_admin(tx.view(), actor)?;
            let student = tx
                .remove_student(student_id)
                .ok_or_else(|| student_not_found(student_id))?;

            let parent = match student.parent {
                ParentLink::Linked(p) | ParentLink::Pending(p) => Some(p),
                ParentLink::None => None,
            };
            if let Some(parent) = parent {
                match tx.user_mut(parent) {
                    Some(user) => {
                        user.student_ids.remove(&student_id);
                        user.pending_student_ids.remove(&student_id);
                        settle_parent_role(user);
                    }
                    None => warn!(student_id = %student_id, parent = %parent, "Deleted student referenced a missing parent"),
                }
            }
            Ok(student)
        })
        .await
    }

    /// Clear the linked parent of one student.
    #[instrument(skip(repo))]
    pub async fn unlink_student(
        repo: &Repository,
        actor: UserIdentity,
        student_id: StudentId,
    ) -> Result<(Student, UserIdentity), AppError> {
        repo.transaction(|tx| {
            ensure_admin(tx.view(), actor)?;
            let student = tx
                .student_mut(student_id)
                .ok_or_else(|| student_not_found(student_id))?;
            let ParentLink::Linked(parent) = student.parent else {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "{} has no linked parent.",
                    student.name
                )));
            };
            student.parent = ParentLink::None;
            let student = student.clone();

            match tx.user_mut(parent) {
                Some(user) => {
                    user.student_ids.remove(&student_id);
                    settle_parent_role(user);
                }
                None => warn!(student_id = %student_id, parent = %parent, "Unlinked student referenced a missing parent"),
            }
            Ok((student, parent))
        })
        .await
    }

    /// Remove `parent` from every student that references it, linked or
    /// pending, and empty the parent's own sets.
    #[instrument(skip(repo))]
    pub async fn unbind_parent(
        repo: &Repository,
        actor: UserIdentity,
        parent: UserIdentity,
    ) -> Result<UnbindReport, AppError> {
        repo.transaction(|tx| {
            ensure_admin(tx.view(), actor)?;

            let mut report = UnbindReport::default();
            for student in tx.students_mut() {
                if matches!(student.parent, ParentLink::Linked(p) | ParentLink::Pending(p) if p == parent)
                {
                    student.parent = ParentLink::None;
                    report.students.push(student.student_id);
                }
            }

            if let Some(user) = tx.user_mut(parent) {
                for id in user.student_ids.iter().chain(&user.pending_student_ids) {
                    if !report.students.contains(id) {
                        warn!(parent = %parent, student_id = %id, "Parent referenced a student that did not point back");
                    }
                }
                user.student_ids.clear();
                user.pending_student_ids.clear();
                settle_parent_role(user);
                report.user_found = true;
            }

            if !report.user_found && report.students.is_empty() {
                return Err(AppError::not_found(anyhow::anyhow!(
                    "No user with id {}.",
                    parent
                )));
            }
            Ok(report)
        })
        .await
    }

    /// Set the same schedule text on every student of a class.
    #[instrument(skip(repo, schedule))]
    pub async fn set_class_schedule(
        repo: &Repository,
        actor: UserIdentity,
        class: &str,
        schedule: &str,
    ) -> Result<usize, AppError> {
        let class = class.trim();
        let schedule = schedule.trim();
        if schedule.is_empty() {
            return Err(AppError::validation(anyhow::anyhow!(
                "Schedule cannot be empty."
            )));
        }

        repo.transaction(|tx| {
            ensure_admin(tx.view(), actor)?;
            let mut updated = 0;
            for student in tx.students_mut().filter(|s| s.class == class) {
                student.schedule = Some(schedule.to_string());
                updated += 1;
            }
            if updated == 0 {
                return Err(AppError::not_found(anyhow::anyhow!(
                    "No students in class {}.",
                    class
                )));
            }
            Ok(updated)
        })
        .await
    }

    pub async fn classes(
        repo: &Repository,
        actor: UserIdentity,
    ) -> Result<Vec<ClassSummary>, AppError> {
        repo.read(|c| {
            ensure_admin(c, actor)?;
            Ok(c.classes()
                .into_iter()
                .map(|class| ClassSummary {
                    students: c.find_students_by_class(&class).len(),
                    class,
                })
                .collect())
        })
        .await
    }

    pub async fn class_roster(
        repo: &Repository,
        actor: UserIdentity,
        class: &str,
    ) -> Result<Vec<Student>, AppError> {
        let class = class.trim();
        let roster = repo
            .read(|c| {
                ensure_admin(c, actor)?;
                Ok::<_, AppError>(
                    c.find_students_by_class(class)
                        .into_iter()
                        .cloned()
                        .collect::<Vec<_>>(),
                )
            })
            .await?;
        if roster.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "No students in class {}.",
                class
            )));
        }
        Ok(roster)
    }

    pub async fn children(repo: &Repository, parent: UserIdentity) -> Children {
        repo.read(|c| Children {
            linked: c
                .find_students_by_parent(parent)
                .into_iter()
                .cloned()
                .collect(),
            pending: c
                .students
                .iter()
                .filter(|s| s.parent == ParentLink::Pending(parent))
                .cloned()
                .collect(),
        })
        .await
    }
}
