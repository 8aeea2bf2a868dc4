use chrono::Utc;
use schoolbot_core::errors::AppError;
use schoolbot_db::{Collections, Repository};
use schoolbot_models::{Grade, Score, Student, StudentId, Subject, UserIdentity};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::grades::model::GradePurposeDto;
use crate::modules::users::model::Capabilities;
use crate::validator::validate_input;

fn student_not_found(student_id: StudentId) -> AppError {
    AppError::not_found(anyhow::anyhow!("No student with id {}.", student_id))
}

/// Verified subjects of the teacher linked to `identity`.
fn verified_subjects(c: &Collections, identity: UserIdentity) -> Result<Vec<Subject>, AppError> {
    let not_teacher =
        || AppError::forbidden(anyhow::anyhow!("You are not registered as a teacher."));
    let teacher_id = Capabilities::resolve(c, identity)
        .teacher
        .ok_or_else(not_teacher)?;
    let teacher = c.find_teacher(teacher_id).ok_or_else(not_teacher)?;
    Ok(teacher.subjects.iter().cloned().collect())
}

fn ensure_teaches(c: &Collections, identity: UserIdentity, subject: &Subject) -> Result<(), AppError> {
    if verified_subjects(c, identity)?.contains(subject) {
        Ok(())
    } else {
        Err(AppError::forbidden(anyhow::anyhow!(
            "You do not teach {}.",
            subject
        )))
    }
}

pub struct GradeService;

impl GradeService {
    /// Subjects the teacher may grade in; fails when there are none.
    pub async fn teaching_subjects(
        repo: &Repository,
        identity: UserIdentity,
    ) -> Result<Vec<Subject>, AppError> {
        let subjects = repo.read(|c| verified_subjects(c, identity)).await?;
        if subjects.is_empty() {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "You have no verified subjects yet. Use \"Request subject\" first."
            )));
        }
        Ok(subjects)
    }

    pub async fn student(repo: &Repository, student_id: StudentId) -> Result<Student, AppError> {
        repo.find_student(student_id)
            .await
            .ok_or_else(|| student_not_found(student_id))
    }

    /// Grades of one subject, oldest first.
    pub async fn grades(
        repo: &Repository,
        student_id: StudentId,
        subject: &Subject,
    ) -> Result<Vec<Grade>, AppError> {
        let student = Self::student(repo, student_id).await?;
        Ok(student.grades.get(subject).cloned().unwrap_or_default())
    }

    #[instrument(skip(repo, purpose))]
    pub async fn add_grade(
        repo: &Repository,
        identity: UserIdentity,
        student_id: StudentId,
        subject: &Subject,
        score: Score,
        purpose: &str,
    ) -> Result<Grade, AppError> {
        let dto = GradePurposeDto::new(purpose);
        validate_input(&dto)?;

        let grade = repo
            .transaction(|tx| {
                ensure_teaches(tx.view(), identity, subject)?;
                let student = tx
                    .student_mut(student_id)
                    .ok_or_else(|| student_not_found(student_id))?;
                let grade = Grade::new(score, dto.purpose, Utc::now());
                student
                    .grades
                    .entry(subject.clone())
                    .or_default()
                    .push(grade.clone());
                Ok(grade)
            })
            .await?;

        info!(student_id = %student_id, subject = %subject, grade_id = %grade.grade_id, "Grade added");
        Ok(grade)
    }

    /// Overwrite score, purpose and date of one grade, keeping its position.
    #[instrument(skip(repo, purpose))]
    pub async fn edit_grade(
        repo: &Repository,
        identity: UserIdentity,
        student_id: StudentId,
        subject: &Subject,
        grade_id: Uuid,
        score: Score,
        purpose: &str,
    ) -> Result<Grade, AppError> {
        let dto = GradePurposeDto::new(purpose);
        validate_input(&dto)?;

        let grade = repo
            .transaction(|tx| {
                ensure_teaches(tx.view(), identity, subject)?;
                let student = tx
                    .student_mut(student_id)
                    .ok_or_else(|| student_not_found(student_id))?;
                let grade = student
                    .grades
                    .get_mut(subject)
                    .and_then(|list| list.iter_mut().find(|g| g.grade_id == grade_id))
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Grade not found.")))?;
                grade.score = score;
                grade.purpose = dto.purpose;
                grade.date = Utc::now();
                Ok(grade.clone())
            })
            .await?;

        info!(student_id = %student_id, subject = %subject, grade_id = %grade_id, "Grade edited");
        Ok(grade)
    }

    /// Give the student an (empty) grade list for the subject.
    ///
    /// Returns `false` when the student was already enrolled.
    #[instrument(skip(repo))]
    pub async fn enroll(
        repo: &Repository,
        identity: UserIdentity,
        student_id: StudentId,
        subject: &Subject,
    ) -> Result<bool, AppError> {
        repo.transaction(|tx| {
            ensure_teaches(tx.view(), identity, subject)?;
            let student = tx
                .student_mut(student_id)
                .ok_or_else(|| student_not_found(student_id))?;
            if student.is_enrolled(subject) {
                return Ok(false);
            }
            student.grades.insert(subject.clone(), Vec::new());
            Ok(true)
        })
        .await
    }
}
