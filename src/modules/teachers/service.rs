use schoolbot_core::errors::AppError;
use schoolbot_db::Repository;
use schoolbot_models::{Teacher, UserIdentity};
use tracing::{info, instrument};

use crate::modules::teachers::model::NewTeacherDto;
use crate::modules::users::service::ensure_admin;
use crate::validator::validate_input;

pub struct TeacherService;

impl TeacherService {
    /// Create an unclaimed teacher record; its id is handed to the teacher
    /// out of band and later used to claim it.
    #[instrument(skip(repo))]
    pub async fn add_teacher(
        repo: &Repository,
        actor: UserIdentity,
        name: &str,
    ) -> Result<Teacher, AppError> {
        let dto = NewTeacherDto::new(name);
        validate_input(&dto)?;

        let teacher = repo
            .transaction(|tx| {
                ensure_admin(tx.view(), actor)?;
                let teacher_id = tx.generate_teacher_id();
                tx.insert_teacher(Teacher::new(teacher_id, dto.name))
            })
            .await?;

        info!(teacher_id = %teacher.teacher_id, "Teacher record added");
        Ok(teacher)
    }

    /// The teacher record claimed by `identity`.
    pub async fn linked_teacher(
        repo: &Repository,
        identity: UserIdentity,
    ) -> Result<Teacher, AppError> {
        repo.find_teacher_by_identity(identity)
            .await
            .ok_or_else(|| {
                AppError::forbidden(anyhow::anyhow!("You are not registered as a teacher."))
            })
    }
}
