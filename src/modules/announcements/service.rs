use schoolbot_core::errors::AppError;
use schoolbot_db::Repository;
use schoolbot_models::{StudentId, UserIdentity};
use tracing::{info, instrument};

use crate::modules::announcements::model::MessageDto;
use crate::modules::users::model::Capabilities;
use crate::notifications::{FanOut, Notifier, OutgoingMessage, notify_all, send_direct};
use crate::validator::validate_input;

pub struct AnnouncementService;

impl AnnouncementService {
    /// Send an announcement to every known user except the author.
    ///
    /// Undeliverable recipients are logged and counted, never reported as an
    /// error.
    #[instrument(skip(repo, notifier, text))]
    pub async fn broadcast(
        repo: &Repository,
        notifier: &dyn Notifier,
        actor: UserIdentity,
        text: &str,
    ) -> Result<FanOut, AppError> {
        let dto = MessageDto::new(text);
        validate_input(&dto)?;

        let recipients = repo
            .read(|c| {
                if !Capabilities::resolve(c, actor).is_admin() {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Only admins can do that."
                    )));
                }
                Ok(c.users
                    .iter()
                    .map(|u| u.identity)
                    .filter(|identity| *identity != actor)
                    .collect::<Vec<_>>())
            })
            .await?;

        let message = OutgoingMessage::text(format!("📢 Announcement\n\n{}", dto.text));
        let outcome = notify_all(notifier, recipients, &message).await;

        info!(delivered = outcome.delivered, failed = outcome.failed, "Announcement sent");
        Ok(outcome)
    }

    /// Forward a message from a teacher or admin to a student's parent.
    #[instrument(skip(repo, notifier, text))]
    pub async fn contact_parent(
        repo: &Repository,
        notifier: &dyn Notifier,
        actor: UserIdentity,
        student_id: StudentId,
        text: &str,
    ) -> Result<UserIdentity, AppError> {
        let dto = MessageDto::new(text);
        validate_input(&dto)?;

        let (sender, student_name, parent) = repo
            .read(|c| {
                let caps = Capabilities::resolve(c, actor);
                if !caps.is_teacher() && !caps.is_admin() {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Only teachers can contact parents."
                    )));
                }
                let student = c.find_student(student_id).ok_or_else(|| {
                    AppError::not_found(anyhow::anyhow!("No student with id {}.", student_id))
                })?;
                let parent = student.parent_id().ok_or_else(|| {
                    AppError::not_found(anyhow::anyhow!("{} has no linked parent.", student.name))
                })?;
                Ok((caps.name, student.name.clone(), parent))
            })
            .await?;

        let message = OutgoingMessage::text(format!(
            "Message from {} about {}:\n\n{}",
            sender, student_name, dto.text
        ));
        send_direct(notifier, parent, message).await?;

        info!(student_id = %student_id, parent = %parent, "Parent contacted");
        Ok(parent)
    }
}
