use schoolbot_config::BotConfig;
use schoolbot_core::errors::AppError;
use schoolbot_db::{Collections, Repository};
use schoolbot_models::{Role, User, UserIdentity};
use tracing::{info, instrument, warn};

use crate::modules::users::model::Capabilities;

/// Fail unless `actor` currently holds the admin role.
///
/// Meant to be called inside a transaction so the check and the mutation see
/// the same state.
pub fn ensure_admin(c: &Collections, actor: UserIdentity) -> Result<(), AppError> {
    match c.find_user(actor) {
        Some(user) if user.is_admin() => Ok(()),
        _ => Err(AppError::forbidden(anyhow::anyhow!(
            "Only admins can do that."
        ))),
    }
}

/// A `user` who gains a child becomes a `parent`; other roles are kept.
pub fn grant_parent_role(user: &mut User) {
    if user.role == Role::User {
        user.role = Role::Parent;
    }
}

/// A `parent` left without linked or pending children falls back to `user`.
pub fn settle_parent_role(user: &mut User) {
    if user.role == Role::Parent && !user.has_any_students() {
        user.role = Role::User;
    }
}

pub struct UserService;

impl UserService {
    /// Record a person on first contact and keep their display name fresh.
    #[instrument(skip(repo))]
    pub async fn register(
        repo: &Repository,
        identity: UserIdentity,
        name: &str,
    ) -> Result<User, AppError> {
        if let Some(user) = repo.find_user(identity).await {
            if name.is_empty() || user.name == name {
                return Ok(user);
            }
        }

        repo.transaction(|tx| {
            let user = tx.ensure_user(identity, name);
            if !name.is_empty() {
                user.name = name.to_string();
            }
            Ok(user.clone())
        })
        .await
    }

    pub async fn capabilities(repo: &Repository, identity: UserIdentity) -> Capabilities {
        repo.read(|c| Capabilities::resolve(c, identity)).await
    }

    pub async fn require_admin(repo: &Repository, identity: UserIdentity) -> Result<(), AppError> {
        repo.read(|c| ensure_admin(c, identity)).await
    }

    /// Grant the admin role to whoever knows the shared secret.
    #[instrument(skip(repo, config, code))]
    pub async fn login_admin(
        repo: &Repository,
        config: &BotConfig,
        identity: UserIdentity,
        name: &str,
        code: &str,
    ) -> Result<User, AppError> {
        if !config.is_admin_code(code) {
            warn!(identity = %identity, "Wrong admin code");
            return Err(AppError::forbidden(anyhow::anyhow!("Invalid admin code.")));
        }

        let user = repo
            .transaction(|tx| {
                let user = tx.ensure_user(identity, name);
                user.role = Role::Admin;
                Ok(user.clone())
            })
            .await?;

        info!(identity = %identity, "Admin login");
        Ok(user)
    }

    /// Make an existing, non-admin user an admin.
    #[instrument(skip(repo))]
    pub async fn promote(
        repo: &Repository,
        actor: UserIdentity,
        target: UserIdentity,
    ) -> Result<User, AppError> {
        repo.transaction(|tx| {
            ensure_admin(tx.view(), actor)?;
            let user = tx.user_mut(target).ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("No user with id {}.", target))
            })?;
            if user.is_admin() {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "{} is already an admin.",
                    user.display_name()
                )));
            }
            user.role = Role::Admin;
            Ok(user.clone())
        })
        .await
    }

    /// Take the admin role away from another admin.
    ///
    /// The new role is derived from what the user still has: a claimed
    /// teacher record, then children, then nothing.
    #[instrument(skip(repo))]
    pub async fn demote(
        repo: &Repository,
        actor: UserIdentity,
        target: UserIdentity,
    ) -> Result<User, AppError> {
        if actor == target {
            return Err(AppError::conflict(anyhow::anyhow!(
                "You cannot remove your own admin role."
            )));
        }

        repo.transaction(|tx| {
            ensure_admin(tx.view(), actor)?;
            let linked_to_teacher = tx.view().find_teacher_by_identity(target).is_some();
            let user = tx.user_mut(target).ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("No user with id {}.", target))
            })?;
            if !user.is_admin() {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "{} is not an admin.",
                    user.display_name()
                )));
            }
            user.role = user.derived_role(linked_to_teacher);
            Ok(user.clone())
        })
        .await
    }
}
