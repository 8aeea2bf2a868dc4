//! Admin bootstrap and data directory statistics.

use schoolbot_core::errors::AppError;
use schoolbot_db::{Collections, Repository};
use schoolbot_models::{ParentLink, Role, User, UserIdentity};

/// Grant the admin role to `identity`, creating the user if needed.
pub async fn create_admin(
    repo: &Repository,
    identity: UserIdentity,
    name: &str,
) -> Result<User, AppError> {
    repo.transaction(|tx| {
        let user = tx.ensure_user(identity, name);
        if user.name.trim().is_empty() {
            user.name = name.to_string();
        }
        user.role = Role::Admin;
        Ok(user.clone())
    })
    .await
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub users: usize,
    pub admins: usize,
    pub teachers_linked: usize,
    pub parents: usize,
    pub students: usize,
    pub students_linked: usize,
    pub students_pending: usize,
    pub teachers: usize,
    pub classes: usize,
}

impl Stats {
    pub fn collect(c: &Collections) -> Self {
        Self {
            users: c.users.len(),
            admins: c.users.iter().filter(|u| u.role == Role::Admin).count(),
            teachers_linked: c.teachers.iter().filter(|t| t.identity.is_some()).count(),
            parents: c.users.iter().filter(|u| u.role == Role::Parent).count(),
            students: c.students.len(),
            students_linked: c
                .students
                .iter()
                .filter(|s| matches!(s.parent, ParentLink::Linked(_)))
                .count(),
            students_pending: c
                .students
                .iter()
                .filter(|s| matches!(s.parent, ParentLink::Pending(_)))
                .count(),
            teachers: c.teachers.len(),
            classes: c.classes().len(),
        }
    }
}
