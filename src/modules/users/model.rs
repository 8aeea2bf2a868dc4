use schoolbot_db::Collections;
use schoolbot_models::{Role, TeacherId, UserIdentity};

/// What a person may do, derived from their user record and teacher link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub identity: UserIdentity,
    pub role: Role,
    pub name: String,
    /// Linked teacher record, only when the role allows teaching.
    pub teacher: Option<TeacherId>,
    /// Has linked or pending children.
    pub parent: bool,
}

impl Capabilities {
    pub fn resolve(c: &Collections, identity: UserIdentity) -> Self {
        let user = c.find_user(identity);
        let role = user.map(|u| u.role).unwrap_or_default();
        let teacher = c
            .find_teacher_by_identity(identity)
            .filter(|_| matches!(role, Role::Teacher | Role::Admin))
            .map(|t| t.teacher_id);

        Self {
            identity,
            role,
            name: user.map(|u| u.display_name()).unwrap_or_default(),
            teacher,
            parent: user.is_some_and(|u| u.has_any_students()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_teacher(&self) -> bool {
        self.teacher.is_some()
    }
}
