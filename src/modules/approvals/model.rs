use schoolbot_models::{Student, Subject, Teacher, UserIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Deny,
}

impl Decision {
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Deny => "denied",
        }
    }
}

/// A freshly filed parent-link request and who must review it.
#[derive(Debug, Clone)]
pub struct ParentLinkRequest {
    pub parent: UserIdentity,
    pub parent_name: String,
    pub student: Student,
    pub admins: Vec<UserIdentity>,
}

#[derive(Debug, Clone)]
pub struct TeacherClaimRequest {
    pub identity: UserIdentity,
    pub name: String,
    pub teacher: Teacher,
    pub admins: Vec<UserIdentity>,
}

#[derive(Debug, Clone)]
pub struct SubjectRequest {
    pub teacher: Teacher,
    pub subject: Subject,
    pub admins: Vec<UserIdentity>,
}
