use schoolbot_models::{Student, StudentId};
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct NewStudentDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters."))]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "Class must be 1 to 32 characters."))]
    pub class: String,
}

impl NewStudentDto {
    pub fn new(name: &str, class: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            class: class.trim().to_string(),
        }
    }
}

/// A parent's children, split by link state.
#[derive(Debug, Clone, Default)]
pub struct Children {
    pub linked: Vec<Student>,
    pub pending: Vec<Student>,
}

impl Children {
    pub fn is_empty(&self) -> bool {
        self.linked.is_empty() && self.pending.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSummary {
    pub class: String,
    pub students: usize,
}

/// Result of removing a parent from every student.
#[derive(Debug, Clone, Default)]
pub struct UnbindReport {
    pub students: Vec<StudentId>,
    pub user_found: bool,
}
