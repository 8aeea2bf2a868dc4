pub mod announcements;
pub mod approvals;
pub mod grades;
pub mod students;
pub mod teachers;
pub mod users;
pub mod webhook;
