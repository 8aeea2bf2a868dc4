//! # Schoolbot Models
//!
//! Domain models for the school bot: the three persisted collections
//! (users, students, teachers), their identifiers, and validated value types.
//!
//! # Modules
//!
//! - [`ids`]: Chat identities and collision-free 10-digit record ids
//! - [`users`]: Users and roles
//! - [`students`]: Students, parent links, grades, bulk import rows
//! - [`teachers`]: Teacher records and subject sets
//! - [`value_types`]: `Subject` and `Score`
//!
//! # Example
//!
//! ```ignore
//! use schoolbot_models::{Student, StudentId, Subject};
//!
//! let id = StudentId::generate(&mut rand::thread_rng(), |candidate| taken.contains(candidate));
//! let student = Student::new(id, "Ava", "Grade 5");
//! ```

pub mod ids;
pub mod students;
pub mod teachers;
pub mod users;
pub mod value_types;

pub use ids::{StudentId, TeacherId, UserIdentity};
pub use students::{Grade, ImportStudentDto, ParentLink, Student};
pub use teachers::Teacher;
pub use users::{Role, User};
pub use value_types::{Score, Subject, ValueTypeError};
