//! Bulk student import.
//!
//! Rows are applied inside one repository transaction. Invalid rows are
//! reported back and skipped; a row naming an unknown parent is imported
//! without a link.

use schoolbot_models::{ImportStudentDto, ParentLink, Role, Student, UserIdentity};
use tracing::warn;
use validator::Validate;

use crate::repository::Tx;

/// A row that was not imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRejection {
    /// 1-based row number in the document.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub created: Vec<Student>,
    pub linked: usize,
    pub rejected: Vec<ImportRejection>,
}

/// Insert every valid row as a new student with a freshly generated id.
///
/// Rows carrying a `parent_id` of an existing user are linked directly, since
/// the import itself is an admin action.
pub fn apply_import(tx: &mut Tx<'_>, rows: Vec<ImportStudentDto>) -> ImportReport {
    let mut report = ImportReport::default();

    for (idx, row) in rows.into_iter().enumerate() {
        let row_no = idx + 1;

        if let Err(e) = row.validate() {
            report.rejected.push(ImportRejection {
                row: row_no,
                reason: e.to_string(),
            });
            continue;
        }

        let name = row.name.trim();
        let class = row.class.trim();
        if name.is_empty() || class.is_empty() {
            report.rejected.push(ImportRejection {
                row: row_no,
                reason: "name and class cannot be blank".to_string(),
            });
            continue;
        }

        let student_id = tx.generate_student_id();
        let mut student = Student::new(student_id, name, class);
        student.schedule = row
            .schedule
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if let Some(raw) = row.parent_id {
            let parent = UserIdentity(raw);
            match tx.user_mut(parent) {
                Some(user) => {
                    user.student_ids.insert(student_id);
                    if user.role == Role::User {
                        user.role = Role::Parent;
                    }
                    student.parent = ParentLink::Linked(parent);
                    report.linked += 1;
                }
                None => {
                    warn!(row = row_no, parent = %parent, "Import row names an unknown parent, importing unlinked");
                }
            }
        }

        match tx.insert_student(student) {
            Ok(student) => report.created.push(student),
            Err(e) => report.rejected.push(ImportRejection {
                row: row_no,
                reason: e.error.to_string(),
            }),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Repository;
    use schoolbot_config::StorageConfig;
    use schoolbot_models::User;

    #[tokio::test]
    async fn test_import_links_known_parents_and_skips_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(&StorageConfig {
            data_dir: dir.path().to_path_buf(),
        })
        .await
        .unwrap();

        repo.transaction(|tx| tx.insert_user(User::new(UserIdentity(42), "Mum")))
            .await
            .unwrap();

        let rows = ImportStudentDto::parse_document(
            br#"[
                {"name": "Ava", "class": "5A", "parent_id": 42, "schedule": "Mon: Math"},
                {"name": "   ", "class": "5A"},
                {"name": "Ben", "class": "5B", "parent_id": "777"}
            ]"#,
        )
        .unwrap();

        let report = repo
            .transaction(|tx| Ok(apply_import(tx, rows)))
            .await
            .unwrap();

        assert_eq!(report.created.len(), 2);
        assert_eq!(report.linked, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].row, 2);

        let ava = &report.created[0];
        assert_eq!(ava.parent, ParentLink::Linked(UserIdentity(42)));
        assert_eq!(ava.schedule.as_deref(), Some("Mon: Math"));
        assert_eq!(report.created[1].parent, ParentLink::None);

        let mum = repo.find_user(UserIdentity(42)).await.unwrap();
        assert_eq!(mum.role, Role::Parent);
        assert!(mum.student_ids.contains(&ava.student_id));
    }
}
