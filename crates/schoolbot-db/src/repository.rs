//! Entity repository: the owner of the users, students and teachers
//! collections.
//!
//! Reads take a short lock and clone what they need. Writes run inside
//! [`Repository::transaction`]: one writer at a time, applied to a working
//! copy, persisted collection by collection, and only then swapped in. A
//! closure that returns `Err` leaves memory and disk untouched. If a save
//! fails part way, the documents already written are rewritten from the
//! previous state so disk keeps matching memory.

use schoolbot_config::StorageConfig;
use schoolbot_core::errors::AppError;
use schoolbot_models::{
    ParentLink, Role, Student, StudentId, Teacher, TeacherId, User, UserIdentity,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::store::{JsonStore, StoreError};

/// In-memory image of the three collections.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub users: Vec<User>,
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
}

impl Collections {
    pub fn find_user(&self, identity: UserIdentity) -> Option<&User> {
        self.users.iter().find(|u| u.identity == identity)
    }

    pub fn find_student(&self, student_id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.student_id == student_id)
    }

    /// Students linked (not merely pending) to `identity`.
    pub fn find_students_by_parent(&self, identity: UserIdentity) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.parent == ParentLink::Linked(identity))
            .collect()
    }

    pub fn find_students_by_class(&self, class: &str) -> Vec<&Student> {
        self.students.iter().filter(|s| s.class == class).collect()
    }

    pub fn find_teacher(&self, teacher_id: TeacherId) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.teacher_id == teacher_id)
    }

    pub fn find_teacher_by_identity(&self, identity: UserIdentity) -> Option<&Teacher> {
        self.teachers
            .iter()
            .find(|t| t.identity == Some(identity))
    }

    pub fn list_admins(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.role == Role::Admin).collect()
    }

    /// Distinct class names in first-seen order.
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for student in &self.students {
            if !classes.iter().any(|c| c == &student.class) {
                classes.push(student.class.clone());
            }
        }
        classes
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    users: bool,
    students: bool,
    teachers: bool,
}

/// Mutable view over the working copy inside a transaction.
///
/// Every `*_mut` accessor and insert marks its collection dirty so that only
/// touched documents are rewritten on commit.
pub struct Tx<'a> {
    data: &'a mut Collections,
    dirty: Dirty,
}

impl<'a> Tx<'a> {
    fn new(data: &'a mut Collections) -> Self {
        Self {
            data,
            dirty: Dirty::default(),
        }
    }

    /// Read-only view of the working copy.
    pub fn view(&self) -> &Collections {
        self.data
    }

    pub fn user_mut(&mut self, identity: UserIdentity) -> Option<&mut User> {
        self.dirty.users = true;
        self.data.users.iter_mut().find(|u| u.identity == identity)
    }

    pub fn student_mut(&mut self, student_id: StudentId) -> Option<&mut Student> {
        self.dirty.students = true;
        self.data
            .students
            .iter_mut()
            .find(|s| s.student_id == student_id)
    }

    pub fn teacher_mut(&mut self, teacher_id: TeacherId) -> Option<&mut Teacher> {
        self.dirty.teachers = true;
        self.data
            .teachers
            .iter_mut()
            .find(|t| t.teacher_id == teacher_id)
    }

    pub fn students_mut(&mut self) -> impl Iterator<Item = &mut Student> {
        self.dirty.students = true;
        self.data.students.iter_mut()
    }

    pub fn insert_user(&mut self, user: User) -> Result<(), AppError> {
        if self.data.find_user(user.identity).is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "User {} already exists.",
                user.identity
            )));
        }
        self.dirty.users = true;
        self.data.users.push(user);
        Ok(())
    }

    /// Fetch the user or create a plain `user` record for them.
    pub fn ensure_user(&mut self, identity: UserIdentity, name: &str) -> &mut User {
        self.dirty.users = true;
        let pos = match self.data.users.iter().position(|u| u.identity == identity) {
            Some(pos) => pos,
            None => {
                self.data.users.push(User::new(identity, name));
                self.data.users.len() - 1
            }
        };
        &mut self.data.users[pos]
    }

    pub fn insert_student(&mut self, student: Student) -> Result<Student, AppError> {
        if self.data.find_student(student.student_id).is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Student {} already exists.",
                student.student_id
            )));
        }
        self.dirty.students = true;
        self.data.students.push(student.clone());
        Ok(student)
    }

    pub fn remove_student(&mut self, student_id: StudentId) -> Option<Student> {
        let pos = self
            .data
            .students
            .iter()
            .position(|s| s.student_id == student_id)?;
        self.dirty.students = true;
        Some(self.data.students.remove(pos))
    }

    pub fn insert_teacher(&mut self, teacher: Teacher) -> Result<Teacher, AppError> {
        if self.data.find_teacher(teacher.teacher_id).is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Teacher {} already exists.",
                teacher.teacher_id
            )));
        }
        self.dirty.teachers = true;
        self.data.teachers.push(teacher.clone());
        Ok(teacher)
    }

    /// Fresh student id, unique within the working copy.
    pub fn generate_student_id(&self) -> StudentId {
        let mut rng = rand::thread_rng();
        StudentId::generate(&mut rng, |candidate| {
            self.data.find_student(*candidate).is_some()
        })
    }

    /// Fresh teacher id, unique within the working copy.
    pub fn generate_teacher_id(&self) -> TeacherId {
        let mut rng = rand::thread_rng();
        TeacherId::generate(&mut rng, |candidate| {
            self.data.find_teacher(*candidate).is_some()
        })
    }
}

struct Stores {
    users: JsonStore<User>,
    students: JsonStore<Student>,
    teachers: JsonStore<Teacher>,
}

/// Serialized owner of the three collections.
#[derive(Clone)]
pub struct Repository {
    state: Arc<Mutex<Collections>>,
    stores: Arc<Stores>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("users", &self.stores.users.path())
            .field("students", &self.stores.students.path())
            .field("teachers", &self.stores.teachers.path())
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Load every collection from the configured data directory.
    #[instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
    pub async fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let stores = Stores {
            users: JsonStore::new(config.users_path(), "users"),
            students: JsonStore::new(config.students_path(), "students"),
            teachers: JsonStore::new(config.teachers_path(), "teachers"),
        };

        let collections = Collections {
            users: stores.users.load().await?,
            students: stores.students.load().await?,
            teachers: stores.teachers.load().await?,
        };

        info!(
            users = collections.users.len(),
            students = collections.students.len(),
            teachers = collections.teachers.len(),
            "Repository loaded"
        );

        Ok(Self {
            state: Arc::new(Mutex::new(collections)),
            stores: Arc::new(stores),
        })
    }

    /// Run `f` against a snapshot of the live collections.
    pub async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Collections) -> T,
    {
        let guard = self.state.lock().await;
        f(&guard)
    }

    /// Apply `f` as a single serialized, all-or-nothing mutation.
    pub async fn transaction<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Tx<'_>) -> Result<T, AppError>,
    {
        let mut guard = self.state.lock().await;
        let mut working = guard.clone();

        let (out, dirty) = {
            let mut tx = Tx::new(&mut working);
            let out = f(&mut tx)?;
            (out, tx.dirty)
        };

        self.persist(&guard, &working, dirty).await.map_err(|e| {
            error!(error = %e, "Failed to persist transaction, keeping previous state");
            AppError::internal(e)
        })?;

        *guard = working;
        Ok(out)
    }

    async fn persist(
        &self,
        previous: &Collections,
        data: &Collections,
        dirty: Dirty,
    ) -> Result<(), StoreError> {
        let mut written = Dirty::default();
        if let Err(e) = self.save_dirty(data, dirty, &mut written).await {
            self.restore(previous, written).await;
            return Err(e);
        }
        debug!(
            users = dirty.users,
            students = dirty.students,
            teachers = dirty.teachers,
            "Transaction committed"
        );
        Ok(())
    }

    async fn save_dirty(
        &self,
        data: &Collections,
        dirty: Dirty,
        written: &mut Dirty,
    ) -> Result<(), StoreError> {
        if dirty.users {
            self.stores.users.save(&data.users).await?;
            written.users = true;
        }
        if dirty.students {
            self.stores.students.save(&data.students).await?;
            written.students = true;
        }
        if dirty.teachers {
            self.stores.teachers.save(&data.teachers).await?;
            written.teachers = true;
        }
        Ok(())
    }

    /// Put back the documents a failed commit already overwrote.
    async fn restore(&self, previous: &Collections, written: Dirty) {
        let mut results = Vec::new();
        if written.users {
            results.push(("users", self.stores.users.save(&previous.users).await));
        }
        if written.students {
            results.push(("students", self.stores.students.save(&previous.students).await));
        }
        if written.teachers {
            results.push(("teachers", self.stores.teachers.save(&previous.teachers).await));
        }
        for (collection, result) in results {
            match result {
                Ok(()) => warn!(collection, "Rolled back partially committed document"),
                Err(e) => error!(
                    collection,
                    error = %e,
                    "Could not roll back document, disk is ahead of memory"
                ),
            }
        }
    }

    pub async fn find_user(&self, identity: UserIdentity) -> Option<User> {
        self.read(|c| c.find_user(identity).cloned()).await
    }

    pub async fn find_student(&self, student_id: StudentId) -> Option<Student> {
        self.read(|c| c.find_student(student_id).cloned()).await
    }

    pub async fn find_students_by_parent(&self, identity: UserIdentity) -> Vec<Student> {
        self.read(|c| {
            c.find_students_by_parent(identity)
                .into_iter()
                .cloned()
                .collect()
        })
        .await
    }

    pub async fn find_teacher(&self, teacher_id: TeacherId) -> Option<Teacher> {
        self.read(|c| c.find_teacher(teacher_id).cloned()).await
    }

    pub async fn find_teacher_by_identity(&self, identity: UserIdentity) -> Option<Teacher> {
        self.read(|c| c.find_teacher_by_identity(identity).cloned())
            .await
    }

    pub async fn list_admins(&self) -> Vec<User> {
        self.read(|c| c.list_admins().into_iter().cloned().collect())
            .await
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.read(|c| c.users.clone()).await
    }

    pub async fn list_students(&self) -> Vec<Student> {
        self.read(|c| c.students.clone()).await
    }

    pub async fn list_teachers(&self) -> Vec<Teacher> {
        self.read(|c| c.teachers.clone()).await
    }

    pub async fn find_students_by_class(&self, class: &str) -> Vec<Student> {
        self.read(|c| {
            c.find_students_by_class(class)
                .into_iter()
                .cloned()
                .collect()
        })
        .await
    }

    pub async fn snapshot(&self) -> Collections {
        self.read(|c| c.clone()).await
    }
}
