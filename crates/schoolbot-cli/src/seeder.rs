//! Fake data seeding.
//!
//! Generates students per class and unclaimed teacher records so that a fresh
//! data directory can be exercised through the bot straight away.

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use schoolbot_core::errors::AppError;
use schoolbot_db::Repository;
use schoolbot_models::{Student, Subject, Teacher, TeacherId};
use std::time::Instant;

const DEFAULT_CLASSES: [&str; 6] = [
    "Grade 1", "Grade 2", "Grade 3", "Grade 4", "Grade 5", "Grade 6",
];

const SUBJECTS: [&str; 8] = [
    "Math",
    "English",
    "Biology",
    "Chemistry",
    "Physics",
    "History",
    "Geography",
    "Art",
];

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub classes: Vec<String>,
    pub students_per_class: usize,
    pub teachers: usize,
}

impl SeedConfig {
    pub fn new(classes: Vec<String>, students_per_class: usize) -> Self {
        let classes = if classes.is_empty() {
            DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect()
        } else {
            classes
        };
        Self {
            classes,
            students_per_class,
            teachers: 0,
        }
    }

    pub fn with_teachers(mut self, teachers: usize) -> Self {
        self.teachers = teachers;
        self
    }
}

#[derive(Debug, Default)]
pub struct SeedReport {
    pub students: usize,
    pub teachers: Vec<TeacherId>,
}

fn fake_name() -> String {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    format!("{} {}", first, last)
}

/// Two distinct subjects per teacher, rotating through [`SUBJECTS`].
fn subjects_for(index: usize) -> Vec<Subject> {
    [index, index + 1]
        .iter()
        .filter_map(|i| Subject::new(SUBJECTS[i % SUBJECTS.len()]).ok())
        .collect()
}

/// Seed students and teachers in a single transaction.
pub async fn seed(repo: &Repository, config: SeedConfig) -> Result<SeedReport, AppError> {
    let start_time = Instant::now();
    println!(
        "📊 Seeding {} students ({} per class) and {} teachers...",
        config.classes.len() * config.students_per_class,
        config.students_per_class,
        config.teachers
    );

    let report = repo
        .transaction(|tx| {
            let mut report = SeedReport::default();
            for class in &config.classes {
                for _ in 0..config.students_per_class {
                    let id = tx.generate_student_id();
                    tx.insert_student(Student::new(id, fake_name(), class.clone()))?;
                    report.students += 1;
                }
            }
            for i in 0..config.teachers {
                let id = tx.generate_teacher_id();
                let mut teacher = Teacher::new(id, fake_name());
                teacher.subjects.extend(subjects_for(i));
                tx.insert_teacher(teacher)?;
                report.teachers.push(id);
            }
            Ok(report)
        })
        .await?;

    println!("   ✓ Seeded in {:?}", start_time.elapsed());
    Ok(report)
}
