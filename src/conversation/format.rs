//! Plain-text rendering of records for replies.

use schoolbot_models::{Grade, ParentLink, Student};

pub fn grade_line(grade: &Grade) -> String {
    format!(
        "{} - {} ({})",
        grade.score,
        grade.purpose,
        grade.date.format("%Y-%m-%d")
    )
}

pub fn student_line(student: &Student) -> String {
    let parent = match student.parent {
        ParentLink::None => "no parent".to_string(),
        ParentLink::Pending(p) => format!("parent {} pending", p),
        ParentLink::Linked(p) => format!("parent {}", p),
    };
    format!(
        "{} ({}) - class {}, {}",
        student.name, student.student_id, student.class, parent
    )
}

/// Every subject with its grades, or a note when there are none.
pub fn report_card(student: &Student) -> String {
    let mut out = format!("{} ({})", student.name, student.class);
    if student.grades.is_empty() {
        out.push_str("\n  No grades yet.");
        return out;
    }
    for (subject, grades) in &student.grades {
        out.push_str(&format!("\n  {}:", subject));
        if grades.is_empty() {
            out.push_str(" no grades yet");
        }
        for grade in grades {
            out.push_str(&format!("\n    {}", grade_line(grade)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use schoolbot_models::{Score, StudentId, Subject, UserIdentity};

    #[test]
    fn test_report_card_lists_subjects_in_order() {
        let mut student = Student::new(StudentId::new(1_000_000_000).unwrap(), "Ava", "5A");
        student.parent = ParentLink::Pending(UserIdentity(3));
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        student.grades.insert(
            Subject::new("Math").unwrap(),
            vec![Grade::new(Score::new(90).unwrap(), "Quiz", date)],
        );
        student.grades.insert(Subject::new("Art").unwrap(), Vec::new());

        assert_eq!(
            report_card(&student),
            "Ava (5A)\n  Art: no grades yet\n  Math:\n    90 - Quiz (2026-03-01)"
        );
        assert!(student_line(&student).ends_with("parent 3 pending"));
    }
}
