//! Button payload schema.
//!
//! Payloads come back from the chat client untrusted. They are parsed into a
//! [`CallbackCommand`] and every referenced record is re-checked against the
//! repository before anything changes.
//!
//! ```text
//! approve_parent_<identity>_<student_id>    deny_parent_<identity>_<student_id>
//! approve_teacher_<identity>_<teacher_id>   deny_teacher_<identity>_<teacher_id>
//! approve_subject_<teacher_id>_<subject>    deny_subject_<teacher_id>_<subject>
//! select_subject_<subject>  select_grade_<uuid>  grade_add  grade_edit  cancel
//! ```
//!
//! Subjects are written with spaces replaced by `_`; subject names cannot
//! contain `_` themselves, so the encoding is unambiguous.

use schoolbot_models::{StudentId, Subject, TeacherId, UserIdentity};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackCommand {
    ApproveParent {
        parent: UserIdentity,
        student: StudentId,
    },
    DenyParent {
        parent: UserIdentity,
        student: StudentId,
    },
    ApproveTeacher {
        identity: UserIdentity,
        teacher: TeacherId,
    },
    DenyTeacher {
        identity: UserIdentity,
        teacher: TeacherId,
    },
    ApproveSubject {
        teacher: TeacherId,
        subject: Subject,
    },
    DenySubject {
        teacher: TeacherId,
        subject: Subject,
    },
    SelectSubject(Subject),
    SelectGrade(Uuid),
    GradeAdd,
    GradeEdit,
    Cancel,
}

impl CallbackCommand {
    pub fn encode(&self) -> String {
        match self {
            Self::ApproveParent { parent, student } => format!("approve_parent_{parent}_{student}"),
            Self::DenyParent { parent, student } => format!("deny_parent_{parent}_{student}"),
            Self::ApproveTeacher { identity, teacher } => {
                format!("approve_teacher_{identity}_{teacher}")
            }
            Self::DenyTeacher { identity, teacher } => format!("deny_teacher_{identity}_{teacher}"),
            Self::ApproveSubject { teacher, subject } => {
                format!("approve_subject_{teacher}_{}", subject.to_payload())
            }
            Self::DenySubject { teacher, subject } => {
                format!("deny_subject_{teacher}_{}", subject.to_payload())
            }
            Self::SelectSubject(subject) => format!("select_subject_{}", subject.to_payload()),
            Self::SelectGrade(grade_id) => format!("select_grade_{grade_id}"),
            Self::GradeAdd => "grade_add".to_string(),
            Self::GradeEdit => "grade_edit".to_string(),
            Self::Cancel => "cancel".to_string(),
        }
    }

    /// Approval buttons live on admin notifications and are handled whatever
    /// scene the admin is in.
    pub fn is_approval(&self) -> bool {
        matches!(
            self,
            Self::ApproveParent { .. }
                | Self::DenyParent { .. }
                | Self::ApproveTeacher { .. }
                | Self::DenyTeacher { .. }
                | Self::ApproveSubject { .. }
                | Self::DenySubject { .. }
        )
    }

    pub fn is_approve(&self) -> bool {
        matches!(
            self,
            Self::ApproveParent { .. } | Self::ApproveTeacher { .. } | Self::ApproveSubject { .. }
        )
    }
}

/// Payload that does not decode to any command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised callback payload '{0}'")]
pub struct UnknownCallback(pub String);

fn pair<A: FromStr, B: FromStr>(rest: &str) -> Option<(A, B)> {
    let (a, b) = rest.split_once('_')?;
    Some((a.parse().ok()?, b.parse().ok()?))
}

fn teacher_and_subject(rest: &str) -> Option<(TeacherId, Subject)> {
    let (teacher, subject) = rest.split_once('_')?;
    Some((teacher.parse().ok()?, Subject::from_payload(subject).ok()?))
}

impl FromStr for CallbackCommand {
    type Err = UnknownCallback;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let parsed = match payload {
            "grade_add" => Some(Self::GradeAdd),
            "grade_edit" => Some(Self::GradeEdit),
            "cancel" => Some(Self::Cancel),
            _ => {
                if let Some(rest) = payload.strip_prefix("approve_parent_") {
                    pair(rest).map(|(parent, student)| Self::ApproveParent { parent, student })
                } else if let Some(rest) = payload.strip_prefix("deny_parent_") {
                    pair(rest).map(|(parent, student)| Self::DenyParent { parent, student })
                } else if let Some(rest) = payload.strip_prefix("approve_teacher_") {
                    pair(rest).map(|(identity, teacher)| Self::ApproveTeacher { identity, teacher })
                } else if let Some(rest) = payload.strip_prefix("deny_teacher_") {
                    pair(rest).map(|(identity, teacher)| Self::DenyTeacher { identity, teacher })
                } else if let Some(rest) = payload.strip_prefix("approve_subject_") {
                    teacher_and_subject(rest)
                        .map(|(teacher, subject)| Self::ApproveSubject { teacher, subject })
                } else if let Some(rest) = payload.strip_prefix("deny_subject_") {
                    teacher_and_subject(rest)
                        .map(|(teacher, subject)| Self::DenySubject { teacher, subject })
                } else if let Some(rest) = payload.strip_prefix("select_subject_") {
                    Subject::from_payload(rest).ok().map(Self::SelectSubject)
                } else if let Some(rest) = payload.strip_prefix("select_grade_") {
                    Uuid::parse_str(rest).ok().map(Self::SelectGrade)
                } else {
                    None
                }
            }
        };

        parsed.ok_or_else(|| UnknownCallback(payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid() -> StudentId {
        StudentId::new(1_234_567_890).unwrap()
    }

    fn tid() -> TeacherId {
        TeacherId::new(9_876_543_210).unwrap()
    }

    #[test]
    fn test_parent_payloads() {
        let cmd: CallbackCommand = "approve_parent_42_1234567890".parse().unwrap();
        assert_eq!(
            cmd,
            CallbackCommand::ApproveParent {
                parent: UserIdentity(42),
                student: sid()
            }
        );
        assert!(cmd.is_approval());

        let negative = CallbackCommand::DenyParent {
            parent: UserIdentity(-100_200),
            student: sid(),
        };
        assert_eq!(negative.encode(), "deny_parent_-100200_1234567890");
        assert_eq!(negative.encode().parse::<CallbackCommand>().unwrap(), negative);
    }

    #[test]
    fn test_subject_payload_with_spaces() {
        let cmd = CallbackCommand::ApproveSubject {
            teacher: tid(),
            subject: Subject::new("World History").unwrap(),
        };
        let payload = cmd.encode();
        assert_eq!(payload, "approve_subject_9876543210_World_History");
        assert!(payload.len() <= 64);
        assert_eq!(payload.parse::<CallbackCommand>().unwrap(), cmd);
    }

    #[test]
    fn test_longest_subjects_fit_the_payload_budget() {
        for name in ["x".repeat(32), "é".repeat(18), "Всемирная история".to_string()] {
            let subject = Subject::new(&name).unwrap();
            let payload = CallbackCommand::ApproveSubject {
                teacher: tid(),
                subject,
            }
            .encode();
            assert!(payload.len() <= 64, "{payload} is {} bytes", payload.len());
        }
    }

    #[test]
    fn test_scene_buttons() {
        let grade_id = Uuid::new_v4();
        let cmd: CallbackCommand = format!("select_grade_{grade_id}").parse().unwrap();
        assert_eq!(cmd, CallbackCommand::SelectGrade(grade_id));
        assert!(!cmd.is_approval());
        assert_eq!(
            "select_subject_Math".parse::<CallbackCommand>().unwrap(),
            CallbackCommand::SelectSubject(Subject::new("Math").unwrap())
        );
        assert_eq!(
            "grade_edit".parse::<CallbackCommand>().unwrap(),
            CallbackCommand::GradeEdit
        );
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        for payload in [
            "",
            "approve_parent_42",
            "approve_parent_x_1234567890",
            "approve_parent_42_123",
            "approve_teacher_42_12345678901",
            "deny_subject_9876543210_",
            "select_grade_not-a-uuid",
            "launch_missiles",
        ] {
            assert!(
                payload.parse::<CallbackCommand>().is_err(),
                "{payload} should not parse"
            );
        }
    }
}
