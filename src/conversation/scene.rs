//! The closed set of conversation scenes and their field contract.
//!
//! Each scene declares which session fields it reads, which it writes, which
//! scenes it may hand over to, and which fields are cleared when the
//! conversation leaves it. Handing over (`Transition::Enter`) keeps fields;
//! leaving clears exactly `clears`. A scene's `clears` therefore covers every
//! field that can be set while it is active, including fields inherited from
//! earlier scenes of the same chain.

use super::session::{Field, SessionFields};
use crate::notifications::OutgoingMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    AdminLogin,
    ParentLink,
    TeacherClaim,

    AddStudentName,
    AddStudentClass,
    ImportStudents,
    AddTeacher,
    DeleteStudent,
    UnlinkStudent,
    UnbindParent,
    PromoteAdmin,
    DemoteAdmin,
    ClassRoster,
    ScheduleClass,
    ScheduleText,
    Broadcast,

    RequestSubject,
    GradeStudent,
    GradeSubject,
    GradeAction,
    GradeSelect,
    GradeScore,
    GradePurpose,
    EnrollStudent,
    EnrollSubject,
    ContactStudent,
    ContactMessage,
}

#[derive(Debug, Clone, Copy)]
pub struct SceneSpec {
    pub reads: &'static [Field],
    pub writes: &'static [Field],
    pub clears: &'static [Field],
    pub next: &'static [Scene],
}

const NONE: &[Field] = &[];
const GRADE_FIELDS: &[Field] = &[Field::StudentId, Field::Subject, Field::GradeId, Field::Score];

impl SceneSpec {
    const fn single() -> Self {
        Self {
            reads: NONE,
            writes: NONE,
            clears: NONE,
            next: &[],
        }
    }
}

impl Scene {
    pub const ALL: [Scene; 27] = [
        Scene::AdminLogin,
        Scene::ParentLink,
        Scene::TeacherClaim,
        Scene::AddStudentName,
        Scene::AddStudentClass,
        Scene::ImportStudents,
        Scene::AddTeacher,
        Scene::DeleteStudent,
        Scene::UnlinkStudent,
        Scene::UnbindParent,
        Scene::PromoteAdmin,
        Scene::DemoteAdmin,
        Scene::ClassRoster,
        Scene::ScheduleClass,
        Scene::ScheduleText,
        Scene::Broadcast,
        Scene::RequestSubject,
        Scene::GradeStudent,
        Scene::GradeSubject,
        Scene::GradeAction,
        Scene::GradeSelect,
        Scene::GradeScore,
        Scene::GradePurpose,
        Scene::EnrollStudent,
        Scene::EnrollSubject,
        Scene::ContactStudent,
        Scene::ContactMessage,
    ];

    pub fn spec(self) -> SceneSpec {
        match self {
            Scene::AddStudentName => SceneSpec {
                reads: NONE,
                writes: &[Field::StudentName],
                clears: &[Field::StudentName],
                next: &[Scene::AddStudentClass],
            },
            Scene::AddStudentClass => SceneSpec {
                reads: &[Field::StudentName],
                writes: NONE,
                clears: &[Field::StudentName],
                next: &[],
            },
            Scene::ScheduleClass => SceneSpec {
                reads: NONE,
                writes: &[Field::ClassName],
                clears: &[Field::ClassName],
                next: &[Scene::ScheduleText],
            },
            Scene::ScheduleText => SceneSpec {
                reads: &[Field::ClassName],
                writes: NONE,
                clears: &[Field::ClassName],
                next: &[],
            },
            Scene::GradeStudent => SceneSpec {
                reads: NONE,
                writes: &[Field::StudentId],
                clears: GRADE_FIELDS,
                next: &[Scene::GradeSubject],
            },
            Scene::GradeSubject => SceneSpec {
                reads: &[Field::StudentId],
                writes: &[Field::Subject],
                clears: GRADE_FIELDS,
                next: &[Scene::GradeAction],
            },
            Scene::GradeAction => SceneSpec {
                reads: &[Field::StudentId, Field::Subject],
                writes: NONE,
                clears: GRADE_FIELDS,
                next: &[Scene::GradeScore, Scene::GradeSelect],
            },
            Scene::GradeSelect => SceneSpec {
                reads: &[Field::StudentId, Field::Subject],
                writes: &[Field::GradeId],
                clears: GRADE_FIELDS,
                next: &[Scene::GradeScore],
            },
            Scene::GradeScore => SceneSpec {
                reads: &[Field::StudentId, Field::Subject],
                writes: &[Field::Score],
                clears: GRADE_FIELDS,
                next: &[Scene::GradePurpose],
            },
            // GradeId is only present on the edit path
            Scene::GradePurpose => SceneSpec {
                reads: &[Field::StudentId, Field::Subject, Field::Score],
                writes: NONE,
                clears: GRADE_FIELDS,
                next: &[],
            },
            Scene::EnrollStudent => SceneSpec {
                reads: NONE,
                writes: &[Field::StudentId],
                clears: &[Field::StudentId],
                next: &[Scene::EnrollSubject],
            },
            Scene::EnrollSubject => SceneSpec {
                reads: &[Field::StudentId],
                writes: NONE,
                clears: &[Field::StudentId],
                next: &[],
            },
            Scene::ContactStudent => SceneSpec {
                reads: NONE,
                writes: &[Field::StudentId],
                clears: &[Field::StudentId],
                next: &[Scene::ContactMessage],
            },
            Scene::ContactMessage => SceneSpec {
                reads: &[Field::StudentId],
                writes: NONE,
                clears: &[Field::StudentId],
                next: &[],
            },
            Scene::AdminLogin
            | Scene::ParentLink
            | Scene::TeacherClaim
            | Scene::ImportStudents
            | Scene::AddTeacher
            | Scene::DeleteStudent
            | Scene::UnlinkStudent
            | Scene::UnbindParent
            | Scene::PromoteAdmin
            | Scene::DemoteAdmin
            | Scene::ClassRoster
            | Scene::Broadcast
            | Scene::RequestSubject => SceneSpec::single(),
        }
    }
}

/// What the router does after a handler ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Stay,
    /// Hand over to the next scene of a chain, merging the patch into the
    /// session fields. Nothing is cleared.
    Enter(Scene, SessionFields),
    Leave,
}

#[derive(Debug)]
pub struct SceneOutcome {
    pub replies: Vec<OutgoingMessage>,
    pub transition: Transition,
}

impl SceneOutcome {
    pub fn stay(reply: impl Into<String>) -> Self {
        Self {
            replies: vec![OutgoingMessage::text(reply)],
            transition: Transition::Stay,
        }
    }

    pub fn leave(replies: Vec<OutgoingMessage>) -> Self {
        Self {
            replies,
            transition: Transition::Leave,
        }
    }

    pub fn done(reply: impl Into<String>) -> Self {
        Self::leave(vec![OutgoingMessage::text(reply)])
    }

    pub fn enter(next: Scene, seed: SessionFields) -> Self {
        Self {
            replies: Vec::new(),
            transition: Transition::Enter(next, seed),
        }
    }
}
