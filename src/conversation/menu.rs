//! Reply-keyboard menu labels.
//!
//! The menu a person sees is assembled from the sections their capabilities
//! unlock; a label typed by someone without the capability is not an action.

use crate::modules::users::model::Capabilities;
use crate::notifications::Keyboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    IAmParent,
    IAmTeacher,

    MyChildren,
    ChildrenGrades,
    ChildrenSchedule,
    LinkChild,

    MySubjects,
    RequestSubject,
    GradeStudent,
    EnrollStudent,
    ContactParent,

    AddStudent,
    ImportStudents,
    AddTeacher,
    DeleteStudent,
    UnlinkStudent,
    UnbindParent,
    Classes,
    ClassRoster,
    SetSchedule,
    PromoteAdmin,
    DemoteAdmin,
    Announcement,
    Statistics,
}

const REGISTRATION: &[MenuAction] = &[MenuAction::IAmParent, MenuAction::IAmTeacher];

const PARENT: &[MenuAction] = &[
    MenuAction::MyChildren,
    MenuAction::ChildrenGrades,
    MenuAction::ChildrenSchedule,
    MenuAction::LinkChild,
];

const TEACHER: &[MenuAction] = &[
    MenuAction::MySubjects,
    MenuAction::RequestSubject,
    MenuAction::GradeStudent,
    MenuAction::EnrollStudent,
    MenuAction::ContactParent,
];

const ADMIN: &[MenuAction] = &[
    MenuAction::AddStudent,
    MenuAction::ImportStudents,
    MenuAction::AddTeacher,
    MenuAction::DeleteStudent,
    MenuAction::UnlinkStudent,
    MenuAction::UnbindParent,
    MenuAction::Classes,
    MenuAction::ClassRoster,
    MenuAction::SetSchedule,
    MenuAction::PromoteAdmin,
    MenuAction::DemoteAdmin,
    MenuAction::Announcement,
    MenuAction::Statistics,
];

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::IAmParent => "I am a parent",
            Self::IAmTeacher => "I am a teacher",
            Self::MyChildren => "My children",
            Self::ChildrenGrades => "Grades",
            Self::ChildrenSchedule => "Schedule",
            Self::LinkChild => "Link a child",
            Self::MySubjects => "My subjects",
            Self::RequestSubject => "Request subject",
            Self::GradeStudent => "Grade a student",
            Self::EnrollStudent => "Enroll student",
            Self::ContactParent => "Contact parent",
            Self::AddStudent => "Add student",
            Self::ImportStudents => "Import students",
            Self::AddTeacher => "Add teacher",
            Self::DeleteStudent => "Delete student",
            Self::UnlinkStudent => "Unlink student",
            Self::UnbindParent => "Unbind parent",
            Self::Classes => "Classes",
            Self::ClassRoster => "Class roster",
            Self::SetSchedule => "Set schedule",
            Self::PromoteAdmin => "Add admin",
            Self::DemoteAdmin => "Remove admin",
            Self::Announcement => "Announcement",
            Self::Statistics => "Statistics",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        REGISTRATION
            .iter()
            .chain(PARENT)
            .chain(TEACHER)
            .chain(ADMIN)
            .copied()
            .find(|action| action.label() == text)
    }

    pub fn permitted(self, caps: &Capabilities) -> bool {
        if ADMIN.contains(&self) {
            caps.is_admin()
        } else if TEACHER.contains(&self) {
            caps.is_teacher()
        } else if PARENT.contains(&self) {
            caps.parent
        } else if self == Self::IAmTeacher {
            !caps.is_teacher()
        } else {
            true
        }
    }
}

fn rows(actions: &[MenuAction]) -> Vec<Vec<String>> {
    actions
        .chunks(2)
        .map(|pair| pair.iter().map(|a| a.label().to_string()).collect())
        .collect()
}

/// The reply keyboard for a person.
pub fn menu_for(caps: &Capabilities) -> Keyboard {
    let mut keyboard = Vec::new();
    if caps.is_admin() {
        keyboard.extend(rows(ADMIN));
    }
    if caps.is_teacher() {
        keyboard.extend(rows(TEACHER));
    }
    if caps.parent {
        keyboard.extend(rows(PARENT));
    }
    if keyboard.is_empty() {
        keyboard.extend(rows(REGISTRATION));
    }
    Keyboard::Reply(keyboard)
}
