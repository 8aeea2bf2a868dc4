mod common;

use common::{first_text, setup_bot, texts};
use schoolbot_models::{ParentLink, Role, StudentId, UserIdentity};

const ADMIN: i64 = 1;
const PARENT: i64 = 10;

async fn link_parent(bot: &common::TestBot, parent: i64, student_id: &str) {
    bot.say(parent, "I am a parent").await;
    bot.say(parent, student_id).await;
    let approve = bot.last_payload(ADMIN, "approve_parent_");
    bot.press(ADMIN, &approve).await;
}

#[tokio::test]
async fn test_admin_adds_ava_to_grade_5() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    let before = bot.state.repo.list_students().await.len();

    let replies = bot.say(ADMIN, "Add student").await;
    assert_eq!(first_text(&replies), "Enter the student's full name:");
    let replies = bot.say(ADMIN, "Ava").await;
    assert_eq!(first_text(&replies), "Which class is Ava in?");
    let replies = bot.say(ADMIN, "Grade 5").await;
    assert!(first_text(&replies).starts_with("Student Ava added to Grade 5."));

    let students = bot.state.repo.list_students().await;
    assert_eq!(students.len(), before + 1);
    let ava = &students[0];
    assert_eq!(ava.name, "Ava");
    assert_eq!(ava.class, "Grade 5");
    assert_eq!(ava.student_id.to_string().len(), 10);
    assert_eq!(ava.parent, ParentLink::None);
    assert!(ava.grades.is_empty());

    // The menu comes back with the final reply
    assert!(replies.last().unwrap().keyboard.is_some());
    assert!(bot.session_is_idle(ADMIN).await);
}

#[tokio::test]
async fn test_empty_student_name_reprompts() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    bot.say(ADMIN, "Add student").await;

    let replies = bot.say(ADMIN, "   ").await;
    assert_eq!(first_text(&replies), "Name must be 1 to 100 characters.");
    let replies = bot.say(ADMIN, "Ava").await;
    assert_eq!(first_text(&replies), "Which class is Ava in?");
}

#[tokio::test]
async fn test_generated_ids_are_unique() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    let mut ids = Vec::new();
    for i in 0..25 {
        ids.push(bot.add_student(ADMIN, &format!("Student {i}"), "Grade 1").await);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 25);
}

#[tokio::test]
async fn test_non_admin_cannot_use_admin_menu() {
    let bot = setup_bot().await;
    bot.say(PARENT, "/start").await;
    let replies = bot.say(PARENT, "Add student").await;
    assert_eq!(
        first_text(&replies),
        "Unknown command. Send /start to see the menu."
    );
    assert!(bot.session_is_idle(PARENT).await);
}

#[tokio::test]
async fn test_wrong_admin_code_leaves_scene() {
    let bot = setup_bot().await;
    bot.say(PARENT, "/admin").await;
    let replies = bot.say(PARENT, "guess").await;
    assert_eq!(first_text(&replies), "Invalid admin code.");
    assert!(bot.session_is_idle(PARENT).await);
    let user = bot.state.repo.find_user(UserIdentity(PARENT)).await;
    assert!(user.is_none_or(|u| u.role != Role::Admin));
}

#[tokio::test]
async fn test_admin_command_shows_panel_for_admins() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    let replies = bot.say(ADMIN, "/admin").await;
    assert_eq!(first_text(&replies), "Admin panel");
    assert!(bot.session_is_idle(ADMIN).await);
}

#[tokio::test]
async fn test_unbind_parent_clears_every_student() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    let first = bot.add_student(ADMIN, "Ava", "Grade 5").await;
    let second = bot.add_student(ADMIN, "Ben", "Grade 2").await;
    let third = bot.add_student(ADMIN, "Cleo", "Grade 1").await;
    link_parent(&bot, PARENT, &first).await;
    link_parent(&bot, PARENT, &second).await;
    // Left pending on purpose
    bot.say(PARENT, "Link a child").await;
    bot.say(PARENT, &third).await;

    bot.say(ADMIN, "Unbind parent").await;
    let replies = bot.say(ADMIN, &PARENT.to_string()).await;
    assert_eq!(
        first_text(&replies),
        "Parent 10 unbound from 3 student(s)."
    );

    for id in [&first, &second, &third] {
        let sid: StudentId = id.parse().unwrap();
        assert_eq!(
            bot.state.repo.find_student(sid).await.unwrap().parent,
            ParentLink::None
        );
    }
    let parent = bot.state.repo.find_user(UserIdentity(PARENT)).await.unwrap();
    assert!(parent.student_ids.is_empty());
    assert!(parent.pending_student_ids.is_empty());
    assert_eq!(parent.role, Role::User);
    assert!(
        bot.notifier
            .sent_to(PARENT)
            .iter()
            .any(|m| m.text == "You have been unlinked from all students.")
    );
}

#[tokio::test]
async fn test_delete_and_unlink_keep_parent_consistent() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    let first = bot.add_student(ADMIN, "Ava", "Grade 5").await;
    let second = bot.add_student(ADMIN, "Ben", "Grade 5").await;
    link_parent(&bot, PARENT, &first).await;
    link_parent(&bot, PARENT, &second).await;

    bot.say(ADMIN, "Delete student").await;
    let replies = bot.say(ADMIN, &first).await;
    assert_eq!(first_text(&replies), "Student Ava deleted.");
    let sid: StudentId = first.parse().unwrap();
    assert!(bot.state.repo.find_student(sid).await.is_none());

    let parent = bot.state.repo.find_user(UserIdentity(PARENT)).await.unwrap();
    assert!(!parent.student_ids.contains(&sid));
    assert_eq!(parent.role, Role::Parent);

    bot.say(ADMIN, "Unlink student").await;
    let replies = bot.say(ADMIN, &second).await;
    assert_eq!(
        first_text(&replies),
        "Ben is no longer linked to parent 10."
    );
    let parent = bot.state.repo.find_user(UserIdentity(PARENT)).await.unwrap();
    assert!(parent.student_ids.is_empty());
    assert_eq!(parent.role, Role::User);

    // Nothing left to unlink
    bot.say(ADMIN, "Unlink student").await;
    let replies = bot.say(ADMIN, &second).await;
    assert_eq!(first_text(&replies), "Ben has no linked parent.");
}

#[tokio::test]
async fn test_import_document_links_known_parents() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    bot.say(PARENT, "/start").await;

    let document = format!(
        r#"[
            {{"name": "Ava", "class": "Grade 5", "parent_id": {PARENT}, "schedule": "Mon: Math"}},
            {{"name": "Ben", "class": "Grade 5"}},
            {{"name": "", "class": "Grade 5"}}
        ]"#
    );
    let replies = bot.say(ADMIN, "Import students").await;
    assert!(first_text(&replies).starts_with("Send a JSON file"));
    let replies = bot.upload(ADMIN, &document).await;
    let text = first_text(&replies);
    assert!(text.starts_with("Imported 2 student(s), 1 linked to a parent."));
    assert!(text.contains("Row 3 skipped"));

    let students = bot.state.repo.find_students_by_class("Grade 5").await;
    assert_eq!(students.len(), 2);
    let ava = students.iter().find(|s| s.name == "Ava").unwrap();
    assert_eq!(ava.parent, ParentLink::Linked(UserIdentity(PARENT)));
    assert_eq!(ava.schedule.as_deref(), Some("Mon: Math"));
    let parent = bot.state.repo.find_user(UserIdentity(PARENT)).await.unwrap();
    assert!(parent.student_ids.contains(&ava.student_id));
    assert_eq!(parent.role, Role::Parent);
}

#[tokio::test]
async fn test_invalid_import_document_reprompts() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    bot.say(ADMIN, "Import students").await;
    let replies = bot.upload(ADMIN, "not json").await;
    assert!(first_text(&replies).starts_with("The document is not a valid student list"));
    assert!(!bot.session_is_idle(ADMIN).await);
    bot.say(ADMIN, "/cancel").await;
    assert!(bot.session_is_idle(ADMIN).await);
}

#[tokio::test]
async fn test_promote_and_demote() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    bot.say(PARENT, "/start").await;

    bot.say(ADMIN, "Add admin").await;
    let replies = bot.say(ADMIN, "10").await;
    assert_eq!(first_text(&replies), "User 10 is now an admin.");
    assert!(bot.state.repo.find_user(UserIdentity(PARENT)).await.unwrap().is_admin());

    bot.say(ADMIN, "Remove admin").await;
    let replies = bot.say(ADMIN, &ADMIN.to_string()).await;
    assert_eq!(first_text(&replies), "You cannot remove your own admin role.");

    bot.say(ADMIN, "Remove admin").await;
    let replies = bot.say(ADMIN, "10").await;
    assert_eq!(
        first_text(&replies),
        "User 10 is no longer an admin (now user)."
    );
    assert_eq!(
        bot.state.repo.find_user(UserIdentity(PARENT)).await.unwrap().role,
        Role::User
    );
}

#[tokio::test]
async fn test_class_schedule_reaches_parents() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    let ava = bot.add_student(ADMIN, "Ava", "Grade 5").await;
    bot.add_student(ADMIN, "Ben", "Grade 5").await;
    link_parent(&bot, PARENT, &ava).await;

    bot.say(ADMIN, "Set schedule").await;
    let replies = bot.say(ADMIN, "Grade 5").await;
    assert_eq!(first_text(&replies), "Send the schedule for class Grade 5:");
    let replies = bot.say(ADMIN, "Mon: Math, Tue: Art").await;
    assert_eq!(
        first_text(&replies),
        "Schedule set for 2 student(s) in class Grade 5."
    );
    assert!(bot.session_is_idle(ADMIN).await);

    let replies = bot.say(PARENT, "Schedule").await;
    assert_eq!(first_text(&replies), "Ava (Grade 5):\nMon: Math, Tue: Art");

    let replies = bot.say(ADMIN, "Classes").await;
    assert_eq!(first_text(&replies), "Grade 5: 2 student(s)");
}

#[tokio::test]
async fn test_broadcast_swallows_failures() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    bot.say(10, "/start").await;
    bot.say(11, "/start").await;
    bot.notifier.block(11);

    bot.say(ADMIN, "Announcement").await;
    let replies = bot.say(ADMIN, "School is closed on Friday.").await;
    assert_eq!(
        texts(&replies)[0],
        "Announcement sent to 1 user(s). 1 could not be reached."
    );
    assert!(
        bot.notifier.sent_to(10)[0]
            .text
            .ends_with("School is closed on Friday.")
    );
}

#[tokio::test]
async fn test_import_accepts_camel_case_parent_id() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    bot.say(PARENT, "/start").await;

    bot.say(ADMIN, "Import students").await;
    let document = format!(r#"[{{"name": "Ava", "class": "5A", "parentId": {PARENT}}}]"#);
    let replies = bot.upload(ADMIN, &document).await;
    assert!(first_text(&replies).starts_with("Imported 1 student(s), 1 linked to a parent."));

    let students = bot.state.repo.find_students_by_class("5A").await;
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].parent, ParentLink::Linked(UserIdentity(PARENT)));
    let parent = bot.state.repo.find_user(UserIdentity(PARENT)).await.unwrap();
    assert!(parent.student_ids.contains(&students[0].student_id));
}
