mod common;

use common::{first_text, setup_bot, texts};
use schoolbot::notifications::Keyboard;
use schoolbot_models::{Role, UserIdentity};

const ADMIN: i64 = 1;
const USER: i64 = 30;

fn menu_labels(keyboard: &Option<Keyboard>) -> Vec<String> {
    match keyboard {
        Some(Keyboard::Reply(rows)) => rows.iter().flatten().cloned().collect(),
        other => panic!("expected a reply keyboard, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_registers_and_shows_registration_menu() {
    let bot = setup_bot().await;
    let replies = bot.say(USER, "/start").await;
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0].text,
        "Welcome, User 30!\nAre you a parent or a teacher?"
    );
    assert_eq!(
        menu_labels(&replies[0].keyboard),
        vec!["I am a parent", "I am a teacher"]
    );

    let user = bot.state.repo.find_user(UserIdentity(USER)).await.unwrap();
    assert_eq!(user.role, Role::User);
    assert_eq!(user.name, "User 30");
}

#[tokio::test]
async fn test_start_abandons_the_active_scene() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    bot.say(ADMIN, "Add student").await;
    bot.say(ADMIN, "Ava").await;
    assert!(!bot.session_is_idle(ADMIN).await);

    let replies = bot.say(ADMIN, "/start").await;
    assert!(first_text(&replies).starts_with("Welcome"));
    assert!(menu_labels(&replies[0].keyboard).contains(&"Add student".to_string()));
    assert!(bot.session_is_idle(ADMIN).await);
    assert!(bot.state.repo.list_students().await.is_empty());
}

#[tokio::test]
async fn test_cancel() {
    let bot = setup_bot().await;
    let replies = bot.say(USER, "/cancel").await;
    assert_eq!(texts(&replies), vec!["Nothing to cancel."]);

    bot.say(USER, "I am a parent").await;
    let replies = bot.say(USER, "/cancel").await;
    assert_eq!(first_text(&replies), "Cancelled.");
    assert!(replies[0].keyboard.is_some());
    assert!(bot.session_is_idle(USER).await);
}

#[tokio::test]
async fn test_unknown_text_and_callbacks() {
    let bot = setup_bot().await;
    let replies = bot.say(USER, "hello").await;
    assert_eq!(
        first_text(&replies),
        "Unknown command. Send /start to see the menu."
    );

    let replies = bot.press(USER, "launch_rockets").await;
    assert_eq!(first_text(&replies), "Request not found.");
    let replies = bot.press(USER, "approve_parent_x_y").await;
    assert_eq!(first_text(&replies), "Request not found.");
}

#[tokio::test]
async fn test_malformed_student_id_reprompts() {
    let bot = setup_bot().await;
    bot.say(USER, "I am a parent").await;

    let replies = bot.say(USER, "12ab").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].keyboard.is_none());
    assert!(!bot.session_is_idle(USER).await);

    let replies = bot.say(USER, "1234567890").await;
    assert_eq!(first_text(&replies), "No student with id 1234567890.");
    assert!(bot.session_is_idle(USER).await);
}

#[tokio::test]
async fn test_documents_outside_import_are_refused() {
    let bot = setup_bot().await;
    let replies = bot.upload(USER, "[]").await;
    assert_eq!(
        first_text(&replies),
        "Unknown command. Send /start to see the menu."
    );

    bot.say(USER, "I am a parent").await;
    let replies = bot.upload(USER, "[]").await;
    assert_eq!(
        first_text(&replies),
        "A file is not expected here. Send text, or /cancel."
    );
    assert!(!bot.session_is_idle(USER).await);
}

#[tokio::test]
async fn test_every_completed_chain_leaves_the_session_empty() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;
    assert!(bot.session_is_idle(ADMIN).await);

    bot.add_student(ADMIN, "Ava", "Grade 5").await;
    assert!(bot.session_is_idle(ADMIN).await);

    bot.say(ADMIN, "Set schedule").await;
    bot.say(ADMIN, "Grade 5").await;
    bot.say(ADMIN, "Mon: Math").await;
    assert!(bot.session_is_idle(ADMIN).await);

    bot.say(ADMIN, "Class roster").await;
    let replies = bot.say(ADMIN, "Grade 5").await;
    assert!(first_text(&replies).starts_with("Class Grade 5 (1 students):"));
    assert!(bot.session_is_idle(ADMIN).await);

    bot.say(ADMIN, "Statistics").await;
    assert!(bot.session_is_idle(ADMIN).await);
}

#[tokio::test]
async fn test_concurrent_first_contacts_all_register() {
    let bot = setup_bot().await;
    bot.make_admin(ADMIN).await;

    let state = bot.state.clone();
    let handles: Vec<_> = (0..10)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                use schoolbot::conversation::{Conversation, InboundEvent};
                let from = UserIdentity(100 + i);
                Conversation::handle(&state, InboundEvent::text(from, "/start")).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(bot.state.repo.list_users().await.len(), 11);
}
