mod common;

use common::TestApp;
use sea_orm::EntityTrait;
use storefront_api::{
    entities::User,
    errors::ServiceError,
    services::{LoginInput, RegisterInput},
};

fn register_input(username: &str, email: &str) -> RegisterInput {
    RegisterInput {
        username: username.to_string(),
        email: email.to_string(),
        password: "correct-horse-battery".to_string(),
        password_confirm: "correct-horse-battery".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    }
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let app = TestApp::new().await;

    let user = app
        .state
        .services
        .accounts
        .register(register_input("alice", "alice@example.com"))
        .await
        .expect("registration failed");
    assert_eq!(user.username, "alice");
    assert_ne!(
        user.password_hash, "correct-horse-battery",
        "password must be stored hashed"
    );

    let (logged_in, token) = app
        .state
        .services
        .accounts
        .login(LoginInput {
            username: "alice".to_string(),
            password: "correct-horse-battery".to_string(),
        })
        .await
        .expect("login failed");
    assert_eq!(logged_in.id, user.id);

    let claims = app
        .state
        .auth
        .validate_token(&token.access_token)
        .expect("token should validate");
    assert_eq!(claims.sub, user.id.to_string());
}

#[tokio::test]
async fn duplicate_username_is_rejected_and_nothing_inserted() {
    let app = TestApp::new().await;
    app.state
        .services
        .accounts
        .register(register_input("alice", "alice@example.com"))
        .await
        .unwrap();

    let err = app
        .state
        .services
        .accounts
        .register(register_input("alice", "other@example.com"))
        .await
        .expect_err("expected failure");

    match err {
        ServiceError::ValidationError(message) => {
            assert!(message.contains("Username"), "message: {message}")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let users = User::find().all(&*app.state.db).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn duplicate_email_is_rejected_with_its_own_message() {
    let app = TestApp::new().await;
    app.state
        .services
        .accounts
        .register(register_input("alice", "shared@example.com"))
        .await
        .unwrap();

    let err = app
        .state
        .services
        .accounts
        .register(register_input("bob", "shared@example.com"))
        .await
        .expect_err("expected failure");

    match err {
        ServiceError::ValidationError(message) => {
            assert!(message.contains("Email"), "message: {message}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_passwords_are_rejected() {
    let app = TestApp::new().await;

    let mut input = register_input("carol", "carol@example.com");
    input.password_confirm = "something-else".to_string();

    let err = app
        .state
        .services
        .accounts
        .register(input)
        .await
        .expect_err("expected failure");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_the_same_way() {
    let app = TestApp::new().await;
    app.state
        .services
        .accounts
        .register(register_input("dave", "dave@example.com"))
        .await
        .unwrap();

    let wrong_password = app
        .state
        .services
        .accounts
        .login(LoginInput {
            username: "dave".to_string(),
            password: "nope".to_string(),
        })
        .await
        .expect_err("expected failure");

    let unknown_user = app
        .state
        .services
        .accounts
        .login(LoginInput {
            username: "nobody".to_string(),
            password: "nope".to_string(),
        })
        .await
        .expect_err("expected failure");

    match (&wrong_password, &unknown_user) {
        (ServiceError::AuthError(a), ServiceError::AuthError(b)) => assert_eq!(a, b),
        other => panic!("unexpected errors: {other:?}"),
    }
}
