mod common;

use common::{Call, FakeApi};
use taskweb::auth::{FlowState, LoginForm, RegisterForm, LOGIN_FAILED, REGISTER_FALLBACK};
use taskweb::error::{AuthError, ValidationError};
use taskweb::models::Route;
use taskweb::session::SessionStore;

fn register_form(username: &str, password: &str, confirm: &str) -> RegisterForm {
    RegisterForm {
        username: username.into(),
        password: password.into(),
        confirm_password: confirm.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn register_then_auto_login_stores_session() {
    let api = FakeApi::new();
    let session = SessionStore::in_memory();
    let mut form = register_form("alice", "secret1", "secret1");

    let route = form.submit(&api, &session).await.unwrap();

    assert_eq!(route, Route::Dashboard);
    assert_eq!(form.state, FlowState::Redirected(Route::Dashboard));
    assert_eq!(
        api.calls(),
        vec![
            Call::Register("alice".into(), "secret1".into()),
            Call::Login("alice".into(), "secret1".into()),
        ]
    );
    assert_eq!(session.token().as_deref(), Some("token-alice"));
    assert_eq!(session.username().as_deref(), Some("alice"));
}

#[tokio::test]
async fn mismatched_confirmation_sends_nothing() {
    let api = FakeApi::new();
    let session = SessionStore::in_memory();
    let mut form = register_form("alice", "secret1", "secret2");

    let err = form.submit(&api, &session).await.unwrap_err();

    assert!(matches!(err, AuthError::Validation(ValidationError::PasswordMismatch)));
    assert!(form.error.as_deref().unwrap().contains("do not match"));
    assert!(api.calls().is_empty());
    assert_eq!(form.state, FlowState::Idle);
    assert!(session.get().is_none());
}

#[tokio::test]
async fn short_password_sends_nothing() {
    let api = FakeApi::new();
    let session = SessionStore::in_memory();
    let mut form = register_form("alice", "abc12", "abc12");

    let err = form.submit(&api, &session).await.unwrap_err();

    assert!(matches!(err, AuthError::Validation(ValidationError::PasswordTooShort)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn duplicate_username_shows_server_detail() {
    let api = FakeApi::new().with_user("alice", "secret1");
    let session = SessionStore::in_memory();
    let mut form = register_form("alice", "secret1", "secret1");

    assert!(form.submit(&api, &session).await.is_err());

    assert_eq!(form.error.as_deref(), Some("Username already exists"));
    assert_eq!(form.state, FlowState::Idle);
    assert_eq!(api.count(|c| matches!(c, Call::Login(..))), 0);
    assert!(session.get().is_none());
}

#[tokio::test]
async fn register_error_without_detail_uses_fallback_message() {
    let api = FakeApi::new();
    *api.fail_register.borrow_mut() = Some(500);
    let session = SessionStore::in_memory();
    let mut form = register_form("alice", "secret1", "secret1");

    let err = form.submit(&api, &session).await.unwrap_err();

    assert!(matches!(err, AuthError::Rejected(ref m) if m == REGISTER_FALLBACK));
    assert_eq!(form.error.as_deref(), Some(REGISTER_FALLBACK));
    assert_eq!(form.state, FlowState::Idle);
    assert_eq!(api.count(|c| matches!(c, Call::Login(..))), 0);
    assert!(session.get().is_none());
}

#[tokio::test]
async fn previous_error_is_cleared_on_resubmit() {
    let api = FakeApi::new();
    let session = SessionStore::in_memory();
    let mut form = register_form("alice", "secret1", "nope");
    let _ = form.submit(&api, &session).await;
    assert!(form.error.is_some());

    form.confirm_password = "secret1".into();
    form.submit(&api, &session).await.unwrap();
    assert!(form.error.is_none());
}

#[tokio::test]
async fn login_stores_token_and_username() {
    let api = FakeApi::new().with_user("bob", "hunter22");
    let session = SessionStore::in_memory();
    let mut form = LoginForm { username: "bob".into(), password: "hunter22".into(), ..Default::default() };

    let route = form.submit(&api, &session).await.unwrap();

    assert_eq!(route, Route::Dashboard);
    let stored = session.get().unwrap();
    assert_eq!(stored.token, "token-bob");
    assert_eq!(stored.username, "bob");
}

#[tokio::test]
async fn failed_login_shows_generic_error() {
    let api = FakeApi::new().with_user("bob", "hunter22");
    let session = SessionStore::in_memory();
    let mut form = LoginForm { username: "bob".into(), password: "wrong".into(), ..Default::default() };

    assert!(form.submit(&api, &session).await.is_err());

    assert_eq!(form.error.as_deref(), Some(LOGIN_FAILED));
    assert_eq!(form.state, FlowState::Idle);
    assert!(session.get().is_none());
}

#[tokio::test]
async fn login_with_empty_field_sends_nothing() {
    let api = FakeApi::new();
    let session = SessionStore::in_memory();
    let mut form = LoginForm { username: "bob".into(), ..Default::default() };

    assert!(form.submit(&api, &session).await.is_err());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn finish_without_begin_is_rejected() {
    let api = FakeApi::new();
    let session = SessionStore::in_memory();
    let mut form = LoginForm { username: "bob".into(), password: "pw".into(), ..Default::default() };

    assert!(matches!(form.finish_submit(&api, &session).await, Err(AuthError::NotSubmitting)));
    assert!(api.calls().is_empty());
}
