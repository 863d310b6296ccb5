//! Register and login flows.
//!
//! Each form walks `Idle -> Submitting -> Redirected | Idle(with error)`.
//! Submission is split into [`RegisterForm::begin_submit`] (validation and the
//! loading guard, no I/O) and [`RegisterForm::finish_submit`] (the requests), so
//! the UI can draw its loading state in between.

use tracing::{info, warn};

use crate::api::TaskApi;
use crate::error::{AuthError, ValidationError};
use crate::models::{Route, Session};
use crate::session::SessionStore;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

pub const REGISTER_FALLBACK: &str = "Registration failed. Username might already exist.";
pub const LOGIN_FAILED: &str = "Invalid username or password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Submitting,
    Redirected(Route),
}

/// Checks the registration fields. Runs before any request is made.
pub fn validate_registration(username: &str, password: &str, confirm: &str) -> Result<(), ValidationError> {
    if username.is_empty() || password.is_empty() || confirm.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingField);
    }
    Ok(())
}

/// Logs in and stores the returned credential together with `username`.
async fn login_and_store<A: TaskApi>(
    api: &A,
    session: &SessionStore,
    username: &str,
    password: &str,
) -> Result<(), AuthError> {
    let response = api.login(username, password).await.map_err(|e| {
        warn!(username, error = %e, "login rejected");
        AuthError::Rejected(LOGIN_FAILED.to_string())
    })?;
    session
        .set(&Session { token: response.access_token, username: username.to_string() })
        .map_err(|e| AuthError::Rejected(e.to_string()))?;
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    /// Message shown above the form, cleared on every submit.
    pub error: Option<String>,
    pub state: FlowState,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.state == FlowState::Submitting
    }

    /// Validates and enters `Submitting`. Rejected while a submission is in flight.
    pub fn begin_submit(&mut self) -> Result<(), AuthError> {
        if self.is_loading() {
            return Err(AuthError::Busy);
        }
        self.error = None;
        if let Err(e) = validate_registration(&self.username, &self.password, &self.confirm_password) {
            self.error = Some(e.to_string());
            self.state = FlowState::Idle;
            return Err(e.into());
        }
        self.state = FlowState::Submitting;
        Ok(())
    }

    /// Registers, then logs in with the same credentials and stores the session.
    pub async fn finish_submit<A: TaskApi>(&mut self, api: &A, session: &SessionStore) -> Result<Route, AuthError> {
        if !self.is_loading() {
            return Err(AuthError::NotSubmitting);
        }
        match self.register_and_login(api, session).await {
            Ok(()) => {
                info!(username = %self.username, "registered and signed in");
                self.state = FlowState::Redirected(Route::Dashboard);
                Ok(Route::Dashboard)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.state = FlowState::Idle;
                Err(e)
            }
        }
    }

    pub async fn submit<A: TaskApi>(&mut self, api: &A, session: &SessionStore) -> Result<Route, AuthError> {
        self.begin_submit()?;
        self.finish_submit(api, session).await
    }

    async fn register_and_login<A: TaskApi>(&self, api: &A, session: &SessionStore) -> Result<(), AuthError> {
        let server_message = |e: crate::error::ApiError| {
            warn!(username = %self.username, error = %e, "registration failed");
            AuthError::Rejected(e.detail().unwrap_or(REGISTER_FALLBACK).to_string())
        };
        api.register(&self.username, &self.password).await.map_err(server_message)?;
        let response = api.login(&self.username, &self.password).await.map_err(server_message)?;
        session
            .set(&Session { token: response.access_token, username: self.username.clone() })
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
    pub state: FlowState,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.state == FlowState::Submitting
    }

    pub fn begin_submit(&mut self) -> Result<(), AuthError> {
        if self.is_loading() {
            return Err(AuthError::Busy);
        }
        self.error = None;
        if let Err(e) = validate_login(&self.username, &self.password) {
            self.error = Some(e.to_string());
            return Err(e.into());
        }
        self.state = FlowState::Submitting;
        Ok(())
    }

    pub async fn finish_submit<A: TaskApi>(&mut self, api: &A, session: &SessionStore) -> Result<Route, AuthError> {
        if !self.is_loading() {
            return Err(AuthError::NotSubmitting);
        }
        match login_and_store(api, session, &self.username, &self.password).await {
            Ok(()) => {
                info!(username = %self.username, "signed in");
                self.state = FlowState::Redirected(Route::Dashboard);
                Ok(Route::Dashboard)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.state = FlowState::Idle;
                Err(e)
            }
        }
    }

    pub async fn submit<A: TaskApi>(&mut self, api: &A, session: &SessionStore) -> Result<Route, AuthError> {
        self.begin_submit()?;
        self.finish_submit(api, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_is_reported_before_length() {
        assert_eq!(validate_registration("alice", "abc", "abd"), Err(ValidationError::PasswordMismatch));
        assert_eq!(validate_registration("alice", "abc", "abc"), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_registration("al", "secret1", "secret1"), Err(ValidationError::UsernameTooShort));
        assert_eq!(validate_registration("alice", "secret1", "secret1"), Ok(()));
    }

    #[test]
    fn login_requires_both_fields() {
        assert_eq!(validate_login("", "x"), Err(ValidationError::MissingField));
        assert_eq!(validate_login("bob", ""), Err(ValidationError::MissingField));
        assert!(validate_login("bob", "x").is_ok());
    }

    #[test]
    fn second_begin_is_rejected_while_submitting() {
        let mut form = LoginForm { username: "bob".into(), password: "pw".into(), ..Default::default() };
        form.begin_submit().unwrap();
        assert!(matches!(form.begin_submit(), Err(AuthError::Busy)));
    }
}
