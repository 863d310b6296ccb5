//! Error types shared by the API client, the session store and the auth flows.

use thiserror::Error;

/// Failure of a single request to the task API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: u16,
        /// `detail` field of the error body, when the server sent one.
        detail: Option<String>,
    },

    /// The request never produced a response, or the body could not be decoded.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// The server-provided message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Failure reading or writing the persisted session entries.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Client-side form validation failure. Blocks submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields!")]
    MissingField,
    #[error("Username must be at least 3 characters long!")]
    UsernameTooShort,
    #[error("Passwords do not match!")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters long!")]
    PasswordTooShort,
}

/// Everything an auth flow can show inline.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server rejected the request; carries the message to display.
    #[error("{0}")]
    Rejected(String),

    /// Another submission is still in flight.
    #[error("A request is already in progress")]
    Busy,

    /// `finish_submit` was called without a matching `begin_submit`.
    #[error("No submission in progress")]
    NotSubmitting,
}
