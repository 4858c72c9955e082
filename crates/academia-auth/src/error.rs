//! Authentication failures.
//!
//! [`AuthError`] is what callers see. Each variant maps to a fixed, generic
//! public message: clients cannot tell an unknown user from a wrong password,
//! nor a tampered token from an expired one. The precise reason is kept in
//! the lower-level error types and only ever reaches the logs.

use academia_core::AppError;
use academia_core::errors::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing, malformed, forged or expired session token.
    #[error("user not authenticated")]
    Unauthenticated,
    /// Unknown identifier or wrong password.
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("account deactivated")]
    AccountDeactivated,
    /// The refresh chain outlived its refresh window.
    #[error("refresh has expired")]
    RefreshExpired,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::AuthenticationFailed => StatusCode::BAD_REQUEST,
            AuthError::AccountDeactivated | AuthError::RefreshExpired => StatusCode::FORBIDDEN,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::new(err.status(), err)
    }
}
