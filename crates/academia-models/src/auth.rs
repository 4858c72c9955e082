//! Authentication DTOs: login, token refresh and password reset.

use academia_core::text::clean_lower;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::Normalize;
use crate::validation::validate_password_policy;

/// Login with a username or an email address.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or email.
    #[validate(length(min = 1, message = "username is required"))]
    #[schema(example = "jane_doe")]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl Normalize for LoginRequest {
    fn normalize(&mut self) {
        self.username = clean_lower(&self.username);
    }
}

/// A freshly signed session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Ask for a password-reset link to be mailed.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email(message = "invalid email address"))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

impl Normalize for PasswordResetRequest {
    fn normalize(&mut self) {
        self.email = clean_lower(&self.email);
    }
}

/// Complete a password reset with the `uid` and `token` from the mailed link.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirmRequest {
    #[validate(length(min = 1, message = "uid is required"))]
    pub uid: String,
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirm: String,
}

impl Normalize for PasswordResetConfirmRequest {
    fn normalize(&mut self) {
        self.uid = self.uid.trim().to_string();
        self.token = self.token.trim().to_string();
    }
}

/// Generic success message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_normalizes_identifier() {
        let mut dto = LoginRequest {
            username: "  Jane.Doe@Example.COM ".to_string(),
            password: "x".to_string(),
        };
        dto.normalize();
        assert_eq!(dto.username, "jane.doe@example.com");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_password_reset_request_requires_email() {
        let mut dto = PasswordResetRequest {
            email: "not-an-email".to_string(),
        };
        dto.normalize();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_password_reset_confirm_validation() {
        let dto = PasswordResetConfirmRequest {
            uid: "abc".to_string(),
            token: "GE-sig".to_string(),
            password: "N3w!password".to_string(),
            password_confirm: "N3w!password".to_string(),
        };
        assert!(dto.validate().is_ok());

        let weak = PasswordResetConfirmRequest {
            password: "password".to_string(),
            password_confirm: "password".to_string(),
            ..dto
        };
        let errors = weak.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_token_response_serialize() {
        let json = serde_json::to_string(&TokenResponse {
            token: "a.b.c".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"token":"a.b.c"}"#);
    }
}
