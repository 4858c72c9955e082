//! Authentication configuration.
//!
//! # Environment Variables
//!
//! - `APP_NAME`: Issuer written into session tokens (default: `Academia`)
//! - `SECRET_KEY`: Server secret shared by session and reset tokens
//! - `JWT_ACCESS_EXPIRY`: Session-token lifetime in seconds (default: 1 hour)
//! - `JWT_REFRESH_EXPIRY`: Refresh window in seconds, measured from the first
//!   token of a refresh chain (default: 7 days)
//! - `PASSWORD_RESET_TIMEOUT_DAYS`: Whole days a reset token stays valid (default: 3)

use std::env;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub app_name: String,
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub password_reset_timeout_days: i64,
}

impl AuthConfig {
    /// Placeholder secret used when `SECRET_KEY` is unset.
    pub const DEFAULT_SECRET: &'static str = "your-secret-key-change-in-production";

    pub fn from_env() -> Self {
        Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Academia".to_string()),
            secret: env::var("SECRET_KEY")
                .unwrap_or_else(|_| Self::DEFAULT_SECRET.to_string()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
            refresh_token_expiry: env::var("JWT_REFRESH_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(604800), // 7 days
            password_reset_timeout_days: env::var("PASSWORD_RESET_TIMEOUT_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
        }
    }
}
