use std::fmt;
use std::sync::Arc;

use academia_auth::{PasswordResetTokens, SessionTokens};
use academia_config::{AuthConfig, CorsConfig, EmailConfig};
use academia_core::Clock;

use crate::modules::users::repository::UserRepository;
use crate::utils::email::EmailDispatch;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub mailer: Arc<dyn EmailDispatch>,
    pub clock: Arc<dyn Clock>,
    pub session_tokens: SessionTokens,
    pub reset_tokens: PasswordResetTokens,
    pub auth_config: AuthConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn EmailDispatch>,
        clock: Arc<dyn Clock>,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        cors_config: CorsConfig,
    ) -> Self {
        let session_tokens = SessionTokens::new(&auth_config, clock.clone());
        let reset_tokens = PasswordResetTokens::new(
            &auth_config.secret,
            auth_config.password_reset_timeout_days,
            clock.clone(),
        );
        Self {
            users,
            mailer,
            clock,
            session_tokens,
            reset_tokens,
            auth_config,
            email_config,
            cors_config,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("clock", &self.clock)
            .field("session_tokens", &self.session_tokens)
            .field("reset_tokens", &self.reset_tokens)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}
