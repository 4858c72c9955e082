use academia_auth::{AuthError, ResetTokenError, SessionClaims, decode_uid, encode_uid};
use academia_core::text::clean_lower;
use academia_core::{AppError, hash_password, verify_password_or_dummy};
use academia_models::User;
use academia_models::auth::PasswordResetConfirmRequest;
use tracing::{debug, error, info, instrument, warn};

use crate::state::AppState;
use crate::utils::email::{EmailMessage, EmailTemplate};

pub const INVALID_VALUE: &str = "invalid value";

pub struct AuthService;

impl AuthService {
    /// Check credentials and record the login.
    ///
    /// Unknown identifiers and wrong passwords are indistinguishable to the
    /// caller, both in the response and in the bcrypt work done. A successful
    /// login updates `last_login`, which also voids any outstanding
    /// password-reset token.
    #[instrument(skip(state, password))]
    pub async fn authenticate(
        state: &AppState,
        identifier: &str,
        password: &str,
    ) -> Result<SessionClaims, AppError> {
        let identifier = clean_lower(identifier);
        let found = state.users.get_by_username_or_email(&identifier).await?;
        let stored_hash = found.as_ref().map(|user| user.password_hash.as_str());
        let verified = verify_password_or_dummy(password, stored_hash)?;

        let Some(mut user) = found.filter(|_| verified) else {
            debug!("login with unknown identifier or wrong password");
            return Err(AuthError::AuthenticationFailed.into());
        };
        if !user.is_active {
            return Err(AuthError::AccountDeactivated.into());
        }

        let now = state.clock.now();
        user.last_login = Some(now);
        user.updated_at = now;
        let user = state.users.update(&user).await?;

        info!(user_id = %user.id, "user logged in");
        Ok(state.session_tokens.claims_for(&user, None))
    }

    pub fn issue_token(state: &AppState, claims: &SessionClaims) -> Result<String, AppError> {
        state.session_tokens.issue(claims)
    }

    /// A new token for the same refresh chain, built from the user's current record.
    #[instrument(skip(state, claims), fields(sub = %claims.sub))]
    pub async fn refresh(state: &AppState, claims: &SessionClaims) -> Result<String, AppError> {
        let user = state
            .users
            .get_by_id(claims.user_id()?)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let renewed = state.session_tokens.renew(claims, &user)?;
        Self::issue_token(state, &renewed)
    }

    /// Mail a reset link to the active account owning `email`, if any.
    ///
    /// Returns immediately. Lookup, token minting and delivery run in the
    /// background and their outcome is only logged.
    #[instrument(skip(state))]
    pub fn request_password_reset(state: &AppState, email: &str) {
        let state = state.clone();
        let email = clean_lower(email);
        tokio::spawn(async move {
            if let Err(e) = Self::send_reset_link(&state, &email).await {
                error!(error = %e, "password reset request failed");
            }
        });
    }

    async fn send_reset_link(state: &AppState, email: &str) -> Result<(), AppError> {
        let Some(user) = state.users.get_by_email(email).await? else {
            debug!("password reset for unknown email");
            return Ok(());
        };
        if !user.is_active {
            debug!(user_id = %user.id, "password reset for inactive account");
            return Ok(());
        }

        let token = state
            .reset_tokens
            .make_token(&user)
            .map_err(|e| AppError::internal(anyhow::anyhow!(e)))?;
        let reset_link = reset_link(&state.email_config.frontend_url, &user, &token);

        let message = EmailMessage::new(
            email,
            EmailTemplate::PasswordReset {
                name: user.display_name().to_string(),
                reset_link,
                timeout_days: state.auth_config.password_reset_timeout_days,
            },
        );
        state.mailer.send(message).await?;
        info!(user_id = %user.id, "password reset link sent");
        Ok(())
    }

    /// Set a new password if `uid` and `token` match the user's current state.
    ///
    /// A malformed `uid` and an unknown user both fail on `uid`; an invalid and
    /// an expired token both fail on `token`.
    #[instrument(skip(state, dto), fields(uid = %dto.uid))]
    pub async fn confirm_password_reset(
        state: &AppState,
        dto: PasswordResetConfirmRequest,
    ) -> Result<(), AppError> {
        let user_id = decode_uid(&dto.uid).ok_or_else(|| AppError::field("uid", INVALID_VALUE))?;
        let mut user = state
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::field("uid", INVALID_VALUE))?;

        match state.reset_tokens.verify_token(&user, &dto.token) {
            Ok(()) => {}
            Err(ResetTokenError::Signing) => {
                return Err(AppError::internal(anyhow::anyhow!(ResetTokenError::Signing)));
            }
            Err(reason) => {
                debug!(user_id = %user.id, %reason, "password reset token rejected");
                return Err(AppError::field("token", INVALID_VALUE));
            }
        }

        user.check_password_similarity(&dto.password)?;
        user.password_hash = hash_password(&dto.password)?;
        user.updated_at = state.clock.now();
        let user = state.users.update(&user).await?;
        info!(user_id = %user.id, "password reset");

        Self::send_reset_confirmation(state, &user);
        Ok(())
    }

    fn send_reset_confirmation(state: &AppState, user: &User) {
        let Some(email) = user.email.clone() else {
            return;
        };
        let message = EmailMessage::new(
            email,
            EmailTemplate::PasswordResetConfirmation {
                name: user.display_name().to_string(),
            },
        );
        let mailer = state.mailer.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(message).await {
                warn!(error = %e, "failed to send password reset confirmation");
            }
        });
    }
}

/// `{frontend_url}/password-reset/{uid}/{token}`
pub fn reset_link(frontend_url: &str, user: &User, token: &str) -> String {
    format!(
        "{}/password-reset/{}/{}",
        frontend_url.trim_end_matches('/'),
        encode_uid(&user.id),
        token
    )
}
