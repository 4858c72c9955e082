//! Session tokens: HS256 JWTs carrying [`SessionClaims`].
//!
//! Expiry is checked against the injected [`Clock`] rather than the system
//! time, so `jsonwebtoken`'s own `exp` validation is turned off. Every
//! verification failure collapses to [`AuthError::Unauthenticated`]; the
//! precise [`SessionTokenError`] is only logged.
//!
//! # Example
//!
//! ```ignore
//! let tokens = SessionTokens::new(&auth_config, Arc::new(SystemClock));
//!
//! let claims = tokens.claims_for(&user, None);
//! let token = tokens.issue(&claims)?;
//! let verified = tokens.verify(&token)?;
//!
//! // later, with a freshly loaded user
//! let renewed = tokens.renew(&verified, &current_user)?;
//! ```

use std::fmt;
use std::sync::Arc;

use academia_config::AuthConfig;
use academia_core::{AppError, Clock};
use academia_models::User;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::debug;

use crate::claims::{AUDIENCE, SessionClaims};
use crate::error::AuthError;

/// Why a session token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionTokenError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("wrong issuer")]
    WrongIssuer,
    #[error("wrong audience")]
    WrongAudience,
}

impl From<jsonwebtoken::errors::Error> for SessionTokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => SessionTokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => SessionTokenError::Expired,
            ErrorKind::InvalidIssuer => SessionTokenError::WrongIssuer,
            ErrorKind::InvalidAudience => SessionTokenError::WrongAudience,
            _ => SessionTokenError::Malformed(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct SessionTokens {
    secret: Arc<[u8]>,
    issuer: String,
    access_ttl: i64,
    refresh_window: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_window", &self.refresh_window)
            .finish_non_exhaustive()
    }
}

impl SessionTokens {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Arc::from(config.secret.as_bytes()),
            issuer: config.app_name.clone(),
            access_ttl: config.access_token_expiry,
            refresh_window: config.refresh_token_expiry,
            clock,
        }
    }

    fn now(&self) -> i64 {
        self.clock.now().timestamp()
    }

    /// Claims for `user` issued now. Pass the previous `oriat` when refreshing.
    pub fn claims_for(&self, user: &User, original_issued_at: Option<i64>) -> SessionClaims {
        SessionClaims::for_user(
            user,
            &self.issuer,
            self.now(),
            self.access_ttl,
            original_issued_at,
        )
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::internal(anyhow::anyhow!("failed to sign session token: {e}")))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation
    }

    /// Decode and check a token, keeping the precise failure reason.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &self.validation(),
        )?;

        if data.claims.exp < self.now() {
            return Err(SessionTokenError::Expired);
        }
        Ok(data.claims)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.decode(token).map_err(|reason| {
            debug!(%reason, "session token rejected");
            AuthError::Unauthenticated
        })
    }

    /// New claims for the same refresh chain.
    ///
    /// `current` must be the user freshly loaded by the claims' subject. The
    /// chain may be extended until `oriat + refresh window`; that ceiling does
    /// not move no matter how many refreshes happen in between.
    pub fn renew(
        &self,
        claims: &SessionClaims,
        current: &User,
    ) -> Result<SessionClaims, AuthError> {
        if !current.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let deadline = claims.original_issued_at + self.refresh_window;
        if self.now() > deadline {
            return Err(AuthError::RefreshExpired);
        }

        Ok(self.claims_for(current, Some(claims.original_issued_at)))
    }
}
