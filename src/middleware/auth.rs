use academia_auth::{AuthError, SessionClaims};
use academia_core::AppError;
use academia_models::User;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::state::AppState;

/// Verified session claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(auth_user.clone());
        }

        let token = bearer_token(parts).ok_or_else(|| {
            debug!("missing or malformed authorization header");
            AuthError::Unauthenticated
        })?;
        let claims = state.session_tokens.verify(token)?;

        let auth_user = AuthUser(claims);
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}

/// The authenticated user's current record.
///
/// Loaded from the repository at most once per request; later extractions in
/// the same request reuse the cached copy.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentUser>() {
            return Ok(current.clone());
        }

        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        let user = state
            .users
            .get_by_id(claims.user_id()?)
            .await?
            .ok_or_else(|| {
                debug!(sub = %claims.sub, "session subject no longer exists");
                AuthError::Unauthenticated
            })?;

        let current = CurrentUser(user);
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Claims of a user in the admin tier.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub SessionClaims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            return Err(AppError::forbidden("Access denied. Admin role required"));
        }
        Ok(RequireAdmin(claims))
    }
}
