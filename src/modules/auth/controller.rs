use academia_core::AppError;
use academia_models::auth::{
    LoginRequest, MessageResponse, PasswordResetConfirmRequest, PasswordResetRequest,
    TokenResponse,
};
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use super::service::AuthService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

pub const PASSWORD_RESET_REQUESTED: &str = "If the email address supplied is associated with an \
    active account on this system, an email will arrive in your inbox shortly with instructions \
    to reset your password.";
pub const PASSWORD_RESET_DONE: &str = "Password has been reset with the new password.";

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Login with username or email
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Authentication failed or validation error", body = ErrorResponse),
        (status = 403, description = "Account deactivated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto), fields(username = %dto.username))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let claims = AuthService::authenticate(&state, &dto.username, &dto.password).await?;
    let token = AuthService::issue_token(&state, &claims)?;
    Ok(Json(TokenResponse { token }))
}

/// Exchange a valid session token for a fresh one
#[utoipa::path(
    post,
    path = "/api/auth/token-refresh",
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 403, description = "Account deactivated or refresh has expired", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, claims), fields(sub = %claims.sub))]
pub async fn refresh_token(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<TokenResponse>, AppError> {
    let token = AuthService::refresh(&state, &claims).await?;
    Ok(Json(TokenResponse { token }))
}

/// Request a password reset link
///
/// Always succeeds so callers cannot learn which addresses have accounts.
#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PasswordResetRequest>,
) -> Json<MessageResponse> {
    AuthService::request_password_reset(&state, &dto.email);
    Json(MessageResponse {
        message: PASSWORD_RESET_REQUESTED.to_string(),
    })
}

/// Set a new password using the uid and token from a reset link
#[utoipa::path(
    post,
    path = "/api/auth/password-reset-confirm",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid uid, invalid token or validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PasswordResetConfirmRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::confirm_password_reset(&state, dto).await?;
    Ok(Json(MessageResponse {
        message: PASSWORD_RESET_DONE.to_string(),
    }))
}
