use axum::{Router, routing::post};

use super::controller::{confirm_password_reset, login_user, refresh_token, request_password_reset};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_user))
        .route("/token-refresh", post(refresh_token))
        .route("/password-reset", post(request_password_reset))
        .route("/password-reset-confirm", post(confirm_password_reset))
}
