use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    delete_user, delete_users, get_me, get_roles, get_user, list_users, register_user,
    update_user,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).delete(delete_users))
        .route("/register", post(register_user))
        .route("/roles", get(get_roles))
        .route("/me", get(get_me))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}
