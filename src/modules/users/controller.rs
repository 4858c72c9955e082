use academia_core::AppError;
use academia_models::roles::role_catalogue;
use academia_models::users::{DeleteUsersRequest, NewUser, UpdateUser, UserQuery};
use academia_models::{Normalize, Role, User};
use anyhow::anyhow;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;
use uuid::Uuid;

use super::service::UserService;
use crate::middleware::auth::{CurrentUser, RequireAdmin};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Register a new user (admins only)
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation error, taken identifier or role above the caller's own", body = ErrorResponse),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, actor, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    CurrentUser(actor): CurrentUser,
    ValidatedJson(dto): ValidatedJson<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(&state, &actor, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List the roles that can be assigned (admins only)
#[utoipa::path(
    get,
    path = "/api/users/roles",
    responses(
        (status = 200, description = "Role catalogue", body = [Role]),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_roles(RequireAdmin(_admin): RequireAdmin) -> Json<Vec<Role>> {
    Json(role_catalogue())
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "User not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// List users matching the filters (admins only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Matching users, oldest first", body = [User]),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(mut query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    query.normalize();
    let users = UserService::list(&state, &query).await?;
    Ok(Json(users))
}

/// Retrieve a user. Non-admins can only retrieve themselves.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, actor))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_visible(&state, &actor, parse_id(&id)?).await?;
    Ok(Json(user))
}

/// Update a user. Non-admins can only change their own name and password.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Validation error, taken identifier or role above the caller's own", body = ErrorResponse),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 403, description = "Not allowed to make this change", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, actor, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateUser>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update(&state, &actor, parse_id(&id)?, dto).await?;
    Ok(Json(user))
}

/// Delete a user (admins only)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required, or deleting yourself", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _admin, actor))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    UserService::delete(&state, &actor, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete several users at once (admins only)
#[utoipa::path(
    delete,
    path = "/api/users",
    request_body = DeleteUsersRequest,
    responses(
        (status = 204, description = "Users deleted"),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "User not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required, or deleting yourself", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _admin, actor, dto))]
pub async fn delete_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    CurrentUser(actor): CurrentUser,
    ValidatedJson(dto): ValidatedJson<DeleteUsersRequest>,
) -> Result<StatusCode, AppError> {
    UserService::delete_many(&state, &actor, &dto.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ids that are not UUIDs name no user.
fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::not_found(anyhow!("user not found")))
}
