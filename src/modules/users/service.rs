use academia_auth::ensure_can_assign;
use academia_core::{AppError, FieldError, hash_password};
use academia_models::User;
use academia_models::users::{NewUser, UpdateUser, UserQuery};
use anyhow::anyhow;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::state::AppState;

pub struct UserService;

impl UserService {
    /// Create an active user on behalf of `actor`.
    ///
    /// `dto` must already be normalized and validated, so every requested
    /// role is known. `actor` may not grant a role that outranks their own.
    #[instrument(skip(state, actor, dto), fields(actor_id = %actor.id))]
    pub async fn create_user(
        state: &AppState,
        actor: &User,
        dto: NewUser,
    ) -> Result<User, AppError> {
        dto.check_identifiers()?;
        ensure_can_assign(&actor.roles, &dto.roles)?;

        ensure_identifiers_free(state, dto.username.as_deref(), dto.email.as_deref(), None)
            .await?;

        let user = User::new(
            &dto.name,
            dto.username.as_deref(),
            dto.email.as_deref(),
            hash_password(&dto.password)?,
            dto.roles,
            state.clock.now(),
        );
        let user = state.users.create(&user).await?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(state))]
    pub async fn list(state: &AppState, query: &UserQuery) -> Result<Vec<User>, AppError> {
        state.users.list(query).await
    }

    /// The user `id`, if `actor` may see it. Non-admins only see themselves.
    #[instrument(skip(state, actor), fields(actor_id = %actor.id))]
    pub async fn get_visible(state: &AppState, actor: &User, id: Uuid) -> Result<User, AppError> {
        if actor.id != id && !actor.is_admin() {
            return Err(user_not_found());
        }
        state.users.get_by_id(id).await?.ok_or_else(user_not_found)
    }

    /// Apply `dto` to the user `id` on behalf of `actor`.
    ///
    /// Non-admins may only edit their own name and password. Admins may edit
    /// anyone, but cannot grant a role that outranks their own.
    #[instrument(skip(state, actor, dto), fields(actor_id = %actor.id))]
    pub async fn update(
        state: &AppState,
        actor: &User,
        id: Uuid,
        dto: UpdateUser,
    ) -> Result<User, AppError> {
        if !actor.is_admin() {
            if actor.id != id {
                return Err(AppError::forbidden("you can only edit your own account"));
            }
            if dto.changes_admin_fields() {
                return Err(AppError::forbidden(
                    "only admins can change status, roles, username or email",
                ));
            }
        }
        if let Some(roles) = &dto.roles {
            ensure_can_assign(&actor.roles, roles)?;
        }

        let mut user = state.users.get_by_id(id).await?.ok_or_else(user_not_found)?;
        ensure_identifiers_free(state, dto.username.as_deref(), dto.email.as_deref(), Some(id))
            .await?;

        dto.apply_to(&mut user);
        if user.username.is_none() && user.email.is_none() {
            return Err(AppError::field("username", "one of username or email is required"));
        }
        if let Some(password) = dto.password.as_deref() {
            user.check_password_similarity(password)?;
            user.password_hash = hash_password(password)?;
        }
        user.updated_at = state.clock.now();
        let user = state.users.update(&user).await?;

        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Delete the user `id`. Nobody may delete themselves.
    #[instrument(skip(state, actor), fields(actor_id = %actor.id))]
    pub async fn delete(state: &AppState, actor: &User, id: Uuid) -> Result<(), AppError> {
        if actor.id == id {
            return Err(AppError::forbidden("you cannot delete your own account"));
        }
        if state.users.delete_many(&[id]).await? == 0 {
            return Err(user_not_found());
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Delete every user in `ids`, skipping ids that do not exist.
    #[instrument(skip(state, actor, ids), fields(actor_id = %actor.id, count = ids.len()))]
    pub async fn delete_many(state: &AppState, actor: &User, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.contains(&actor.id) {
            return Err(AppError::forbidden("you cannot delete your own account"));
        }
        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = state.users.delete_many(ids).await?;
        info!(deleted, "users deleted");
        Ok(deleted)
    }
}

fn user_not_found() -> AppError {
    AppError::not_found(anyhow!("user not found"))
}

/// Reject identifiers another user (anyone but `except`) already holds.
async fn ensure_identifiers_free(
    state: &AppState,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let mut conflicts = Vec::new();
    if let Some(username) = username {
        if state.users.username_taken(username, except).await? {
            conflicts.push(FieldError::new("username", "username already taken"));
        }
    }
    if let Some(email) = email {
        if state.users.email_taken(email, except).await? {
            conflicts.push(FieldError::new("email", "email already taken"));
        }
    }
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(conflicts))
    }
}
