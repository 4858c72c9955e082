//! Administrative operations behind `academia-cli`.

use academia_core::text::clean_lower;
use academia_core::{AppError, Clock, hash_password};
use academia_models::User;
use academia_models::roles::ALL_ROLES;
use anyhow::anyhow;

use crate::modules::users::repository::UserRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddUserOutcome {
    Created(User),
    Updated(User),
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(clean_lower).filter(|v| !v.is_empty())
}

/// Create a user, or update the one already owning `username` or `email`.
///
/// The user ends up active with `password`. With `admin`, they hold every role.
pub async fn add_user(
    repo: &dyn UserRepository,
    clock: &dyn Clock,
    username: Option<&str>,
    email: Option<&str>,
    password: &str,
    admin: bool,
) -> Result<AddUserOutcome, AppError> {
    let username = non_empty(username);
    let email = non_empty(email);
    if username.is_none() && email.is_none() {
        return Err(AppError::bad_request(anyhow!(
            "one of username or email is required"
        )));
    }
    if password.is_empty() {
        return Err(AppError::bad_request(anyhow!("password is required")));
    }

    let mut existing = None;
    for identifier in [&username, &email].into_iter().flatten() {
        existing = repo.get_by_username_or_email(identifier).await?;
        if existing.is_some() {
            break;
        }
    }

    let now = clock.now();
    let password_hash = hash_password(password)?;
    let roles = |current: Vec<String>| {
        if admin {
            ALL_ROLES.iter().map(|r| r.to_string()).collect()
        } else {
            current
        }
    };

    match existing {
        Some(mut user) => {
            user.password_hash = password_hash;
            user.is_active = true;
            user.roles = roles(std::mem::take(&mut user.roles));
            user.updated_at = now;
            Ok(AddUserOutcome::Updated(repo.update(&user).await?))
        }
        None => {
            let user = User::new(
                "",
                username.as_deref(),
                email.as_deref(),
                password_hash,
                roles(Vec::new()),
                now,
            );
            Ok(AddUserOutcome::Created(repo.create(&user).await?))
        }
    }
}

/// Set a new password for the user with `identifier` as username or email.
pub async fn reset_password(
    repo: &dyn UserRepository,
    clock: &dyn Clock,
    identifier: &str,
    password: &str,
) -> Result<User, AppError> {
    if password.is_empty() {
        return Err(AppError::bad_request(anyhow!("password is required")));
    }

    let mut user = repo
        .get_by_username_or_email(&clean_lower(identifier))
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("user not found")))?;

    user.password_hash = hash_password(password)?;
    user.updated_at = clock.now();
    repo.update(&user).await
}
