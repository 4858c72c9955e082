//! User domain model and user-management DTOs.

use academia_core::text::{clean, clean_lower};
use academia_core::{AppError, FieldError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::Normalize;
use crate::roles::{ROLE_ADMIN, ROLE_STUDENT, ROLE_TEACHER, validate_roles};
use crate::validation::{
    PASSWORD_TOO_SIMILAR, validate_password_policy, validate_password_similarity,
    validate_username_chars,
};

/// A user account.
///
/// Token code treats a `User` as a read-only snapshot: session claims and
/// password-reset tokens are derived from it but never write back to it.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, active user.
    pub fn new(
        name: &str,
        username: Option<&str>,
        email: Option<&str>,
        password_hash: String,
        roles: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            username: username.map(str::to_string),
            email: email.map(str::to_string),
            password_hash,
            is_active: true,
            roles,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn role_starts_with(&self, prefix: &str) -> bool {
        self.roles.iter().any(|role| role.starts_with(prefix))
    }

    pub fn is_admin(&self) -> bool {
        self.role_starts_with(ROLE_ADMIN)
    }

    pub fn is_teacher(&self) -> bool {
        self.role_starts_with(ROLE_TEACHER)
    }

    pub fn is_student(&self) -> bool {
        self.role_starts_with(ROLE_STUDENT)
    }

    /// Reject a new password that resembles this user's name, username or email.
    pub fn check_password_similarity(&self, password: &str) -> Result<(), AppError> {
        validate_password_similarity(
            password,
            [
                Some(self.name.as_str()),
                self.username.as_deref(),
                self.email.as_deref(),
            ],
        )
        .map_err(|_| AppError::field("password", PASSWORD_TOO_SIMILAR))
    }

    /// Name used to greet the user, falling back to their username.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_default()
    }
}

/// Information needed to create a user.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
#[validate(schema(function = "validate_new_user_password"))]
pub struct NewUser {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(
        length(min = 6, message = "username must contain at least 6 characters"),
        custom(function = "validate_username_chars")
    )]
    pub username: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirm: String,
    #[serde(default)]
    #[validate(custom(function = "validate_roles"))]
    pub roles: Vec<String>,
}

impl NewUser {
    /// At least one of username or email must identify the account.
    pub fn check_identifiers(&self) -> Result<(), AppError> {
        if self.username.is_none() && self.email.is_none() {
            let message = "one of username or email is required";
            return Err(AppError::validation(vec![
                FieldError::new("username", message),
                FieldError::new("email", message),
            ]));
        }
        Ok(())
    }
}

fn validate_new_user_password(user: &NewUser) -> Result<(), ValidationError> {
    validate_password_similarity(
        &user.password,
        [
            Some(user.name.as_str()),
            user.username.as_deref(),
            user.email.as_deref(),
        ],
    )
}

fn clean_optional(value: &mut Option<String>) {
    *value = value
        .as_deref()
        .map(clean_lower)
        .filter(|s| !s.is_empty());
}

impl Normalize for NewUser {
    fn normalize(&mut self) {
        self.name = clean(&self.name);
        clean_optional(&mut self.username);
        clean_optional(&mut self.email);
    }
}

/// Changes to an existing user. Absent fields are left as they are.
///
/// Only admins may change `is_active`, `roles`, `username` or `email`.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    #[validate(
        length(min = 6, message = "username must contain at least 6 characters"),
        custom(function = "validate_username_chars")
    )]
    pub username: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    pub is_active: Option<bool>,
    #[validate(custom(function = "validate_roles"))]
    pub roles: Option<Vec<String>>,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: Option<String>,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirm: Option<String>,
}

impl UpdateUser {
    /// Touches a field reserved for admins.
    pub fn changes_admin_fields(&self) -> bool {
        self.is_active.is_some()
            || self.roles.is_some()
            || self.username.is_some()
            || self.email.is_some()
    }

    /// Copy the requested changes onto `user`, leaving the password alone.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(username) = &self.username {
            user.username = Some(username.clone());
        }
        if let Some(email) = &self.email {
            user.email = Some(email.clone());
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        if let Some(roles) = &self.roles {
            user.roles = roles.clone();
        }
    }
}

impl Normalize for UpdateUser {
    fn normalize(&mut self) {
        self.name = self
            .name
            .as_deref()
            .map(clean)
            .filter(|s| !s.is_empty());
        clean_optional(&mut self.username);
        clean_optional(&mut self.email);
    }
}

/// Filters for listing users. Every filter present must match.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Case-insensitive substring of the name, username or email.
    pub search: Option<String>,
    /// Exact role the user must hold.
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(search) = &self.search {
            let search = search.to_lowercase();
            let hit = [
                Some(user.name.as_str()),
                user.username.as_deref(),
                user.email.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase().contains(&search));
            if !hit {
                return false;
            }
        }
        if let Some(role) = &self.role {
            if !user.roles.iter().any(|r| r == role) {
                return false;
            }
        }
        if self.is_active.is_some_and(|active| active != user.is_active) {
            return false;
        }
        if self.created_from.is_some_and(|from| user.created_at < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| user.created_at > to) {
            return false;
        }
        true
    }
}

impl Normalize for UserQuery {
    fn normalize(&mut self) {
        self.search = self
            .search
            .as_deref()
            .map(clean)
            .filter(|s| !s.is_empty());
        self.role = self
            .role
            .as_deref()
            .map(clean)
            .filter(|s| !s.is_empty());
    }
}

/// Ids of the users to delete in one request.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct DeleteUsersRequest {
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

impl Normalize for DeleteUsersRequest {}
