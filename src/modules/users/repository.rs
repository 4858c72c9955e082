//! User storage.
//!
//! [`UserRepository`] is the only way the application reads or writes user
//! records. [`PgUserRepository`] backs the server and CLI;
//! [`InMemoryUserRepository`] backs tests and local runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use academia_core::AppError;
use academia_models::User;
use academia_models::users::UserQuery;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Match `identifier` against usernames and emails.
    async fn get_by_username_or_email(&self, identifier: &str) -> Result<Option<User>, AppError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Persist every mutable field of `user`.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Users matching `query`, oldest first.
    async fn list(&self, query: &UserQuery) -> Result<Vec<User>, AppError>;

    /// Delete every user in `ids`, returning how many existed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError>;

    /// Whether a user other than `except` has `username`.
    async fn username_taken(&self, username: &str, except: Option<Uuid>) -> Result<bool, AppError>;

    /// Whether a user other than `except` has `email`.
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| predicate(user))
            .cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_username_or_email(&self, identifier: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .find(|u| {
                u.username.as_deref() == Some(identifier) || u.email.as_deref() == Some(identifier)
            })
            .await)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.find(|u| u.email.as_deref() == Some(email)).await)
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AppError::internal(anyhow::anyhow!(
                "duplicate user id {}",
                user.id
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user.clone())
            }
            None => Err(AppError::not_found(anyhow::anyhow!("user not found"))),
        }
    }

    async fn list(&self, query: &UserQuery) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| query.matches(user))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut users = self.users.write().await;
        Ok(ids.iter().filter(|id| users.remove(*id).is_some()).count() as u64)
    }

    async fn username_taken(&self, username: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        Ok(self
            .find(|u| u.username.as_deref() == Some(username) && Some(u.id) != except)
            .await
            .is_some())
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        Ok(self
            .find(|u| u.email.as_deref() == Some(email) && Some(u.id) != except)
            .await
            .is_some())
    }
}

const USER_COLUMNS: &str = "id, name, username, email, password_hash, is_active, roles, \
                            last_login, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn get_by_username_or_email(&self, identifier: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(&user.roles)
        .bind(user.last_login)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, username = $3, email = $4, password_hash = $5, \
             is_active = $6, roles = $7, last_login = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(&user.roles)
        .bind(user.last_login)
        .bind(user.updated_at)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("user not found")))
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &UserQuery) -> Result<Vec<User>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE TRUE"));

        if let Some(search) = &query.search {
            let pattern = format!("%{}%", escape_like(search));
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(role) = &query.role {
            builder.push(" AND ").push_bind(role.clone()).push(" = ANY(roles)");
        }
        if let Some(is_active) = query.is_active {
            builder.push(" AND is_active = ").push_bind(is_active);
        }
        if let Some(from) = query.created_from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = query.created_to {
            builder.push(" AND created_at <= ").push_bind(to);
        }
        builder.push(" ORDER BY created_at, id");

        builder
            .build_query_as::<User>()
            .fetch_all(&self.db)
            .await
            .map_err(AppError::database)
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.db)
            .await
            .map(|result| result.rows_affected())
            .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn username_taken(&self, username: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(username)
        .bind(except)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::database)
    }

    #[instrument(skip(self))]
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::database)
    }
}

/// Escape `%`, `_` and `\\` so user input matches literally in `LIKE`.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
