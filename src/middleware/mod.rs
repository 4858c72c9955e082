//! Request extractors for authentication and authorization.
//!
//! - [`auth::AuthUser`]: verified session claims from the `Authorization: Bearer` header
//! - [`auth::CurrentUser`]: the user behind those claims, loaded once per request
//! - [`auth::RequireAdmin`]: claims of an admin-tier user
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{CurrentUser, RequireAdmin};
//!
//! async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
//!     Json(user)
//! }
//!
//! async fn roles(RequireAdmin(_claims): RequireAdmin) -> Json<Vec<Role>> {
//!     Json(role_catalogue())
//! }
//! ```

pub mod auth;
