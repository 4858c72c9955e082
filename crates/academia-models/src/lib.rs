//! # Academia Models
//!
//! Domain models and DTOs for the Academia API.
//!
//! - [`users`]: The [`User`] record and user-management DTOs
//! - [`roles`]: Role strings, the role catalogue and role membership validation
//! - [`auth`]: Login, token and password-reset DTOs
//! - [`validation`]: Password policy and field validators shared by DTOs
//!
//! Request DTOs implement [`Normalize`] so surrounding whitespace and case are
//! cleaned before validation runs.

pub mod auth;
pub mod roles;
pub mod users;
pub mod validation;

pub use roles::Role;
pub use users::User;

/// In-place cleanup applied to a request body before it is validated.
pub trait Normalize {
    fn normalize(&mut self) {}
}
