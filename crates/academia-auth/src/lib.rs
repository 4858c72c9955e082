//! # Academia Auth
//!
//! Credentials for the Academia API.
//!
//! - [`session`]: signed session tokens with a fixed refresh ceiling
//! - [`reset_token`]: stateless, self-expiring password-reset tokens
//! - [`roles`]: role priorities guarding privilege escalation
//! - [`uid`]: user-id encoding for reset links
//!
//! Nothing here reads the system time directly; every type takes a
//! [`Clock`](academia_core::Clock).

pub mod claims;
pub mod error;
pub mod reset_token;
pub mod roles;
pub mod session;
pub mod uid;

pub use claims::{AUDIENCE, SessionClaims};
pub use error::AuthError;
pub use reset_token::{PasswordResetTokens, ResetTokenError};
pub use roles::{RolePriorityTable, ensure_can_assign, max_priority, priority_of};
pub use session::{SessionTokenError, SessionTokens};
pub use uid::{decode_uid, encode_uid};
