//! # Academia Core
//!
//! Core types, errors, and utilities for the Academia API.
//!
//! - [`errors`]: Application error type with HTTP response conversion and field errors
//! - [`clock`]: Injectable time source used by every expiry check
//! - [`password`]: Password hashing and verification (bcrypt)
//! - [`text`]: Input normalisation helpers
//!
//! # Example
//!
//! ```ignore
//! use academia_core::{AppError, Clock, SystemClock, hash_password};
//!
//! let hash = hash_password("S3cret!pass")?;
//! let now = SystemClock.now();
//! let error = AppError::field("roles", "invalid roles");
//! ```

pub mod clock;
pub mod errors;
pub mod password;
pub mod text;

// Re-export commonly used types at crate root
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{AppError, FieldError};
pub use password::{hash_password, verify_password, verify_password_or_dummy};
