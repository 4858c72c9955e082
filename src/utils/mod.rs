//! Shared utilities.
//!
//! - [`email`]: Email dispatch over SMTP, or to the console in development and tests

pub mod email;
