//! # Academia Config
//!
//! Configuration types for the Academia API, loaded from environment variables:
//!
//! - [`auth`]: Signing secret, session-token lifetimes and reset-token timeout
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`email`]: Email/SMTP configuration
//! - [`server`]: Listen address
//!
//! # Example
//!
//! ```ignore
//! use academia_config::{AuthConfig, CorsConfig, EmailConfig, ServerConfig};
//!
//! let auth_config = AuthConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod email;
pub mod server;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use server::ServerConfig;
