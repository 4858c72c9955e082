//! Session token claims.

use academia_models::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AuthError;

/// Fixed audience of every session token.
pub const AUDIENCE: &str = "Academia";

/// Claims carried by a session token.
///
/// `exp`, `iat` and `oriat` are Unix timestamps in seconds. `oriat` is the
/// issue time of the first token in a refresh chain and never changes across
/// refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    /// Application name
    pub iss: String,
    /// User ID
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(rename = "oriat")]
    pub original_issued_at: i64,
    pub is_student: bool,
    pub is_teacher: bool,
    pub is_admin: bool,
    pub roles: Vec<String>,
}

impl SessionClaims {
    /// Claims for `user`, issued at `issued_at` and valid for `ttl_secs`.
    pub fn for_user(
        user: &User,
        issuer: &str,
        issued_at: i64,
        ttl_secs: i64,
        original_issued_at: Option<i64>,
    ) -> Self {
        Self {
            iss: issuer.to_string(),
            sub: user.id.to_string(),
            aud: AUDIENCE.to_string(),
            exp: issued_at + ttl_secs,
            iat: issued_at,
            original_issued_at: original_issued_at.unwrap_or(issued_at),
            is_student: user.is_student(),
            is_teacher: user.is_teacher(),
            is_admin: user.is_admin(),
            roles: user.roles.clone(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(roles: &[&str]) -> User {
        User::new(
            "Jane",
            Some("jane_doe"),
            None,
            "hash".to_string(),
            roles.iter().map(|r| r.to_string()).collect(),
            Utc::now(),
        )
    }

    #[test]
    fn test_first_issuance_anchors_itself() {
        let u = user(&["teacher:"]);
        let claims = SessionClaims::for_user(&u, "Academia", 1_000, 3600, None);
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 4_600);
        assert_eq!(claims.original_issued_at, 1_000);
        assert_eq!(claims.sub, u.id.to_string());
        assert_eq!(claims.user_id().unwrap(), u.id);
    }

    #[test]
    fn test_refresh_keeps_original_issued_at() {
        let claims = SessionClaims::for_user(&user(&[]), "Academia", 5_000, 60, Some(1_000));
        assert_eq!(claims.iat, 5_000);
        assert_eq!(claims.original_issued_at, 1_000);
    }

    #[test]
    fn test_tier_flags_use_prefix_match() {
        let claims =
            SessionClaims::for_user(&user(&["admin:principal"]), "Academia", 0, 60, None);
        assert!(claims.is_admin);
        assert!(!claims.is_teacher);
        assert!(!claims.is_student);
        assert_eq!(claims.roles, vec!["admin:principal".to_string()]);
    }

    #[test]
    fn test_wire_names() {
        let claims = SessionClaims::for_user(&user(&["student:"]), "Academia", 10, 60, None);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["oriat"], 10);
        assert_eq!(json["aud"], AUDIENCE);
        assert!(json.get("original_issued_at").is_none());
    }

    #[test]
    fn test_bad_subject_is_unauthenticated() {
        let mut claims = SessionClaims::for_user(&user(&[]), "Academia", 0, 60, None);
        claims.sub = "42".to_string();
        assert_eq!(claims.user_id(), Err(AuthError::Unauthenticated));
    }
}
