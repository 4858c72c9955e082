//! Role strings and the role catalogue.
//!
//! Roles are plain strings grouped into tiers by prefix: every role starting
//! with [`ROLE_ADMIN`] belongs to the admin tier, and so on. Ranking roles
//! against each other is the job of the priority authorizer in
//! `academia-auth`; this module only knows which strings are valid.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

pub const ROLE_ADMIN: &str = "admin:";
pub const ROLE_ADMIN_OWNER: &str = "admin:owner";
pub const ROLE_ADMIN_PRINCIPAL: &str = "admin:principal";
pub const ROLE_TEACHER: &str = "teacher:";
pub const ROLE_STUDENT: &str = "student:";

pub const ALL_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_ADMIN_OWNER,
    ROLE_ADMIN_PRINCIPAL,
    ROLE_TEACHER,
    ROLE_STUDENT,
];

/// A role as presented to administrators choosing roles for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub name: String,
    pub value: String,
}

/// Every assignable role, lowest tier first.
pub fn role_catalogue() -> Vec<Role> {
    [
        ("Student", ROLE_STUDENT),
        ("Teacher", ROLE_TEACHER),
        ("Admin", ROLE_ADMIN),
        ("Admin Principal", ROLE_ADMIN_PRINCIPAL),
        ("Admin Owner", ROLE_ADMIN_OWNER),
    ]
    .into_iter()
    .map(|(name, value)| Role {
        name: name.to_string(),
        value: value.to_string(),
    })
    .collect()
}

pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

/// Every role name in a user's role set is one of [`ALL_ROLES`].
pub fn validate_roles(roles: &[String]) -> Result<(), ValidationError> {
    if roles.iter().all(|r| is_known_role(r)) {
        Ok(())
    } else {
        Err(ValidationError::new("allroles").with_message("invalid roles".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_covers_all_roles() {
        let catalogue = role_catalogue();
        assert_eq!(catalogue.len(), ALL_ROLES.len());
        for role in ALL_ROLES {
            assert!(catalogue.iter().any(|r| r.value == *role));
        }
    }

    #[test]
    fn test_validate_roles() {
        assert!(validate_roles(&[]).is_ok());
        assert!(validate_roles(&["admin:owner".to_string(), "student:".to_string()]).is_ok());

        let err = validate_roles(&["student:".to_string(), "janitor".to_string()]).unwrap_err();
        assert_eq!(err.code, "allroles");
    }

    #[test]
    fn test_tier_prefix_is_not_itself_a_wildcard() {
        assert!(!is_known_role("admin:janitor"));
        assert!(is_known_role("admin:"));
    }
}
