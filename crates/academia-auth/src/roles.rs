//! Role priorities.
//!
//! Every role string maps to an integer priority; higher outranks lower. The
//! table is built once and never mutated. Unknown roles score `0`: membership
//! of a role string is checked earlier by
//! [`academia_models::roles::validate_roles`], and this module only ranks.

use std::collections::HashMap;
use std::sync::LazyLock;

use academia_core::AppError;
use academia_models::roles::{
    ROLE_ADMIN, ROLE_ADMIN_OWNER, ROLE_ADMIN_PRINCIPAL, ROLE_STUDENT, ROLE_TEACHER,
};

pub const NOT_ENOUGH_RIGHTS: &str = "not enough rights to set these roles";

#[derive(Debug)]
pub struct RolePriorityTable {
    priorities: HashMap<&'static str, i32>,
}

static DEFAULT_TABLE: LazyLock<RolePriorityTable> = LazyLock::new(|| {
    RolePriorityTable::new([
        (ROLE_ADMIN_OWNER, 30),
        (ROLE_ADMIN_PRINCIPAL, 29),
        (ROLE_ADMIN, 21),
        (ROLE_TEACHER, 11),
        (ROLE_STUDENT, 1),
    ])
});

impl RolePriorityTable {
    pub fn new(entries: impl IntoIterator<Item = (&'static str, i32)>) -> Self {
        Self {
            priorities: entries.into_iter().collect(),
        }
    }

    /// The application's role table.
    pub fn global() -> &'static RolePriorityTable {
        &DEFAULT_TABLE
    }

    pub fn priority_of(&self, role: &str) -> i32 {
        self.priorities.get(role).copied().unwrap_or(0)
    }

    /// Highest priority in `roles`, `0` when empty.
    pub fn max_priority<S: AsRef<str>>(&self, roles: &[S]) -> i32 {
        roles
            .iter()
            .map(|role| self.priority_of(role.as_ref()))
            .max()
            .unwrap_or(0)
    }

    /// An actor may only hand out roles that do not outrank their own.
    pub fn ensure_can_assign<A, R>(&self, actor_roles: &[A], requested: &[R]) -> Result<(), AppError>
    where
        A: AsRef<str>,
        R: AsRef<str>,
    {
        if self.max_priority(requested) > self.max_priority(actor_roles) {
            return Err(AppError::field("roles", NOT_ENOUGH_RIGHTS));
        }
        Ok(())
    }
}

pub fn priority_of(role: &str) -> i32 {
    RolePriorityTable::global().priority_of(role)
}

pub fn max_priority<S: AsRef<str>>(roles: &[S]) -> i32 {
    RolePriorityTable::global().max_priority(roles)
}

pub fn ensure_can_assign<A, R>(actor_roles: &[A], requested: &[R]) -> Result<(), AppError>
where
    A: AsRef<str>,
    R: AsRef<str>,
{
    RolePriorityTable::global().ensure_can_assign(actor_roles, requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_ordered() {
        assert!(priority_of(ROLE_ADMIN_OWNER) > priority_of(ROLE_ADMIN_PRINCIPAL));
        assert!(priority_of(ROLE_ADMIN_PRINCIPAL) > priority_of(ROLE_ADMIN));
        assert!(priority_of(ROLE_ADMIN) > priority_of(ROLE_TEACHER));
        assert!(priority_of(ROLE_TEACHER) > priority_of(ROLE_STUDENT));
        assert!(priority_of(ROLE_STUDENT) > 0);
    }

    #[test]
    fn test_max_priority() {
        let empty: [&str; 0] = [];
        assert_eq!(max_priority(&empty), 0);
        assert_eq!(max_priority(&["admin:owner"]), 30);
        assert_eq!(max_priority(&["student:", "teacher:"]), 11);
    }

    #[test]
    fn test_unknown_roles_score_zero() {
        assert_eq!(priority_of("janitor"), 0);
        assert_eq!(priority_of("admin:janitor"), 0);
        assert_eq!(max_priority(&["janitor", "student:"]), 1);
    }

    #[test]
    fn test_ensure_can_assign() {
        assert!(ensure_can_assign(&["admin:"], &["teacher:", "student:"]).is_ok());
        assert!(ensure_can_assign(&["admin:"], &["admin:"]).is_ok());

        let err = ensure_can_assign(&["admin:"], &["admin:principal"]).unwrap_err();
        assert_eq!(err.field_message("roles"), Some(NOT_ENOUGH_RIGHTS));

        let none: [&str; 0] = [];
        assert!(ensure_can_assign(&none, &none).is_ok());
        assert!(ensure_can_assign(&none, &["student:"]).is_err());
    }

    #[test]
    fn test_custom_table() {
        let table = RolePriorityTable::new([("a", 2), ("b", 1)]);
        assert_eq!(table.max_priority(&["b", "a"]), 2);
        assert!(table.ensure_can_assign(&["b"], &["a"]).is_err());
    }
}
