//! Field validators shared by request DTOs.
//!
//! Functions here follow the `validator` crate's custom-function signature so
//! they can be used as `#[validate(custom(function = "..."))]`.

use std::collections::HashMap;

use validator::ValidationError;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_SIMILARITY: f64 = 0.7;
pub const PASSWORD_TOO_SIMILAR: &str = "password cannot be similar to user attributes";

/// Parameter naming the field a struct-level error belongs to.
pub const FIELD_PARAM: &str = "field";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Password policy applied to every newly chosen password:
///
/// - at least [`PASSWORD_MIN_LENGTH`] characters
/// - no whitespace
/// - not entirely numeric
/// - at least one upper-case, one lower-case, one digit and one special character
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(error(
            "pwdminlen",
            "password must contain at least 8 characters",
        ));
    }
    if password.chars().any(char::is_whitespace) {
        return Err(error("pwdnospace", "password must not contain whitespace"));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(error("pwdnotallnum", "password cannot be entirely numeric"));
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());
    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(error(
            "pwdcplx",
            "password must contain at least 1 uppercase character, 1 lowercase character, 1 digit and 1 special character",
        ));
    }

    Ok(())
}

/// Order-insensitive likeness of two strings: `2 * shared / (len(a) + len(b))`,
/// where `shared` counts characters common to both, with multiplicity.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }
    let shared = a
        .chars()
        .filter(|c| match available.get_mut(c) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        })
        .count();

    2.0 * shared as f64 / total as f64
}

/// The password must not resemble any of the account's non-empty attributes.
pub fn validate_password_similarity<'a>(
    password: &str,
    attributes: impl IntoIterator<Item = Option<&'a str>>,
) -> Result<(), ValidationError> {
    let too_similar = attributes
        .into_iter()
        .flatten()
        .filter(|attribute| !attribute.is_empty())
        .any(|attribute| similarity_ratio(password, attribute) >= PASSWORD_MAX_SIMILARITY);

    if too_similar {
        let mut err = error("pwdtoosim", PASSWORD_TOO_SIMILAR);
        err.add_param(FIELD_PARAM.into(), &"password");
        return Err(err);
    }
    Ok(())
}

/// Usernames are ASCII letters, digits and underscores.
pub fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(error(
            "alphanum_",
            "username may only contain letters, digits and underscores",
        ))
    }
}
