/// Trims surrounding whitespace and lower-cases.
///
/// Usernames and emails are stored and looked up in this form.
pub fn clean_lower(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Trims surrounding whitespace.
pub fn clean(s: &str) -> String {
    s.trim().to_string()
}
