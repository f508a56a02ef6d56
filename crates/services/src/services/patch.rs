//! Merging of partial updates for optional text fields.

/// `None` keeps `current`; blank text clears the field; anything else replaces it.
pub fn patch_text(patch: Option<&str>, current: Option<&str>) -> Option<String> {
    match patch {
        None => current.map(str::to_string),
        Some(text) if text.trim().is_empty() => None,
        Some(text) => Some(text.to_string()),
    }
}

/// Required text: `None` keeps `current`, blank text is rejected with `None`.
pub fn patch_required(patch: Option<&str>, current: &str) -> Option<String> {
    match patch {
        None => Some(current.to_string()),
        Some(text) if text.trim().is_empty() => None,
        Some(text) => Some(text.trim().to_string()),
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
