//! `@handle` extraction for free-text fields.
//!
//! A handle is an `@` at the start of the text or after a character that is
//! neither a word character nor another `@`, followed by one or more word
//! characters. The first non-word character ends the handle, so `@bob!`,
//! `@bob,` and `@bob's` all yield `bob`, while `bob@example.com` yields nothing.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w@])@(\w+)").expect("handle regex is valid"));

/// Extract the distinct handles in `text`, lowercased, in order of first appearance.
pub fn extract_handles(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HANDLE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .filter(|handle| seen.insert(handle.clone()))
        .collect()
}

/// Same as [`extract_handles`], treating a missing value as empty text.
pub fn extract_handles_opt(text: Option<&str>) -> Vec<String> {
    text.map(extract_handles).unwrap_or_default()
}

/// Normalize a name or handle for case-insensitive comparison.
pub fn normalize_handle(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_single_handle() {
        assert_eq!(extract_handles("Thanks @bob!"), vec!["bob"]);
    }

    #[test]
    fn test_handle_at_start_of_text() {
        assert_eq!(extract_handles("@carol can you help?"), vec!["carol"]);
    }

    #[test]
    fn test_case_folds_and_dedupes() {
        assert_eq!(extract_handles("@Bob, @bob and @BOB"), vec!["bob"]);
        assert_eq!(extract_handles("@bob and @bob again"), vec!["bob"]);
    }

    #[test]
    fn test_keeps_first_appearance_order() {
        assert_eq!(
            extract_handles("@dave then @alice then @dave"),
            vec!["dave", "alice"]
        );
    }

    #[test]
    fn test_punctuation_terminates_handle() {
        assert_eq!(
            extract_handles("(@bob) @alice's @carol. @dave-smith"),
            vec!["bob", "alice", "carol", "dave"]
        );
    }

    #[test]
    fn test_ignores_email_addresses() {
        assert!(extract_handles("write to bob@example.com").is_empty());
    }

    #[test]
    fn test_ignores_bare_and_doubled_at() {
        assert!(extract_handles("meet @ noon").is_empty());
        assert!(extract_handles("@@bob").is_empty());
    }

    #[test]
    fn test_unicode_handles() {
        assert_eq!(extract_handles("merci @Zoé!"), vec!["zoé"]);
    }

    #[test]
    fn test_missing_text_has_no_handles() {
        assert!(extract_handles_opt(None).is_empty());
        assert!(extract_handles_opt(Some("")).is_empty());
    }

    #[test]
    fn test_normalize_handle_strips_whitespace() {
        assert_eq!(normalize_handle("Mary Jane"), "maryjane");
        assert_eq!(normalize_handle("  BOB "), "bob");
    }
}
