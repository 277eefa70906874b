//! # Text Input Validation Utilities
//!
//! Regex patterns shared by request payload validation.

use std::sync::LazyLock;

use regex::Regex;

/// Email validation regex pattern
///
/// Deliberately loose: one `@`, a dotted domain and no whitespace.
/// - `nurse@hopital.fr` ✓ Valid
/// - `nurse@localhost` ✗ Invalid
/// - `invalid-email` ✗ Invalid format
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)+$")
        .expect("Failed to compile email regex")
});

/// Profession slug pattern: lowercase ascii words joined by `_` or `-`.
pub static SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*([_-][a-z0-9]+)*$").expect("Failed to compile slug regex")
});
