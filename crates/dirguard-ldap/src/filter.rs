//! Search filter helpers.
//!
//! Filters are opaque strings as far as the query engine is concerned; these helpers only build
//! the handful of simple forms callers commonly need, with values escaped.

/// Matches any entry, independent of its attributes.
pub const ANY_OBJECT: &str = "(objectClass=*)";

/// Escapes a value for use inside a filter assertion.
#[must_use]
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Builds an equality filter such as `(uid=t1)`.
#[must_use]
pub fn equality(attribute: &str, value: &str) -> String {
    format!("({attribute}={})", escape_value(value))
}
