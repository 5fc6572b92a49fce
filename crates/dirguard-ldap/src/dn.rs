//! Distinguished name parsing.
//!
//! Existence checks and equality treat DNs as opaque strings. Parsing is only needed where a
//! DN has to be taken apart, which is when a move target is split into its leading RDN and the
//! new parent for the wire rename. Both halves keep the caller's text exactly, escapes
//! included; nothing is decoded or re-encoded.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use dirguard_core::Error as CoreError;

/// Errors that can occur when parsing a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistinguishedNameError {
    /// The distinguished name was empty.
    #[error("distinguished name cannot be empty")]
    Empty,
    /// A component in the distinguished name was invalid.
    #[error("invalid distinguished name component: {0}")]
    InvalidComponent(String),
    /// A component was missing the attribute name to the left of the `=`.
    #[error("distinguished name component missing attribute: {0}")]
    MissingAttribute(String),
    /// A component was missing the value to the right of the `=`.
    #[error("distinguished name component missing value for attribute {0}")]
    MissingValue(String),
    /// A backslash was followed by a single hex digit instead of a pair.
    #[error("invalid escape sequence in distinguished name value: {0}")]
    InvalidEscape(String),
    /// The distinguished name ended with an escape character.
    #[error("distinguished name contains an unterminated escape sequence")]
    UnterminatedEscape,
}

impl From<DistinguishedNameError> for CoreError {
    fn from(err: DistinguishedNameError) -> Self {
        CoreError::InvalidDn(err.to_string())
    }
}

/// Parsed distinguished name.
///
/// RDNs are ordered leaf first and stored as written; a multi-valued RDN stays one
/// `+`-joined string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName {
    raw: String,
    rdns: Vec<String>,
}

impl DistinguishedName {
    /// Parses a distinguished name from a string.
    ///
    /// # Errors
    ///
    /// Returns [`DistinguishedNameError`] if the distinguished name is empty or contains invalid
    /// syntax.
    pub fn parse(input: impl AsRef<str>) -> std::result::Result<Self, DistinguishedNameError> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(DistinguishedNameError::Empty);
        }

        let rdns = split_unescaped(raw, ',')?;
        for rdn in &rdns {
            for assertion in split_unescaped(rdn, '+')? {
                check_assertion(assertion)?;
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            rdns: rdns.into_iter().map(str::to_string).collect(),
        })
    }

    /// Borrows the string form, as given to [`DistinguishedName::parse`] minus surrounding
    /// whitespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the RDNs in order, leaf first.
    #[must_use]
    pub fn rdns(&self) -> &[String] {
        &self.rdns
    }

    /// The leading (leaf) RDN exactly as written, e.g. `uid=t1`.
    #[must_use]
    pub fn leading_rdn(&self) -> &str {
        &self.rdns[0]
    }

    /// Everything after the leading RDN, or `None` for a single-RDN name.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let separator = unescaped_positions(&self.raw, ',').next()?;
        Some(Self {
            raw: self.raw[separator + 1..].trim_start().to_string(),
            rdns: self.rdns[1..].to_vec(),
        })
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DistinguishedName {
    type Err = DistinguishedNameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Byte offsets of every `delimiter` not preceded by an escaping backslash.
fn unescaped_positions(input: &str, delimiter: char) -> impl Iterator<Item = usize> + '_ {
    let mut escape = false;
    input.char_indices().filter_map(move |(i, ch)| {
        if escape {
            escape = false;
            None
        } else if ch == '\\' {
            escape = true;
            None
        } else if ch == delimiter {
            Some(i)
        } else {
            None
        }
    })
}

fn split_unescaped(
    input: &str,
    delimiter: char,
) -> std::result::Result<Vec<&str>, DistinguishedNameError> {
    let trailing = input.chars().rev().take_while(|ch| *ch == '\\').count();
    if trailing % 2 == 1 {
        return Err(DistinguishedNameError::UnterminatedEscape);
    }

    let mut parts = Vec::new();
    let mut start = 0;
    for end in unescaped_positions(input, delimiter) {
        parts.push(input[start..end].trim());
        start = end + delimiter.len_utf8();
    }
    parts.push(input[start..].trim());

    if parts.iter().any(|part| part.is_empty()) {
        return Err(DistinguishedNameError::InvalidComponent(input.to_string()));
    }
    Ok(parts)
}

fn check_assertion(assertion: &str) -> std::result::Result<(), DistinguishedNameError> {
    let equals = unescaped_positions(assertion, '=')
        .next()
        .ok_or_else(|| DistinguishedNameError::InvalidComponent(assertion.to_string()))?;
    let attribute = assertion[..equals].trim();
    let value = assertion[equals + 1..].trim_start();

    if attribute.is_empty() {
        return Err(DistinguishedNameError::MissingAttribute(
            assertion.to_string(),
        ));
    }
    if value.is_empty() {
        return Err(DistinguishedNameError::MissingValue(attribute.to_string()));
    }

    // An escape is either `\` plus one special character or `\` plus two hex digits.
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            continue;
        }
        match chars.next() {
            Some(first) if first.is_ascii_hexdigit() => {
                if !chars.next().is_some_and(|second| second.is_ascii_hexdigit()) {
                    return Err(DistinguishedNameError::InvalidEscape(value.to_string()));
                }
            }
            Some(_) => {}
            None => return Err(DistinguishedNameError::UnterminatedEscape),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_dn() {
        let dn = DistinguishedName::parse(" uid=t1,ou=people,dc=example,dc=com ").unwrap();
        assert_eq!(dn.rdns().len(), 4);
        assert_eq!(dn.leading_rdn(), "uid=t1");
        assert_eq!(dn.to_string(), "uid=t1,ou=people,dc=example,dc=com");
        assert_eq!(
            dn.parent().unwrap().as_str(),
            "ou=people,dc=example,dc=com"
        );
    }

    #[test]
    fn parent_keeps_spacing_of_remaining_components() {
        let dn = DistinguishedName::parse("uid=t1, ou=people, dc=example, dc=com").unwrap();
        assert_eq!(dn.parent().unwrap().as_str(), "ou=people, dc=example, dc=com");
        assert_eq!(dn.parent().unwrap().rdns().len(), 3);
    }

    #[test]
    fn escaped_comma_stays_in_leading_rdn() {
        let dn = DistinguishedName::parse("cn=Smith\\, John,ou=people,dc=example,dc=com").unwrap();
        assert_eq!(dn.leading_rdn(), "cn=Smith\\, John");
        assert_eq!(dn.parent().unwrap().as_str(), "ou=people,dc=example,dc=com");
    }

    #[test]
    fn hex_escapes_are_passed_through() {
        let dn = DistinguishedName::parse("cn=a\\2Cb,ou=staff,dc=example,dc=com").unwrap();
        assert_eq!(dn.leading_rdn(), "cn=a\\2Cb");
        assert_eq!(dn.parent().unwrap().as_str(), "ou=staff,dc=example,dc=com");

        let dn = DistinguishedName::parse("cn=Jos\\C3\\A9,ou=people,dc=example,dc=com").unwrap();
        assert_eq!(dn.leading_rdn(), "cn=Jos\\C3\\A9");
    }

    #[test]
    fn escaped_backslash_before_separator() {
        let dn = DistinguishedName::parse("cn=a\\\\,dc=com").unwrap();
        assert_eq!(dn.leading_rdn(), "cn=a\\\\");
        assert_eq!(dn.parent().unwrap().as_str(), "dc=com");
    }

    #[test]
    fn parse_multi_valued_rdn() {
        let dn = DistinguishedName::parse("cn=John+uid=1234,ou=people,dc=example,dc=com").unwrap();
        assert_eq!(dn.rdns().len(), 3);
        assert_eq!(dn.leading_rdn(), "cn=John+uid=1234");
    }

    #[test]
    fn single_rdn_has_no_parent() {
        let dn = DistinguishedName::parse("dc=com").unwrap();
        assert_eq!(dn.leading_rdn(), "dc=com");
        assert!(dn.parent().is_none());
    }

    #[test]
    fn invalid_inputs() {
        assert_eq!(
            DistinguishedName::parse("  ").unwrap_err(),
            DistinguishedNameError::Empty
        );
        assert!(matches!(
            DistinguishedName::parse("cn=John,").unwrap_err(),
            DistinguishedNameError::InvalidComponent(_)
        ));
        assert!(matches!(
            DistinguishedName::parse("not a dn").unwrap_err(),
            DistinguishedNameError::InvalidComponent(_)
        ));
        assert!(matches!(
            DistinguishedName::parse("=John").unwrap_err(),
            DistinguishedNameError::MissingAttribute(_)
        ));
        assert!(matches!(
            DistinguishedName::parse("cn=").unwrap_err(),
            DistinguishedNameError::MissingValue(_)
        ));
        assert!(matches!(
            DistinguishedName::parse("cn=a\\2,dc=com").unwrap_err(),
            DistinguishedNameError::InvalidEscape(_)
        ));
        assert_eq!(
            DistinguishedName::parse("cn=John\\").unwrap_err(),
            DistinguishedNameError::UnterminatedEscape
        );
    }

    #[test]
    fn converts_into_invalid_dn_error() {
        let err: CoreError = DistinguishedNameError::Empty.into();
        assert!(matches!(err, CoreError::InvalidDn(_)));
    }
}
