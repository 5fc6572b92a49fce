//! Directory entries and attribute changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map: attribute name to its values, in server order.
pub type Attributes = BTreeMap<String, Vec<String>>;

/// A fully materialized directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute values keyed by attribute name.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Entry {
    /// Creates an entry from a DN and attribute map.
    #[must_use]
    pub fn new(dn: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            dn: dn.into(),
            attributes,
        }
    }

    /// Returns the first value of the attribute if present.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first().map(String::as_str))
    }

    /// Returns all values for the attribute.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[String]> {
        self.attributes.get(attribute).map(Vec::as_slice)
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    /// Returns true if the entry lists `class` among its object classes (case-insensitive).
    #[must_use]
    pub fn has_object_class(&self, class: &str) -> bool {
        self.values("objectClass")
            .is_some_and(|classes| classes.iter().any(|c| c.eq_ignore_ascii_case(class)))
    }
}

impl From<ldap3::SearchEntry> for Entry {
    fn from(entry: ldap3::SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry.attrs.into_iter().collect(),
        }
    }
}

/// A change to a single attribute of an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AttributeChange {
    /// Overwrite every value of the attribute.
    Replace {
        /// Attribute to modify.
        attribute: String,
        /// Replacement values.
        values: Vec<String>,
    },
    /// Append values to the attribute.
    Add {
        /// Attribute to modify.
        attribute: String,
        /// Values to add.
        values: Vec<String>,
    },
    /// Remove the attribute entirely.
    Delete {
        /// Attribute to remove.
        attribute: String,
    },
}

impl AttributeChange {
    /// Builds a replace change.
    pub fn replace<I, S>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Replace {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an add change.
    pub fn add<I, S>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Add {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a delete change.
    pub fn delete(attribute: impl Into<String>) -> Self {
        Self::Delete {
            attribute: attribute.into(),
        }
    }

    /// Name of the attribute this change targets.
    #[must_use]
    pub fn attribute(&self) -> &str {
        match self {
            Self::Replace { attribute, .. }
            | Self::Add { attribute, .. }
            | Self::Delete { attribute } => attribute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        let mut attributes = Attributes::new();
        attributes.insert("cn".to_string(), vec!["t1".to_string()]);
        attributes.insert(
            "objectClass".to_string(),
            vec!["top".to_string(), "inetOrgPerson".to_string()],
        );
        Entry::new("uid=t1,ou=people,dc=example,dc=com", attributes)
    }

    #[test]
    fn accessors() {
        let entry = sample_entry();
        assert_eq!(entry.first("cn"), Some("t1"));
        assert_eq!(entry.values("objectClass").map(<[String]>::len), Some(2));
        assert!(entry.has_attribute("cn"));
        assert!(!entry.has_attribute("mail"));
        assert!(entry.has_object_class("INETORGPERSON"));
        assert!(!entry.has_object_class("groupOfNames"));
    }

    #[test]
    fn from_search_entry() {
        let mut attrs = std::collections::HashMap::new();
        attrs.insert("sn".to_string(), vec!["One".to_string()]);
        let search_entry = ldap3::SearchEntry {
            dn: "uid=t1,dc=example,dc=com".to_string(),
            attrs,
            bin_attrs: std::collections::HashMap::new(),
        };

        let entry = Entry::from(search_entry);
        assert_eq!(entry.dn, "uid=t1,dc=example,dc=com");
        assert_eq!(entry.first("sn"), Some("One"));
    }

    #[test]
    fn change_builders() {
        assert_eq!(
            AttributeChange::replace("mail", ["t1@example.com"]),
            AttributeChange::Replace {
                attribute: "mail".to_string(),
                values: vec!["t1@example.com".to_string()],
            }
        );
        assert_eq!(AttributeChange::add("mail", Vec::<String>::new()).attribute(), "mail");
        assert_eq!(AttributeChange::delete("mail").attribute(), "mail");
    }
}
