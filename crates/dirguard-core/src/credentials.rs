//! Bind credentials for authenticating a directory session.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Identity and secret used for the simple bind that opens a session.
///
/// The secret is held in a [`SecretString`]: it is redacted from `Debug` output and never
/// serialized.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BindCredentials {
    /// Bind identity (usually a DN such as `cn=admin,dc=example,dc=com`)
    #[validate(length(min = 1))]
    pub identity: String,

    /// Bind secret
    #[serde(skip_serializing, deserialize_with = "deserialize_secret")]
    pub secret: SecretString,
}

impl BindCredentials {
    /// Create new bind credentials.
    #[must_use]
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Get the bind identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Get the bind secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_accessors() {
        let creds = BindCredentials::new("cn=admin,dc=example,dc=com", "secret");
        assert_eq!(creds.identity(), "cn=admin,dc=example,dc=com");
        assert_eq!(creds.secret(), "secret");
    }

    #[test]
    fn test_secret_is_redacted() {
        let creds = BindCredentials::new("cn=admin,dc=example,dc=com", "hunter2");

        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("cn=admin,dc=example,dc=com"));

        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credentials_deserialization() {
        let creds: BindCredentials =
            serde_json::from_str(r#"{"identity":"cn=admin","secret":"pw"}"#).unwrap();
        assert_eq!(creds.identity(), "cn=admin");
        assert_eq!(creds.secret(), "pw");
    }

    #[test]
    fn test_empty_identity_rejected() {
        let creds = BindCredentials::new("", "pw");
        assert!(creds.validate().is_err());
    }
}
