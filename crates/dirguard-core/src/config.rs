//! Configuration for opening directory sessions.
//!
//! A [`DirectoryConfig`] is an explicit value handed to session construction. It can be built in
//! code with [`DirectoryConfig::new`] and the `with_*` overrides, or deserialized from any serde
//! format and checked with [`DirectoryConfig::validated`].

use crate::credentials::BindCredentials;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default connection timeout (seconds).
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;
/// Default operation timeout (seconds).
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;

const SUPPORTED_SCHEMES: &[&str] = &["ldap", "ldaps", "ldapi"];

/// Connection settings for a directory server.
///
/// Serializing a config omits the bind secret, so the output documents a deployment but cannot
/// be deserialized back on its own: `credentials.secret` is required on input and has to be
/// supplied again (for example from the environment or a secret store).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DirectoryConfig {
    /// Server address (e.g. `ldaps://ldap.example.com:636`)
    #[validate(url)]
    pub url: String,

    /// Default search root for queries
    #[validate(length(min = 1))]
    pub base_dn: String,

    /// Bind identity and secret
    #[validate(nested)]
    pub credentials: BindCredentials,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Connection timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,

    /// Per-operation timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_connection_timeout_secs() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT_SECS
}

const fn default_operation_timeout_secs() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_SECS
}

impl DirectoryConfig {
    /// Create a new directory configuration.
    ///
    /// # Arguments
    ///
    /// * `url` - Server address using the `ldap`, `ldaps` or `ldapi` scheme
    /// * `base_dn` - Default search root
    /// * `credentials` - Identity and secret for the session bind
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is invalid or validation fails.
    pub fn new(
        url: impl Into<String>,
        base_dn: impl Into<String>,
        credentials: BindCredentials,
    ) -> Result<Self, Error> {
        Self {
            url: url.into(),
            base_dn: base_dn.into(),
            credentials,
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            connection_timeout_secs: default_connection_timeout_secs(),
            operation_timeout_secs: default_operation_timeout_secs(),
        }
        .validated()
    }

    /// Checks a configuration obtained by other means (e.g. deserialization).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validated(self) -> Result<Self, Error> {
        self.check()?;
        Ok(self)
    }

    /// Checks field constraints and the URL scheme without consuming the config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

        let url = self.parse_url()?;
        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(Error::Config(format!(
                "unsupported directory URL scheme `{}`",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Parse the server URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.url)?)
    }

    /// Returns the server URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the default search root.
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Returns the bind credentials.
    #[must_use]
    pub const fn credentials(&self) -> &BindCredentials {
        &self.credentials
    }

    /// Returns whether TLS certificate verification is enabled.
    #[must_use]
    pub const fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    /// Optional custom CA certificate path.
    #[must_use]
    pub fn tls_ca_cert(&self) -> Option<&PathBuf> {
        self.tls_ca_cert.as_ref()
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Returns the operation timeout duration.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Enables or disables TLS certificate verification.
    #[must_use]
    pub const fn with_tls_verification(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Sets the custom CA certificate path for TLS verification.
    #[must_use]
    pub fn with_tls_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Overrides the connection timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `seconds` is between 1 and 300.
    pub fn with_connection_timeout_secs(mut self, seconds: u64) -> Result<Self, Error> {
        self.connection_timeout_secs = seconds;
        self.validated()
    }

    /// Overrides the operation timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `seconds` is between 1 and 300.
    pub fn with_operation_timeout_secs(mut self, seconds: u64) -> Result<Self, Error> {
        self.operation_timeout_secs = seconds;
        self.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> BindCredentials {
        BindCredentials::new("cn=admin,dc=example,dc=com", "secret")
    }

    #[test]
    fn test_directory_config_new() {
        let config =
            DirectoryConfig::new("ldaps://ldap.example.com", "dc=example,dc=com", creds())
                .unwrap();
        assert_eq!(config.url(), "ldaps://ldap.example.com");
        assert_eq!(config.base_dn(), "dc=example,dc=com");
        assert!(config.tls_verify());
        assert_eq!(config.connection_timeout(), Duration::from_secs(10));
        assert_eq!(config.operation_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_directory_config_invalid_url() {
        let result = DirectoryConfig::new("not-a-url", "dc=example,dc=com", creds());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_directory_config_rejects_http_scheme() {
        let result = DirectoryConfig::new("https://ldap.example.com", "dc=example,dc=com", creds());
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("https")));
    }

    #[test]
    fn test_directory_config_rejects_empty_base_dn() {
        let result = DirectoryConfig::new("ldap://localhost", "", creds());
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_config_rejects_empty_identity() {
        let result = DirectoryConfig::new(
            "ldap://localhost",
            "dc=example,dc=com",
            BindCredentials::new("", "secret"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_config_rejects_out_of_range_timeouts() {
        let config =
            || DirectoryConfig::new("ldap://localhost:389", "dc=example,dc=com", creds()).unwrap();

        assert!(matches!(
            config().with_operation_timeout_secs(0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config().with_connection_timeout_secs(0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config().with_operation_timeout_secs(301),
            Err(Error::Config(_))
        ));
        assert!(config().with_operation_timeout_secs(300).is_ok());
    }

    #[test]
    fn test_directory_config_check_catches_field_edits() {
        let mut config =
            DirectoryConfig::new("ldap://localhost:389", "dc=example,dc=com", creds()).unwrap();
        config.operation_timeout_secs = 0;
        assert!(matches!(config.check(), Err(Error::Config(_))));
    }

    #[test]
    fn test_directory_config_builder() {
        let config = DirectoryConfig::new("ldap://localhost:389", "dc=example,dc=com", creds())
            .unwrap()
            .with_tls_verification(false)
            .with_tls_ca_cert(PathBuf::from("/etc/ssl/ca.pem"))
            .with_connection_timeout_secs(20)
            .unwrap()
            .with_operation_timeout_secs(30)
            .unwrap();

        assert!(!config.tls_verify());
        assert_eq!(config.tls_ca_cert(), Some(&PathBuf::from("/etc/ssl/ca.pem")));
        assert_eq!(config.connection_timeout(), Duration::from_secs(20));
        assert_eq!(config.operation_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config =
            DirectoryConfig::new("ldap://localhost", "dc=example,dc=com", creds()).unwrap();
        config.operation_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.operation_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.operation_timeout_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization_applies_defaults() {
        let json = r#"{
            "url": "ldap://ldap.example.com",
            "base_dn": "dc=example,dc=com",
            "credentials": {"identity": "cn=admin,dc=example,dc=com", "secret": "pw"}
        }"#;
        let config: DirectoryConfig = serde_json::from_str(json).unwrap();
        let config = config.validated().unwrap();

        assert!(config.tls_verify());
        assert!(config.tls_ca_cert().is_none());
        assert_eq!(config.connection_timeout_secs, DEFAULT_CONNECTION_TIMEOUT_SECS);
        assert_eq!(config.credentials().secret(), "pw");
    }

    #[test]
    fn test_config_serialization_omits_secret() {
        let config = DirectoryConfig::new(
            "ldap://localhost",
            "dc=example,dc=com",
            BindCredentials::new("cn=admin,dc=example,dc=com", "s3cr3t-value"),
        )
        .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("dc=example,dc=com"));
        assert!(!json.contains("s3cr3t-value"));
        assert!(!json.contains("tls_ca_cert"));
    }

    #[test]
    fn test_serialized_config_needs_secret_to_load() {
        let config = DirectoryConfig::new("ldap://localhost", "dc=example,dc=com", creds()).unwrap();
        let mut value = serde_json::to_value(&config).unwrap();
        assert!(serde_json::from_value::<DirectoryConfig>(value.clone()).is_err());

        value["credentials"]["secret"] = serde_json::json!("secret");
        let restored: DirectoryConfig = serde_json::from_value(value).unwrap();
        assert_eq!(restored.credentials().secret(), "secret");
    }
}
