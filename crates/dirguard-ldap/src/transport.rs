//! Boundary between the session and the wire protocol.
//!
//! A [`DirectoryConnector`] opens a [`DirectoryTransport`], which performs exactly one protocol
//! exchange per call. Transport-level failures (socket, framing, timeout) come back as `Err`;
//! anything the server answered comes back as a [`WireStatus`] so the session decides what the
//! result code means.

use crate::entry::{AttributeChange, Attributes, Entry};
use crate::Result;
use async_trait::async_trait;
use ldap3::Scope;

/// Protocol result codes interpreted by the session.
pub mod result_code {
    /// Operation completed.
    pub const SUCCESS: u32 = 0;
    /// The base or target entry does not exist.
    pub const NO_SUCH_OBJECT: u32 = 32;
    /// The bind identity or secret was rejected.
    pub const INVALID_CREDENTIALS: u32 = 49;
    /// An entry already exists at the target DN.
    pub const ENTRY_ALREADY_EXISTS: u32 = 68;
}

/// Represents the search scope for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Base object only.
    Base,
    /// One level below the base.
    OneLevel,
    /// Entire subtree, base included.
    Subtree,
}

impl From<SearchScope> for Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        }
    }
}

/// Result code and diagnostic the server returned for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireStatus {
    /// Protocol result code.
    pub code: u32,
    /// Diagnostic message (may be empty).
    pub diagnostic: String,
}

impl WireStatus {
    /// A successful status with no diagnostic.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// A status with the given code and diagnostic.
    #[must_use]
    pub fn new(code: u32, diagnostic: impl Into<String>) -> Self {
        Self {
            code,
            diagnostic: diagnostic.into(),
        }
    }

    /// Returns true for result code 0.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == result_code::SUCCESS
    }
}

impl From<ldap3::LdapResult> for WireStatus {
    fn from(result: ldap3::LdapResult) -> Self {
        Self {
            code: result.rc,
            diagnostic: result.text,
        }
    }
}

/// Entries delivered by a search, together with the terminating status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResponse {
    /// Entries in delivery order.
    pub entries: Vec<Entry>,
    /// Status carried by the end-of-results message.
    pub status: WireStatus,
}

/// Where a rename moves an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTarget {
    /// New leading RDN, e.g. `uid=t2`.
    pub new_rdn: String,
    /// New parent DN, or `None` to stay under the current parent.
    pub new_parent: Option<String>,
}

/// One authenticated (or about to be authenticated) protocol connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryTransport: Send {
    /// Performs a simple bind.
    async fn simple_bind(&mut self, identity: &str, secret: &str) -> Result<WireStatus>;

    /// Searches below `base` and collects every entry until the server signals the end.
    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> Result<SearchResponse>;

    /// Creates an entry.
    async fn add(&mut self, dn: &str, attributes: &Attributes) -> Result<WireStatus>;

    /// Applies attribute changes to an entry in one request.
    async fn modify(&mut self, dn: &str, changes: &[AttributeChange]) -> Result<WireStatus>;

    /// Deletes an entry.
    async fn delete(&mut self, dn: &str) -> Result<WireStatus>;

    /// Renames or moves an entry, dropping the old RDN value.
    async fn rename(&mut self, dn: &str, target: &RenameTarget) -> Result<WireStatus>;

    /// Releases the connection.
    async fn unbind(&mut self) -> Result<()>;
}

/// Opens transports to a directory server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Connects to the server at `url` without binding.
    async fn connect(&self, url: &str) -> Result<Box<dyn DirectoryTransport>>;
}
