//! Existence-guarded access to LDAP directories.
//!
//! A [`DirectorySession`] owns one authenticated connection. On top of it this crate offers
//! read-only queries and a set of mutations that check whether their target exists before they
//! act, so "create if absent", "delete if present" and "move if the source exists and the
//! destination does not" hold without server-side transactions.
//!
//! ```no_run
//! # async fn run() -> dirguard_ldap::Result<()> {
//! use dirguard_core::{BindCredentials, DirectoryConfig};
//! use dirguard_ldap::{Attributes, DirectorySession};
//!
//! let config = DirectoryConfig::new(
//!     "ldap://localhost:389",
//!     "dc=example,dc=com",
//!     BindCredentials::new("cn=admin,dc=example,dc=com", "secret"),
//! )?;
//! let mut session = DirectorySession::open(&config).await?;
//!
//! let dn = "uid=t1,ou=people,dc=example,dc=com";
//! let mut attributes = Attributes::new();
//! attributes.insert("cn".into(), vec!["t1".into()]);
//! attributes.insert("sn".into(), vec!["One".into()]);
//! attributes.insert("objectClass".into(), vec!["top".into(), "inetOrgPerson".into()]);
//! session.add_entry(dn, &attributes).await?;
//! session.set_attribute(dn, "mail", ["t1@example.com"]).await?;
//! session.remove_entry(dn).await?;
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

mod dn;
mod entry;
pub mod filter;
mod ldap;
mod mutator;
mod query;
mod session;
mod transport;

pub use dn::{DistinguishedName, DistinguishedNameError};
pub use entry::{AttributeChange, Attributes, Entry};
pub use ldap::LdapConnector;
pub use mutator::MutationOutcome;
pub use session::DirectorySession;
pub use transport::{
    result_code, DirectoryConnector, DirectoryTransport, RenameTarget, SearchResponse,
    SearchScope, WireStatus,
};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = dirguard_core::Result<T>;
