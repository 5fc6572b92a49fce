//! Transport backed by `ldap3`.

use crate::entry::{AttributeChange, Attributes, Entry};
use crate::transport::{
    DirectoryConnector, DirectoryTransport, RenameTarget, SearchResponse, SearchScope, WireStatus,
};
use crate::Result;
use async_trait::async_trait;
use dirguard_core::{DirectoryConfig, Error};
use ldap3::{LdapConnAsync, LdapConnSettings, Mod, SearchEntry, SearchResult};
use native_tls::{Certificate, TlsConnector};
use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

const ALL_USER_ATTRIBUTES: &[&str] = &["*"];

/// Connector that opens `ldap3` connections using the TLS and timeout settings of a
/// [`DirectoryConfig`].
#[derive(Debug, Clone)]
pub struct LdapConnector {
    tls_verify: bool,
    tls_ca_cert: Option<PathBuf>,
    connection_timeout: Duration,
    operation_timeout: Duration,
}

impl LdapConnector {
    /// Creates a connector from the transport-related parts of `config`.
    #[must_use]
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            tls_verify: config.tls_verify(),
            tls_ca_cert: config.tls_ca_cert().cloned(),
            connection_timeout: config.connection_timeout(),
            operation_timeout: config.operation_timeout(),
        }
    }

    fn settings(&self) -> Result<LdapConnSettings> {
        let mut settings = LdapConnSettings::new().set_conn_timeout(self.connection_timeout);

        if !self.tls_verify {
            let connector = TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()
                .map_err(|err| Error::Config(format!("failed to construct TLS connector: {err}")))?;
            settings = settings.set_connector(connector).set_no_tls_verify(true);
        } else if let Some(cert_path) = &self.tls_ca_cert {
            let pem = fs::read(cert_path).map_err(|err| {
                Error::Config(format!(
                    "failed to read CA certificate {}: {err}",
                    cert_path.display()
                ))
            })?;
            let certificate = Certificate::from_pem(&pem)
                .map_err(|err| Error::Config(format!("invalid CA certificate: {err}")))?;
            let connector = TlsConnector::builder()
                .add_root_certificate(certificate)
                .build()
                .map_err(|err| Error::Config(format!("failed to load CA certificate: {err}")))?;
            settings = settings.set_connector(connector);
        }

        Ok(settings)
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn DirectoryTransport>> {
        let settings = self.settings()?;
        let (conn, ldap) = LdapConnAsync::with_settings(settings, url)
            .await
            .map_err(|err| Error::Connection(format!("failed to connect to {url}: {err}")))?;
        ldap3::drive!(conn);
        debug!(url, "directory connection established");
        Ok(Box::new(LdapTransport {
            inner: ldap,
            operation_timeout: self.operation_timeout,
        }))
    }
}

struct LdapTransport {
    inner: ldap3::Ldap,
    operation_timeout: Duration,
}

async fn exchange<F, T>(operation_timeout: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = ldap3::result::Result<T>>,
{
    timeout(operation_timeout, fut)
        .await
        .map_err(|_| Error::Timeout(format!("directory {operation} timed out")))?
        .map_err(|err| Error::Connection(format!("directory {operation} failed: {err}")))
}

#[async_trait]
impl DirectoryTransport for LdapTransport {
    async fn simple_bind(&mut self, identity: &str, secret: &str) -> Result<WireStatus> {
        let result = exchange(
            self.operation_timeout,
            "bind",
            self.inner.simple_bind(identity, secret),
        )
        .await?;
        Ok(result.into())
    }

    async fn search(
        &mut self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> Result<SearchResponse> {
        let SearchResult(entries, result) = exchange(
            self.operation_timeout,
            "search",
            self.inner
                .search(base, scope.into(), filter, ALL_USER_ATTRIBUTES.to_vec()),
        )
        .await?;
        Ok(SearchResponse {
            entries: entries
                .into_iter()
                .map(SearchEntry::construct)
                .map(Entry::from)
                .collect(),
            status: result.into(),
        })
    }

    async fn add(&mut self, dn: &str, attributes: &Attributes) -> Result<WireStatus> {
        let attrs = attributes
            .iter()
            .map(|(name, values)| (name.clone(), values.iter().cloned().collect::<HashSet<_>>()))
            .collect::<Vec<_>>();
        let result = exchange(self.operation_timeout, "add", self.inner.add(dn, attrs)).await?;
        Ok(result.into())
    }

    async fn modify(&mut self, dn: &str, changes: &[AttributeChange]) -> Result<WireStatus> {
        let mods = changes
            .iter()
            .map(|change| match change {
                AttributeChange::Replace { attribute, values } => Mod::Replace(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
                AttributeChange::Add { attribute, values } => Mod::Add(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
                AttributeChange::Delete { attribute } => {
                    Mod::Delete(attribute.clone(), HashSet::new())
                }
            })
            .collect::<Vec<_>>();
        let result =
            exchange(self.operation_timeout, "modify", self.inner.modify(dn, mods)).await?;
        Ok(result.into())
    }

    async fn delete(&mut self, dn: &str) -> Result<WireStatus> {
        let result = exchange(self.operation_timeout, "delete", self.inner.delete(dn)).await?;
        Ok(result.into())
    }

    async fn rename(&mut self, dn: &str, target: &RenameTarget) -> Result<WireStatus> {
        let result = exchange(
            self.operation_timeout,
            "rename",
            self.inner
                .modifydn(dn, &target.new_rdn, true, target.new_parent.as_deref()),
        )
        .await?;
        Ok(result.into())
    }

    async fn unbind(&mut self) -> Result<()> {
        exchange(self.operation_timeout, "unbind", self.inner.unbind()).await
    }
}
