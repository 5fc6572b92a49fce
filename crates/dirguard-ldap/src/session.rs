//! Directory session lifecycle.

use crate::ldap::LdapConnector;
use crate::transport::{result_code, DirectoryConnector, DirectoryTransport};
use crate::Result;
use dirguard_core::{DirectoryConfig, Error};
use tracing::{info, warn};

/// One authenticated connection plus the default search root.
///
/// Every operation takes `&mut self`: the underlying transport handles one exchange at a time,
/// and callers that need concurrency open separate sessions. A session must be released with
/// [`DirectorySession::close`]; after that every operation fails with [`Error::Precondition`].
pub struct DirectorySession {
    transport: Option<Box<dyn DirectoryTransport>>,
    base_dn: String,
}

impl DirectorySession {
    /// Connects and binds using the `ldap3` transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the server is unreachable and
    /// [`Error::Authentication`] if the bind is rejected.
    pub async fn open(config: &DirectoryConfig) -> Result<Self> {
        Self::open_with(&LdapConnector::new(config), config).await
    }

    /// Connects and binds through the supplied connector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` fails validation, [`Error::Connection`] if the
    /// connector fails and [`Error::Authentication`] if the bind is rejected.
    pub async fn open_with(
        connector: &dyn DirectoryConnector,
        config: &DirectoryConfig,
    ) -> Result<Self> {
        config.check()?;
        let mut transport = connector.connect(config.url()).await?;
        let credentials = config.credentials();

        let status = match transport
            .simple_bind(credentials.identity(), credentials.secret())
            .await
        {
            Ok(status) => status,
            Err(err) => {
                release(&mut *transport).await;
                return Err(err);
            }
        };

        if !status.is_success() {
            release(&mut *transport).await;
            let reason = if status.code == result_code::INVALID_CREDENTIALS {
                "invalid credentials"
            } else {
                "bind rejected"
            };
            return Err(Error::Authentication(format!(
                "{reason} for `{}` (code {}): {}",
                credentials.identity(),
                status.code,
                status.diagnostic
            )));
        }

        info!(url = config.url(), base_dn = config.base_dn(), "directory session opened");
        Ok(Self {
            transport: Some(transport),
            base_dn: config.base_dn().to_string(),
        })
    }

    /// Releases the connection.
    ///
    /// The handle is considered released whether or not the unbind succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] if the session was already closed and
    /// [`Error::Connection`] if the unbind exchange fails.
    pub async fn close(&mut self) -> Result<()> {
        let mut transport = self
            .transport
            .take()
            .ok_or_else(|| Error::Precondition("session is already closed".to_string()))?;

        if let Err(err) = transport.unbind().await {
            return Err(match err {
                err @ Error::Connection(_) => err,
                other => Error::Connection(other.to_string()),
            });
        }
        info!(base_dn = %self.base_dn, "directory session closed");
        Ok(())
    }

    /// Default search root used by [`DirectorySession::query`].
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Returns true until [`DirectorySession::close`] has been called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub(crate) fn transport(&mut self) -> Result<&mut Box<dyn DirectoryTransport>> {
        self.transport
            .as_mut()
            .ok_or_else(|| Error::Precondition("session has been closed".to_string()))
    }
}

impl std::fmt::Debug for DirectorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySession")
            .field("base_dn", &self.base_dn)
            .field("open", &self.is_open())
            .finish()
    }
}

async fn release(transport: &mut dyn DirectoryTransport) {
    if let Err(err) = transport.unbind().await {
        warn!("failed to release connection after bind failure: {err}");
    }
}
