//! Read-only searches and existence checks.

use crate::entry::Entry;
use crate::filter::ANY_OBJECT;
use crate::session::DirectorySession;
use crate::transport::{result_code, SearchScope};
use crate::Result;
use dirguard_core::Error;
use tracing::debug;

impl DirectorySession {
    /// Searches below `base_dn` and returns every matching entry in delivery order.
    ///
    /// A base that does not exist on the server yields an empty result rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Search`] for any other server-reported failure, and
    /// [`Error::Precondition`] if the session has been closed.
    pub async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        scope: SearchScope,
    ) -> Result<Vec<Entry>> {
        let response = self.transport()?.search(base_dn, scope, filter).await?;

        match response.status.code {
            result_code::SUCCESS => {
                debug!(
                    base_dn,
                    filter,
                    ?scope,
                    count = response.entries.len(),
                    "search completed"
                );
                Ok(response.entries)
            }
            result_code::NO_SUCH_OBJECT => {
                debug!(base_dn, filter, "search base does not exist");
                Ok(Vec::new())
            }
            code => Err(Error::Search {
                code,
                diagnostic: response.status.diagnostic,
            }),
        }
    }

    /// Searches the whole subtree below the session's base DN.
    ///
    /// # Errors
    ///
    /// See [`DirectorySession::search`].
    pub async fn query(&mut self, filter: &str) -> Result<Vec<Entry>> {
        let base_dn = self.base_dn().to_string();
        self.search(&base_dn, filter, SearchScope::Subtree).await
    }

    /// Returns true if a subtree search rooted at `dn` finds any entry.
    ///
    /// Because the subtree scope includes the base itself this is true whenever the entry
    /// exists, but it inspects the whole subtree; prefer [`DirectorySession::exists_at_dn`].
    ///
    /// # Errors
    ///
    /// See [`DirectorySession::search`].
    pub async fn exists_by_base_scope(&mut self, dn: &str) -> Result<bool> {
        let entries = self.search(dn, ANY_OBJECT, SearchScope::Subtree).await?;
        Ok(!entries.is_empty())
    }

    /// Returns true if an entry exists at exactly `dn`.
    ///
    /// # Errors
    ///
    /// See [`DirectorySession::search`].
    pub async fn exists_at_dn(&mut self, dn: &str) -> Result<bool> {
        Ok(self.get_entry(dn).await?.is_some())
    }

    /// Reads the entry at exactly `dn`, if there is one.
    ///
    /// # Errors
    ///
    /// See [`DirectorySession::search`].
    pub async fn get_entry(&mut self, dn: &str) -> Result<Option<Entry>> {
        let entries = self.search(dn, ANY_OBJECT, SearchScope::Base).await?;
        Ok(entries.into_iter().next())
    }
}
