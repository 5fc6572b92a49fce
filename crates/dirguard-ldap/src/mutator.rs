//! Existence-guarded mutations.
//!
//! The protocol has no conditional writes, so each operation here first checks whether the
//! target entry exists and only issues the wire mutation when that state matches the caller's
//! intent:
//!
//! | Operation | Requires | Otherwise |
//! |---|---|---|
//! | [`set_attribute`], [`add_attribute`], [`remove_attribute`], [`apply_changes`] | entry present | skipped |
//! | [`remove_entry`] | entry present | skipped |
//! | [`add_entry`] | entry absent | [`Error::AlreadyExists`] |
//! | [`move_entry`] | source present, destination absent | [`Error::InvalidMove`] |
//!
//! The check and the mutation are two separate exchanges. Two sessions racing on the same DN
//! can both pass the check; for creation the server then rejects the loser, which surfaces as
//! [`Error::AlreadyExists`] as well.
//!
//! [`set_attribute`]: DirectorySession::set_attribute
//! [`add_attribute`]: DirectorySession::add_attribute
//! [`remove_attribute`]: DirectorySession::remove_attribute
//! [`apply_changes`]: DirectorySession::apply_changes
//! [`remove_entry`]: DirectorySession::remove_entry
//! [`add_entry`]: DirectorySession::add_entry
//! [`move_entry`]: DirectorySession::move_entry

use crate::dn::DistinguishedName;
use crate::entry::{AttributeChange, Attributes};
use crate::session::DirectorySession;
use crate::transport::{result_code, RenameTarget, WireStatus};
use crate::Result;
use dirguard_core::Error;
use tracing::{debug, info};

/// What a guarded mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The precondition held and the server accepted the change.
    Applied,
    /// The target entry was absent, so nothing was sent.
    Skipped,
}

impl MutationOutcome {
    /// Returns true if the change was sent and accepted.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl DirectorySession {
    /// Replaces every value of `attribute` on the entry at `dn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mutation`] if the server rejects the change.
    pub async fn set_attribute<I, S>(
        &mut self,
        dn: &str,
        attribute: &str,
        values: I,
    ) -> Result<MutationOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_changes(dn, vec![AttributeChange::replace(attribute, values)])
            .await
    }

    /// Appends values to `attribute` on the entry at `dn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mutation`] if the server rejects the change.
    pub async fn add_attribute<I, S>(
        &mut self,
        dn: &str,
        attribute: &str,
        values: I,
    ) -> Result<MutationOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_changes(dn, vec![AttributeChange::add(attribute, values)])
            .await
    }

    /// Removes `attribute` entirely from the entry at `dn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mutation`] if the server rejects the change.
    pub async fn remove_attribute(&mut self, dn: &str, attribute: &str) -> Result<MutationOutcome> {
        self.apply_changes(dn, vec![AttributeChange::delete(attribute)])
            .await
    }

    /// Applies several attribute changes to the entry at `dn` in a single modify request.
    ///
    /// An empty change list is skipped without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mutation`] if the server rejects the changes.
    pub async fn apply_changes(
        &mut self,
        dn: &str,
        changes: Vec<AttributeChange>,
    ) -> Result<MutationOutcome> {
        if changes.is_empty() {
            self.transport()?;
            return Ok(MutationOutcome::Skipped);
        }
        if !self.exists_at_dn(dn).await? {
            debug!(dn, "entry absent, skipping modify");
            return Ok(MutationOutcome::Skipped);
        }

        let status = self.transport()?.modify(dn, &changes).await?;
        ensure_applied("modify", dn, status)?;
        info!(dn, changes = changes.len(), "entry modified");
        Ok(MutationOutcome::Applied)
    }

    /// Creates an entry at `dn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if an entry is already present at `dn` (seen either by
    /// the pre-check or by the server), and [`Error::Mutation`] for other server failures.
    pub async fn add_entry(&mut self, dn: &str, attributes: &Attributes) -> Result<()> {
        if self.exists_at_dn(dn).await? {
            return Err(Error::AlreadyExists(dn.to_string()));
        }

        let status = self.transport()?.add(dn, attributes).await?;
        if status.code == result_code::ENTRY_ALREADY_EXISTS {
            return Err(Error::AlreadyExists(dn.to_string()));
        }
        ensure_applied("add", dn, status)?;
        info!(dn, "entry created");
        Ok(())
    }

    /// Deletes the entry at `dn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mutation`] if the server rejects the delete.
    pub async fn remove_entry(&mut self, dn: &str) -> Result<MutationOutcome> {
        if !self.exists_at_dn(dn).await? {
            debug!(dn, "entry absent, skipping delete");
            return Ok(MutationOutcome::Skipped);
        }

        let status = self.transport()?.delete(dn).await?;
        ensure_applied("delete", dn, status)?;
        info!(dn, "entry deleted");
        Ok(MutationOutcome::Applied)
    }

    /// Moves (renames) the entry at `old_dn` so that it lives at `new_dn`.
    ///
    /// `new_dn` is split into its leading RDN and parent for the wire request; the old RDN
    /// value is dropped from the entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDn`] if `new_dn` cannot be parsed, [`Error::InvalidMove`] if the
    /// source is absent or the destination is occupied, and [`Error::Mutation`] if the server
    /// rejects the rename.
    pub async fn move_entry(&mut self, old_dn: &str, new_dn: &str) -> Result<()> {
        let target = rename_target(new_dn)?;

        if !self.exists_at_dn(old_dn).await? {
            return Err(invalid_move(old_dn, new_dn, "source entry does not exist"));
        }
        if self.exists_at_dn(new_dn).await? {
            return Err(invalid_move(old_dn, new_dn, "destination entry already exists"));
        }

        let status = self.transport()?.rename(old_dn, &target).await?;
        ensure_applied("rename", old_dn, status)?;
        info!(old_dn, new_dn, "entry moved");
        Ok(())
    }
}

fn rename_target(new_dn: &str) -> Result<RenameTarget> {
    let parsed = DistinguishedName::parse(new_dn)?;
    Ok(RenameTarget {
        new_rdn: parsed.leading_rdn().to_string(),
        new_parent: parsed.parent().map(|parent| parent.to_string()),
    })
}

fn invalid_move(old_dn: &str, new_dn: &str, reason: &str) -> Error {
    Error::InvalidMove {
        from: old_dn.to_string(),
        to: new_dn.to_string(),
        reason: reason.to_string(),
    }
}

fn ensure_applied(operation: &'static str, dn: &str, status: WireStatus) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(Error::Mutation {
        operation,
        dn: dn.to_string(),
        code: status.code,
        diagnostic: status.diagnostic,
    })
}
