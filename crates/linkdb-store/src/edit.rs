//! Scoped edit transactions.

use linkdb_types::{FieldId, VersionUri};
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::security::ElevatedPrivilege;
use crate::traits::ContentRepository;

/// An open edit on one item version.
///
/// Dropping the transaction without calling [`EditTransaction::commit`]
/// rolls it back, so every early return or `?` leaves the version untouched.
pub struct EditTransaction<'r> {
    repo: &'r dyn ContentRepository,
    uri: VersionUri,
    open: bool,
}

impl<'r> EditTransaction<'r> {
    /// Open an edit on `uri`.
    pub fn begin(
        repo: &'r dyn ContentRepository,
        uri: &VersionUri,
        privilege: Option<&ElevatedPrivilege<'_>>,
    ) -> StoreResult<Self> {
        repo.begin_edit(uri, privilege)?;
        debug!(version = %uri, elevated = privilege.is_some(), "edit opened");
        Ok(Self {
            repo,
            uri: uri.clone(),
            open: true,
        })
    }

    pub fn uri(&self) -> &VersionUri {
        &self.uri
    }

    /// Stage a new value for `field`.
    pub fn set_field_value(&mut self, field: &FieldId, value: String) -> StoreResult<()> {
        self.repo.set_field_value(&self.uri, field, value)
    }

    /// Persist all staged values.
    ///
    /// On failure the repository has already closed the edit and discarded
    /// the staged values.
    pub fn commit(mut self) -> StoreResult<()> {
        self.open = false;
        self.repo.end_edit(&self.uri, true)?;
        debug!(version = %self.uri, "edit committed");
        Ok(())
    }

    /// Discard all staged values explicitly.
    pub fn rollback(mut self) -> StoreResult<()> {
        self.open = false;
        self.repo.end_edit(&self.uri, false)
    }
}

impl Drop for EditTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.repo.end_edit(&self.uri, false) {
                warn!(version = %self.uri, error = %e, "rollback on drop failed");
            }
        }
    }
}

impl std::fmt::Debug for EditTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditTransaction")
            .field("uri", &self.uri)
            .field("open", &self.open)
            .finish()
    }
}
