//! The [`ContentRepository`] trait defining what the link database needs
//! from item storage.

use linkdb_types::{FieldId, ItemId, VersionUri};

use crate::error::StoreResult;
use crate::item::Item;
use crate::security::ElevatedPrivilege;

/// Storage backend holding items, their versions, and field values.
///
/// Implementations must be thread-safe (`Send + Sync`). Edits follow a
/// begin/stage/end protocol per version:
///
/// - `begin_edit` opens at most one edit per version at a time; a second
///   attempt fails with `EditInProgress`. This is what serialises concurrent
///   updates of the same item.
/// - `set_field_value` stages a value inside the open edit.
/// - `end_edit(commit = true)` persists staged values atomically. A failed
///   commit leaves the version unchanged and still closes the edit.
/// - `end_edit(commit = false)` discards staged values.
///
/// Prefer [`crate::EditTransaction`] over calling these directly; it
/// guarantees `end_edit` runs on every exit path.
pub trait ContentRepository: Send + Sync {
    /// Check whether an item exists (in any language or version).
    fn item_exists(&self, id: &ItemId) -> StoreResult<bool>;

    /// Load every current version of an item, all languages.
    ///
    /// Returns an empty list if the item does not exist.
    fn versions(&self, id: &ItemId) -> StoreResult<Vec<Item>>;

    /// Load one version. Returns `Ok(None)` if it does not exist.
    fn get_version(&self, uri: &VersionUri) -> StoreResult<Option<Item>>;

    /// Open an edit transaction on a version.
    ///
    /// Protected items require an active [`ElevatedPrivilege`].
    fn begin_edit(
        &self,
        uri: &VersionUri,
        privilege: Option<&ElevatedPrivilege<'_>>,
    ) -> StoreResult<()>;

    /// Stage a new value for an existing field inside the open edit.
    fn set_field_value(&self, uri: &VersionUri, field: &FieldId, value: String)
        -> StoreResult<()>;

    /// Close the open edit, persisting staged values if `commit` is true.
    fn end_edit(&self, uri: &VersionUri, commit: bool) -> StoreResult<()>;
}
