//! The [`ReferenceStore`] trait defining reference record storage.

use linkdb_types::{ItemId, ReferenceRecord, VersionUri};

use crate::error::IndexResult;

/// Storage backend for reference records, keyed by source item.
///
/// Implementations must be thread-safe (`Send + Sync`). Every write is
/// scoped to one source item and applies entirely or not at all, so
/// concurrent writes for different items never interfere. Serialising
/// writes for the same item is the caller's job.
pub trait ReferenceStore: Send + Sync {
    /// All records whose source is `source`, sorted.
    fn records_from(&self, source: &ItemId) -> IndexResult<Vec<ReferenceRecord>>;

    /// All records whose target is `target`, sorted.
    fn records_to(&self, target: &ItemId) -> IndexResult<Vec<ReferenceRecord>>;

    /// Add one record. Returns `false` if the exact tuple was already present.
    fn insert(&self, record: ReferenceRecord) -> IndexResult<bool>;

    /// Delete every record sourced from `source`. Returns how many were removed.
    fn remove_all_from(&self, source: &ItemId) -> IndexResult<usize>;

    /// Replace the full record set of `source`.
    ///
    /// Fails without changing anything if a record belongs to another item.
    fn replace_all_from(&self, source: &ItemId, records: Vec<ReferenceRecord>) -> IndexResult<()>;

    /// Replace the records of one version, leaving the item's other
    /// versions untouched.
    ///
    /// Fails without changing anything if a record belongs to another version.
    fn replace_version(&self, version: &VersionUri, records: Vec<ReferenceRecord>)
        -> IndexResult<()>;

    /// Delete the record matching the full tuple. Returns `true` if it existed.
    fn remove_record(&self, record: &ReferenceRecord) -> IndexResult<bool>;

    /// Total number of records.
    fn len(&self) -> IndexResult<usize>;

    fn is_empty(&self) -> IndexResult<bool> {
        Ok(self.len()? == 0)
    }
}
