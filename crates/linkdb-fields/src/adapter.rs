//! The [`FieldLinkAdapter`] trait.

use linkdb_types::{ItemId, ReferenceRecord};

/// Reads and edits item references inside one field type's values.
///
/// Adapters are stateless and shared between threads.
pub trait FieldLinkAdapter: Send + Sync {
    /// Human-readable adapter name for logs.
    fn name(&self) -> &str;

    /// Lazily enumerate the items referenced by `value`.
    ///
    /// The sequence is finite and may contain duplicates if the value
    /// references the same item twice. Call again to restart it.
    /// Unparseable fragments are skipped.
    fn links<'v>(&self, value: &'v str) -> Box<dyn Iterator<Item = ItemId> + 'v>;

    /// Return `value` with every reference to `record.target_item` removed.
    ///
    /// All other references and content are left intact. A value that does
    /// not reference the target is returned unchanged.
    fn remove_link(&self, value: &str, record: &ReferenceRecord) -> String;
}
