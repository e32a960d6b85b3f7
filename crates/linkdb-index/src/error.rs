use linkdb_store::StoreError;
use linkdb_types::{ItemId, ReferenceRecord, VersionUri};
use thiserror::Error;

/// Errors from reference index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A replacement set contained a record sourced from another item.
    #[error("record {record:?} does not belong to item {item}")]
    ForeignRecord { item: ItemId, record: ReferenceRecord },

    /// A version replacement set contained a record of another version.
    #[error("record {record:?} does not belong to version {version}")]
    ForeignVersionRecord {
        version: VersionUri,
        record: ReferenceRecord,
    },

    /// Reading item content from the repository failed.
    #[error("repository error: {0}")]
    Store(#[from] StoreError),

    /// Internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
