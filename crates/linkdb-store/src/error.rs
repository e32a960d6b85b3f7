use linkdb_types::{FieldId, ItemId, TypeError, VersionUri};

/// Errors from content repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The item does not exist in the repository.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// The item exists but has no version at these coordinates.
    #[error("version not found: {0}")]
    VersionNotFound(VersionUri),

    /// The version has no field with this id.
    #[error("field {field} not found on {uri}")]
    FieldNotFound { uri: VersionUri, field: FieldId },

    /// Another edit transaction is already open on this version.
    #[error("edit already in progress on {0}")]
    EditInProgress(VersionUri),

    /// A field write or commit was attempted without an open edit.
    #[error("no edit in progress on {0}")]
    NoOpenEdit(VersionUri),

    /// The caller lacks write permission on the version.
    #[error("access denied to {uri}: {reason}")]
    AccessDenied { uri: VersionUri, reason: String },

    /// The storage backend refused to persist the change.
    #[error("write rejected for {0}")]
    WriteRejected(VersionUri),

    /// The security context refused to grant elevated privilege.
    #[error("privilege elevation refused: {0}")]
    ElevationRefused(String),

    /// An identifier or coordinate failed validation.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;
