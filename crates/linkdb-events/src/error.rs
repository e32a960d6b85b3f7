use linkdb_index::IndexError;
use linkdb_store::StoreError;
use thiserror::Error;

use crate::event::EventKind;

/// Errors from lifecycle event handling.
#[derive(Debug, Error)]
pub enum EventError {
    /// The event payload lacks the item the handler needs, or carries the
    /// wrong kind of value at its position.
    #[error("malformed {kind} event: {reason}")]
    MalformedEvent { kind: EventKind, reason: String },

    /// The reference index failed to apply an update.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Reading from the content repository failed.
    #[error("repository error: {0}")]
    Store(#[from] StoreError),

    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias for event handling.
pub type EventResult<T> = Result<T, EventError>;
