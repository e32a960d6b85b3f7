use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    #[error("invalid field id: {0:?}")]
    InvalidFieldId(String),

    #[error("invalid language tag: {0:?}")]
    InvalidLanguage(String),

    #[error("version numbers start at 1, got {0}")]
    InvalidVersionNumber(u32),
}
