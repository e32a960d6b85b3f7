use thiserror::Error;

/// Errors from field adapter lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// No adapter is registered for this field type.
    #[error("no link adapter for field type {field_type:?}")]
    UnsupportedFieldType { field_type: String },
}
