//! Field link adapters for the link database.
//!
//! Every field type stores references to other items in its own string
//! format. A [`FieldLinkAdapter`] knows one such format: it enumerates the
//! item ids a value references and can strip one reference out of a value.
//! The [`FieldTypeRegistry`] maps field-type tags to adapters and is built
//! once at startup.
//!
//! # Shipped adapters
//!
//! - [`SingleReferenceAdapter`] — `droplink`, `droptree`, `reference`
//! - [`MultiReferenceAdapter`] — `multilist`, `treelist`, `checklist`
//! - [`GeneralLinkAdapter`] — `general link`
//! - [`RichTextAdapter`] — `rich text`
//!
//! Field types without an adapter hold no references.

pub mod adapter;
pub mod adapters;
pub mod error;
pub mod registry;

pub use adapter::FieldLinkAdapter;
pub use adapters::{GeneralLinkAdapter, MultiReferenceAdapter, RichTextAdapter, SingleReferenceAdapter};
pub use error::FieldError;
pub use registry::FieldTypeRegistry;
