//! Foundation types for the link database.
//!
//! This crate provides the identity and coordinate types shared by every
//! other `linkdb` crate, plus the [`ReferenceRecord`] value that the
//! reference index stores.
//!
//! # Key Types
//!
//! - [`ItemId`] — Stable item identifier (UUID)
//! - [`FieldId`] — Field identifier within an item version
//! - [`Language`] — Language tag of an item version (e.g. `en`, `fr-FR`)
//! - [`VersionNumber`] — 1-based version number within a language
//! - [`VersionUri`] — Fully qualified item version coordinate
//! - [`ReferenceRecord`] — One outbound reference from a version's field

pub mod error;
pub mod identity;
pub mod record;
pub mod version;

pub use error::TypeError;
pub use identity::{FieldId, ItemId};
pub use record::ReferenceRecord;
pub use version::{Language, VersionNumber, VersionUri};
