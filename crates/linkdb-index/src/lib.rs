//! Reference index for the link database.
//!
//! The index is a derived view: for every item version it holds one
//! [`ReferenceRecord`](linkdb_types::ReferenceRecord) per distinct item
//! referenced by each field. Records are never written by hand; they are
//! re-derived from field content through the field link adapters.
//!
//! # Modules
//!
//! - [`error`] — Error types for index operations
//! - [`traits`] — The [`ReferenceStore`] storage trait
//! - [`memory`] — In-memory [`InMemoryReferenceStore`]
//! - [`database`] — [`LinkDatabase`], which keeps a store in step with a
//!   content repository

pub mod database;
pub mod error;
pub mod memory;
pub mod traits;

pub use database::LinkDatabase;
pub use error::{IndexError, IndexResult};
pub use memory::InMemoryReferenceStore;
pub use traits::ReferenceStore;
