//! Content repository interface for the link database.
//!
//! The link database never owns content; it reads item versions through the
//! [`ContentRepository`] trait and writes to them only through scoped
//! [`EditTransaction`]s. This crate defines that boundary and ships an
//! in-memory repository for tests and embedding.
//!
//! # Modules
//!
//! - [`error`] — Error types for repository operations
//! - [`item`] — [`Item`] (one loaded version) and [`Field`]
//! - [`traits`] — The [`ContentRepository`] trait
//! - [`edit`] — [`EditTransaction`], the begin/commit/rollback guard
//! - [`security`] — [`SecurityContext`] and the [`ElevatedPrivilege`] guard
//! - [`memory`] — In-memory [`InMemoryRepository`] and
//!   [`InMemorySecurityContext`]

pub mod edit;
pub mod error;
pub mod item;
pub mod memory;
pub mod security;
pub mod traits;

pub use edit::EditTransaction;
pub use error::{StoreError, StoreResult};
pub use item::{Field, Item};
pub use memory::{InMemoryRepository, InMemorySecurityContext};
pub use security::{ElevatedPrivilege, SecurityContext};
pub use traits::ContentRepository;
