//! Item lifecycle event handling for the link database.
//!
//! The content repository raises an event after an item is deleted, copied
//! or saved, or after one of its versions is removed. This crate turns those
//! events into reference index updates:
//!
//! 1. [`MutationRouter`] receives an [`EventEnvelope`], applies the
//!    suppression gate (link tracking disabled, publish in progress) and
//!    converts the positional parameters into a typed [`MutationEvent`].
//! 2. [`UpdateResolver`] computes and applies the index changes for that
//!    event. Version removal strips the removed version's references field
//!    by field before reconciling the version's records, so references held
//!    by the item's other languages and versions survive.
//!
//! # Modules
//!
//! - [`config`] — [`LinkDatabaseConfig`]
//! - [`error`] — Error types for event handling
//! - [`event`] — Raw envelopes and typed mutation events
//! - [`signals`] — Publish and link-tracking suppression signals
//! - [`resolver`] — Per-event index updates
//! - [`router`] — Suppression gate, dispatch and handler registration

pub mod config;
pub mod error;
pub mod event;
pub mod resolver;
pub mod router;
pub mod signals;

#[cfg(test)]
mod testing;

pub use config::LinkDatabaseConfig;
pub use error::{EventError, EventResult};
pub use event::{EventEnvelope, EventKind, EventParameter, MutationEvent};
pub use resolver::{Resolution, UpdateResolver, VersionRemovalReport};
pub use router::{DispatchOutcome, EventHandler, MutationRouter, MutationSource, SuppressionReason};
pub use signals::{LinkDisabler, LinkDisablerGuard, LinkTrackingSwitch, PublishSignal, PublishState};
