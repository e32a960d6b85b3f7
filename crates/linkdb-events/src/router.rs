//! Suppression gate and event dispatch.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::config::LinkDatabaseConfig;
use crate::error::EventResult;
use crate::event::{EventEnvelope, EventKind, MutationEvent};
use crate::resolver::{Resolution, UpdateResolver};
use crate::signals::{LinkTrackingSwitch, PublishSignal};

/// Why an event was deliberately ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SuppressionReason {
    /// Link tracking is switched off (e.g. during a bulk import).
    LinkTrackingDisabled,
    /// A publish is running and updates during publish are disabled.
    PublishInProgress,
}

/// Result of dispatching one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DispatchOutcome {
    /// The event carried no parameters.
    Ignored,
    /// The suppression gate held the event back.
    Suppressed(SuppressionReason),
    /// The index was updated.
    Applied(Resolution),
}

/// A receiver of repository events.
pub trait EventHandler: Send + Sync {
    fn handle_event(&self, envelope: &EventEnvelope) -> EventResult<DispatchOutcome>;
}

/// An event bus the router can subscribe to.
pub trait MutationSource {
    fn subscribe(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>);
}

/// Routes repository lifecycle events to the [`UpdateResolver`].
///
/// The router owns no index logic. It checks the suppression gate, names
/// the event's positional parameters, and hands the typed event on.
pub struct MutationRouter {
    config: LinkDatabaseConfig,
    resolver: UpdateResolver,
    publishing: Arc<dyn PublishSignal>,
    tracking: Arc<dyn LinkTrackingSwitch>,
}

impl MutationRouter {
    pub fn new(
        config: LinkDatabaseConfig,
        resolver: UpdateResolver,
        publishing: Arc<dyn PublishSignal>,
        tracking: Arc<dyn LinkTrackingSwitch>,
    ) -> Self {
        Self {
            config,
            resolver,
            publishing,
            tracking,
        }
    }

    pub fn config(&self) -> &LinkDatabaseConfig {
        &self.config
    }

    pub fn resolver(&self) -> &UpdateResolver {
        &self.resolver
    }

    /// Subscribe to all four lifecycle events on `source`.
    pub fn register(self: &Arc<Self>, source: &mut dyn MutationSource) {
        for kind in EventKind::ALL {
            source.subscribe(kind, Arc::clone(self) as Arc<dyn EventHandler>);
        }
        debug!("link database handlers registered");
    }

    /// The reason events are currently suppressed, if any.
    pub fn suppression(&self) -> Option<SuppressionReason> {
        if self.tracking.is_link_tracking_disabled() {
            return Some(SuppressionReason::LinkTrackingDisabled);
        }
        if !self.config.update_during_publish && self.publishing.is_publishing() {
            return Some(SuppressionReason::PublishInProgress);
        }
        None
    }

    /// Handle an event as raised by the repository.
    ///
    /// Events without parameters and suppressed events are no-ops. A
    /// non-suppressed event missing its item fails with `MalformedEvent`.
    pub fn dispatch(&self, envelope: &EventEnvelope) -> EventResult<DispatchOutcome> {
        let Some(parameters) = envelope.parameters.as_deref() else {
            return Ok(DispatchOutcome::Ignored);
        };
        if let Some(reason) = self.suppression() {
            debug!(kind = %envelope.kind, ?reason, "event suppressed");
            return Ok(DispatchOutcome::Suppressed(reason));
        }

        let event = MutationEvent::from_parameters(envelope.kind, parameters).inspect_err(|e| {
            error!(kind = %envelope.kind, error = %e, "malformed event");
        })?;
        self.apply(&event)
    }

    /// Handle an already typed event.
    pub fn handle(&self, event: &MutationEvent) -> EventResult<DispatchOutcome> {
        if let Some(reason) = self.suppression() {
            debug!(kind = %event.kind(), ?reason, "event suppressed");
            return Ok(DispatchOutcome::Suppressed(reason));
        }
        self.apply(event)
    }

    fn apply(&self, event: &MutationEvent) -> EventResult<DispatchOutcome> {
        debug!(kind = %event.kind(), item = %event.subject().id(), "applying event");
        Ok(DispatchOutcome::Applied(self.resolver.resolve(event)?))
    }
}

impl EventHandler for MutationRouter {
    fn handle_event(&self, envelope: &EventEnvelope) -> EventResult<DispatchOutcome> {
        self.dispatch(envelope)
    }
}

impl std::fmt::Debug for MutationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationRouter")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish()
    }
}
