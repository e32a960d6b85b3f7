//! Suppression signals consulted before every index update.
//!
//! Both signals are plain objects handed to the router at construction, so
//! each router (and each test) sees its own state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Reports whether the publishing subsystem is currently running.
pub trait PublishSignal: Send + Sync {
    fn is_publishing(&self) -> bool;
}

/// Reports whether link tracking has been switched off.
pub trait LinkTrackingSwitch: Send + Sync {
    fn is_link_tracking_disabled(&self) -> bool;
}

/// A settable [`PublishSignal`].
#[derive(Debug, Default)]
pub struct PublishState {
    publishing: AtomicBool,
}

impl PublishState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_publishing(&self, publishing: bool) {
        self.publishing.store(publishing, Ordering::SeqCst);
    }
}

impl PublishSignal for PublishState {
    fn is_publishing(&self) -> bool {
        self.publishing.load(Ordering::SeqCst)
    }
}

/// A [`LinkTrackingSwitch`] turned off for the lifetime of scoped guards.
///
/// Bulk imports hold a guard while they write so the index is not updated
/// item by item. Guards nest; tracking resumes when the last one drops.
#[derive(Debug, Default)]
pub struct LinkDisabler {
    depth: AtomicUsize,
}

impl LinkDisabler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable link tracking until the returned guard is dropped.
    pub fn disable(&self) -> LinkDisablerGuard<'_> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        LinkDisablerGuard { switch: self }
    }
}

impl LinkTrackingSwitch for LinkDisabler {
    fn is_link_tracking_disabled(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}

/// Keeps a [`LinkDisabler`] active while alive.
#[derive(Debug)]
pub struct LinkDisablerGuard<'a> {
    switch: &'a LinkDisabler,
}

impl Drop for LinkDisablerGuard<'_> {
    fn drop(&mut self) {
        self.switch.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
