//! Scoped privilege elevation for internal corrective writes.
//!
//! The link database sometimes has to edit content the current caller may
//! not be allowed to touch (stripping dangling references out of a field).
//! It does so with an [`ElevatedPrivilege`]: acquired from a
//! [`SecurityContext`], passed explicitly to the edit that needs it, and
//! revoked when dropped.

use tracing::debug;

use crate::error::StoreResult;

/// Source of elevated write permission.
pub trait SecurityContext: Send + Sync {
    /// Grant one level of elevation. Fails if the context refuses.
    fn elevate(&self, reason: &str) -> StoreResult<()>;

    /// Revoke one level of elevation previously granted by `elevate`.
    fn revoke(&self);

    /// Whether any elevation is currently active.
    fn is_elevated(&self) -> bool;
}

/// Proof of elevated write permission, valid for its lifetime only.
///
/// The guard borrows its context, so it cannot outlive the frame that
/// acquired it.
pub struct ElevatedPrivilege<'a> {
    ctx: &'a dyn SecurityContext,
    reason: String,
}

impl<'a> ElevatedPrivilege<'a> {
    /// Acquire elevation from `ctx`.
    pub fn acquire(ctx: &'a dyn SecurityContext, reason: impl Into<String>) -> StoreResult<Self> {
        let reason = reason.into();
        ctx.elevate(&reason)?;
        debug!(reason = %reason, "privilege elevated");
        Ok(Self { ctx, reason })
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Whether the underlying context still reports the elevation as active.
    pub fn is_active(&self) -> bool {
        self.ctx.is_elevated()
    }
}

impl Drop for ElevatedPrivilege<'_> {
    fn drop(&mut self) {
        self.ctx.revoke();
        debug!(reason = %self.reason, "privilege revoked");
    }
}

impl std::fmt::Debug for ElevatedPrivilege<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevatedPrivilege")
            .field("reason", &self.reason)
            .finish()
    }
}
