//! Per-event reference index updates.

use std::sync::Arc;

use linkdb_fields::FieldLinkAdapter;
use linkdb_index::LinkDatabase;
use linkdb_store::{EditTransaction, ElevatedPrivilege, Item, SecurityContext, StoreResult};
use linkdb_types::{ItemId, ReferenceRecord, VersionUri};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LinkDatabaseConfig;
use crate::error::EventResult;
use crate::event::MutationEvent;

const CORRECTION_REASON: &str = "link database: strip references of removed version";

/// What an event did to the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// All records of `item` were dropped.
    Removed { item: ItemId, removed: usize },
    /// The records of `item` were re-derived from all its versions.
    Replaced { item: ItemId, count: usize },
    /// A removed version's records were cleaned up.
    VersionRemoved(VersionRemovalReport),
}

/// Summary of handling one version removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VersionRemovalReport {
    pub version: VersionUri,
    /// Records held by the item when handling started.
    pub examined: usize,
    /// Records owned by the removed version.
    pub owned: usize,
    /// Records whose reference was stripped from the field and dropped.
    pub stripped: usize,
    /// Records dropped directly because the version's content is already gone.
    pub dropped: usize,
    /// Records left alone: field missing or no adapter for its type.
    pub skipped: usize,
    /// Records whose correction failed and was rolled back.
    pub rolled_back: usize,
    /// Records of the version after reconciliation, if it ran.
    pub reconciled: Option<usize>,
}

impl VersionRemovalReport {
    fn new(version: VersionUri) -> Self {
        Self {
            version,
            examined: 0,
            owned: 0,
            stripped: 0,
            dropped: 0,
            skipped: 0,
            rolled_back: 0,
            reconciled: None,
        }
    }
}

enum Correction {
    Stripped,
    Dropped,
    Skipped,
    RolledBack,
}

/// Applies the index changes each lifecycle event calls for.
///
/// Deletion drops the item's records; copy and save re-derive them from all
/// versions. Version removal is handled record by record so that only
/// references owned by the removed version are touched.
pub struct UpdateResolver {
    links: LinkDatabase,
    security: Arc<dyn SecurityContext>,
    reconcile_after_version_removal: bool,
}

impl UpdateResolver {
    pub fn new(
        links: LinkDatabase,
        security: Arc<dyn SecurityContext>,
        config: &LinkDatabaseConfig,
    ) -> Self {
        Self {
            links,
            security,
            reconcile_after_version_removal: config.reconcile_after_version_removal,
        }
    }

    pub fn links(&self) -> &LinkDatabase {
        &self.links
    }

    /// Apply the index changes for `event`.
    pub fn resolve(&self, event: &MutationEvent) -> EventResult<Resolution> {
        match event {
            MutationEvent::ItemDeleted { item } => Ok(Resolution::Removed {
                item: item.id(),
                removed: self.on_item_deleted(item)?,
            }),
            MutationEvent::ItemCopied { copy, .. } => Ok(Resolution::Replaced {
                item: copy.id(),
                count: self.on_item_copied(copy)?,
            }),
            MutationEvent::ItemSaved { item } => Ok(Resolution::Replaced {
                item: item.id(),
                count: self.on_item_saved(item)?,
            }),
            MutationEvent::VersionRemoved { item } => {
                Ok(Resolution::VersionRemoved(self.on_version_removed(item)?))
            }
        }
    }

    /// Drop every record of the deleted item.
    pub fn on_item_deleted(&self, item: &Item) -> EventResult<usize> {
        Ok(self.links.remove_references_from(&item.id())?)
    }

    /// Derive records for the new copy. The source is left as is.
    pub fn on_item_copied(&self, copy: &Item) -> EventResult<usize> {
        Ok(self.links.replace_references_from(&copy.id())?)
    }

    /// Re-derive records for every version of the saved item.
    pub fn on_item_saved(&self, item: &Item) -> EventResult<usize> {
        Ok(self.links.replace_references_from(&item.id())?)
    }

    /// Remove the references owned by the removed version `version`.
    ///
    /// Every record the version owns is stripped from its field inside an
    /// elevated edit transaction and then dropped from the index. If the
    /// repository no longer holds the version there is no content to edit
    /// and the record is dropped directly. A failed edit rolls back and
    /// leaves that record in place; the remaining records are still
    /// processed. Records of other languages and versions are never touched.
    /// Finally the version's records are re-derived, unless disabled.
    pub fn on_version_removed(&self, version: &Item) -> EventResult<VersionRemovalReport> {
        let uri = version.uri();
        let records = self.links.references_from(&uri.item)?;
        let still_stored = self.links.repository().get_version(uri)?.is_some();

        let mut report = VersionRemovalReport::new(uri.clone());
        report.examined = records.len();

        for record in records.iter().filter(|r| r.is_owned_by(uri)) {
            report.owned += 1;
            let correction = if still_stored {
                self.strip_reference(version, record)?
            } else {
                self.links.remove_reference(record)?;
                Correction::Dropped
            };
            match correction {
                Correction::Stripped => report.stripped += 1,
                Correction::Dropped => report.dropped += 1,
                Correction::Skipped => report.skipped += 1,
                Correction::RolledBack => report.rolled_back += 1,
            }
        }

        if self.reconcile_after_version_removal {
            report.reconciled = Some(self.links.replace_version_references(uri)?);
        }

        info!(
            version = %uri,
            owned = report.owned,
            stripped = report.stripped,
            dropped = report.dropped,
            rolled_back = report.rolled_back,
            "removed version references cleaned up"
        );
        Ok(report)
    }

    fn strip_reference(&self, version: &Item, record: &ReferenceRecord) -> EventResult<Correction> {
        let Some(field) = version.field(&record.source_field) else {
            debug!(record = ?record, "field not on version; skipped");
            return Ok(Correction::Skipped);
        };
        let adapter = match self.links.fields().resolve(&field.field_type) {
            Ok(adapter) => adapter,
            Err(e) => {
                debug!(record = ?record, error = %e, "skipped");
                return Ok(Correction::Skipped);
            }
        };

        match self.edit_field(version.uri(), record, adapter, &field.value) {
            Ok(true) => {
                self.links.remove_reference(record)?;
                debug!(record = ?record, "reference stripped");
                Ok(Correction::Stripped)
            }
            Ok(false) => {
                warn!(
                    record = ?record,
                    adapter = adapter.name(),
                    "target still linked after removal; edit rolled back"
                );
                Ok(Correction::RolledBack)
            }
            Err(e) => {
                warn!(record = ?record, error = %e, "reference correction rolled back");
                Ok(Correction::RolledBack)
            }
        }
    }

    /// Returns `false`, with the edit rolled back, if the adapter left the
    /// target linked.
    fn edit_field(
        &self,
        uri: &VersionUri,
        record: &ReferenceRecord,
        adapter: &dyn FieldLinkAdapter,
        fallback: &str,
    ) -> StoreResult<bool> {
        let repo = self.links.repository();
        let privilege = ElevatedPrivilege::acquire(self.security.as_ref(), CORRECTION_REASON)?;
        let mut tx = EditTransaction::begin(repo, uri, Some(&privilege))?;

        let current = repo
            .get_version(uri)?
            .and_then(|v| v.field(&record.source_field).map(|f| f.value.clone()))
            .unwrap_or_else(|| fallback.to_string());
        let stripped = adapter.remove_link(&current, record);
        if adapter.links(&stripped).any(|id| id == record.target_item) {
            tx.rollback()?;
            return Ok(false);
        }
        if let Err(e) = tx.set_field_value(&record.source_field, stripped) {
            tx.rollback()?;
            return Err(e);
        }
        tx.commit()?;
        Ok(true)
    }
}

impl std::fmt::Debug for UpdateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateResolver")
            .field("links", &self.links)
            .field(
                "reconcile_after_version_removal",
                &self.reconcile_after_version_removal,
            )
            .finish()
    }
}
