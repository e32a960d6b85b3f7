//! The [`LinkDatabase`]: a reference store kept in step with repository
//! content.

use std::collections::BTreeSet;
use std::sync::Arc;

use linkdb_fields::FieldTypeRegistry;
use linkdb_store::{ContentRepository, Item};
use linkdb_types::{ItemId, ReferenceRecord, VersionUri};
use tracing::{debug, trace};

use crate::error::IndexResult;
use crate::traits::ReferenceStore;

/// Derives reference records from item content and stores them.
///
/// This is the only writer of the underlying [`ReferenceStore`]: records
/// are always recomputed from what the repository currently holds, never
/// supplied by callers.
#[derive(Clone)]
pub struct LinkDatabase {
    store: Arc<dyn ReferenceStore>,
    repository: Arc<dyn ContentRepository>,
    fields: Arc<FieldTypeRegistry>,
}

impl LinkDatabase {
    pub fn new(
        store: Arc<dyn ReferenceStore>,
        repository: Arc<dyn ContentRepository>,
        fields: Arc<FieldTypeRegistry>,
    ) -> Self {
        Self {
            store,
            repository,
            fields,
        }
    }

    pub fn repository(&self) -> &dyn ContentRepository {
        self.repository.as_ref()
    }

    pub fn fields(&self) -> &FieldTypeRegistry {
        &self.fields
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Current records sourced from `item`, all languages and versions.
    pub fn references_from(&self, item: &ItemId) -> IndexResult<Vec<ReferenceRecord>> {
        self.store.records_from(item)
    }

    /// Current records pointing at `target`, from any item.
    pub fn referrers_of(&self, target: &ItemId) -> IndexResult<Vec<ReferenceRecord>> {
        self.store.records_to(target)
    }

    /// Records sourced from `item` whose target no longer exists.
    pub fn broken_links_from(&self, item: &ItemId) -> IndexResult<Vec<ReferenceRecord>> {
        let mut broken = Vec::new();
        for record in self.store.records_from(item)? {
            if !self.repository.item_exists(&record.target_item)? {
                broken.push(record);
            }
        }
        Ok(broken)
    }

    /// Compute the records `item` should have from its current field values.
    ///
    /// One record per distinct target per field. Fields whose type has no
    /// adapter contribute nothing.
    pub fn extract_references(&self, item: &Item) -> Vec<ReferenceRecord> {
        let mut records = Vec::new();
        for (field_id, field) in item.fields() {
            let Some(adapter) = self.fields.get(&field.field_type) else {
                trace!(field = %field_id, field_type = %field.field_type, "no link adapter; skipped");
                continue;
            };
            let targets: BTreeSet<ItemId> = adapter.links(&field.value).collect();
            records.extend(
                targets
                    .into_iter()
                    .map(|target| ReferenceRecord::new(item.uri(), field_id.clone(), target)),
            );
        }
        records
    }

    // ---------------------------------------------------------------
    // Updates
    // ---------------------------------------------------------------

    /// Drop every record sourced from `item`. Returns how many were removed.
    pub fn remove_references_from(&self, item: &ItemId) -> IndexResult<usize> {
        let removed = self.store.remove_all_from(item)?;
        debug!(item = %item, removed, "references removed");
        Ok(removed)
    }

    /// Re-derive the records of every current version of `item` and replace
    /// the item's whole record set. Returns the new record count.
    ///
    /// An item that no longer exists ends up with no records.
    pub fn replace_references_from(&self, item: &ItemId) -> IndexResult<usize> {
        let records: Vec<ReferenceRecord> = self
            .repository
            .versions(item)?
            .iter()
            .flat_map(|version| self.extract_references(version))
            .collect();
        let count = records.len();
        self.store.replace_all_from(item, records)?;
        debug!(item = %item, count, "references replaced");
        Ok(count)
    }

    /// Re-derive the records of one version only. Returns the new record
    /// count for that version.
    ///
    /// If the version no longer exists its records are dropped. Records of
    /// the item's other versions are untouched.
    pub fn replace_version_references(&self, version: &VersionUri) -> IndexResult<usize> {
        let records = match self.repository.get_version(version)? {
            Some(item) => self.extract_references(&item),
            None => Vec::new(),
        };
        let count = records.len();
        self.store.replace_version(version, records)?;
        debug!(version = %version, count, "version references replaced");
        Ok(count)
    }

    /// Drop exactly one record. Returns `true` if it was present.
    pub fn remove_reference(&self, record: &ReferenceRecord) -> IndexResult<bool> {
        self.store.remove_record(record)
    }
}

impl std::fmt::Debug for LinkDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkDatabase")
            .field("records", &self.store.len().ok())
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::memory::InMemoryReferenceStore;
    use linkdb_store::{Field, InMemoryRepository};
    use linkdb_types::{FieldId, Language};
    use proptest::prelude::*;

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        db: LinkDatabase,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let db = LinkDatabase::new(
            Arc::new(InMemoryReferenceStore::new()),
            repo.clone(),
            Arc::new(FieldTypeRegistry::with_defaults()),
        );
        Fixture { repo, db }
    }

    fn lang(tag: &str) -> Language {
        Language::new(tag).unwrap()
    }

    fn field(name: &str) -> FieldId {
        FieldId::new(name).unwrap()
    }

    fn droplink(target: ItemId) -> Field {
        Field::new("droplink", target.to_string())
    }

    fn multilist(targets: &[ItemId]) -> Field {
        let value = targets.iter().map(ItemId::to_string).collect::<Vec<_>>().join("|");
        Field::new("multilist", value)
    }

    fn fields(entries: Vec<(&str, Field)>) -> BTreeMap<FieldId, Field> {
        entries.into_iter().map(|(name, f)| (field(name), f)).collect()
    }

    #[test]
    fn extract_one_record_per_distinct_target() {
        let fx = fixture();
        let (b, c) = (ItemId::new(), ItemId::new());
        let item = fx
            .repo
            .add_version(
                ItemId::new(),
                lang("en"),
                fields(vec![
                    ("Link1", droplink(b)),
                    ("Related", multilist(&[b, c, b])),
                    ("Title", Field::new("single-line text", b.to_string())),
                ]),
            )
            .unwrap();

        let records = fx.db.extract_references(&item);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.is_owned_by(item.uri())));
        assert!(!records.iter().any(|r| r.source_field == field("Title")));
    }

    #[test]
    fn replace_covers_all_versions() {
        let fx = fixture();
        let id = ItemId::new();
        fx.repo
            .add_version(id, lang("en"), fields(vec![("Link1", droplink(ItemId::new()))]))
            .unwrap();
        fx.repo
            .add_version(id, lang("fr"), fields(vec![("Link1", droplink(ItemId::new()))]))
            .unwrap();

        assert_eq!(fx.db.replace_references_from(&id).unwrap(), 2);
        assert_eq!(fx.db.references_from(&id).unwrap().len(), 2);
    }

    #[test]
    fn replace_for_missing_item_clears_records() {
        let fx = fixture();
        let id = ItemId::new();
        fx.repo
            .add_version(id, lang("en"), fields(vec![("Link1", droplink(ItemId::new()))]))
            .unwrap();
        fx.db.replace_references_from(&id).unwrap();
        fx.repo.delete_item(&id).unwrap();

        assert_eq!(fx.db.replace_references_from(&id).unwrap(), 0);
        assert!(fx.db.references_from(&id).unwrap().is_empty());
    }

    #[test]
    fn replace_version_for_removed_version_drops_only_its_records() {
        let fx = fixture();
        let id = ItemId::new();
        let en = fx
            .repo
            .add_version(id, lang("en"), fields(vec![("Link1", droplink(ItemId::new()))]))
            .unwrap();
        fx.repo
            .add_version(id, lang("fr"), fields(vec![("Link1", droplink(ItemId::new()))]))
            .unwrap();
        fx.db.replace_references_from(&id).unwrap();

        fx.repo.remove_version(en.uri()).unwrap();
        assert_eq!(fx.db.replace_version_references(en.uri()).unwrap(), 0);

        let remaining = fx.db.references_from(&id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].source_language.as_str(), "fr");
    }

    #[test]
    fn referrers_and_broken_links() {
        let fx = fixture();
        let target = ItemId::new();
        let missing = ItemId::new();
        fx.repo.add_version(target, lang("en"), BTreeMap::new()).unwrap();
        let source = fx
            .repo
            .add_version(
                ItemId::new(),
                lang("en"),
                fields(vec![("Link1", droplink(target)), ("Link2", droplink(missing))]),
            )
            .unwrap();
        fx.db.replace_references_from(&source.id()).unwrap();

        let referrers = fx.db.referrers_of(&target).unwrap();
        assert_eq!(referrers.len(), 1);
        assert_eq!(referrers[0].source_item, source.id());

        let broken = fx.db.broken_links_from(&source.id()).unwrap();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].target_item, missing);
    }

    #[test]
    fn remove_reference_is_targeted() {
        let fx = fixture();
        let id = ItemId::new();
        fx.repo
            .add_version(
                id,
                lang("en"),
                fields(vec![("Link1", droplink(ItemId::new())), ("Link2", droplink(ItemId::new()))]),
            )
            .unwrap();
        fx.db.replace_references_from(&id).unwrap();

        let records = fx.db.references_from(&id).unwrap();
        assert!(fx.db.remove_reference(&records[0]).unwrap());
        assert_eq!(fx.db.references_from(&id).unwrap(), vec![records[1].clone()]);
    }

    proptest! {
        #[test]
        fn replace_is_idempotent_and_remove_is_complete(en_links in 0usize..6, fr_links in 0usize..6) {
            let fx = fixture();
            let id = ItemId::new();
            let en_targets: Vec<ItemId> = (0..en_links).map(|_| ItemId::new()).collect();
            let fr_targets: Vec<ItemId> = (0..fr_links).map(|_| ItemId::new()).collect();
            fx.repo.add_version(id, lang("en"), fields(vec![("Related", multilist(&en_targets))])).unwrap();
            fx.repo.add_version(id, lang("fr"), fields(vec![("Related", multilist(&fr_targets))])).unwrap();

            fx.db.replace_references_from(&id).unwrap();
            let once = fx.db.references_from(&id).unwrap();
            fx.db.replace_references_from(&id).unwrap();
            let twice = fx.db.references_from(&id).unwrap();
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.len(), en_links + fr_links);

            fx.db.remove_references_from(&id).unwrap();
            prop_assert!(fx.db.references_from(&id).unwrap().is_empty());
        }
    }
}
