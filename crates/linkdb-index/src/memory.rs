//! In-memory reference store for tests and embedding.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use linkdb_types::{ItemId, ReferenceRecord, VersionUri};

use crate::error::{IndexError, IndexResult};
use crate::traits::ReferenceStore;

type RecordMap = HashMap<ItemId, BTreeSet<ReferenceRecord>>;

/// An in-memory implementation of [`ReferenceStore`].
///
/// Records live in a `HashMap` of per-item sets behind a `RwLock`. Each
/// trait call takes the lock once, so every write is atomic. Reverse
/// lookups scan all items.
#[derive(Debug, Default)]
pub struct InMemoryReferenceStore {
    records: RwLock<RecordMap>,
}

impl InMemoryReferenceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IndexResult<RwLockReadGuard<'_, RecordMap>> {
        self.records
            .read()
            .map_err(|e| IndexError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> IndexResult<RwLockWriteGuard<'_, RecordMap>> {
        self.records
            .write()
            .map_err(|e| IndexError::LockPoisoned(e.to_string()))
    }

    /// Number of source items with at least one record.
    pub fn source_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }
}

impl ReferenceStore for InMemoryReferenceStore {
    fn records_from(&self, source: &ItemId) -> IndexResult<Vec<ReferenceRecord>> {
        let records = self.read()?;
        Ok(records
            .get(source)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn records_to(&self, target: &ItemId) -> IndexResult<Vec<ReferenceRecord>> {
        let records = self.read()?;
        let mut found: Vec<ReferenceRecord> = records
            .values()
            .flatten()
            .filter(|r| r.target_item == *target)
            .cloned()
            .collect();
        found.sort();
        Ok(found)
    }

    fn insert(&self, record: ReferenceRecord) -> IndexResult<bool> {
        let mut records = self.write()?;
        Ok(records.entry(record.source_item).or_default().insert(record))
    }

    fn remove_all_from(&self, source: &ItemId) -> IndexResult<usize> {
        let mut records = self.write()?;
        Ok(records.remove(source).map_or(0, |set| set.len()))
    }

    fn replace_all_from(&self, source: &ItemId, records: Vec<ReferenceRecord>) -> IndexResult<()> {
        if let Some(foreign) = records.iter().find(|r| r.source_item != *source) {
            return Err(IndexError::ForeignRecord {
                item: *source,
                record: foreign.clone(),
            });
        }

        let set: BTreeSet<ReferenceRecord> = records.into_iter().collect();
        let mut map = self.write()?;
        if set.is_empty() {
            map.remove(source);
        } else {
            map.insert(*source, set);
        }
        Ok(())
    }

    fn replace_version(
        &self,
        version: &VersionUri,
        records: Vec<ReferenceRecord>,
    ) -> IndexResult<()> {
        if let Some(foreign) = records.iter().find(|r| !r.is_owned_by(version)) {
            return Err(IndexError::ForeignVersionRecord {
                version: version.clone(),
                record: foreign.clone(),
            });
        }

        let mut map = self.write()?;
        let set = map.entry(version.item).or_default();
        set.retain(|r| !r.is_owned_by(version));
        set.extend(records);
        if set.is_empty() {
            map.remove(&version.item);
        }
        Ok(())
    }

    fn remove_record(&self, record: &ReferenceRecord) -> IndexResult<bool> {
        let mut map = self.write()?;
        let Some(set) = map.get_mut(&record.source_item) else {
            return Ok(false);
        };
        let removed = set.remove(record);
        if set.is_empty() {
            map.remove(&record.source_item);
        }
        Ok(removed)
    }

    fn len(&self) -> IndexResult<usize> {
        Ok(self.read()?.values().map(BTreeSet::len).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkdb_types::{FieldId, Language, VersionNumber};

    fn version(item: ItemId, lang: &str, number: u32) -> VersionUri {
        VersionUri::new(
            item,
            Language::new(lang).unwrap(),
            VersionNumber::new(number).unwrap(),
        )
    }

    fn record(source: &VersionUri, field: &str, target: ItemId) -> ReferenceRecord {
        ReferenceRecord::new(source, FieldId::new(field).unwrap(), target)
    }

    #[test]
    fn insert_and_read_back() {
        let store = InMemoryReferenceStore::new();
        let en = version(ItemId::new(), "en", 1);
        let r = record(&en, "Link1", ItemId::new());

        assert!(store.insert(r.clone()).unwrap());
        assert!(!store.insert(r.clone()).unwrap());
        assert_eq!(store.records_from(&en.item).unwrap(), vec![r]);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn same_target_in_two_fields_is_two_records() {
        let store = InMemoryReferenceStore::new();
        let en = version(ItemId::new(), "en", 1);
        let target = ItemId::new();
        store.insert(record(&en, "Link1", target)).unwrap();
        store.insert(record(&en, "Link2", target)).unwrap();

        assert_eq!(store.records_from(&en.item).unwrap().len(), 2);
        assert_eq!(store.records_to(&target).unwrap().len(), 2);
    }

    #[test]
    fn remove_all_from_is_idempotent() {
        let store = InMemoryReferenceStore::new();
        let en = version(ItemId::new(), "en", 1);
        store.insert(record(&en, "Link1", ItemId::new())).unwrap();
        store.insert(record(&en, "Link2", ItemId::new())).unwrap();

        assert_eq!(store.remove_all_from(&en.item).unwrap(), 2);
        assert_eq!(store.remove_all_from(&en.item).unwrap(), 0);
        assert!(store.is_empty().unwrap());
        assert_eq!(store.source_count(), 0);
    }

    #[test]
    fn replace_all_from_overwrites_previous_set() {
        let store = InMemoryReferenceStore::new();
        let en = version(ItemId::new(), "en", 1);
        store.insert(record(&en, "Link1", ItemId::new())).unwrap();

        let fresh = vec![record(&en, "Link2", ItemId::new())];
        store.replace_all_from(&en.item, fresh.clone()).unwrap();
        assert_eq!(store.records_from(&en.item).unwrap(), fresh);
    }

    #[test]
    fn replace_all_from_rejects_foreign_records() {
        let store = InMemoryReferenceStore::new();
        let mine = version(ItemId::new(), "en", 1);
        let other = version(ItemId::new(), "en", 1);
        store.insert(record(&mine, "Link1", ItemId::new())).unwrap();

        let err = store
            .replace_all_from(&mine.item, vec![record(&other, "Link1", ItemId::new())])
            .unwrap_err();
        assert!(matches!(err, IndexError::ForeignRecord { .. }));
        assert_eq!(store.records_from(&mine.item).unwrap().len(), 1);
    }

    #[test]
    fn replace_version_leaves_other_versions_alone() {
        let store = InMemoryReferenceStore::new();
        let item = ItemId::new();
        let en = version(item, "en", 1);
        let fr = version(item, "fr", 1);
        let keep = record(&fr, "Link1", ItemId::new());
        store.insert(record(&en, "Link1", ItemId::new())).unwrap();
        store.insert(keep.clone()).unwrap();

        store.replace_version(&en, Vec::new()).unwrap();
        assert_eq!(store.records_from(&item).unwrap(), vec![keep]);
    }

    #[test]
    fn replace_version_rejects_records_of_sibling_version() {
        let store = InMemoryReferenceStore::new();
        let item = ItemId::new();
        let en1 = version(item, "en", 1);
        let en2 = version(item, "en", 2);

        let err = store
            .replace_version(&en1, vec![record(&en2, "Link1", ItemId::new())])
            .unwrap_err();
        assert!(matches!(err, IndexError::ForeignVersionRecord { .. }));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn remove_record_matches_full_tuple() {
        let store = InMemoryReferenceStore::new();
        let item = ItemId::new();
        let target = ItemId::new();
        let en = version(item, "en", 1);
        let fr = version(item, "fr", 1);
        store.insert(record(&en, "Link1", target)).unwrap();
        store.insert(record(&fr, "Link1", target)).unwrap();

        assert!(store.remove_record(&record(&en, "Link1", target)).unwrap());
        assert!(!store.remove_record(&record(&en, "Link1", target)).unwrap());
        assert_eq!(store.records_from(&item).unwrap(), vec![record(&fr, "Link1", target)]);
    }

    #[test]
    fn concurrent_writers_on_different_items() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryReferenceStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let en = version(ItemId::new(), "en", 1);
                    for _ in 0..50 {
                        let records = vec![
                            record(&en, "Link1", ItemId::new()),
                            record(&en, "Link2", ItemId::new()),
                        ];
                        store.replace_all_from(&en.item, records).unwrap();
                    }
                    en.item
                })
            })
            .collect();

        for handle in handles {
            let item = handle.join().unwrap();
            assert_eq!(store.records_from(&item).unwrap().len(), 2);
        }
        assert_eq!(store.len().unwrap(), 16);
    }
}
