//! In-memory repository and security context for tests and embedding.
//!
//! [`InMemoryRepository`] keeps every item version in a `HashMap` behind a
//! `RwLock`, with open edits tracked separately so staged values never leak
//! into reads before commit.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use linkdb_types::{FieldId, ItemId, Language, VersionNumber, VersionUri};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::item::{Field, Item};
use crate::security::{ElevatedPrivilege, SecurityContext};
use crate::traits::ContentRepository;

type VersionKey = (Language, VersionNumber);

#[derive(Default)]
struct StoredItem {
    versions: BTreeMap<VersionKey, BTreeMap<FieldId, Field>>,
    protected: bool,
    reject_writes: bool,
}

impl StoredItem {
    fn snapshot(&self, id: ItemId, key: &VersionKey) -> Option<Item> {
        self.versions.get(key).map(|fields| {
            Item::new(
                VersionUri::new(id, key.0.clone(), key.1),
                fields.clone(),
            )
        })
    }
}

fn key_of(uri: &VersionUri) -> VersionKey {
    (uri.language.clone(), uri.version)
}

/// An in-memory implementation of [`ContentRepository`].
///
/// Besides the trait, it exposes the mutations a real repository performs
/// before firing lifecycle events (adding and removing versions, copying and
/// deleting items) so tests can drive the link database end to end.
pub struct InMemoryRepository {
    items: RwLock<HashMap<ItemId, StoredItem>>,
    edits: Mutex<HashMap<VersionUri, BTreeMap<FieldId, String>>>,
}

impl InMemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            edits: Mutex::new(HashMap::new()),
        }
    }

    fn read_items(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<ItemId, StoredItem>>> {
        self.items
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_items(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<ItemId, StoredItem>>> {
        self.items
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn lock_edits(
        &self,
    ) -> StoreResult<MutexGuard<'_, HashMap<VersionUri, BTreeMap<FieldId, String>>>> {
        self.edits
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Insert or overwrite a version with the given field contents.
    pub fn put_version(&self, item: Item) -> StoreResult<()> {
        let mut items = self.write_items()?;
        let stored = items.entry(item.id()).or_default();
        let key = key_of(item.uri());
        let uri = item.uri().clone();
        stored.versions.insert(key, item.fields().map(|(k, v)| (k.clone(), v.clone())).collect());
        debug!(version = %uri, "version stored");
        Ok(())
    }

    /// Append a new version in `language`, numbered after the latest one.
    pub fn add_version(
        &self,
        id: ItemId,
        language: Language,
        fields: BTreeMap<FieldId, Field>,
    ) -> StoreResult<Item> {
        let mut items = self.write_items()?;
        let stored = items.entry(id).or_default();
        let number = stored
            .versions
            .keys()
            .filter(|(lang, _)| *lang == language)
            .map(|(_, n)| n.next())
            .max()
            .unwrap_or(VersionNumber::FIRST);
        let key = (language, number);
        stored.versions.insert(key.clone(), fields.clone());
        let uri = VersionUri::new(id, key.0, key.1);
        debug!(version = %uri, "version added");
        Ok(Item::new(uri, fields))
    }

    /// Remove one version, returning its last contents.
    pub fn remove_version(&self, uri: &VersionUri) -> StoreResult<Item> {
        let mut items = self.write_items()?;
        let stored = items
            .get_mut(&uri.item)
            .ok_or(StoreError::ItemNotFound(uri.item))?;
        let fields = stored
            .versions
            .remove(&key_of(uri))
            .ok_or_else(|| StoreError::VersionNotFound(uri.clone()))?;
        debug!(version = %uri, "version removed");
        Ok(Item::new(uri.clone(), fields))
    }

    /// Delete an item with all its versions, returning their last contents.
    pub fn delete_item(&self, id: &ItemId) -> StoreResult<Vec<Item>> {
        let mut items = self.write_items()?;
        let stored = items.remove(id).ok_or(StoreError::ItemNotFound(*id))?;
        debug!(item = %id, versions = stored.versions.len(), "item deleted");
        Ok(stored
            .versions
            .keys()
            .filter_map(|key| stored.snapshot(*id, key))
            .collect())
    }

    /// Copy every version of `source` to a new item `copy`.
    pub fn copy_item(&self, source: &ItemId, copy: ItemId) -> StoreResult<Vec<Item>> {
        let mut items = self.write_items()?;
        let versions = items
            .get(source)
            .ok_or(StoreError::ItemNotFound(*source))?
            .versions
            .clone();
        let copied: Vec<Item> = versions
            .iter()
            .map(|((lang, number), fields)| {
                let mut item = Item::new(
                    VersionUri::new(copy, lang.clone(), *number),
                    BTreeMap::new(),
                );
                item.fields_mut().extend(fields.clone());
                item
            })
            .collect();
        items.insert(
            copy,
            StoredItem {
                versions,
                ..StoredItem::default()
            },
        );
        debug!(source = %source, copy = %copy, "item copied");
        Ok(copied)
    }

    /// Require elevated privilege for edits of this item.
    pub fn set_protected(&self, id: &ItemId, protected: bool) -> StoreResult<()> {
        let mut items = self.write_items()?;
        items
            .get_mut(id)
            .ok_or(StoreError::ItemNotFound(*id))?
            .protected = protected;
        Ok(())
    }

    /// Make every commit on this item fail, simulating a storage fault.
    pub fn set_reject_writes(&self, id: &ItemId, reject: bool) -> StoreResult<()> {
        let mut items = self.write_items()?;
        items
            .get_mut(id)
            .ok_or(StoreError::ItemNotFound(*id))?
            .reject_writes = reject;
        Ok(())
    }

    /// Current persisted value of one field.
    pub fn field_value(&self, uri: &VersionUri, field: &FieldId) -> StoreResult<Option<String>> {
        let items = self.read_items()?;
        Ok(items
            .get(&uri.item)
            .and_then(|stored| stored.versions.get(&key_of(uri)))
            .and_then(|fields| fields.get(field))
            .map(|f| f.value.clone()))
    }

    /// Whether an edit is currently open on `uri`.
    pub fn is_editing(&self, uri: &VersionUri) -> bool {
        self.edits
            .lock()
            .map(|edits| edits.contains_key(uri))
            .unwrap_or(false)
    }

    /// Number of items in the repository.
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    /// Returns `true` if the repository holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("item_count", &self.len())
            .finish()
    }
}

impl ContentRepository for InMemoryRepository {
    fn item_exists(&self, id: &ItemId) -> StoreResult<bool> {
        Ok(self.read_items()?.contains_key(id))
    }

    fn versions(&self, id: &ItemId) -> StoreResult<Vec<Item>> {
        let items = self.read_items()?;
        Ok(match items.get(id) {
            Some(stored) => stored
                .versions
                .keys()
                .filter_map(|key| stored.snapshot(*id, key))
                .collect(),
            None => Vec::new(),
        })
    }

    fn get_version(&self, uri: &VersionUri) -> StoreResult<Option<Item>> {
        let items = self.read_items()?;
        Ok(items
            .get(&uri.item)
            .and_then(|stored| stored.snapshot(uri.item, &key_of(uri))))
    }

    fn begin_edit(
        &self,
        uri: &VersionUri,
        privilege: Option<&ElevatedPrivilege<'_>>,
    ) -> StoreResult<()> {
        {
            let items = self.read_items()?;
            let stored = items
                .get(&uri.item)
                .ok_or(StoreError::ItemNotFound(uri.item))?;
            if !stored.versions.contains_key(&key_of(uri)) {
                return Err(StoreError::VersionNotFound(uri.clone()));
            }
            if stored.protected && !privilege.is_some_and(|p| p.is_active()) {
                return Err(StoreError::AccessDenied {
                    uri: uri.clone(),
                    reason: "item is protected".into(),
                });
            }
        }

        let mut edits = self.lock_edits()?;
        if edits.contains_key(uri) {
            return Err(StoreError::EditInProgress(uri.clone()));
        }
        edits.insert(uri.clone(), BTreeMap::new());
        Ok(())
    }

    fn set_field_value(
        &self,
        uri: &VersionUri,
        field: &FieldId,
        value: String,
    ) -> StoreResult<()> {
        let known = self
            .read_items()?
            .get(&uri.item)
            .and_then(|stored| stored.versions.get(&key_of(uri)))
            .is_some_and(|fields| fields.contains_key(field));

        let mut edits = self.lock_edits()?;
        let staged = edits
            .get_mut(uri)
            .ok_or_else(|| StoreError::NoOpenEdit(uri.clone()))?;
        if !known {
            return Err(StoreError::FieldNotFound {
                uri: uri.clone(),
                field: field.clone(),
            });
        }
        staged.insert(field.clone(), value);
        Ok(())
    }

    fn end_edit(&self, uri: &VersionUri, commit: bool) -> StoreResult<()> {
        let staged = self
            .lock_edits()?
            .remove(uri)
            .ok_or_else(|| StoreError::NoOpenEdit(uri.clone()))?;
        if !commit {
            return Ok(());
        }

        let mut items = self.write_items()?;
        let stored = items
            .get_mut(&uri.item)
            .ok_or(StoreError::ItemNotFound(uri.item))?;
        if stored.reject_writes {
            return Err(StoreError::WriteRejected(uri.clone()));
        }
        let fields = stored
            .versions
            .get_mut(&key_of(uri))
            .ok_or_else(|| StoreError::VersionNotFound(uri.clone()))?;
        for (field, value) in staged {
            if let Some(existing) = fields.get_mut(&field) {
                existing.value = value;
            }
        }
        Ok(())
    }
}

/// A [`SecurityContext`] that counts nested elevations.
#[derive(Debug, Default)]
pub struct InMemorySecurityContext {
    depth: AtomicUsize,
    grants: AtomicUsize,
    refuse: AtomicBool,
}

impl InMemorySecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `elevate` calls fail.
    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Number of elevations currently held.
    pub fn active(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Number of elevations granted over the context's lifetime.
    pub fn total_grants(&self) -> usize {
        self.grants.load(Ordering::SeqCst)
    }
}

impl SecurityContext for InMemorySecurityContext {
    fn elevate(&self, reason: &str) -> StoreResult<()> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(StoreError::ElevationRefused(reason.to_string()));
        }
        self.depth.fetch_add(1, Ordering::SeqCst);
        self.grants.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn revoke(&self) {
        let _ = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1));
    }

    fn is_elevated(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}
