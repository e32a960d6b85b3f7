//! Shared fixtures for this crate's tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use linkdb_fields::FieldTypeRegistry;
use linkdb_index::{InMemoryReferenceStore, LinkDatabase};
use linkdb_store::{Field, InMemoryRepository, InMemorySecurityContext, Item};
use linkdb_types::{FieldId, ItemId, Language, ReferenceRecord};

use crate::config::LinkDatabaseConfig;
use crate::event::EventEnvelope;
use crate::resolver::UpdateResolver;
use crate::router::{DispatchOutcome, MutationRouter};
use crate::signals::{LinkDisabler, PublishState};

pub(crate) struct Harness {
    pub repo: Arc<InMemoryRepository>,
    pub security: Arc<InMemorySecurityContext>,
    pub publishing: Arc<PublishState>,
    pub tracking: Arc<LinkDisabler>,
    pub router: Arc<MutationRouter>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(LinkDatabaseConfig::default())
    }

    pub fn with_config(config: LinkDatabaseConfig) -> Self {
        Self::with_fields(config, FieldTypeRegistry::with_defaults())
    }

    pub fn with_fields(config: LinkDatabaseConfig, fields: FieldTypeRegistry) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let security = Arc::new(InMemorySecurityContext::new());
        let publishing = Arc::new(PublishState::new());
        let tracking = Arc::new(LinkDisabler::new());
        let links = LinkDatabase::new(
            Arc::new(InMemoryReferenceStore::new()),
            repo.clone(),
            Arc::new(fields),
        );
        let resolver = UpdateResolver::new(links, security.clone(), &config);
        let router = Arc::new(MutationRouter::new(
            config,
            resolver,
            publishing.clone(),
            tracking.clone(),
        ));
        Self {
            repo,
            security,
            publishing,
            tracking,
            router,
        }
    }

    pub fn links(&self) -> &LinkDatabase {
        self.router.resolver().links()
    }

    /// Add a version and raise the save event for it, as the repository would.
    pub fn add(&self, id: ItemId, language: &str, fields: Vec<(&str, Field)>) -> Item {
        let item = self
            .repo
            .add_version(id, lang(language), field_map(fields))
            .unwrap();
        self.router
            .dispatch(&EventEnvelope::item_saved(item.clone()))
            .unwrap();
        item
    }

    pub fn dispatch(&self, envelope: EventEnvelope) -> DispatchOutcome {
        self.router.dispatch(&envelope).unwrap()
    }

    pub fn refs(&self, id: &ItemId) -> Vec<ReferenceRecord> {
        self.links().references_from(id).unwrap()
    }

    pub fn value(&self, item: &Item, name: &str) -> Option<String> {
        self.repo.field_value(item.uri(), &field(name)).unwrap()
    }
}

pub(crate) fn lang(tag: &str) -> Language {
    Language::new(tag).unwrap()
}

pub(crate) fn field(name: &str) -> FieldId {
    FieldId::new(name).unwrap()
}

pub(crate) fn droplink(target: ItemId) -> Field {
    Field::new("droplink", target.to_string())
}

pub(crate) fn rich_text(html: impl Into<String>) -> Field {
    Field::new("rich text", html)
}

pub(crate) fn multilist(targets: &[ItemId]) -> Field {
    let value = targets
        .iter()
        .map(ItemId::to_string)
        .collect::<Vec<_>>()
        .join("|");
    Field::new("multilist", value)
}

pub(crate) fn field_map(fields: Vec<(&str, Field)>) -> BTreeMap<FieldId, Field> {
    fields.into_iter().map(|(name, f)| (field(name), f)).collect()
}

/// The `(language, field, target)` view of records, sorted.
pub(crate) fn tuples(records: &[ReferenceRecord]) -> Vec<(String, String, ItemId)> {
    let mut out: Vec<_> = records
        .iter()
        .map(|r| {
            (
                r.source_language.to_string(),
                r.source_field.to_string(),
                r.target_item,
            )
        })
        .collect();
    out.sort();
    out
}

pub(crate) fn tuple(language: &str, field: &str, target: ItemId) -> (String, String, ItemId) {
    (language.to_string(), field.to_string(), target)
}
