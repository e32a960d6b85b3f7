//! Field-type tag to adapter registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::adapter::FieldLinkAdapter;
use crate::adapters::{GeneralLinkAdapter, MultiReferenceAdapter, RichTextAdapter, SingleReferenceAdapter};
use crate::error::FieldError;

/// Maps field-type tags (case-insensitive) to their link adapters.
///
/// Assemble it once at startup and share it behind an `Arc`; lookups never
/// inspect values, only the tag stored with each field.
#[derive(Clone, Default)]
pub struct FieldTypeRegistry {
    adapters: HashMap<String, Arc<dyn FieldLinkAdapter>>,
}

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

impl FieldTypeRegistry {
    /// An empty registry: no field type holds references.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every shipped adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(&["droplink", "droptree", "reference"], Arc::new(SingleReferenceAdapter));
        registry.register(&["multilist", "treelist", "checklist"], Arc::new(MultiReferenceAdapter));
        registry.register(&["general link"], Arc::new(GeneralLinkAdapter));
        registry.register(&["rich text"], Arc::new(RichTextAdapter));
        registry
    }

    /// Register `adapter` for each tag, replacing earlier registrations.
    pub fn register(&mut self, tags: &[&str], adapter: Arc<dyn FieldLinkAdapter>) {
        for tag in tags {
            debug!(field_type = %tag, adapter = adapter.name(), "field adapter registered");
            self.adapters.insert(normalize(tag), Arc::clone(&adapter));
        }
    }

    /// Look up the adapter for a field type.
    pub fn get(&self, field_type: &str) -> Option<&dyn FieldLinkAdapter> {
        self.adapters.get(&normalize(field_type)).map(|a| a.as_ref())
    }

    /// Like [`Self::get`], but reports a missing adapter as an error.
    pub fn resolve(&self, field_type: &str) -> Result<&dyn FieldLinkAdapter, FieldError> {
        self.get(field_type)
            .ok_or_else(|| FieldError::UnsupportedFieldType {
                field_type: field_type.to_string(),
            })
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// All registered tags, sorted.
    pub fn field_types(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldTypeRegistry")
            .field("field_types", &self.field_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkdb_types::{ItemId, ReferenceRecord};

    struct Fixed(ItemId);

    impl FieldLinkAdapter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn links<'v>(&self, _value: &'v str) -> Box<dyn Iterator<Item = ItemId> + 'v> {
            Box::new(std::iter::once(self.0))
        }

        fn remove_link(&self, value: &str, _record: &ReferenceRecord) -> String {
            value.to_string()
        }
    }

    #[test]
    fn defaults_cover_reference_field_types() {
        let registry = FieldTypeRegistry::with_defaults();
        for tag in ["droplink", "Droptree", "MULTILIST", "treelist", "General Link", "rich text"] {
            assert!(registry.get(tag).is_some(), "missing adapter for {tag}");
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn text_fields_are_unsupported() {
        let registry = FieldTypeRegistry::with_defaults();
        assert!(registry.get("single-line text").is_none());
        assert_eq!(
            registry.resolve("single-line text").err(),
            Some(FieldError::UnsupportedFieldType {
                field_type: "single-line text".into()
            })
        );
    }

    #[test]
    fn register_replaces_existing_adapter() {
        let mut registry = FieldTypeRegistry::with_defaults();
        let target = ItemId::new();
        registry.register(&["droplink"], Arc::new(Fixed(target)));

        let adapter = registry.resolve("droplink").unwrap();
        assert_eq!(adapter.name(), "fixed");
        assert_eq!(adapter.links("").collect::<Vec<_>>(), vec![target]);
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = FieldTypeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("droplink").is_err());
    }

    #[test]
    fn field_types_are_sorted() {
        let registry = FieldTypeRegistry::with_defaults();
        let tags = registry.field_types();
        let mut sorted = tags.clone();
        sorted.sort_unstable();
        assert_eq!(tags, sorted);
        assert!(tags.contains(&"general link"));
    }
}
