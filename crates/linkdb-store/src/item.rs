//! Loaded item versions and their fields.

use std::collections::BTreeMap;

use linkdb_types::{FieldId, ItemId, Language, VersionNumber, VersionUri};
use serde::{Deserialize, Serialize};

/// A field value together with the tag naming its field type.
///
/// Values are stored in their serialized string form; the field type tag
/// (e.g. `droplink`, `multilist`, `rich text`) selects the link adapter
/// able to read references out of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub field_type: String,
    pub value: String,
}

impl Field {
    pub fn new(field_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            value: value.into(),
        }
    }
}

/// One version of an item as handed out by the repository.
///
/// This is a snapshot: mutating it does not write back to the repository.
/// Writes go through [`crate::EditTransaction`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    uri: VersionUri,
    fields: BTreeMap<FieldId, Field>,
}

impl Item {
    pub fn new(uri: VersionUri, fields: BTreeMap<FieldId, Field>) -> Self {
        Self { uri, fields }
    }

    /// Builder-style helper for assembling a version field by field.
    pub fn with_field(mut self, field: FieldId, value: Field) -> Self {
        self.fields.insert(field, value);
        self
    }

    pub fn uri(&self) -> &VersionUri {
        &self.uri
    }

    pub fn id(&self) -> ItemId {
        self.uri.item
    }

    pub fn language(&self) -> &Language {
        &self.uri.language
    }

    pub fn version(&self) -> VersionNumber {
        self.uri.version
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldId, &Field)> {
        self.fields.iter()
    }

    pub(crate) fn fields_mut(&mut self) -> &mut BTreeMap<FieldId, Field> {
        &mut self.fields
    }
}
