//! The [`ReferenceRecord`] value: one outbound reference held by a field of
//! an item version.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::{FieldId, ItemId};
use crate::version::{Language, VersionNumber, VersionUri};

/// One outbound reference from a field of an item version to another item.
///
/// Records are immutable values. The index distinguishes them by the full
/// tuple, so the same target may appear in several records of one item via
/// different fields, languages, or versions.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub source_item: ItemId,
    pub source_language: Language,
    pub source_version: VersionNumber,
    pub source_field: FieldId,
    pub target_item: ItemId,
}

impl ReferenceRecord {
    /// Build a record for a reference found in `field` of the version `source`.
    pub fn new(source: &VersionUri, field: FieldId, target: ItemId) -> Self {
        Self {
            source_item: source.item,
            source_language: source.language.clone(),
            source_version: source.version,
            source_field: field,
            target_item: target,
        }
    }

    /// The version that owns this reference.
    pub fn source_uri(&self) -> VersionUri {
        VersionUri::new(
            self.source_item,
            self.source_language.clone(),
            self.source_version,
        )
    }

    /// Returns `true` if this record is held by the given version.
    pub fn is_owned_by(&self, version: &VersionUri) -> bool {
        self.source_item == version.item
            && self.source_language == version.language
            && self.source_version == version.version
    }
}

impl fmt::Debug for ReferenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{},{} -> {})",
            self.source_item.short_id(),
            self.source_language,
            self.source_version,
            self.source_field,
            self.target_item.short_id()
        )
    }
}
