use linkdb_types::{ItemId, ReferenceRecord};

use crate::adapter::FieldLinkAdapter;

const SEPARATOR: char = '|';

/// Fields holding a pipe-separated list of item ids (`multilist`,
/// `treelist`, `checklist`).
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiReferenceAdapter;

impl FieldLinkAdapter for MultiReferenceAdapter {
    fn name(&self) -> &str {
        "multi-reference"
    }

    fn links<'v>(&self, value: &'v str) -> Box<dyn Iterator<Item = ItemId> + 'v> {
        Box::new(
            value
                .split(SEPARATOR)
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .filter_map(|token| ItemId::parse(token).ok()),
        )
    }

    fn remove_link(&self, value: &str, record: &ReferenceRecord) -> String {
        value
            .split(SEPARATOR)
            .filter(|token| !token.trim().is_empty())
            .filter(|token| ItemId::parse(token).ok() != Some(record.target_item))
            .collect::<Vec<_>>()
            .join("|")
    }
}
