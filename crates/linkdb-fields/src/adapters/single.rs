use linkdb_types::{ItemId, ReferenceRecord};

use crate::adapter::FieldLinkAdapter;

/// Fields whose whole value is one item id (`droplink`, `droptree`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleReferenceAdapter;

impl FieldLinkAdapter for SingleReferenceAdapter {
    fn name(&self) -> &str {
        "single-reference"
    }

    fn links<'v>(&self, value: &'v str) -> Box<dyn Iterator<Item = ItemId> + 'v> {
        Box::new(ItemId::parse(value).ok().into_iter())
    }

    fn remove_link(&self, value: &str, record: &ReferenceRecord) -> String {
        match ItemId::parse(value) {
            Ok(id) if id == record.target_item => String::new(),
            _ => value.to_string(),
        }
    }
}
