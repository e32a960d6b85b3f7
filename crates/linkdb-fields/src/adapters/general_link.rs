use std::sync::OnceLock;

use linkdb_types::{ItemId, ReferenceRecord};
use regex::Regex;

use crate::adapter::FieldLinkAdapter;

// Matches the id attribute of a `<link .../>` element.
const ID_ATTRIBUTE_PATTERN: &str = r#"(?:^|\s)id\s*=\s*"([^"]*)""#;

fn id_attribute() -> &'static Regex {
    static ID_ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ID_ATTRIBUTE.get_or_init(|| Regex::new(ID_ATTRIBUTE_PATTERN).expect("valid id pattern"))
}

/// `general link` fields: a single XML element such as
/// `<link linktype="internal" text="About" id="{...}" />`.
///
/// Internal and media links carry the target in `id`; external, mailto and
/// anchor links carry none.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneralLinkAdapter;

impl FieldLinkAdapter for GeneralLinkAdapter {
    fn name(&self) -> &str {
        "general-link"
    }

    fn links<'v>(&self, value: &'v str) -> Box<dyn Iterator<Item = ItemId> + 'v> {
        Box::new(
            id_attribute()
                .captures_iter(value)
                .filter_map(|caps| ItemId::parse(&caps[1]).ok()),
        )
    }

    fn remove_link(&self, value: &str, record: &ReferenceRecord) -> String {
        if self.links(value).any(|id| id == record.target_item) {
            String::new()
        } else {
            value.to_string()
        }
    }
}
