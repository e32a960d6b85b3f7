use std::sync::OnceLock;

use linkdb_types::{ItemId, ReferenceRecord};
use regex::{Captures, Regex};

use crate::adapter::FieldLinkAdapter;

// Dynamic item links (`~/link.aspx?_id=<hex>`) and media urls
// (`~/media/<hex>.ashx`), with the id as 32 hex digits.
const DYNAMIC_LINK_PATTERN: &str = r"~/(?:link\.aspx\?_id=|media/)([0-9A-Fa-f]{32})";
// The same url through to the end of its attribute value.
const DYNAMIC_URL_PATTERN: &str =
    r#"~/(?:link\.aspx\?_id=|media/)([0-9A-Fa-f]{32})[^"'\s<>]*"#;
const ANCHOR_PATTERN: &str = r"(?is)<a\s([^>]*)>(.*?)</a\s*>";
const IMAGE_PATTERN: &str = r"(?i)<img\s[^>]*>";

fn dynamic_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DYNAMIC_LINK_PATTERN).expect("valid link pattern"))
}

fn dynamic_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DYNAMIC_URL_PATTERN).expect("valid url pattern"))
}

fn anchor() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ANCHOR_PATTERN).expect("valid anchor pattern"))
}

fn image() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IMAGE_PATTERN).expect("valid image pattern"))
}

fn ids(text: &str) -> impl Iterator<Item = ItemId> + '_ {
    dynamic_link()
        .captures_iter(text)
        .filter_map(|caps| ItemId::parse(&caps[1]).ok())
}

fn mentions(text: &str, target: ItemId) -> bool {
    ids(text).any(|id| id == target)
}

/// `rich text` fields: HTML carrying dynamic links and media references.
///
/// Removing a reference unwraps anchors pointing at the target, keeping their
/// inner text, and drops images served from it. Any other url to the target
/// is blanked.
#[derive(Clone, Copy, Debug, Default)]
pub struct RichTextAdapter;

impl FieldLinkAdapter for RichTextAdapter {
    fn name(&self) -> &str {
        "rich-text"
    }

    fn links<'v>(&self, value: &'v str) -> Box<dyn Iterator<Item = ItemId> + 'v> {
        Box::new(ids(value))
    }

    fn remove_link(&self, value: &str, record: &ReferenceRecord) -> String {
        let target = record.target_item;
        let unwrapped = anchor().replace_all(value, |caps: &Captures<'_>| {
            if mentions(&caps[1], target) {
                caps[2].to_string()
            } else {
                caps[0].to_string()
            }
        });
        let without_images = image().replace_all(&unwrapped, |caps: &Captures<'_>| {
            if mentions(&caps[0], target) {
                String::new()
            } else {
                caps[0].to_string()
            }
        });
        dynamic_url()
            .replace_all(&without_images, |caps: &Captures<'_>| {
                if ItemId::parse(&caps[1]).ok() == Some(target) {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}
