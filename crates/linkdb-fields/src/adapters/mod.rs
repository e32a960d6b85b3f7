//! Shipped [`crate::FieldLinkAdapter`] implementations.

pub mod general_link;
pub mod multilist;
pub mod rich_text;
pub mod single;

pub use general_link::GeneralLinkAdapter;
pub use multilist::MultiReferenceAdapter;
pub use rich_text::RichTextAdapter;
pub use single::SingleReferenceAdapter;

#[cfg(test)]
pub(crate) mod test_support {
    use linkdb_types::{FieldId, ItemId, Language, ReferenceRecord, VersionNumber, VersionUri};

    /// A record pointing at `target` from an arbitrary `en` version.
    pub fn record_to(target: ItemId) -> ReferenceRecord {
        let source = VersionUri::new(
            ItemId::new(),
            Language::new("en").unwrap(),
            VersionNumber::FIRST,
        );
        ReferenceRecord::new(&source, FieldId::new("Link").unwrap(), target)
    }
}
