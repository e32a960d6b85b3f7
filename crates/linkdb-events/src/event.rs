//! Lifecycle events as delivered by the repository and as handled here.
//!
//! The repository raises events with positional parameters
//! ([`EventEnvelope`]). Handlers work on [`MutationEvent`], which names each
//! argument; conversion happens once, at the router.

use std::fmt;

use linkdb_store::Item;
use serde::{Deserialize, Serialize};

use crate::error::{EventError, EventResult};

/// The lifecycle events the link database listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An item and all its versions were deleted.
    ItemDeleted,
    /// An item was copied to a new item.
    ItemCopied,
    /// An item version was saved.
    ItemSaved,
    /// One version of an item was removed.
    VersionRemoved,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::ItemDeleted,
        EventKind::ItemCopied,
        EventKind::ItemSaved,
        EventKind::VersionRemoved,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ItemDeleted => "item:deleted",
            Self::ItemCopied => "item:copied",
            Self::ItemSaved => "item:saved",
            Self::VersionRemoved => "item:versionRemoved",
        };
        write!(f, "{s}")
    }
}

/// One positional event parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventParameter {
    /// An item version.
    Item(Item),
    /// Anything else the repository passes along (parent ids, change sets).
    Value(serde_json::Value),
}

/// An event as raised by the repository.
///
/// `parameters` is `None` when the event carries no arguments at all. Item
/// positions: deletion, save and version removal put the affected item at
/// 0; copy puts the source at 0 and the new copy at 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub kind: EventKind,
    pub parameters: Option<Vec<EventParameter>>,
}

impl EventEnvelope {
    pub fn new(kind: EventKind, parameters: Vec<EventParameter>) -> Self {
        Self {
            kind,
            parameters: Some(parameters),
        }
    }

    /// An envelope with no arguments.
    pub fn empty(kind: EventKind) -> Self {
        Self {
            kind,
            parameters: None,
        }
    }

    pub fn item_deleted(item: Item) -> Self {
        Self::new(EventKind::ItemDeleted, vec![EventParameter::Item(item)])
    }

    pub fn item_copied(source: Item, copy: Item) -> Self {
        Self::new(
            EventKind::ItemCopied,
            vec![EventParameter::Item(source), EventParameter::Item(copy)],
        )
    }

    pub fn item_saved(item: Item) -> Self {
        Self::new(EventKind::ItemSaved, vec![EventParameter::Item(item)])
    }

    pub fn version_removed(item: Item) -> Self {
        Self::new(EventKind::VersionRemoved, vec![EventParameter::Item(item)])
    }
}

/// A lifecycle event with named arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum MutationEvent {
    ItemDeleted { item: Item },
    ItemCopied { source: Option<Item>, copy: Item },
    ItemSaved { item: Item },
    /// `item` is the removed version, as it was before removal.
    VersionRemoved { item: Item },
}

impl MutationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ItemDeleted { .. } => EventKind::ItemDeleted,
            Self::ItemCopied { .. } => EventKind::ItemCopied,
            Self::ItemSaved { .. } => EventKind::ItemSaved,
            Self::VersionRemoved { .. } => EventKind::VersionRemoved,
        }
    }

    /// The item whose references the event affects.
    pub fn subject(&self) -> &Item {
        match self {
            Self::ItemDeleted { item } | Self::ItemSaved { item } | Self::VersionRemoved { item } => {
                item
            }
            Self::ItemCopied { copy, .. } => copy,
        }
    }

    /// Name the positional parameters of a `kind` event.
    ///
    /// Fails with `MalformedEvent` if the required item is missing or the
    /// parameter at its position is not an item.
    pub fn from_parameters(kind: EventKind, parameters: &[EventParameter]) -> EventResult<Self> {
        Ok(match kind {
            EventKind::ItemDeleted => Self::ItemDeleted {
                item: item_at(kind, parameters, 0)?,
            },
            EventKind::ItemCopied => Self::ItemCopied {
                source: match parameters.first() {
                    Some(EventParameter::Item(item)) => Some(item.clone()),
                    _ => None,
                },
                copy: item_at(kind, parameters, 1)?,
            },
            EventKind::ItemSaved => Self::ItemSaved {
                item: item_at(kind, parameters, 0)?,
            },
            EventKind::VersionRemoved => Self::VersionRemoved {
                item: item_at(kind, parameters, 0)?,
            },
        })
    }
}

fn item_at(kind: EventKind, parameters: &[EventParameter], position: usize) -> EventResult<Item> {
    match parameters.get(position) {
        Some(EventParameter::Item(item)) => Ok(item.clone()),
        Some(EventParameter::Value(_)) => Err(EventError::MalformedEvent {
            kind,
            reason: format!("parameter {position} is not an item"),
        }),
        None => Err(EventError::MalformedEvent {
            kind,
            reason: format!("no item in parameters at position {position}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use linkdb_types::{ItemId, Language, VersionNumber, VersionUri};

    fn item() -> Item {
        Item::new(
            VersionUri::new(ItemId::new(), Language::new("en").unwrap(), VersionNumber::FIRST),
            BTreeMap::new(),
        )
    }

    #[test]
    fn deletion_takes_item_at_zero() {
        let deleted = item();
        let params = vec![
            EventParameter::Item(deleted.clone()),
            EventParameter::Value(serde_json::json!("{parent-id}")),
        ];
        let event = MutationEvent::from_parameters(EventKind::ItemDeleted, &params).unwrap();
        assert_eq!(event, MutationEvent::ItemDeleted { item: deleted });
    }

    #[test]
    fn copy_takes_the_copy_at_one() {
        let (source, copy) = (item(), item());
        let envelope = EventEnvelope::item_copied(source.clone(), copy.clone());
        let event = MutationEvent::from_parameters(
            envelope.kind,
            envelope.parameters.as_deref().unwrap(),
        )
        .unwrap();

        assert_eq!(event.subject(), &copy);
        assert_eq!(
            event,
            MutationEvent::ItemCopied {
                source: Some(source),
                copy
            }
        );
    }

    #[test]
    fn missing_item_is_malformed() {
        for kind in EventKind::ALL {
            let err = MutationEvent::from_parameters(kind, &[]).unwrap_err();
            assert!(
                matches!(err, EventError::MalformedEvent { kind: k, .. } if k == kind),
                "expected MalformedEvent for {kind}, got: {err}"
            );
        }
    }

    #[test]
    fn wrong_parameter_type_is_malformed() {
        let params = vec![EventParameter::Value(serde_json::json!(42))];
        let err = MutationEvent::from_parameters(EventKind::ItemSaved, &params).unwrap_err();
        assert!(err.to_string().contains("parameter 0 is not an item"));
    }

    #[test]
    fn copy_without_copy_is_malformed_even_with_source() {
        let params = vec![EventParameter::Item(item())];
        let err = MutationEvent::from_parameters(EventKind::ItemCopied, &params).unwrap_err();
        assert!(matches!(err, EventError::MalformedEvent { .. }));
    }

    #[test]
    fn kind_display_uses_event_names() {
        assert_eq!(EventKind::VersionRemoved.to_string(), "item:versionRemoved");
        assert_eq!(EventKind::ItemSaved.to_string(), "item:saved");
    }
}
