//! Target-service item format.
//!
//! The target service stores every record as an item with a `content_type`
//! discriminator and a `content` payload holding the title, body text,
//! references to other items and namespaced app data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::traits::{fmt_time, ChainLink, Resource, TagReferences};

/// Kinds of item the target service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(alias = "note")]
    Note,
    #[serde(alias = "tag")]
    Tag,
}

/// Edge from one item to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub uuid: String,
    pub content_type: ContentType,
}

impl Reference {
    pub fn note(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            content_type: ContentType::Note,
        }
    }

    pub fn tag(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            content_type: ContentType::Tag,
        }
    }
}

/// Values stored under one app data namespace. Keys this crate does not
/// know about are kept in `extra` so a read-then-write cycle loses nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppData {
    pub fn is_empty(&self) -> bool {
        self.client_updated_at.is_none()
            && self.original_content_type.is_none()
            && self.parent_id.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(rename = "appData", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub app_data: BTreeMap<String, AppData>,
}

impl ItemContent {
    /// Append `reference` unless an identical one is already present.
    /// Returns true when the list grew.
    pub fn push_reference(&mut self, reference: Reference) -> bool {
        if self.references.contains(&reference) {
            return false;
        }
        self.references.push(reference);
        true
    }

    /// Mutable access to a namespace, creating it if needed.
    pub fn app_data_mut(&mut self, namespace: &str) -> &mut AppData {
        self.app_data.entry(namespace.to_string()).or_default()
    }
}

/// Fields shared by every item kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub uuid: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub content: ItemContent,
}

impl ItemData {
    pub fn new(
        uuid: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            created_at,
            updated_at,
            content: ItemContent {
                title: title.into(),
                ..Default::default()
            },
        }
    }
}

/// A target-service record, discriminated by `content_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "content_type")]
pub enum Item {
    #[serde(alias = "note")]
    Note(ItemData),
    #[serde(alias = "tag")]
    Tag(ItemData),
}

impl Item {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Note(_) => ContentType::Note,
            Self::Tag(_) => ContentType::Tag,
        }
    }

    pub fn data(&self) -> &ItemData {
        match self {
            Self::Note(d) | Self::Tag(d) => d,
        }
    }

    pub fn data_mut(&mut self) -> &mut ItemData {
        match self {
            Self::Note(d) | Self::Tag(d) => d,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.data().uuid
    }

    pub fn title(&self) -> &str {
        &self.data().content.title
    }

    pub fn references(&self) -> &[Reference] {
        &self.data().content.references
    }

    pub fn is_note(&self) -> bool {
        matches!(self, Self::Note(_))
    }
}

impl Resource for Item {
    fn id(&self) -> &str {
        self.uuid()
    }

    fn set_id(&mut self, id: String) {
        self.data_mut().uuid = id;
    }
}

impl ChainLink for Item {
    fn link_values(&self) -> Vec<String> {
        match self {
            Self::Note(d) => vec![
                fmt_time(&d.created_at),
                d.content.title.clone(),
                fmt_time(&d.updated_at),
            ],
            Self::Tag(d) => vec![d.content.title.clone()],
        }
    }
}

impl TagReferences for Item {
    fn append_tags(&mut self, ids: &[&str]) -> usize {
        let content = &mut self.data_mut().content;
        for id in ids {
            content.push_reference(Reference::tag(*id));
        }
        content.references.len()
    }
}

/// A target record paired with the identifier of the source record it was
/// matched to. Synthetic placeholders carry an empty `source_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRef<T> {
    pub item: T,
    pub source_id: String,
}

impl<T> CrossRef<T> {
    pub fn new(item: T, source_id: impl Into<String>) -> Self {
        Self {
            item,
            source_id: source_id.into(),
        }
    }
}

impl<T: Resource> Resource for CrossRef<T> {
    fn id(&self) -> &str {
        self.item.id()
    }

    fn set_id(&mut self, id: String) {
        self.item.set_id(id);
    }
}

impl<T: ChainLink> ChainLink for CrossRef<T> {
    fn link_values(&self) -> Vec<String> {
        self.item.link_values()
    }
}

/// Top-level envelope of a target-service import/export file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl ItemList {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Split into (notes, tags), preserving file order within each.
    pub fn split(self) -> (Vec<Item>, Vec<Item>) {
        self.items.into_iter().partition(Item::is_note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note() -> Item {
        Item::Note(ItemData::new(
            "sn-1",
            "Fargo",
            Utc.with_ymd_and_hms(2020, 3, 7, 20, 33, 36).unwrap(),
            Utc.with_ymd_and_hms(2020, 3, 7, 20, 34, 48).unwrap(),
        ))
    }

    #[test]
    fn test_item_tagged_by_content_type() {
        let json = serde_json::to_value(sample_note()).unwrap();
        assert_eq!(json["content_type"], "Note");
        assert_eq!(json["uuid"], "sn-1");
        assert_eq!(json["created_at"], "2020-03-07T20:33:36Z");
        assert!(json["content"].get("text").is_none());
        assert!(json["content"].get("appData").is_none());
        assert_eq!(json["content"]["references"], serde_json::json!([]));
    }

    #[test]
    fn test_lowercase_content_type_accepted() {
        let json = r#"{"content_type": "tag", "uuid": "t", "content": {"title": "Movies"}}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.content_type(), ContentType::Tag);
        assert_eq!(item.title(), "Movies");
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let json = r#"{"content_type": "SN|Component", "uuid": "x", "content": {}}"#;
        assert!(serde_json::from_str::<Item>(json).is_err());
    }

    #[test]
    fn test_item_link_values() {
        assert_eq!(sample_note().link_values().len(), 3);
        let tag = Item::Tag(ItemData::new("t", "foo", Utc::now(), Utc::now()));
        assert_eq!(tag.link_values(), vec!["foo"]);
    }

    #[test]
    fn test_append_tags_is_idempotent() {
        let mut note = sample_note();
        assert_eq!(note.append_tags(&["nb-1"]), 1);
        assert_eq!(note.append_tags(&["nb-1"]), 1);
        assert_eq!(note.references(), &[Reference::tag("nb-1")]);
    }

    #[test]
    fn test_app_data_preserves_unknown_keys() {
        let json = r#"{
            "content_type": "Note",
            "uuid": "n",
            "content": {
                "title": "t",
                "appData": {
                    "org.standardnotes.sn": {
                        "client_updated_at": "2020-03-07T20:34:48Z",
                        "pinned": true
                    }
                }
            }
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        let ns = &item.data().content.app_data["org.standardnotes.sn"];
        assert!(ns.client_updated_at.is_some());
        assert_eq!(ns.extra["pinned"], serde_json::Value::Bool(true));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(
            back["content"]["appData"]["org.standardnotes.sn"]["pinned"],
            serde_json::Value::Bool(true)
        );
    }

    #[test]
    fn test_cross_ref_shape() {
        let xref = CrossRef::new(sample_note(), "en-1");
        let json = serde_json::to_value(&xref).unwrap();
        assert_eq!(json["source_id"], "en-1");
        assert_eq!(json["item"]["uuid"], "sn-1");
        assert_eq!(xref.id(), "sn-1");
    }

    #[test]
    fn test_item_list_split() {
        let tag = Item::Tag(ItemData::new("t", "foo", Utc::now(), Utc::now()));
        let list = ItemList::new(vec![tag.clone(), sample_note()]);
        let (notes, tags) = list.split();
        assert_eq!(notes.len(), 1);
        assert_eq!(tags, vec![tag]);
    }
}
