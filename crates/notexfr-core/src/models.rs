//! Source-service entity models.
//!
//! These mirror the records produced by the source service's API export
//! (JSON) and its XML export. Field names on the wire follow the exporter,
//! so serde renames are explicit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::traits::{fmt_time, ChainLink, NotebookMember, Resource};

/// Which side of a migration a record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// The source service (API export or XML export).
    Evernote,
    /// The target service (conversion/import file).
    StandardNotes,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evernote => write!(f, "evernote"),
            Self::StandardNotes => write!(f, "standardnotes"),
        }
    }
}

// =============================================================================
// NOTEBOOK
// =============================================================================

/// A container for notes. Notebook names are unique case-insensitively in
/// the source service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Grouping label shared by several notebooks, if any.
    #[serde(
        rename = "Stack",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub stack: Option<String>,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt", default)]
    pub updated_at: DateTime<Utc>,
}

impl Notebook {
    /// Placeholder notebook with only a name: empty id, zero timestamps.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Resource for Notebook {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl ChainLink for Notebook {
    fn link_values(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

// =============================================================================
// NOTE
// =============================================================================

/// Extra note metadata carried by the source service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "ContentClass", default)]
    pub content_class: String,
    #[serde(rename = "SourceApplication", default)]
    pub source_application: String,
    #[serde(rename = "Source", default)]
    pub source: String,
    #[serde(rename = "SourceURL", default)]
    pub source_url: String,
}

/// A single note. API exports identify tags by id; XML exports carry no ids
/// at all and name tags inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "NotebookID", default)]
    pub notebook_id: String,
    #[serde(rename = "TagIDs", default, deserialize_with = "null_as_default")]
    pub tag_ids: Vec<String>,
    #[serde(rename = "Tags", default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Raw rich-text body, wrapped in the content envelope.
    #[serde(rename = "Content", default)]
    pub content: String,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt", default)]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "Attributes", default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl Note {
    /// User-authored markup inside the content envelope.
    pub fn html_content(&self) -> crate::Result<String> {
        crate::content::extract_envelope(&self.content)
    }
}

impl Resource for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl ChainLink for Note {
    fn link_values(&self) -> Vec<String> {
        vec![
            fmt_time(&self.created_at),
            self.title.clone(),
            fmt_time(&self.updated_at),
        ]
    }
}

impl NotebookMember for Note {
    fn notebook_id(&self) -> &str {
        &self.notebook_id
    }
}

// =============================================================================
// TAG
// =============================================================================

/// A label applied to notes. Tags may nest under a parent tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(
        rename = "ParentID",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
}

impl Resource for Tag {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl ChainLink for Tag {
    fn link_values(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

// =============================================================================
// MIXED ENTITY LISTS
// =============================================================================

/// Any record read from the source service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceEntity {
    Note(Note),
    Tag(Tag),
    Notebook(Notebook),
}

impl SourceEntity {
    /// Human-readable kind, used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Note(_) => "Note",
            Self::Tag(_) => "Tag",
            Self::Notebook(_) => "Notebook",
        }
    }
}

impl Resource for SourceEntity {
    fn id(&self) -> &str {
        match self {
            Self::Note(n) => n.id(),
            Self::Tag(t) => t.id(),
            Self::Notebook(nb) => nb.id(),
        }
    }

    fn set_id(&mut self, id: String) {
        match self {
            Self::Note(n) => n.set_id(id),
            Self::Tag(t) => t.set_id(id),
            Self::Notebook(nb) => nb.set_id(id),
        }
    }
}

impl ChainLink for SourceEntity {
    fn link_values(&self) -> Vec<String> {
        match self {
            Self::Note(n) => n.link_values(),
            Self::Tag(t) => t.link_values(),
            Self::Notebook(nb) => nb.link_values(),
        }
    }
}

impl From<Note> for SourceEntity {
    fn from(note: Note) -> Self {
        Self::Note(note)
    }
}

impl From<Tag> for SourceEntity {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

impl From<Notebook> for SourceEntity {
    fn from(notebook: Notebook) -> Self {
        Self::Notebook(notebook)
    }
}

/// The exporter writes `null` for empty lists.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The exporter writes `""` for absent optional strings.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}
