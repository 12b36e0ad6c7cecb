//! Reader for the source service's XML export (ENEX).
//!
//! An export is an `en-export` root holding `note` elements. Notes in this
//! format carry no identifiers; tags are named inline.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use notexfr_core::defaults::ENEX_TIME_FORMAT;
use notexfr_core::{Attributes, Error, Note, Result};

#[derive(Debug, Deserialize)]
struct Export {
    #[serde(rename = "note", default)]
    notes: Vec<ExportNote>,
}

#[derive(Debug, Deserialize)]
struct ExportNote {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    created: Option<String>,
    updated: Option<String>,
    #[serde(rename = "tag", default)]
    tags: Vec<String>,
    #[serde(rename = "note-attributes")]
    attributes: Option<ExportAttributes>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportAttributes {
    #[serde(default)]
    source: String,
    #[serde(rename = "source-url", default)]
    source_url: String,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), ENEX_TIME_FORMAT)?;
    Ok(naive.and_utc())
}

impl TryFrom<ExportNote> for Note {
    type Error = Error;

    fn try_from(raw: ExportNote) -> Result<Self> {
        let created_at = match raw.created.as_deref() {
            Some(value) => parse_time(value)?,
            None => DateTime::<Utc>::default(),
        };
        let updated_at = match raw.updated.as_deref() {
            Some(value) => parse_time(value)?,
            None => created_at,
        };
        let attrs = raw.attributes.unwrap_or_default();

        Ok(Note {
            title: raw.title,
            tags: raw.tags,
            content: raw.content,
            created_at,
            updated_at,
            attributes: Some(Attributes {
                source: attrs.source,
                source_url: attrs.source_url,
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}

/// Parse every note in an ENEX document.
pub fn from_reader<R: BufRead>(reader: R) -> Result<Vec<Note>> {
    let export: Export =
        quick_xml::de::from_reader(reader).map_err(|e| Error::Xml(e.to_string()))?;
    export.notes.into_iter().map(Note::try_from).collect()
}

pub fn read_enex(path: impl AsRef<Path>) -> Result<Vec<Note>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let notes = from_reader(BufReader::new(file))?;
    debug!(
        subsystem = "repo",
        component = "enex",
        path = %path.display(),
        item_count = notes.len(),
        "Read ENEX export"
    );
    Ok(notes)
}
