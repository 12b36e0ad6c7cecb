//! Reader for the target service's conversion file.
//!
//! The file is a single object with an `items` array. Each item carries a
//! `content_type`; anything other than a note or a tag fails the whole read.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::SubsecRound;
use tracing::debug;

use notexfr_core::{Item, ItemList, Result};

/// Parse a conversion file into (notes, tags), keeping file order within
/// each list. Item timestamps are truncated to whole seconds.
pub fn from_reader<R: Read>(reader: R) -> Result<(Vec<Item>, Vec<Item>)> {
    let mut list: ItemList = serde_json::from_reader(reader)?;
    for item in &mut list.items {
        let data = item.data_mut();
        data.created_at = data.created_at.trunc_subsecs(0);
        data.updated_at = data.updated_at.trunc_subsecs(0);
    }
    Ok(list.split())
}

pub fn read_conversion_file(path: impl AsRef<Path>) -> Result<(Vec<Item>, Vec<Item>)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let (notes, tags) = from_reader(BufReader::new(file))?;
    debug!(
        subsystem = "repo",
        component = "standardnotes",
        path = %path.display(),
        note_count = notes.len(),
        tag_count = tags.len(),
        "Read conversion file"
    );
    Ok((notes, tags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};
    use notexfr_core::{ContentType, Error};

    const FILE: &str = r#"{"items": [
        {
            "content_type": "Note",
            "uuid": "sn-note-1",
            "created_at": "2020-03-07T20:33:36.123456Z",
            "updated_at": "2020-03-07T20:34:48.9Z",
            "content": {"title": "Fargo", "references": [], "text": "North Dakota"}
        },
        {
            "content_type": "Tag",
            "uuid": "sn-tag-1",
            "created_at": "2020-03-07T20:33:36Z",
            "updated_at": "2020-03-07T20:33:36Z",
            "content": {"title": "Cities", "references": [{"uuid": "sn-note-1", "content_type": "Note"}]}
        }
    ]}"#;

    #[test]
    fn test_split_by_content_type() {
        let (notes, tags) = from_reader(FILE.as_bytes()).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(tags.len(), 1);
        assert_eq!(notes[0].uuid(), "sn-note-1");
        assert_eq!(tags[0].references()[0].content_type, ContentType::Note);
    }

    #[test]
    fn test_times_truncated_to_seconds() {
        let (notes, _) = from_reader(FILE.as_bytes()).unwrap();
        let data = notes[0].data();
        assert_eq!(data.created_at, Utc.with_ymd_and_hms(2020, 3, 7, 20, 33, 36).unwrap());
        assert_eq!(data.updated_at.nanosecond(), 0);
    }

    #[test]
    fn test_unknown_content_type_fails() {
        let json = r#"{"items": [{"content_type": "SN|Theme", "uuid": "x", "content": {}}]}"#;
        let err = from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_empty_items() {
        let (notes, tags) = from_reader(r#"{"items": []}"#.as_bytes()).unwrap();
        assert!(notes.is_empty() && tags.is_empty());
    }
}
