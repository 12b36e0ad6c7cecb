//! Conversion from source entities to target items.
//!
//! Both converters rebuild the reference graph between notes and the
//! tags (or notebooks) that group them. The structured converter works from
//! the API export, where every entity already has an id and notes point at
//! tags by id. The flat converter works from the XML export, which names
//! tags inline and has no ids at all, so every item gets a fresh one.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, trace};

use notexfr_core::defaults::{
    NOTEBOOK_CONTENT_TYPE, SOURCE_APP_DATA_NAMESPACE, TARGET_APP_DATA_NAMESPACE,
};
use notexfr_core::{
    extract_note_text, Error, IdSource, Item, ItemData, Note, Reference, Result, SourceEntity,
};

/// Turns a list of source entities into target items.
pub trait Convert {
    fn convert(&mut self, input: &[SourceEntity]) -> Result<Vec<Item>>;
}

/// Converter for API exports: ids are kept, notebooks become tags.
#[derive(Debug, Clone, Copy)]
pub struct StructuredConverter {
    /// Timestamp given to tags, which carry none of their own.
    pub now: DateTime<Utc>,
}

/// Converter for XML exports: every note and tag gets a fresh id.
pub struct FlatConverter<'a> {
    /// Timestamp given to tags, which carry none of their own.
    pub now: DateTime<Utc>,
    pub ids: &'a mut dyn IdSource,
}

impl StructuredConverter {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl<'a> FlatConverter<'a> {
    pub fn new(now: DateTime<Utc>, ids: &'a mut dyn IdSource) -> Self {
        Self { now, ids }
    }
}

fn note_item(uuid: String, note: &Note, references: Vec<Reference>) -> Result<Item> {
    let mut data = ItemData::new(uuid, note.title.clone(), note.created_at, note.updated_at);
    data.content.text = extract_note_text(&note.content)?;
    data.content.references = references;
    data.content.app_data_mut(TARGET_APP_DATA_NAMESPACE).client_updated_at = Some(note.updated_at);
    Ok(Item::Note(data))
}

fn note_references(note_ids: Option<&Vec<String>>) -> Vec<Reference> {
    let mut out: Vec<Reference> = Vec::new();
    for id in note_ids.into_iter().flatten() {
        let reference = Reference::note(id.as_str());
        if !out.contains(&reference) {
            out.push(reference);
        }
    }
    out
}

impl Convert for StructuredConverter {
    fn convert(&mut self, input: &[SourceEntity]) -> Result<Vec<Item>> {
        let mut notes = Vec::new();
        let mut note_ids_by_tag_id: HashMap<&str, Vec<String>> = HashMap::new();
        let mut note_ids_by_notebook_id: HashMap<&str, Vec<String>> = HashMap::new();

        for entity in input {
            let SourceEntity::Note(note) = entity else {
                continue;
            };
            let mut references = Vec::with_capacity(note.tag_ids.len() + 1);
            for tag_id in &note.tag_ids {
                let reference = Reference::tag(tag_id.as_str());
                if !references.contains(&reference) {
                    references.push(reference);
                }
                note_ids_by_tag_id
                    .entry(tag_id.as_str())
                    .or_default()
                    .push(note.id.clone());
            }
            references.push(Reference::tag(note.notebook_id.as_str()));
            note_ids_by_notebook_id
                .entry(note.notebook_id.as_str())
                .or_default()
                .push(note.id.clone());

            trace!(entity_id = %note.id, reference_count = references.len(), "Converted note");
            notes.push(note_item(note.id.clone(), note, references)?);
        }

        let mut tags = Vec::new();
        let mut notebooks = Vec::new();
        for entity in input {
            match entity {
                SourceEntity::Note(_) => {}
                SourceEntity::Tag(tag) => {
                    let mut data = ItemData::new(tag.id.clone(), tag.name.clone(), self.now, self.now);
                    data.content.references =
                        note_references(note_ids_by_tag_id.get(tag.id.as_str()));
                    if let Some(parent_id) = &tag.parent_id {
                        data.content.app_data_mut(SOURCE_APP_DATA_NAMESPACE).parent_id =
                            Some(parent_id.clone());
                    }
                    tags.push(Item::Tag(data));
                }
                SourceEntity::Notebook(notebook) => {
                    let mut data = ItemData::new(
                        notebook.id.clone(),
                        notebook.name.clone(),
                        notebook.created_at,
                        notebook.updated_at,
                    );
                    data.content.references =
                        note_references(note_ids_by_notebook_id.get(notebook.id.as_str()));
                    data.content
                        .app_data_mut(SOURCE_APP_DATA_NAMESPACE)
                        .original_content_type = Some(NOTEBOOK_CONTENT_TYPE.to_string());
                    notebooks.push(Item::Tag(data));
                }
            }
        }

        debug!(
            subsystem = "reconcile",
            component = "structured_converter",
            note_count = notes.len(),
            tag_count = tags.len(),
            notebook_count = notebooks.len(),
            "Structured conversion complete"
        );

        let mut out = notes;
        out.append(&mut tags);
        out.append(&mut notebooks);
        Ok(out)
    }
}

impl Convert for FlatConverter<'_> {
    fn convert(&mut self, input: &[SourceEntity]) -> Result<Vec<Item>> {
        let mut out = Vec::with_capacity(input.len());
        let mut tag_index_by_name: HashMap<&str, usize> = HashMap::new();
        let mut tags: Vec<Item> = Vec::new();

        for entity in input {
            let SourceEntity::Note(note) = entity else {
                return Err(Error::UnexpectedEntity {
                    expected: "Note",
                    got: entity.kind(),
                });
            };

            let note_id = self.ids.next_id();
            let mut references = Vec::with_capacity(note.tags.len());
            for name in &note.tags {
                let index = match tag_index_by_name.get(name.as_str()) {
                    Some(&index) => index,
                    None => {
                        let tag_id = self.ids.next_id();
                        tags.push(Item::Tag(ItemData::new(tag_id, name.clone(), self.now, self.now)));
                        tag_index_by_name.insert(name.as_str(), tags.len() - 1);
                        tags.len() - 1
                    }
                };
                let tag = tags[index].data_mut();
                tag.content.push_reference(Reference::note(note_id.as_str()));
                let reference = Reference::tag(tag.uuid.as_str());
                if !references.contains(&reference) {
                    references.push(reference);
                }
            }

            trace!(entity_id = %note_id, reference_count = references.len(), "Converted note");
            out.push(note_item(note_id, note, references)?);
        }

        debug!(
            subsystem = "reconcile",
            component = "flat_converter",
            note_count = out.len(),
            tag_count = tags.len(),
            "Flat conversion complete"
        );

        out.append(&mut tags);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use notexfr_core::{ContentType, Notebook, SequentialIds, Tag};

    const BODY: &str = "<en-note><div>hello<br/></div></en-note>";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn edam_note(id: &str, notebook: &str, tag_ids: &[&str]) -> SourceEntity {
        SourceEntity::Note(Note {
            id: id.to_string(),
            title: format!("title {id}"),
            notebook_id: notebook.to_string(),
            tag_ids: tag_ids.iter().map(|s| s.to_string()).collect(),
            content: BODY.to_string(),
            created_at: Utc.with_ymd_and_hms(2020, 3, 7, 20, 33, 36).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2020, 3, 7, 20, 34, 48).unwrap(),
            ..Default::default()
        })
    }

    fn enex_note(title: &str, tags: &[&str]) -> SourceEntity {
        SourceEntity::Note(Note {
            title: title.to_string(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            content: BODY.to_string(),
            ..Default::default()
        })
    }

    fn edam_tag(id: &str, parent: Option<&str>) -> SourceEntity {
        SourceEntity::Tag(Tag {
            id: id.to_string(),
            name: format!("name {id}"),
            parent_id: parent.map(str::to_string),
        })
    }

    fn edam_notebook(id: &str) -> SourceEntity {
        SourceEntity::Notebook(Notebook {
            id: id.to_string(),
            name: format!("name {id}"),
            ..Default::default()
        })
    }

    #[test]
    fn test_structured_note_references_notebook_last() {
        let input = vec![
            edam_note("n1", "nb1", &["t1", "t2"]),
            edam_tag("t1", None),
            edam_tag("t2", Some("t1")),
            edam_notebook("nb1"),
        ];
        let out = StructuredConverter::new(now()).convert(&input).unwrap();
        assert_eq!(out.len(), 4);

        let note = &out[0];
        assert_eq!(note.uuid(), "n1");
        assert_eq!(
            note.references(),
            &[Reference::tag("t1"), Reference::tag("t2"), Reference::tag("nb1")]
        );
        assert_eq!(note.data().content.text, "<div>hello\n\n</div>");
        assert_eq!(
            note.data().content.app_data[TARGET_APP_DATA_NAMESPACE].client_updated_at,
            Some(note.data().updated_at)
        );

        for referenced in &out[1..] {
            assert_eq!(referenced.content_type(), ContentType::Tag);
            assert_eq!(referenced.references(), &[Reference::note("n1")]);
        }
    }

    #[test]
    fn test_structured_output_grouping_and_app_data() {
        let input = vec![
            edam_notebook("nb1"),
            edam_tag("t1", None),
            edam_note("n1", "nb1", &[]),
            edam_tag("t2", Some("t1")),
            edam_note("n2", "nb1", &["t2"]),
        ];
        let out = StructuredConverter::new(now()).convert(&input).unwrap();
        let uuids: Vec<&str> = out.iter().map(|i| i.uuid()).collect();
        assert_eq!(uuids, vec!["n1", "n2", "t1", "t2", "nb1"]);

        let t1 = &out[2];
        assert!(t1.references().is_empty());
        assert_eq!(t1.data().created_at, now());
        assert!(t1.data().content.app_data.is_empty());

        let t2 = &out[3];
        assert_eq!(
            t2.data().content.app_data[SOURCE_APP_DATA_NAMESPACE].parent_id.as_deref(),
            Some("t1")
        );

        let nb = &out[4];
        assert_eq!(nb.references(), &[Reference::note("n1"), Reference::note("n2")]);
        assert_eq!(
            nb.data().content.app_data[SOURCE_APP_DATA_NAMESPACE]
                .original_content_type
                .as_deref(),
            Some("Notebook")
        );
    }

    #[test]
    fn test_structured_bad_body_fails() {
        let mut input = vec![edam_note("n1", "nb1", &[])];
        if let SourceEntity::Note(note) = &mut input[0] {
            note.content = "<div>no envelope</div>".to_string();
        }
        let err = StructuredConverter::new(now()).convert(&input).unwrap_err();
        assert_eq!(err.to_string(), "could not find node: html.body.en-note");
    }

    #[test]
    fn test_flat_shared_tag_collects_both_notes() {
        let input = vec![
            enex_note("first", &["cities", "midwest"]),
            enex_note("second", &["cities"]),
        ];
        let mut ids = SequentialIds::new("id-");
        let out = FlatConverter::new(now(), &mut ids).convert(&input).unwrap();

        let uuids: Vec<&str> = out.iter().map(|i| i.uuid()).collect();
        assert_eq!(uuids, vec!["id-0", "id-3", "id-1", "id-2"]);

        let titles: Vec<&str> = out[2..].iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["cities", "midwest"]);

        assert_eq!(out[0].references(), &[Reference::tag("id-1"), Reference::tag("id-2")]);
        assert_eq!(out[1].references(), &[Reference::tag("id-1")]);
        assert_eq!(
            out[2].references(),
            &[Reference::note("id-0"), Reference::note("id-3")]
        );
        assert_eq!(out[3].data().updated_at, now());
    }

    #[test]
    fn test_flat_tags_in_first_seen_order() {
        let input = vec![
            enex_note("first", &["zebra"]),
            enex_note("second", &["apple", "zebra"]),
        ];
        let mut ids = SequentialIds::new("id-");
        let out = FlatConverter::new(now(), &mut ids).convert(&input).unwrap();

        let tags: Vec<(&str, &str)> = out[2..].iter().map(|i| (i.uuid(), i.title())).collect();
        assert_eq!(tags, vec![("id-1", "zebra"), ("id-3", "apple")]);
        assert_eq!(
            out[1].references(),
            &[Reference::tag("id-3"), Reference::tag("id-1")]
        );
        assert_eq!(
            out[2].references(),
            &[Reference::note("id-0"), Reference::note("id-2")]
        );
    }

    #[test]
    fn test_flat_rejects_non_notes() {
        let input = vec![enex_note("first", &[]), edam_notebook("nb1")];
        let mut ids = SequentialIds::new("id-");
        let err = FlatConverter::new(now(), &mut ids).convert(&input).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEntity {
                expected: "Note",
                got: "Notebook"
            }
        ));
    }

    #[test]
    fn test_flat_repeated_tag_on_one_note() {
        let input = vec![enex_note("first", &["a", "a"])];
        let mut ids = SequentialIds::new("id-");
        let out = FlatConverter::new(now(), &mut ids).convert(&input).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].references().len(), 1);
        assert_eq!(out[1].references().len(), 1);
    }
}
