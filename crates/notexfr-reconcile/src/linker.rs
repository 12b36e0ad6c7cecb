//! Multi-dimension note linking.
//!
//! Notes on both sides expose three link values: created-at, title and
//! updated-at. A target note is paired with the source note that is the
//! only one sharing a value in the first dimension where such a unique pair
//! exists. The matched source note's notebook is then recorded on the
//! target note as a tag reference.

use std::collections::HashMap;
use tracing::{debug, trace};

use notexfr_core::defaults::NOTE_LINK_DIMENSIONS;
use notexfr_core::logging::{DIMENSION, ENTITY_ID};
use notexfr_core::{
    CrossRef, Error, KeyedItems, LinkId, NotebookMember, Result, Service, TagReferences,
};

struct Indexed<'a, S> {
    note: &'a S,
    values: Vec<String>,
}

/// Link target notes to source notes and backfill notebook references.
///
/// Target notes without a unique partner in any dimension are dropped.
/// A note on either side whose link-value count is not
/// [`NOTE_LINK_DIMENSIONS`] fails the call.
pub fn backfill_notes<S, T>(sources: &KeyedItems<S>, targets: Vec<T>) -> Result<Vec<CrossRef<T>>>
where
    S: LinkId + NotebookMember,
    T: LinkId + TagReferences,
{
    let mut indexed: Vec<Indexed<'_, S>> = Vec::with_capacity(sources.len());
    sources.each(|_, note| {
        let values = checked_values(note, Service::Evernote)?;
        indexed.push(Indexed { note, values });
        Ok(())
    })?;

    let mut dimensions: Vec<HashMap<&str, Vec<usize>>> =
        vec![HashMap::new(); NOTE_LINK_DIMENSIONS];
    for (pos, entry) in indexed.iter().enumerate() {
        for (dim, value) in entry.values.iter().enumerate() {
            dimensions[dim].entry(value.as_str()).or_default().push(pos);
        }
    }

    let total = targets.len();
    let mut out = Vec::new();
    let mut by_dimension = [0usize; NOTE_LINK_DIMENSIONS];

    for (index, mut target) in targets.into_iter().enumerate() {
        let values = checked_values(&target, Service::StandardNotes).map_err(|source| {
            Error::Collection {
                index,
                key: target.id().to_string(),
                source: Box::new(source),
            }
        })?;

        let found = values.iter().enumerate().find_map(|(dim, value)| {
            let bucket = dimensions[dim].get(value.as_str())?;
            match bucket.as_slice() {
                [only] if indexed[*only].values[dim] == *value => Some((dim, &indexed[*only])),
                _ => None,
            }
        });
        let Some((dim, matched)) = found else {
            trace!({ ENTITY_ID } = %target.id(), "No unique partner for note");
            continue;
        };

        target.append_tags(&[matched.note.notebook_id()]);
        by_dimension[dim] += 1;
        trace!(
            { ENTITY_ID } = %target.id(),
            source_id = %matched.note.id(),
            { DIMENSION } = dim,
            "Linked note"
        );
        out.push(CrossRef::new(target, matched.note.id()));
    }

    debug!(
        subsystem = "reconcile",
        component = "note_linker",
        source_count = indexed.len(),
        target_count = total,
        matched_count = out.len(),
        unmatched_count = total - out.len(),
        by_created = by_dimension[0],
        by_title = by_dimension[1],
        by_updated = by_dimension[2],
        "Note backfill complete"
    );
    Ok(out)
}

fn checked_values<L: LinkId>(note: &L, service: Service) -> Result<Vec<String>> {
    let values = note.link_values();
    if values.len() != NOTE_LINK_DIMENSIONS {
        return Err(Error::LinkLength {
            expected: NOTE_LINK_DIMENSIONS,
            actual: values.len(),
            service,
            id: note.id().to_string(),
        });
    }
    Ok(values)
}
