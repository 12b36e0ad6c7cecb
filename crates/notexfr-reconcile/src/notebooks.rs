//! Notebook synthesis.
//!
//! The target service has no notebooks, so each source notebook becomes a
//! target tag. Notebook stacks become placeholder notebooks of their own.
//! A notebook whose name is already taken by a target tag is renamed with a
//! fixed prefix instead of being merged into that tag.

use std::collections::BTreeMap;
use tracing::{debug, trace};

use notexfr_core::{CrossRef, IdSource, Item, ItemData, Notebook};

/// Build one target tag per source notebook and per notebook stack.
///
/// `source_id` on each record is the notebook id; stack placeholders carry
/// an empty one. A renamed notebook whose prefixed name is already taken
/// gets the prefix again until the name is free. Records are ordered by
/// (title, source id), and fresh ids are drawn from `ids` in that order.
pub fn synthesize_notebook_tags(
    notebooks: &[Notebook],
    target_tags: &[Item],
    conflict_prefix: &str,
    ids: &mut dyn IdSource,
) -> Vec<CrossRef<Item>> {
    let mut by_name: BTreeMap<String, Notebook> = BTreeMap::new();
    let mut placeholders = 0usize;

    for notebook in notebooks {
        by_name.insert(notebook.name.clone(), notebook.clone());

        let Some(stack) = notebook.stack.as_deref() else {
            continue;
        };
        if !by_name.contains_key(stack) {
            by_name.insert(stack.to_string(), Notebook::named(stack));
            placeholders += 1;
        }
    }

    let mut renamed = 0usize;
    for tag in target_tags {
        let title = tag.title();
        let Some(mut notebook) = by_name.remove(title) else {
            continue;
        };
        let mut new_name = format!("{conflict_prefix}{title}");
        while by_name.contains_key(&new_name) {
            new_name.insert_str(0, conflict_prefix);
        }
        trace!(from = %title, to = %new_name, "Renaming notebook that collides with a tag");
        notebook.name = new_name.clone();
        by_name.insert(new_name, notebook);
        renamed += 1;
    }

    let mut out: Vec<CrossRef<Item>> = by_name
        .into_values()
        .map(|nb| {
            let data = ItemData::new(String::new(), nb.name, nb.created_at, nb.updated_at);
            CrossRef::new(Item::Tag(data), nb.id)
        })
        .collect();
    out.sort_by(|a, b| {
        (a.item.title(), a.source_id.as_str()).cmp(&(b.item.title(), b.source_id.as_str()))
    });
    for record in &mut out {
        record.item.data_mut().uuid = ids.next_id();
    }

    debug!(
        subsystem = "reconcile",
        component = "notebook_synthesizer",
        notebook_count = notebooks.len(),
        placeholder_count = placeholders,
        renamed_count = renamed,
        item_count = out.len(),
        "Notebook tags synthesized"
    );
    out
}
