//! Reader for the source service's API export.
//!
//! Each entity kind is stored as a single JSON array in its own file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use notexfr_core::logging::ENTITY_KIND;

use notexfr_core::{Note, Notebook, Result, Tag};

/// Parse a JSON array of entities from `reader`.
pub fn from_reader<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    Ok(serde_json::from_reader(reader)?)
}

fn read_list<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let out: Vec<T> = from_reader(BufReader::new(file))?;
    debug!(
        subsystem = "repo",
        component = "edam",
        { ENTITY_KIND } = kind,
        path = %path.display(),
        item_count = out.len(),
        "Read export file"
    );
    Ok(out)
}

pub fn read_notebooks(path: impl AsRef<Path>) -> Result<Vec<Notebook>> {
    read_list(path.as_ref(), "Notebook")
}

pub fn read_notes(path: impl AsRef<Path>) -> Result<Vec<Note>> {
    read_list(path.as_ref(), "Note")
}

pub fn read_tags(path: impl AsRef<Path>) -> Result<Vec<Tag>> {
    read_list(path.as_ref(), "Tag")
}
