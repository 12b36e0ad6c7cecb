//! JSON output.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use notexfr_core::Result;

/// Serialize `value` as compact JSON to `path`, or to stdout when `path` is
/// `None`.
///
/// The document is fully serialized before anything is written. File
/// output goes through a uniquely named temp file in the target directory
/// that is persisted over `path`, so a failed run never leaves a truncated
/// file behind.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: Option<&Path>) -> Result<()> {
    let data = serde_json::to_vec(value)?;

    let Some(path) = path else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&data)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        debug!(subsystem = "repo", component = "writer", size = data.len(), "Wrote JSON to stdout");
        return Ok(());
    };

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(&data)?;
    temp.persist(path).map_err(|e| e.error)?;

    info!(
        subsystem = "repo",
        component = "writer",
        path = %path.display(),
        size = data.len(),
        "Wrote output file"
    );
    Ok(())
}
