//! # notexfr-repo
//!
//! Local file access for notexfr.
//!
//! This crate provides:
//! - Readers for the source service's API export (one JSON array per kind)
//! - A reader for the source service's XML export (ENEX)
//! - A reader for the target service's conversion file (`{"items": [...]}`)
//! - A JSON writer targeting a file or stdout

pub mod edam;
pub mod enex;
pub mod standardnotes;
pub mod writer;

pub use edam::{read_notebooks, read_notes, read_tags};
pub use enex::read_enex;
pub use standardnotes::read_conversion_file;
pub use writer::write_json;

/// Re-export core types for convenience.
pub use notexfr_core::{Error, Result};
