//! Centralized default constants for notexfr.
//!
//! All crates reference these constants instead of defining their own magic
//! values. Organized by domain area.

// =============================================================================
// LINK VALUES
// =============================================================================

/// Number of link values a note exposes: created-at, title, updated-at.
pub const NOTE_LINK_DIMENSIONS: usize = 3;

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Prefix applied to a synthesized notebook tag whose name collides with an
/// existing target tag.
pub const CONFLICT_PREFIX: &str = "conflict - ";

/// Deadline for tag/note/notebook matching operations.
pub const MATCH_TIMEOUT_SECS: u64 = 5;

/// Deadline for the full note backfill.
pub const BACKFILL_TIMEOUT_SECS: u64 = 10;

/// Deadline for format conversions and ENEX dumps.
pub const CONVERT_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// TARGET FORMAT
// =============================================================================

/// App data namespace owned by the target service.
pub const TARGET_APP_DATA_NAMESPACE: &str = "org.standardnotes.sn";

/// App data namespace for values carried over from the source service.
pub const SOURCE_APP_DATA_NAMESPACE: &str = "evernote.com";

/// `original_content_type` recorded on tags synthesized from notebooks.
pub const NOTEBOOK_CONTENT_TYPE: &str = "Notebook";

// =============================================================================
// EXPORT FORMATS
// =============================================================================

/// Timestamp layout used by ENEX `created`/`updated` elements.
pub const ENEX_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Element wrapping user-authored content inside a note body.
pub const CONTENT_ROOT: &str = "en-note";
