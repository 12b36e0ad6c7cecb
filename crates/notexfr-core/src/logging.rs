//! Structured logging field name constants for notexfr.
//!
//! All crates use these constants for structured `tracing` fields so log
//! output can be filtered by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation aborted |
//! | WARN  | Record dropped or ambiguous (reporting policy only) |
//! | INFO  | Operation completions, files written |
//! | DEBUG | Decision points, input sizes, config choices |
//! | TRACE | Per-item iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "repo", "reconcile", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "bucketed_matcher", "note_linker", "notebook_synthesizer"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "match_tags", "backfill_notes", "convert_enex"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Identifier of the entity being processed.
pub const ENTITY_ID: &str = "entity_id";

/// Entity kind ("Note", "Tag", "Notebook").
pub const ENTITY_KIND: &str = "entity_kind";

/// Input or output file path.
pub const PATH: &str = "path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records read or written.
pub const ITEM_COUNT: &str = "item_count";

/// Number of target records paired with a source record.
pub const MATCHED_COUNT: &str = "matched_count";

/// Number of target records dropped without a match.
pub const UNMATCHED_COUNT: &str = "unmatched_count";

/// Number of matches resolved from a bucket with several candidates.
pub const AMBIGUOUS_COUNT: &str = "ambiguous_count";

/// Link-value dimension index that produced a match.
pub const DIMENSION: &str = "dimension";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
