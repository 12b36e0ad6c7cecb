//! # notexfr-reconcile
//!
//! Matching and conversion engine for notexfr.
//!
//! This crate provides:
//! - Bucketed matching on a record's primary link value
//! - Multi-dimension note linking with notebook backfill
//! - Notebook-to-tag synthesis with stack placeholders
//! - Reference-graph conversion from API and XML exports
//! - The [`Reconciler`] running each of these end to end

pub mod config;
pub mod convert;
pub mod linker;
pub mod matcher;
pub mod notebooks;
pub mod policy;
pub mod reconciler;

pub use config::{ConfigError, ReconcileConfig};
pub use convert::{Convert, FlatConverter, StructuredConverter};
pub use linker::backfill_notes;
pub use matcher::{link, link_with};
pub use notebooks::synthesize_notebook_tags;
pub use policy::{FirstWins, MatchPolicy, MatchReport, Reporting};
pub use reconciler::{
    BackfillOptions, ConvertOptions, Deadline, EnexOptions, MatchOptions, Reconciler,
    SourceExport, SourceFiles,
};

/// Re-export core types for convenience.
pub use notexfr_core::{Error, Result};
