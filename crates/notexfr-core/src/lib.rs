//! # notexfr-core
//!
//! Core types and traits for notexfr.
//!
//! This crate provides the entity models read from the source service, the
//! item format written for the target service, and the link-value traits
//! the reconciliation engine matches on.

pub mod content;
pub mod defaults;
pub mod error;
pub mod ids;
pub mod items;
pub mod keyed;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use content::{clean_text, extract_envelope, extract_note_text};
pub use error::{Error, Result};
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use items::*;
pub use keyed::KeyedItems;
pub use models::*;
pub use traits::*;
