//! Core traits for matching records across services.
//!
//! Records from two services rarely share identifiers, so matching falls
//! back to attribute values that survive a migration, such as a note's
//! creation time or a tag's name. Every entity exposes those values through
//! [`ChainLink`], ordered from most to least distinguishing.

use chrono::{DateTime, SecondsFormat, Utc};

/// An entity with an identifier local to the service it came from.
pub trait Resource {
    /// Identifier as known by the originating service.
    fn id(&self) -> &str;

    /// Assign the identifier. Only used when a record is first read.
    fn set_id(&mut self, id: String);
}

/// Non-key attribute values used to re-associate the same record across
/// services. The first value is the primary matching key; later values
/// narrow down the candidates when the first is shared.
pub trait ChainLink {
    fn link_values(&self) -> Vec<String>;
}

/// Capability required by every matcher: an id plus link values.
pub trait LinkId: Resource + ChainLink {}

impl<T: Resource + ChainLink> LinkId for T {}

/// Source-side notes that belong to exactly one notebook.
pub trait NotebookMember {
    fn notebook_id(&self) -> &str;
}

/// Target-side notes that can gain additional tag references.
pub trait TagReferences {
    /// Append tag references for `ids`, skipping ids already referenced as
    /// tags. Returns the resulting number of references.
    fn append_tags(&mut self, ids: &[&str]) -> usize;
}

/// Canonical link-value rendering of a timestamp: RFC 3339, whole seconds, UTC.
pub fn fmt_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
