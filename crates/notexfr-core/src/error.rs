//! Error types for notexfr.

use thiserror::Error;

use crate::models::Service;

/// Result type alias using notexfr's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notexfr operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// ENEX (XML) decoding failed
    #[error("XML error: {0}")]
    Xml(String),

    /// A timestamp in an export file could not be parsed
    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    /// An entity produced no link values at all
    #[error("links empty; {service} [{index}]")]
    LinksEmpty { service: Service, index: usize },

    /// An entity produced the wrong number of link values
    #[error("expected links length to be {expected}; got {actual}; {service} {id:?}")]
    LinkLength {
        expected: usize,
        actual: usize,
        service: Service,
        id: String,
    },

    /// A converter received an entity kind it cannot handle
    #[error("unexpected entity kind; got {got}, expected {expected}")]
    UnexpectedEntity {
        expected: &'static str,
        got: &'static str,
    },

    /// The rich-text envelope is missing an expected element
    #[error("could not find node: {0}")]
    NodeNotFound(String),

    /// A collection visitor failed; carries the position of the failing item
    #[error("{source}; ind: {index}, key: {key:?}")]
    Collection {
        index: usize,
        key: String,
        #[source]
        source: Box<Error>,
    },

    /// An operation ran past its deadline
    #[error("Deadline exceeded after {elapsed_ms}ms at stage {stage:?}")]
    DeadlineExceeded { stage: String, elapsed_ms: u128 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<chrono::ParseError> for Error {
    fn from(e: chrono::ParseError) -> Self {
        Error::Timestamp(e.to_string())
    }
}
