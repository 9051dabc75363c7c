//! Error types for XMP operations
//!
//! This module defines all error types used throughout the codec.

use thiserror::Error;

/// Error types for XMP operations
#[derive(Debug, Error)]
pub enum XmpError {
    /// Bad parameter provided to a function (e.g., an invalid property name)
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// Bad value provided (e.g., a string that is not a URI reference)
    #[error("Bad value: {0}")]
    BadValue(String),

    /// Parse error (XML tokenizing failed or the RDF structure is malformed)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Two `rdf:Description` elements name different subjects
    #[error("Inconsistent rdf:about attributes: {0} != {1}")]
    InconsistentAbout(String, String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for XMP operations
pub type XmpResult<T> = Result<T, XmpError>;
