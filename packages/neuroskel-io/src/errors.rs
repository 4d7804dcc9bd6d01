//! Error types for neuroskel-io
//!
//! I/O-side taxonomy: XML and archive failures, attribute-level decode
//! errors, and lifted structural errors from the core. "No qualifying
//! archive member" is deliberately not here; it is a non-fatal
//! [`SkipReason`](crate::archive::SkipReason), not an error.

use thiserror::Error;

use neuroskel_core::SkeletonError;

/// Main error type for NML/NMX operations
#[derive(Debug, Error)]
pub enum NmlError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML syntax or encoding error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Document bytes are not valid UTF-8
    #[error("invalid UTF-8 in NML document: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Zip container error
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A reader expecting binary input was handed something else
    #[error("expected a binary source, got {0}")]
    InputType(&'static str),

    /// Required XML attribute absent
    #[error("missing required attribute `{attribute}` on <{element}>")]
    AttributeMissing {
        element: &'static str,
        attribute: &'static str,
    },

    /// XML attribute present but not coercible to the configured type
    #[error("attribute `{attribute}` on <{element}> has invalid value \"{value}\"")]
    AttributeInvalid {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Document is missing a structural section
    #[error("document has no <{0}> element")]
    MissingSection(&'static str),

    /// Structural defect in the decoded graph
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

/// Result type alias for NML/NMX operations
pub type Result<T> = std::result::Result<T, NmlError>;
