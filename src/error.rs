//! Error types for the metadata repair engine.
//!
//! Repair-internal failures stay in this enum; translation to the external
//! [`RepairStatus`](crate::report::RepairStatus) happens only when a session
//! commits.

/// Result type alias for repair operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while repairing document metadata.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The PDF backend could not parse the input bytes.
    #[error("Failed to load PDF document: {0}")]
    DocumentLoad(String),

    /// Reading a metadata stream failed.
    #[error("Failed to read metadata stream: {0}")]
    IoRead(String),

    /// Writing the incremental update failed.
    #[error("Failed to write incremental update: {0}")]
    IoWrite(String),

    /// The metadata stream payload is not a usable XMP packet.
    #[error("Invalid XMP packet: {0}")]
    XmpParse(String),

    /// The XMP packet could not be serialised back to bytes.
    #[error("Failed to serialise XMP packet: {0}")]
    XmpSerialize(String),

    /// Enumerating the document's metadata objects failed.
    #[error("Failed to enumerate metadata objects: {0}")]
    Enumeration(String),

    /// A commit needed the metadata view, but none was constructed.
    #[error("Metadata view is absent")]
    AbsentMetadata,

    /// The document lacks structure the operation relies on.
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// A date string is neither a PDF date nor an XMP date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
