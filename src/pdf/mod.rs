//! The PDF access facade.
//!
//! [`PdfAccess`] is the capability set the repair engine needs from a PDF
//! backend. The engine never touches backend types directly: views and the
//! session are generic over this trait, and the bundled [`LopdfAccess`]
//! implements it on top of the `lopdf` library.
//!
//! "Marking an object for update" means ensuring the next incremental save
//! rewrites that object in the appended section. How a backend realises the
//! mark is its own business.

pub mod backend;

pub use backend::LopdfAccess;

use crate::error::Result;
use crate::properties::DocumentProperties;
use std::fmt;
use std::io::Write;

/// One indirect object whose declared `/Type` is `Metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataObject<Id> {
    /// A metadata stream.
    Stream(Id),
    /// A `/Type /Metadata` object that is not a stream. Logged and skipped
    /// by the unfilter operation.
    Other(Id),
}

/// Capability set the repair engine needs from a PDF backend.
///
/// All real work — tokenisation, cross-reference handling, stream filter
/// codecs, incremental serialisation — belongs to the library behind the
/// implementation.
pub trait PdfAccess {
    /// Stable handle to an indirect object.
    type ObjId: Copy + Eq + fmt::Debug;

    /// The catalog's `/Metadata` entry, when present and resolving to a
    /// stream. A dangling or non-stream entry reads as absent.
    fn catalog_metadata(&self) -> Result<Option<Self::ObjId>>;

    /// Create an empty metadata stream, attach it to the catalog under
    /// `/Metadata` (replacing any non-stream entry) and mark the catalog
    /// for update. Nothing is attached when an error is returned.
    fn attach_metadata_stream(&mut self) -> Result<Self::ObjId>;

    /// Mark the catalog for update.
    fn mark_catalog_updated(&mut self) -> Result<()>;

    /// The decoded (unfiltered) bytes of a metadata stream.
    fn metadata_bytes(&self, id: Self::ObjId) -> Result<Vec<u8>>;

    /// Replace a metadata stream's payload with the given unfiltered bytes,
    /// drop its filters and mark it for update.
    fn set_metadata_bytes(&mut self, id: Self::ObjId, bytes: Vec<u8>) -> Result<()>;

    /// Whether the stream currently carries any filter.
    fn is_filtered(&self, id: Self::ObjId) -> Result<bool>;

    /// Every indirect object whose declared `/Type` is `Metadata`.
    fn metadata_objects(&self) -> Result<Vec<MetadataObject<Self::ObjId>>>;

    /// Project the trailer's Info dictionary onto the recognised property
    /// set. Absent when the trailer has no `/Info` or it is not a
    /// dictionary.
    fn info_properties(&self) -> Option<DocumentProperties>;

    /// Rewrite the recognised keys of the Info dictionary and mark it for
    /// update. Keys outside the recognised set are preserved.
    fn set_info_properties(&mut self, properties: &DocumentProperties) -> Result<()>;

    /// The raw byte strings of the trailer's `/ID` array, in order.
    fn document_ids(&self) -> Option<Vec<Vec<u8>>>;

    /// Whether the document carries a linearization dictionary.
    fn is_linearized(&self) -> bool;

    /// Append the incremental update section (changed objects, a new
    /// cross-reference section and a trailer chaining to the previous one)
    /// to `output`.
    fn write_update(&mut self, output: &mut dyn Write) -> Result<()>;
}
