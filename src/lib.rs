//! # pdfa_metafix
//!
//! Metadata repair for PDF/A conformance workflows: decide whether a
//! document's XMP metadata stream and information dictionary need fixing,
//! apply the fixes, strip filters from every metadata stream so the XMP is
//! readable to non-PDF consumers, and append the result to the original file
//! as a PDF incremental update.
//!
//! The engine is deliberately thin: the PDF object graph is the business of
//! a third-party PDF library behind the [`pdf::PdfAccess`] facade (the
//! bundled backend uses `lopdf`), and the XMP wire format is the business of
//! an [`xmp::XmpCodec`] backend (the bundled codec uses `quick-xml`). What
//! lives here is the repair state machine itself.
//!
//! ## Quick start
//!
//! ```no_run
//! use pdfa_metafix::{LopdfAccess, RdfCodec, RepairSession, RepairStatus};
//!
//! # fn main() -> pdfa_metafix::Result<()> {
//! let bytes = std::fs::read("report.pdf").map_err(|e| {
//!     pdfa_metafix::Error::DocumentLoad(e.to_string())
//! })?;
//! let access = LopdfAccess::load_mem(&bytes)?;
//! let mut session = RepairSession::new(access, RdfCodec::new());
//!
//! if let Some(metadata) = session.metadata_mut() {
//!     metadata.set_title("Quarterly Report");
//! }
//! session.remove_filters_for_all_metadata_objects();
//!
//! let mut output = Vec::new();
//! let report = session.save_incremental(RepairStatus::NoAction, &mut output);
//! println!("repair finished: {}", report);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Boundary types
pub mod flavour;
pub mod properties;
pub mod report;

// Facades and their bundled backends
pub mod pdf;
pub mod xmp;

// Views
pub mod info;
pub mod metadata;

// The repair state machine
pub mod session;

// Utilities
pub mod dates;
pub mod ident;

pub use error::{Error, Result};
pub use flavour::PdfaFlavour;
pub use info::InfoView;
pub use metadata::MetadataView;
pub use pdf::{LopdfAccess, MetadataObject, PdfAccess};
pub use properties::DocumentProperties;
pub use report::{FixReport, FixReportBuilder, RepairStatus};
pub use session::RepairSession;
pub use xmp::{RdfCodec, XmpCodec, XmpPacket};
