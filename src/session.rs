//! The repair coordinator.
//!
//! A [`RepairSession`] owns the document for the whole repair pass. It runs
//! the construction policy for the two views, answers whether a commit would
//! write anything, strips filters from every metadata object on request, and
//! finally funnels all mutations through one incremental write.
//!
//! The session moves through `Opened → Inspected → (Fixed | Unchanged |
//! Failed) → Closed`; [`RepairSession::save_incremental`] is the terminal
//! transition and consumes the session, so a committed session cannot be
//! reused.

use crate::error::{Error, Result};
use crate::flavour::PdfaFlavour;
use crate::ident::{self, DocumentId};
use crate::info::InfoView;
use crate::metadata::MetadataView;
use crate::pdf::{MetadataObject, PdfAccess};
use crate::report::{FixReport, FixReportBuilder, RepairStatus};
use crate::xmp::{XmpCodec, XmpPacket};
use log::{debug, warn};
use std::io::Write;

/// A single-use repair pass over one document.
pub struct RepairSession<A: PdfAccess, X: XmpCodec> {
    access: A,
    codec: X,
    metadata: Option<MetadataView<A::ObjId>>,
    info: Option<InfoView>,
    /// Whether the catalog carried a metadata stream when the session opened.
    had_stream: bool,
    /// Raised when a filter-stripping pass cleared at least one stream.
    unfiltered: bool,
}

impl<A: PdfAccess, X: XmpCodec> RepairSession<A, X> {
    /// Open a session over a parsed document.
    ///
    /// Runs the metadata construction policy: an existing catalog metadata
    /// stream is parsed; a missing one is attached empty. Both failure paths
    /// leave the view absent and the session usable.
    pub fn new(mut access: A, codec: X) -> Self {
        let (metadata, had_stream) = match access.catalog_metadata() {
            Ok(Some(stream)) => {
                let view = match access
                    .metadata_bytes(stream)
                    .and_then(|bytes| codec.parse(&bytes))
                {
                    Ok(packet) => Some(MetadataView::existing(stream, packet)),
                    Err(err) => {
                        debug!("Problems with XMP parsing. {}", err);
                        None
                    }
                };
                (view, true)
            }
            Ok(None) => {
                let view = match access.attach_metadata_stream() {
                    Ok(stream) => Some(MetadataView::attached(stream, XmpPacket::new())),
                    Err(err) => {
                        debug!("Problems with attaching metadata stream. {}", err);
                        None
                    }
                };
                (view, false)
            }
            Err(err) => {
                debug!("Problems with document structure. {}", err);
                (None, false)
            }
        };
        let info = access.info_properties().map(InfoView::new);
        Self {
            access,
            codec,
            metadata,
            info,
            had_stream,
            unfiltered: false,
        }
    }

    /// The metadata view, absent when the stream could not be parsed or
    /// attached.
    pub fn metadata(&self) -> Option<&MetadataView<A::ObjId>> {
        self.metadata.as_ref()
    }

    /// Mutable metadata view.
    pub fn metadata_mut(&mut self) -> Option<&mut MetadataView<A::ObjId>> {
        self.metadata.as_mut()
    }

    /// The info view, absent when the trailer has no Info dictionary.
    pub fn info(&self) -> Option<&InfoView> {
        self.info.as_ref()
    }

    /// Mutable info view.
    pub fn info_mut(&mut self) -> Option<&mut InfoView> {
        self.info.as_mut()
    }

    /// True when a commit would write bytes: either view is dirty, or a
    /// filter-stripping pass already mutated the document.
    pub fn needs_update(&self) -> bool {
        let meta_dirty = self.metadata.as_ref().is_some_and(|view| view.is_dirty());
        let info_dirty = self.info.as_ref().is_some_and(|view| view.is_dirty());
        meta_dirty || info_dirty || self.unfiltered
    }

    /// The document identifier the given flavour selects, with the byte
    /// sequence of the trailer `/ID` entries preserved verbatim.
    pub fn document_id(&self, flavour: PdfaFlavour) -> Option<DocumentId> {
        let last = self.access.document_ids().map(|ids| DocumentId::from_parts(&ids));
        ident::effective_id(
            flavour,
            self.access.is_linearized(),
            None,
            last.as_ref(),
        )
        .cloned()
    }

    /// Strip the filter list from every metadata stream object.
    ///
    /// Returns the number of streams cleared, or −1 when enumeration or any
    /// stream read fails. All payloads are decoded before anything is
    /// mutated, so a −1 return leaves the document's filter state unchanged.
    /// Non-stream `/Type /Metadata` objects are logged and skipped.
    pub fn remove_filters_for_all_metadata_objects(&mut self) -> i32 {
        let objects = match self.access.metadata_objects() {
            Ok(objects) => objects,
            Err(err) => {
                debug!("Can not obtain Metadata objects. {}", err);
                return -1;
            }
        };

        let mut pending = Vec::new();
        for object in objects {
            match object {
                MetadataObject::Stream(id) => match self.access.is_filtered(id) {
                    Ok(false) => {}
                    Ok(true) => match self.access.metadata_bytes(id) {
                        Ok(bytes) => pending.push((id, bytes)),
                        Err(err) => {
                            debug!("Problems with unfilter stream. {}", err);
                            return -1;
                        }
                    },
                    Err(err) => {
                        debug!("Problems with unfilter stream. {}", err);
                        return -1;
                    }
                },
                MetadataObject::Other(id) => {
                    debug!("Found non-stream Metadata dictionary {:?}.", id);
                }
            }
        }

        let mut cleared = 0;
        for (id, bytes) in pending {
            if let Err(err) = self.access.set_metadata_bytes(id, bytes) {
                debug!("Problems with unfilter stream. {}", err);
                return -1;
            }
            cleared += 1;
        }

        self.unfiltered = cleared > 0;
        cleared
    }

    /// Commit the session: serialise the metadata packet, flush a dirty info
    /// view, write the incremental update and report.
    ///
    /// Writes happen when the catalog stream exists and something needs
    /// updating, or when the session attached a stream the document lacked.
    /// A commit that wrote bytes promotes `NoAction` to `Success` and
    /// preserves every other prior status; a commit that wrote nothing
    /// preserves the prior status verbatim. No error escapes: failures
    /// surface as a `FixError` report.
    pub fn save_incremental<W: Write>(mut self, prior: RepairStatus, mut output: W) -> FixReport {
        let mut builder = FixReportBuilder::new();
        match self.commit(&mut output) {
            Ok(true) => {
                builder.set_status(prior.promoted());
            }
            Ok(false) => {
                builder.set_status(prior);
            }
            Err(err) => {
                warn!("Problems with document save. {}", err);
                builder
                    .set_status(RepairStatus::FixError)
                    .add_fix(format!("Problems with document save. {}", err));
            }
        }
        builder.build()
    }

    fn commit<W: Write>(&mut self, output: &mut W) -> Result<bool> {
        let update_present = self.had_stream && self.needs_update();
        let attach_pending = !self.had_stream && self.metadata.is_some();
        if !update_present && !attach_pending {
            return Ok(false);
        }

        {
            let view = self.metadata.as_mut().ok_or(Error::AbsentMetadata)?;
            view.update_stream(&mut self.access, &self.codec)?;
        }
        if let Some(info) = self.info.as_ref() {
            if info.is_dirty() {
                self.access.set_info_properties(info.properties())?;
            }
        }
        if attach_pending {
            self.access.mark_catalog_updated()?;
        }
        self.access.write_update(output)?;
        output
            .flush()
            .map_err(|err| Error::IoWrite(err.to_string()))?;
        Ok(true)
    }
}
