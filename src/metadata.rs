//! The metadata view.
//!
//! A [`MetadataView`] binds the parsed (or freshly created) XMP packet to the
//! metadata stream it came from and tracks whether the packet has diverged
//! from the stored bytes. The dirty flag is monotonic for the lifetime of a
//! session: setters raise it, nothing clears it.

use crate::error::Result;
use crate::flavour::PdfaFlavour;
use crate::pdf::PdfAccess;
use crate::xmp::{XmpCodec, XmpPacket};
use std::fmt;

/// Typed, mutable projection of a document's XMP metadata.
#[derive(Debug)]
pub struct MetadataView<Id> {
    stream: Id,
    packet: XmpPacket,
    dirty: bool,
    attached: bool,
}

impl<Id: Copy + Eq + fmt::Debug> MetadataView<Id> {
    /// View over a stream that already existed in the document.
    pub(crate) fn existing(stream: Id, packet: XmpPacket) -> Self {
        Self {
            stream,
            packet,
            dirty: false,
            attached: false,
        }
    }

    /// View over a stream freshly attached to the catalog.
    pub(crate) fn attached(stream: Id, packet: XmpPacket) -> Self {
        Self {
            stream,
            packet,
            dirty: false,
            attached: true,
        }
    }

    /// Handle of the underlying metadata stream.
    pub fn stream(&self) -> Id {
        self.stream
    }

    /// The packet in its current in-memory state.
    pub fn packet(&self) -> &XmpPacket {
        &self.packet
    }

    /// Whether any setter ran since construction.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the underlying stream was attached by this session rather
    /// than found in the document.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Document title.
    pub fn title(&self) -> Option<&str> {
        self.packet.properties().title.as_deref()
    }

    /// Set the document title.
    pub fn set_title(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().title = Some(value.into());
        self.dirty = true;
    }

    /// Document author.
    pub fn author(&self) -> Option<&str> {
        self.packet.properties().author.as_deref()
    }

    /// Set the document author.
    pub fn set_author(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().author = Some(value.into());
        self.dirty = true;
    }

    /// Document subject.
    pub fn subject(&self) -> Option<&str> {
        self.packet.properties().subject.as_deref()
    }

    /// Set the document subject.
    pub fn set_subject(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().subject = Some(value.into());
        self.dirty = true;
    }

    /// Keywords, as one comma-separated string.
    pub fn keywords(&self) -> Option<&str> {
        self.packet.properties().keywords.as_deref()
    }

    /// Set the keywords string.
    pub fn set_keywords(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().keywords = Some(value.into());
        self.dirty = true;
    }

    /// Creating application.
    pub fn creator(&self) -> Option<&str> {
        self.packet.properties().creator.as_deref()
    }

    /// Set the creating application.
    pub fn set_creator(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().creator = Some(value.into());
        self.dirty = true;
    }

    /// Producing application.
    pub fn producer(&self) -> Option<&str> {
        self.packet.properties().producer.as_deref()
    }

    /// Set the producing application.
    pub fn set_producer(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().producer = Some(value.into());
        self.dirty = true;
    }

    /// Creation date (ISO 8601 string).
    pub fn creation_date(&self) -> Option<&str> {
        self.packet.properties().creation_date.as_deref()
    }

    /// Set the creation date (ISO 8601 string).
    pub fn set_creation_date(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().creation_date = Some(value.into());
        self.dirty = true;
    }

    /// Modification date (ISO 8601 string).
    pub fn mod_date(&self) -> Option<&str> {
        self.packet.properties().mod_date.as_deref()
    }

    /// Set the modification date (ISO 8601 string).
    pub fn set_mod_date(&mut self, value: impl Into<String>) {
        self.packet.properties_mut().mod_date = Some(value.into());
        self.dirty = true;
    }

    /// Raw `pdfaid:part` value.
    pub fn pdfa_part(&self) -> Option<&str> {
        self.packet.part()
    }

    /// Set the raw `pdfaid:part` value.
    pub fn set_pdfa_part(&mut self, value: impl Into<String>) {
        self.packet.set_part(value);
        self.dirty = true;
    }

    /// Raw `pdfaid:conformance` value.
    pub fn pdfa_conformance(&self) -> Option<&str> {
        self.packet.conformance()
    }

    /// Set the raw `pdfaid:conformance` value.
    pub fn set_pdfa_conformance(&mut self, value: impl Into<String>) {
        self.packet.set_conformance(value);
        self.dirty = true;
    }

    /// The identification pair as a typed flavour, when recognised.
    pub fn flavour(&self) -> Option<PdfaFlavour> {
        self.packet.flavour()
    }

    /// Set the identification pair from a flavour.
    pub fn set_flavour(&mut self, flavour: PdfaFlavour) {
        self.packet.set_flavour(flavour);
        self.dirty = true;
    }

    /// Serialise the packet and replace the underlying stream's bytes with
    /// the unfiltered serialisation, marking the stream for update.
    ///
    /// A serialisation failure is fatal to the session.
    pub fn update_stream<A>(&mut self, access: &mut A, codec: &impl XmpCodec) -> Result<()>
    where
        A: PdfAccess<ObjId = Id>,
    {
        let bytes = codec.serialize(&self.packet)?;
        access.set_metadata_bytes(self.stream, bytes)
    }
}
