//! XMP packets and the XMP facade.
//!
//! [`XmpPacket`] is the in-memory representation of a document's XMP
//! metadata: the recognised property set plus the PDF/A identification pair.
//! Reading and writing the RDF/XML wire form is the job of an [`XmpCodec`]
//! backend; [`RdfCodec`] is the bundled quick-xml implementation.

pub mod rdf;

pub use rdf::RdfCodec;

use crate::error::Result;
use crate::flavour::PdfaFlavour;
use crate::properties::DocumentProperties;

/// Capability set the repair engine needs from an XMP backend.
///
/// Implementations turn bytes into packets and packets back into bytes.
/// Packet creation and property access are owned by [`XmpPacket`] itself.
pub trait XmpCodec {
    /// Parse an XMP packet from the decoded bytes of a metadata stream.
    fn parse(&self, bytes: &[u8]) -> Result<XmpPacket>;

    /// Serialise a packet to the bytes of an unfiltered metadata stream.
    fn serialize(&self, packet: &XmpPacket) -> Result<Vec<u8>>;
}

/// An in-memory XMP packet.
///
/// Holds the recognised properties and the raw `pdfaid` identification pair.
/// The pair is kept as the strings found in the document so that values
/// outside the known flavour set survive a rewrite untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmpPacket {
    properties: DocumentProperties,
    part: Option<String>,
    conformance: Option<String>,
}

impl XmpPacket {
    /// Create an empty packet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a packet from already-parsed pieces.
    pub fn with_parts(
        properties: DocumentProperties,
        part: Option<String>,
        conformance: Option<String>,
    ) -> Self {
        Self {
            properties,
            part,
            conformance,
        }
    }

    /// The recognised property record.
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    /// Mutable access to the recognised property record.
    pub fn properties_mut(&mut self) -> &mut DocumentProperties {
        &mut self.properties
    }

    /// The raw `pdfaid:part` value.
    pub fn part(&self) -> Option<&str> {
        self.part.as_deref()
    }

    /// Set the raw `pdfaid:part` value.
    pub fn set_part(&mut self, part: impl Into<String>) {
        self.part = Some(part.into());
    }

    /// The raw `pdfaid:conformance` value.
    pub fn conformance(&self) -> Option<&str> {
        self.conformance.as_deref()
    }

    /// Set the raw `pdfaid:conformance` value.
    pub fn set_conformance(&mut self, conformance: impl Into<String>) {
        self.conformance = Some(conformance.into());
    }

    /// The identification pair as a typed flavour, when both halves are
    /// present and name a known combination.
    pub fn flavour(&self) -> Option<PdfaFlavour> {
        PdfaFlavour::from_xmp(self.part.as_deref()?, self.conformance.as_deref()?)
    }

    /// Set both halves of the identification pair from a flavour.
    pub fn set_flavour(&mut self, flavour: PdfaFlavour) {
        self.part = Some(flavour.xmp_part().to_string());
        self.conformance = Some(flavour.xmp_conformance().to_string());
    }

    /// True when the packet carries no property and no identification.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.part.is_none() && self.conformance.is_none()
    }
}
