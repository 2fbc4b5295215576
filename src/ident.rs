//! Document identifiers.
//!
//! A PDF trailer may carry an `/ID` array of two byte strings. Identifiers
//! are compared and stored as raw bytes; the values are frequently binary
//! (MD5 digests), so `Display` renders uppercase hex rather than pretending
//! they are text.

use crate::flavour::PdfaFlavour;
use std::fmt;

/// A document identifier: the trailer `/ID` entries concatenated, byte
/// sequence preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(Vec<u8>);

impl DocumentId {
    /// Concatenate the `/ID` array entries into one identifier.
    pub fn from_parts(parts: &[Vec<u8>]) -> Self {
        let mut bytes = Vec::new();
        for part in parts {
            bytes.extend_from_slice(part);
        }
        Self(bytes)
    }

    /// The identifier bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Select the identifier a conformance check should compare against.
///
/// ISO 19005-1 always uses the last trailer's ID. Any other flavour uses the
/// first-page trailer's ID when the document is linearised and falls through
/// to the last trailer's ID when it is not.
pub fn effective_id<'a>(
    flavour: PdfaFlavour,
    linearized: bool,
    first_page: Option<&'a DocumentId>,
    last: Option<&'a DocumentId>,
) -> Option<&'a DocumentId> {
    if flavour.is_part_one() {
        last
    } else if linearized {
        first_page
    } else {
        last
    }
}
