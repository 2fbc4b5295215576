//! RDF/XML codec for XMP packets, built on quick-xml.
//!
//! XMP is serialised as an `xpacket`-framed RDF/XML document (ISO 16684-1).
//! The parser recognises both element form (`<dc:title><rdf:Alt>...`) and the
//! compact attribute form (`<rdf:Description pdfaid:part="1" ...>`); the
//! serialiser always emits element form with conventional namespace prefixes.

use crate::error::{Error, Result};
use crate::properties::DocumentProperties;
use crate::xmp::{XmpCodec, XmpPacket};
use quick_xml::events::Event;
use quick_xml::Reader;

/// The bundled quick-xml implementation of the XMP facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct RdfCodec;

impl RdfCodec {
    /// Create a codec.
    pub fn new() -> Self {
        Self
    }
}

impl XmpCodec for RdfCodec {
    fn parse(&self, bytes: &[u8]) -> Result<XmpPacket> {
        let text = String::from_utf8_lossy(bytes);
        let body = packet_body(&text)
            .ok_or_else(|| Error::XmpParse("no XMP packet found".to_string()))?;
        parse_packet(body)
    }

    fn serialize(&self, packet: &XmpPacket) -> Result<Vec<u8>> {
        Ok(write_packet(packet).into_bytes())
    }
}

/// Slice out the `x:xmpmeta` (or bare `rdf:RDF`) body of an xpacket.
fn packet_body(text: &str) -> Option<&str> {
    let start = text.find("<x:xmpmeta").or_else(|| text.find("<rdf:RDF"))?;
    if let Some(end) = text.rfind("</x:xmpmeta>") {
        return Some(&text[start..end + "</x:xmpmeta>".len()]);
    }
    let end = text.rfind("</rdf:RDF>")?;
    Some(&text[start..end + "</rdf:RDF>".len()])
}

fn parse_packet(body: &str) -> Result<XmpPacket> {
    let mut properties = DocumentProperties::new();
    let mut part = None;
    let mut conformance = None;
    let mut reader = Reader::from_str(body);

    // Tracks open elements so text events can be attributed to the nearest
    // property element, skipping rdf:Alt/Seq/Bag/li containers.
    let mut element_stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                apply_attributes(&e, &mut properties, &mut part, &mut conformance)?;
                element_stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                apply_attributes(&e, &mut properties, &mut part, &mut conformance)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::XmpParse(err.to_string()))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                let property = element_stack
                    .iter()
                    .rev()
                    .find(|el| !el.starts_with("rdf:") && !el.starts_with("x:"))
                    .cloned();
                if let Some(name) = property {
                    apply_property(&name, text, &mut properties, &mut part, &mut conformance);
                }
            }
            Ok(Event::End(_)) => {
                element_stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(Error::XmpParse(err.to_string())),
        }
    }

    Ok(XmpPacket::with_parts(properties, part, conformance))
}

/// Map compact-form attributes (`<rdf:Description dc:format="..." ...>`).
fn apply_attributes(
    element: &quick_xml::events::BytesStart<'_>,
    properties: &mut DocumentProperties,
    part: &mut Option<String>,
    conformance: &mut Option<String>,
) -> Result<()> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|err| Error::XmpParse(err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        if key.starts_with("xmlns") || key.starts_with("rdf:") || key.starts_with("x:") {
            continue;
        }
        let value = attribute
            .unescape_value()
            .map_err(|err| Error::XmpParse(err.to_string()))?
            .to_string();
        apply_property(&key, value, properties, part, conformance);
    }
    Ok(())
}

/// First occurrence wins for every recognised property.
fn apply_property(
    name: &str,
    value: String,
    properties: &mut DocumentProperties,
    part: &mut Option<String>,
    conformance: &mut Option<String>,
) {
    let slot = match name {
        "dc:title" => &mut properties.title,
        "dc:creator" => &mut properties.author,
        "dc:description" => &mut properties.subject,
        "pdf:Keywords" => &mut properties.keywords,
        "xmp:CreatorTool" => &mut properties.creator,
        "pdf:Producer" => &mut properties.producer,
        "xmp:CreateDate" => &mut properties.creation_date,
        "xmp:ModifyDate" => &mut properties.mod_date,
        "pdfaid:part" => part,
        "pdfaid:conformance" => conformance,
        _ => return,
    };
    if slot.is_none() {
        *slot = Some(value);
    }
}

fn write_packet(packet: &XmpPacket) -> String {
    let mut body = String::new();
    let props = packet.properties();

    if let Some(title) = &props.title {
        body.push_str(&format!(
            "      <dc:title>\n        <rdf:Alt>\n          <rdf:li xml:lang=\"x-default\">{}</rdf:li>\n        </rdf:Alt>\n      </dc:title>\n",
            xml_escape(title)
        ));
    }
    if let Some(author) = &props.author {
        body.push_str(&format!(
            "      <dc:creator>\n        <rdf:Seq>\n          <rdf:li>{}</rdf:li>\n        </rdf:Seq>\n      </dc:creator>\n",
            xml_escape(author)
        ));
    }
    if let Some(subject) = &props.subject {
        body.push_str(&format!(
            "      <dc:description>\n        <rdf:Alt>\n          <rdf:li xml:lang=\"x-default\">{}</rdf:li>\n        </rdf:Alt>\n      </dc:description>\n",
            xml_escape(subject)
        ));
    }
    for (element, value) in [
        ("pdf:Keywords", &props.keywords),
        ("xmp:CreatorTool", &props.creator),
        ("pdf:Producer", &props.producer),
        ("xmp:CreateDate", &props.creation_date),
        ("xmp:ModifyDate", &props.mod_date),
    ] {
        if let Some(value) = value {
            body.push_str(&format!(
                "      <{element}>{}</{element}>\n",
                xml_escape(value),
                element = element
            ));
        }
    }
    if let Some(part) = packet.part() {
        body.push_str(&format!(
            "      <pdfaid:part>{}</pdfaid:part>\n",
            xml_escape(part)
        ));
    }
    if let Some(conformance) = packet.conformance() {
        body.push_str(&format!(
            "      <pdfaid:conformance>{}</pdfaid:conformance>\n",
            xml_escape(conformance)
        ));
    }

    format!(
        r#"<?xpacket begin="{}" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmlns:pdf="http://ns.adobe.com/pdf/1.3/"
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/">
{}    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
        '\u{FEFF}', body
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
