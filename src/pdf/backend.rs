//! `lopdf` implementation of the PDF access facade.
//!
//! The backend keeps an [`lopdf::IncrementalDocument`]: the parsed original
//! plus a second document holding every object destined for the appended
//! update section. Marking an object for update means copying it into that
//! second document; `lopdf` takes care of the new cross-reference section
//! and the `/Prev`-chained trailer when the update is written.

use crate::error::{Error, Result};
use crate::pdf::{MetadataObject, PdfAccess};
use crate::properties::DocumentProperties;
use lopdf::{Dictionary, Document, IncrementalDocument, Object, ObjectId, Stream, StringFormat};
use std::io::Write;

/// PDF access backed by the `lopdf` library.
pub struct LopdfAccess {
    doc: IncrementalDocument,
}

impl LopdfAccess {
    /// Parse a document from bytes.
    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        let parsed =
            Document::load_mem(bytes).map_err(|err| Error::DocumentLoad(err.to_string()))?;
        Ok(Self {
            doc: IncrementalDocument::create_from(bytes.to_vec(), parsed),
        })
    }

    fn prev(&self) -> &Document {
        self.doc.get_prev_documents()
    }

    /// Current value of an indirect object; the update section shadows the
    /// original document.
    fn object(&self, id: ObjectId) -> Result<&Object> {
        if let Some(object) = self.doc.new_document.objects.get(&id) {
            return Ok(object);
        }
        self.prev()
            .get_object(id)
            .map_err(|err| Error::InvalidStructure(format!("object {} {} R: {}", id.0, id.1, err)))
    }

    fn root_id(&self) -> Result<ObjectId> {
        match self.prev().trailer.get(b"Root") {
            Ok(Object::Reference(id)) => Ok(*id),
            Ok(_) => Err(Error::InvalidStructure(
                "trailer /Root is not a reference".to_string(),
            )),
            Err(err) => Err(Error::InvalidStructure(format!("trailer /Root: {}", err))),
        }
    }

    /// Copy an object into the update section so the next save rewrites it.
    fn mark_for_update(&mut self, id: ObjectId) -> Result<()> {
        if self.doc.new_document.objects.contains_key(&id) {
            return Ok(());
        }
        let object = self
            .prev()
            .get_object(id)
            .map_err(|err| Error::InvalidStructure(format!("object {} {} R: {}", id.0, id.1, err)))?
            .clone();
        let new_doc = &mut self.doc.new_document;
        new_doc.objects.insert(id, object);
        if new_doc.max_id < id.0 {
            new_doc.max_id = id.0;
        }
        Ok(())
    }

    /// Allocate an object number unused by both sections.
    fn allocate_id(&mut self) -> ObjectId {
        let prev_max = self.prev().max_id;
        let new_doc = &mut self.doc.new_document;
        if new_doc.max_id < prev_max {
            new_doc.max_id = prev_max;
        }
        new_doc.new_object_id()
    }

    fn info_ref(&self) -> Option<ObjectId> {
        if let Ok(Object::Reference(id)) = self.doc.new_document.trailer.get(b"Info") {
            return Some(*id);
        }
        match self.prev().trailer.get(b"Info") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    }

    fn text_value(&self, object: &Object) -> Option<String> {
        match object {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            Object::Reference(id) => match self.object(*id).ok()? {
                Object::String(bytes, _) => Some(decode_text_string(bytes)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl PdfAccess for LopdfAccess {
    type ObjId = ObjectId;

    fn catalog_metadata(&self) -> Result<Option<ObjectId>> {
        let root = self.root_id()?;
        let catalog = match self.object(root)? {
            Object::Dictionary(dict) => dict,
            _ => {
                return Err(Error::InvalidStructure(
                    "document catalog is not a dictionary".to_string(),
                ))
            }
        };
        let id = match catalog.get(b"Metadata") {
            Ok(Object::Reference(id)) => *id,
            _ => return Ok(None),
        };
        match self.object(id) {
            Ok(Object::Stream(_)) => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    fn attach_metadata_stream(&mut self) -> Result<ObjectId> {
        let root = self.root_id()?;
        self.mark_for_update(root)?;
        if !matches!(
            self.doc.new_document.objects.get(&root),
            Some(Object::Dictionary(_))
        ) {
            return Err(Error::InvalidStructure(
                "document catalog is not a dictionary".to_string(),
            ));
        }

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Metadata".to_vec()));
        dict.set("Subtype", Object::Name(b"XML".to_vec()));
        let id = self.allocate_id();
        self.doc
            .new_document
            .objects
            .insert(id, Object::Stream(Stream::new(dict, Vec::new())));

        if let Some(Object::Dictionary(catalog)) = self.doc.new_document.objects.get_mut(&root) {
            catalog.set("Metadata", Object::Reference(id));
        }
        Ok(id)
    }

    fn mark_catalog_updated(&mut self) -> Result<()> {
        let root = self.root_id()?;
        self.mark_for_update(root)
    }

    fn metadata_bytes(&self, id: ObjectId) -> Result<Vec<u8>> {
        match self.object(id)? {
            Object::Stream(stream) => {
                if stream.dict.has(b"Filter") {
                    stream
                        .decompressed_content()
                        .map_err(|err| Error::IoRead(err.to_string()))
                } else {
                    Ok(stream.content.clone())
                }
            }
            _ => Err(Error::InvalidStructure(format!(
                "object {} {} R is not a stream",
                id.0, id.1
            ))),
        }
    }

    fn set_metadata_bytes(&mut self, id: ObjectId, bytes: Vec<u8>) -> Result<()> {
        self.mark_for_update(id)?;
        match self.doc.new_document.objects.get_mut(&id) {
            Some(Object::Stream(stream)) => {
                stream.dict.remove(b"Filter");
                stream.dict.remove(b"DecodeParms");
                stream.dict.set("Length", Object::Integer(bytes.len() as i64));
                stream.content = bytes;
                Ok(())
            }
            _ => Err(Error::InvalidStructure(format!(
                "object {} {} R is not a stream",
                id.0, id.1
            ))),
        }
    }

    fn is_filtered(&self, id: ObjectId) -> Result<bool> {
        match self.object(id)? {
            Object::Stream(stream) => Ok(match stream.dict.get(b"Filter") {
                Ok(Object::Name(_)) => true,
                Ok(Object::Array(filters)) => !filters.is_empty(),
                _ => false,
            }),
            _ => Err(Error::InvalidStructure(format!(
                "object {} {} R is not a stream",
                id.0, id.1
            ))),
        }
    }

    fn metadata_objects(&self) -> Result<Vec<MetadataObject<ObjectId>>> {
        let mut ids: Vec<ObjectId> = self.prev().objects.keys().copied().collect();
        for id in self.doc.new_document.objects.keys() {
            if !self.prev().objects.contains_key(id) {
                ids.push(*id);
            }
        }
        ids.sort_unstable();

        let mut found = Vec::new();
        for id in ids {
            let object = match self.object(id) {
                Ok(object) => object,
                Err(_) => continue,
            };
            match object {
                Object::Stream(stream) if is_metadata_type(&stream.dict) => {
                    found.push(MetadataObject::Stream(id));
                }
                Object::Dictionary(dict) if is_metadata_type(dict) => {
                    found.push(MetadataObject::Other(id));
                }
                _ => {}
            }
        }
        Ok(found)
    }

    fn info_properties(&self) -> Option<DocumentProperties> {
        let dict: &Dictionary = if let Some(id) = self.info_ref() {
            match self.object(id) {
                Ok(Object::Dictionary(dict)) => dict,
                _ => return None,
            }
        } else {
            match self.prev().trailer.get(b"Info") {
                Ok(Object::Dictionary(dict)) => dict,
                _ => return None,
            }
        };
        let read = |key: &[u8]| dict.get(key).ok().and_then(|object| self.text_value(object));
        Some(DocumentProperties {
            title: read(b"Title"),
            author: read(b"Author"),
            subject: read(b"Subject"),
            keywords: read(b"Keywords"),
            creator: read(b"Creator"),
            producer: read(b"Producer"),
            creation_date: read(b"CreationDate"),
            mod_date: read(b"ModDate"),
        })
    }

    fn set_info_properties(&mut self, properties: &DocumentProperties) -> Result<()> {
        if let Some(id) = self.info_ref() {
            self.mark_for_update(id)?;
            match self.doc.new_document.objects.get_mut(&id) {
                Some(Object::Dictionary(dict)) => {
                    apply_info_properties(dict, properties);
                    Ok(())
                }
                _ => Err(Error::InvalidStructure(
                    "trailer /Info is not a dictionary".to_string(),
                )),
            }
        } else {
            // A direct trailer dictionary cannot be marked; materialise the
            // Info dictionary as an indirect object in the update section.
            let mut dict = match self.prev().trailer.get(b"Info") {
                Ok(Object::Dictionary(dict)) => dict.clone(),
                _ => Dictionary::new(),
            };
            apply_info_properties(&mut dict, properties);
            let id = self.allocate_id();
            self.doc
                .new_document
                .objects
                .insert(id, Object::Dictionary(dict));
            self.doc
                .new_document
                .trailer
                .set("Info", Object::Reference(id));
            Ok(())
        }
    }

    fn document_ids(&self) -> Option<Vec<Vec<u8>>> {
        match self.prev().trailer.get(b"ID") {
            Ok(Object::Array(items)) => {
                let ids: Vec<Vec<u8>> = items
                    .iter()
                    .filter_map(|item| match item {
                        Object::String(bytes, _) => Some(bytes.clone()),
                        _ => None,
                    })
                    .collect();
                if ids.is_empty() {
                    None
                } else {
                    Some(ids)
                }
            }
            _ => None,
        }
    }

    fn is_linearized(&self) -> bool {
        self.prev()
            .objects
            .values()
            .any(|object| matches!(object, Object::Dictionary(dict) if dict.has(b"Linearized")))
    }

    fn write_update(&mut self, mut output: &mut dyn Write) -> Result<()> {
        let root = self.root_id()?;
        let prev = self.prev();
        let version = prev.version.clone();
        let prev_max = prev.max_id;
        let info = prev.trailer.get(b"Info").ok().cloned();
        let ids = prev.trailer.get(b"ID").ok().cloned();

        let new_doc = &mut self.doc.new_document;
        new_doc.version = version;
        if new_doc.max_id < prev_max {
            new_doc.max_id = prev_max;
        }
        new_doc.trailer.set("Root", Object::Reference(root));
        if let Some(info) = info {
            if !new_doc.trailer.has(b"Info") {
                new_doc.trailer.set("Info", info);
            }
        }
        if let Some(ids) = ids {
            if !new_doc.trailer.has(b"ID") {
                new_doc.trailer.set("ID", ids);
            }
        }

        self.doc
            .save_to(&mut output)
            .map_err(|err| Error::IoWrite(err.to_string()))
    }
}

fn is_metadata_type(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name.as_slice() == b"Metadata")
}

fn apply_info_properties(dict: &mut Dictionary, properties: &DocumentProperties) {
    let entries: [(&str, &Option<String>); 8] = [
        ("Title", &properties.title),
        ("Author", &properties.author),
        ("Subject", &properties.subject),
        ("Keywords", &properties.keywords),
        ("Creator", &properties.creator),
        ("Producer", &properties.producer),
        ("CreationDate", &properties.creation_date),
        ("ModDate", &properties.mod_date),
    ];
    for (key, value) in entries {
        match value {
            Some(value) => dict.set(
                key,
                Object::String(encode_text_string(value), StringFormat::Literal),
            ),
            None => {
                dict.remove(key.as_bytes());
            }
        }
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, else a byte-per-char
/// reading close enough to PDFDocEncoding for the recognised keys.
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Encode a text string: plain bytes for ASCII, BOM-prefixed UTF-16BE
/// otherwise.
fn encode_text_string(text: &str) -> Vec<u8> {
    if text.chars().all(|c| c.is_ascii()) {
        text.bytes().collect()
    } else {
        let mut out = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            out.extend_from_slice(&unit.to_be_bytes());
        }
        out
    }
}
