//! End-to-end repair scenarios over real, in-memory PDF documents.
//!
//! Each test builds a small PDF with `lopdf`, runs a repair session against
//! its bytes, and re-parses whatever the session wrote.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use pdfa_metafix::{
    LopdfAccess, PdfaFlavour, RdfCodec, RepairSession, RepairStatus, Result, XmpCodec, XmpPacket,
};
use std::io::Write;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Minimal one-page document. Returns the document and its catalog id.
fn base_document() -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Page".to_vec()),
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => Object::Array(vec![Object::Reference(page_id)]),
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Catalog".to_vec()),
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    (doc, catalog_id)
}

/// Add a `/Type /Metadata` stream, optionally Flate-compressed, and return
/// its id. `attach` wires it into the catalog.
fn add_metadata_stream(
    doc: &mut Document,
    catalog_id: ObjectId,
    payload: &[u8],
    compress: bool,
    attach: bool,
) -> ObjectId {
    let (content, dict) = if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        (
            encoder.finish().unwrap(),
            dictionary! {
                "Type" => Object::Name(b"Metadata".to_vec()),
                "Subtype" => Object::Name(b"XML".to_vec()),
                "Filter" => Object::Name(b"FlateDecode".to_vec()),
            },
        )
    } else {
        (
            payload.to_vec(),
            dictionary! {
                "Type" => Object::Name(b"Metadata".to_vec()),
                "Subtype" => Object::Name(b"XML".to_vec()),
            },
        )
    };
    let id = doc.add_object(Object::Stream(Stream::new(dict, content)));
    if attach {
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.set("Metadata", Object::Reference(id));
        }
    }
    id
}

fn add_info(doc: &mut Document, title: &str, producer: &str) {
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
        "Producer" => Object::String(producer.as_bytes().to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Info", Object::Reference(info_id));
}

fn to_bytes(doc: &mut Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn open_session(bytes: &[u8]) -> RepairSession<LopdfAccess, RdfCodec> {
    let access = LopdfAccess::load_mem(bytes).expect("failed to load fixture");
    RepairSession::new(access, RdfCodec::new())
}

/// XMP bytes in the exact form the bundled codec writes, so unfiltering
/// leaves content byte-identical to the original decoded payload.
fn canonical_xmp(title: &str) -> Vec<u8> {
    let mut packet = XmpPacket::new();
    packet.properties_mut().title = Some(title.to_string());
    packet.set_flavour(PdfaFlavour::Part1B);
    RdfCodec::new().serialize(&packet).unwrap()
}

/// Every `/Type /Metadata` stream in the parsed document, with its filter
/// presence.
fn metadata_filter_states(bytes: &[u8]) -> Vec<bool> {
    let doc = Document::load_mem(bytes).unwrap();
    let mut states = Vec::new();
    for object in doc.objects.values() {
        if let Object::Stream(stream) = object {
            if matches!(stream.dict.get(b"Type"), Ok(Object::Name(name)) if name.as_slice() == b"Metadata")
            {
                states.push(stream.dict.has(b"Filter"));
            }
        }
    }
    states
}

// Scenario A: no catalog Metadata entry, no Info, prior NoAction.
#[test]
fn test_missing_metadata_is_attached_and_written() {
    init_logs();
    let (mut doc, _) = base_document();
    let original = to_bytes(&mut doc);

    let session = open_session(&original);
    assert!(session.metadata().unwrap().is_attached());
    assert!(session.info().is_none());

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::NoAction, &mut out);
    assert_eq!(report.status(), RepairStatus::Success);
    assert!(!out.is_empty());
    assert!(out.starts_with(&original));

    let reparsed = open_session(&out);
    let view = reparsed.metadata().expect("metadata reachable after repair");
    assert!(!view.is_attached());
    assert!(view.packet().is_empty());
}

// Scenario B: Flate-compressed metadata stream, no edits, prior NoAction.
#[test]
fn test_unfilter_then_commit_round_trips_content() {
    init_logs();
    let payload = canonical_xmp("Filtered");
    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, &payload, true, true);
    let original = to_bytes(&mut doc);

    let mut session = open_session(&original);
    assert_eq!(session.remove_filters_for_all_metadata_objects(), 1);

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::NoAction, &mut out);
    assert_eq!(report.status(), RepairStatus::Success);
    assert!(!out.is_empty());

    assert_eq!(metadata_filter_states(&out), vec![false]);
    let doc = Document::load_mem(&out).unwrap();
    let stream = doc
        .objects
        .values()
        .find_map(|object| match object {
            Object::Stream(stream)
                if matches!(stream.dict.get(b"Type"), Ok(Object::Name(name)) if name.as_slice() == b"Metadata") =>
            {
                Some(stream)
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(stream.content, payload);
}

// Scenario C: valid XMP and Info, caller sets title, prior FixError.
#[test]
fn test_prior_fix_error_is_not_promoted() {
    init_logs();
    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, &canonical_xmp("Before"), false, true);
    add_info(&mut doc, "Before", "producer");
    let original = to_bytes(&mut doc);

    let mut session = open_session(&original);
    session.metadata_mut().unwrap().set_title("X");

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::FixError, &mut out);
    assert_eq!(report.status(), RepairStatus::FixError);
    assert!(!out.is_empty());

    let reparsed = open_session(&out);
    assert_eq!(reparsed.metadata().unwrap().title(), Some("X"));
}

// Scenario D: metadata stream bytes are not valid XMP, prior NoAction.
#[test]
fn test_invalid_xmp_leaves_view_absent_and_writes_nothing() {
    init_logs();
    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, b"definitely not xmp", false, true);
    let original = to_bytes(&mut doc);

    let session = open_session(&original);
    assert!(session.metadata().is_none());

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::NoAction, &mut out);
    assert_eq!(report.status(), RepairStatus::NoAction);
    assert!(report.fixes().is_empty());
    assert!(out.is_empty());
}

// Scenario E: XMP serialisation fails during commit.
#[test]
fn test_serializer_failure_reports_fix_error() {
    init_logs();

    struct BrokenCodec;
    impl XmpCodec for BrokenCodec {
        fn parse(&self, bytes: &[u8]) -> Result<XmpPacket> {
            RdfCodec::new().parse(bytes)
        }
        fn serialize(&self, _packet: &XmpPacket) -> Result<Vec<u8>> {
            Err(pdfa_metafix::Error::XmpSerialize(
                "stream closed".to_string(),
            ))
        }
    }

    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, &canonical_xmp("Valid"), false, true);
    let original = to_bytes(&mut doc);

    let access = LopdfAccess::load_mem(&original).unwrap();
    let mut session = RepairSession::new(access, BrokenCodec);
    session.metadata_mut().unwrap().set_title("X");

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::NoAction, &mut out);
    assert_eq!(report.status(), RepairStatus::FixError);
    assert_eq!(report.fixes().len(), 1);
    assert!(report.fixes()[0].starts_with("Problems with document save."));
}

// Scenario F: three metadata streams, two filtered, prior Success.
#[test]
fn test_all_metadata_streams_end_up_unfiltered() {
    init_logs();
    let payload = canonical_xmp("Multi");
    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, &payload, false, true);
    add_metadata_stream(&mut doc, catalog_id, b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"></x:xmpmeta>", true, false);
    add_metadata_stream(&mut doc, catalog_id, b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"></x:xmpmeta>", true, false);
    let original = to_bytes(&mut doc);

    let mut session = open_session(&original);
    assert_eq!(session.remove_filters_for_all_metadata_objects(), 2);

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::Success, &mut out);
    assert_eq!(report.status(), RepairStatus::Success);
    assert!(!out.is_empty());

    let states = metadata_filter_states(&out);
    assert_eq!(states.len(), 3);
    assert!(states.iter().all(|filtered| !filtered));
}

// Law 1: an aligned input with no dirty flags is left untouched.
#[test]
fn test_idempotent_noop_session() {
    init_logs();
    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, &canonical_xmp("Stable"), false, true);
    add_info(&mut doc, "Stable", "producer");
    let original = to_bytes(&mut doc);

    let session = open_session(&original);
    assert!(!session.needs_update());

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::WontFix, &mut out);
    assert_eq!(report.status(), RepairStatus::WontFix);
    assert!(out.is_empty());
}

// Law 2: repairing a document without a catalog Metadata entry attaches
// exactly one.
#[test]
fn test_attach_once() {
    init_logs();
    let (mut doc, _) = base_document();
    let original = to_bytes(&mut doc);

    let session = open_session(&original);
    let mut out = Vec::new();
    session.save_incremental(RepairStatus::NoAction, &mut out);

    let reparsed = Document::load_mem(&out).unwrap();
    let root = match reparsed.trailer.get(b"Root").unwrap() {
        Object::Reference(id) => *id,
        _ => panic!("trailer /Root must be a reference"),
    };
    let catalog = reparsed.get_object(root).unwrap().as_dict().unwrap();
    let metadata_entries = catalog
        .iter()
        .filter(|(key, _)| key.as_slice() == b"Metadata")
        .count();
    assert_eq!(metadata_entries, 1);

    // a second pass over the repaired file has nothing left to do
    let second = open_session(&out);
    assert!(!second.needs_update());
    let mut out2 = Vec::new();
    let report = second.save_incremental(RepairStatus::NoAction, &mut out2);
    assert_eq!(report.status(), RepairStatus::NoAction);
    assert!(out2.is_empty());
}

// Law 6: values written during repair survive a full re-parse.
#[test]
fn test_round_trip_of_repaired_properties() {
    init_logs();
    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, &canonical_xmp("Old"), false, true);
    add_info(&mut doc, "Old", "old producer");
    let original = to_bytes(&mut doc);

    let mut session = open_session(&original);
    {
        let metadata = session.metadata_mut().unwrap();
        metadata.set_title("New Title");
        metadata.set_author("New Author");
        metadata.set_flavour(PdfaFlavour::Part2B);
    }
    {
        let info = session.info_mut().unwrap();
        info.set_title("New Title");
        info.set_creation_date("D:20240101000000Z");
    }

    let mut out = Vec::new();
    let report = session.save_incremental(RepairStatus::NoAction, &mut out);
    assert_eq!(report.status(), RepairStatus::Success);

    let reparsed = open_session(&out);
    let metadata = reparsed.metadata().unwrap();
    assert_eq!(metadata.title(), Some("New Title"));
    assert_eq!(metadata.author(), Some("New Author"));
    assert_eq!(metadata.flavour(), Some(PdfaFlavour::Part2B));
    let info = reparsed.info().unwrap();
    assert_eq!(info.title(), Some("New Title"));
    assert_eq!(info.creation_date(), Some("D:20240101000000Z"));
    assert_eq!(info.producer(), Some("old producer"));
}

// The incremental write appends; it never rewrites the original bytes.
#[test]
fn test_output_preserves_original_bytes() {
    init_logs();
    let (mut doc, catalog_id) = base_document();
    add_metadata_stream(&mut doc, catalog_id, &canonical_xmp("Keep"), false, true);
    let original = to_bytes(&mut doc);

    let mut session = open_session(&original);
    session.metadata_mut().unwrap().set_producer("metafix");

    let mut out = Vec::new();
    session.save_incremental(RepairStatus::NoAction, &mut out);
    assert!(out.len() > original.len());
    assert!(out.starts_with(&original));
}

// A file sink works the same as an in-memory sink.
#[test]
fn test_write_to_file_sink() {
    init_logs();
    let (mut doc, _) = base_document();
    let original = to_bytes(&mut doc);

    let session = open_session(&original);
    let file = tempfile::NamedTempFile::new().unwrap();
    let report = session.save_incremental(RepairStatus::NoAction, file.reopen().unwrap());
    assert_eq!(report.status(), RepairStatus::Success);

    let written = std::fs::read(file.path()).unwrap();
    assert!(written.starts_with(&original));
    let reparsed = open_session(&written);
    assert!(reparsed.metadata().is_some());
}

// Trailer /ID selection over a real document.
#[test]
fn test_document_id_selection() {
    init_logs();
    let (mut doc, _) = base_document();
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(vec![0xAB, 0xCD], StringFormat::Hexadecimal),
            Object::String(vec![0xEF, 0x01], StringFormat::Hexadecimal),
        ]),
    );
    let original = to_bytes(&mut doc);

    let session = open_session(&original);
    let id = session.document_id(PdfaFlavour::Part1B).unwrap();
    assert_eq!(id.as_bytes(), &[0xAB, 0xCD, 0xEF, 0x01]);
    assert_eq!(format!("{}", id), "ABCDEF01");
}
