//! Shared helpers for the integration tests.
//!
//! Consolidates the stream plumbing (write a slice of entities, read it
//! back) so individual test files stay focused on what they assert.

#![allow(dead_code)]

pub mod builders;
pub mod comparison;

use cadrw::io::{self, TextReader, TextWriter};
use cadrw::{CadVersion, DiagnosticSink, Entity};

/// Binary versions every round-trip suite runs against.
pub const DWG_VERSIONS: [CadVersion; 4] = [
    CadVersion::AC1014,
    CadVersion::AC1015,
    CadVersion::AC1021,
    CadVersion::AC1024,
];

/// Text versions the full entity set is expected to survive.
pub const DXF_VERSIONS: [CadVersion; 3] = [
    CadVersion::AC1015,
    CadVersion::AC1018,
    CadVersion::AC1032,
];

/// Entities -> tagged text bytes.
pub fn to_dxf(entities: &[Entity], version: CadVersion) -> Vec<u8> {
    let mut w = TextWriter::new(Vec::new());
    io::write_entities_dxf(entities, version, &mut w).expect("dxf write");
    w.into_inner()
}

/// Tagged text bytes -> entities, failing the test on stream errors.
pub fn from_dxf(data: Vec<u8>, sink: &mut DiagnosticSink) -> Vec<Entity> {
    let mut r = TextReader::new(std::io::Cursor::new(data));
    io::read_entities_dxf(&mut r, sink).expect("dxf read")
}

/// One write/read cycle through the text form.
pub fn dxf_roundtrip(entities: &[Entity], version: CadVersion) -> Vec<Entity> {
    let mut sink = DiagnosticSink::default();
    let back = from_dxf(to_dxf(entities, version), &mut sink);
    assert!(
        !sink.has_level(cadrw::LogLevel::Error),
        "clean input produced errors: {:?}",
        sink.into_vec()
    );
    back
}

/// Entities -> framed binary bytes.
pub fn to_dwg(entities: &[Entity], version: CadVersion) -> Vec<u8> {
    let mut sink = DiagnosticSink::default();
    io::write_entities_dwg(entities, version, &mut sink).expect("dwg write")
}

/// Framed binary bytes -> entities, failing the test on stream errors.
pub fn from_dwg(data: Vec<u8>, version: CadVersion, sink: &mut DiagnosticSink) -> Vec<Entity> {
    io::read_entities_dwg(data, version, sink).expect("dwg read")
}

/// One write/read cycle through the binary form.
pub fn dwg_roundtrip(entities: &[Entity], version: CadVersion) -> Vec<Entity> {
    let mut sink = DiagnosticSink::default();
    let back = from_dwg(to_dwg(entities, version), version, &mut sink);
    assert!(
        !sink.has_level(cadrw::LogLevel::Error),
        "clean input produced errors at {version:?}: {:?}",
        sink.into_vec()
    );
    back
}

/// Type names in stream order.
pub fn names(entities: &[Entity]) -> Vec<&str> {
    entities.iter().map(Entity::type_name).collect()
}

/// The single entity of a given kind out of a parsed batch.
pub fn find<'a>(entities: &'a [Entity], type_name: &str) -> &'a Entity {
    entities
        .iter()
        .find(|e| e.type_name() == type_name)
        .unwrap_or_else(|| panic!("no {type_name} in {:?}", names(entities)))
}
