//! Stream layer: tagged text records, bit-packed binary records, and
//! the entity dispatch loops over both.
//!
//! The text loop walks (code, value) pairs and opens a new entity at
//! every code 0; the binary loop walks length-framed objects.  Both
//! fold VERTEX and SEQEND records back into their owning POLYLINE and
//! recover from a broken record by resynchronizing on the next
//! boundary, logging what was dropped to the [`DiagnosticSink`].

pub mod bit;
pub mod record;
pub mod text;

pub use bit::{BitReader, BitWriter};
pub use record::{CodeKind, RecordReader, RecordWriter};
pub use text::{TextReader, TextWriter};

use std::io::Read;

use crate::classes::ClassRecord;
use crate::diagnostics::DiagnosticSink;
use crate::entities::{Entity, EntityHeader, Polyline, Vertex};
use crate::error::{CadError, Result};
use crate::types::CadVersion;

/// Object type codes owned by the stream layer.  Vertex and
/// sequence-end objects never surface as [`Entity`] values.
const TYPE_SEQEND: i16 = 0x06;
const TYPE_VERTEX_2D: i16 = 0x0A;
const TYPE_VERTEX_3D: i16 = 0x0B;

/// Read entities from the tagged stream until `ENDSEC` or end of input.
/// The terminating `ENDSEC` pair is consumed.
///
/// A record that fails to decode abandons its entity: the remaining
/// groups are skipped up to the next code 0 and the loop continues.
pub fn read_entities_dxf<R: Read>(
    reader: &mut TextReader<R>,
    sink: &mut DiagnosticSink,
) -> Result<Vec<Entity>> {
    let mut entities = Vec::new();
    let mut open_polyline: Option<Polyline> = None;

    loop {
        let code = match reader.read_record()? {
            Some(code) => code,
            None => break,
        };
        if code != 0 {
            sink.warn(format!(
                "group {} outside any entity skipped at line {}",
                code,
                reader.line_number()
            ));
            continue;
        }
        let name = reader.get_utf8_string()?;
        match name.as_str() {
            "ENDSEC" => break,
            "VERTEX" => {
                let mut vertex = Vertex::default();
                let kept = parse_groups(reader, sink, "VERTEX", |code, r| {
                    vertex.parse_code(code, r)
                })?;
                match (&mut open_polyline, kept) {
                    (Some(p), true) => p.vertices.push(vertex),
                    (None, true) => sink.warn("VERTEX outside a POLYLINE sequence skipped"),
                    _ => {}
                }
            }
            "SEQEND" => {
                let mut header = EntityHeader::new();
                parse_groups(reader, sink, "SEQEND", |code, r| header.parse_code(code, r))?;
                match open_polyline.take() {
                    Some(mut p) => {
                        p.seqend_handle = header.handle;
                        entities.push(Entity::Polyline(p));
                    }
                    None => sink.warn("SEQEND without an open POLYLINE skipped"),
                }
            }
            _ => {
                if let Some(p) = open_polyline.take() {
                    sink.warn("POLYLINE sequence not closed by SEQEND");
                    entities.push(Entity::Polyline(p));
                }
                let mut entity = Entity::from_type_name(&name);
                let name = entity.type_name().to_string();
                let kept = parse_groups(reader, sink, &name, |code, r| {
                    entity.parse_code(code, r)
                })?;
                if !kept {
                    continue;
                }
                match entity {
                    Entity::Polyline(p) => open_polyline = Some(p),
                    other => entities.push(other),
                }
            }
        }
    }
    if let Some(p) = open_polyline.take() {
        sink.warn("POLYLINE sequence not closed by SEQEND");
        entities.push(Entity::Polyline(p));
    }
    Ok(entities)
}

/// Feed groups to `parse` until the next code 0, which is pushed back.
/// Returns `false` when the record was abandoned after a decode error.
fn parse_groups<R, F>(
    reader: &mut TextReader<R>,
    sink: &mut DiagnosticSink,
    name: &str,
    mut parse: F,
) -> Result<bool>
where
    R: Read,
    F: FnMut(i32, &mut dyn RecordReader) -> Result<bool>,
{
    while let Some(code) = reader.read_record()? {
        if code == 0 {
            reader.push_back();
            return Ok(true);
        }
        match parse(code, reader) {
            Ok(true) => {}
            Ok(false) => sink.warn(format!(
                "{name}: unrecognized group {code} at line {} skipped",
                reader.line_number()
            )),
            Err(err) => {
                sink.error(format!(
                    "{name} abandoned at line {}: {err}",
                    reader.line_number()
                ));
                skip_to_entity_boundary(reader)?;
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn skip_to_entity_boundary<R: Read>(reader: &mut TextReader<R>) -> Result<()> {
    while let Some(code) = reader.read_record()? {
        if code == 0 {
            reader.push_back();
            break;
        }
    }
    Ok(())
}

/// Emit entities in tagged form.  Polylines write their whole sequence.
pub fn write_entities_dxf(
    entities: &[Entity],
    version: CadVersion,
    w: &mut dyn RecordWriter,
) -> Result<()> {
    for entity in entities {
        entity.write_dxf(version, w)?;
    }
    Ok(())
}

/// Read a framed binary entity stream.
///
/// Each object sits in a `[RL byte size][body]` frame, so a body that
/// fails to decode is abandoned by seeking to the frame end, and the
/// next object is unaffected.
pub fn read_entities_dwg(
    data: Vec<u8>,
    version: CadVersion,
    sink: &mut DiagnosticSink,
) -> Result<Vec<Entity>> {
    let mut r = BitReader::new(data, version);
    let mut entities = Vec::new();
    let mut open_polyline: Option<Polyline> = None;

    while !r.at_end() {
        let size = r.get_raw_long()?;
        let start = r.byte_position();
        if size <= 0 {
            return Err(CadError::Malformed(format!(
                "object frame size {size} at byte {start}"
            )));
        }
        let end = start + size as u64;
        if end > r.stream_length() {
            return Err(CadError::UnexpectedEndOfStream(end * 8));
        }
        if let Err(err) = read_framed_object(&mut r, version, &mut entities, &mut open_polyline, sink)
        {
            sink.error(format!("object at byte {start} abandoned: {err}"));
        }
        r.set_byte_position(end);
    }
    if let Some(p) = open_polyline.take() {
        sink.warn("polyline sequence not closed by a seqend object");
        entities.push(Entity::Polyline(p));
    }
    Ok(entities)
}

fn read_framed_object(
    r: &mut BitReader,
    version: CadVersion,
    entities: &mut Vec<Entity>,
    open_polyline: &mut Option<Polyline>,
    sink: &mut DiagnosticSink,
) -> Result<()> {
    let opcode = r.get_bit_short()?;
    match opcode {
        TYPE_VERTEX_2D | TYPE_VERTEX_3D => {
            let mut vertex = Vertex::default();
            if opcode == TYPE_VERTEX_2D {
                vertex.parse_dwg_2d(version, r)?;
            } else {
                vertex.parse_dwg_3d(version, r)?;
            }
            match open_polyline.as_mut() {
                Some(p) => p.vertices.push(vertex),
                None => sink.warn("vertex object outside a polyline sequence skipped"),
            }
        }
        TYPE_SEQEND => {
            let mut header = EntityHeader::new();
            header.parse_dwg(version, r)?;
            match open_polyline.take() {
                Some(mut p) => {
                    p.seqend_handle = header.handle;
                    entities.push(Entity::Polyline(p));
                }
                None => sink.warn("seqend object without an open polyline skipped"),
            }
        }
        _ => {
            if let Some(p) = open_polyline.take() {
                sink.warn("polyline sequence not closed by a seqend object");
                entities.push(Entity::Polyline(p));
            }
            match Entity::from_dwg_type(opcode) {
                Some(mut entity) => {
                    entity.parse_dwg(version, r, opcode)?;
                    match entity {
                        Entity::Polyline(p) => *open_polyline = Some(p),
                        other => entities.push(other),
                    }
                }
                None => sink.warn(format!("object type {opcode:#X} skipped")),
            }
        }
    }
    Ok(())
}

/// Emit entities as framed binary objects.  A polyline becomes its own
/// frame, one frame per vertex, and a seqend frame.  Entities with no
/// binary form are skipped with a diagnostic.
pub fn write_entities_dwg(
    entities: &[Entity],
    version: CadVersion,
    sink: &mut DiagnosticSink,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for entity in entities {
        let opcode = match entity.dwg_type() {
            Some(code) => code,
            None => {
                sink.warn(format!(
                    "{} has no binary form, skipped",
                    entity.type_name()
                ));
                continue;
            }
        };
        let body = encode_object(version, opcode, |w| entity.write_dwg(version, w))?;
        append_frame(body, &mut out);

        if let Entity::Polyline(p) = entity {
            let vertex_opcode = if p.is_3d() {
                TYPE_VERTEX_3D
            } else {
                TYPE_VERTEX_2D
            };
            for vertex in &p.vertices {
                let body = encode_object(version, vertex_opcode, |w| {
                    if p.is_3d() {
                        vertex.write_dwg_3d(version, w)
                    } else {
                        vertex.write_dwg_2d(version, w)
                    }
                })?;
                append_frame(body, &mut out);
            }
            let mut seqend = EntityHeader::new();
            seqend.handle = p.seqend_handle;
            seqend.owner = p.common.owner;
            seqend.layer_handle = p.common.layer_handle;
            let body = encode_object(version, TYPE_SEQEND, |w| seqend.write_dwg(version, w))?;
            append_frame(body, &mut out);
        }
    }
    Ok(out)
}

/// Class declarations in binary form: a count followed by the records.
pub fn read_classes_dwg(
    data: Vec<u8>,
    version: CadVersion,
) -> Result<Vec<ClassRecord>> {
    let mut r = BitReader::new(data, version);
    let count = r.get_bit_short()?;
    if !(0..=4096).contains(&count) {
        return Err(CadError::Malformed(format!("class count {count}")));
    }
    let mut classes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut record = ClassRecord::default();
        record.parse_dwg(version, &mut r)?;
        classes.push(record);
    }
    Ok(classes)
}

/// Mirror of [`read_classes_dwg`].  Class numbers are assigned here,
/// custom kinds counting up from 500 in declaration order.
pub fn write_classes_dwg(classes: &[ClassRecord], version: CadVersion) -> Result<Vec<u8>> {
    let mut w = BitWriter::new(version);
    w.write_bit_short(0, classes.len() as i16)?;
    for (i, record) in classes.iter().enumerate() {
        let mut numbered = record.clone();
        if numbered.class_number == 0 {
            numbered.class_number = 500 + i as i16;
        }
        numbered.write_dwg(version, &mut w)?;
    }
    Ok(w.into_data())
}

fn encode_object<F>(version: CadVersion, opcode: i16, write_body: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut dyn RecordWriter) -> Result<()>,
{
    let mut w = BitWriter::new(version);
    w.write_bit_short(0, opcode)?;
    write_body(&mut w)?;
    Ok(w.into_data())
}

fn append_frame(body: Vec<u8>, out: &mut Vec<u8>) {
    out.extend_from_slice(&(body.len() as i32).to_le_bytes());
    out.extend_from_slice(&body);
}
