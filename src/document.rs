//! Drawing container.
//!
//! [`Document`] owns the entity list, the handle counter, and the name
//! registries the write path resolves pointer handles against.  It is
//! deliberately thin: header variables, table records, and the rest of
//! a full drawing database live outside this crate.

use std::io::{Read, Write};

use indexmap::IndexMap;

use crate::classes::ClassRecord;
use crate::diagnostics::DiagnosticSink;
use crate::entities::Entity;
use crate::error::Result;
use crate::io::{self, RecordReader, RecordWriter, TextReader, TextWriter};
use crate::types::{CadVersion, Handle};

/// Handles below this are reserved for table control records.
const FIRST_FREE_HANDLE: u64 = 0x10;

/// Entity kinds that need a class declaration when present.
const CLASSED_KINDS: [&str; 4] = ["LWPOLYLINE", "HATCH", "IMAGE", "ARC_DIMENSION"];

/// Companion declarations an image entity drags in.
const IMAGE_COMPANIONS: [&str; 3] = ["IMAGEDEF", "IMAGEDEF_REACTOR", "RASTERVARIABLES"];

/// Names of one symbol table, with the handle each name was given.
///
/// Both directions are queried: the text path stores names and needs
/// handles, the binary path stores handles and needs names.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    entries: IndexMap<String, Handle>,
}

impl NameRegistry {
    pub fn new() -> Self {
        NameRegistry::default()
    }

    /// Record `name` under `handle`, replacing any previous handle.
    pub fn insert(&mut self, name: impl Into<String>, handle: Handle) {
        self.entries.insert(name.into(), handle);
    }

    pub fn handle_of(&self, name: &str) -> Option<Handle> {
        self.entries.get(name).copied()
    }

    pub fn name_of(&self, handle: Handle) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, h)| **h == handle)
            .map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Handle)> {
        self.entries.iter().map(|(name, h)| (name.as_str(), *h))
    }
}

/// A drawing's entities plus the bookkeeping around them.
#[derive(Debug, Clone)]
pub struct Document {
    pub version: CadVersion,
    /// Class declarations, written ahead of the entity stream.
    pub classes: Vec<ClassRecord>,
    pub layers: NameRegistry,
    pub line_types: NameRegistry,
    pub text_styles: NameRegistry,
    /// Block names seen in `BLOCK` entities or registered by hand.
    pub blocks: NameRegistry,
    entities: Vec<Entity>,
    by_handle: IndexMap<Handle, usize>,
    next_handle: u64,
}

impl Document {
    /// An empty document with the standard table entries registered.
    pub fn new() -> Self {
        let mut doc = Document {
            version: CadVersion::AC1032,
            classes: Vec::new(),
            layers: NameRegistry::new(),
            line_types: NameRegistry::new(),
            text_styles: NameRegistry::new(),
            blocks: NameRegistry::new(),
            entities: Vec::new(),
            by_handle: IndexMap::new(),
            next_handle: FIRST_FREE_HANDLE,
        };
        let h = doc.allocate_handle();
        doc.layers.insert("0", h);
        for name in ["CONTINUOUS", "BYLAYER", "BYBLOCK"] {
            let h = doc.allocate_handle();
            doc.line_types.insert(name, h);
        }
        let h = doc.allocate_handle();
        doc.text_styles.insert("STANDARD", h);
        for name in ["*MODEL_SPACE", "*PAPER_SPACE"] {
            let h = doc.allocate_handle();
            doc.blocks.insert(name, h);
        }
        doc
    }

    pub fn with_version(version: CadVersion) -> Self {
        let mut doc = Self::new();
        doc.version = version;
        doc
    }

    /// Hand out the next free handle.
    pub fn allocate_handle(&mut self) -> Handle {
        let handle = Handle::new(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// The value the next allocation will use.
    pub fn next_handle(&self) -> u64 {
        self.next_handle
    }

    /// Store an entity, giving it a handle if it arrived without one.
    /// An entity reusing an existing handle replaces the old one.
    pub fn add_entity(&mut self, mut entity: Entity) -> Handle {
        let handle = if entity.common().handle.is_null() {
            let h = self.allocate_handle();
            entity.common_mut().handle = h;
            h
        } else {
            let h = entity.common().handle;
            if h.value() >= self.next_handle {
                self.next_handle = h.value() + 1;
            }
            h
        };
        if let Entity::Block(block) = &entity {
            if !block.name.is_empty() && !self.blocks.contains(&block.name) {
                self.blocks.insert(block.name.clone(), handle);
            }
        }
        match self.by_handle.get(&handle) {
            Some(&index) => self.entities[index] = entity,
            None => {
                self.by_handle.insert(handle, self.entities.len());
                self.entities.push(entity);
            }
        }
        handle
    }

    pub fn get_entity(&self, handle: Handle) -> Option<&Entity> {
        self.by_handle
            .get(&handle)
            .map(|&index| &self.entities[index])
    }

    pub fn get_entity_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        self.by_handle
            .get(&handle)
            .map(|&index| &mut self.entities[index])
    }

    /// Remove and return an entity.  Later entities keep their order.
    pub fn remove_entity(&mut self, handle: Handle) -> Option<Entity> {
        let index = self.by_handle.shift_remove(&handle)?;
        let entity = self.entities.remove(index);
        for slot in self.by_handle.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    /// Declare the classes the stored entities need, counting
    /// instances.  Safe to call repeatedly; counts are recomputed.
    pub fn declare_classes(&mut self) {
        for kind in CLASSED_KINDS {
            let count = self
                .entities
                .iter()
                .filter(|e| e.type_name() == kind)
                .count();
            if count == 0 {
                continue;
            }
            self.declare_class(kind, count as i32);
            if kind == "IMAGE" {
                for companion in IMAGE_COMPANIONS {
                    self.declare_class(companion, count as i32);
                }
            }
        }
    }

    fn declare_class(&mut self, record_name: &str, instances: i32) {
        if let Some(existing) = self
            .classes
            .iter_mut()
            .find(|c| c.record_name == record_name)
        {
            existing.instance_count = instances;
            return;
        }
        if let Some(mut class) = ClassRecord::standard(record_name) {
            class.instance_count = instances;
            self.classes.push(class);
        }
    }

    /// Reconcile names with handles after a load or before a save.
    ///
    /// Fills the missing half of every layer and line type reference
    /// (text streams carry names, binary streams carry handles), makes
    /// sure every name has a registry entry, and bumps the handle
    /// counter past the largest handle in use.
    pub fn resolve_references(&mut self) {
        let mut max_handle = self.next_handle;
        for entity in &self.entities {
            let h = entity.common().handle.value();
            if h >= max_handle {
                max_handle = h + 1;
            }
        }
        self.next_handle = max_handle;

        // Two passes so registrations can allocate handles.
        let mut wanted_layers: Vec<String> = Vec::new();
        let mut wanted_line_types: Vec<String> = Vec::new();
        for entity in &self.entities {
            let common = entity.common();
            if !common.layer.is_empty() && !self.layers.contains(&common.layer) {
                wanted_layers.push(common.layer.clone());
            }
            if !common.line_type.is_empty() && !self.line_types.contains(&common.line_type) {
                wanted_line_types.push(common.line_type.clone());
            }
        }
        for name in wanted_layers {
            let h = self.allocate_handle();
            self.layers.insert(name, h);
        }
        for name in wanted_line_types {
            let h = self.allocate_handle();
            self.line_types.insert(name, h);
        }

        for index in 0..self.entities.len() {
            let common = self.entities[index].common();
            let layer_fix = if common.layer_handle.is_null() && !common.layer.is_empty() {
                self.layers.handle_of(&common.layer).map(|h| (h, None))
            } else if common.layer.is_empty() && common.layer_handle.is_valid() {
                self.layers
                    .name_of(common.layer_handle)
                    .map(|n| (common.layer_handle, Some(n.to_string())))
            } else {
                None
            };
            let lt_fix = if common.line_type_handle.is_null() && !common.line_type.is_empty() {
                self.line_types
                    .handle_of(&common.line_type)
                    .map(|h| (h, None))
            } else if common.line_type.is_empty() && common.line_type_handle.is_valid() {
                self.line_types
                    .name_of(common.line_type_handle)
                    .map(|n| (common.line_type_handle, Some(n.to_string())))
            } else {
                None
            };
            let common = self.entities[index].common_mut();
            if let Some((handle, name)) = layer_fix {
                common.layer_handle = handle;
                if let Some(name) = name {
                    common.layer = name;
                }
            }
            if let Some((handle, name)) = lt_fix {
                common.line_type_handle = handle;
                if let Some(name) = name {
                    common.line_type = name;
                }
            }
        }
    }

    /// Read a tagged drawing, keeping its classes and entities.
    ///
    /// Sections other than `CLASSES` and `ENTITIES` are skipped with a
    /// diagnostic.
    pub fn load_dxf<R: Read>(&mut self, source: R, sink: &mut DiagnosticSink) -> Result<()> {
        let mut reader = TextReader::new(source);
        loop {
            let code = match reader.read_record()? {
                Some(code) => code,
                None => break,
            };
            if code != 0 {
                continue;
            }
            match reader.get_utf8_string()?.as_str() {
                "SECTION" => {
                    let name = match reader.read_record()? {
                        Some(2) => reader.get_utf8_string()?,
                        _ => {
                            sink.warn("section without a name".to_string());
                            continue;
                        }
                    };
                    match name.as_str() {
                        "ENTITIES" => {
                            for entity in io::read_entities_dxf(&mut reader, sink)? {
                                self.add_entity(entity);
                            }
                        }
                        "CLASSES" => self.read_classes_section(&mut reader, sink)?,
                        other => {
                            sink.log(
                                crate::diagnostics::LogLevel::Debug,
                                format!("section {other} skipped"),
                            );
                            skip_section(&mut reader)?;
                        }
                    }
                }
                "EOF" => break,
                other => {
                    sink.warn(format!("unexpected {other} outside any section"));
                }
            }
        }
        self.resolve_references();
        Ok(())
    }

    fn read_classes_section<R: Read>(
        &mut self,
        reader: &mut TextReader<R>,
        sink: &mut DiagnosticSink,
    ) -> Result<()> {
        loop {
            let code = match reader.read_record()? {
                Some(code) => code,
                None => return Ok(()),
            };
            if code != 0 {
                continue;
            }
            match reader.get_utf8_string()?.as_str() {
                "ENDSEC" => return Ok(()),
                "CLASS" => {
                    let mut record = ClassRecord::default();
                    while let Some(code) = reader.peek_code()? {
                        if code == 0 {
                            break;
                        }
                        reader.read_record()?;
                        if !record.parse_code(code, reader)? {
                            sink.warn(format!("class group {code} skipped"));
                        }
                    }
                    self.classes.push(record);
                }
                other => sink.warn(format!("unexpected {other} in CLASSES")),
            }
        }
    }

    /// Write the drawing in tagged form: class declarations, the
    /// entity section, and the end marker.
    pub fn save_dxf<W: Write>(&self, target: W) -> Result<()> {
        let mut w = TextWriter::new(target);
        if self.version.is_r13_plus() && !self.classes.is_empty() {
            w.write_string(0, "SECTION")?;
            w.write_string(2, "CLASSES")?;
            for class in &self.classes {
                class.write_dxf(self.version, &mut w)?;
            }
            w.write_string(0, "ENDSEC")?;
        }
        w.write_string(0, "SECTION")?;
        w.write_string(2, "ENTITIES")?;
        io::write_entities_dxf(&self.entities, self.version, &mut w)?;
        w.write_string(0, "ENDSEC")?;
        w.write_string(0, "EOF")?;
        w.flush()?;
        Ok(())
    }

    /// Read a framed binary entity stream into the document.
    pub fn load_dwg(&mut self, data: Vec<u8>, sink: &mut DiagnosticSink) -> Result<()> {
        for entity in io::read_entities_dwg(data, self.version, sink)? {
            self.add_entity(entity);
        }
        self.resolve_references();
        Ok(())
    }

    /// The framed binary form of the stored entities.
    pub fn save_dwg(&self, sink: &mut DiagnosticSink) -> Result<Vec<u8>> {
        io::write_entities_dwg(&self.entities, self.version, sink)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn skip_section<R: Read>(reader: &mut TextReader<R>) -> Result<()> {
    loop {
        let code = match reader.read_record()? {
            Some(code) => code,
            None => return Ok(()),
        };
        if code == 0 && reader.get_utf8_string()? == "ENDSEC" {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Circle, Line, LwPolyline, LwVertex};
    use crate::types::Coord;

    fn line(from: (f64, f64), to: (f64, f64)) -> Entity {
        Entity::Line(Line::new(
            Coord::new(from.0, from.1, 0.0),
            Coord::new(to.0, to.1, 0.0),
        ))
    }

    #[test]
    fn test_add_entity_allocates_handle() {
        let mut doc = Document::new();
        let h = doc.add_entity(line((0.0, 0.0), (1.0, 1.0)));
        assert!(h.is_valid());
        assert_eq!(doc.get_entity(h).map(Entity::type_name), Some("LINE"));
    }

    #[test]
    fn test_add_entity_keeps_existing_handle() {
        let mut doc = Document::new();
        let mut e = line((0.0, 0.0), (1.0, 1.0));
        e.common_mut().handle = Handle::new(0x200);
        let h = doc.add_entity(e);
        assert_eq!(h, Handle::new(0x200));
        // The counter moves past adopted handles.
        assert!(doc.next_handle() > 0x200);
        assert!(doc.allocate_handle() > Handle::new(0x200));
    }

    #[test]
    fn test_remove_entity_keeps_lookup_consistent() {
        let mut doc = Document::new();
        let a = doc.add_entity(line((0.0, 0.0), (1.0, 0.0)));
        let b = doc.add_entity(line((0.0, 1.0), (1.0, 1.0)));
        let c = doc.add_entity(line((0.0, 2.0), (1.0, 2.0)));
        assert!(doc.remove_entity(b).is_some());
        assert_eq!(doc.entity_count(), 2);
        assert!(doc.get_entity(a).is_some());
        assert!(doc.get_entity(c).is_some());
        assert!(doc.get_entity(b).is_none());
    }

    #[test]
    fn test_standard_names_are_seeded() {
        let doc = Document::new();
        assert!(doc.layers.contains("0"));
        assert!(doc.line_types.contains("CONTINUOUS"));
        assert!(doc.text_styles.contains("STANDARD"));
        assert!(doc.blocks.contains("*MODEL_SPACE"));
    }

    #[test]
    fn test_resolve_fills_layer_handles_and_names() {
        let mut doc = Document::new();
        let mut by_name = line((0.0, 0.0), (1.0, 0.0));
        by_name.common_mut().layer = "WALLS".to_string();
        let a = doc.add_entity(by_name);

        doc.resolve_references();
        let walls = doc.layers.handle_of("WALLS").unwrap();
        assert_eq!(doc.get_entity(a).unwrap().common().layer_handle, walls);

        let mut by_handle = line((0.0, 1.0), (1.0, 1.0));
        by_handle.common_mut().layer = String::new();
        by_handle.common_mut().layer_handle = walls;
        let b = doc.add_entity(by_handle);
        doc.resolve_references();
        assert_eq!(doc.get_entity(b).unwrap().common().layer, "WALLS");
    }

    #[test]
    fn test_declare_classes_counts_instances() {
        let mut doc = Document::new();
        doc.add_entity(Entity::LwPolyline(LwPolyline::new(vec![
            LwVertex::from_coords(0.0, 0.0),
            LwVertex::from_coords(1.0, 0.0),
        ])));
        doc.add_entity(Entity::Circle(Circle::new(Coord::ZERO, 1.0)));
        doc.declare_classes();
        doc.declare_classes();
        assert_eq!(doc.classes.len(), 1);
        assert_eq!(doc.classes[0].record_name, "LWPOLYLINE");
        assert_eq!(doc.classes[0].instance_count, 1);
    }

    #[test]
    fn test_block_names_register_on_add() {
        let mut doc = Document::new();
        doc.add_entity(Entity::Block(crate::entities::Block::new("DOOR")));
        assert!(doc.blocks.contains("DOOR"));
    }

    #[test]
    fn test_dxf_save_load_cycle() {
        let mut doc = Document::with_version(CadVersion::AC1018);
        doc.add_entity(line((0.0, 0.0), (4.0, 4.0)));
        doc.add_entity(Entity::Circle(Circle::new(Coord::new(2.0, 2.0, 0.0), 1.5)));
        doc.declare_classes();
        let mut out = Vec::new();
        doc.save_dxf(&mut out).unwrap();

        let mut back = Document::with_version(CadVersion::AC1018);
        let mut sink = DiagnosticSink::default();
        back.load_dxf(std::io::Cursor::new(out), &mut sink).unwrap();
        assert_eq!(back.entity_count(), 2);
        let names: Vec<&str> = back.entities().map(Entity::type_name).collect();
        assert_eq!(names, ["LINE", "CIRCLE"]);
    }

    #[test]
    fn test_load_dxf_skips_foreign_sections() {
        let text = "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1015\n0\nENDSEC\n\
                    0\nSECTION\n2\nENTITIES\n0\nLINE\n10\n0.0\n20\n0.0\n11\n2.0\n21\n2.0\n0\nENDSEC\n0\nEOF\n";
        let mut doc = Document::new();
        let mut sink = DiagnosticSink::default();
        doc.load_dxf(std::io::Cursor::new(text.as_bytes().to_vec()), &mut sink)
            .unwrap();
        assert_eq!(doc.entity_count(), 1);
    }

    #[test]
    fn test_dwg_save_load_cycle() {
        let mut doc = Document::with_version(CadVersion::AC1015);
        doc.add_entity(line((1.0, 1.0), (2.0, 3.0)));
        let mut sink = DiagnosticSink::default();
        let data = doc.save_dwg(&mut sink).unwrap();

        let mut back = Document::with_version(CadVersion::AC1015);
        back.load_dwg(data, &mut sink).unwrap();
        assert_eq!(back.entity_count(), 1);
        assert_eq!(back.entities().next().unwrap().type_name(), "LINE");
    }
}
