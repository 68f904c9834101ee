//! Application class declarations.
//!
//! Drawings that carry post-R12 entity kinds declare the backing
//! application classes ahead of the entity streams.  Readers use the
//! declarations to map class numbers in the binary stream back to
//! record names; writers emit one record per kind present in the
//! drawing.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::CadVersion;

/// Item class word separating entities from other objects.
const ITEM_CLASS_ENTITY: i16 = 0x1F2;
const ITEM_CLASS_OBJECT: i16 = 0x1F3;

/// cpp class name, proxy capability flags, entity flag.
type ClassEntry = (&'static str, i32, bool);

/// Classes a writer may need to declare, keyed by record name.
static STANDARD_CLASSES: Lazy<IndexMap<&'static str, ClassEntry>> = Lazy::new(|| {
    IndexMap::from([
        ("LWPOLYLINE", ("AcDbPolyline", 0, true)),
        ("HATCH", ("AcDbHatch", 0, true)),
        ("IMAGE", ("AcDbRasterImage", 127, true)),
        ("IMAGEDEF", ("AcDbRasterImageDef", 0, false)),
        ("IMAGEDEF_REACTOR", ("AcDbRasterImageDefReactor", 1, false)),
        ("RASTERVARIABLES", ("AcDbRasterVariables", 0, false)),
        ("ARC_DIMENSION", ("AcDbArcDimension", 1025, true)),
        ("GROUP", ("AcDbGroup", 0, false)),
        ("LAYOUT", ("AcDbLayout", 0, false)),
    ])
});

/// One class declaration.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 1 | Record name used on code 0 |
/// | 2 | C++ class name |
/// | 3 | Application name |
/// | 90 | Proxy capability flags |
/// | 91 | Instance count, 2004 and newer |
/// | 280 | Was a proxy before loading |
/// | 281 | Declares an entity kind |
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub record_name: String,
    pub cpp_name: String,
    pub app_name: String,
    pub proxy_flags: i32,
    pub instance_count: i32,
    pub was_proxy: bool,
    pub is_entity: bool,
    /// Ordinal assigned in the binary stream; meaningless in text form.
    pub class_number: i16,
}

impl ClassRecord {
    pub fn new(record_name: impl Into<String>, cpp_name: impl Into<String>) -> Self {
        ClassRecord {
            record_name: record_name.into(),
            cpp_name: cpp_name.into(),
            ..Default::default()
        }
    }

    /// The declaration for a record name this library knows about.
    pub fn standard(record_name: &str) -> Option<ClassRecord> {
        let (cpp, proxy_flags, is_entity) = STANDARD_CLASSES.get(record_name)?;
        Some(ClassRecord {
            record_name: record_name.to_string(),
            cpp_name: cpp.to_string(),
            app_name: "ObjectDBX Classes".to_string(),
            proxy_flags: *proxy_flags,
            instance_count: 0,
            was_proxy: false,
            is_entity: *is_entity,
            class_number: 0,
        })
    }

    /// Object type code the record name stands for in the binary
    /// stream, `None` for class kinds this library does not decode.
    pub fn to_dwg_type(&self) -> Option<i16> {
        match self.record_name.as_str() {
            "LWPOLYLINE" => Some(0x4D),
            "HATCH" => Some(0x4E),
            "GROUP" => Some(0x48),
            "LAYOUT" => Some(0x52),
            "IMAGE" => Some(0x65),
            "IMAGEDEF" => Some(0x66),
            "ARC_DIMENSION" => Some(0x67),
            _ => None,
        }
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            1 => self.record_name = reader.get_utf8_string()?,
            2 => self.cpp_name = reader.get_utf8_string()?,
            3 => self.app_name = reader.get_utf8_string()?,
            90 => self.proxy_flags = reader.get_int32()?,
            91 => self.instance_count = reader.get_int32()?,
            // Only bit 0 is meaningful; some producers write junk in
            // the upper bits.
            280 => self.was_proxy = reader.get_int16()? & 1 != 0,
            281 => self.is_entity = reader.get_int16()? & 1 != 0,
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        // R12 and older have no class section.
        if !version.is_r13_plus() {
            return Ok(());
        }
        w.write_string(0, "CLASS")?;
        w.write_string(1, &self.record_name)?;
        w.write_string(2, &self.cpp_name)?;
        w.write_string(3, &self.app_name)?;
        w.write_int32(90, self.proxy_flags)?;
        if version.r2004_plus() {
            w.write_int32(91, self.instance_count)?;
        }
        w.write_int16(280, i16::from(self.was_proxy))?;
        w.write_int16(281, i16::from(self.is_entity))?;
        Ok(())
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.class_number = r.get_bit_short()?;
        self.proxy_flags = r.get_bit_short()? as i32;
        self.app_name = r.get_variable_text(version, false)?;
        self.cpp_name = r.get_variable_text(version, false)?;
        self.record_name = r.get_variable_text(version, false)?;
        self.was_proxy = r.get_bit()?;
        self.is_entity = r.get_bit_short()? == ITEM_CLASS_ENTITY;
        if version.r2004_plus() {
            self.instance_count = r.get_bit_long()?;
            // Authoring version and maintenance release, then two
            // reserved longs.
            for _ in 0..4 {
                r.get_bit_long()?;
            }
        }
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_bit_short(0, self.class_number)?;
        w.write_bit_short(90, self.proxy_flags as i16)?;
        w.write_variable_text(3, &self.app_name, version, false)?;
        w.write_variable_text(2, &self.cpp_name, version, false)?;
        w.write_variable_text(1, &self.record_name, version, false)?;
        w.write_bit(280, self.was_proxy)?;
        w.write_bit_short(
            281,
            if self.is_entity {
                ITEM_CLASS_ENTITY
            } else {
                ITEM_CLASS_OBJECT
            },
        )?;
        if version.r2004_plus() {
            w.write_bit_long(91, self.instance_count)?;
            for _ in 0..4 {
                w.write_bit_long(0, 0)?;
            }
        }
        Ok(())
    }
}

impl Default for ClassRecord {
    fn default() -> Self {
        ClassRecord {
            record_name: String::new(),
            cpp_name: String::new(),
            app_name: "ObjectDBX Classes".to_string(),
            proxy_flags: 0,
            instance_count: 0,
            was_proxy: false,
            is_entity: true,
            class_number: 0,
        }
    }
}
