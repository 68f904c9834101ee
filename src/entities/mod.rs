//! Entity model: the shared record header and the dispatch enum.
//!
//! Each entity family lives in its own file and owns its structs, its
//! defaults, `parse_code` for the tagged text stream, `parse_dwg` for the
//! bit-packed body, and the mirrored `write_dxf`/`write_dwg`.
//! `EntityHeader` carries the record data common to every entity; the
//! `Entity` enum is the closed dispatch surface handed to the document
//! container.

use crate::error::{CadError, Result};
use crate::io::bit::{BitReader, BitWriter};
use crate::io::record::{CodeKind, RecordReader, RecordWriter};
use crate::types::{
    CadVersion, Color, Coord, Handle, LineWeight, Transparency, Variant, VariantValue,
};

pub mod arc;
pub mod block;
pub mod circle;
pub mod dimension;
pub mod ellipse;
pub mod hatch;
pub mod image;
pub mod insert;
pub mod leader;
pub mod line;
pub mod lwpolyline;
pub mod mtext;
pub mod point;
pub mod polyline;
pub mod ray;
pub mod spline;
pub mod text;
pub mod trace;
pub mod unknown;
pub mod viewport;

pub use arc::Arc;
pub use block::{Block, BlockEnd};
pub use circle::Circle;
pub use dimension::{
    DimArc, DimAligned, DimAngular2Ln, DimAngular3Pt, DimDiametric, DimLinear, DimOrdinate,
    DimRadial, Dimension, DimensionData,
};
pub use ellipse::Ellipse;
pub use hatch::{Hatch, HatchEdge, HatchLoop, HatchPatternLine, HatchStyle, PatternType};
pub use image::Image;
pub use insert::Insert;
pub use leader::Leader;
pub use line::Line;
pub use lwpolyline::{LwPolyline, LwPolylineFlags, LwVertex};
pub use mtext::{AttachmentPoint, DrawingDirection, MText};
pub use point::Point;
pub use polyline::{Polyline, PolylineFlags, Vertex};
pub use ray::{Ray, XLine};
pub use spline::{Spline, SplineFlags};
pub use text::{Text, TextHAlign, TextVAlign};
pub use trace::{Face3D, Solid, Trace};
pub use unknown::Unknown;
pub use viewport::Viewport;

/// Shadow rendering mode, group 284.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowMode {
    #[default]
    CastAndReceive,
    Cast,
    Receive,
    Ignore,
}

impl ShadowMode {
    /// Decode the raw group value; out-of-range clamps to the default.
    pub fn from_raw(value: i16) -> Self {
        match value {
            1 => ShadowMode::Cast,
            2 => ShadowMode::Receive,
            3 => ShadowMode::Ignore,
            _ => ShadowMode::CastAndReceive,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            ShadowMode::CastAndReceive => 0,
            ShadowMode::Cast => 1,
            ShadowMode::Receive => 2,
            ShadowMode::Ignore => 3,
        }
    }
}

/// One application-data block, group 102.
///
/// The opening group's text (for example `{ACAD_REACTORS`) names the
/// block; the values run to the closing `}` group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppDataGroup {
    pub name: String,
    pub values: Vec<Variant>,
}

impl AppDataGroup {
    pub fn new(name: impl Into<String>) -> Self {
        AppDataGroup {
            name: name.into(),
            values: Vec::new(),
        }
    }
}

/// Record data common to every entity.
///
/// Owns the base group codes in the text stream and the common leading
/// block of every DWG object body.  Entity `parse_code` implementations
/// handle their own codes first and fall back to
/// [`EntityHeader::parse_code`]; `parse_dwg` bodies start with
/// [`EntityHeader::parse_dwg`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityHeader {
    /// Entity handle, group 5
    pub handle: Handle,
    /// Owner block record, soft reference, group 330
    pub owner: Handle,
    /// Layer name, group 8
    pub layer: String,
    /// Layer reference carried only by the binary stream
    pub layer_handle: Handle,
    /// Line type name, group 6
    pub line_type: String,
    /// Line type reference carried only by the binary stream
    pub line_type_handle: Handle,
    /// Material object, group 347
    pub material: Handle,
    /// Color, groups 62/420
    pub color: Color,
    /// Color book name, group 430
    pub color_name: String,
    /// Transparency, group 440
    pub transparency: Transparency,
    /// Line weight, group 370
    pub line_weight: LineWeight,
    /// Line type scale, group 48
    pub ltype_scale: f64,
    /// Visibility, group 60 (0 is visible)
    pub visible: bool,
    /// Paper space flag, group 67
    pub paper_space: bool,
    /// Proxy graphics bytes, groups 92 + 310
    pub proxy_graphics: Vec<u8>,
    /// Plot style object, group 390
    pub plot_style: Handle,
    /// Shadow mode, group 284
    pub shadow_mode: ShadowMode,
    /// Extrusion direction, groups 210/220/230
    pub extrusion: Coord,
    /// Application data blocks, group 102
    pub app_data: Vec<AppDataGroup>,
    /// Extension data, groups 1000-1071, kept in stream order
    pub ext_data: Vec<Variant>,
    // Parse state: groups route into the open 102 block until it closes.
    app_group_open: bool,
}

impl EntityHeader {
    pub fn new() -> Self {
        EntityHeader {
            handle: Handle::NULL,
            owner: Handle::NULL,
            layer: "0".to_string(),
            layer_handle: Handle::NULL,
            line_type: "BYLAYER".to_string(),
            line_type_handle: Handle::NULL,
            material: Handle::NULL,
            color: Color::ByLayer,
            color_name: String::new(),
            transparency: Transparency::ByLayer,
            line_weight: LineWeight::ByLayer,
            ltype_scale: 1.0,
            visible: true,
            paper_space: false,
            proxy_graphics: Vec::new(),
            plot_style: Handle::NULL,
            shadow_mode: ShadowMode::CastAndReceive,
            extrusion: Coord::UNIT_Z,
            app_data: Vec::new(),
            ext_data: Vec::new(),
            app_group_open: false,
        }
    }

    /// Interpret one base group code; `false` means the code is not part
    /// of the shared header and stays with the caller.
    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        if self.app_group_open {
            return self.parse_app_group_code(code, reader).map(|_| true);
        }
        if Variant::is_extension_code(code) {
            return self.parse_extension_code(code, reader).map(|_| true);
        }
        match code {
            5 => self.handle = reader.get_handle()?,
            6 => self.line_type = reader.get_utf8_string()?,
            8 => self.layer = reader.get_utf8_string()?,
            48 => self.ltype_scale = reader.get_double()?,
            60 => self.visible = reader.get_int16()? == 0,
            62 => self.color = Color::from_index(reader.get_int16()?),
            67 => self.paper_space = reader.get_int16()? != 0,
            // Proxy graphics byte count; the bytes follow on 310 chunks.
            92 => {
                reader.get_int32()?;
            }
            // Subclass markers carry no data of their own.
            100 => {
                reader.get_utf8_string()?;
            }
            102 => {
                let name = reader.get_utf8_string()?;
                if name.starts_with('{') {
                    self.app_data.push(AppDataGroup::new(name));
                    self.app_group_open = true;
                }
            }
            210 => self.extrusion.x = reader.get_double()?,
            220 => self.extrusion.y = reader.get_double()?,
            230 => self.extrusion.z = reader.get_double()?,
            284 => self.shadow_mode = ShadowMode::from_raw(reader.get_int16()?),
            310 => {
                let chunk = reader.get_binary_chunk(0)?;
                self.proxy_graphics.extend_from_slice(&chunk);
            }
            330 => self.owner = reader.get_handle()?,
            347 => self.material = reader.get_handle()?,
            370 => self.line_weight = LineWeight::from_raw(reader.get_int16()?),
            390 => self.plot_style = reader.get_handle()?,
            420 => self.color = Color::from_true_color(reader.get_int32()?),
            430 => self.color_name = reader.get_utf8_string()?,
            440 => self.transparency = Transparency::from_packed(reader.get_int32()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parse_app_group_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<()> {
        if code == 102 {
            let text = reader.get_utf8_string()?;
            if text.starts_with('{') {
                self.app_data.push(AppDataGroup::new(text));
            } else {
                self.app_group_open = false;
            }
            return Ok(());
        }
        let var = read_group_variant(code, reader)?;
        if let Some(group) = self.app_data.last_mut() {
            group.values.push(var);
        }
        Ok(())
    }

    /// Extension-data group, codes 1000-1071.  The 101x groups open a
    /// coordinate that the matching 102x/103x groups complete.
    pub fn parse_extension_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<()> {
        if Variant::starts_coord(code) {
            let x = reader.get_double()?;
            self.ext_data
                .push(Variant::new(code, VariantValue::Coord(Coord::new(x, 0.0, 0.0))));
            return Ok(());
        }
        if Variant::continues_coord_y(code) {
            let y = reader.get_double()?;
            if let Some(last) = self.ext_data.last_mut() {
                last.set_coord_y(y);
            }
            return Ok(());
        }
        if Variant::continues_coord_z(code) {
            let z = reader.get_double()?;
            if let Some(last) = self.ext_data.last_mut() {
                last.set_coord_z(z);
            }
            return Ok(());
        }
        let value = if code == 1004 {
            VariantValue::Binary(reader.get_binary_chunk(0)?)
        } else {
            match CodeKind::of(code) {
                CodeKind::Double => VariantValue::Double(reader.get_double()?),
                CodeKind::Int16 => VariantValue::Int(reader.get_int16()? as i32),
                CodeKind::Int32 => VariantValue::Int(reader.get_int32()?),
                _ => VariantValue::Str(reader.get_utf8_string()?),
            }
        };
        self.ext_data.push(Variant::new(code, value));
        Ok(())
    }

    /// Emit the shared header groups that precede an entity's own.
    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        if self.handle.is_valid() {
            w.write_handle(5, self.handle)?;
        }
        for group in &self.app_data {
            w.write_string(102, &group.name)?;
            for var in &group.values {
                write_group_variant(var, w)?;
            }
            w.write_string(102, "}")?;
        }
        if self.owner.is_valid() {
            w.write_handle(330, self.owner)?;
        }
        if version.is_r13_plus() {
            w.write_string(100, "AcDbEntity")?;
        }
        if self.paper_space {
            w.write_int16(67, 1)?;
        }
        w.write_string(8, &self.layer)?;
        if self.line_type != "BYLAYER" {
            w.write_string(6, &self.line_type)?;
        }
        w.write_int16(62, self.color.index())?;
        if let Some(rgb) = self.color.true_color() {
            w.write_int32(420, rgb)?;
        }
        if !self.color_name.is_empty() {
            w.write_string(430, &self.color_name)?;
        }
        if version.r2000_plus() {
            w.write_int16(370, self.line_weight.raw_value())?;
        }
        if self.ltype_scale != 1.0 {
            w.write_double(48, self.ltype_scale)?;
        }
        if !self.visible {
            w.write_int16(60, 1)?;
        }
        if self.transparency != Transparency::ByLayer {
            w.write_int32(440, self.transparency.packed())?;
        }
        if self.material.is_valid() {
            w.write_handle(347, self.material)?;
        }
        if self.plot_style.is_valid() {
            w.write_handle(390, self.plot_style)?;
        }
        if self.shadow_mode != ShadowMode::CastAndReceive {
            w.write_int16(284, self.shadow_mode.raw())?;
        }
        if !self.proxy_graphics.is_empty() {
            w.write_int32(92, self.proxy_graphics.len() as i32)?;
            for chunk in self.proxy_graphics.chunks(128) {
                w.write_binary_chunk(310, chunk)?;
            }
        }
        Ok(())
    }

    /// Emit the extrusion groups when the direction departs from +Z.
    /// Entities that carry an extrusion call this from their own
    /// `write_dxf`, since the group's position varies by type.
    pub fn write_extrusion_dxf(&self, w: &mut dyn RecordWriter) -> Result<()> {
        if self.extrusion != Coord::UNIT_Z {
            w.write_double(210, self.extrusion.x)?;
            w.write_double(220, self.extrusion.y)?;
            w.write_double(230, self.extrusion.z)?;
        }
        Ok(())
    }

    /// Emit the extension-data groups in stored order.  Written after the
    /// entity's own groups.
    pub fn write_ext_data(&self, w: &mut dyn RecordWriter) -> Result<()> {
        for var in &self.ext_data {
            write_group_variant(var, w)?;
        }
        Ok(())
    }

    /// Sequential common block at the head of every DWG object body.
    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.handle = r.get_handle()?;
        self.read_dwg_ext_data(version, r)?;

        if r.get_bit()? {
            let size = r.get_raw_long()?;
            if size < 0 {
                return Err(CadError::Malformed(format!(
                    "negative proxy graphics size {size}"
                )));
            }
            self.proxy_graphics = r.get_binary_chunk(size as usize)?;
        }

        let mode = r.get_2bits()?;
        if mode == 0 {
            self.owner = r.get_handle()?;
        }
        self.paper_space = mode == 1;

        let reactor_count = r.get_bit_long()?;
        let mut xdict_missing = false;
        if version.r2004_plus() {
            xdict_missing = r.get_bit()?;
        }
        if version.r2013_plus() {
            r.get_bit()?;
        }
        for _ in 0..reactor_count.max(0) {
            r.get_handle()?;
        }
        if !xdict_missing {
            r.get_handle()?;
        }

        if version.r13_14_only() {
            self.layer_handle = r.get_handle()?;
            let ltype_by_layer = r.get_bit()?;
            if !ltype_by_layer {
                self.line_type_handle = r.get_handle()?;
            }
        }
        if !version.r2004_plus() {
            let no_links = r.get_bit()?;
            if !no_links {
                r.get_handle()?;
                r.get_handle()?;
            }
        }

        let (color, transparency, book_color) = read_entity_color(version, r)?;
        self.color = color;
        self.transparency = transparency;
        if book_color && version.r2004_plus() {
            r.get_handle()?;
        }

        self.ltype_scale = r.get_bit_double()?;

        if version.r2000_plus() {
            self.layer_handle = r.get_handle()?;
            match r.get_2bits()? {
                0 => self.line_type = "BYLAYER".to_string(),
                1 => self.line_type = "BYBLOCK".to_string(),
                2 => self.line_type = "CONTINUOUS".to_string(),
                _ => self.line_type_handle = r.get_handle()?,
            }
        }
        if version.r2007_plus() {
            if r.get_2bits()? == 3 {
                self.material = r.get_handle()?;
            }
            self.shadow_mode = ShadowMode::from_raw(r.get_raw_char()? as i16);
        }
        if version.r2000_plus() && r.get_2bits()? == 3 {
            self.plot_style = r.get_handle()?;
        }
        if version.r2010_plus() {
            for _ in 0..3 {
                if r.get_bit()? {
                    r.get_handle()?;
                }
            }
        }

        self.visible = r.get_bit_short()? & 1 == 0;
        if version.r2000_plus() {
            self.line_weight = line_weight_from_dwg(r.get_raw_char()?);
        }
        Ok(())
    }

    /// Mirror of [`EntityHeader::parse_dwg`].  Reactor and dictionary
    /// references are not modeled, so the written block carries none.
    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_handle(5, self.handle)?;
        self.write_dwg_ext_data(version, w)?;

        let graphic = !self.proxy_graphics.is_empty();
        w.write_bit(0, graphic)?;
        if graphic {
            w.write_raw_long(92, self.proxy_graphics.len() as i32)?;
            w.write_binary_chunk(310, &self.proxy_graphics)?;
        }

        let mode: u8 = if self.owner.is_valid() {
            0
        } else if self.paper_space {
            1
        } else {
            2
        };
        w.write_2bits(0, mode)?;
        if mode == 0 {
            w.write_handle(330, self.owner)?;
        }

        w.write_bit_long(0, 0)?;
        if version.r2004_plus() {
            w.write_bit(0, true)?;
        }
        if version.r2013_plus() {
            w.write_bit(0, false)?;
        }
        if !version.r2004_plus() {
            // No dictionary-missing flag before 2004; the reference slot
            // is always present.
            w.write_handle(360, Handle::NULL)?;
        }

        if version.r13_14_only() {
            w.write_handle(8, self.layer_handle)?;
            let by_layer = !self.line_type_handle.is_valid();
            w.write_bit(0, by_layer)?;
            if !by_layer {
                w.write_handle(6, self.line_type_handle)?;
            }
        }
        if !version.r2004_plus() {
            w.write_bit(0, true)?;
        }

        write_entity_color(version, self.color, self.transparency, w)?;
        w.write_bit_double(48, self.ltype_scale)?;

        if version.r2000_plus() {
            w.write_handle(8, self.layer_handle)?;
            if self.line_type_handle.is_valid() {
                w.write_2bits(0, 3)?;
                w.write_handle(6, self.line_type_handle)?;
            } else if self.line_type.eq_ignore_ascii_case("BYBLOCK") {
                w.write_2bits(0, 1)?;
            } else if self.line_type.eq_ignore_ascii_case("CONTINUOUS") {
                w.write_2bits(0, 2)?;
            } else {
                w.write_2bits(0, 0)?;
            }
        }
        if version.r2007_plus() {
            if self.material.is_valid() {
                w.write_2bits(0, 3)?;
                w.write_handle(347, self.material)?;
            } else {
                w.write_2bits(0, 0)?;
            }
            w.write_raw_char(284, self.shadow_mode.raw() as u8)?;
        }
        if version.r2000_plus() {
            if self.plot_style.is_valid() {
                w.write_2bits(0, 3)?;
                w.write_handle(390, self.plot_style)?;
            } else {
                w.write_2bits(0, 0)?;
            }
        }
        if version.r2010_plus() {
            for _ in 0..3 {
                w.write_bit(0, false)?;
            }
        }

        w.write_bit_short(60, if self.visible { 0 } else { 1 })?;
        if version.r2000_plus() {
            w.write_raw_char(370, line_weight_to_dwg(self.line_weight))?;
        }
        Ok(())
    }

    fn read_dwg_ext_data(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        loop {
            let size = r.get_bit_short()?;
            if size <= 0 {
                break;
            }
            let app = r.get_handle()?;
            self.ext_data
                .push(Variant::new(1001, VariantValue::Str(app.to_hex())));
            let chunk = r.get_binary_chunk(size as usize)?;
            self.parse_dwg_ext_chunk(chunk, version)?;
        }
        Ok(())
    }

    /// Decode one application's extension-data payload.  An unrecognized
    /// value code abandons the rest of the chunk, as the chunk length
    /// already bounds it.
    fn parse_dwg_ext_chunk(&mut self, chunk: Vec<u8>, version: CadVersion) -> Result<()> {
        let mut sub = BitReader::new(chunk, version);
        while !sub.at_end() {
            let code = sub.get_raw_char()?;
            let var = match code {
                0 => {
                    let len = sub.get_raw_char()? as usize;
                    sub.get_raw_short()?;
                    let bytes = sub.get_binary_chunk(len)?;
                    Variant::new(
                        1000,
                        VariantValue::Str(String::from_utf8_lossy(&bytes).to_string()),
                    )
                }
                1 => {
                    let rc = sub.get_raw_char()?;
                    let text = if rc == b'{' { "{" } else { "}" };
                    Variant::new(1002, VariantValue::Str(text.to_string()))
                }
                2 => Variant::new(1003, VariantValue::Str(sub.get_handle()?.to_hex())),
                3 => {
                    let len = sub.get_raw_char()? as usize;
                    Variant::new(1004, VariantValue::Binary(sub.get_binary_chunk(len)?))
                }
                4 => Variant::new(1005, VariantValue::Str(sub.get_handle()?.to_hex())),
                5 => {
                    let x = sub.get_raw_double()?;
                    let y = sub.get_raw_double()?;
                    let z = sub.get_raw_double()?;
                    Variant::new(1010, VariantValue::Coord(Coord::new(x, y, z)))
                }
                10 => Variant::new(1040, VariantValue::Double(sub.get_raw_double()?)),
                11 => Variant::new(1070, VariantValue::Int(sub.get_raw_short()? as i32)),
                12 => Variant::new(1071, VariantValue::Int(sub.get_raw_long()?)),
                _ => break,
            };
            self.ext_data.push(var);
        }
        Ok(())
    }

    fn write_dwg_ext_data(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        let mut app = Handle::NULL;
        let mut payload: Vec<&Variant> = Vec::new();
        let flush =
            |app: Handle, payload: &mut Vec<&Variant>, w: &mut dyn RecordWriter| -> Result<()> {
                if payload.is_empty() {
                    return Ok(());
                }
                let bytes = encode_dwg_ext_payload(payload, version)?;
                if bytes.len() > i16::MAX as usize {
                    return Err(CadError::Malformed(format!(
                        "extension data payload of {} bytes exceeds the size field",
                        bytes.len()
                    )));
                }
                w.write_bit_short(0, bytes.len() as i16)?;
                w.write_handle(1001, app)?;
                w.write_binary_chunk(0, &bytes)?;
                payload.clear();
                Ok(())
            };

        for var in &self.ext_data {
            if var.code == 1001 {
                flush(app, &mut payload, w)?;
                app = match &var.value {
                    VariantValue::Str(s) => Handle::from_hex(s).unwrap_or(Handle::NULL),
                    _ => Handle::NULL,
                };
                continue;
            }
            payload.push(var);
        }
        flush(app, &mut payload, w)?;
        // Terminator.
        w.write_bit_short(0, 0)
    }
}

impl Default for EntityHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode extension-data variants into the byte payload of one
/// application block.  Every value form is a whole number of bytes, so
/// the buffer length is the declared block size.
fn encode_dwg_ext_payload(payload: &[&Variant], version: CadVersion) -> Result<Vec<u8>> {
    let mut sub = BitWriter::new(version);
    for var in payload {
        match (&var.value, var.code) {
            (VariantValue::Str(s), 1002) => {
                sub.write_raw_char(0, 1)?;
                sub.write_raw_char(0, if s == "{" { b'{' } else { b'}' })?;
            }
            (VariantValue::Str(s), 1003) => {
                sub.write_raw_char(0, 2)?;
                sub.write_handle(1003, Handle::from_hex(s).unwrap_or(Handle::NULL))?;
            }
            (VariantValue::Str(s), 1005) => {
                sub.write_raw_char(0, 4)?;
                sub.write_handle(1005, Handle::from_hex(s).unwrap_or(Handle::NULL))?;
            }
            (VariantValue::Str(s), _) => {
                let bytes = s.as_bytes();
                if bytes.len() > u8::MAX as usize {
                    return Err(CadError::Malformed(format!(
                        "extension string of {} bytes exceeds the length field",
                        bytes.len()
                    )));
                }
                sub.write_raw_char(0, 0)?;
                sub.write_raw_char(0, bytes.len() as u8)?;
                sub.write_raw_short(0, 30)?;
                sub.write_binary_chunk(0, bytes)?;
            }
            (VariantValue::Binary(b), _) => {
                if b.len() > u8::MAX as usize {
                    return Err(CadError::Malformed(format!(
                        "extension chunk of {} bytes exceeds the length field",
                        b.len()
                    )));
                }
                sub.write_raw_char(0, 3)?;
                sub.write_raw_char(0, b.len() as u8)?;
                sub.write_binary_chunk(0, b)?;
            }
            (VariantValue::Coord(c), _) => {
                sub.write_raw_char(0, 5)?;
                sub.write_raw_double(0, c.x)?;
                sub.write_raw_double(0, c.y)?;
                sub.write_raw_double(0, c.z)?;
            }
            (VariantValue::Double(d), _) => {
                sub.write_raw_char(0, 10)?;
                sub.write_raw_double(0, *d)?;
            }
            (VariantValue::Int(i), 1071) => {
                sub.write_raw_char(0, 12)?;
                sub.write_raw_long(0, *i)?;
            }
            (VariantValue::Int(i), _) => {
                sub.write_raw_char(0, 11)?;
                sub.write_raw_short(0, *i as i16)?;
            }
        }
    }
    Ok(sub.into_data())
}

/// Typed read of one group by its code classification, for app-data
/// blocks whose contents are free-form.
fn read_group_variant(code: i32, reader: &mut dyn RecordReader) -> Result<Variant> {
    let value = match CodeKind::of(code) {
        CodeKind::Double => VariantValue::Double(reader.get_double()?),
        CodeKind::Int16 => VariantValue::Int(reader.get_int16()? as i32),
        CodeKind::Int32 | CodeKind::Int64 => VariantValue::Int(reader.get_int32()?),
        CodeKind::Handle => VariantValue::Str(reader.get_handle()?.to_hex()),
        CodeKind::Bool => VariantValue::Int(reader.get_bool()? as i32),
        CodeKind::Binary => VariantValue::Binary(reader.get_binary_chunk(0)?),
        CodeKind::Str => VariantValue::Str(reader.get_utf8_string()?),
    };
    Ok(Variant::new(code, value))
}

/// Re-emit one stored group under its original code.
fn write_group_variant(var: &Variant, w: &mut dyn RecordWriter) -> Result<()> {
    match &var.value {
        VariantValue::Str(s) => {
            if CodeKind::of(var.code) == CodeKind::Handle {
                if let Some(h) = Handle::from_hex(s) {
                    return w.write_handle(var.code, h);
                }
            }
            w.write_string(var.code, s)
        }
        VariantValue::Int(i) => match CodeKind::of(var.code) {
            CodeKind::Int16 => w.write_int16(var.code, *i as i16),
            CodeKind::Bool => w.write_bool(var.code, *i != 0),
            _ => w.write_int32(var.code, *i),
        },
        VariantValue::Double(d) => w.write_double(var.code, *d),
        VariantValue::Coord(c) => {
            w.write_double(var.code, c.x)?;
            w.write_double(var.code + 10, c.y)?;
            w.write_double(var.code + 20, c.z)
        }
        VariantValue::Binary(b) => w.write_binary_chunk(var.code, b),
    }
}

/// Entity color in the DWG common block.  2004 and newer pack flags into
/// the index short and may append a true-color long and a transparency
/// long; the returned bool reports a color-book reference, whose handle
/// follows the block.
fn read_entity_color(
    version: CadVersion,
    r: &mut dyn RecordReader,
) -> Result<(Color, Transparency, bool)> {
    if !version.r2004_plus() {
        let index = r.get_bit_short()?;
        return Ok((Color::from_index(index), Transparency::ByLayer, false));
    }
    let size = r.get_bit_short()?;
    if size == 0 {
        return Ok((Color::ByBlock, Transparency::ByLayer, false));
    }
    let flags = (size as u16) & 0xFF00;
    let mut book_color = false;
    let color = if flags & 0x4000 != 0 {
        book_color = true;
        Color::ByBlock
    } else if flags & 0x8000 != 0 {
        let arr = (r.get_bit_long()? as u32).to_le_bytes();
        Color::from_rgb(arr[2], arr[1], arr[0])
    } else {
        Color::from_index((size & 0x0FFF) as i16)
    };
    let transparency = if flags & 0x2000 != 0 {
        Transparency::from_packed(r.get_bit_long()?)
    } else {
        Transparency::ByLayer
    };
    Ok((color, transparency, book_color))
}

fn write_entity_color(
    version: CadVersion,
    color: Color,
    transparency: Transparency,
    w: &mut dyn RecordWriter,
) -> Result<()> {
    if !version.r2004_plus() {
        return w.write_bit_short(62, color.index());
    }
    let has_transparency = transparency != Transparency::ByLayer;
    if color == Color::ByBlock && !has_transparency {
        return w.write_bit_short(62, 0);
    }
    let mut size: u16 = 0;
    if has_transparency {
        size |= 0x2000;
    }
    let rgb = color.true_color();
    if rgb.is_some() {
        size |= 0x8000;
    } else {
        size |= (color.index() as u16) & 0x0FFF;
    }
    w.write_bit_short(62, size as i16)?;
    if let Some(packed) = rgb {
        let arr = [
            (packed & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            ((packed >> 16) & 0xFF) as u8,
            0xC2,
        ];
        w.write_bit_long(420, u32::from_le_bytes(arr) as i32)?;
    }
    if has_transparency {
        w.write_bit_long(440, transparency.packed())?;
    }
    Ok(())
}

/// Line weight byte in the DWG common block: indices into the standard
/// width table, with 29/30/31 for the symbolic values.
fn line_weight_from_dwg(code: u8) -> LineWeight {
    const WIDTHS: [i16; 24] = [
        0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120, 140, 158,
        200, 211,
    ];
    match code {
        29 => LineWeight::ByLayer,
        30 => LineWeight::ByBlock,
        c if (c as usize) < WIDTHS.len() => LineWeight::Value(WIDTHS[c as usize]),
        _ => LineWeight::Default,
    }
}

fn line_weight_to_dwg(weight: LineWeight) -> u8 {
    const WIDTHS: [i16; 24] = [
        0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120, 140, 158,
        200, 211,
    ];
    match weight {
        LineWeight::ByLayer => 29,
        LineWeight::ByBlock => 30,
        LineWeight::Default => 31,
        LineWeight::Value(v) => WIDTHS
            .iter()
            .position(|w| *w == v)
            .map(|i| i as u8)
            .unwrap_or(31),
    }
}

/// Closed dispatch enum over every supported entity kind.
///
/// Type names or opcodes outside this set clamp to [`Unknown`], which
/// swallows groups without failing the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Point(Point),
    Line(Line),
    Ray(Ray),
    XLine(XLine),
    Arc(Arc),
    Circle(Circle),
    Ellipse(Ellipse),
    Trace(Trace),
    Solid(Solid),
    Face3D(Face3D),
    Polyline(Polyline),
    LwPolyline(LwPolyline),
    Spline(Spline),
    Hatch(Hatch),
    Insert(Insert),
    Block(Block),
    BlockEnd(BlockEnd),
    Text(Text),
    MText(MText),
    Dimension(Dimension),
    Leader(Leader),
    Image(Image),
    Viewport(Viewport),
    Unknown(Unknown),
}

impl Entity {
    /// Construct an empty entity for a code-0 type name.  Unrecognized
    /// names clamp to `Unknown` carrying the name.
    pub fn from_type_name(name: &str) -> Entity {
        match name {
            "POINT" => Entity::Point(Point::default()),
            "LINE" => Entity::Line(Line::default()),
            "RAY" => Entity::Ray(Ray::default()),
            "XLINE" => Entity::XLine(XLine::default()),
            "ARC" => Entity::Arc(Arc::default()),
            "CIRCLE" => Entity::Circle(Circle::default()),
            "ELLIPSE" => Entity::Ellipse(Ellipse::default()),
            "TRACE" => Entity::Trace(Trace::default()),
            "SOLID" => Entity::Solid(Solid::default()),
            "3DFACE" => Entity::Face3D(Face3D::default()),
            "POLYLINE" => Entity::Polyline(Polyline::default()),
            "LWPOLYLINE" => Entity::LwPolyline(LwPolyline::default()),
            "SPLINE" => Entity::Spline(Spline::default()),
            "HATCH" => Entity::Hatch(Hatch::default()),
            "INSERT" => Entity::Insert(Insert::default()),
            "BLOCK" => Entity::Block(Block::default()),
            "ENDBLK" => Entity::BlockEnd(BlockEnd::default()),
            "TEXT" => Entity::Text(Text::default()),
            "MTEXT" => Entity::MText(MText::default()),
            "DIMENSION" => Entity::Dimension(Dimension::default()),
            "ARC_DIMENSION" => Entity::Dimension(Dimension::Arc(DimArc::default())),
            "LEADER" => Entity::Leader(Leader::default()),
            "IMAGE" => Entity::Image(Image::default()),
            "VIEWPORT" => Entity::Viewport(Viewport::default()),
            _ => Entity::Unknown(Unknown::named(name)),
        }
    }

    /// The code-0 type name this entity writes.
    pub fn type_name(&self) -> &str {
        match self {
            Entity::Point(_) => "POINT",
            Entity::Line(_) => "LINE",
            Entity::Ray(_) => "RAY",
            Entity::XLine(_) => "XLINE",
            Entity::Arc(_) => "ARC",
            Entity::Circle(_) => "CIRCLE",
            Entity::Ellipse(_) => "ELLIPSE",
            Entity::Trace(_) => "TRACE",
            Entity::Solid(_) => "SOLID",
            Entity::Face3D(_) => "3DFACE",
            Entity::Polyline(_) => "POLYLINE",
            Entity::LwPolyline(_) => "LWPOLYLINE",
            Entity::Spline(_) => "SPLINE",
            Entity::Hatch(_) => "HATCH",
            Entity::Insert(_) => "INSERT",
            Entity::Block(_) => "BLOCK",
            Entity::BlockEnd(_) => "ENDBLK",
            Entity::Text(_) => "TEXT",
            Entity::MText(_) => "MTEXT",
            Entity::Dimension(d) => d.type_name(),
            Entity::Leader(_) => "LEADER",
            Entity::Image(_) => "IMAGE",
            Entity::Viewport(_) => "VIEWPORT",
            Entity::Unknown(u) => &u.name,
        }
    }

    pub fn common(&self) -> &EntityHeader {
        match self {
            Entity::Point(e) => &e.common,
            Entity::Line(e) => &e.common,
            Entity::Ray(e) => &e.common,
            Entity::XLine(e) => &e.common,
            Entity::Arc(e) => &e.common,
            Entity::Circle(e) => &e.common,
            Entity::Ellipse(e) => &e.common,
            Entity::Trace(e) => &e.common,
            Entity::Solid(e) => &e.common,
            Entity::Face3D(e) => &e.common,
            Entity::Polyline(e) => &e.common,
            Entity::LwPolyline(e) => &e.common,
            Entity::Spline(e) => &e.common,
            Entity::Hatch(e) => &e.common,
            Entity::Insert(e) => &e.common,
            Entity::Block(e) => &e.common,
            Entity::BlockEnd(e) => &e.common,
            Entity::Text(e) => &e.common,
            Entity::MText(e) => &e.common,
            Entity::Dimension(e) => &e.data().common,
            Entity::Leader(e) => &e.common,
            Entity::Image(e) => &e.common,
            Entity::Viewport(e) => &e.common,
            Entity::Unknown(e) => &e.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut EntityHeader {
        match self {
            Entity::Point(e) => &mut e.common,
            Entity::Line(e) => &mut e.common,
            Entity::Ray(e) => &mut e.common,
            Entity::XLine(e) => &mut e.common,
            Entity::Arc(e) => &mut e.common,
            Entity::Circle(e) => &mut e.common,
            Entity::Ellipse(e) => &mut e.common,
            Entity::Trace(e) => &mut e.common,
            Entity::Solid(e) => &mut e.common,
            Entity::Face3D(e) => &mut e.common,
            Entity::Polyline(e) => &mut e.common,
            Entity::LwPolyline(e) => &mut e.common,
            Entity::Spline(e) => &mut e.common,
            Entity::Hatch(e) => &mut e.common,
            Entity::Insert(e) => &mut e.common,
            Entity::Block(e) => &mut e.common,
            Entity::BlockEnd(e) => &mut e.common,
            Entity::Text(e) => &mut e.common,
            Entity::MText(e) => &mut e.common,
            Entity::Dimension(e) => &mut e.data_mut().common,
            Entity::Leader(e) => &mut e.common,
            Entity::Image(e) => &mut e.common,
            Entity::Viewport(e) => &mut e.common,
            Entity::Unknown(e) => &mut e.common,
        }
    }

    /// Route one tagged group to the entity.  Returns `false` when
    /// neither the entity nor the shared header recognizes the code.
    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match self {
            Entity::Point(e) => e.parse_code(code, reader),
            Entity::Line(e) => e.parse_code(code, reader),
            Entity::Ray(e) => e.parse_code(code, reader),
            Entity::XLine(e) => e.parse_code(code, reader),
            Entity::Arc(e) => e.parse_code(code, reader),
            Entity::Circle(e) => e.parse_code(code, reader),
            Entity::Ellipse(e) => e.parse_code(code, reader),
            Entity::Trace(e) => e.parse_code(code, reader),
            Entity::Solid(e) => e.parse_code(code, reader),
            Entity::Face3D(e) => e.parse_code(code, reader),
            Entity::Polyline(e) => e.parse_code(code, reader),
            Entity::LwPolyline(e) => e.parse_code(code, reader),
            Entity::Spline(e) => e.parse_code(code, reader),
            Entity::Hatch(e) => e.parse_code(code, reader),
            Entity::Insert(e) => e.parse_code(code, reader),
            Entity::Block(e) => e.parse_code(code, reader),
            Entity::BlockEnd(e) => e.parse_code(code, reader),
            Entity::Text(e) => e.parse_code(code, reader),
            Entity::MText(e) => e.parse_code(code, reader),
            Entity::Dimension(e) => e.parse_code(code, reader),
            Entity::Leader(e) => e.parse_code(code, reader),
            Entity::Image(e) => e.parse_code(code, reader),
            Entity::Viewport(e) => e.parse_code(code, reader),
            Entity::Unknown(e) => e.parse_code(code, reader),
        }
    }

    /// Emit the full tagged form, starting with the code-0 type record.
    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        match self {
            Entity::Point(e) => e.write_dxf(version, w),
            Entity::Line(e) => e.write_dxf(version, w),
            Entity::Ray(e) => e.write_dxf(version, w),
            Entity::XLine(e) => e.write_dxf(version, w),
            Entity::Arc(e) => e.write_dxf(version, w),
            Entity::Circle(e) => e.write_dxf(version, w),
            Entity::Ellipse(e) => e.write_dxf(version, w),
            Entity::Trace(e) => e.write_dxf(version, w),
            Entity::Solid(e) => e.write_dxf(version, w),
            Entity::Face3D(e) => e.write_dxf(version, w),
            Entity::Polyline(e) => e.write_dxf(version, w),
            Entity::LwPolyline(e) => e.write_dxf(version, w),
            Entity::Spline(e) => e.write_dxf(version, w),
            Entity::Hatch(e) => e.write_dxf(version, w),
            Entity::Insert(e) => e.write_dxf(version, w),
            Entity::Block(e) => e.write_dxf(version, w),
            Entity::BlockEnd(e) => e.write_dxf(version, w),
            Entity::Text(e) => e.write_dxf(version, w),
            Entity::MText(e) => e.write_dxf(version, w),
            Entity::Dimension(e) => e.write_dxf(version, w),
            Entity::Leader(e) => e.write_dxf(version, w),
            Entity::Image(e) => e.write_dxf(version, w),
            Entity::Viewport(e) => e.write_dxf(version, w),
            Entity::Unknown(e) => e.write_dxf(version, w),
        }
    }

    /// Construct an empty entity for a binary object type code.  `None`
    /// for codes with no counterpart here; vertex and sequence-end codes
    /// belong to the stream layer, which folds them into the polyline.
    pub fn from_dwg_type(opcode: i16) -> Option<Entity> {
        let entity = match opcode {
            0x01 => Entity::Text(Text::default()),
            0x04 => Entity::Block(Block::default()),
            0x05 => Entity::BlockEnd(BlockEnd::default()),
            0x07 | 0x08 => Entity::Insert(Insert::default()),
            0x0F => Entity::Polyline(Polyline::default()),
            0x10 => {
                let mut p = Polyline::default();
                p.flags = PolylineFlags::POLYLINE_3D;
                Entity::Polyline(p)
            }
            0x11 => Entity::Arc(Arc::default()),
            0x12 => Entity::Circle(Circle::default()),
            0x13 => Entity::Line(Line::default()),
            0x14 => Entity::Dimension(Dimension::Ordinate(DimOrdinate::default())),
            0x15 => Entity::Dimension(Dimension::Linear(DimLinear::default())),
            0x16 => Entity::Dimension(Dimension::Aligned(DimAligned::default())),
            0x17 => Entity::Dimension(Dimension::Angular3Pt(DimAngular3Pt::default())),
            0x18 => Entity::Dimension(Dimension::Angular2Ln(DimAngular2Ln::default())),
            0x19 => Entity::Dimension(Dimension::Radial(DimRadial::default())),
            0x1A => Entity::Dimension(Dimension::Diametric(DimDiametric::default())),
            0x1B => Entity::Point(Point::default()),
            0x1C => Entity::Face3D(Face3D::default()),
            0x1F => Entity::Solid(Solid::default()),
            0x20 => Entity::Trace(Trace::default()),
            0x22 => Entity::Viewport(Viewport::default()),
            0x23 => Entity::Ellipse(Ellipse::default()),
            0x24 => Entity::Spline(Spline::default()),
            0x28 => Entity::Ray(Ray::default()),
            0x29 => Entity::XLine(XLine::default()),
            0x2C => Entity::MText(MText::default()),
            0x2D => Entity::Leader(Leader::default()),
            0x4D => Entity::LwPolyline(LwPolyline::default()),
            0x4E => Entity::Hatch(Hatch::default()),
            0x65 => Entity::Image(Image::default()),
            0x67 => Entity::Dimension(Dimension::Arc(DimArc::default())),
            _ => return None,
        };
        Some(entity)
    }

    /// Binary object type code this entity writes under, `None` for
    /// entities with no binary form.
    pub fn dwg_type(&self) -> Option<i16> {
        let opcode = match self {
            Entity::Text(_) => 0x01,
            Entity::Block(_) => 0x04,
            Entity::BlockEnd(_) => 0x05,
            Entity::Insert(e) => {
                if e.is_array() {
                    0x08
                } else {
                    0x07
                }
            }
            Entity::Polyline(e) => {
                if e.is_3d() {
                    0x10
                } else {
                    0x0F
                }
            }
            Entity::Arc(_) => 0x11,
            Entity::Circle(_) => 0x12,
            Entity::Line(_) => 0x13,
            Entity::Dimension(d) => match d {
                Dimension::Ordinate(_) => 0x14,
                Dimension::Linear(_) => 0x15,
                Dimension::Aligned(_) => 0x16,
                Dimension::Angular3Pt(_) => 0x17,
                Dimension::Angular2Ln(_) => 0x18,
                Dimension::Radial(_) => 0x19,
                Dimension::Diametric(_) => 0x1A,
                Dimension::Arc(_) => 0x67,
            },
            Entity::Point(_) => 0x1B,
            Entity::Face3D(_) => 0x1C,
            Entity::Solid(_) => 0x1F,
            Entity::Trace(_) => 0x20,
            Entity::Viewport(_) => 0x22,
            Entity::Ellipse(_) => 0x23,
            Entity::Spline(_) => 0x24,
            Entity::Ray(_) => 0x28,
            Entity::XLine(_) => 0x29,
            Entity::MText(_) => 0x2C,
            Entity::Leader(_) => 0x2D,
            Entity::LwPolyline(_) => 0x4D,
            Entity::Hatch(_) => 0x4E,
            Entity::Image(_) => 0x65,
            Entity::Unknown(_) => return None,
        };
        Some(opcode)
    }

    /// Parse the binary body for a variant built by [`Entity::from_dwg_type`].
    /// The opcode distinguishes bodies that share a variant.
    pub fn parse_dwg(
        &mut self,
        version: CadVersion,
        r: &mut dyn RecordReader,
        opcode: i16,
    ) -> Result<()> {
        match self {
            Entity::Point(e) => e.parse_dwg(version, r),
            Entity::Line(e) => e.parse_dwg(version, r),
            Entity::Ray(e) => e.parse_dwg(version, r),
            Entity::XLine(e) => e.parse_dwg(version, r),
            Entity::Arc(e) => e.parse_dwg(version, r),
            Entity::Circle(e) => e.parse_dwg(version, r),
            Entity::Ellipse(e) => e.parse_dwg(version, r),
            Entity::Trace(e) => e.parse_dwg(version, r),
            Entity::Solid(e) => e.parse_dwg(version, r),
            Entity::Face3D(e) => e.parse_dwg(version, r),
            Entity::Polyline(e) => e.parse_dwg(version, r, opcode == 0x10),
            Entity::LwPolyline(e) => e.parse_dwg(version, r),
            Entity::Spline(e) => e.parse_dwg(version, r),
            Entity::Hatch(e) => e.parse_dwg(version, r),
            Entity::Insert(e) => e.parse_dwg(version, r, opcode == 0x08),
            Entity::Block(e) => e.parse_dwg(version, r),
            Entity::BlockEnd(e) => e.parse_dwg(version, r),
            Entity::Text(e) => e.parse_dwg(version, r),
            Entity::MText(e) => e.parse_dwg(version, r),
            Entity::Dimension(e) => e.parse_dwg(version, r),
            Entity::Leader(e) => e.parse_dwg(version, r),
            Entity::Image(e) => e.parse_dwg(version, r),
            Entity::Viewport(e) => e.parse_dwg(version, r),
            Entity::Unknown(e) => Err(CadError::InvalidEntityType(e.name.clone())),
        }
    }

    /// Emit the binary body under the type from [`Entity::dwg_type`].
    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        match self {
            Entity::Point(e) => e.write_dwg(version, w),
            Entity::Line(e) => e.write_dwg(version, w),
            Entity::Ray(e) => e.write_dwg(version, w),
            Entity::XLine(e) => e.write_dwg(version, w),
            Entity::Arc(e) => e.write_dwg(version, w),
            Entity::Circle(e) => e.write_dwg(version, w),
            Entity::Ellipse(e) => e.write_dwg(version, w),
            Entity::Trace(e) => e.write_dwg(version, w),
            Entity::Solid(e) => e.write_dwg(version, w),
            Entity::Face3D(e) => e.write_dwg(version, w),
            Entity::Polyline(e) => e.write_dwg(version, w),
            Entity::LwPolyline(e) => e.write_dwg(version, w),
            Entity::Spline(e) => e.write_dwg(version, w),
            Entity::Hatch(e) => e.write_dwg(version, w),
            Entity::Insert(e) => e.write_dwg(version, w),
            Entity::Block(e) => e.write_dwg(version, w),
            Entity::BlockEnd(e) => e.write_dwg(version, w),
            Entity::Text(e) => e.write_dwg(version, w),
            Entity::MText(e) => e.write_dwg(version, w),
            Entity::Dimension(e) => e.write_dwg(version, w),
            Entity::Leader(e) => e.write_dwg(version, w),
            Entity::Image(e) => e.write_dwg(version, w),
            Entity::Viewport(e) => e.write_dwg(version, w),
            Entity::Unknown(e) => Err(CadError::InvalidEntityType(e.name.clone())),
        }
    }
}
