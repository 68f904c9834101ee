//! Single-line text entity.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord, Handle};

use super::EntityHeader;

/// Horizontal text justification, group 72.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextHAlign {
    #[default]
    Left,
    Center,
    Right,
    /// Fit between two points, height preserved.
    Aligned,
    Middle,
    /// Fit between two points, height adjusted.
    Fit,
}

impl TextHAlign {
    pub fn from_raw(value: i16) -> Self {
        match value {
            1 => TextHAlign::Center,
            2 => TextHAlign::Right,
            3 => TextHAlign::Aligned,
            4 => TextHAlign::Middle,
            5 => TextHAlign::Fit,
            _ => TextHAlign::Left,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            TextHAlign::Left => 0,
            TextHAlign::Center => 1,
            TextHAlign::Right => 2,
            TextHAlign::Aligned => 3,
            TextHAlign::Middle => 4,
            TextHAlign::Fit => 5,
        }
    }
}

/// Vertical text justification, group 73.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextVAlign {
    #[default]
    Baseline,
    Bottom,
    Middle,
    Top,
}

impl TextVAlign {
    pub fn from_raw(value: i16) -> Self {
        match value {
            1 => TextVAlign::Bottom,
            2 => TextVAlign::Middle,
            3 => TextVAlign::Top,
            _ => TextVAlign::Baseline,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            TextVAlign::Baseline => 0,
            TextVAlign::Bottom => 1,
            TextVAlign::Middle => 2,
            TextVAlign::Top => 3,
        }
    }
}

/// Text generation flags, group 71.
pub mod text_generation {
    pub const BACKWARD: i16 = 2;
    pub const UPSIDE_DOWN: i16 = 4;
}

/// A single line of text.
///
/// The alignment point is meaningful only when a non-default
/// justification is set.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 1 | Text value |
/// | 10, 20, 30 | Insertion point |
/// | 11, 21, 31 | Alignment point |
/// | 40 | Height |
/// | 41 | Width factor (default 1) |
/// | 50 | Rotation (degrees) |
/// | 51 | Oblique angle (degrees) |
/// | 7 | Style name (default STANDARD) |
/// | 71 | Generation flags |
/// | 72, 73 | Horizontal / vertical justification |
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub common: EntityHeader,
    pub value: String,
    pub insert_point: Coord,
    pub align_point: Coord,
    pub height: f64,
    /// Rotation in radians.
    pub rotation: f64,
    pub width_factor: f64,
    /// Oblique angle in radians.
    pub oblique: f64,
    pub style: String,
    pub generation: i16,
    pub h_align: TextHAlign,
    pub v_align: TextVAlign,
    pub thickness: f64,
    /// Style reference carried only by the binary stream.
    pub style_handle: Handle,
}

impl Text {
    pub fn new(value: impl Into<String>, insert_point: Coord, height: f64) -> Self {
        Text {
            common: EntityHeader::new(),
            value: value.into(),
            insert_point,
            align_point: Coord::ZERO,
            height,
            rotation: 0.0,
            width_factor: 1.0,
            oblique: 0.0,
            style: "STANDARD".to_string(),
            generation: 0,
            h_align: TextHAlign::Left,
            v_align: TextVAlign::Baseline,
            thickness: 0.0,
            style_handle: Handle::NULL,
        }
    }

    pub fn is_backward(&self) -> bool {
        self.generation & text_generation::BACKWARD != 0
    }

    pub fn is_upside_down(&self) -> bool {
        self.generation & text_generation::UPSIDE_DOWN != 0
    }

    fn uses_alignment(&self) -> bool {
        self.h_align != TextHAlign::Left || self.v_align != TextVAlign::Baseline
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            1 => self.value = reader.get_utf8_string()?,
            7 => self.style = reader.get_utf8_string()?,
            10 => self.insert_point.x = reader.get_double()?,
            20 => self.insert_point.y = reader.get_double()?,
            30 => self.insert_point.z = reader.get_double()?,
            11 => self.align_point.x = reader.get_double()?,
            21 => self.align_point.y = reader.get_double()?,
            31 => self.align_point.z = reader.get_double()?,
            39 => self.thickness = reader.get_double()?,
            40 => self.height = reader.get_double()?,
            41 => self.width_factor = reader.get_double()?,
            50 => self.rotation = reader.get_double()?.to_radians(),
            51 => self.oblique = reader.get_double()?.to_radians(),
            71 => self.generation = reader.get_int16()?,
            72 => self.h_align = TextHAlign::from_raw(reader.get_int16()?),
            73 => self.v_align = TextVAlign::from_raw(reader.get_int16()?),
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "TEXT")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbText")?;
        }
        if self.thickness != 0.0 {
            w.write_double(39, self.thickness)?;
        }
        w.write_coord(10, self.insert_point)?;
        w.write_double(40, self.height)?;
        w.write_string(1, &self.value)?;
        if self.rotation != 0.0 {
            w.write_double(50, self.rotation.to_degrees())?;
        }
        if self.width_factor != 1.0 {
            w.write_double(41, self.width_factor)?;
        }
        if self.oblique != 0.0 {
            w.write_double(51, self.oblique.to_degrees())?;
        }
        if self.style != "STANDARD" {
            w.write_string(7, &self.style)?;
        }
        if self.generation != 0 {
            w.write_int16(71, self.generation)?;
        }
        if self.h_align != TextHAlign::Left {
            w.write_int16(72, self.h_align.raw())?;
        }
        if self.uses_alignment() {
            w.write_coord(11, self.align_point)?;
        }
        self.common.write_extrusion_dxf(w)?;
        // The vertical justification sits in its own subclass block.
        if version.is_r13_plus() {
            w.write_string(100, "AcDbText")?;
        }
        if self.v_align != TextVAlign::Baseline {
            w.write_int16(73, self.v_align.raw())?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        if version.r2000_plus() {
            let flags = r.get_raw_char()?;
            let elevation = if flags & 0x01 == 0 { r.get_raw_double()? } else { 0.0 };
            let ins = r.get_raw_coord2()?;
            self.insert_point = Coord::new(ins.x, ins.y, elevation);
            if flags & 0x02 == 0 {
                let ax = r.get_bit_double_default(ins.x)?;
                let ay = r.get_bit_double_default(ins.y)?;
                self.align_point = Coord::new(ax, ay, elevation);
            } else {
                self.align_point = self.insert_point;
            }
            self.common.extrusion = r.get_extrusion(version)?;
            self.thickness = r.get_thickness(version)?;
            self.oblique = if flags & 0x04 == 0 { r.get_raw_double()? } else { 0.0 };
            self.rotation = if flags & 0x08 == 0 { r.get_raw_double()? } else { 0.0 };
            self.height = r.get_raw_double()?;
            self.width_factor = if flags & 0x10 == 0 { r.get_raw_double()? } else { 1.0 };
            self.value = r.get_variable_text(version, false)?;
            self.generation = if flags & 0x20 == 0 { r.get_bit_short()? } else { 0 };
            self.h_align = if flags & 0x40 == 0 {
                TextHAlign::from_raw(r.get_bit_short()?)
            } else {
                TextHAlign::Left
            };
            self.v_align = if flags & 0x80 == 0 {
                TextVAlign::from_raw(r.get_bit_short()?)
            } else {
                TextVAlign::Baseline
            };
        } else {
            let elevation = r.get_bit_double()?;
            let ins = r.get_raw_coord2()?;
            self.insert_point = Coord::new(ins.x, ins.y, elevation);
            let align = r.get_raw_coord2()?;
            self.align_point = Coord::new(align.x, align.y, elevation);
            self.common.extrusion = r.get_extrusion(version)?;
            self.thickness = r.get_thickness(version)?;
            self.oblique = r.get_bit_double()?;
            self.rotation = r.get_bit_double()?;
            self.height = r.get_bit_double()?;
            self.width_factor = r.get_bit_double()?;
            self.value = r.get_variable_text(version, false)?;
            self.generation = r.get_bit_short()?;
            self.h_align = TextHAlign::from_raw(r.get_bit_short()?);
            self.v_align = TextVAlign::from_raw(r.get_bit_short()?);
        }
        self.style_handle = r.get_handle()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        if version.r2000_plus() {
            let mut flags: u8 = 0;
            let elevation = self.insert_point.z;
            if elevation == 0.0 {
                flags |= 0x01;
            }
            let align_is_default = self.align_point.x == self.insert_point.x
                && self.align_point.y == self.insert_point.y;
            if align_is_default {
                flags |= 0x02;
            }
            if self.oblique == 0.0 {
                flags |= 0x04;
            }
            if self.rotation == 0.0 {
                flags |= 0x08;
            }
            if self.width_factor == 1.0 {
                flags |= 0x10;
            }
            if self.generation == 0 {
                flags |= 0x20;
            }
            if self.h_align == TextHAlign::Left {
                flags |= 0x40;
            }
            if self.v_align == TextVAlign::Baseline {
                flags |= 0x80;
            }
            w.write_raw_char(0, flags)?;
            if flags & 0x01 == 0 {
                w.write_raw_double(30, elevation)?;
            }
            w.write_raw_coord2(10, self.insert_point)?;
            if flags & 0x02 == 0 {
                w.write_bit_double_default(11, self.align_point.x, self.insert_point.x)?;
                w.write_bit_double_default(21, self.align_point.y, self.insert_point.y)?;
            }
            w.write_extrusion(210, self.common.extrusion, version)?;
            w.write_thickness(39, self.thickness, version)?;
            if flags & 0x04 == 0 {
                w.write_raw_double(51, self.oblique)?;
            }
            if flags & 0x08 == 0 {
                w.write_raw_double(50, self.rotation)?;
            }
            w.write_raw_double(40, self.height)?;
            if flags & 0x10 == 0 {
                w.write_raw_double(41, self.width_factor)?;
            }
            w.write_variable_text(1, &self.value, version, false)?;
            if flags & 0x20 == 0 {
                w.write_bit_short(71, self.generation)?;
            }
            if flags & 0x40 == 0 {
                w.write_bit_short(72, self.h_align.raw())?;
            }
            if flags & 0x80 == 0 {
                w.write_bit_short(73, self.v_align.raw())?;
            }
        } else {
            w.write_bit_double(30, self.insert_point.z)?;
            w.write_raw_coord2(10, self.insert_point)?;
            w.write_raw_coord2(11, self.align_point)?;
            w.write_extrusion(210, self.common.extrusion, version)?;
            w.write_thickness(39, self.thickness, version)?;
            w.write_bit_double(51, self.oblique)?;
            w.write_bit_double(50, self.rotation)?;
            w.write_bit_double(40, self.height)?;
            w.write_bit_double(41, self.width_factor)?;
            w.write_variable_text(1, &self.value, version, false)?;
            w.write_bit_short(71, self.generation)?;
            w.write_bit_short(72, self.h_align.raw())?;
            w.write_bit_short(73, self.v_align.raw())?;
        }
        w.write_handle(7, self.style_handle)?;
        Ok(())
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new("", Coord::ZERO, 1.0)
    }
}
