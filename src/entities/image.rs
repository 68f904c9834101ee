//! Raster image reference entity.

use crate::error::{CadError, Result};
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord, Handle};

use super::EntityHeader;

/// Display option flags, group 70.
pub mod image_display {
    pub const SHOW: i16 = 1;
    pub const SHOW_WHEN_NOT_ALIGNED: i16 = 2;
    pub const USE_CLIP_BOUNDARY: i16 = 4;
    pub const TRANSPARENT: i16 = 8;
}

/// A placed reference to an external raster image.
///
/// The pixel data lives in a separate definition object; the entity
/// stores placement vectors and an optional clip boundary.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 90 | Class version |
/// | 10, 20, 30 | Insertion point |
/// | 11, 21, 31 | U vector (one pixel along the row) |
/// | 12, 22, 32 | V vector (one pixel down the column) |
/// | 13, 23 | Image size in pixels |
/// | 70 | Display properties |
/// | 280 | Clipping on |
/// | 281, 282, 283 | Brightness, contrast, fade |
/// | 71 | Clip boundary type (1 = rectangle, 2 = polygon) |
/// | 91 | Clip vertex count |
/// | 14, 24 | Clip vertex (repeats) |
/// | 340 | Image definition reference |
/// | 360 | Definition reactor reference |
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub common: EntityHeader,
    pub class_version: i32,
    pub insert_point: Coord,
    pub u_vector: Coord,
    pub v_vector: Coord,
    /// Size in pixels; x is width, y is height.
    pub size: Coord,
    pub display_props: i16,
    pub clipping_on: bool,
    pub brightness: u8,
    pub contrast: u8,
    pub fade: u8,
    /// 1 rectangle, 2 polygon.
    pub clip_type: i16,
    pub clip_vertices: Vec<Coord>,
    pub def_handle: Handle,
    pub def_reactor_handle: Handle,
}

impl Image {
    pub fn new(insert_point: Coord, width_px: f64, height_px: f64) -> Self {
        Image {
            insert_point,
            size: Coord::new(width_px, height_px, 0.0),
            ..Default::default()
        }
    }

    /// World width covered by the placed image.
    pub fn display_width(&self) -> f64 {
        self.u_vector.length() * self.size.x
    }

    pub fn display_height(&self) -> f64 {
        self.v_vector.length() * self.size.y
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            90 => self.class_version = reader.get_int32()?,
            10 => self.insert_point.x = reader.get_double()?,
            20 => self.insert_point.y = reader.get_double()?,
            30 => self.insert_point.z = reader.get_double()?,
            11 => self.u_vector.x = reader.get_double()?,
            21 => self.u_vector.y = reader.get_double()?,
            31 => self.u_vector.z = reader.get_double()?,
            12 => self.v_vector.x = reader.get_double()?,
            22 => self.v_vector.y = reader.get_double()?,
            32 => self.v_vector.z = reader.get_double()?,
            13 => self.size.x = reader.get_double()?,
            23 => self.size.y = reader.get_double()?,
            70 => self.display_props = reader.get_int16()?,
            280 => self.clipping_on = reader.get_int16()? != 0,
            281 => self.brightness = reader.get_int16()? as u8,
            282 => self.contrast = reader.get_int16()? as u8,
            283 => self.fade = reader.get_int16()? as u8,
            71 => self.clip_type = reader.get_int16()?,
            91 => {
                let n = reader.get_int32()?;
                self.clip_vertices.reserve(n.max(0) as usize);
            }
            14 => self.clip_vertices.push(Coord::new(reader.get_double()?, 0.0, 0.0)),
            24 => {
                if let Some(v) = self.clip_vertices.last_mut() {
                    v.y = reader.get_double()?;
                }
            }
            340 => self.def_handle = reader.get_handle()?,
            360 => self.def_reactor_handle = reader.get_handle()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "IMAGE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbRasterImage")?;
        }
        w.write_int32(90, self.class_version)?;
        w.write_coord(10, self.insert_point)?;
        w.write_coord(11, self.u_vector)?;
        w.write_coord(12, self.v_vector)?;
        w.write_double(13, self.size.x)?;
        w.write_double(23, self.size.y)?;
        if self.def_handle.is_valid() {
            w.write_handle(340, self.def_handle)?;
        }
        w.write_int16(70, self.display_props)?;
        w.write_int16(280, i16::from(self.clipping_on))?;
        w.write_int16(281, self.brightness as i16)?;
        w.write_int16(282, self.contrast as i16)?;
        w.write_int16(283, self.fade as i16)?;
        if self.def_reactor_handle.is_valid() {
            w.write_handle(360, self.def_reactor_handle)?;
        }
        w.write_int16(71, self.clip_type)?;
        w.write_int32(91, self.clip_vertices.len() as i32)?;
        for v in &self.clip_vertices {
            w.write_double(14, v.x)?;
            w.write_double(24, v.y)?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.class_version = r.get_bit_long()?;
        self.insert_point = r.get_coord()?;
        self.u_vector = r.get_coord()?;
        self.v_vector = r.get_coord()?;
        let size = r.get_raw_coord2()?;
        self.size = Coord::new(size.x, size.y, 0.0);
        self.display_props = r.get_bit_short()?;
        self.clipping_on = r.get_bit()?;
        self.brightness = r.get_raw_char()?;
        self.contrast = r.get_raw_char()?;
        self.fade = r.get_raw_char()?;
        if version.r2010_plus() {
            let _clip_outside = r.get_bit()?;
        }
        self.clip_type = r.get_bit_short()?;
        self.clip_vertices.clear();
        if self.clip_type == 1 {
            self.clip_vertices.push(r.get_raw_coord2()?);
            self.clip_vertices.push(r.get_raw_coord2()?);
        } else {
            let n = r.get_bit_long()?;
            if !(0..=10_000_000).contains(&n) {
                return Err(CadError::Malformed(format!(
                    "image clip vertex count {n}"
                )));
            }
            for _ in 0..n {
                self.clip_vertices.push(r.get_raw_coord2()?);
            }
        }
        self.def_handle = r.get_handle()?;
        self.def_reactor_handle = r.get_handle()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_bit_long(90, self.class_version)?;
        w.write_coord(10, self.insert_point)?;
        w.write_coord(11, self.u_vector)?;
        w.write_coord(12, self.v_vector)?;
        w.write_raw_coord2(13, self.size)?;
        w.write_bit_short(70, self.display_props)?;
        w.write_bit(280, self.clipping_on)?;
        w.write_raw_char(281, self.brightness)?;
        w.write_raw_char(282, self.contrast)?;
        w.write_raw_char(283, self.fade)?;
        if version.r2010_plus() {
            w.write_bit(0, false)?;
        }
        if self.clip_type == 1 && self.clip_vertices.len() == 2 {
            w.write_bit_short(71, 1)?;
            w.write_raw_coord2(14, self.clip_vertices[0])?;
            w.write_raw_coord2(14, self.clip_vertices[1])?;
        } else {
            w.write_bit_short(71, 2)?;
            w.write_bit_long(91, self.clip_vertices.len() as i32)?;
            for v in &self.clip_vertices {
                w.write_raw_coord2(14, *v)?;
            }
        }
        w.write_handle(340, self.def_handle)?;
        w.write_handle(360, self.def_reactor_handle)?;
        Ok(())
    }
}

impl Default for Image {
    fn default() -> Self {
        Image {
            common: EntityHeader::new(),
            class_version: 0,
            insert_point: Coord::ZERO,
            u_vector: Coord::UNIT_X,
            v_vector: Coord::UNIT_Y,
            size: Coord::ZERO,
            display_props: image_display::SHOW | image_display::SHOW_WHEN_NOT_ALIGNED,
            clipping_on: false,
            brightness: 50,
            contrast: 50,
            fade: 0,
            clip_type: 1,
            clip_vertices: Vec::new(),
            def_handle: Handle::NULL,
            def_reactor_handle: Handle::NULL,
        }
    }
}
