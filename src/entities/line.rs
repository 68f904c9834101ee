//! Line entity.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// A straight segment between two points.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Start point |
/// | 11, 21, 31 | End point |
/// | 39 | Thickness (optional, default 0) |
/// | 210, 220, 230 | Extrusion direction (optional) |
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub common: EntityHeader,
    pub start: Coord,
    pub end: Coord,
    pub thickness: f64,
}

impl Line {
    pub fn new(start: Coord, end: Coord) -> Self {
        Line {
            common: EntityHeader::new(),
            start,
            end,
            thickness: 0.0,
        }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Coord::new(x1, y1, 0.0), Coord::new(x2, y2, 0.0))
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn midpoint(&self) -> Coord {
        Coord::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
            (self.start.z + self.end.z) / 2.0,
        )
    }

    pub fn direction(&self) -> Coord {
        (self.end - self.start).normalize()
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.common.layer = layer.into();
        self
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => self.start.x = reader.get_double()?,
            20 => self.start.y = reader.get_double()?,
            30 => self.start.z = reader.get_double()?,
            11 => self.end.x = reader.get_double()?,
            21 => self.end.y = reader.get_double()?,
            31 => self.end.z = reader.get_double()?,
            39 => self.thickness = reader.get_double()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "LINE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbLine")?;
        }
        w.write_coord(10, self.start)?;
        w.write_coord(11, self.end)?;
        if self.thickness != 0.0 {
            w.write_double(39, self.thickness)?;
        }
        self.common.write_extrusion_dxf(w)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        if version.r2000_plus() {
            let z_is_zero = r.get_bit()?;
            self.start.x = r.get_raw_double()?;
            self.end.x = r.get_bit_double_default(self.start.x)?;
            self.start.y = r.get_raw_double()?;
            self.end.y = r.get_bit_double_default(self.start.y)?;
            if z_is_zero {
                self.start.z = 0.0;
                self.end.z = 0.0;
            } else {
                self.start.z = r.get_raw_double()?;
                self.end.z = r.get_bit_double_default(self.start.z)?;
            }
        } else {
            self.start = r.get_coord()?;
            self.end = r.get_coord()?;
        }
        self.thickness = r.get_thickness(version)?;
        self.common.extrusion = r.get_extrusion(version)?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        if version.r2000_plus() {
            let z_is_zero = self.start.z == 0.0 && self.end.z == 0.0;
            w.write_bit(0, z_is_zero)?;
            w.write_raw_double(10, self.start.x)?;
            w.write_bit_double_default(11, self.end.x, self.start.x)?;
            w.write_raw_double(20, self.start.y)?;
            w.write_bit_double_default(21, self.end.y, self.start.y)?;
            if !z_is_zero {
                w.write_raw_double(30, self.start.z)?;
                w.write_bit_double_default(31, self.end.z, self.start.z)?;
            }
        } else {
            w.write_coord(10, self.start)?;
            w.write_coord(11, self.end)?;
        }
        w.write_thickness(39, self.thickness, version)?;
        w.write_extrusion(210, self.common.extrusion, version)?;
        Ok(())
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new(Coord::ZERO, Coord::ZERO)
    }
}
