//! Ray and construction-line entities.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// A semi-infinite line from a base point along a direction.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Base point |
/// | 11, 21, 31 | Unit direction vector |
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub common: EntityHeader,
    pub base_point: Coord,
    pub direction: Coord,
}

impl Ray {
    pub fn new(base_point: Coord, direction: Coord) -> Self {
        Ray {
            common: EntityHeader::new(),
            base_point,
            direction: direction.normalize(),
        }
    }

    pub fn from_points(base: Coord, through: Coord) -> Self {
        Self::new(base, through - base)
    }

    /// Point at parameter `t` along the direction; `t < 0` is behind
    /// the base and not on the ray.
    pub fn point_at(&self, t: f64) -> Coord {
        self.base_point + self.direction * t
    }

    pub fn angle_xy(&self) -> f64 {
        self.direction.y.atan2(self.direction.x)
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        parse_ray_code(&mut self.common, &mut self.base_point, &mut self.direction, code, reader)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "RAY")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbRay")?;
        }
        w.write_coord(10, self.base_point)?;
        w.write_coord(11, self.direction)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.base_point = r.get_coord()?;
        self.direction = r.get_coord()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.base_point)?;
        w.write_coord(11, self.direction)?;
        Ok(())
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Coord::ZERO, Coord::UNIT_X)
    }
}

/// An infinite construction line through a base point.
///
/// Same group layout as [`Ray`]; the direction extends both ways.
#[derive(Debug, Clone, PartialEq)]
pub struct XLine {
    pub common: EntityHeader,
    pub base_point: Coord,
    pub direction: Coord,
}

impl XLine {
    pub fn new(base_point: Coord, direction: Coord) -> Self {
        XLine {
            common: EntityHeader::new(),
            base_point,
            direction: direction.normalize(),
        }
    }

    pub fn from_points(a: Coord, b: Coord) -> Self {
        Self::new(a, b - a)
    }

    pub fn point_at(&self, t: f64) -> Coord {
        self.base_point + self.direction * t
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        parse_ray_code(&mut self.common, &mut self.base_point, &mut self.direction, code, reader)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "XLINE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbXline")?;
        }
        w.write_coord(10, self.base_point)?;
        w.write_coord(11, self.direction)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.base_point = r.get_coord()?;
        self.direction = r.get_coord()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.base_point)?;
        w.write_coord(11, self.direction)?;
        Ok(())
    }
}

impl Default for XLine {
    fn default() -> Self {
        Self::new(Coord::ZERO, Coord::UNIT_X)
    }
}

fn parse_ray_code(
    common: &mut EntityHeader,
    base_point: &mut Coord,
    direction: &mut Coord,
    code: i32,
    reader: &mut dyn RecordReader,
) -> Result<bool> {
    match code {
        10 => base_point.x = reader.get_double()?,
        20 => base_point.y = reader.get_double()?,
        30 => base_point.z = reader.get_double()?,
        11 => direction.x = reader.get_double()?,
        21 => direction.y = reader.get_double()?,
        31 => direction.z = reader.get_double()?,
        _ => return common.parse_code(code, reader),
    }
    Ok(true)
}
