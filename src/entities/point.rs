//! Point entity.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// A point marker in model space.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Location |
/// | 39 | Thickness (optional, default 0) |
/// | 50 | UCS x-axis angle (optional) |
/// | 210, 220, 230 | Extrusion direction (optional) |
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub common: EntityHeader,
    pub location: Coord,
    pub thickness: f64,
    /// Angle of the x axis of the UCS in effect when the point was
    /// drawn, in radians.
    pub x_axis_angle: f64,
}

impl Point {
    pub fn new(location: Coord) -> Self {
        Point {
            common: EntityHeader::new(),
            location,
            thickness: 0.0,
            x_axis_angle: 0.0,
        }
    }

    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new(Coord::new(x, y, z))
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.location.distance(&other.location)
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.common.layer = layer.into();
        self
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => self.location.x = reader.get_double()?,
            20 => self.location.y = reader.get_double()?,
            30 => self.location.z = reader.get_double()?,
            39 => self.thickness = reader.get_double()?,
            50 => self.x_axis_angle = reader.get_double()?.to_radians(),
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "POINT")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbPoint")?;
        }
        w.write_coord(10, self.location)?;
        if self.thickness != 0.0 {
            w.write_double(39, self.thickness)?;
        }
        if self.x_axis_angle != 0.0 {
            w.write_double(50, self.x_axis_angle.to_degrees())?;
        }
        self.common.write_extrusion_dxf(w)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.location = r.get_coord()?;
        self.thickness = r.get_thickness(version)?;
        self.common.extrusion = r.get_extrusion(version)?;
        self.x_axis_angle = r.get_bit_double()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.location)?;
        w.write_thickness(39, self.thickness, version)?;
        w.write_extrusion(210, self.common.extrusion, version)?;
        w.write_bit_double(50, self.x_axis_angle)?;
        Ok(())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(Coord::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    #[test]
    fn test_point_new() {
        let p = Point::at(1.0, 2.0, 3.0);
        assert_eq!(p.location, Coord::new(1.0, 2.0, 3.0));
        assert_eq!(p.thickness, 0.0);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::at(0.0, 0.0, 0.0);
        let b = Point::at(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_point_dxf_roundtrip() {
        let mut p = Point::at(1.5, -2.25, 0.5);
        p.thickness = 3.0;
        p.common.layer = "MARKERS".to_string();

        let mut w = TextWriter::new(Vec::new());
        p.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));

        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "POINT");
        let mut back = Point::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.location, p.location);
        assert_eq!(back.thickness, p.thickness);
        assert_eq!(back.common.layer, p.common.layer);
    }

    #[test]
    fn test_point_dwg_roundtrip() {
        for version in [CadVersion::AC1014, CadVersion::AC1015, CadVersion::AC1021] {
            let mut p = Point::at(7.0, 8.0, 9.0);
            p.x_axis_angle = 0.25;
            let mut w = BitWriter::new(version);
            p.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Point::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.location, p.location);
            assert_eq!(back.x_axis_angle, p.x_axis_angle);
            assert_eq!(back.thickness, 0.0);
        }
    }
}
