//! Circle entity.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// A full circle.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Center point |
/// | 40 | Radius |
/// | 39 | Thickness (optional, default 0) |
/// | 210, 220, 230 | Extrusion direction (optional) |
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub common: EntityHeader,
    pub center: Coord,
    pub radius: f64,
    pub thickness: f64,
}

impl Circle {
    pub fn new(center: Coord, radius: f64) -> Self {
        Circle {
            common: EntityHeader::new(),
            center,
            radius,
            thickness: 0.0,
        }
    }

    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius
    }

    /// Point on the circle at `angle` radians from the x axis.
    pub fn point_at(&self, angle: f64) -> Coord {
        Coord::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
            self.center.z,
        )
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.common.layer = layer.into();
        self
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => self.center.x = reader.get_double()?,
            20 => self.center.y = reader.get_double()?,
            30 => self.center.z = reader.get_double()?,
            40 => self.radius = reader.get_double()?,
            39 => self.thickness = reader.get_double()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "CIRCLE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbCircle")?;
        }
        if self.thickness != 0.0 {
            w.write_double(39, self.thickness)?;
        }
        w.write_coord(10, self.center)?;
        w.write_double(40, self.radius)?;
        self.common.write_extrusion_dxf(w)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.center = r.get_coord()?;
        self.radius = r.get_bit_double()?;
        self.thickness = r.get_thickness(version)?;
        self.common.extrusion = r.get_extrusion(version)?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.center)?;
        w.write_bit_double(40, self.radius)?;
        w.write_thickness(39, self.thickness, version)?;
        w.write_extrusion(210, self.common.extrusion, version)?;
        Ok(())
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new(Coord::ZERO, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    #[test]
    fn test_circle_geometry() {
        let c = Circle::new(Coord::new(1.0, 1.0, 0.0), 2.0);
        assert!((c.area() - 4.0 * std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(c.point_at(0.0), Coord::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn test_circle_dxf_roundtrip() {
        let mut c = Circle::new(Coord::new(-2.0, 4.5, 1.0), 3.25);
        c.common.layer = "HOLES".to_string();
        let mut w = TextWriter::new(Vec::new());
        c.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "CIRCLE");
        let mut back = Circle::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.center, c.center);
        assert_eq!(back.radius, c.radius);
        assert_eq!(back.common.layer, "HOLES");
    }

    #[test]
    fn test_circle_dwg_roundtrip() {
        for version in [CadVersion::AC1014, CadVersion::AC1015, CadVersion::AC1021] {
            let mut c = Circle::new(Coord::new(10.0, 20.0, 0.0), 5.5);
            c.thickness = 1.25;
            c.common.extrusion = Coord::new(0.0, 1.0, 0.0);
            let mut w = BitWriter::new(version);
            c.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Circle::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.center, c.center, "{version:?}");
            assert_eq!(back.radius, c.radius, "{version:?}");
            assert_eq!(back.thickness, c.thickness, "{version:?}");
            assert_eq!(back.common.extrusion, c.common.extrusion, "{version:?}");
        }
    }
}
