//! Ellipse entity.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// An ellipse or elliptical arc.
///
/// The major axis endpoint is relative to the center; the minor axis is
/// the major scaled by `ratio`.  A full ellipse runs from parameter 0
/// to 2π.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Center point |
/// | 11, 21, 31 | Major axis endpoint, relative to center |
/// | 40 | Minor-to-major axis ratio |
/// | 41 | Start parameter (radians) |
/// | 42 | End parameter (radians) |
/// | 210, 220, 230 | Extrusion direction (optional) |
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub common: EntityHeader,
    pub center: Coord,
    pub major_axis: Coord,
    pub ratio: f64,
    pub start_param: f64,
    pub end_param: f64,
}

impl Ellipse {
    pub fn new(center: Coord, major_axis: Coord, ratio: f64) -> Self {
        Ellipse {
            common: EntityHeader::new(),
            center,
            major_axis,
            ratio,
            start_param: 0.0,
            end_param: std::f64::consts::TAU,
        }
    }

    pub fn major_radius(&self) -> f64 {
        self.major_axis.length()
    }

    pub fn minor_radius(&self) -> f64 {
        self.major_axis.length() * self.ratio
    }

    pub fn is_full(&self) -> bool {
        (self.end_param - self.start_param - std::f64::consts::TAU).abs() < 1e-10
    }

    /// Rotation of the major axis in the xy plane, radians.
    pub fn rotation(&self) -> f64 {
        self.major_axis.y.atan2(self.major_axis.x)
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => self.center.x = reader.get_double()?,
            20 => self.center.y = reader.get_double()?,
            30 => self.center.z = reader.get_double()?,
            11 => self.major_axis.x = reader.get_double()?,
            21 => self.major_axis.y = reader.get_double()?,
            31 => self.major_axis.z = reader.get_double()?,
            40 => self.ratio = reader.get_double()?,
            41 => self.start_param = reader.get_double()?,
            42 => self.end_param = reader.get_double()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "ELLIPSE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbEllipse")?;
        }
        w.write_coord(10, self.center)?;
        w.write_coord(11, self.major_axis)?;
        self.common.write_extrusion_dxf(w)?;
        w.write_double(40, self.ratio)?;
        w.write_double(41, self.start_param)?;
        w.write_double(42, self.end_param)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.center = r.get_coord()?;
        self.major_axis = r.get_coord()?;
        // Full vector, no one-bit default form.
        self.common.extrusion = r.get_coord()?;
        self.ratio = r.get_bit_double()?;
        self.start_param = r.get_bit_double()?;
        self.end_param = r.get_bit_double()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.center)?;
        w.write_coord(11, self.major_axis)?;
        w.write_coord(210, self.common.extrusion)?;
        w.write_bit_double(40, self.ratio)?;
        w.write_bit_double(41, self.start_param)?;
        w.write_bit_double(42, self.end_param)?;
        Ok(())
    }
}

impl Default for Ellipse {
    fn default() -> Self {
        Self::new(Coord::ZERO, Coord::UNIT_X, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};
    use std::f64::consts::PI;

    #[test]
    fn test_ellipse_radii() {
        let e = Ellipse::new(Coord::ZERO, Coord::new(4.0, 0.0, 0.0), 0.25);
        assert_eq!(e.major_radius(), 4.0);
        assert_eq!(e.minor_radius(), 1.0);
        assert!(e.is_full());
    }

    #[test]
    fn test_ellipse_rotation() {
        let e = Ellipse::new(Coord::ZERO, Coord::new(0.0, 3.0, 0.0), 0.5);
        assert!((e.rotation() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ellipse_dxf_roundtrip() {
        let mut e = Ellipse::new(Coord::new(1.0, 2.0, 0.0), Coord::new(5.0, 0.0, 0.0), 0.6);
        e.start_param = 0.5;
        e.end_param = 2.5;
        let mut w = TextWriter::new(Vec::new());
        e.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "ELLIPSE");
        let mut back = Ellipse::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.center, e.center);
        assert_eq!(back.major_axis, e.major_axis);
        assert_eq!(back.ratio, e.ratio);
        assert_eq!(back.start_param, e.start_param);
        assert_eq!(back.end_param, e.end_param);
    }

    #[test]
    fn test_ellipse_dwg_roundtrip() {
        let version = CadVersion::AC1018;
        let mut e = Ellipse::new(Coord::new(3.0, 4.0, 5.0), Coord::new(2.0, 1.0, 0.0), 0.75);
        e.common.extrusion = Coord::new(0.0, 0.0, -1.0);
        let mut w = BitWriter::new(version);
        e.write_dwg(version, &mut w).unwrap();
        let mut r = BitReader::new(w.into_data(), version);
        let mut back = Ellipse::default();
        back.parse_dwg(version, &mut r).unwrap();
        assert_eq!(back.center, e.center);
        assert_eq!(back.major_axis, e.major_axis);
        assert_eq!(back.common.extrusion, e.common.extrusion);
        assert_eq!(back.ratio, e.ratio);
    }
}
