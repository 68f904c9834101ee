//! Arc entity.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// A circular arc, traced counterclockwise from start to end angle.
///
/// Angles are stored in radians; the text form carries degrees.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Center point |
/// | 40 | Radius |
/// | 50 | Start angle (degrees) |
/// | 51 | End angle (degrees) |
/// | 39 | Thickness (optional, default 0) |
/// | 210, 220, 230 | Extrusion direction (optional) |
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub common: EntityHeader,
    pub center: Coord,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub thickness: f64,
}

impl Arc {
    pub fn new(center: Coord, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Arc {
            common: EntityHeader::new(),
            center,
            radius,
            start_angle,
            end_angle,
            thickness: 0.0,
        }
    }

    /// Swept angle in radians, counterclockwise, in [0, 2π).
    pub fn sweep(&self) -> f64 {
        let mut sweep = self.end_angle - self.start_angle;
        while sweep < 0.0 {
            sweep += std::f64::consts::TAU;
        }
        while sweep >= std::f64::consts::TAU {
            sweep -= std::f64::consts::TAU;
        }
        sweep
    }

    pub fn arc_length(&self) -> f64 {
        self.radius * self.sweep()
    }

    pub fn start_point(&self) -> Coord {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Coord {
        self.point_at(self.end_angle)
    }

    pub fn point_at(&self, angle: f64) -> Coord {
        Coord::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
            self.center.z,
        )
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => self.center.x = reader.get_double()?,
            20 => self.center.y = reader.get_double()?,
            30 => self.center.z = reader.get_double()?,
            40 => self.radius = reader.get_double()?,
            50 => self.start_angle = reader.get_double()?.to_radians(),
            51 => self.end_angle = reader.get_double()?.to_radians(),
            39 => self.thickness = reader.get_double()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "ARC")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbCircle")?;
        }
        if self.thickness != 0.0 {
            w.write_double(39, self.thickness)?;
        }
        w.write_coord(10, self.center)?;
        w.write_double(40, self.radius)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbArc")?;
        }
        w.write_double(50, self.start_angle.to_degrees())?;
        w.write_double(51, self.end_angle.to_degrees())?;
        self.common.write_extrusion_dxf(w)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.center = r.get_coord()?;
        self.radius = r.get_bit_double()?;
        self.thickness = r.get_thickness(version)?;
        self.common.extrusion = r.get_extrusion(version)?;
        self.start_angle = normalize_angle(r.get_bit_double()?);
        self.end_angle = normalize_angle(r.get_bit_double()?);
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.center)?;
        w.write_bit_double(40, self.radius)?;
        w.write_thickness(39, self.thickness, version)?;
        w.write_extrusion(210, self.common.extrusion, version)?;
        w.write_bit_double(50, normalize_angle(self.start_angle))?;
        w.write_bit_double(51, normalize_angle(self.end_angle))?;
        Ok(())
    }
}

impl Default for Arc {
    fn default() -> Self {
        Self::new(Coord::ZERO, 1.0, 0.0, std::f64::consts::TAU)
    }
}

/// Wrap an angle into [0, 2π).
pub(crate) fn normalize_angle(angle: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let wrapped = angle % tau;
    if wrapped < 0.0 {
        wrapped + tau
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_arc_sweep() {
        let a = Arc::new(Coord::ZERO, 1.0, 0.0, FRAC_PI_2);
        assert!((a.sweep() - FRAC_PI_2).abs() < 1e-12);
        // Wrap through zero.
        let b = Arc::new(Coord::ZERO, 2.0, 3.0 * FRAC_PI_2, FRAC_PI_2);
        assert!((b.sweep() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert_eq!(normalize_angle(1.0), 1.0);
    }

    #[test]
    fn test_arc_dxf_angles_in_degrees() {
        let a = Arc::new(Coord::ZERO, 1.0, 0.0, PI);
        let mut w = TextWriter::new(Vec::new());
        a.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert!(text.contains(" 51\n180.0\n"), "{text}");
    }

    #[test]
    fn test_arc_dxf_roundtrip() {
        let a = Arc::new(Coord::new(5.0, 5.0, 0.0), 2.5, FRAC_PI_2, PI);
        let mut w = TextWriter::new(Vec::new());
        a.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "ARC");
        let mut back = Arc::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.center, a.center);
        assert_eq!(back.radius, a.radius);
        assert!((back.start_angle - a.start_angle).abs() < 1e-12);
        assert!((back.end_angle - a.end_angle).abs() < 1e-12);
    }

    #[test]
    fn test_arc_dwg_roundtrip() {
        for version in [CadVersion::AC1014, CadVersion::AC1015, CadVersion::AC1021] {
            let a = Arc::new(Coord::new(1.0, 2.0, 3.0), 4.0, 0.5, 2.5);
            let mut w = BitWriter::new(version);
            a.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Arc::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.center, a.center, "{version:?}");
            assert_eq!(back.radius, a.radius, "{version:?}");
            assert_eq!(back.start_angle, a.start_angle, "{version:?}");
            assert_eq!(back.end_angle, a.end_angle, "{version:?}");
        }
    }
}
