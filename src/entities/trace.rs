//! Trace, solid and 3D-face entities.
//!
//! All three are four-corner figures.  Trace and solid are filled
//! planar quads sharing one layout; the 3D face carries per-edge
//! visibility instead of thickness.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// A filled trace, the four corners in zigzag order.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | First corner |
/// | 11, 21, 31 | Second corner |
/// | 12, 22, 32 | Third corner |
/// | 13, 23, 33 | Fourth corner |
/// | 39 | Thickness (optional, default 0) |
/// | 210, 220, 230 | Extrusion direction (optional) |
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub common: EntityHeader,
    pub corners: [Coord; 4],
    pub thickness: f64,
}

impl Trace {
    pub fn new(corners: [Coord; 4]) -> Self {
        Trace {
            common: EntityHeader::new(),
            corners,
            thickness: 0.0,
        }
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        parse_quad_code(&mut self.common, &mut self.corners, &mut self.thickness, code, reader)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        write_quad_dxf(&self.common, &self.corners, self.thickness, "TRACE", "AcDbTrace", version, w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        parse_quad_dwg(&mut self.common, &mut self.corners, &mut self.thickness, version, r)
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        write_quad_dwg(&self.common, &self.corners, self.thickness, version, w)
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new([Coord::ZERO; 4])
    }
}

/// A filled planar quad; same layout as [`Trace`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub common: EntityHeader,
    pub corners: [Coord; 4],
    pub thickness: f64,
}

impl Solid {
    pub fn new(corners: [Coord; 4]) -> Self {
        Solid {
            common: EntityHeader::new(),
            corners,
            thickness: 0.0,
        }
    }

    /// Triangle form: the fourth corner repeats the third.
    pub fn triangle(a: Coord, b: Coord, c: Coord) -> Self {
        Self::new([a, b, c, c])
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        parse_quad_code(&mut self.common, &mut self.corners, &mut self.thickness, code, reader)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        write_quad_dxf(&self.common, &self.corners, self.thickness, "SOLID", "AcDbTrace", version, w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        parse_quad_dwg(&mut self.common, &mut self.corners, &mut self.thickness, version, r)
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        write_quad_dwg(&self.common, &self.corners, self.thickness, version, w)
    }
}

impl Default for Solid {
    fn default() -> Self {
        Self::new([Coord::ZERO; 4])
    }
}

fn parse_quad_code(
    common: &mut EntityHeader,
    corners: &mut [Coord; 4],
    thickness: &mut f64,
    code: i32,
    reader: &mut dyn RecordReader,
) -> Result<bool> {
    match code {
        10..=13 => corners[(code - 10) as usize].x = reader.get_double()?,
        20..=23 => corners[(code - 20) as usize].y = reader.get_double()?,
        30..=33 => corners[(code - 30) as usize].z = reader.get_double()?,
        39 => *thickness = reader.get_double()?,
        _ => return common.parse_code(code, reader),
    }
    Ok(true)
}

fn write_quad_dxf(
    common: &EntityHeader,
    corners: &[Coord; 4],
    thickness: f64,
    name: &str,
    subclass: &str,
    version: CadVersion,
    w: &mut dyn RecordWriter,
) -> Result<()> {
    w.write_string(0, name)?;
    common.write_dxf(version, w)?;
    if version.is_r13_plus() {
        w.write_string(100, subclass)?;
    }
    for (i, corner) in corners.iter().enumerate() {
        w.write_coord(10 + i as i32, *corner)?;
    }
    if thickness != 0.0 {
        w.write_double(39, thickness)?;
    }
    common.write_extrusion_dxf(w)?;
    common.write_ext_data(w)
}

/// Thickness, shared elevation, then the four corners as xy pairs.
fn parse_quad_dwg(
    common: &mut EntityHeader,
    corners: &mut [Coord; 4],
    thickness: &mut f64,
    version: CadVersion,
    r: &mut dyn RecordReader,
) -> Result<()> {
    *thickness = r.get_thickness(version)?;
    let elevation = r.get_bit_double()?;
    for corner in corners.iter_mut() {
        let xy = r.get_raw_coord2()?;
        *corner = Coord::new(xy.x, xy.y, elevation);
    }
    common.extrusion = r.get_extrusion(version)?;
    Ok(())
}

fn write_quad_dwg(
    common: &EntityHeader,
    corners: &[Coord; 4],
    thickness: f64,
    version: CadVersion,
    w: &mut dyn RecordWriter,
) -> Result<()> {
    w.write_thickness(39, thickness, version)?;
    w.write_bit_double(38, corners[0].z)?;
    for (i, corner) in corners.iter().enumerate() {
        w.write_raw_coord2(10 + i as i32, *corner)?;
    }
    w.write_extrusion(210, common.extrusion, version)?;
    Ok(())
}

/// A triangular or quadrilateral face in 3D space.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10..13, 20..23, 30..33 | Corners |
/// | 70 | Invisible edge flags: 1 first, 2 second, 4 third, 8 fourth |
#[derive(Debug, Clone, PartialEq)]
pub struct Face3D {
    pub common: EntityHeader,
    pub corners: [Coord; 4],
    pub invisible_edges: i16,
}

impl Face3D {
    pub fn new(corners: [Coord; 4]) -> Self {
        Face3D {
            common: EntityHeader::new(),
            corners,
            invisible_edges: 0,
        }
    }

    pub fn is_edge_visible(&self, edge: usize) -> bool {
        edge < 4 && self.invisible_edges & (1 << edge) == 0
    }

    pub fn set_edge_visible(&mut self, edge: usize, visible: bool) {
        if edge < 4 {
            if visible {
                self.invisible_edges &= !(1 << edge);
            } else {
                self.invisible_edges |= 1 << edge;
            }
        }
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10..=13 => self.corners[(code - 10) as usize].x = reader.get_double()?,
            20..=23 => self.corners[(code - 20) as usize].y = reader.get_double()?,
            30..=33 => self.corners[(code - 30) as usize].z = reader.get_double()?,
            70 => self.invisible_edges = reader.get_int16()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "3DFACE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbFace")?;
        }
        for (i, corner) in self.corners.iter().enumerate() {
            w.write_coord(10 + i as i32, *corner)?;
        }
        if self.invisible_edges != 0 {
            w.write_int16(70, self.invisible_edges)?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        if version.r2000_plus() {
            let has_no_flags = r.get_bit()?;
            let z_is_zero = r.get_bit()?;
            self.corners[0].x = r.get_raw_double()?;
            self.corners[0].y = r.get_raw_double()?;
            self.corners[0].z = if z_is_zero { 0.0 } else { r.get_raw_double()? };
            for i in 1..4 {
                let prev = self.corners[i - 1];
                self.corners[i].x = r.get_bit_double_default(prev.x)?;
                self.corners[i].y = r.get_bit_double_default(prev.y)?;
                self.corners[i].z = r.get_bit_double_default(prev.z)?;
            }
            self.invisible_edges = if has_no_flags { 0 } else { r.get_bit_short()? };
        } else {
            for corner in self.corners.iter_mut() {
                *corner = r.get_coord()?;
            }
            self.invisible_edges = r.get_bit_short()?;
        }
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        if version.r2000_plus() {
            let has_no_flags = self.invisible_edges == 0;
            let z_is_zero = self.corners[0].z == 0.0;
            w.write_bit(0, has_no_flags)?;
            w.write_bit(0, z_is_zero)?;
            w.write_raw_double(10, self.corners[0].x)?;
            w.write_raw_double(20, self.corners[0].y)?;
            if !z_is_zero {
                w.write_raw_double(30, self.corners[0].z)?;
            }
            for i in 1..4 {
                let prev = self.corners[i - 1];
                let code = 11 + (i as i32 - 1);
                w.write_bit_double_default(code, self.corners[i].x, prev.x)?;
                w.write_bit_double_default(code + 10, self.corners[i].y, prev.y)?;
                w.write_bit_double_default(code + 20, self.corners[i].z, prev.z)?;
            }
            if !has_no_flags {
                w.write_bit_short(70, self.invisible_edges)?;
            }
        } else {
            for corner in &self.corners {
                w.write_coord(10, *corner)?;
            }
            w.write_bit_short(70, self.invisible_edges)?;
        }
        Ok(())
    }
}

impl Default for Face3D {
    fn default() -> Self {
        Self::new([Coord::ZERO; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    fn quad() -> [Coord; 4] {
        [
            Coord::new(0.0, 0.0, 0.0),
            Coord::new(10.0, 0.0, 0.0),
            Coord::new(10.0, 5.0, 0.0),
            Coord::new(0.0, 5.0, 0.0),
        ]
    }

    #[test]
    fn test_solid_triangle_repeats_corner() {
        let s = Solid::triangle(
            Coord::ZERO,
            Coord::new(1.0, 0.0, 0.0),
            Coord::new(0.0, 1.0, 0.0),
        );
        assert_eq!(s.corners[2], s.corners[3]);
    }

    #[test]
    fn test_solid_dxf_roundtrip() {
        let mut s = Solid::new(quad());
        s.thickness = 2.0;
        let mut w = TextWriter::new(Vec::new());
        s.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "SOLID");
        let mut back = Solid::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.corners, s.corners);
        assert_eq!(back.thickness, s.thickness);
    }

    #[test]
    fn test_trace_dwg_elevation_shared() {
        let version = CadVersion::AC1015;
        let mut t = Trace::new(quad());
        for c in t.corners.iter_mut() {
            c.z = 3.5;
        }
        let mut w = BitWriter::new(version);
        t.write_dwg(version, &mut w).unwrap();
        let mut r = BitReader::new(w.into_data(), version);
        let mut back = Trace::default();
        back.parse_dwg(version, &mut r).unwrap();
        assert_eq!(back.corners, t.corners);
    }

    #[test]
    fn test_face_edge_visibility() {
        let mut f = Face3D::new(quad());
        assert!(f.is_edge_visible(0));
        f.set_edge_visible(2, false);
        assert_eq!(f.invisible_edges, 4);
        assert!(!f.is_edge_visible(2));
    }

    #[test]
    fn test_face_dxf_roundtrip() {
        let mut f = Face3D::new(quad());
        f.invisible_edges = 0x05;
        let mut w = TextWriter::new(Vec::new());
        f.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "3DFACE");
        let mut back = Face3D::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.corners, f.corners);
        assert_eq!(back.invisible_edges, f.invisible_edges);
    }

    #[test]
    fn test_face_dwg_roundtrip() {
        for version in [CadVersion::AC1014, CadVersion::AC1015, CadVersion::AC1024] {
            let mut f = Face3D::new(quad());
            f.corners[1].z = 7.25;
            f.invisible_edges = 9;
            let mut w = BitWriter::new(version);
            f.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Face3D::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.corners, f.corners, "{version:?}");
            assert_eq!(back.invisible_edges, f.invisible_edges, "{version:?}");
        }
    }
}
