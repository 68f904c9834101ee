//! Lightweight polyline entity, a flat 2D polyline with bulges.

use bitflags::bitflags;

use crate::error::{CadError, Result};
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

bitflags! {
    /// Polyline flags, group 70.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LwPolylineFlags: i16 {
        const CLOSED = 1;
        const PLINEGEN = 128;
    }
}

/// A vertex in a lightweight polyline.
///
/// The bulge is tan of a quarter of the included arc angle; zero means
/// a straight segment, negative values bend clockwise.  Locations are
/// flat, z is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LwVertex {
    pub location: Coord,
    pub bulge: f64,
    pub start_width: f64,
    pub end_width: f64,
}

impl LwVertex {
    pub fn new(location: Coord) -> Self {
        LwVertex {
            location,
            bulge: 0.0,
            start_width: 0.0,
            end_width: 0.0,
        }
    }

    pub fn from_coords(x: f64, y: f64) -> Self {
        LwVertex::new(Coord::new(x, y, 0.0))
    }

    pub fn with_bulge(location: Coord, bulge: f64) -> Self {
        LwVertex {
            location,
            bulge,
            start_width: 0.0,
            end_width: 0.0,
        }
    }

    pub fn has_widths(&self) -> bool {
        self.start_width != 0.0 || self.end_width != 0.0
    }
}

/// A 2D polyline stored as one record rather than a vertex sequence.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 90 | Vertex count |
/// | 70 | Flags (1 = closed, 128 = linetype generation) |
/// | 43 | Constant width |
/// | 38 | Elevation |
/// | 39 | Thickness |
/// | 10, 20 | Vertex point (repeats) |
/// | 40, 41 | Start / end width (per vertex) |
/// | 42 | Bulge (per vertex) |
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LwPolyline {
    pub common: EntityHeader,
    pub vertices: Vec<LwVertex>,
    pub flags: LwPolylineFlags,
    pub const_width: f64,
    pub elevation: f64,
    pub thickness: f64,
    /// Vertex identifiers, present only in newer drawings.
    pub vertex_ids: Vec<i32>,
}

impl LwPolyline {
    pub fn new(vertices: Vec<LwVertex>) -> Self {
        LwPolyline {
            vertices,
            ..Default::default()
        }
    }

    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| LwVertex::from_coords(x, y)).collect())
    }

    pub fn closed(mut self) -> Self {
        self.flags |= LwPolylineFlags::CLOSED;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(LwPolylineFlags::CLOSED)
    }

    /// Total length of the straight segments, arcs approximated from bulges.
    pub fn length(&self) -> f64 {
        let n = self.vertices.len();
        if n < 2 {
            return 0.0;
        }
        let segments = if self.is_closed() { n } else { n - 1 };
        let mut total = 0.0;
        for i in 0..segments {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            let chord = a.location.distance(&b.location);
            if a.bulge == 0.0 || chord == 0.0 {
                total += chord;
            } else {
                let theta = 4.0 * a.bulge.atan();
                let radius = chord / (2.0 * (theta / 2.0).sin().abs());
                total += (radius * theta).abs();
            }
        }
        total
    }

    fn has_varying_widths(&self) -> bool {
        self.vertices.iter().any(LwVertex::has_widths)
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            90 => {
                let count = reader.get_int32()?;
                self.vertices.reserve(count.max(0) as usize);
            }
            70 => self.flags = LwPolylineFlags::from_bits_retain(reader.get_int16()?),
            43 => self.const_width = reader.get_double()?,
            38 => self.elevation = reader.get_double()?,
            39 => self.thickness = reader.get_double()?,
            10 => {
                let x = reader.get_double()?;
                self.vertices.push(LwVertex::from_coords(x, 0.0));
            }
            20 => {
                if let Some(v) = self.vertices.last_mut() {
                    v.location.y = reader.get_double()?;
                }
            }
            40 => {
                if let Some(v) = self.vertices.last_mut() {
                    v.start_width = reader.get_double()?;
                }
            }
            41 => {
                if let Some(v) = self.vertices.last_mut() {
                    v.end_width = reader.get_double()?;
                }
            }
            42 => {
                if let Some(v) = self.vertices.last_mut() {
                    v.bulge = reader.get_double()?;
                }
            }
            91 => self.vertex_ids.push(reader.get_int32()?),
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "LWPOLYLINE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbPolyline")?;
        }
        w.write_int32(90, self.vertices.len() as i32)?;
        w.write_int16(70, self.flags.bits())?;
        if self.const_width != 0.0 {
            w.write_double(43, self.const_width)?;
        }
        if self.elevation != 0.0 {
            w.write_double(38, self.elevation)?;
        }
        if self.thickness != 0.0 {
            w.write_double(39, self.thickness)?;
        }
        for (i, v) in self.vertices.iter().enumerate() {
            w.write_double(10, v.location.x)?;
            w.write_double(20, v.location.y)?;
            if let Some(id) = self.vertex_ids.get(i) {
                w.write_int32(91, *id)?;
            }
            if v.has_widths() {
                w.write_double(40, v.start_width)?;
                w.write_double(41, v.end_width)?;
            }
            if v.bulge != 0.0 {
                w.write_double(42, v.bulge)?;
            }
        }
        self.common.write_extrusion_dxf(w)?;
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        let raw = r.get_bit_short()?;
        self.flags = LwPolylineFlags::empty();
        if raw & 0x200 != 0 {
            self.flags |= LwPolylineFlags::CLOSED;
        }
        if raw & 0x80 != 0 {
            self.flags |= LwPolylineFlags::PLINEGEN;
        }
        if raw & 4 != 0 {
            self.const_width = r.get_bit_double()?;
        }
        if raw & 8 != 0 {
            self.elevation = r.get_bit_double()?;
        }
        if raw & 2 != 0 {
            self.thickness = r.get_bit_double()?;
        }
        if raw & 1 != 0 {
            self.common.extrusion = r.get_coord()?;
        } else {
            self.common.extrusion = Coord::UNIT_Z;
        }
        let n_points = r.get_bit_long()?;
        if !(0..=10_000_000).contains(&n_points) {
            return Err(CadError::Malformed(format!(
                "lwpolyline vertex count {n_points}"
            )));
        }
        let n_bulges = if raw & 0x10 != 0 { r.get_bit_long()? } else { 0 };
        let n_ids = if version.r2010_plus() && raw & 0x400 != 0 {
            r.get_bit_long()?
        } else {
            0
        };
        let n_widths = if raw & 0x20 != 0 { r.get_bit_long()? } else { 0 };

        self.vertices.clear();
        for _ in 0..n_points {
            let p = r.get_raw_coord2()?;
            self.vertices.push(LwVertex::new(p));
        }
        for i in 0..n_bulges as usize {
            let bulge = r.get_bit_double()?;
            if let Some(v) = self.vertices.get_mut(i) {
                v.bulge = bulge;
            }
        }
        self.vertex_ids.clear();
        for _ in 0..n_ids {
            self.vertex_ids.push(r.get_bit_long()?);
        }
        for i in 0..n_widths as usize {
            let sw = r.get_bit_double()?;
            let ew = r.get_bit_double()?;
            if let Some(v) = self.vertices.get_mut(i) {
                v.start_width = sw;
                v.end_width = ew;
            }
        }
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        let has_bulges = self.vertices.iter().any(|v| v.bulge != 0.0);
        let has_widths = self.has_varying_widths();
        let has_ids = version.r2010_plus() && !self.vertex_ids.is_empty();
        let has_normal = self.common.extrusion != Coord::UNIT_Z;

        let mut raw: i16 = 0;
        if self.flags.contains(LwPolylineFlags::CLOSED) {
            raw |= 0x200;
        }
        if self.flags.contains(LwPolylineFlags::PLINEGEN) {
            raw |= 0x80;
        }
        if self.const_width != 0.0 {
            raw |= 4;
        }
        if self.elevation != 0.0 {
            raw |= 8;
        }
        if self.thickness != 0.0 {
            raw |= 2;
        }
        if has_normal {
            raw |= 1;
        }
        if has_bulges {
            raw |= 0x10;
        }
        if has_ids {
            raw |= 0x400;
        }
        if has_widths {
            raw |= 0x20;
        }
        w.write_bit_short(70, raw)?;
        if raw & 4 != 0 {
            w.write_bit_double(43, self.const_width)?;
        }
        if raw & 8 != 0 {
            w.write_bit_double(38, self.elevation)?;
        }
        if raw & 2 != 0 {
            w.write_bit_double(39, self.thickness)?;
        }
        if has_normal {
            w.write_coord(210, self.common.extrusion)?;
        }
        w.write_bit_long(90, self.vertices.len() as i32)?;
        if has_bulges {
            w.write_bit_long(0, self.vertices.len() as i32)?;
        }
        if has_ids {
            w.write_bit_long(0, self.vertex_ids.len() as i32)?;
        }
        if has_widths {
            w.write_bit_long(0, self.vertices.len() as i32)?;
        }
        for v in &self.vertices {
            w.write_raw_coord2(10, v.location)?;
        }
        if has_bulges {
            for v in &self.vertices {
                w.write_bit_double(42, v.bulge)?;
            }
        }
        if has_ids {
            for id in &self.vertex_ids {
                w.write_bit_long(91, *id)?;
            }
        }
        if has_widths {
            for v in &self.vertices {
                w.write_bit_double(40, v.start_width)?;
                w.write_bit_double(41, v.end_width)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    #[test]
    fn test_length_with_bulge() {
        // Two points a half circle apart: bulge 1.0, chord 2, length pi.
        let mut p = LwPolyline::from_points(&[(0.0, 0.0), (2.0, 0.0)]);
        p.vertices[0].bulge = 1.0;
        assert!((p.length() - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_dxf_roundtrip() {
        let mut p = LwPolyline::from_points(&[(0.0, 0.0), (5.0, 0.0), (5.0, 3.0)]).closed();
        p.vertices[1].bulge = 0.5;
        p.vertices[2].start_width = 0.1;
        p.vertices[2].end_width = 0.2;
        p.elevation = 2.0;

        let mut w = TextWriter::new(Vec::new());
        p.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "LWPOLYLINE");
        let mut back = LwPolyline::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.vertices.len(), 3);
        assert!(back.is_closed());
        assert_eq!(back.vertices[1].bulge, 0.5);
        assert_eq!(back.vertices[2].start_width, 0.1);
        assert_eq!(back.elevation, 2.0);
    }

    #[test]
    fn test_dwg_roundtrip() {
        for version in [CadVersion::AC1015, CadVersion::AC1024] {
            let mut p = LwPolyline::from_points(&[(1.0, 1.0), (4.0, 1.0), (4.0, 4.0)]).closed();
            p.vertices[0].bulge = -0.3;
            p.const_width = 0.25;
            if version.r2010_plus() {
                p.vertex_ids = vec![10, 11, 12];
            }

            let mut w = BitWriter::new(version);
            p.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = LwPolyline::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.vertices, p.vertices, "{version:?}");
            assert_eq!(back.flags, p.flags, "{version:?}");
            assert_eq!(back.const_width, 0.25, "{version:?}");
            assert_eq!(back.vertex_ids, p.vertex_ids, "{version:?}");
        }
    }

    #[test]
    fn test_dwg_vertex_count_limit() {
        let version = CadVersion::AC1015;
        let mut w = BitWriter::new(version);
        let p = LwPolyline::default();
        p.common.write_dwg(version, &mut w).unwrap();
        w.write_bit_short(70, 0).unwrap();
        w.write_bit_long(90, 99_000_000).unwrap();
        let mut r = BitReader::new(w.into_data(), version);
        let mut back = LwPolyline::default();
        assert!(back.parse_dwg(version, &mut r).is_err());
    }
}
