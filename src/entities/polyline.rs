//! Heavyweight polyline entities and their vertex records.
//!
//! In the text format a POLYLINE is followed by VERTEX records and a
//! SEQEND; the binary stream keeps that shape with separately framed
//! vertex objects.  Readers fold the sequence back into one
//! [`Polyline`] value.

use bitflags::bitflags;

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord, Handle};

use super::EntityHeader;

bitflags! {
    /// Polyline flags, group 70.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PolylineFlags: i16 {
        const CLOSED = 1;
        const CURVE_FIT = 2;
        const SPLINE_FIT = 4;
        const POLYLINE_3D = 8;
        const POLYGON_MESH = 16;
        const MESH_CLOSED_N = 32;
        const POLYFACE_MESH = 64;
        const CONTINUOUS_PATTERN = 128;
    }
}

bitflags! {
    /// Vertex flags, group 70.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VertexFlags: i16 {
        const EXTRA = 1;
        const CURVE_FIT = 2;
        const SPLINE_FIT = 8;
        const SPLINE_FRAME = 16;
        const POLYLINE_3D = 32;
        const MESH_3D = 64;
        const POLYFACE = 128;
    }
}

/// A vertex of a heavyweight polyline.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Location |
/// | 40, 41 | Start / end width |
/// | 42 | Bulge |
/// | 50 | Curve fit tangent (degrees) |
/// | 70 | Vertex flags |
/// | 91 | Vertex identifier |
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vertex {
    pub common: EntityHeader,
    pub location: Coord,
    pub start_width: f64,
    pub end_width: f64,
    pub bulge: f64,
    /// Curve fit tangent direction in radians.
    pub tangent: f64,
    pub flags: VertexFlags,
    pub vertex_id: i32,
}

impl Vertex {
    pub fn new(location: Coord) -> Self {
        Vertex {
            location,
            ..Default::default()
        }
    }

    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Vertex::new(Coord::new(x, y, z))
    }

    pub fn with_bulge(location: Coord, bulge: f64) -> Self {
        Vertex {
            location,
            bulge,
            ..Default::default()
        }
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => self.location.x = reader.get_double()?,
            20 => self.location.y = reader.get_double()?,
            30 => self.location.z = reader.get_double()?,
            40 => self.start_width = reader.get_double()?,
            41 => self.end_width = reader.get_double()?,
            42 => self.bulge = reader.get_double()?,
            50 => self.tangent = reader.get_double()?.to_radians(),
            70 => self.flags = VertexFlags::from_bits_retain(reader.get_int16()?),
            91 => self.vertex_id = reader.get_int32()?,
            // Mesh face indices are not modelled; absorb them.
            71..=74 => {
                reader.get_int16()?;
            }
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter, is_3d: bool) -> Result<()> {
        w.write_string(0, "VERTEX")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbVertex")?;
            let subclass = if is_3d { "AcDb3dPolylineVertex" } else { "AcDb2dVertex" };
            w.write_string(100, subclass)?;
        }
        w.write_coord(10, self.location)?;
        if self.start_width != 0.0 {
            w.write_double(40, self.start_width)?;
        }
        if self.end_width != 0.0 {
            w.write_double(41, self.end_width)?;
        }
        if self.bulge != 0.0 {
            w.write_double(42, self.bulge)?;
        }
        if !self.flags.is_empty() {
            w.write_int16(70, self.flags.bits())?;
        }
        if self.tangent != 0.0 {
            w.write_double(50, self.tangent.to_degrees())?;
        }
        self.common.write_ext_data(w)
    }

    /// Binary body of a 2D vertex.
    pub fn parse_dwg_2d(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.flags = VertexFlags::from_bits_retain(r.get_raw_char()? as i16);
        self.location = r.get_coord()?;
        let start_width = r.get_bit_double()?;
        if start_width < 0.0 {
            self.start_width = -start_width;
            self.end_width = -start_width;
        } else {
            self.start_width = start_width;
            self.end_width = r.get_bit_double()?;
        }
        self.bulge = r.get_bit_double()?;
        if version.r2010_plus() {
            self.vertex_id = r.get_bit_long()?;
        }
        self.tangent = r.get_bit_double()?;
        Ok(())
    }

    pub fn write_dwg_2d(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_raw_char(70, self.flags.bits() as u8)?;
        w.write_coord(10, self.location)?;
        if self.start_width == self.end_width && self.start_width != 0.0 {
            w.write_bit_double(40, -self.start_width)?;
        } else {
            w.write_bit_double(40, self.start_width)?;
            w.write_bit_double(41, self.end_width)?;
        }
        w.write_bit_double(42, self.bulge)?;
        if version.r2010_plus() {
            w.write_bit_long(91, self.vertex_id)?;
        }
        w.write_bit_double(50, self.tangent)?;
        Ok(())
    }

    /// Binary body of a 3D vertex, location only.
    pub fn parse_dwg_3d(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.flags = VertexFlags::from_bits_retain(r.get_raw_char()? as i16);
        self.location = r.get_coord()?;
        Ok(())
    }

    pub fn write_dwg_3d(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_raw_char(70, self.flags.bits() as u8)?;
        w.write_coord(10, self.location)?;
        Ok(())
    }
}

/// A polyline built from a vertex sequence.
///
/// Covers both the 2D form with widths and bulges and the 3D form;
/// [`PolylineFlags::POLYLINE_3D`] selects which.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 66 | Vertices follow (always 1) |
/// | 10, 20, 30 | Elevation point (z carries the elevation) |
/// | 70 | Flags |
/// | 40, 41 | Default start / end width |
/// | 75 | Curve smoothing type |
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub common: EntityHeader,
    pub vertices: Vec<Vertex>,
    pub flags: PolylineFlags,
    pub default_start_width: f64,
    pub default_end_width: f64,
    pub thickness: f64,
    pub elevation: f64,
    /// Curve smoothing applied by the producing application, group 75.
    pub curve_type: i16,
    pub seqend_handle: Handle,
}

impl Polyline {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Polyline {
            vertices,
            ..Default::default()
        }
    }

    pub fn new_3d(vertices: Vec<Vertex>) -> Self {
        let mut p = Self::new(vertices);
        p.flags |= PolylineFlags::POLYLINE_3D;
        for v in &mut p.vertices {
            v.flags |= VertexFlags::POLYLINE_3D;
        }
        p
    }

    pub fn closed(mut self) -> Self {
        self.flags |= PolylineFlags::CLOSED;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(PolylineFlags::CLOSED)
    }

    pub fn is_3d(&self) -> bool {
        self.flags.contains(PolylineFlags::POLYLINE_3D)
    }

    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.push(vertex);
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => {
                reader.get_double()?;
            }
            20 => {
                reader.get_double()?;
            }
            30 => self.elevation = reader.get_double()?,
            39 => self.thickness = reader.get_double()?,
            40 => self.default_start_width = reader.get_double()?,
            41 => self.default_end_width = reader.get_double()?,
            70 => self.flags = PolylineFlags::from_bits_retain(reader.get_int16()?),
            75 => self.curve_type = reader.get_int16()?,
            // Obsolete marker and mesh counts.
            66 | 71 | 72 | 73 | 74 => {
                reader.get_int16()?;
            }
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "POLYLINE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            let subclass = if self.is_3d() { "AcDb3dPolyline" } else { "AcDb2dPolyline" };
            w.write_string(100, subclass)?;
        }
        w.write_int16(66, 1)?;
        w.write_coord(10, Coord::new(0.0, 0.0, self.elevation))?;
        if self.thickness != 0.0 {
            w.write_double(39, self.thickness)?;
        }
        w.write_int16(70, self.flags.bits())?;
        if self.default_start_width != 0.0 {
            w.write_double(40, self.default_start_width)?;
        }
        if self.default_end_width != 0.0 {
            w.write_double(41, self.default_end_width)?;
        }
        if self.curve_type != 0 {
            w.write_int16(75, self.curve_type)?;
        }
        self.common.write_extrusion_dxf(w)?;
        self.common.write_ext_data(w)?;
        for v in &self.vertices {
            v.write_dxf(version, w, self.is_3d())?;
        }
        w.write_string(0, "SEQEND")?;
        let mut seqend = EntityHeader::new();
        seqend.handle = self.seqend_handle;
        seqend.layer = self.common.layer.clone();
        seqend.write_dxf(version, w)?;
        Ok(())
    }

    /// Binary body, vertices arrive as separately framed objects.
    /// The object type code distinguishes the 2D and 3D forms.
    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader, is_3d: bool) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        if is_3d {
            let curve_flags = r.get_raw_char()?;
            let spline_flags = r.get_raw_char()?;
            self.flags = PolylineFlags::POLYLINE_3D;
            if curve_flags & 1 != 0 {
                self.flags |= PolylineFlags::SPLINE_FIT;
            }
            if spline_flags & 1 != 0 {
                self.flags |= PolylineFlags::CLOSED;
            }
        } else {
            self.flags = PolylineFlags::from_bits_retain(r.get_bit_short()?);
            self.curve_type = r.get_bit_short()?;
            self.default_start_width = r.get_bit_double()?;
            self.default_end_width = r.get_bit_double()?;
            self.thickness = r.get_thickness(version)?;
            self.elevation = r.get_bit_double()?;
            self.common.extrusion = r.get_extrusion(version)?;
        }
        if version.r2004_plus() {
            let owned = r.get_bit_long()?;
            for _ in 0..owned {
                r.get_handle()?;
            }
        } else {
            // First and last vertex references.
            r.get_handle()?;
            r.get_handle()?;
        }
        self.seqend_handle = r.get_handle()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        if self.is_3d() {
            let curve_flags = if self.flags.contains(PolylineFlags::SPLINE_FIT) { 1 } else { 0 };
            let spline_flags = if self.flags.contains(PolylineFlags::CLOSED) { 1 } else { 0 };
            w.write_raw_char(70, curve_flags)?;
            w.write_raw_char(75, spline_flags)?;
        } else {
            w.write_bit_short(70, self.flags.bits())?;
            w.write_bit_short(75, self.curve_type)?;
            w.write_bit_double(40, self.default_start_width)?;
            w.write_bit_double(41, self.default_end_width)?;
            w.write_thickness(39, self.thickness, version)?;
            w.write_bit_double(30, self.elevation)?;
            w.write_extrusion(210, self.common.extrusion, version)?;
        }
        if version.r2004_plus() {
            w.write_bit_long(0, self.vertices.len() as i32)?;
            for v in &self.vertices {
                w.write_handle(0, v.common.handle)?;
            }
        } else {
            let first = self.vertices.first().map(|v| v.common.handle).unwrap_or(Handle::NULL);
            let last = self.vertices.last().map(|v| v.common.handle).unwrap_or(Handle::NULL);
            w.write_handle(0, first)?;
            w.write_handle(0, last)?;
        }
        w.write_handle(0, self.seqend_handle)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    fn sample_2d() -> Polyline {
        let mut p = Polyline::new(vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::with_bulge(Coord::new(10.0, 0.0, 0.0), 0.5),
            Vertex::from_coords(10.0, 8.0, 0.0),
        ])
        .closed();
        p.elevation = 1.5;
        p
    }

    #[test]
    fn test_dxf_sequence_layout() {
        let p = sample_2d();
        let mut w = TextWriter::new(Vec::new());
        p.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let out = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(out.matches("VERTEX").count(), 3);
        let seqend_at = out.find("SEQEND").unwrap();
        let last_vertex_at = out.rfind("VERTEX").unwrap();
        assert!(seqend_at > last_vertex_at);
    }

    #[test]
    fn test_vertex_dxf_roundtrip() {
        let mut v = Vertex::with_bulge(Coord::new(2.0, 3.0, 0.0), -0.7);
        v.start_width = 0.4;
        v.tangent = 0.3;
        let mut w = TextWriter::new(Vec::new());
        v.write_dxf(CadVersion::AC1015, &mut w, false).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "VERTEX");
        let mut back = Vertex::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.location, v.location);
        assert_eq!(back.bulge, v.bulge);
        assert_eq!(back.start_width, 0.4);
        assert!((back.tangent - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_vertex_2d_dwg_equal_widths_collapse() {
        let version = CadVersion::AC1015;
        let mut v = Vertex::from_coords(1.0, 2.0, 0.0);
        v.start_width = 0.8;
        v.end_width = 0.8;
        let mut w = BitWriter::new(version);
        v.write_dwg_2d(version, &mut w).unwrap();
        let mut r = BitReader::new(w.into_data(), version);
        let mut back = Vertex::default();
        back.parse_dwg_2d(version, &mut r).unwrap();
        assert_eq!(back.start_width, 0.8);
        assert_eq!(back.end_width, 0.8);
    }

    #[test]
    fn test_polyline_2d_dwg_roundtrip() {
        for version in [CadVersion::AC1014, CadVersion::AC1015, CadVersion::AC1018] {
            let mut p = sample_2d();
            p.default_start_width = 0.1;
            p.seqend_handle = Handle::new(0x55);
            let mut w = BitWriter::new(version);
            p.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Polyline::default();
            back.parse_dwg(version, &mut r, false).unwrap();
            assert_eq!(back.flags, p.flags, "{version:?}");
            assert_eq!(back.elevation, 1.5, "{version:?}");
            assert_eq!(back.default_start_width, 0.1, "{version:?}");
            assert_eq!(back.seqend_handle, p.seqend_handle, "{version:?}");
        }
    }

    #[test]
    fn test_polyline_3d_dwg_flags() {
        let version = CadVersion::AC1015;
        let p = Polyline::new_3d(vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 1.0, 2.0),
        ])
        .closed();
        let mut w = BitWriter::new(version);
        p.write_dwg(version, &mut w).unwrap();
        let mut r = BitReader::new(w.into_data(), version);
        let mut back = Polyline::default();
        back.parse_dwg(version, &mut r, true).unwrap();
        assert!(back.is_3d());
        assert!(back.is_closed());
    }
}
