//! Insert entity, a block reference.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord, Handle};

use super::EntityHeader;

/// A placed instance of a block, optionally repeated as an array.
///
/// Column or row counts other than one make this a multi-insert; the
/// binary format gives that form its own opcode.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 2 | Block name |
/// | 10, 20, 30 | Insertion point |
/// | 41, 42, 43 | Scale factors (default 1) |
/// | 50 | Rotation (degrees) |
/// | 70, 71 | Column / row count (default 1) |
/// | 44, 45 | Column / row spacing (default 0) |
/// | 210, 220, 230 | Extrusion direction (optional) |
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub common: EntityHeader,
    pub name: String,
    pub insert_point: Coord,
    pub scale: Coord,
    /// Rotation in radians.
    pub rotation: f64,
    pub columns: i16,
    pub rows: i16,
    pub col_spacing: f64,
    pub row_spacing: f64,
    /// Block header reference carried only by the binary stream.
    pub block_handle: Handle,
}

impl Insert {
    pub fn new(name: impl Into<String>, insert_point: Coord) -> Self {
        Insert {
            common: EntityHeader::new(),
            name: name.into(),
            insert_point,
            scale: Coord::new(1.0, 1.0, 1.0),
            rotation: 0.0,
            columns: 1,
            rows: 1,
            col_spacing: 0.0,
            row_spacing: 0.0,
            block_handle: Handle::NULL,
        }
    }

    pub fn is_array(&self) -> bool {
        self.columns != 1 || self.rows != 1
    }

    pub fn is_uniformly_scaled(&self) -> bool {
        self.scale.x == self.scale.y && self.scale.y == self.scale.z
    }

    pub fn with_scale(mut self, factor: f64) -> Self {
        self.scale = Coord::new(factor, factor, factor);
        self
    }

    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            2 => self.name = reader.get_utf8_string()?,
            10 => self.insert_point.x = reader.get_double()?,
            20 => self.insert_point.y = reader.get_double()?,
            30 => self.insert_point.z = reader.get_double()?,
            41 => self.scale.x = reader.get_double()?,
            42 => self.scale.y = reader.get_double()?,
            43 => self.scale.z = reader.get_double()?,
            50 => self.rotation = reader.get_double()?.to_radians(),
            70 => self.columns = reader.get_int16()?,
            71 => self.rows = reader.get_int16()?,
            44 => self.col_spacing = reader.get_double()?,
            45 => self.row_spacing = reader.get_double()?,
            // Attributes-follow marker; attributes are not modeled.
            66 => {
                reader.get_int16()?;
            }
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "INSERT")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbBlockReference")?;
        }
        w.write_string(2, &self.name)?;
        w.write_coord(10, self.insert_point)?;
        w.write_double(41, self.scale.x)?;
        w.write_double(42, self.scale.y)?;
        w.write_double(43, self.scale.z)?;
        if self.rotation != 0.0 {
            w.write_double(50, self.rotation.to_degrees())?;
        }
        if self.is_array() {
            w.write_int16(70, self.columns)?;
            w.write_int16(71, self.rows)?;
            w.write_double(44, self.col_spacing)?;
            w.write_double(45, self.row_spacing)?;
        }
        self.common.write_extrusion_dxf(w)?;
        self.common.write_ext_data(w)
    }

    /// `array` distinguishes the multi-insert opcode body, which carries
    /// the column and row block after the scales.
    pub fn parse_dwg(
        &mut self,
        version: CadVersion,
        r: &mut dyn RecordReader,
        array: bool,
    ) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.insert_point = r.get_coord()?;
        if version.r2000_plus() {
            let flags = r.get_2bits()?;
            self.scale.x = if flags & 1 != 0 { 1.0 } else { r.get_raw_double()? };
            if flags & 2 != 0 {
                self.scale.y = self.scale.x;
                self.scale.z = self.scale.x;
            } else {
                self.scale.y = r.get_bit_double_default(self.scale.x)?;
                self.scale.z = r.get_bit_double_default(self.scale.x)?;
            }
        } else {
            self.scale.x = r.get_bit_double()?;
            self.scale.y = r.get_bit_double()?;
            self.scale.z = r.get_bit_double()?;
        }
        self.rotation = r.get_bit_double()?;
        self.common.extrusion = r.get_extrusion(version)?;
        let has_attribs = r.get_bit()?;
        let mut owned = 0i32;
        if version.r2004_plus() && has_attribs {
            owned = r.get_bit_long()?;
        }
        if array {
            self.columns = r.get_bit_short()?;
            self.rows = r.get_bit_short()?;
            self.col_spacing = r.get_bit_double()?;
            self.row_spacing = r.get_bit_double()?;
        }
        self.block_handle = r.get_handle()?;
        if has_attribs {
            if version.r2004_plus() {
                for _ in 0..owned.max(0) {
                    r.get_handle()?;
                }
            } else {
                r.get_handle()?;
                r.get_handle()?;
            }
            r.get_handle()?;
        }
        Ok(())
    }

    /// Attribute ownership is not modeled, so the written form always
    /// declares none.
    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.insert_point)?;
        if version.r2000_plus() {
            let unit = self.scale == Coord::new(1.0, 1.0, 1.0);
            if unit {
                w.write_2bits(0, 3)?;
            } else if self.is_uniformly_scaled() {
                w.write_2bits(0, 2)?;
                w.write_raw_double(41, self.scale.x)?;
            } else if self.scale.x == 1.0 {
                w.write_2bits(0, 1)?;
                w.write_bit_double_default(42, self.scale.y, 1.0)?;
                w.write_bit_double_default(43, self.scale.z, 1.0)?;
            } else {
                w.write_2bits(0, 0)?;
                w.write_raw_double(41, self.scale.x)?;
                w.write_bit_double_default(42, self.scale.y, self.scale.x)?;
                w.write_bit_double_default(43, self.scale.z, self.scale.x)?;
            }
        } else {
            w.write_bit_double(41, self.scale.x)?;
            w.write_bit_double(42, self.scale.y)?;
            w.write_bit_double(43, self.scale.z)?;
        }
        w.write_bit_double(50, self.rotation)?;
        w.write_extrusion(210, self.common.extrusion, version)?;
        w.write_bit(66, false)?;
        if self.is_array() {
            w.write_bit_short(70, self.columns)?;
            w.write_bit_short(71, self.rows)?;
            w.write_bit_double(44, self.col_spacing)?;
            w.write_bit_double(45, self.row_spacing)?;
        }
        w.write_handle(2, self.block_handle)?;
        Ok(())
    }
}

impl Default for Insert {
    fn default() -> Self {
        Self::new("*U0", Coord::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    #[test]
    fn test_insert_defaults() {
        let i = Insert::default();
        assert_eq!(i.scale, Coord::new(1.0, 1.0, 1.0));
        assert_eq!(i.columns, 1);
        assert!(!i.is_array());
    }

    #[test]
    fn test_insert_dxf_roundtrip() {
        let mut i = Insert::new("DOOR", Coord::new(5.0, 6.0, 0.0));
        i.scale = Coord::new(2.0, 2.0, 1.0);
        i.rotation = std::f64::consts::FRAC_PI_4;
        i.columns = 3;
        i.rows = 2;
        i.col_spacing = 10.0;
        i.row_spacing = 8.0;

        let mut w = TextWriter::new(Vec::new());
        i.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "INSERT");
        let mut back = Insert::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.name, i.name);
        assert_eq!(back.insert_point, i.insert_point);
        assert_eq!(back.scale, i.scale);
        assert!((back.rotation - i.rotation).abs() < 1e-12);
        assert_eq!(back.columns, 3);
        assert_eq!(back.row_spacing, 8.0);
    }

    #[test]
    fn test_insert_dwg_roundtrip_scales() {
        let version = CadVersion::AC1015;
        let scales = [
            Coord::new(1.0, 1.0, 1.0),
            Coord::new(2.5, 2.5, 2.5),
            Coord::new(1.0, 3.0, 4.0),
            Coord::new(2.0, 3.0, 4.0),
        ];
        for scale in scales {
            let mut i = Insert::new("PART", Coord::new(1.0, 2.0, 3.0));
            i.scale = scale;
            i.block_handle = Handle::new(0x44);
            let mut w = BitWriter::new(version);
            i.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Insert::default();
            back.parse_dwg(version, &mut r, false).unwrap();
            assert_eq!(back.scale, scale, "scale {scale:?}");
            assert_eq!(back.block_handle, i.block_handle);
        }
    }

    #[test]
    fn test_minsert_dwg_roundtrip() {
        for version in [CadVersion::AC1014, CadVersion::AC1018] {
            let mut i = Insert::new("GRID", Coord::ZERO);
            i.columns = 4;
            i.rows = 5;
            i.col_spacing = 12.5;
            i.row_spacing = 7.5;
            let mut w = BitWriter::new(version);
            i.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Insert::default();
            back.parse_dwg(version, &mut r, true).unwrap();
            assert_eq!(back.columns, 4, "{version:?}");
            assert_eq!(back.rows, 5, "{version:?}");
            assert_eq!(back.col_spacing, 12.5, "{version:?}");
            assert_eq!(back.row_spacing, 7.5, "{version:?}");
        }
    }
}
