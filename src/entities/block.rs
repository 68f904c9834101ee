//! Block begin/end entities.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

/// Block definition flags, group 70.
pub mod block_flags {
    pub const ANONYMOUS: i16 = 1;
    pub const HAS_ATTDEFS: i16 = 2;
    pub const IS_XREF: i16 = 4;
    pub const IS_XREF_OVERLAY: i16 = 8;
}

/// Start of a block definition.
///
/// The binary object body carries only the name; base point and flags
/// are properties of the text form.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 2, 3 | Block name |
/// | 70 | Flags |
/// | 10, 20, 30 | Base point |
/// | 1 | Xref path name |
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub common: EntityHeader,
    pub name: String,
    pub base_point: Coord,
    pub flags: i16,
    pub xref_path: String,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            common: EntityHeader::new(),
            name: name.into(),
            base_point: Coord::ZERO,
            flags: 0,
            xref_path: String::new(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.flags & block_flags::ANONYMOUS != 0
    }

    pub fn is_xref(&self) -> bool {
        self.flags & block_flags::IS_XREF != 0
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            1 => self.xref_path = reader.get_utf8_string()?,
            2 | 3 => self.name = reader.get_utf8_string()?,
            70 => self.flags = reader.get_int16()?,
            10 => self.base_point.x = reader.get_double()?,
            20 => self.base_point.y = reader.get_double()?,
            30 => self.base_point.z = reader.get_double()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "BLOCK")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbBlockBegin")?;
        }
        w.write_string(2, &self.name)?;
        w.write_int16(70, self.flags)?;
        w.write_coord(10, self.base_point)?;
        w.write_string(3, &self.name)?;
        if !self.xref_path.is_empty() {
            w.write_string(1, &self.xref_path)?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.name = r.get_variable_text(version, false)?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_variable_text(2, &self.name, version, false)?;
        Ok(())
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new("*U0")
    }
}

/// End of a block definition; carries no data of its own.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockEnd {
    pub common: EntityHeader,
}

impl BlockEnd {
    pub fn new() -> Self {
        BlockEnd {
            common: EntityHeader::new(),
        }
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        self.common.parse_code(code, reader)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "ENDBLK")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbBlockEnd")?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    #[test]
    fn test_block_flags() {
        let mut b = Block::new("DETAIL");
        assert!(!b.is_anonymous());
        b.flags = block_flags::ANONYMOUS | block_flags::IS_XREF;
        assert!(b.is_anonymous());
        assert!(b.is_xref());
    }

    #[test]
    fn test_block_dxf_roundtrip() {
        let mut b = Block::new("TITLE_FRAME");
        b.base_point = Coord::new(10.0, 20.0, 0.0);
        b.flags = 2;
        let mut w = TextWriter::new(Vec::new());
        b.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "BLOCK");
        let mut back = Block::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.name, b.name);
        assert_eq!(back.base_point, b.base_point);
        assert_eq!(back.flags, b.flags);
    }

    #[test]
    fn test_block_dwg_roundtrip() {
        for version in [CadVersion::AC1015, CadVersion::AC1021] {
            let b = Block::new("Prüfmaß");
            let mut w = BitWriter::new(version);
            b.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Block::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.name, b.name, "{version:?}");
        }
    }

    #[test]
    fn test_block_end_is_bare() {
        let e = BlockEnd::new();
        let mut w = TextWriter::new(Vec::new());
        e.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert!(text.starts_with("  0\nENDBLK\n"));
        assert!(text.contains("100\nAcDbBlockEnd\n"));
    }
}
