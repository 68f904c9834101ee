//! Multi-line text entity.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord, Handle};

use super::EntityHeader;

/// Attachment point, group 71.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentPoint {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AttachmentPoint {
    pub fn from_raw(value: i16) -> Self {
        match value {
            2 => AttachmentPoint::TopCenter,
            3 => AttachmentPoint::TopRight,
            4 => AttachmentPoint::MiddleLeft,
            5 => AttachmentPoint::MiddleCenter,
            6 => AttachmentPoint::MiddleRight,
            7 => AttachmentPoint::BottomLeft,
            8 => AttachmentPoint::BottomCenter,
            9 => AttachmentPoint::BottomRight,
            _ => AttachmentPoint::TopLeft,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            AttachmentPoint::TopLeft => 1,
            AttachmentPoint::TopCenter => 2,
            AttachmentPoint::TopRight => 3,
            AttachmentPoint::MiddleLeft => 4,
            AttachmentPoint::MiddleCenter => 5,
            AttachmentPoint::MiddleRight => 6,
            AttachmentPoint::BottomLeft => 7,
            AttachmentPoint::BottomCenter => 8,
            AttachmentPoint::BottomRight => 9,
        }
    }
}

/// Drawing direction, group 72.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingDirection {
    #[default]
    LeftToRight,
    TopToBottom,
    ByStyle,
}

impl DrawingDirection {
    pub fn from_raw(value: i16) -> Self {
        match value {
            3 => DrawingDirection::TopToBottom,
            5 => DrawingDirection::ByStyle,
            _ => DrawingDirection::LeftToRight,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            DrawingDirection::LeftToRight => 1,
            DrawingDirection::TopToBottom => 3,
            DrawingDirection::ByStyle => 5,
        }
    }
}

/// Paragraph text with inline formatting codes.
///
/// Text longer than 250 bytes is split across group 3 continuation
/// records; readers concatenate groups 3 and 1 in order.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 1 | Text value (final chunk) |
/// | 3 | Text value (leading chunks) |
/// | 10, 20, 30 | Insertion point |
/// | 11, 21, 31 | X-axis direction vector |
/// | 40 | Nominal text height |
/// | 41 | Reference rectangle width |
/// | 44 | Line spacing factor |
/// | 50 | Rotation (degrees) |
/// | 7 | Style name |
/// | 71 | Attachment point |
/// | 72 | Drawing direction |
/// | 73 | Line spacing style |
#[derive(Debug, Clone, PartialEq)]
pub struct MText {
    pub common: EntityHeader,
    pub value: String,
    pub insert_point: Coord,
    /// Unit vector giving the text X axis; encodes the rotation.
    pub direction: Coord,
    pub height: f64,
    pub rect_width: f64,
    pub rect_height: f64,
    /// Extents reported by the producing application.
    pub ext_height: f64,
    pub ext_width: f64,
    pub style: String,
    pub attachment: AttachmentPoint,
    pub drawing_dir: DrawingDirection,
    pub line_spacing_style: i16,
    pub line_spacing_factor: f64,
    pub style_handle: Handle,
}

impl MText {
    pub fn new(value: impl Into<String>, insert_point: Coord, height: f64) -> Self {
        MText {
            common: EntityHeader::new(),
            value: value.into(),
            insert_point,
            direction: Coord::UNIT_X,
            height,
            rect_width: 0.0,
            rect_height: 0.0,
            ext_height: 0.0,
            ext_width: 0.0,
            style: "STANDARD".to_string(),
            attachment: AttachmentPoint::TopLeft,
            drawing_dir: DrawingDirection::LeftToRight,
            line_spacing_style: 1,
            line_spacing_factor: 1.0,
            style_handle: Handle::NULL,
        }
    }

    /// Rotation of the text X axis in radians.
    pub fn rotation(&self) -> f64 {
        self.direction.y.atan2(self.direction.x)
    }

    pub fn set_rotation(&mut self, radians: f64) {
        self.direction = Coord::new(radians.cos(), radians.sin(), 0.0);
    }

    /// Plain text with the most common inline codes stripped.
    pub fn plain_text(&self) -> String {
        let mut out = String::with_capacity(self.value.len());
        let mut chars = self.value.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\\' {
                if c != '{' && c != '}' {
                    out.push(c);
                }
                continue;
            }
            match chars.next() {
                Some('P') => out.push('\n'),
                Some('\\') => out.push('\\'),
                Some('{') => out.push('{'),
                Some('}') => out.push('}'),
                Some('~') => out.push(' '),
                // Formatting codes carry an argument up to a semicolon.
                Some('f' | 'F' | 'H' | 'W' | 'Q' | 'C' | 'c' | 'T' | 'A' | 'p') => {
                    for a in chars.by_ref() {
                        if a == ';' {
                            break;
                        }
                    }
                }
                Some(other) => out.push(other),
                None => {}
            }
        }
        out
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            1 => self.value.push_str(&reader.get_utf8_string()?),
            3 => self.value.push_str(&reader.get_utf8_string()?),
            7 => self.style = reader.get_utf8_string()?,
            10 => self.insert_point.x = reader.get_double()?,
            20 => self.insert_point.y = reader.get_double()?,
            30 => self.insert_point.z = reader.get_double()?,
            11 => self.direction.x = reader.get_double()?,
            21 => self.direction.y = reader.get_double()?,
            31 => self.direction.z = reader.get_double()?,
            40 => self.height = reader.get_double()?,
            41 => self.rect_width = reader.get_double()?,
            42 => self.ext_width = reader.get_double()?,
            43 => self.ext_height = reader.get_double()?,
            44 => self.line_spacing_factor = reader.get_double()?,
            50 => {
                let radians = reader.get_double()?.to_radians();
                self.set_rotation(radians);
            }
            71 => self.attachment = AttachmentPoint::from_raw(reader.get_int16()?),
            72 => self.drawing_dir = DrawingDirection::from_raw(reader.get_int16()?),
            73 => self.line_spacing_style = reader.get_int16()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "MTEXT")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbMText")?;
        }
        w.write_coord(10, self.insert_point)?;
        w.write_double(40, self.height)?;
        if self.rect_width != 0.0 {
            w.write_double(41, self.rect_width)?;
        }
        w.write_int16(71, self.attachment.raw())?;
        w.write_int16(72, self.drawing_dir.raw())?;
        write_chunked_text(w, &self.value)?;
        if self.style != "STANDARD" {
            w.write_string(7, &self.style)?;
        }
        self.common.write_extrusion_dxf(w)?;
        w.write_coord(11, self.direction)?;
        w.write_int16(73, self.line_spacing_style)?;
        if self.line_spacing_factor != 1.0 {
            w.write_double(44, self.line_spacing_factor)?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.insert_point = r.get_coord()?;
        self.common.extrusion = r.get_coord()?;
        self.direction = r.get_coord()?;
        self.rect_width = r.get_bit_double()?;
        if version.r2007_plus() {
            self.rect_height = r.get_bit_double()?;
        }
        self.height = r.get_bit_double()?;
        self.attachment = AttachmentPoint::from_raw(r.get_bit_short()?);
        self.drawing_dir = DrawingDirection::from_raw(r.get_bit_short()?);
        self.ext_height = r.get_bit_double()?;
        self.ext_width = r.get_bit_double()?;
        self.value = r.get_variable_text(version, false)?;
        if version.r2000_plus() {
            self.line_spacing_style = r.get_bit_short()?;
            self.line_spacing_factor = r.get_bit_double()?;
            let _unknown = r.get_bit()?;
        }
        self.style_handle = r.get_handle()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.insert_point)?;
        w.write_coord(210, self.common.extrusion)?;
        w.write_coord(11, self.direction)?;
        w.write_bit_double(41, self.rect_width)?;
        if version.r2007_plus() {
            w.write_bit_double(46, self.rect_height)?;
        }
        w.write_bit_double(40, self.height)?;
        w.write_bit_short(71, self.attachment.raw())?;
        w.write_bit_short(72, self.drawing_dir.raw())?;
        w.write_bit_double(43, self.ext_height)?;
        w.write_bit_double(42, self.ext_width)?;
        w.write_variable_text(1, &self.value, version, false)?;
        if version.r2000_plus() {
            w.write_bit_short(73, self.line_spacing_style)?;
            w.write_bit_double(44, self.line_spacing_factor)?;
            w.write_bit(0, false)?;
        }
        w.write_handle(7, self.style_handle)?;
        Ok(())
    }
}

impl Default for MText {
    fn default() -> Self {
        Self::new("", Coord::ZERO, 1.0)
    }
}

/// Splits long text into 250-byte group 3 chunks with the tail on group 1.
fn write_chunked_text(w: &mut dyn RecordWriter, value: &str) -> Result<()> {
    const CHUNK: usize = 250;
    if value.len() <= CHUNK {
        return w.write_string(1, value);
    }
    let mut rest = value;
    while rest.len() > CHUNK {
        let mut cut = CHUNK;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        w.write_string(3, head)?;
        rest = tail;
    }
    w.write_string(1, rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    #[test]
    fn test_attachment_raw_values() {
        assert_eq!(AttachmentPoint::from_raw(5), AttachmentPoint::MiddleCenter);
        assert_eq!(AttachmentPoint::from_raw(0), AttachmentPoint::TopLeft);
        assert_eq!(AttachmentPoint::BottomRight.raw(), 9);
        assert_eq!(DrawingDirection::from_raw(3), DrawingDirection::TopToBottom);
    }

    #[test]
    fn test_rotation_from_direction() {
        let mut m = MText::default();
        m.set_rotation(std::f64::consts::FRAC_PI_2);
        assert!((m.rotation() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(m.direction.x.abs() < 1e-12);
    }

    #[test]
    fn test_plain_text_strips_formatting() {
        let mut m = MText::default();
        m.value = "{\\fArial|b0;First\\PSecond\\~line}".to_string();
        assert_eq!(m.plain_text(), "First\nSecond line");
    }

    #[test]
    fn test_long_text_splits_into_chunks() {
        let mut m = MText::new("x".repeat(520), Coord::ZERO, 2.0);
        m.attachment = AttachmentPoint::MiddleCenter;
        let mut w = TextWriter::new(Vec::new());
        m.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let out = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(out.matches("\n  3\n").count(), 2);

        let mut r = TextReader::new(std::io::Cursor::new(out.into_bytes()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "MTEXT");
        let mut back = MText::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.value.len(), 520);
        assert_eq!(back.attachment, AttachmentPoint::MiddleCenter);
    }

    #[test]
    fn test_mtext_dwg_roundtrip() {
        for version in [CadVersion::AC1014, CadVersion::AC1015, CadVersion::AC1021] {
            let mut m = MText::new("First\\PSecond", Coord::new(3.0, 4.0, 0.0), 2.5);
            m.set_rotation(0.5);
            m.rect_width = 80.0;
            m.attachment = AttachmentPoint::BottomLeft;
            m.line_spacing_factor = 1.5;
            m.style_handle = Handle::new(0x21);

            let mut w = BitWriter::new(version);
            m.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = MText::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.value, m.value, "{version:?}");
            assert_eq!(back.insert_point, m.insert_point, "{version:?}");
            assert_eq!(back.attachment, m.attachment, "{version:?}");
            assert!((back.rotation() - 0.5).abs() < 1e-12, "{version:?}");
            if version.r2000_plus() {
                assert_eq!(back.line_spacing_factor, 1.5, "{version:?}");
            }
            assert_eq!(back.style_handle, m.style_handle, "{version:?}");
        }
    }
}
