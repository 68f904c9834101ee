//! Reader/writer capability traits shared by the text and bit backends.
//!
//! Entity codecs are written once against `RecordReader`/`RecordWriter`.
//! The text backend is record-driven: every getter converts the value of
//! the most recently consumed (code, value) pair, and bit-granular calls
//! degrade to plain numeric conversions.  The bit backend is positional:
//! pair codes passed to the writer are ignored and values are packed in
//! call order.

use crate::error::Result;
use crate::types::{CadVersion, Coord, Handle};

/// Value shape implied by a DXF group code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Str,
    Double,
    Int16,
    Int32,
    Int64,
    Handle,
    Bool,
    Binary,
}

impl CodeKind {
    /// Classify a group code into its value shape.
    ///
    /// Unlisted codes classify as `Str`, which keeps the raw text
    /// available to tolerant callers.
    pub fn of(code: i32) -> CodeKind {
        match code {
            5 | 105 => CodeKind::Handle,
            0..=9 => CodeKind::Str,
            10..=59 => CodeKind::Double,
            60..=79 => CodeKind::Int16,
            90..=99 => CodeKind::Int32,
            100 | 102 => CodeKind::Str,
            110..=149 => CodeKind::Double,
            160..=169 => CodeKind::Int64,
            170..=179 => CodeKind::Int16,
            210..=239 => CodeKind::Double,
            270..=289 => CodeKind::Int16,
            290..=299 => CodeKind::Bool,
            300..=309 => CodeKind::Str,
            310..=319 => CodeKind::Binary,
            320..=369 => CodeKind::Handle,
            370..=389 => CodeKind::Int16,
            400..=409 => CodeKind::Int16,
            410..=419 => CodeKind::Str,
            420..=429 => CodeKind::Int32,
            430..=439 => CodeKind::Str,
            440..=459 => CodeKind::Int32,
            460..=469 => CodeKind::Double,
            470..=479 => CodeKind::Str,
            480..=481 => CodeKind::Handle,
            1000..=1009 => CodeKind::Str,
            1010..=1059 => CodeKind::Double,
            1060..=1070 => CodeKind::Int16,
            1071 => CodeKind::Int32,
            _ => CodeKind::Str,
        }
    }
}

/// Typed value getters over a record stream.
///
/// `get_*` calls consume the next primitive of that shape and advance the
/// cursor.  Running off the end of the stream yields
/// `CadError::UnexpectedEndOfStream`; a value that cannot take the
/// requested shape yields `CadError::Malformed`.
pub trait RecordReader {
    fn get_int16(&mut self) -> Result<i16>;
    fn get_int32(&mut self) -> Result<i32>;
    fn get_double(&mut self) -> Result<f64>;
    fn get_utf8_string(&mut self) -> Result<String>;
    fn get_bool(&mut self) -> Result<bool>;
    fn get_handle(&mut self) -> Result<Handle>;

    /// Consume `len` raw bytes.  The text backend decodes the current
    /// hex-string pair instead and ignores `len`.
    fn get_binary_chunk(&mut self, len: usize) -> Result<Vec<u8>>;

    fn get_bit(&mut self) -> Result<bool>;
    fn get_2bits(&mut self) -> Result<u8>;
    fn get_bit_short(&mut self) -> Result<i16>;
    fn get_bit_long(&mut self) -> Result<i32>;
    fn get_bit_double(&mut self) -> Result<f64>;

    /// Double that deltas against a caller-supplied default.  The bit
    /// backend patches changed low-order bytes over the default; the
    /// text backend reads a plain double.
    fn get_bit_double_default(&mut self, default: f64) -> Result<f64>;
    fn get_raw_char(&mut self) -> Result<u8>;
    fn get_raw_short(&mut self) -> Result<i16>;
    fn get_raw_long(&mut self) -> Result<i32>;
    fn get_raw_double(&mut self) -> Result<f64>;

    /// Length-prefixed text.  2007 and newer (or `force_wide`) is
    /// UTF-16LE code units; older versions are narrow bytes in the
    /// backend's configured encoding.
    fn get_variable_text(&mut self, version: CadVersion, force_wide: bool) -> Result<String>;

    fn at_end(&self) -> bool;

    /// Three bit-doubles.
    fn get_coord(&mut self) -> Result<Coord> {
        let x = self.get_bit_double()?;
        let y = self.get_bit_double()?;
        let z = self.get_bit_double()?;
        Ok(Coord::new(x, y, z))
    }

    /// Two raw doubles, z = 0.
    fn get_raw_coord2(&mut self) -> Result<Coord> {
        let x = self.get_raw_double()?;
        let y = self.get_raw_double()?;
        Ok(Coord::new(x, y, 0.0))
    }

    /// Extrusion direction.  2000 and newer prefixes a single bit that
    /// stands for the (0,0,1) default.
    fn get_extrusion(&mut self, version: CadVersion) -> Result<Coord> {
        if version.r2000_plus() && self.get_bit()? {
            return Ok(Coord::UNIT_Z);
        }
        self.get_coord()
    }

    /// Thickness.  2000 and newer prefixes a single bit that stands for
    /// the 0.0 default.
    fn get_thickness(&mut self, version: CadVersion) -> Result<f64> {
        if version.r2000_plus() && self.get_bit()? {
            return Ok(0.0);
        }
        self.get_bit_double()
    }
}

/// Typed record emission, mirroring `RecordReader`.
///
/// Every method carries the DXF group code; the bit backend ignores it
/// and packs the value positionally, so a `write_dwg` path mirrors its
/// `parse_dwg` by call order alone.
pub trait RecordWriter {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()>;
    fn write_int16(&mut self, code: i32, value: i16) -> Result<()>;
    fn write_int32(&mut self, code: i32, value: i32) -> Result<()>;
    fn write_double(&mut self, code: i32, value: f64) -> Result<()>;
    fn write_bool(&mut self, code: i32, value: bool) -> Result<()>;
    fn write_handle(&mut self, code: i32, value: Handle) -> Result<()>;
    fn write_binary_chunk(&mut self, code: i32, data: &[u8]) -> Result<()>;

    fn write_bit(&mut self, code: i32, value: bool) -> Result<()>;
    fn write_2bits(&mut self, code: i32, value: u8) -> Result<()>;
    fn write_bit_short(&mut self, code: i32, value: i16) -> Result<()>;
    fn write_bit_long(&mut self, code: i32, value: i32) -> Result<()>;
    fn write_bit_double(&mut self, code: i32, value: f64) -> Result<()>;

    /// Mirror of [`RecordReader::get_bit_double_default`].
    fn write_bit_double_default(&mut self, code: i32, value: f64, default: f64) -> Result<()>;
    fn write_raw_char(&mut self, code: i32, value: u8) -> Result<()>;
    fn write_raw_short(&mut self, code: i32, value: i16) -> Result<()>;
    fn write_raw_long(&mut self, code: i32, value: i32) -> Result<()>;
    fn write_raw_double(&mut self, code: i32, value: f64) -> Result<()>;

    fn write_variable_text(
        &mut self,
        code: i32,
        value: &str,
        version: CadVersion,
        force_wide: bool,
    ) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    /// Three bit-doubles; the text backend emits `x_code`, `x_code+10`,
    /// `x_code+20` pairs.
    fn write_coord(&mut self, x_code: i32, value: Coord) -> Result<()> {
        self.write_bit_double(x_code, value.x)?;
        self.write_bit_double(x_code + 10, value.y)?;
        self.write_bit_double(x_code + 20, value.z)?;
        Ok(())
    }

    /// Two raw doubles; z is dropped.
    fn write_raw_coord2(&mut self, x_code: i32, value: Coord) -> Result<()> {
        self.write_raw_double(x_code, value.x)?;
        self.write_raw_double(x_code + 10, value.y)?;
        Ok(())
    }

    /// Extrusion direction with the 2000+ single-bit default form.
    fn write_extrusion(&mut self, x_code: i32, value: Coord, version: CadVersion) -> Result<()> {
        if version.r2000_plus() {
            if value == Coord::UNIT_Z {
                return self.write_bit(x_code, true);
            }
            self.write_bit(x_code, false)?;
        }
        self.write_coord(x_code, value)
    }

    /// Thickness with the 2000+ single-bit default form.
    fn write_thickness(&mut self, code: i32, value: f64, version: CadVersion) -> Result<()> {
        if version.r2000_plus() {
            if value == 0.0 {
                return self.write_bit(code, true);
            }
            self.write_bit(code, false)?;
        }
        self.write_bit_double(code, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_kind_strings() {
        assert_eq!(CodeKind::of(0), CodeKind::Str);
        assert_eq!(CodeKind::of(2), CodeKind::Str);
        assert_eq!(CodeKind::of(100), CodeKind::Str);
        assert_eq!(CodeKind::of(1000), CodeKind::Str);
    }

    #[test]
    fn test_code_kind_handles() {
        assert_eq!(CodeKind::of(5), CodeKind::Handle);
        assert_eq!(CodeKind::of(105), CodeKind::Handle);
        assert_eq!(CodeKind::of(330), CodeKind::Handle);
        assert_eq!(CodeKind::of(369), CodeKind::Handle);
    }

    #[test]
    fn test_code_kind_numerics() {
        assert_eq!(CodeKind::of(10), CodeKind::Double);
        assert_eq!(CodeKind::of(48), CodeKind::Double);
        assert_eq!(CodeKind::of(140), CodeKind::Double);
        assert_eq!(CodeKind::of(230), CodeKind::Double);
        assert_eq!(CodeKind::of(70), CodeKind::Int16);
        assert_eq!(CodeKind::of(178), CodeKind::Int16);
        assert_eq!(CodeKind::of(280), CodeKind::Int16);
        assert_eq!(CodeKind::of(370), CodeKind::Int16);
        assert_eq!(CodeKind::of(90), CodeKind::Int32);
        assert_eq!(CodeKind::of(420), CodeKind::Int32);
        assert_eq!(CodeKind::of(440), CodeKind::Int32);
        assert_eq!(CodeKind::of(290), CodeKind::Bool);
        assert_eq!(CodeKind::of(310), CodeKind::Binary);
    }

    #[test]
    fn test_code_kind_extension_data() {
        assert_eq!(CodeKind::of(1001), CodeKind::Str);
        assert_eq!(CodeKind::of(1010), CodeKind::Double);
        assert_eq!(CodeKind::of(1040), CodeKind::Double);
        assert_eq!(CodeKind::of(1070), CodeKind::Int16);
        assert_eq!(CodeKind::of(1071), CodeKind::Int32);
    }

    #[test]
    fn test_unlisted_code_is_string() {
        assert_eq!(CodeKind::of(7000), CodeKind::Str);
        assert_eq!(CodeKind::of(-5), CodeKind::Str);
    }
}
