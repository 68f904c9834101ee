//! Bit-packed binary record writer, the mirror of [`BitReader`].
//!
//! Values are packed in call order; the group codes passed through the
//! `RecordWriter` surface steer only the handle reference type.  The
//! smallest prefix consistent with the reader's table is chosen:
//! `00` for zero, `01` plus one byte for 1..=255, `11` for the absent
//! value (256 bit-short), `10` plus the full-width value otherwise.
//!
//! [`BitReader`]: super::reader::BitReader

use std::io::{Cursor, Write};

use byteorder::WriteBytesExt;
use encoding_rs::Encoding;

use crate::error::{CadError, Result};
use crate::io::record::RecordWriter;
use crate::types::{CadVersion, Handle};

/// Binary record writer building an object byte stream.
pub struct BitWriter {
    stream: Cursor<Vec<u8>>,
    bit_shift: u8,
    last_byte: u8,
    version: CadVersion,
    /// Narrow-text encoding for pre-2007 variable text.
    encoding: &'static Encoding,
}

impl BitWriter {
    pub fn new(version: CadVersion) -> Self {
        Self {
            stream: Cursor::new(Vec::new()),
            bit_shift: 0,
            last_byte: 0,
            version,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    pub fn version(&self) -> CadVersion {
        self.version
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Pad the trailing partial byte with zero bits and return the data.
    pub fn into_data(mut self) -> Vec<u8> {
        if self.bit_shift > 0 {
            self.stream.get_mut().push(self.last_byte);
        }
        self.stream.into_inner()
    }

    pub fn data(&self) -> &[u8] {
        self.stream.get_ref()
    }

    /// Absolute position in bits.
    pub fn bit_position(&self) -> u64 {
        self.stream.position() * 8 + self.bit_shift as u64
    }

    /// Byte length written so far, counting a partial byte as pending.
    pub fn byte_position(&self) -> u64 {
        self.stream.position()
    }

    /// Flush the partial byte, padding the remaining bits with zeros.
    pub fn finish_byte(&mut self) -> Result<()> {
        if self.bit_shift > 0 {
            self.stream.write_u8(self.last_byte)?;
            self.last_byte = 0;
            self.bit_shift = 0;
        }
        Ok(())
    }

    fn write_one_bit(&mut self, value: bool) -> Result<()> {
        if self.bit_shift < 7 {
            if value {
                self.last_byte |= 1 << (7 - self.bit_shift);
            }
            self.bit_shift += 1;
            return Ok(());
        }

        if value {
            self.last_byte |= 1;
        }
        self.stream.write_u8(self.last_byte)?;
        self.last_byte = 0;
        self.bit_shift = 0;
        Ok(())
    }

    fn write_two_bits(&mut self, value: u8) -> Result<()> {
        let value = value & 3;
        if self.bit_shift < 6 {
            self.last_byte |= value << (6 - self.bit_shift);
            self.bit_shift += 2;
        } else if self.bit_shift == 6 {
            self.last_byte |= value;
            self.stream.write_u8(self.last_byte)?;
            self.last_byte = 0;
            self.bit_shift = 0;
        } else {
            self.last_byte |= value >> 1;
            self.stream.write_u8(self.last_byte)?;
            self.last_byte = value << 7;
            self.bit_shift = 1;
        }
        Ok(())
    }

    fn write_byte_value(&mut self, value: u8) -> Result<()> {
        if self.bit_shift == 0 {
            self.stream.write_u8(value)?;
            return Ok(());
        }

        let combined = self.last_byte | (value >> self.bit_shift);
        self.stream.write_u8(combined)?;
        self.last_byte = value << (8 - self.bit_shift);
        Ok(())
    }

    fn write_byte_slice(&mut self, arr: &[u8]) -> Result<()> {
        if self.bit_shift == 0 {
            self.stream.write_all(arr)?;
            return Ok(());
        }
        for &b in arr {
            self.write_byte_value(b)?;
        }
        Ok(())
    }

    fn handle_byte_count(handle: u64) -> u8 {
        let mut count = 0;
        let mut hold = handle;
        while hold != 0 {
            hold >>= 8;
            count += 1;
        }
        count
    }

    fn reference_code_for(code: i32) -> u8 {
        match code {
            5 | 105 => 0,
            330..=339 => 4,
            340..=349 => 5,
            350..=369 => 3,
            _ => 4,
        }
    }
}

impl RecordWriter for BitWriter {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_variable_text(code, value, self.version, false)
    }

    fn write_int16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_bit_short(code, value)
    }

    fn write_int32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_bit_long(code, value)
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_bit_double(code, value)
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_bit(code, value)
    }

    fn write_handle(&mut self, code: i32, value: Handle) -> Result<()> {
        let ref_code = Self::reference_code_for(code);
        let handle = value.value();
        let counter = Self::handle_byte_count(handle);

        self.write_byte_value((ref_code << 4) | counter)?;
        for i in (0..counter).rev() {
            self.write_byte_value(((handle >> (i as u32 * 8)) & 0xFF) as u8)?;
        }
        Ok(())
    }

    fn write_binary_chunk(&mut self, _code: i32, data: &[u8]) -> Result<()> {
        self.write_byte_slice(data)
    }

    fn write_bit(&mut self, _code: i32, value: bool) -> Result<()> {
        self.write_one_bit(value)
    }

    fn write_2bits(&mut self, _code: i32, value: u8) -> Result<()> {
        self.write_two_bits(value)
    }

    fn write_bit_short(&mut self, _code: i32, value: i16) -> Result<()> {
        if value == 0 {
            self.write_two_bits(0)
        } else if value > 0 && value < 256 {
            self.write_two_bits(1)?;
            self.write_byte_value(value as u8)
        } else if value == 256 {
            self.write_two_bits(3)
        } else {
            self.write_two_bits(2)?;
            self.write_byte_slice(&value.to_le_bytes())
        }
    }

    fn write_bit_long(&mut self, _code: i32, value: i32) -> Result<()> {
        if value == 0 {
            self.write_two_bits(0)
        } else if value > 0 && value < 256 {
            self.write_two_bits(1)?;
            self.write_byte_value(value as u8)
        } else {
            self.write_two_bits(2)?;
            self.write_byte_slice(&value.to_le_bytes())
        }
    }

    fn write_bit_double(&mut self, _code: i32, value: f64) -> Result<()> {
        if value == 0.0 {
            self.write_two_bits(0)
        } else if value == 1.0 {
            self.write_two_bits(1)
        } else {
            self.write_two_bits(2)?;
            self.write_byte_slice(&value.to_le_bytes())
        }
    }

    fn write_bit_double_default(&mut self, _code: i32, value: f64, default: f64) -> Result<()> {
        if value == default {
            return self.write_two_bits(0);
        }
        let v = value.to_le_bytes();
        let d = default.to_le_bytes();
        if v[4..] == d[4..] {
            self.write_two_bits(1)?;
            self.write_byte_slice(&v[..4])
        } else if v[6..] == d[6..] {
            self.write_two_bits(2)?;
            self.write_byte_slice(&v[..6])
        } else {
            self.write_two_bits(3)?;
            self.write_byte_slice(&v)
        }
    }

    fn write_raw_char(&mut self, _code: i32, value: u8) -> Result<()> {
        self.write_byte_value(value)
    }

    fn write_raw_short(&mut self, _code: i32, value: i16) -> Result<()> {
        self.write_byte_slice(&value.to_le_bytes())
    }

    fn write_raw_long(&mut self, _code: i32, value: i32) -> Result<()> {
        self.write_byte_slice(&value.to_le_bytes())
    }

    fn write_raw_double(&mut self, _code: i32, value: f64) -> Result<()> {
        self.write_byte_slice(&value.to_le_bytes())
    }

    fn write_variable_text(
        &mut self,
        code: i32,
        value: &str,
        version: CadVersion,
        force_wide: bool,
    ) -> Result<()> {
        if value.is_empty() {
            return self.write_bit_short(code, 0);
        }

        if version.r2007_plus() || force_wide {
            let utf16: Vec<u16> = value.encode_utf16().collect();
            if utf16.len() > i16::MAX as usize {
                return Err(CadError::Encoding(format!(
                    "text of {} code units exceeds the length prefix",
                    utf16.len()
                )));
            }
            self.write_bit_short(code, utf16.len() as i16)?;
            let bytes: Vec<u8> = utf16.iter().flat_map(|ch| ch.to_le_bytes()).collect();
            self.write_byte_slice(&bytes)
        } else {
            let (encoded, _, _) = self.encoding.encode(value);
            if encoded.len() > i16::MAX as usize {
                return Err(CadError::Encoding(format!(
                    "text of {} bytes exceeds the length prefix",
                    encoded.len()
                )));
            }
            self.write_bit_short(code, encoded.len() as i16)?;
            self.write_byte_slice(&encoded)
        }
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::reader::BitReader;
    use crate::io::record::RecordReader;

    fn data(w: BitWriter) -> Vec<u8> {
        w.into_data()
    }

    #[test]
    fn test_write_single_bits() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit(0, true).unwrap();
        assert_eq!(data(w), vec![0x80]);

        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit(0, false).unwrap();
        assert_eq!(data(w), vec![0x00]);
    }

    #[test]
    fn test_write_bit_short_zero() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit_short(0, 0).unwrap();
        // prefix 00, padded
        assert_eq!(data(w), vec![0x00]);
    }

    #[test]
    fn test_write_bit_short_256() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit_short(0, 256).unwrap();
        // prefix 11, padded
        assert_eq!(data(w), vec![0xC0]);
    }

    #[test]
    fn test_write_bit_short_small() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit_short(0, 42).unwrap();
        // prefix 01, byte 0x2A shifted by 2: 0b01_001010 | 10 << 6
        assert_eq!(data(w), vec![0x4A, 0x80]);
    }

    #[test]
    fn test_roundtrip_bit_short() {
        for value in [0i16, 1, 42, 255, 256, 257, -1, 0x1234, i16::MIN, i16::MAX] {
            let mut w = BitWriter::new(CadVersion::AC1015);
            w.write_bit_short(0, value).unwrap();
            let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
            assert_eq!(r.get_bit_short().unwrap(), value, "value {}", value);
        }
    }

    #[test]
    fn test_roundtrip_bit_long() {
        for value in [0i32, 1, 255, 256, 0x1234_5678, -1, i32::MIN, i32::MAX] {
            let mut w = BitWriter::new(CadVersion::AC1015);
            w.write_bit_long(0, value).unwrap();
            let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
            assert_eq!(r.get_bit_long().unwrap(), value, "value {}", value);
        }
    }

    #[test]
    fn test_roundtrip_bit_double() {
        for value in [0.0f64, 1.0, 2.5, -42.125, f64::MAX, f64::MIN_POSITIVE] {
            let mut w = BitWriter::new(CadVersion::AC1015);
            w.write_bit_double(0, value).unwrap();
            let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
            assert_eq!(r.get_bit_double().unwrap(), value, "value {}", value);
        }
    }

    #[test]
    fn test_roundtrip_double_with_default() {
        let default = 12.75f64;
        for value in [12.75, 12.750000001, 13.5, -12.75, 1.0e200] {
            let mut w = BitWriter::new(CadVersion::AC1015);
            w.write_bit_double_default(0, value, default).unwrap();
            let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
            assert_eq!(
                r.get_bit_double_default(default).unwrap(),
                value,
                "value {}",
                value
            );
        }
    }

    #[test]
    fn test_double_with_default_equal_is_two_bits() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit_double_default(0, 4.5, 4.5).unwrap();
        assert_eq!(w.bit_position(), 2);
    }

    #[test]
    fn test_roundtrip_handle() {
        for handle in [0u64, 1, 0xFF, 0x1234, 0xAB_CDEF, 0x1234_5678] {
            let mut w = BitWriter::new(CadVersion::AC1015);
            w.write_handle(330, Handle::new(handle)).unwrap();
            let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
            assert_eq!(r.get_handle().unwrap(), Handle::new(handle));
        }
    }

    #[test]
    fn test_roundtrip_unaligned_mix() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_bit(0, true).unwrap();
        w.write_bit_short(0, 300).unwrap();
        w.write_bit_double(0, 6.25).unwrap();
        w.write_raw_short(0, -7).unwrap();
        w.write_bit(0, false).unwrap();
        w.write_bit_long(0, 70000).unwrap();

        let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
        assert!(r.get_bit().unwrap());
        assert_eq!(r.get_bit_short().unwrap(), 300);
        assert_eq!(r.get_bit_double().unwrap(), 6.25);
        assert_eq!(r.get_raw_short().unwrap(), -7);
        assert!(!r.get_bit().unwrap());
        assert_eq!(r.get_bit_long().unwrap(), 70000);
    }

    #[test]
    fn test_roundtrip_variable_text_narrow() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_variable_text(1, "Hello", CadVersion::AC1015, false)
            .unwrap();
        let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
        assert_eq!(
            r.get_variable_text(CadVersion::AC1015, false).unwrap(),
            "Hello"
        );
    }

    #[test]
    fn test_roundtrip_variable_text_wide() {
        let mut w = BitWriter::new(CadVersion::AC1021);
        w.write_variable_text(1, "héllo wörld", CadVersion::AC1021, false)
            .unwrap();
        let mut r = BitReader::new(w.into_data(), CadVersion::AC1021);
        assert_eq!(
            r.get_variable_text(CadVersion::AC1021, false).unwrap(),
            "héllo wörld"
        );
    }

    #[test]
    fn test_force_wide_overrides_version() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_variable_text(1, "ABC", CadVersion::AC1015, true)
            .unwrap();
        let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
        assert_eq!(
            r.get_variable_text(CadVersion::AC1015, true).unwrap(),
            "ABC"
        );
    }

    #[test]
    fn test_roundtrip_extrusion_default_is_one_bit() {
        use crate::types::Coord;

        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_extrusion(210, Coord::UNIT_Z, CadVersion::AC1015)
            .unwrap();
        assert_eq!(w.bit_position(), 1);

        let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
        assert_eq!(r.get_extrusion(CadVersion::AC1015).unwrap(), Coord::UNIT_Z);
    }

    #[test]
    fn test_roundtrip_extrusion_pre2000_always_full() {
        use crate::types::Coord;

        let c = Coord::new(0.0, 1.0, 0.0);
        let mut w = BitWriter::new(CadVersion::AC1014);
        w.write_extrusion(210, c, CadVersion::AC1014).unwrap();
        let mut r = BitReader::new(w.into_data(), CadVersion::AC1014);
        assert_eq!(r.get_extrusion(CadVersion::AC1014).unwrap(), c);
    }

    #[test]
    fn test_roundtrip_thickness() {
        let mut w = BitWriter::new(CadVersion::AC1015);
        w.write_thickness(39, 0.0, CadVersion::AC1015).unwrap();
        w.write_thickness(39, 4.5, CadVersion::AC1015).unwrap();
        let mut r = BitReader::new(w.into_data(), CadVersion::AC1015);
        assert_eq!(r.get_thickness(CadVersion::AC1015).unwrap(), 0.0);
        assert_eq!(r.get_thickness(CadVersion::AC1015).unwrap(), 4.5);
    }
}
