//! Bit-packed binary record reader.
//!
//! A cursor over a byte buffer with sub-byte addressing: `bit_shift`
//! tracks the position inside the current byte and `last_byte` carries
//! the bits already consumed from it.  Multi-byte primitives are
//! little-endian and may start at any bit offset.
//!
//! Prefix-coded integers use a 2-bit selector:
//! `00` literal zero, `01` one following byte, `10` full-width value,
//! `11` absent (256 for bit-short, 0 for bit-long).  Bit-doubles follow
//! the same discipline with `01` standing for 1.0.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;

use crate::error::{CadError, Result};
use crate::io::record::RecordReader;
use crate::types::{CadVersion, Handle};

/// Binary record reader over an object byte stream.
pub struct BitReader {
    stream: Cursor<Vec<u8>>,
    bit_shift: u8,
    last_byte: u8,
    version: CadVersion,
    /// Narrow-text encoding for pre-2007 variable text.
    encoding: &'static Encoding,
}

impl BitReader {
    pub fn new(data: Vec<u8>, version: CadVersion) -> Self {
        Self {
            stream: Cursor::new(data),
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

    pub fn stream_length(&self) -> u64 {
        self.stream.get_ref().len() as u64
    }

    /// Absolute position in bits.
    pub fn bit_position(&self) -> u64 {
        let byte_bits = self.stream.position() * 8;
        if self.bit_shift > 0 {
            byte_bits - 8 + self.bit_shift as u64
        } else {
            byte_bits
        }
    }

    /// Byte position of the underlying cursor.
    pub fn byte_position(&self) -> u64 {
        if self.bit_shift > 0 {
            self.stream.position() - 1
        } else {
            self.stream.position()
        }
    }

    /// Jump to an absolute byte position, dropping any partial byte.
    pub fn set_byte_position(&mut self, pos: u64) {
        self.stream.set_position(pos);
        self.bit_shift = 0;
        self.last_byte = 0;
    }

    /// Discard the remaining bits of a partially consumed byte.
    pub fn align_to_byte(&mut self) {
        self.bit_shift = 0;
    }

    fn read_raw_byte(&mut self) -> Result<u8> {
        self.stream
            .read_u8()
            .map_err(|_| CadError::UnexpectedEndOfStream(self.bit_position()))
    }

    fn advance_byte(&mut self) -> Result<()> {
        self.last_byte = self.read_raw_byte()?;
        Ok(())
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_shift == 0 {
            self.advance_byte()?;
            self.bit_shift = 1;
            return Ok((self.last_byte & 0x80) == 0x80);
        }

        let value = ((self.last_byte << self.bit_shift) & 0x80) == 0x80;
        self.bit_shift = (self.bit_shift + 1) & 7;
        Ok(value)
    }

    pub fn read_2bits(&mut self) -> Result<u8> {
        let value;
        if self.bit_shift == 0 {
            self.advance_byte()?;
            value = self.last_byte >> 6;
            self.bit_shift = 2;
        } else if self.bit_shift == 7 {
            let high = (self.last_byte << 1) & 2;
            self.advance_byte()?;
            value = high | (self.last_byte >> 7);
            self.bit_shift = 1;
        } else {
            value = (self.last_byte >> (6 - self.bit_shift)) & 3;
            self.bit_shift = (self.bit_shift + 2) & 7;
        }
        Ok(value)
    }

    /// One byte, honoring the current bit offset.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bit_shift == 0 {
            self.last_byte = self.read_raw_byte()?;
            return Ok(self.last_byte);
        }

        let high = (self.last_byte as u16) << self.bit_shift;
        self.last_byte = self.read_raw_byte()?;
        Ok((high as u8) | (self.last_byte >> (8 - self.bit_shift)))
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        if length > 16 * 1024 * 1024 {
            return Err(CadError::Malformed(format!(
                "byte run of {} exceeds sanity limit",
                length
            )));
        }

        if self.bit_shift == 0 {
            let mut arr = vec![0u8; length];
            self.stream
                .read_exact(&mut arr)
                .map_err(|_| CadError::UnexpectedEndOfStream(self.bit_position()))?;
            if let Some(&last) = arr.last() {
                self.last_byte = last;
            }
            return Ok(arr);
        }

        let mut arr = Vec::with_capacity(length);
        for _ in 0..length {
            arr.push(self.read_byte()?);
        }
        Ok(arr)
    }

    fn read_short_le(&mut self) -> Result<i16> {
        if self.bit_shift == 0 {
            let v = self
                .stream
                .read_i16::<LittleEndian>()
                .map_err(|_| CadError::UnexpectedEndOfStream(self.bit_position()))?;
            return Ok(v);
        }
        let b0 = self.read_byte()? as u16;
        let b1 = self.read_byte()? as u16;
        Ok((b0 | (b1 << 8)) as i16)
    }

    fn read_int_le(&mut self) -> Result<i32> {
        if self.bit_shift == 0 {
            let v = self
                .stream
                .read_i32::<LittleEndian>()
                .map_err(|_| CadError::UnexpectedEndOfStream(self.bit_position()))?;
            return Ok(v);
        }
        let b0 = self.read_byte()? as u32;
        let b1 = self.read_byte()? as u32;
        let b2 = self.read_byte()? as u32;
        let b3 = self.read_byte()? as u32;
        Ok((b0 | (b1 << 8) | (b2 << 16) | (b3 << 24)) as i32)
    }

    fn read_double_le(&mut self) -> Result<f64> {
        if self.bit_shift == 0 {
            let v = self
                .stream
                .read_f64::<LittleEndian>()
                .map_err(|_| CadError::UnexpectedEndOfStream(self.bit_position()))?;
            return Ok(v);
        }
        let bytes = self.read_bytes(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&bytes);
        Ok(f64::from_le_bytes(arr))
    }

    /// Big-endian handle byte run of known length.
    fn read_handle_bytes(&mut self, length: usize) -> Result<u64> {
        if length > 8 {
            return Err(CadError::Malformed(format!(
                "handle byte count {} exceeds 8",
                length
            )));
        }
        let mut value: u64 = 0;
        for _ in 0..length {
            value = (value << 8) | self.read_byte()? as u64;
        }
        Ok(value)
    }
}

impl RecordReader for BitReader {
    fn get_int16(&mut self) -> Result<i16> {
        self.get_bit_short()
    }

    fn get_int32(&mut self) -> Result<i32> {
        self.get_bit_long()
    }

    fn get_double(&mut self) -> Result<f64> {
        self.get_bit_double()
    }

    fn get_utf8_string(&mut self) -> Result<String> {
        self.get_variable_text(self.version, false)
    }

    fn get_bool(&mut self) -> Result<bool> {
        self.read_bit()
    }

    /// Handle reference: one byte of `(ref_type << 4) | byte_count`
    /// followed by the big-endian byte run.  Relative forms resolve
    /// against a zero base.
    fn get_handle(&mut self) -> Result<Handle> {
        let form = self.read_byte()?;
        let code = form >> 4;
        let counter = (form & 0x0F) as usize;

        let value = match code {
            0..=5 => self.read_handle_bytes(counter)?,
            0x6 => 1,
            0x8 => 0u64.wrapping_sub(1),
            0xA => self.read_handle_bytes(counter)?,
            0xC => 0u64.wrapping_sub(self.read_handle_bytes(counter)?),
            _ => {
                return Err(CadError::Malformed(format!(
                    "invalid handle reference code {:#X}",
                    code
                )))
            }
        };
        Ok(Handle::new(value))
    }

    fn get_binary_chunk(&mut self, len: usize) -> Result<Vec<u8>> {
        self.read_bytes(len)
    }

    fn get_bit(&mut self) -> Result<bool> {
        self.read_bit()
    }

    fn get_2bits(&mut self) -> Result<u8> {
        self.read_2bits()
    }

    fn get_bit_short(&mut self) -> Result<i16> {
        match self.read_2bits()? {
            0 => Ok(0),
            1 => Ok(self.read_byte()? as i16),
            2 => self.read_short_le(),
            3 => Ok(256),
            _ => unreachable!(),
        }
    }

    fn get_bit_long(&mut self) -> Result<i32> {
        match self.read_2bits()? {
            0 => Ok(0),
            1 => Ok(self.read_byte()? as i32),
            2 => self.read_int_le(),
            3 => Ok(0),
            _ => unreachable!(),
        }
    }

    fn get_bit_double(&mut self) -> Result<f64> {
        match self.read_2bits()? {
            0 => Ok(0.0),
            1 => Ok(1.0),
            2 => self.read_double_le(),
            3 => Ok(0.0),
            _ => unreachable!(),
        }
    }

    fn get_bit_double_default(&mut self, default: f64) -> Result<f64> {
        match self.read_2bits()? {
            0 => Ok(default),
            1 => {
                let mut arr = default.to_le_bytes();
                let patch = self.read_bytes(4)?;
                arr[..4].copy_from_slice(&patch);
                Ok(f64::from_le_bytes(arr))
            }
            2 => {
                let mut arr = default.to_le_bytes();
                let patch = self.read_bytes(6)?;
                arr[..6].copy_from_slice(&patch);
                Ok(f64::from_le_bytes(arr))
            }
            3 => self.read_double_le(),
            _ => unreachable!(),
        }
    }

    fn get_raw_char(&mut self) -> Result<u8> {
        self.read_byte()
    }

    fn get_raw_short(&mut self) -> Result<i16> {
        self.read_short_le()
    }

    fn get_raw_long(&mut self) -> Result<i32> {
        self.read_int_le()
    }

    fn get_raw_double(&mut self) -> Result<f64> {
        self.read_double_le()
    }

    fn get_variable_text(&mut self, version: CadVersion, force_wide: bool) -> Result<String> {
        let count = self.get_bit_short()?;
        if count <= 0 {
            return Ok(String::new());
        }

        // No BOM sniffing: a leading U+FEFF is payload, not a byte-order
        // marker to consume or switch decoders on.
        if version.r2007_plus() || force_wide {
            let bytes = self.read_bytes((count as usize) * 2)?;
            let (decoded, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(&bytes);
            Ok(decoded.replace('\0', ""))
        } else {
            let bytes = self.read_bytes(count as usize)?;
            let (decoded, _) = self.encoding.decode_without_bom_handling(&bytes);
            Ok(decoded.replace('\0', ""))
        }
    }

    fn at_end(&self) -> bool {
        self.stream.position() >= self.stream_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_reader(data: &[u8]) -> BitReader {
        BitReader::new(data.to_vec(), CadVersion::AC1015)
    }

    /// Pack a 2-bit prefix followed by value bytes, MSB-first.
    fn pack_2bit(code: u8, value: &[u8]) -> Vec<u8> {
        let mut bits: Vec<bool> = vec![(code >> 1) & 1 == 1, code & 1 == 1];
        for &b in value {
            for j in (0..8).rev() {
                bits.push((b >> j) & 1 == 1);
            }
        }
        bits_to_bytes(&bits)
    }

    fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in bits.chunks(8) {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                if bit {
                    byte |= 1 << (7 - i);
                }
            }
            out.push(byte);
        }
        out
    }

    #[test]
    fn test_read_bit() {
        let mut r = make_reader(&[0b1011_0000]);
        assert!(r.read_bit().unwrap());
        assert!(!r.read_bit().unwrap());
        assert!(r.read_bit().unwrap());
        assert!(r.read_bit().unwrap());
        assert!(!r.read_bit().unwrap());
    }

    #[test]
    fn test_read_2bits_across_byte() {
        let mut r = make_reader(&[0b1101_0000]);
        assert_eq!(r.read_2bits().unwrap(), 3);
        assert_eq!(r.read_2bits().unwrap(), 1);
    }

    #[test]
    fn test_bit_short_zero_prefix() {
        // 00 → literal zero, nothing further consumed
        let mut r = make_reader(&[0x00]);
        assert_eq!(r.get_bit_short().unwrap(), 0);
        assert_eq!(r.bit_position(), 2);
    }

    #[test]
    fn test_bit_short_one_byte() {
        let data = pack_2bit(0b01, &[0x42]);
        let mut r = make_reader(&data);
        assert_eq!(r.get_bit_short().unwrap(), 0x42);
        assert_eq!(r.bit_position(), 10);
    }

    #[test]
    fn test_bit_short_full_width() {
        // 10 → full i16 LE
        let data = pack_2bit(0b10, &[0x34, 0x12]);
        let mut r = make_reader(&data);
        assert_eq!(r.get_bit_short().unwrap(), 0x1234);
    }

    #[test]
    fn test_bit_short_absent_is_256() {
        let mut r = make_reader(&[0b1100_0000]);
        assert_eq!(r.get_bit_short().unwrap(), 256);
    }

    #[test]
    fn test_bit_long_absent_is_zero() {
        let mut r = make_reader(&[0b1100_0000]);
        assert_eq!(r.get_bit_long().unwrap(), 0);
    }

    #[test]
    fn test_bit_double_prefixes() {
        let mut r = make_reader(&[0b0000_0000]);
        assert_eq!(r.get_bit_double().unwrap(), 0.0);

        let mut r = make_reader(&[0b0100_0000]);
        assert_eq!(r.get_bit_double().unwrap(), 1.0);

        let data = pack_2bit(0b10, &2.5f64.to_le_bytes());
        let mut r = make_reader(&data);
        assert_eq!(r.get_bit_double().unwrap(), 2.5);
    }

    #[test]
    fn test_handle_reference() {
        // (4 << 4) | 2 bytes, big-endian 0x12F0
        let mut r = make_reader(&[0x42, 0x12, 0xF0]);
        assert_eq!(r.get_handle().unwrap(), Handle::new(0x12F0));
    }

    #[test]
    fn test_handle_invalid_code() {
        let mut r = make_reader(&[0x70]);
        assert!(matches!(r.get_handle(), Err(CadError::Malformed(_))));
    }

    #[test]
    fn test_end_of_stream() {
        let mut r = make_reader(&[]);
        assert!(matches!(
            r.read_bit(),
            Err(CadError::UnexpectedEndOfStream(_))
        ));
        assert!(r.at_end());
    }

    #[test]
    fn test_narrow_variable_text() {
        // BS count via 01-prefix (5), then "Hello" in the narrow encoding
        let mut bits: Vec<bool> = vec![false, true];
        for j in (0..8).rev() {
            bits.push((5u8 >> j) & 1 == 1);
        }
        for &b in b"Hello" {
            for j in (0..8).rev() {
                bits.push((b >> j) & 1 == 1);
            }
        }
        let data = bits_to_bytes(&bits);
        let mut r = make_reader(&data);
        assert_eq!(
            r.get_variable_text(CadVersion::AC1015, false).unwrap(),
            "Hello"
        );
    }

    #[test]
    fn test_wide_variable_text() {
        let mut bits: Vec<bool> = vec![false, true];
        for j in (0..8).rev() {
            bits.push((3u8 >> j) & 1 == 1);
        }
        for ch in "ABC".encode_utf16() {
            for &b in &ch.to_le_bytes() {
                for j in (0..8).rev() {
                    bits.push((b >> j) & 1 == 1);
                }
            }
        }
        let data = bits_to_bytes(&bits);
        let mut r = BitReader::new(data, CadVersion::AC1021);
        assert_eq!(
            r.get_variable_text(CadVersion::AC1021, false).unwrap(),
            "ABC"
        );
    }

    #[test]
    fn test_set_byte_position() {
        let mut r = make_reader(&[0xFF, 0x00, 0xAB]);
        r.read_bit().unwrap();
        r.set_byte_position(2);
        assert_eq!(r.read_byte().unwrap(), 0xAB);
    }
}
