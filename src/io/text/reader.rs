//! Text-format tagged-record reader.
//!
//! Consumes (group code, value) line pairs.  The value of the current
//! pair backs every `RecordReader` getter, so entity code can stay
//! format-agnostic; bit-granular getters degrade to plain numeric
//! conversions of the stored value.

use std::io::{BufReader, Read};

use encoding_rs::Encoding;

use crate::error::{CadError, Result};
use crate::io::record::{CodeKind, RecordReader};
use crate::types::{CadVersion, Handle};

/// One consumed (code, value) pair with its eagerly parsed typed value.
#[derive(Debug, Clone)]
pub struct TaggedRecord {
    pub code: i32,
    pub kind: CodeKind,
    pub raw: String,
    int_value: Option<i64>,
    double_value: Option<f64>,
    bool_value: Option<bool>,
}

impl TaggedRecord {
    pub fn new(code: i32, raw: String) -> Self {
        let kind = CodeKind::of(code);
        let trimmed = raw.trim();

        let int_value = match kind {
            CodeKind::Int16 | CodeKind::Int32 | CodeKind::Int64 | CodeKind::Bool => {
                trimmed.parse::<i64>().ok()
            }
            _ => None,
        };
        let double_value = match kind {
            CodeKind::Double => trimmed.parse::<f64>().ok(),
            _ => None,
        };
        let bool_value = match kind {
            CodeKind::Bool => trimmed.parse::<i64>().ok().map(|v| v != 0),
            _ => None,
        };

        Self {
            code,
            kind,
            raw,
            int_value,
            double_value,
            bool_value,
        }
    }
}

/// DXF text reader over any byte source.
pub struct TextReader<R: Read> {
    reader: BufReader<R>,
    line_number: u64,
    current: Option<TaggedRecord>,
    pushed: Option<TaggedRecord>,
    at_eof: bool,
    /// Fallback for lines that are not valid UTF-8.
    encoding: &'static Encoding,
}

impl<R: Read> TextReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
            line_number: 0,
            current: None,
            pushed: None,
            at_eof: false,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    /// Replace the non-UTF-8 fallback encoding.
    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Line number of the most recently read line, for error context.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Consume the next (code, value) pair and make it current.
    /// Returns the group code, or `None` at a clean end of input.
    pub fn read_record(&mut self) -> Result<Option<i32>> {
        if let Some(rec) = self.pushed.take() {
            let code = rec.code;
            self.current = Some(rec);
            return Ok(Some(code));
        }

        let code_line = match self.read_line()? {
            Some(line) => line,
            None => {
                self.at_eof = true;
                return Ok(None);
            }
        };

        let code = code_line.trim().parse::<i32>().map_err(|_| {
            CadError::Malformed(format!(
                "invalid group code '{}' at line {}",
                code_line, self.line_number
            ))
        })?;

        let value_line = match self.read_line()? {
            Some(line) => line,
            None => {
                self.at_eof = true;
                return Err(CadError::UnexpectedEndOfStream(self.line_number));
            }
        };

        let value = expand_controls(&value_line);
        self.current = Some(TaggedRecord::new(code, value));
        Ok(Some(code))
    }

    /// Return the next code without consuming its pair.
    pub fn peek_code(&mut self) -> Result<Option<i32>> {
        if let Some(ref rec) = self.pushed {
            return Ok(Some(rec.code));
        }
        match self.read_record()? {
            Some(code) => {
                self.pushed = self.current.take();
                Ok(Some(code))
            }
            None => Ok(None),
        }
    }

    /// Push the current pair back so the next `read_record` re-delivers it.
    pub fn push_back(&mut self) {
        if let Some(rec) = self.current.take() {
            self.pushed = Some(rec);
        }
    }

    /// The current pair's group code.
    pub fn code(&self) -> Option<i32> {
        self.current.as_ref().map(|r| r.code)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    if bytes.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    bytes.push(byte[0]);
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.line_number += 1;

        let line = match String::from_utf8(bytes.clone()) {
            Ok(s) => s,
            Err(_) => {
                let (decoded, _) = self.encoding.decode_without_bom_handling(&bytes);
                decoded.into_owned()
            }
        };
        Ok(Some(line.trim().to_string()))
    }

    fn record(&self) -> Result<&TaggedRecord> {
        self.current
            .as_ref()
            .ok_or_else(|| CadError::Malformed("no current record".to_string()))
    }

    fn int_of_current(&self) -> Result<i64> {
        let rec = self.record()?;
        if let Some(v) = rec.int_value {
            return Ok(v);
        }
        rec.raw.trim().parse::<i64>().map_err(|_| {
            CadError::Malformed(format!(
                "code {}: '{}' is not an integer",
                rec.code, rec.raw
            ))
        })
    }
}

/// Expand the caret control sequences used inside text values.
fn expand_controls(value: &str) -> String {
    value
        .replace("^J", "\n")
        .replace("^M", "\r")
        .replace("^I", "\t")
        .replace("^ ", "^")
}

impl<R: Read> RecordReader for TextReader<R> {
    fn get_int16(&mut self) -> Result<i16> {
        let v = self.int_of_current()?;
        i16::try_from(v)
            .map_err(|_| CadError::Malformed(format!("{} out of i16 range", v)))
    }

    fn get_int32(&mut self) -> Result<i32> {
        let v = self.int_of_current()?;
        i32::try_from(v)
            .map_err(|_| CadError::Malformed(format!("{} out of i32 range", v)))
    }

    fn get_double(&mut self) -> Result<f64> {
        let rec = self.record()?;
        if let Some(v) = rec.double_value {
            return Ok(v);
        }
        if let Some(v) = rec.int_value {
            return Ok(v as f64);
        }
        rec.raw.trim().parse::<f64>().map_err(|_| {
            CadError::Malformed(format!(
                "code {}: '{}' is not a number",
                rec.code, rec.raw
            ))
        })
    }

    fn get_utf8_string(&mut self) -> Result<String> {
        Ok(self.record()?.raw.clone())
    }

    fn get_bool(&mut self) -> Result<bool> {
        let rec = self.record()?;
        if let Some(v) = rec.bool_value {
            return Ok(v);
        }
        Ok(self.int_of_current()? != 0)
    }

    fn get_handle(&mut self) -> Result<Handle> {
        let rec = self.record()?;
        Handle::from_hex(&rec.raw).ok_or_else(|| {
            CadError::Malformed(format!(
                "code {}: '{}' is not a hex handle",
                rec.code, rec.raw
            ))
        })
    }

    fn get_binary_chunk(&mut self, _len: usize) -> Result<Vec<u8>> {
        let rec = self.record()?;
        let hex = rec.raw.trim();
        if hex.len() % 2 != 0 {
            return Err(CadError::Malformed(format!(
                "code {}: odd-length binary chunk",
                rec.code
            )));
        }
        let mut out = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let byte = u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                CadError::Malformed(format!(
                    "code {}: invalid hex in binary chunk",
                    rec.code
                ))
            })?;
            out.push(byte);
        }
        Ok(out)
    }

    fn get_bit(&mut self) -> Result<bool> {
        self.get_bool()
    }

    fn get_2bits(&mut self) -> Result<u8> {
        Ok((self.int_of_current()? & 3) as u8)
    }

    fn get_bit_short(&mut self) -> Result<i16> {
        self.get_int16()
    }

    fn get_bit_long(&mut self) -> Result<i32> {
        self.get_int32()
    }

    fn get_bit_double(&mut self) -> Result<f64> {
        self.get_double()
    }

    fn get_bit_double_default(&mut self, _default: f64) -> Result<f64> {
        self.get_double()
    }

    fn get_raw_char(&mut self) -> Result<u8> {
        let v = self.int_of_current()?;
        u8::try_from(v)
            .map_err(|_| CadError::Malformed(format!("{} out of byte range", v)))
    }

    fn get_raw_short(&mut self) -> Result<i16> {
        self.get_int16()
    }

    fn get_raw_long(&mut self) -> Result<i32> {
        self.get_int32()
    }

    fn get_raw_double(&mut self) -> Result<f64> {
        self.get_double()
    }

    fn get_variable_text(&mut self, _version: CadVersion, _force_wide: bool) -> Result<String> {
        self.get_utf8_string()
    }

    fn at_end(&self) -> bool {
        self.at_eof && self.pushed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &str) -> TextReader<Cursor<Vec<u8>>> {
        TextReader::new(Cursor::new(data.as_bytes().to_vec()))
    }

    #[test]
    fn test_read_simple_pair() {
        let mut r = reader("0\nLINE\n");
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "LINE");
        assert_eq!(r.read_record().unwrap(), None);
        assert!(r.at_end());
    }

    #[test]
    fn test_typed_values() {
        let mut r = reader(" 70\n42\n 10\n1.5\n290\n1\n  5\nFF\n");
        r.read_record().unwrap();
        assert_eq!(r.get_int16().unwrap(), 42);
        r.read_record().unwrap();
        assert_eq!(r.get_double().unwrap(), 1.5);
        r.read_record().unwrap();
        assert!(r.get_bool().unwrap());
        r.read_record().unwrap();
        assert_eq!(r.get_handle().unwrap(), Handle::new(0xFF));
    }

    #[test]
    fn test_crlf_and_padding() {
        let mut r = reader("  0\r\nPOINT\r\n 10\r\n2.0\r\n");
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "POINT");
        assert_eq!(r.read_record().unwrap(), Some(10));
        assert_eq!(r.get_double().unwrap(), 2.0);
    }

    #[test]
    fn test_push_back() {
        let mut r = reader("0\nLINE\n8\nWalls\n");
        assert_eq!(r.read_record().unwrap(), Some(0));
        r.push_back();
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "LINE");
        assert_eq!(r.read_record().unwrap(), Some(8));
        assert_eq!(r.get_utf8_string().unwrap(), "Walls");
    }

    #[test]
    fn test_peek_code() {
        let mut r = reader("0\nARC\n40\n2.5\n");
        assert_eq!(r.peek_code().unwrap(), Some(0));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.peek_code().unwrap(), Some(40));
    }

    #[test]
    fn test_control_expansion() {
        let mut r = reader("1\nLine1^JLine2^ICol\n");
        r.read_record().unwrap();
        assert_eq!(r.get_utf8_string().unwrap(), "Line1\nLine2\tCol");
    }

    #[test]
    fn test_invalid_code_is_malformed() {
        let mut r = reader("banana\nLINE\n");
        assert!(matches!(r.read_record(), Err(CadError::Malformed(_))));
    }

    #[test]
    fn test_truncated_pair_is_stream_end() {
        let mut r = reader("0\n");
        assert!(matches!(
            r.read_record(),
            Err(CadError::UnexpectedEndOfStream(_))
        ));
    }

    #[test]
    fn test_binary_chunk_decode() {
        let mut r = reader("310\nDEADBEEF\n");
        r.read_record().unwrap();
        assert_eq!(
            r.get_binary_chunk(0).unwrap(),
            vec![0xDE, 0xAD, 0xBE, 0xEF]
        );
    }

    #[test]
    fn test_non_utf8_falls_back() {
        // 0xE9 is 'é' in WINDOWS-1252 but not valid UTF-8 on its own.
        let data: Vec<u8> = b"1\nCaf\xE9\n".to_vec();
        let mut r = TextReader::new(Cursor::new(data));
        r.read_record().unwrap();
        assert_eq!(r.get_utf8_string().unwrap(), "Café");
    }

    #[test]
    fn test_bit_getters_degrade_to_numeric() {
        let mut r = reader(" 70\n7\n");
        r.read_record().unwrap();
        assert_eq!(r.get_bit_short().unwrap(), 7);
        let mut r = reader(" 71\n2\n");
        r.read_record().unwrap();
        assert_eq!(r.get_2bits().unwrap(), 2);
    }
}
