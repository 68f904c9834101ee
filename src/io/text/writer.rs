//! Text-format tagged-record writer.
//!
//! Emits (group code, value) line pairs: the code right-aligned in a
//! three-character field on its own line, the value on the next.
//! Bit-granular `RecordWriter` methods emit the equivalent plain pair,
//! so a `write_dwg` path driven through this backend stays readable.

use std::io::Write;

use crate::error::Result;
use crate::io::record::RecordWriter;
use crate::types::{CadVersion, Handle};

/// DXF text writer over any byte sink.
pub struct TextWriter<W: Write> {
    writer: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_code(&mut self, code: i32) -> Result<()> {
        if (0..10).contains(&code) {
            writeln!(self.writer, "  {}", code)?;
        } else if (10..100).contains(&code) {
            writeln!(self.writer, " {}", code)?;
        } else {
            writeln!(self.writer, "{}", code)?;
        }
        Ok(())
    }
}

/// Format a double the way drawing files carry them: full precision with
/// trailing zeros trimmed, always keeping one decimal place.
pub fn format_double(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e16 {
        return format!("{:.1}", value);
    }
    let formatted = format!("{:.15}", value);
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

impl<W: Write> RecordWriter for TextWriter<W> {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_int16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_int32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", format_double(value))?;
        Ok(())
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", if value { 1 } else { 0 })?;
        Ok(())
    }

    fn write_handle(&mut self, code: i32, value: Handle) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{:X}", value.value())?;
        Ok(())
    }

    fn write_binary_chunk(&mut self, code: i32, data: &[u8]) -> Result<()> {
        self.write_code(code)?;
        for byte in data {
            write!(self.writer, "{:02X}", byte)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_bit(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_bool(code, value)
    }

    fn write_2bits(&mut self, code: i32, value: u8) -> Result<()> {
        self.write_int16(code, (value & 3) as i16)
    }

    fn write_bit_short(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_int16(code, value)
    }

    fn write_bit_long(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_int32(code, value)
    }

    fn write_bit_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_double(code, value)
    }

    fn write_bit_double_default(&mut self, code: i32, value: f64, _default: f64) -> Result<()> {
        self.write_double(code, value)
    }

    fn write_raw_char(&mut self, code: i32, value: u8) -> Result<()> {
        self.write_int16(code, value as i16)
    }

    fn write_raw_short(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_int16(code, value)
    }

    fn write_raw_long(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_int32(code, value)
    }

    fn write_raw_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_double(code, value)
    }

    fn write_variable_text(
        &mut self,
        code: i32,
        value: &str,
        _version: CadVersion,
        _force_wide: bool,
    ) -> Result<()> {
        self.write_string(code, value)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
