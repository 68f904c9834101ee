//! Catch-all entity for unrecognized type names.

use crate::error::Result;
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Variant};

use super::{read_group_variant, write_group_variant, EntityHeader};

/// An entity of a type this reader does not model.
///
/// Every group that the shared header does not own is kept verbatim, so
/// the entity survives a text read-write cycle untouched.  The binary
/// format has no tolerant form; unknown entities are skipped there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unknown {
    pub common: EntityHeader,
    /// The code-0 type name as read.
    pub name: String,
    /// Unrecognized groups in stream order.
    pub records: Vec<Variant>,
}

impl Unknown {
    pub fn named(name: impl Into<String>) -> Self {
        Unknown {
            common: EntityHeader::new(),
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Never rejects a code: header codes land in the header, the rest
    /// are kept as raw records.
    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        if self.common.parse_code(code, reader)? {
            return Ok(true);
        }
        self.records.push(read_group_variant(code, reader)?);
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, &self.name)?;
        self.common.write_dxf(version, w)?;
        for record in &self.records {
            write_group_variant(record, w)?;
        }
        self.common.write_ext_data(w)
    }
}
