//! # cadrw
//!
//! A dual-format codec for CAD entities: the tagged text form (DXF)
//! and the bit-packed binary form (DWG) share one entity model and
//! round-trip through either encoding.
//!
//! ## Quick Start
//!
//! ```rust
//! use cadrw::{Document, DiagnosticSink, Entity, entities::Line, types::Coord};
//!
//! let mut doc = Document::new();
//! doc.add_entity(Entity::Line(Line::new(
//!     Coord::ZERO,
//!     Coord::new(10.0, 5.0, 0.0),
//! )));
//!
//! let mut out = Vec::new();
//! doc.save_dxf(&mut out)?;
//!
//! let mut sink = DiagnosticSink::default();
//! let mut back = Document::new();
//! back.load_dxf(std::io::Cursor::new(out), &mut sink)?;
//! assert_eq!(back.entity_count(), 1);
//! # Ok::<(), cadrw::CadError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`io::RecordReader`] / [`io::RecordWriter`]: the capability
//!   interface entity code is written against, blind to the physical
//!   encoding behind it.
//! - [`io::TextReader`] / [`io::TextWriter`]: (group code, value)
//!   line pairs.
//! - [`io::BitReader`] / [`io::BitWriter`]: the bit-granular binary
//!   stream with its compact prefixed integers.
//! - [`Entity`]: one tagged enum over every supported entity kind,
//!   with the shared record header embedded in each payload.
//! - [`Document`]: entity storage, handle allocation, and the name
//!   registries that tie pointer handles back to table names.
//!
//! Version differences are driven off [`types::CadVersion`], an
//! ordered enum every gate compares against.

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod classes;
pub mod diagnostics;
pub mod document;
pub mod entities;
pub mod error;
pub mod io;
pub mod types;

pub use classes::ClassRecord;
pub use diagnostics::{Diagnostic, DiagnosticSink, LogLevel};
pub use document::Document;
pub use entities::Entity;
pub use error::{CadError, Result};
pub use io::{BitReader, BitWriter, RecordReader, RecordWriter, TextReader, TextWriter};
pub use types::{CadVersion, Color, Coord, Handle, LineWeight, Transparency};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
