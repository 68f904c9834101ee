//! Text-format (tagged pair) backends

pub mod reader;
pub mod writer;

pub use reader::{TaggedRecord, TextReader};
pub use writer::{format_double, TextWriter};
