//! Bit-packed binary backend.
//!
//! Object bodies are bit streams without byte alignment; readers and
//! writers share the 2-bit prefix coding for shorts, longs and doubles.

pub mod reader;
pub mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;
