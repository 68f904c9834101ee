//! Core value types shared across the codec

pub mod color;
pub mod coord;
pub mod handle;
pub mod line_weight;
pub mod transparency;
pub mod variant;
pub mod version;

pub use color::Color;
pub use coord::Coord;
pub use handle::Handle;
pub use line_weight::LineWeight;
pub use transparency::Transparency;
pub use variant::{Variant, VariantValue};
pub use version::CadVersion;
