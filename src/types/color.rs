//! Entity color representation

use std::fmt;

/// An entity color.
///
/// Text streams store the indexed form on code 62 (0 = by block,
/// 256 = by layer) and the 24-bit true color on code 420; the codec keeps
/// both forms in one value and converts at the stream boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Use the owning layer's color (index 256)
    #[default]
    ByLayer,
    /// Use the containing block's color (index 0)
    ByBlock,
    /// Classic color index (1-255)
    Index(u8),
    /// 24-bit true color
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Decode the indexed form from code 62.  Out-of-range values clamp
    /// to white; negative indices (layer switched off) keep their magnitude.
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => Color::ByBlock,
            256 => Color::ByLayer,
            1..=255 => Color::Index(index as u8),
            _ if index < 0 => Color::Index((-index).min(255) as u8),
            _ => Color::Index(7),
        }
    }

    /// Create a true color
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Decode the packed 24-bit form from code 420
    pub fn from_true_color(value: i32) -> Self {
        Color::Rgb {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// The packed 24-bit form for code 420, when this is a true color
    pub fn true_color(&self) -> Option<i32> {
        match self {
            Color::Rgb { r, g, b } => {
                Some(((*r as i32) << 16) | ((*g as i32) << 8) | (*b as i32))
            }
            _ => None,
        }
    }

    /// The indexed form written to code 62.  True colors approximate.
    pub fn index(&self) -> i16 {
        match self {
            Color::ByBlock => 0,
            Color::ByLayer => 256,
            Color::Index(i) => *i as i16,
            Color::Rgb { .. } => 7,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::ByLayer => write!(f, "ByLayer"),
            Color::ByBlock => write!(f, "ByBlock"),
            Color::Index(i) => write!(f, "Index({})", i),
            Color::Rgb { r, g, b } => write!(f, "RGB({}, {}, {})", r, g, b),
        }
    }
}
