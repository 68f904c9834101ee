//! Entity transparency.

use std::fmt;

/// Transparency carried on an entity record.
///
/// Group 440 stores a packed 32-bit value whose top byte selects the
/// kind: 0 = by layer, 1 = by block, 3 = explicit alpha in the low byte
/// (0 = opaque, 255 = fully transparent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transparency {
    #[default]
    ByLayer,
    ByBlock,
    /// Explicit alpha, 0 opaque through 255 fully transparent
    Alpha(u8),
}

impl Transparency {
    pub const OPAQUE: Transparency = Transparency::Alpha(0);

    /// Decode the packed group 440 / DWG alpha form.
    pub fn from_packed(value: i32) -> Self {
        let v = value as u32;
        match (v >> 24) as u8 {
            1 => Transparency::ByBlock,
            3 => Transparency::Alpha((v & 0xFF) as u8),
            _ => Transparency::ByLayer,
        }
    }

    /// Encode the packed group 440 / DWG alpha form.
    pub fn packed(&self) -> i32 {
        match self {
            Transparency::ByLayer => 0,
            Transparency::ByBlock => 0x0100_0000,
            Transparency::Alpha(a) => (0x0300_0000u32 | *a as u32) as i32,
        }
    }

    /// Transparency fraction for explicit values, 0.0 opaque to 1.0.
    pub fn as_percent(&self) -> Option<f64> {
        match self {
            Transparency::Alpha(a) => Some(*a as f64 / 255.0),
            _ => None,
        }
    }
}

impl fmt::Display for Transparency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transparency::ByLayer => write!(f, "ByLayer"),
            Transparency::ByBlock => write!(f, "ByBlock"),
            Transparency::Alpha(a) => {
                write!(f, "{:.1}%", *a as f64 / 255.0 * 100.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_roundtrip() {
        let cases = [
            Transparency::ByLayer,
            Transparency::ByBlock,
            Transparency::Alpha(0),
            Transparency::Alpha(128),
            Transparency::Alpha(255),
        ];
        for t in cases {
            assert_eq!(Transparency::from_packed(t.packed()), t);
        }
    }

    #[test]
    fn test_packed_values() {
        assert_eq!(Transparency::ByLayer.packed(), 0);
        assert_eq!(Transparency::Alpha(128).packed(), 0x0300_0080);
        assert_eq!(
            Transparency::from_packed(0x0300_00FFu32 as i32),
            Transparency::Alpha(255)
        );
    }

    #[test]
    fn test_unknown_kind_clamps_to_bylayer() {
        assert_eq!(
            Transparency::from_packed(0x7F00_0042),
            Transparency::ByLayer
        );
    }

    #[test]
    fn test_percent() {
        assert_eq!(Transparency::Alpha(0).as_percent(), Some(0.0));
        assert_eq!(Transparency::ByLayer.as_percent(), None);
    }
}
