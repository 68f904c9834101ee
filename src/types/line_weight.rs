//! Line weight values carried on entity records.

use std::fmt;

/// Entity line weight.
///
/// Concrete weights are expressed in 1/100 mm, restricted to the closed
/// set of standard widths.  Negative raw values select the symbolic
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LineWeight {
    /// Use the layer's line weight
    #[default]
    ByLayer,
    /// Use the block's line weight
    ByBlock,
    /// The drawing default
    Default,
    /// Specific line weight in 1/100 mm, one of the standard widths
    Value(i16),
}

/// The standard width table, 1/100 mm, ascending.
const STANDARD_WIDTHS: [i16; 24] = [
    0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100,
    106, 120, 140, 158, 200, 211,
];

impl LineWeight {
    /// Convert a raw group 370 value.  Positive values snap to the nearest
    /// standard width at or above the input; anything past the last table
    /// entry clamps to the default.
    pub fn from_raw(value: i16) -> Self {
        match value {
            -1 => LineWeight::ByLayer,
            -2 => LineWeight::ByBlock,
            v if v < 0 => LineWeight::Default,
            v => {
                for w in STANDARD_WIDTHS {
                    if v <= w {
                        return LineWeight::Value(w);
                    }
                }
                LineWeight::Default
            }
        }
    }

    /// The raw value written to group 370.
    pub fn raw_value(&self) -> i16 {
        match self {
            LineWeight::ByLayer => -1,
            LineWeight::ByBlock => -2,
            LineWeight::Default => -3,
            LineWeight::Value(v) => *v,
        }
    }

    /// The width in millimeters, for concrete weights only.
    pub fn millimeters(&self) -> Option<f64> {
        match self {
            LineWeight::Value(v) => Some(*v as f64 / 100.0),
            _ => None,
        }
    }
}

impl fmt::Display for LineWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineWeight::ByLayer => write!(f, "ByLayer"),
            LineWeight::ByBlock => write!(f, "ByBlock"),
            LineWeight::Default => write!(f, "Default"),
            LineWeight::Value(v) => write!(f, "{:.2}mm", *v as f64 / 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_values() {
        assert_eq!(LineWeight::from_raw(-1), LineWeight::ByLayer);
        assert_eq!(LineWeight::from_raw(-2), LineWeight::ByBlock);
        assert_eq!(LineWeight::from_raw(-3), LineWeight::Default);
        assert_eq!(LineWeight::ByLayer.raw_value(), -1);
    }

    #[test]
    fn test_snapping() {
        assert_eq!(LineWeight::from_raw(25), LineWeight::Value(25));
        assert_eq!(LineWeight::from_raw(22), LineWeight::Value(25));
        assert_eq!(LineWeight::from_raw(1), LineWeight::Value(5));
        assert_eq!(LineWeight::from_raw(0), LineWeight::Value(0));
        assert_eq!(LineWeight::from_raw(211), LineWeight::Value(211));
        assert_eq!(LineWeight::from_raw(500), LineWeight::Default);
    }

    #[test]
    fn test_millimeters() {
        assert_eq!(LineWeight::Value(25).millimeters(), Some(0.25));
        assert_eq!(LineWeight::ByLayer.millimeters(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(LineWeight::ByLayer.to_string(), "ByLayer");
        assert_eq!(LineWeight::Value(25).to_string(), "0.25mm");
    }
}
