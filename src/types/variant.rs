//! Extension-data variant type
//!
//! Application-specific data rides on entities through group codes
//! 1000-1071.  Each value is kept as a tagged variant carrying its
//! originating code, appended in stream order during parse and re-emitted
//! in the same order on write.

use crate::types::Coord;

/// The payload of one extension-data group.
///
/// Consumed by exhaustive `match`; there is no run-time type inquiry
/// beyond the enum discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantValue {
    /// Textual groups: 1000 string, 1001 application name,
    /// 1002 control string, 1003 layer name, 1005 handle text
    Str(String),
    /// Integer groups: 1070 (16-bit) and 1071 (32-bit), widened
    Int(i32),
    /// Real groups: 1040 real, 1041 distance, 1042 scale factor
    Double(f64),
    /// Coordinate groups: 101x starts a point, 102x/103x complete it
    Coord(Coord),
    /// Binary chunk: 1004
    Binary(Vec<u8>),
}

/// One extension-data group: originating code plus typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub code: i32,
    pub value: VariantValue,
}

impl Variant {
    pub fn new(code: i32, value: VariantValue) -> Self {
        Self { code, value }
    }

    /// Whether `code` lies in the extension-data range.
    pub fn is_extension_code(code: i32) -> bool {
        (1000..=1071).contains(&code)
    }

    /// Whether `code` starts a new coordinate group (x component).
    pub fn starts_coord(code: i32) -> bool {
        (1010..=1013).contains(&code)
    }

    /// Whether `code` carries the y component of the open coordinate group.
    pub fn continues_coord_y(code: i32) -> bool {
        (1020..=1023).contains(&code)
    }

    /// Whether `code` carries the z component of the open coordinate group.
    pub fn continues_coord_z(code: i32) -> bool {
        (1030..=1033).contains(&code)
    }

    /// Fill the y component when this variant is an open coordinate group.
    /// Returns false when the variant is not a coordinate.
    pub fn set_coord_y(&mut self, y: f64) -> bool {
        match &mut self.value {
            VariantValue::Coord(c) => {
                c.y = y;
                true
            }
            _ => false,
        }
    }

    /// Fill the z component when this variant is an open coordinate group.
    pub fn set_coord_z(&mut self, z: f64) -> bool {
        match &mut self.value {
            VariantValue::Coord(c) => {
                c.z = z;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_code_range() {
        assert!(Variant::is_extension_code(1000));
        assert!(Variant::is_extension_code(1071));
        assert!(!Variant::is_extension_code(999));
        assert!(!Variant::is_extension_code(1072));
    }

    #[test]
    fn test_coord_group_classification() {
        assert!(Variant::starts_coord(1010));
        assert!(Variant::starts_coord(1013));
        assert!(Variant::continues_coord_y(1021));
        assert!(Variant::continues_coord_z(1033));
        assert!(!Variant::starts_coord(1020));
    }

    #[test]
    fn test_coord_accumulation() {
        let mut v = Variant::new(1010, VariantValue::Coord(Coord::new(1.0, 0.0, 0.0)));
        assert!(v.set_coord_y(2.0));
        assert!(v.set_coord_z(3.0));
        assert_eq!(v.value, VariantValue::Coord(Coord::new(1.0, 2.0, 3.0)));

        let mut s = Variant::new(1000, VariantValue::Str("x".into()));
        assert!(!s.set_coord_y(1.0));
    }
}
