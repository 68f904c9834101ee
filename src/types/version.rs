//! Drawing format versions and the capability switches derived from them.
//!
//! Every version-gated branch in the codec compares against this closed,
//! ordered set; nothing consults release years or wall-clock dates.

use std::fmt;

use crate::error::{CadError, Result};

/// A drawing format version, ordered oldest to newest.
///
/// The variant names are the `$ACADVER` strings.  `Unknown` sorts lowest
/// so that version gates treat unrecognized inputs as the oldest baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CadVersion {
    #[default]
    Unknown,
    /// Release 10
    AC1006,
    /// Releases 11 and 12
    AC1009,
    /// Release 13
    AC1012,
    /// Release 14
    AC1014,
    /// 2000 family
    AC1015,
    /// 2004 family
    AC1018,
    /// 2007 family
    AC1021,
    /// 2010 family
    AC1024,
    /// 2013 family
    AC1027,
    /// 2018 family
    AC1032,
}

impl CadVersion {
    /// All concrete versions, oldest first.
    pub const ALL: [CadVersion; 10] = [
        CadVersion::AC1006,
        CadVersion::AC1009,
        CadVersion::AC1012,
        CadVersion::AC1014,
        CadVersion::AC1015,
        CadVersion::AC1018,
        CadVersion::AC1021,
        CadVersion::AC1024,
        CadVersion::AC1027,
        CadVersion::AC1032,
    ];

    /// Parse a `$ACADVER` string.  Unrecognized input clamps to `Unknown`.
    pub fn from_dxf_string(s: &str) -> Self {
        match s.trim() {
            "AC1006" => CadVersion::AC1006,
            "AC1009" => CadVersion::AC1009,
            "AC1012" => CadVersion::AC1012,
            "AC1014" => CadVersion::AC1014,
            "AC1015" => CadVersion::AC1015,
            "AC1018" => CadVersion::AC1018,
            "AC1021" => CadVersion::AC1021,
            "AC1024" => CadVersion::AC1024,
            "AC1027" => CadVersion::AC1027,
            "AC1032" => CadVersion::AC1032,
            _ => CadVersion::Unknown,
        }
    }

    /// The `$ACADVER` string, or an error for `Unknown`.
    pub fn dxf_string(&self) -> Result<&'static str> {
        match self {
            CadVersion::AC1006 => Ok("AC1006"),
            CadVersion::AC1009 => Ok("AC1009"),
            CadVersion::AC1012 => Ok("AC1012"),
            CadVersion::AC1014 => Ok("AC1014"),
            CadVersion::AC1015 => Ok("AC1015"),
            CadVersion::AC1018 => Ok("AC1018"),
            CadVersion::AC1021 => Ok("AC1021"),
            CadVersion::AC1024 => Ok("AC1024"),
            CadVersion::AC1027 => Ok("AC1027"),
            CadVersion::AC1032 => Ok("AC1032"),
            CadVersion::Unknown => {
                Err(CadError::UnsupportedVersion("Unknown".to_string()))
            }
        }
    }

    /// R13 or newer.
    pub fn is_r13_plus(&self) -> bool {
        *self >= CadVersion::AC1012
    }

    /// Exactly the R13/R14 window.
    pub fn r13_14_only(&self) -> bool {
        matches!(self, CadVersion::AC1012 | CadVersion::AC1014)
    }

    /// 2000 family or newer.
    pub fn r2000_plus(&self) -> bool {
        *self >= CadVersion::AC1015
    }

    /// 2004 family or newer: class instance counts, owned-handle lists,
    /// gradient hatch blocks.
    pub fn r2004_plus(&self) -> bool {
        *self >= CadVersion::AC1018
    }

    /// 2007 family or newer: the wide-text threshold.
    pub fn r2007_plus(&self) -> bool {
        *self >= CadVersion::AC1021
    }

    /// 2010 family or newer.
    pub fn r2010_plus(&self) -> bool {
        *self >= CadVersion::AC1024
    }

    /// 2013 family or newer.
    pub fn r2013_plus(&self) -> bool {
        *self >= CadVersion::AC1027
    }
}

impl fmt::Display for CadVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dxf_string() {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(CadVersion::AC1009 < CadVersion::AC1015);
        assert!(CadVersion::AC1015 < CadVersion::AC1018);
        assert!(CadVersion::AC1032 > CadVersion::AC1021);
        assert!(CadVersion::Unknown < CadVersion::AC1006);
    }

    #[test]
    fn test_string_roundtrip() {
        for v in CadVersion::ALL {
            let s = v.dxf_string().unwrap();
            assert_eq!(CadVersion::from_dxf_string(s), v);
        }
    }

    #[test]
    fn test_unknown_clamping() {
        assert_eq!(CadVersion::from_dxf_string("AC9999"), CadVersion::Unknown);
        assert_eq!(CadVersion::from_dxf_string(""), CadVersion::Unknown);
        assert!(CadVersion::Unknown.dxf_string().is_err());
    }

    #[test]
    fn test_capability_flags() {
        assert!(CadVersion::AC1012.r13_14_only());
        assert!(CadVersion::AC1014.r13_14_only());
        assert!(!CadVersion::AC1015.r13_14_only());

        assert!(CadVersion::AC1015.r2000_plus());
        assert!(!CadVersion::AC1015.r2004_plus());
        assert!(CadVersion::AC1018.r2004_plus());
        assert!(!CadVersion::AC1018.r2007_plus());
        assert!(CadVersion::AC1021.r2007_plus());
        assert!(CadVersion::AC1024.r2010_plus());
        assert!(!CadVersion::AC1009.is_r13_plus());
    }
}
