//! Spline entity, a NURBS curve.

use bitflags::bitflags;

use crate::error::{CadError, Result};
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord};

use super::EntityHeader;

bitflags! {
    /// Spline flags, group 70.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SplineFlags: i16 {
        const CLOSED = 1;
        const PERIODIC = 2;
        const RATIONAL = 4;
        const PLANAR = 8;
        const LINEAR = 16;
    }
}

const KNOT_TOLERANCE: f64 = 1e-7;
const CONTROL_TOLERANCE: f64 = 1e-7;
const FIT_TOLERANCE: f64 = 1e-9;

/// A NURBS curve defined by control points or by fit points.
///
/// A spline carries either a knot/control-point definition or a list
/// of fit points the application interpolated through; files may hold
/// both.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 70 | Flags |
/// | 71 | Degree |
/// | 72, 73, 74 | Knot / control / fit point counts |
/// | 40 | Knot value (repeats) |
/// | 41 | Weight (repeats) |
/// | 10, 20, 30 | Control point (repeats) |
/// | 11, 21, 31 | Fit point (repeats) |
/// | 12, 13 | Start / end tangent |
/// | 42, 43, 44 | Knot / control / fit tolerance |
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    pub common: EntityHeader,
    pub flags: SplineFlags,
    pub degree: i32,
    pub normal: Coord,
    pub knots: Vec<f64>,
    pub control_points: Vec<Coord>,
    pub weights: Vec<f64>,
    pub fit_points: Vec<Coord>,
    pub start_tangent: Coord,
    pub end_tangent: Coord,
    pub knot_tolerance: f64,
    pub control_tolerance: f64,
    pub fit_tolerance: f64,
}

impl Spline {
    pub fn new(degree: i32, control_points: Vec<Coord>, knots: Vec<f64>) -> Self {
        Spline {
            degree,
            control_points,
            knots,
            ..Default::default()
        }
    }

    /// A spline defined only by points the curve passes through.
    pub fn from_fit_points(fit_points: Vec<Coord>) -> Self {
        Spline {
            degree: 3,
            fit_points,
            ..Default::default()
        }
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(SplineFlags::CLOSED)
    }

    pub fn is_rational(&self) -> bool {
        self.flags.contains(SplineFlags::RATIONAL)
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            70 => self.flags = SplineFlags::from_bits_retain(reader.get_int16()?),
            71 => self.degree = reader.get_int16()? as i32,
            72 => {
                let n = reader.get_int16()?;
                self.knots.reserve(n.max(0) as usize);
            }
            73 => {
                let n = reader.get_int16()?;
                self.control_points.reserve(n.max(0) as usize);
            }
            74 => {
                let n = reader.get_int16()?;
                self.fit_points.reserve(n.max(0) as usize);
            }
            40 => self.knots.push(reader.get_double()?),
            41 => self.weights.push(reader.get_double()?),
            42 => self.knot_tolerance = reader.get_double()?,
            43 => self.control_tolerance = reader.get_double()?,
            44 => self.fit_tolerance = reader.get_double()?,
            10 => self.control_points.push(Coord::new(reader.get_double()?, 0.0, 0.0)),
            20 => {
                if let Some(p) = self.control_points.last_mut() {
                    p.y = reader.get_double()?;
                }
            }
            30 => {
                if let Some(p) = self.control_points.last_mut() {
                    p.z = reader.get_double()?;
                }
            }
            11 => self.fit_points.push(Coord::new(reader.get_double()?, 0.0, 0.0)),
            21 => {
                if let Some(p) = self.fit_points.last_mut() {
                    p.y = reader.get_double()?;
                }
            }
            31 => {
                if let Some(p) = self.fit_points.last_mut() {
                    p.z = reader.get_double()?;
                }
            }
            12 => self.start_tangent.x = reader.get_double()?,
            22 => self.start_tangent.y = reader.get_double()?,
            32 => self.start_tangent.z = reader.get_double()?,
            13 => self.end_tangent.x = reader.get_double()?,
            23 => self.end_tangent.y = reader.get_double()?,
            33 => self.end_tangent.z = reader.get_double()?,
            210 => self.normal.x = reader.get_double()?,
            220 => self.normal.y = reader.get_double()?,
            230 => self.normal.z = reader.get_double()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "SPLINE")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbSpline")?;
        }
        if self.flags.contains(SplineFlags::PLANAR) {
            w.write_coord(210, self.normal)?;
        }
        w.write_int16(70, self.flags.bits())?;
        w.write_int16(71, self.degree as i16)?;
        w.write_int16(72, self.knots.len() as i16)?;
        w.write_int16(73, self.control_points.len() as i16)?;
        w.write_int16(74, self.fit_points.len() as i16)?;
        if self.knot_tolerance != 0.0 {
            w.write_double(42, self.knot_tolerance)?;
        }
        if self.control_tolerance != 0.0 {
            w.write_double(43, self.control_tolerance)?;
        }
        if self.fit_tolerance != 0.0 {
            w.write_double(44, self.fit_tolerance)?;
        }
        if self.start_tangent != Coord::ZERO {
            w.write_double(12, self.start_tangent.x)?;
            w.write_double(22, self.start_tangent.y)?;
            w.write_double(32, self.start_tangent.z)?;
        }
        if self.end_tangent != Coord::ZERO {
            w.write_double(13, self.end_tangent.x)?;
            w.write_double(23, self.end_tangent.y)?;
            w.write_double(33, self.end_tangent.z)?;
        }
        for k in &self.knots {
            w.write_double(40, *k)?;
        }
        for weight in &self.weights {
            w.write_double(41, *weight)?;
        }
        for p in &self.control_points {
            w.write_double(10, p.x)?;
            w.write_double(20, p.y)?;
            w.write_double(30, p.z)?;
        }
        for p in &self.fit_points {
            w.write_double(11, p.x)?;
            w.write_double(21, p.y)?;
            w.write_double(31, p.z)?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        let scenario;
        if version.r2013_plus() {
            let flags1 = r.get_bit_long()?;
            let _knot_param = r.get_bit_long()?;
            self.degree = r.get_bit_long()?;
            scenario = if flags1 & 1 != 0 { 2 } else { 1 };
        } else {
            scenario = r.get_bit_short()? as i32;
            self.degree = r.get_bit_long()?;
        }
        match scenario {
            2 => {
                self.fit_tolerance = r.get_bit_double()?;
                self.start_tangent = r.get_coord()?;
                self.end_tangent = r.get_coord()?;
                let n_fit = r.get_bit_long()?;
                check_count(n_fit, "spline fit points")?;
                self.fit_points.clear();
                for _ in 0..n_fit {
                    self.fit_points.push(r.get_coord()?);
                }
            }
            1 => {
                if r.get_bit()? {
                    self.flags |= SplineFlags::RATIONAL;
                }
                if r.get_bit()? {
                    self.flags |= SplineFlags::CLOSED;
                }
                if r.get_bit()? {
                    self.flags |= SplineFlags::PERIODIC;
                }
                self.knot_tolerance = r.get_bit_double()?;
                self.control_tolerance = r.get_bit_double()?;
                let n_knots = r.get_bit_long()?;
                check_count(n_knots, "spline knots")?;
                let n_ctrl = r.get_bit_long()?;
                check_count(n_ctrl, "spline control points")?;
                let weighted = r.get_bit()?;
                self.knots.clear();
                for _ in 0..n_knots {
                    self.knots.push(r.get_bit_double()?);
                }
                self.control_points.clear();
                self.weights.clear();
                for _ in 0..n_ctrl {
                    self.control_points.push(r.get_coord()?);
                    if weighted {
                        self.weights.push(r.get_bit_double()?);
                    }
                }
            }
            other => {
                return Err(CadError::Malformed(format!("spline scenario {other}")));
            }
        }
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        // Fit-point definitions take scenario 2; otherwise the knot and
        // control data drive the curve.
        let scenario: i32 = if self.control_points.is_empty() && !self.fit_points.is_empty() {
            2
        } else {
            1
        };
        if version.r2013_plus() {
            let flags1 = if scenario == 2 { 1 } else { 0 };
            w.write_bit_long(0, flags1)?;
            w.write_bit_long(0, 0)?;
            w.write_bit_long(71, self.degree)?;
        } else {
            w.write_bit_short(0, scenario as i16)?;
            w.write_bit_long(71, self.degree)?;
        }
        if scenario == 2 {
            w.write_bit_double(44, self.fit_tolerance)?;
            w.write_coord(12, self.start_tangent)?;
            w.write_coord(13, self.end_tangent)?;
            w.write_bit_long(74, self.fit_points.len() as i32)?;
            for p in &self.fit_points {
                w.write_coord(11, *p)?;
            }
        } else {
            w.write_bit(0, self.is_rational())?;
            w.write_bit(0, self.is_closed())?;
            w.write_bit(0, self.flags.contains(SplineFlags::PERIODIC))?;
            w.write_bit_double(42, self.knot_tolerance)?;
            w.write_bit_double(43, self.control_tolerance)?;
            w.write_bit_long(72, self.knots.len() as i32)?;
            w.write_bit_long(73, self.control_points.len() as i32)?;
            let weighted = !self.weights.is_empty();
            w.write_bit(0, weighted)?;
            for k in &self.knots {
                w.write_bit_double(40, *k)?;
            }
            for (i, p) in self.control_points.iter().enumerate() {
                w.write_coord(10, *p)?;
                if weighted {
                    w.write_bit_double(41, self.weights.get(i).copied().unwrap_or(1.0))?;
                }
            }
        }
        Ok(())
    }
}

impl Default for Spline {
    fn default() -> Self {
        Spline {
            common: EntityHeader::new(),
            flags: SplineFlags::empty(),
            degree: 3,
            normal: Coord::UNIT_Z,
            knots: Vec::new(),
            control_points: Vec::new(),
            weights: Vec::new(),
            fit_points: Vec::new(),
            start_tangent: Coord::ZERO,
            end_tangent: Coord::ZERO,
            knot_tolerance: KNOT_TOLERANCE,
            control_tolerance: CONTROL_TOLERANCE,
            fit_tolerance: FIT_TOLERANCE,
        }
    }
}

fn check_count(n: i32, what: &str) -> Result<()> {
    if (0..=10_000_000).contains(&n) {
        Ok(())
    } else {
        Err(CadError::Malformed(format!("{what} count {n}")))
    }
}
