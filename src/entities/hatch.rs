//! Hatch entity with boundary paths, fill patterns, and gradients.

use crate::error::{CadError, Result};
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Color, Coord};

use super::EntityHeader;

/// Pattern source, group 76.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternType {
    UserDefined,
    #[default]
    Predefined,
    Custom,
}

impl PatternType {
    pub fn from_raw(value: i16) -> Self {
        match value {
            0 => PatternType::UserDefined,
            2 => PatternType::Custom,
            _ => PatternType::Predefined,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            PatternType::UserDefined => 0,
            PatternType::Predefined => 1,
            PatternType::Custom => 2,
        }
    }
}

/// Island detection style, group 75.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatchStyle {
    /// Alternate fill on nested boundaries.
    #[default]
    Normal,
    /// Fill the outermost area only.
    Outer,
    /// Fill everything inside the outer boundary.
    Ignore,
}

impl HatchStyle {
    pub fn from_raw(value: i16) -> Self {
        match value {
            1 => HatchStyle::Outer,
            2 => HatchStyle::Ignore,
            _ => HatchStyle::Normal,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            HatchStyle::Normal => 0,
            HatchStyle::Outer => 1,
            HatchStyle::Ignore => 2,
        }
    }
}

/// Boundary path type bits, group 92.
pub mod loop_flags {
    pub const EXTERNAL: i32 = 1;
    pub const POLYLINE: i32 = 2;
    pub const DERIVED: i32 = 4;
    pub const TEXTBOX: i32 = 8;
    pub const OUTERMOST: i32 = 16;
}

/// One edge of an edge-form boundary path.
///
/// Edge geometry is flat; angles are radians.
#[derive(Debug, Clone, PartialEq)]
pub enum HatchEdge {
    Line {
        start: Coord,
        end: Coord,
    },
    Arc {
        center: Coord,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        ccw: bool,
    },
    EllipseArc {
        center: Coord,
        /// Endpoint of the major axis, relative to the center.
        major_end: Coord,
        ratio: f64,
        start_angle: f64,
        end_angle: f64,
        ccw: bool,
    },
    Spline {
        degree: i32,
        rational: bool,
        periodic: bool,
        knots: Vec<f64>,
        control_points: Vec<Coord>,
        weights: Vec<f64>,
        fit_points: Vec<Coord>,
        start_tangent: Coord,
        end_tangent: Coord,
    },
}

impl HatchEdge {
    fn from_kind(kind: i16) -> Option<Self> {
        match kind {
            1 => Some(HatchEdge::Line {
                start: Coord::ZERO,
                end: Coord::ZERO,
            }),
            // Arc kinds run counter-clockwise unless a 73 group says
            // otherwise.
            2 => Some(HatchEdge::Arc {
                center: Coord::ZERO,
                radius: 0.0,
                start_angle: 0.0,
                end_angle: 0.0,
                ccw: true,
            }),
            3 => Some(HatchEdge::EllipseArc {
                center: Coord::ZERO,
                major_end: Coord::ZERO,
                ratio: 1.0,
                start_angle: 0.0,
                end_angle: 0.0,
                ccw: true,
            }),
            4 => Some(HatchEdge::Spline {
                degree: 3,
                rational: false,
                periodic: false,
                knots: Vec::new(),
                control_points: Vec::new(),
                weights: Vec::new(),
                fit_points: Vec::new(),
                start_tangent: Coord::ZERO,
                end_tangent: Coord::ZERO,
            }),
            _ => None,
        }
    }

    fn kind(&self) -> i16 {
        match self {
            HatchEdge::Line { .. } => 1,
            HatchEdge::Arc { .. } => 2,
            HatchEdge::EllipseArc { .. } => 3,
            HatchEdge::Spline { .. } => 4,
        }
    }
}

/// A vertex of a polyline-form boundary path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HatchVertex {
    pub location: Coord,
    pub bulge: f64,
}

/// One closed boundary of a hatch.
///
/// A path is either polyline form (vertices with bulges) or edge form
/// (a list of [`HatchEdge`] values); group 92 bit 2 selects which.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HatchLoop {
    pub flags: i32,
    pub edges: Vec<HatchEdge>,
    pub vertices: Vec<HatchVertex>,
    pub is_closed: bool,
}

impl HatchLoop {
    pub fn from_edges(edges: Vec<HatchEdge>) -> Self {
        HatchLoop {
            flags: loop_flags::EXTERNAL,
            edges,
            vertices: Vec::new(),
            is_closed: false,
        }
    }

    pub fn from_vertices(vertices: Vec<HatchVertex>) -> Self {
        HatchLoop {
            flags: loop_flags::EXTERNAL | loop_flags::POLYLINE,
            edges: Vec::new(),
            vertices,
            is_closed: true,
        }
    }

    /// An axis-aligned rectangle boundary.
    pub fn rectangle(corner1: Coord, corner2: Coord) -> Self {
        Self::from_vertices(vec![
            HatchVertex { location: corner1, bulge: 0.0 },
            HatchVertex {
                location: Coord::new(corner2.x, corner1.y, 0.0),
                bulge: 0.0,
            },
            HatchVertex { location: corner2, bulge: 0.0 },
            HatchVertex {
                location: Coord::new(corner1.x, corner2.y, 0.0),
                bulge: 0.0,
            },
        ])
    }

    pub fn is_polyline(&self) -> bool {
        self.flags & loop_flags::POLYLINE != 0
    }
}

/// One line family of a fill pattern definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HatchPatternLine {
    /// Angle in radians.
    pub angle: f64,
    pub base: Coord,
    pub offset: Coord,
    pub dashes: Vec<f64>,
}

/// A color stop of a gradient fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub value: f64,
    pub color: Color,
}

/// Gradient fill parameters, 2004 and newer.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientFill {
    pub name: String,
    /// Rotation in radians.
    pub angle: f64,
    pub shift: f64,
    pub single_color: bool,
    pub tint: f64,
    pub stops: Vec<GradientStop>,
}

impl Default for GradientFill {
    fn default() -> Self {
        GradientFill {
            name: "LINEAR".to_string(),
            angle: 0.0,
            shift: 0.0,
            single_color: false,
            tint: 0.0,
            stops: Vec::new(),
        }
    }
}

/// A filled area bounded by one or more closed paths.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 2 | Pattern name |
/// | 70 | Solid fill |
/// | 71 | Associative |
/// | 91 | Boundary path count |
/// | 92 | Path type flags (starts a path) |
/// | 93 | Edge or vertex count |
/// | 72 | Edge kind, or bulges-present for polyline paths |
/// | 75, 76 | Style / pattern type |
/// | 52, 41, 77 | Pattern angle, scale, double |
/// | 78 | Pattern definition line count |
/// | 98 | Seed point count |
/// | 47 | Pixel size |
/// | 450-470, 421, 463 | Gradient block |
#[derive(Debug, Clone, PartialEq)]
pub struct Hatch {
    pub common: EntityHeader,
    pub pattern_name: String,
    pub solid: bool,
    pub associative: bool,
    pub style: HatchStyle,
    pub pattern_type: PatternType,
    /// Pattern angle in radians.
    pub pattern_angle: f64,
    pub pattern_scale: f64,
    pub is_double: bool,
    pub elevation: f64,
    pub loops: Vec<HatchLoop>,
    pub pattern_lines: Vec<HatchPatternLine>,
    pub pixel_size: Option<f64>,
    pub seed_points: Vec<Coord>,
    pub gradient: Option<GradientFill>,
    // Text-parse cursor; zero outside of a parse.
    seeds_expected: usize,
}

impl Hatch {
    /// A solid fill bounded by the given paths.
    pub fn solid_fill(loops: Vec<HatchLoop>) -> Self {
        Hatch {
            loops,
            ..Default::default()
        }
    }

    /// A pattern fill; the pattern itself comes from the name.
    pub fn with_pattern(name: impl Into<String>, loops: Vec<HatchLoop>) -> Self {
        Hatch {
            pattern_name: name.into(),
            solid: false,
            loops,
            ..Default::default()
        }
    }

    fn last_edge(&mut self) -> Option<&mut HatchEdge> {
        self.loops.last_mut()?.edges.last_mut()
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            2 => self.pattern_name = reader.get_utf8_string()?,
            70 => self.solid = reader.get_int16()? != 0,
            71 => self.associative = reader.get_int16()? != 0,
            75 => self.style = HatchStyle::from_raw(reader.get_int16()?),
            76 => self.pattern_type = PatternType::from_raw(reader.get_int16()?),
            77 => self.is_double = reader.get_int16()? != 0,
            52 => self.pattern_angle = reader.get_double()?.to_radians(),
            41 => self.pattern_scale = reader.get_double()?,
            47 => self.pixel_size = Some(reader.get_double()?),
            91 => {
                let n = reader.get_int32()?;
                self.loops.reserve(n.max(0) as usize);
            }
            92 => {
                let flags = reader.get_int32()?;
                self.loops.push(HatchLoop {
                    flags,
                    ..Default::default()
                });
            }
            // Counts inside a path are advisory.
            93 | 97 => {
                reader.get_int32()?;
            }
            72 => {
                let v = reader.get_int16()?;
                match self.loops.last_mut() {
                    Some(l) if !l.is_polyline() => {
                        if let Some(edge) = HatchEdge::from_kind(v) {
                            l.edges.push(edge);
                        }
                    }
                    // Polyline form: bulges-present flag.
                    _ => {}
                }
            }
            73 => {
                let v = reader.get_int16()? != 0;
                if let Some(l) = self.loops.last_mut() {
                    if l.is_polyline() {
                        l.is_closed = v;
                    } else {
                        match l.edges.last_mut() {
                            Some(HatchEdge::Arc { ccw, .. })
                            | Some(HatchEdge::EllipseArc { ccw, .. }) => *ccw = v,
                            Some(HatchEdge::Spline { rational, .. }) => *rational = v,
                            _ => {}
                        }
                    }
                }
            }
            74 => {
                let v = reader.get_int16()? != 0;
                if let Some(HatchEdge::Spline { periodic, .. }) = self.last_edge() {
                    *periodic = v;
                }
            }
            94 => {
                let v = reader.get_int32()?;
                if let Some(HatchEdge::Spline { degree, .. }) = self.last_edge() {
                    *degree = v;
                }
            }
            95 | 96 => {
                reader.get_int32()?;
            }
            40 => {
                let v = reader.get_double()?;
                match self.last_edge() {
                    Some(HatchEdge::Arc { radius, .. }) => *radius = v,
                    Some(HatchEdge::EllipseArc { ratio, .. }) => *ratio = v,
                    Some(HatchEdge::Spline { knots, .. }) => knots.push(v),
                    _ => {}
                }
            }
            42 => {
                let v = reader.get_double()?;
                if let Some(l) = self.loops.last_mut() {
                    if l.is_polyline() {
                        if let Some(vert) = l.vertices.last_mut() {
                            vert.bulge = v;
                        }
                    } else if let Some(HatchEdge::Spline { weights, .. }) = l.edges.last_mut() {
                        weights.push(v);
                    }
                }
            }
            50 => {
                let v = reader.get_double()?.to_radians();
                match self.last_edge() {
                    Some(HatchEdge::Arc { start_angle, .. })
                    | Some(HatchEdge::EllipseArc { start_angle, .. }) => *start_angle = v,
                    _ => {}
                }
            }
            51 => {
                let v = reader.get_double()?.to_radians();
                match self.last_edge() {
                    Some(HatchEdge::Arc { end_angle, .. })
                    | Some(HatchEdge::EllipseArc { end_angle, .. }) => *end_angle = v,
                    _ => {}
                }
            }
            10 => {
                let x = reader.get_double()?;
                if self.seeds_expected > 0 {
                    self.seed_points.push(Coord::new(x, 0.0, 0.0));
                } else if let Some(l) = self.loops.last_mut() {
                    if l.is_polyline() {
                        l.vertices.push(HatchVertex {
                            location: Coord::new(x, 0.0, 0.0),
                            bulge: 0.0,
                        });
                    } else {
                        match l.edges.last_mut() {
                            Some(HatchEdge::Line { start, .. }) => start.x = x,
                            Some(HatchEdge::Arc { center, .. })
                            | Some(HatchEdge::EllipseArc { center, .. }) => center.x = x,
                            Some(HatchEdge::Spline { control_points, .. }) => {
                                control_points.push(Coord::new(x, 0.0, 0.0));
                            }
                            _ => {}
                        }
                    }
                }
            }
            20 => {
                let y = reader.get_double()?;
                if self.seeds_expected > 0 {
                    if let Some(p) = self.seed_points.last_mut() {
                        p.y = y;
                    }
                    self.seeds_expected -= 1;
                } else if let Some(l) = self.loops.last_mut() {
                    if l.is_polyline() {
                        if let Some(v) = l.vertices.last_mut() {
                            v.location.y = y;
                        }
                    } else {
                        match l.edges.last_mut() {
                            Some(HatchEdge::Line { start, .. }) => start.y = y,
                            Some(HatchEdge::Arc { center, .. })
                            | Some(HatchEdge::EllipseArc { center, .. }) => center.y = y,
                            Some(HatchEdge::Spline { control_points, .. }) => {
                                if let Some(p) = control_points.last_mut() {
                                    p.y = y;
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            30 => self.elevation = reader.get_double()?,
            11 => {
                let x = reader.get_double()?;
                match self.last_edge() {
                    Some(HatchEdge::Line { end, .. }) => end.x = x,
                    Some(HatchEdge::EllipseArc { major_end, .. }) => major_end.x = x,
                    Some(HatchEdge::Spline { fit_points, .. }) => {
                        fit_points.push(Coord::new(x, 0.0, 0.0));
                    }
                    _ => {}
                }
            }
            21 => {
                let y = reader.get_double()?;
                match self.last_edge() {
                    Some(HatchEdge::Line { end, .. }) => end.y = y,
                    Some(HatchEdge::EllipseArc { major_end, .. }) => major_end.y = y,
                    Some(HatchEdge::Spline { fit_points, .. }) => {
                        if let Some(p) = fit_points.last_mut() {
                            p.y = y;
                        }
                    }
                    _ => {}
                }
            }
            12 => {
                let x = reader.get_double()?;
                if let Some(HatchEdge::Spline { start_tangent, .. }) = self.last_edge() {
                    start_tangent.x = x;
                }
            }
            22 => {
                let y = reader.get_double()?;
                if let Some(HatchEdge::Spline { start_tangent, .. }) = self.last_edge() {
                    start_tangent.y = y;
                }
            }
            13 => {
                let x = reader.get_double()?;
                if let Some(HatchEdge::Spline { end_tangent, .. }) = self.last_edge() {
                    end_tangent.x = x;
                }
            }
            23 => {
                let y = reader.get_double()?;
                if let Some(HatchEdge::Spline { end_tangent, .. }) = self.last_edge() {
                    end_tangent.y = y;
                }
            }
            78 => {
                let n = reader.get_int16()?;
                self.pattern_lines.reserve(n.max(0) as usize);
            }
            53 => {
                let angle = reader.get_double()?.to_radians();
                self.pattern_lines.push(HatchPatternLine {
                    angle,
                    ..Default::default()
                });
            }
            43 => {
                if let Some(l) = self.pattern_lines.last_mut() {
                    l.base.x = reader.get_double()?;
                }
            }
            44 => {
                if let Some(l) = self.pattern_lines.last_mut() {
                    l.base.y = reader.get_double()?;
                }
            }
            45 => {
                if let Some(l) = self.pattern_lines.last_mut() {
                    l.offset.x = reader.get_double()?;
                }
            }
            46 => {
                if let Some(l) = self.pattern_lines.last_mut() {
                    l.offset.y = reader.get_double()?;
                }
            }
            79 => {
                reader.get_int16()?;
            }
            49 => {
                if let Some(l) = self.pattern_lines.last_mut() {
                    l.dashes.push(reader.get_double()?);
                }
            }
            98 => self.seeds_expected = reader.get_int32()?.max(0) as usize,
            // Source boundary object references are regenerated, not kept.
            330 => {
                reader.get_handle()?;
            }
            450 => {
                if reader.get_int32()? != 0 && self.gradient.is_none() {
                    self.gradient = Some(GradientFill::default());
                }
            }
            451 => {
                reader.get_int32()?;
            }
            452 => {
                let v = reader.get_int32()? != 0;
                if let Some(g) = self.gradient.as_mut() {
                    g.single_color = v;
                }
            }
            453 => {
                reader.get_int32()?;
            }
            460 => {
                let v = reader.get_double()?;
                if let Some(g) = self.gradient.as_mut() {
                    g.angle = v;
                }
            }
            461 => {
                let v = reader.get_double()?;
                if let Some(g) = self.gradient.as_mut() {
                    g.shift = v;
                }
            }
            462 => {
                let v = reader.get_double()?;
                if let Some(g) = self.gradient.as_mut() {
                    g.tint = v;
                }
            }
            463 => {
                let v = reader.get_double()?;
                if let Some(g) = self.gradient.as_mut() {
                    g.stops.push(GradientStop {
                        value: v,
                        color: Color::ByLayer,
                    });
                }
            }
            421 => {
                let v = reader.get_int32()?;
                if let Some(g) = self.gradient.as_mut() {
                    if let Some(stop) = g.stops.last_mut() {
                        stop.color = Color::from_true_color(v);
                    }
                }
            }
            470 => {
                let v = reader.get_utf8_string()?;
                if let Some(g) = self.gradient.as_mut() {
                    g.name = v;
                }
            }
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "HATCH")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbHatch")?;
        }
        w.write_double(10, 0.0)?;
        w.write_double(20, 0.0)?;
        w.write_double(30, self.elevation)?;
        w.write_coord(210, self.common.extrusion)?;
        w.write_string(2, &self.pattern_name)?;
        w.write_int16(70, i16::from(self.solid))?;
        w.write_int16(71, i16::from(self.associative))?;
        w.write_int32(91, self.loops.len() as i32)?;
        for l in &self.loops {
            w.write_int32(92, l.flags)?;
            if l.is_polyline() {
                let has_bulge = l.vertices.iter().any(|v| v.bulge != 0.0);
                w.write_int16(72, i16::from(has_bulge))?;
                w.write_int16(73, i16::from(l.is_closed))?;
                w.write_int32(93, l.vertices.len() as i32)?;
                for v in &l.vertices {
                    w.write_double(10, v.location.x)?;
                    w.write_double(20, v.location.y)?;
                    if has_bulge {
                        w.write_double(42, v.bulge)?;
                    }
                }
            } else {
                w.write_int32(93, l.edges.len() as i32)?;
                for edge in &l.edges {
                    w.write_int16(72, edge.kind())?;
                    match edge {
                        HatchEdge::Line { start, end } => {
                            w.write_double(10, start.x)?;
                            w.write_double(20, start.y)?;
                            w.write_double(11, end.x)?;
                            w.write_double(21, end.y)?;
                        }
                        HatchEdge::Arc {
                            center,
                            radius,
                            start_angle,
                            end_angle,
                            ccw,
                        } => {
                            w.write_double(10, center.x)?;
                            w.write_double(20, center.y)?;
                            w.write_double(40, *radius)?;
                            w.write_double(50, start_angle.to_degrees())?;
                            w.write_double(51, end_angle.to_degrees())?;
                            w.write_int16(73, i16::from(*ccw))?;
                        }
                        HatchEdge::EllipseArc {
                            center,
                            major_end,
                            ratio,
                            start_angle,
                            end_angle,
                            ccw,
                        } => {
                            w.write_double(10, center.x)?;
                            w.write_double(20, center.y)?;
                            w.write_double(11, major_end.x)?;
                            w.write_double(21, major_end.y)?;
                            w.write_double(40, *ratio)?;
                            w.write_double(50, start_angle.to_degrees())?;
                            w.write_double(51, end_angle.to_degrees())?;
                            w.write_int16(73, i16::from(*ccw))?;
                        }
                        HatchEdge::Spline {
                            degree,
                            rational,
                            periodic,
                            knots,
                            control_points,
                            weights,
                            fit_points,
                            start_tangent,
                            end_tangent,
                        } => {
                            w.write_int32(94, *degree)?;
                            w.write_int16(73, i16::from(*rational))?;
                            w.write_int16(74, i16::from(*periodic))?;
                            w.write_int32(95, knots.len() as i32)?;
                            w.write_int32(96, control_points.len() as i32)?;
                            for k in knots {
                                w.write_double(40, *k)?;
                            }
                            for (i, p) in control_points.iter().enumerate() {
                                w.write_double(10, p.x)?;
                                w.write_double(20, p.y)?;
                                if *rational {
                                    w.write_double(42, weights.get(i).copied().unwrap_or(1.0))?;
                                }
                            }
                            if !fit_points.is_empty() {
                                w.write_int32(97, fit_points.len() as i32)?;
                                for p in fit_points {
                                    w.write_double(11, p.x)?;
                                    w.write_double(21, p.y)?;
                                }
                                w.write_double(12, start_tangent.x)?;
                                w.write_double(22, start_tangent.y)?;
                                w.write_double(13, end_tangent.x)?;
                                w.write_double(23, end_tangent.y)?;
                            }
                        }
                    }
                }
            }
            w.write_int32(97, 0)?;
        }
        w.write_int16(75, self.style.raw())?;
        w.write_int16(76, self.pattern_type.raw())?;
        if !self.solid {
            w.write_double(52, self.pattern_angle.to_degrees())?;
            w.write_double(41, self.pattern_scale)?;
            w.write_int16(77, i16::from(self.is_double))?;
            w.write_int16(78, self.pattern_lines.len() as i16)?;
            for line in &self.pattern_lines {
                w.write_double(53, line.angle.to_degrees())?;
                w.write_double(43, line.base.x)?;
                w.write_double(44, line.base.y)?;
                w.write_double(45, line.offset.x)?;
                w.write_double(46, line.offset.y)?;
                w.write_int16(79, line.dashes.len() as i16)?;
                for d in &line.dashes {
                    w.write_double(49, *d)?;
                }
            }
        }
        if let Some(px) = self.pixel_size {
            w.write_double(47, px)?;
        }
        w.write_int32(98, self.seed_points.len() as i32)?;
        for p in &self.seed_points {
            w.write_double(10, p.x)?;
            w.write_double(20, p.y)?;
        }
        if version.r2004_plus() {
            if let Some(g) = &self.gradient {
                w.write_int32(450, 1)?;
                w.write_int32(451, 0)?;
                w.write_double(460, g.angle)?;
                w.write_double(461, g.shift)?;
                w.write_int32(452, i32::from(g.single_color))?;
                w.write_double(462, g.tint)?;
                w.write_int32(453, g.stops.len() as i32)?;
                for stop in &g.stops {
                    w.write_double(463, stop.value)?;
                    w.write_int32(421, stop.color.true_color().unwrap_or(0))?;
                }
                w.write_string(470, &g.name)?;
            }
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        if version.r2004_plus() {
            let is_gradient = r.get_bit_long()? != 0;
            let _reserved = r.get_bit_long()?;
            let angle = r.get_bit_double()?;
            let shift = r.get_bit_double()?;
            let single_color = r.get_bit_long()? != 0;
            let tint = r.get_bit_double()?;
            let n_colors = r.get_bit_long()?;
            check_count(n_colors, "gradient colors")?;
            let mut stops = Vec::with_capacity(n_colors as usize);
            for _ in 0..n_colors {
                let value = r.get_bit_double()?;
                let rgb = r.get_bit_long()?;
                stops.push(GradientStop {
                    value,
                    color: Color::from_true_color(rgb),
                });
            }
            let name = r.get_variable_text(version, false)?;
            self.gradient = is_gradient.then_some(GradientFill {
                name,
                angle,
                shift,
                single_color,
                tint,
                stops,
            });
        }
        self.elevation = r.get_bit_double()?;
        self.common.extrusion = r.get_coord()?;
        self.pattern_name = r.get_variable_text(version, false)?;
        self.solid = r.get_bit()?;
        self.associative = r.get_bit()?;
        let n_paths = r.get_bit_long()?;
        check_count(n_paths, "hatch paths")?;
        self.loops.clear();
        let mut boundary_handles = 0i64;
        for _ in 0..n_paths {
            let flags = r.get_bit_long()?;
            let mut l = HatchLoop {
                flags,
                ..Default::default()
            };
            if l.is_polyline() {
                let has_bulge = r.get_bit()?;
                l.is_closed = r.get_bit()?;
                let n_verts = r.get_bit_long()?;
                check_count(n_verts, "hatch path vertices")?;
                for _ in 0..n_verts {
                    let location = r.get_raw_coord2()?;
                    let bulge = if has_bulge { r.get_bit_double()? } else { 0.0 };
                    l.vertices.push(HatchVertex { location, bulge });
                }
            } else {
                let n_edges = r.get_bit_long()?;
                check_count(n_edges, "hatch path edges")?;
                for _ in 0..n_edges {
                    let kind = r.get_raw_char()? as i16;
                    let edge = match kind {
                        1 => HatchEdge::Line {
                            start: r.get_raw_coord2()?,
                            end: r.get_raw_coord2()?,
                        },
                        2 => HatchEdge::Arc {
                            center: r.get_raw_coord2()?,
                            radius: r.get_bit_double()?,
                            start_angle: r.get_bit_double()?,
                            end_angle: r.get_bit_double()?,
                            ccw: r.get_bit()?,
                        },
                        3 => HatchEdge::EllipseArc {
                            center: r.get_raw_coord2()?,
                            major_end: r.get_raw_coord2()?,
                            ratio: r.get_bit_double()?,
                            start_angle: r.get_bit_double()?,
                            end_angle: r.get_bit_double()?,
                            ccw: r.get_bit()?,
                        },
                        4 => {
                            let degree = r.get_bit_long()?;
                            let rational = r.get_bit()?;
                            let periodic = r.get_bit()?;
                            let n_knots = r.get_bit_long()?;
                            check_count(n_knots, "hatch spline knots")?;
                            let n_ctrl = r.get_bit_long()?;
                            check_count(n_ctrl, "hatch spline control points")?;
                            let mut knots = Vec::with_capacity(n_knots as usize);
                            for _ in 0..n_knots {
                                knots.push(r.get_bit_double()?);
                            }
                            let mut control_points = Vec::with_capacity(n_ctrl as usize);
                            let mut weights = Vec::new();
                            for _ in 0..n_ctrl {
                                control_points.push(r.get_raw_coord2()?);
                                if rational {
                                    weights.push(r.get_bit_double()?);
                                }
                            }
                            let mut fit_points = Vec::new();
                            let mut start_tangent = Coord::ZERO;
                            let mut end_tangent = Coord::ZERO;
                            if version.r2010_plus() {
                                let n_fit = r.get_bit_long()?;
                                check_count(n_fit, "hatch spline fit points")?;
                                for _ in 0..n_fit {
                                    fit_points.push(r.get_raw_coord2()?);
                                }
                                if n_fit > 0 {
                                    start_tangent = r.get_raw_coord2()?;
                                    end_tangent = r.get_raw_coord2()?;
                                }
                            }
                            HatchEdge::Spline {
                                degree,
                                rational,
                                periodic,
                                knots,
                                control_points,
                                weights,
                                fit_points,
                                start_tangent,
                                end_tangent,
                            }
                        }
                        other => {
                            return Err(CadError::Malformed(format!(
                                "hatch edge kind {other}"
                            )));
                        }
                    };
                    l.edges.push(edge);
                }
            }
            boundary_handles += r.get_bit_long()? as i64;
            self.loops.push(l);
        }
        self.style = HatchStyle::from_raw(r.get_bit_short()?);
        self.pattern_type = PatternType::from_raw(r.get_bit_short()?);
        if !self.solid {
            self.pattern_angle = r.get_bit_double()?;
            self.pattern_scale = r.get_bit_double()?;
            self.is_double = r.get_bit()?;
            let n_lines = r.get_bit_short()?;
            self.pattern_lines.clear();
            for _ in 0..n_lines.max(0) {
                let angle = r.get_bit_double()?;
                let base = r.get_raw_coord2()?;
                let offset = r.get_raw_coord2()?;
                let n_dashes = r.get_bit_short()?;
                let mut dashes = Vec::with_capacity(n_dashes.max(0) as usize);
                for _ in 0..n_dashes.max(0) {
                    dashes.push(r.get_bit_double()?);
                }
                self.pattern_lines.push(HatchPatternLine {
                    angle,
                    base,
                    offset,
                    dashes,
                });
            }
        }
        self.pixel_size = if r.get_bit()? {
            Some(r.get_bit_double()?)
        } else {
            None
        };
        let n_seeds = r.get_bit_long()?;
        check_count(n_seeds, "hatch seed points")?;
        self.seed_points.clear();
        for _ in 0..n_seeds {
            self.seed_points.push(r.get_raw_coord2()?);
        }
        // Boundary object references are regenerated on write.
        for _ in 0..boundary_handles {
            r.get_handle()?;
        }
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        if version.r2004_plus() {
            let g = self.gradient.as_ref();
            w.write_bit_long(450, i32::from(g.is_some()))?;
            w.write_bit_long(451, 0)?;
            w.write_bit_double(460, g.map_or(0.0, |g| g.angle))?;
            w.write_bit_double(461, g.map_or(0.0, |g| g.shift))?;
            w.write_bit_long(452, i32::from(g.is_some_and(|g| g.single_color)))?;
            w.write_bit_double(462, g.map_or(0.0, |g| g.tint))?;
            let stops: &[GradientStop] = g.map_or(&[], |g| &g.stops);
            w.write_bit_long(453, stops.len() as i32)?;
            for stop in stops {
                w.write_bit_double(463, stop.value)?;
                w.write_bit_long(421, stop.color.true_color().unwrap_or(0))?;
            }
            w.write_variable_text(470, g.map_or("", |g| g.name.as_str()), version, false)?;
        }
        w.write_bit_double(30, self.elevation)?;
        w.write_coord(210, self.common.extrusion)?;
        w.write_variable_text(2, &self.pattern_name, version, false)?;
        w.write_bit(70, self.solid)?;
        w.write_bit(71, self.associative)?;
        w.write_bit_long(91, self.loops.len() as i32)?;
        for l in &self.loops {
            w.write_bit_long(92, l.flags)?;
            if l.is_polyline() {
                let has_bulge = l.vertices.iter().any(|v| v.bulge != 0.0);
                w.write_bit(72, has_bulge)?;
                w.write_bit(73, l.is_closed)?;
                w.write_bit_long(93, l.vertices.len() as i32)?;
                for v in &l.vertices {
                    w.write_raw_coord2(10, v.location)?;
                    if has_bulge {
                        w.write_bit_double(42, v.bulge)?;
                    }
                }
            } else {
                w.write_bit_long(93, l.edges.len() as i32)?;
                for edge in &l.edges {
                    w.write_raw_char(72, edge.kind() as u8)?;
                    match edge {
                        HatchEdge::Line { start, end } => {
                            w.write_raw_coord2(10, *start)?;
                            w.write_raw_coord2(11, *end)?;
                        }
                        HatchEdge::Arc {
                            center,
                            radius,
                            start_angle,
                            end_angle,
                            ccw,
                        } => {
                            w.write_raw_coord2(10, *center)?;
                            w.write_bit_double(40, *radius)?;
                            w.write_bit_double(50, *start_angle)?;
                            w.write_bit_double(51, *end_angle)?;
                            w.write_bit(73, *ccw)?;
                        }
                        HatchEdge::EllipseArc {
                            center,
                            major_end,
                            ratio,
                            start_angle,
                            end_angle,
                            ccw,
                        } => {
                            w.write_raw_coord2(10, *center)?;
                            w.write_raw_coord2(11, *major_end)?;
                            w.write_bit_double(40, *ratio)?;
                            w.write_bit_double(50, *start_angle)?;
                            w.write_bit_double(51, *end_angle)?;
                            w.write_bit(73, *ccw)?;
                        }
                        HatchEdge::Spline {
                            degree,
                            rational,
                            periodic,
                            knots,
                            control_points,
                            weights,
                            fit_points,
                            start_tangent,
                            end_tangent,
                        } => {
                            w.write_bit_long(94, *degree)?;
                            w.write_bit(73, *rational)?;
                            w.write_bit(74, *periodic)?;
                            w.write_bit_long(95, knots.len() as i32)?;
                            w.write_bit_long(96, control_points.len() as i32)?;
                            for k in knots {
                                w.write_bit_double(40, *k)?;
                            }
                            for (i, p) in control_points.iter().enumerate() {
                                w.write_raw_coord2(10, *p)?;
                                if *rational {
                                    w.write_bit_double(42, weights.get(i).copied().unwrap_or(1.0))?;
                                }
                            }
                            if version.r2010_plus() {
                                w.write_bit_long(97, fit_points.len() as i32)?;
                                for p in fit_points {
                                    w.write_raw_coord2(11, *p)?;
                                }
                                if !fit_points.is_empty() {
                                    w.write_raw_coord2(12, *start_tangent)?;
                                    w.write_raw_coord2(13, *end_tangent)?;
                                }
                            }
                        }
                    }
                }
            }
            w.write_bit_long(97, 0)?;
        }
        w.write_bit_short(75, self.style.raw())?;
        w.write_bit_short(76, self.pattern_type.raw())?;
        if !self.solid {
            w.write_bit_double(52, self.pattern_angle)?;
            w.write_bit_double(41, self.pattern_scale)?;
            w.write_bit(77, self.is_double)?;
            w.write_bit_short(78, self.pattern_lines.len() as i16)?;
            for line in &self.pattern_lines {
                w.write_bit_double(53, line.angle)?;
                w.write_raw_coord2(43, line.base)?;
                w.write_raw_coord2(45, line.offset)?;
                w.write_bit_short(79, line.dashes.len() as i16)?;
                for d in &line.dashes {
                    w.write_bit_double(49, *d)?;
                }
            }
        }
        match self.pixel_size {
            Some(px) => {
                w.write_bit(0, true)?;
                w.write_bit_double(47, px)?;
            }
            None => w.write_bit(0, false)?,
        }
        w.write_bit_long(98, self.seed_points.len() as i32)?;
        for p in &self.seed_points {
            w.write_raw_coord2(10, *p)?;
        }
        Ok(())
    }
}

impl Default for Hatch {
    fn default() -> Self {
        Hatch {
            common: EntityHeader::new(),
            pattern_name: "SOLID".to_string(),
            solid: true,
            associative: false,
            style: HatchStyle::Normal,
            pattern_type: PatternType::Predefined,
            pattern_angle: 0.0,
            pattern_scale: 1.0,
            is_double: false,
            elevation: 0.0,
            loops: Vec::new(),
            pattern_lines: Vec::new(),
            pixel_size: None,
            seed_points: Vec::new(),
            gradient: None,
            seeds_expected: 0,
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
