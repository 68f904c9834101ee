//! Leader entity, an annotation line with an arrowhead.

use crate::error::{CadError, Result};
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord, Handle};

use super::EntityHeader;

/// Leader path type, group 72.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderPathType {
    #[default]
    Straight,
    Spline,
}

impl LeaderPathType {
    pub fn from_raw(value: i16) -> Self {
        if value == 1 {
            LeaderPathType::Spline
        } else {
            LeaderPathType::Straight
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            LeaderPathType::Straight => 0,
            LeaderPathType::Spline => 1,
        }
    }
}

/// What the leader points at, group 73.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderAnnotation {
    Text,
    Tolerance,
    BlockReference,
    #[default]
    None,
}

impl LeaderAnnotation {
    pub fn from_raw(value: i16) -> Self {
        match value {
            0 => LeaderAnnotation::Text,
            1 => LeaderAnnotation::Tolerance,
            2 => LeaderAnnotation::BlockReference,
            _ => LeaderAnnotation::None,
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            LeaderAnnotation::Text => 0,
            LeaderAnnotation::Tolerance => 1,
            LeaderAnnotation::BlockReference => 2,
            LeaderAnnotation::None => 3,
        }
    }
}

/// An annotation leader line.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 3 | Dimension style name |
/// | 71 | Arrowhead on (default 1) |
/// | 72 | Path type |
/// | 73 | Annotation type |
/// | 74 | Hookline direction |
/// | 75 | Hookline on |
/// | 40, 41 | Annotation height / width |
/// | 76 | Vertex count |
/// | 10, 20, 30 | Vertex (repeats) |
/// | 211 | Horizontal direction |
/// | 212 | Block offset |
/// | 213 | Annotation offset |
/// | 340 | Annotation reference |
#[derive(Debug, Clone, PartialEq)]
pub struct Leader {
    pub common: EntityHeader,
    pub vertices: Vec<Coord>,
    pub style: String,
    pub arrowhead_on: bool,
    pub path_type: LeaderPathType,
    pub annotation_type: LeaderAnnotation,
    pub hookline_direction: bool,
    pub hookline_on: bool,
    pub text_height: f64,
    pub text_width: f64,
    pub horizontal_direction: Coord,
    pub block_offset: Coord,
    pub annotation_offset: Coord,
    pub annotation_handle: Handle,
    pub style_handle: Handle,
    /// Arrowhead size carried only by the binary stream.
    pub arrowhead_size: f64,
}

impl Leader {
    pub fn new(vertices: Vec<Coord>) -> Self {
        Leader {
            vertices,
            ..Default::default()
        }
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            3 => self.style = reader.get_utf8_string()?,
            71 => self.arrowhead_on = reader.get_int16()? != 0,
            72 => self.path_type = LeaderPathType::from_raw(reader.get_int16()?),
            73 => self.annotation_type = LeaderAnnotation::from_raw(reader.get_int16()?),
            74 => self.hookline_direction = reader.get_int16()? != 0,
            75 => self.hookline_on = reader.get_int16()? != 0,
            40 => self.text_height = reader.get_double()?,
            41 => self.text_width = reader.get_double()?,
            76 => {
                let n = reader.get_int16()?;
                self.vertices.reserve(n.max(0) as usize);
            }
            10 => self.vertices.push(Coord::new(reader.get_double()?, 0.0, 0.0)),
            20 => {
                if let Some(v) = self.vertices.last_mut() {
                    v.y = reader.get_double()?;
                }
            }
            30 => {
                if let Some(v) = self.vertices.last_mut() {
                    v.z = reader.get_double()?;
                }
            }
            211 => self.horizontal_direction.x = reader.get_double()?,
            221 => self.horizontal_direction.y = reader.get_double()?,
            231 => self.horizontal_direction.z = reader.get_double()?,
            212 => self.block_offset.x = reader.get_double()?,
            222 => self.block_offset.y = reader.get_double()?,
            232 => self.block_offset.z = reader.get_double()?,
            213 => self.annotation_offset.x = reader.get_double()?,
            223 => self.annotation_offset.y = reader.get_double()?,
            233 => self.annotation_offset.z = reader.get_double()?,
            340 => self.annotation_handle = reader.get_handle()?,
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "LEADER")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbLeader")?;
        }
        w.write_string(3, &self.style)?;
        w.write_int16(71, i16::from(self.arrowhead_on))?;
        w.write_int16(72, self.path_type.raw())?;
        w.write_int16(73, self.annotation_type.raw())?;
        w.write_int16(74, i16::from(self.hookline_direction))?;
        w.write_int16(75, i16::from(self.hookline_on))?;
        if self.text_height != 0.0 {
            w.write_double(40, self.text_height)?;
        }
        if self.text_width != 0.0 {
            w.write_double(41, self.text_width)?;
        }
        w.write_int16(76, self.vertices.len() as i16)?;
        for v in &self.vertices {
            w.write_double(10, v.x)?;
            w.write_double(20, v.y)?;
            w.write_double(30, v.z)?;
        }
        if self.annotation_handle.is_valid() {
            w.write_handle(340, self.annotation_handle)?;
        }
        self.common.write_extrusion_dxf(w)?;
        if self.horizontal_direction != Coord::ZERO {
            w.write_double(211, self.horizontal_direction.x)?;
            w.write_double(221, self.horizontal_direction.y)?;
            w.write_double(231, self.horizontal_direction.z)?;
        }
        if self.block_offset != Coord::ZERO {
            w.write_double(212, self.block_offset.x)?;
            w.write_double(222, self.block_offset.y)?;
            w.write_double(232, self.block_offset.z)?;
        }
        if self.annotation_offset != Coord::ZERO {
            w.write_double(213, self.annotation_offset.x)?;
            w.write_double(223, self.annotation_offset.y)?;
            w.write_double(233, self.annotation_offset.z)?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        let _unknown = r.get_bit()?;
        self.annotation_type = LeaderAnnotation::from_raw(r.get_bit_short()?);
        self.path_type = LeaderPathType::from_raw(r.get_bit_short()?);
        let n_points = r.get_bit_long()?;
        if !(0..=10_000_000).contains(&n_points) {
            return Err(CadError::Malformed(format!(
                "leader vertex count {n_points}"
            )));
        }
        self.vertices.clear();
        for _ in 0..n_points {
            self.vertices.push(r.get_coord()?);
        }
        // An application-maintained endpoint projection precedes the normal.
        let _end_point_proj = r.get_coord()?;
        self.common.extrusion = r.get_coord()?;
        self.horizontal_direction = r.get_coord()?;
        self.block_offset = r.get_coord()?;
        if version.is_r13_plus() {
            self.annotation_offset = r.get_coord()?;
        }
        if version.r2000_plus() {
            self.arrowhead_size = r.get_bit_double()?;
        }
        self.hookline_on = r.get_bit()?;
        self.arrowhead_on = r.get_bit()?;
        if version.r13_14_only() {
            self.arrowhead_size = r.get_bit_double()?;
            self.text_width = r.get_bit_double()?;
            self.text_height = r.get_bit_double()?;
        }
        let _color = r.get_bit_short()?;
        self.annotation_handle = r.get_handle()?;
        self.style_handle = r.get_handle()?;
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_bit(0, false)?;
        w.write_bit_short(73, self.annotation_type.raw())?;
        w.write_bit_short(72, self.path_type.raw())?;
        w.write_bit_long(76, self.vertices.len() as i32)?;
        for v in &self.vertices {
            w.write_coord(10, *v)?;
        }
        let end_proj = self.vertices.last().copied().unwrap_or(Coord::ZERO);
        w.write_coord(0, end_proj)?;
        w.write_coord(210, self.common.extrusion)?;
        w.write_coord(211, self.horizontal_direction)?;
        w.write_coord(212, self.block_offset)?;
        if version.is_r13_plus() {
            w.write_coord(213, self.annotation_offset)?;
        }
        if version.r2000_plus() {
            w.write_bit_double(0, self.arrowhead_size)?;
        }
        w.write_bit(75, self.hookline_on)?;
        w.write_bit(71, self.arrowhead_on)?;
        if version.r13_14_only() {
            w.write_bit_double(0, self.arrowhead_size)?;
            w.write_bit_double(41, self.text_width)?;
            w.write_bit_double(40, self.text_height)?;
        }
        w.write_bit_short(77, 0)?;
        w.write_handle(340, self.annotation_handle)?;
        w.write_handle(3, self.style_handle)?;
        Ok(())
    }
}

impl Default for Leader {
    fn default() -> Self {
        Leader {
            common: EntityHeader::new(),
            vertices: Vec::new(),
            style: "STANDARD".to_string(),
            arrowhead_on: true,
            path_type: LeaderPathType::Straight,
            annotation_type: LeaderAnnotation::None,
            hookline_direction: false,
            hookline_on: false,
            text_height: 0.0,
            text_width: 0.0,
            horizontal_direction: Coord::UNIT_X,
            block_offset: Coord::ZERO,
            annotation_offset: Coord::ZERO,
            annotation_handle: Handle::NULL,
            style_handle: Handle::NULL,
            arrowhead_size: 0.0,
        }
    }
}
