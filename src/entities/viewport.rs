//! Paper space viewport entity.

use crate::error::{CadError, Result};
use crate::io::record::{RecordReader, RecordWriter};
use crate::types::{CadVersion, Coord, Handle};

use super::EntityHeader;

/// A rectangular window on paper space showing a model space view.
///
/// Viewport 1 of a layout is the paper space view itself; placed
/// viewports number from 2 upward.
///
/// # DXF Group Codes
///
/// | Code | Description |
/// |------|-------------|
/// | 10, 20, 30 | Center in paper space |
/// | 40, 41 | Paper width / height |
/// | 68 | Status (0 off, >0 stacking order) |
/// | 69 | Viewport id |
/// | 12, 22 | View center in model space |
/// | 13, 23 | Snap base point |
/// | 14, 24 | Snap spacing |
/// | 15, 25 | Grid spacing |
/// | 16, 26, 36 | View direction |
/// | 17, 27, 37 | View target |
/// | 42 | Lens length |
/// | 43, 44 | Front / back clip plane |
/// | 45 | View height |
/// | 50 | Snap angle (degrees) |
/// | 51 | View twist (degrees) |
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub common: EntityHeader,
    pub center: Coord,
    pub width: f64,
    pub height: f64,
    pub status: i16,
    pub viewport_id: i16,
    pub view_center: Coord,
    pub snap_base: Coord,
    pub snap_spacing: Coord,
    pub grid_spacing: Coord,
    pub view_direction: Coord,
    pub view_target: Coord,
    pub lens_length: f64,
    pub front_clip: f64,
    pub back_clip: f64,
    pub view_height: f64,
    /// Snap angle in radians.
    pub snap_angle: f64,
    /// View twist in radians.
    pub twist_angle: f64,
    pub circle_sides: i16,
    pub grid_major: i16,
    pub status_flags: i32,
    pub style_sheet: String,
    pub render_mode: u8,
    pub ucs_per_viewport: bool,
    pub ucs_origin: Coord,
    pub ucs_x_axis: Coord,
    pub ucs_y_axis: Coord,
    pub ucs_elevation: f64,
    pub ucs_ortho_type: i16,
    pub shade_plot_mode: i16,
    pub frozen_layers: Vec<Handle>,
    pub boundary_handle: Handle,
}

impl Viewport {
    pub fn new(center: Coord, width: f64, height: f64) -> Self {
        Viewport {
            center,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn is_on(&self) -> bool {
        self.status > 0
    }

    /// Model units per paper unit.
    pub fn scale(&self) -> f64 {
        if self.view_height != 0.0 {
            self.height / self.view_height
        } else {
            1.0
        }
    }

    pub fn parse_code(&mut self, code: i32, reader: &mut dyn RecordReader) -> Result<bool> {
        match code {
            10 => self.center.x = reader.get_double()?,
            20 => self.center.y = reader.get_double()?,
            30 => self.center.z = reader.get_double()?,
            40 => self.width = reader.get_double()?,
            41 => self.height = reader.get_double()?,
            68 => self.status = reader.get_int16()?,
            69 => self.viewport_id = reader.get_int16()?,
            12 => self.view_center.x = reader.get_double()?,
            22 => self.view_center.y = reader.get_double()?,
            13 => self.snap_base.x = reader.get_double()?,
            23 => self.snap_base.y = reader.get_double()?,
            14 => self.snap_spacing.x = reader.get_double()?,
            24 => self.snap_spacing.y = reader.get_double()?,
            15 => self.grid_spacing.x = reader.get_double()?,
            25 => self.grid_spacing.y = reader.get_double()?,
            16 => self.view_direction.x = reader.get_double()?,
            26 => self.view_direction.y = reader.get_double()?,
            36 => self.view_direction.z = reader.get_double()?,
            17 => self.view_target.x = reader.get_double()?,
            27 => self.view_target.y = reader.get_double()?,
            37 => self.view_target.z = reader.get_double()?,
            42 => self.lens_length = reader.get_double()?,
            43 => self.front_clip = reader.get_double()?,
            44 => self.back_clip = reader.get_double()?,
            45 => self.view_height = reader.get_double()?,
            50 => self.snap_angle = reader.get_double()?.to_radians(),
            51 => self.twist_angle = reader.get_double()?.to_radians(),
            72 => self.circle_sides = reader.get_int16()?,
            61 => self.grid_major = reader.get_int16()?,
            90 => self.status_flags = reader.get_int32()?,
            1 => self.style_sheet = reader.get_utf8_string()?,
            281 => self.render_mode = reader.get_int16()? as u8,
            71 => self.ucs_per_viewport = reader.get_int16()? != 0,
            110 => self.ucs_origin.x = reader.get_double()?,
            120 => self.ucs_origin.y = reader.get_double()?,
            130 => self.ucs_origin.z = reader.get_double()?,
            111 => self.ucs_x_axis.x = reader.get_double()?,
            121 => self.ucs_x_axis.y = reader.get_double()?,
            131 => self.ucs_x_axis.z = reader.get_double()?,
            112 => self.ucs_y_axis.x = reader.get_double()?,
            122 => self.ucs_y_axis.y = reader.get_double()?,
            132 => self.ucs_y_axis.z = reader.get_double()?,
            146 => self.ucs_elevation = reader.get_double()?,
            79 => self.ucs_ortho_type = reader.get_int16()?,
            170 => self.shade_plot_mode = reader.get_int16()?,
            331 => self.frozen_layers.push(reader.get_handle()?),
            _ => return self.common.parse_code(code, reader),
        }
        Ok(true)
    }

    pub fn write_dxf(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        w.write_string(0, "VIEWPORT")?;
        self.common.write_dxf(version, w)?;
        if version.is_r13_plus() {
            w.write_string(100, "AcDbViewport")?;
        }
        w.write_coord(10, self.center)?;
        w.write_double(40, self.width)?;
        w.write_double(41, self.height)?;
        w.write_int16(68, self.status)?;
        w.write_int16(69, self.viewport_id)?;
        w.write_double(12, self.view_center.x)?;
        w.write_double(22, self.view_center.y)?;
        w.write_double(13, self.snap_base.x)?;
        w.write_double(23, self.snap_base.y)?;
        w.write_double(14, self.snap_spacing.x)?;
        w.write_double(24, self.snap_spacing.y)?;
        w.write_double(15, self.grid_spacing.x)?;
        w.write_double(25, self.grid_spacing.y)?;
        w.write_double(16, self.view_direction.x)?;
        w.write_double(26, self.view_direction.y)?;
        w.write_double(36, self.view_direction.z)?;
        w.write_double(17, self.view_target.x)?;
        w.write_double(27, self.view_target.y)?;
        w.write_double(37, self.view_target.z)?;
        w.write_double(42, self.lens_length)?;
        w.write_double(43, self.front_clip)?;
        w.write_double(44, self.back_clip)?;
        w.write_double(45, self.view_height)?;
        w.write_double(50, self.snap_angle.to_degrees())?;
        w.write_double(51, self.twist_angle.to_degrees())?;
        w.write_int16(72, self.circle_sides)?;
        for h in &self.frozen_layers {
            w.write_handle(331, *h)?;
        }
        if version.r2000_plus() {
            w.write_int32(90, self.status_flags)?;
            if !self.style_sheet.is_empty() {
                w.write_string(1, &self.style_sheet)?;
            }
            w.write_int16(281, self.render_mode as i16)?;
            w.write_int16(71, i16::from(self.ucs_per_viewport))?;
            w.write_double(110, self.ucs_origin.x)?;
            w.write_double(120, self.ucs_origin.y)?;
            w.write_double(130, self.ucs_origin.z)?;
            w.write_double(111, self.ucs_x_axis.x)?;
            w.write_double(121, self.ucs_x_axis.y)?;
            w.write_double(131, self.ucs_x_axis.z)?;
            w.write_double(112, self.ucs_y_axis.x)?;
            w.write_double(122, self.ucs_y_axis.y)?;
            w.write_double(132, self.ucs_y_axis.z)?;
            w.write_int16(79, self.ucs_ortho_type)?;
            w.write_double(146, self.ucs_elevation)?;
        }
        if version.r2004_plus() {
            w.write_int16(170, self.shade_plot_mode)?;
        }
        self.common.write_ext_data(w)
    }

    pub fn parse_dwg(&mut self, version: CadVersion, r: &mut dyn RecordReader) -> Result<()> {
        self.common.parse_dwg(version, r)?;
        self.center = r.get_coord()?;
        self.width = r.get_bit_double()?;
        self.height = r.get_bit_double()?;
        let mut frozen_count = 0;
        if version.r2000_plus() {
            self.view_target = r.get_coord()?;
            self.view_direction = r.get_coord()?;
            self.twist_angle = r.get_bit_double()?;
            self.view_height = r.get_bit_double()?;
            self.lens_length = r.get_bit_double()?;
            self.front_clip = r.get_bit_double()?;
            self.back_clip = r.get_bit_double()?;
            self.snap_angle = r.get_bit_double()?;
            self.view_center = r.get_raw_coord2()?;
            self.snap_base = r.get_raw_coord2()?;
            self.snap_spacing = r.get_raw_coord2()?;
            self.grid_spacing = r.get_raw_coord2()?;
            self.circle_sides = r.get_bit_short()?;
            if version.r2007_plus() {
                self.grid_major = r.get_bit_short()?;
            }
            frozen_count = r.get_bit_long()?;
            if !(0..=1_000_000).contains(&frozen_count) {
                return Err(CadError::Malformed(format!(
                    "viewport frozen layer count {frozen_count}"
                )));
            }
            self.status_flags = r.get_bit_long()?;
            self.style_sheet = r.get_variable_text(version, false)?;
            self.render_mode = r.get_raw_char()?;
            self.ucs_per_viewport = r.get_bit()?;
            self.ucs_origin = r.get_coord()?;
            self.ucs_x_axis = r.get_coord()?;
            self.ucs_y_axis = r.get_coord()?;
            self.ucs_elevation = r.get_bit_double()?;
            self.ucs_ortho_type = r.get_bit_short()?;
        }
        if version.r2004_plus() {
            self.shade_plot_mode = r.get_bit_short()?;
        }
        if version.r2007_plus() {
            let _grid_flags = r.get_bit_short()?;
            let _default_lighting = r.get_bit()?;
            let _lighting_type = r.get_raw_char()?;
            let _brightness = r.get_bit_double()?;
            let _contrast = r.get_bit_double()?;
            let _ambient = r.get_raw_long()?;
        }
        let _vp_header = r.get_handle()?;
        self.frozen_layers.clear();
        for _ in 0..frozen_count {
            self.frozen_layers.push(r.get_handle()?);
        }
        self.boundary_handle = r.get_handle()?;
        if version.r2000_plus() {
            let _named_ucs = r.get_handle()?;
            let _base_ucs = r.get_handle()?;
        }
        Ok(())
    }

    pub fn write_dwg(&self, version: CadVersion, w: &mut dyn RecordWriter) -> Result<()> {
        self.common.write_dwg(version, w)?;
        w.write_coord(10, self.center)?;
        w.write_bit_double(40, self.width)?;
        w.write_bit_double(41, self.height)?;
        if version.r2000_plus() {
            w.write_coord(17, self.view_target)?;
            w.write_coord(16, self.view_direction)?;
            w.write_bit_double(51, self.twist_angle)?;
            w.write_bit_double(45, self.view_height)?;
            w.write_bit_double(42, self.lens_length)?;
            w.write_bit_double(43, self.front_clip)?;
            w.write_bit_double(44, self.back_clip)?;
            w.write_bit_double(50, self.snap_angle)?;
            w.write_raw_coord2(12, self.view_center)?;
            w.write_raw_coord2(13, self.snap_base)?;
            w.write_raw_coord2(14, self.snap_spacing)?;
            w.write_raw_coord2(15, self.grid_spacing)?;
            w.write_bit_short(72, self.circle_sides)?;
            if version.r2007_plus() {
                w.write_bit_short(61, self.grid_major)?;
            }
            w.write_bit_long(0, self.frozen_layers.len() as i32)?;
            w.write_bit_long(90, self.status_flags)?;
            w.write_variable_text(1, &self.style_sheet, version, false)?;
            w.write_raw_char(281, self.render_mode)?;
            w.write_bit(71, self.ucs_per_viewport)?;
            w.write_coord(110, self.ucs_origin)?;
            w.write_coord(111, self.ucs_x_axis)?;
            w.write_coord(112, self.ucs_y_axis)?;
            w.write_bit_double(146, self.ucs_elevation)?;
            w.write_bit_short(79, self.ucs_ortho_type)?;
        }
        if version.r2004_plus() {
            w.write_bit_short(170, self.shade_plot_mode)?;
        }
        if version.r2007_plus() {
            w.write_bit_short(60, 0)?;
            w.write_bit(0, true)?;
            w.write_raw_char(0, 0)?;
            w.write_bit_double(141, 0.0)?;
            w.write_bit_double(142, 0.0)?;
            w.write_raw_long(63, 0)?;
        }
        w.write_handle(0, Handle::NULL)?;
        for h in &self.frozen_layers {
            w.write_handle(331, *h)?;
        }
        w.write_handle(340, self.boundary_handle)?;
        if version.r2000_plus() {
            w.write_handle(345, Handle::NULL)?;
            w.write_handle(346, Handle::NULL)?;
        }
        Ok(())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            common: EntityHeader::new(),
            center: Coord::ZERO,
            width: 0.0,
            height: 0.0,
            status: 0,
            viewport_id: 1,
            view_center: Coord::ZERO,
            snap_base: Coord::ZERO,
            snap_spacing: Coord::new(10.0, 10.0, 0.0),
            grid_spacing: Coord::new(10.0, 10.0, 0.0),
            view_direction: Coord::UNIT_Z,
            view_target: Coord::ZERO,
            lens_length: 50.0,
            front_clip: 0.0,
            back_clip: 0.0,
            view_height: 1.0,
            snap_angle: 0.0,
            twist_angle: 0.0,
            circle_sides: 100,
            grid_major: 5,
            status_flags: 0,
            style_sheet: String::new(),
            render_mode: 0,
            ucs_per_viewport: true,
            ucs_origin: Coord::ZERO,
            ucs_x_axis: Coord::UNIT_X,
            ucs_y_axis: Coord::UNIT_Y,
            ucs_elevation: 0.0,
            ucs_ortho_type: 0,
            shade_plot_mode: 0,
            frozen_layers: Vec::new(),
            boundary_handle: Handle::NULL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bit::{BitReader, BitWriter};
    use crate::io::text::{TextReader, TextWriter};

    fn sample() -> Viewport {
        let mut vp = Viewport::new(Coord::new(128.5, 97.5, 0.0), 205.6, 156.0);
        vp.status = 1;
        vp.viewport_id = 2;
        vp.view_height = 80.0;
        vp.view_center = Coord::new(50.0, 40.0, 0.0);
        vp
    }

    #[test]
    fn test_scale() {
        let vp = sample();
        assert!((vp.scale() - 156.0 / 80.0).abs() < 1e-12);
        assert!(vp.is_on());
    }

    #[test]
    fn test_dxf_roundtrip() {
        let mut vp = sample();
        vp.frozen_layers = vec![Handle::new(0x31), Handle::new(0x32)];
        vp.twist_angle = 0.2;
        let mut w = TextWriter::new(Vec::new());
        vp.write_dxf(CadVersion::AC1015, &mut w).unwrap();
        let mut r = TextReader::new(std::io::Cursor::new(w.into_inner()));
        assert_eq!(r.read_record().unwrap(), Some(0));
        assert_eq!(r.get_utf8_string().unwrap(), "VIEWPORT");
        let mut back = Viewport::default();
        while let Some(code) = r.read_record().unwrap() {
            assert!(back.parse_code(code, &mut r).unwrap());
        }
        assert_eq!(back.center, vp.center);
        assert_eq!(back.width, vp.width);
        assert_eq!(back.status, 1);
        assert_eq!(back.frozen_layers, vp.frozen_layers);
        assert!((back.twist_angle - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_dwg_roundtrip() {
        for version in [CadVersion::AC1015, CadVersion::AC1021] {
            let mut vp = sample();
            vp.frozen_layers = vec![Handle::new(0x41)];
            vp.boundary_handle = Handle::new(0x77);
            vp.style_sheet = "monochrome.ctb".to_string();
            let mut w = BitWriter::new(version);
            vp.write_dwg(version, &mut w).unwrap();
            let mut r = BitReader::new(w.into_data(), version);
            let mut back = Viewport::default();
            back.parse_dwg(version, &mut r).unwrap();
            assert_eq!(back.center, vp.center, "{version:?}");
            assert_eq!(back.view_height, 80.0, "{version:?}");
            assert_eq!(back.view_center, vp.view_center, "{version:?}");
            assert_eq!(back.frozen_layers, vp.frozen_layers, "{version:?}");
            assert_eq!(back.boundary_handle, vp.boundary_handle, "{version:?}");
            assert_eq!(back.style_sheet, vp.style_sheet, "{version:?}");
        }
    }

    #[test]
    fn test_dwg_pre2000_minimal_body() {
        let version = CadVersion::AC1014;
        let vp = sample();
        let mut w = BitWriter::new(version);
        vp.write_dwg(version, &mut w).unwrap();
        let mut r = BitReader::new(w.into_data(), version);
        let mut back = Viewport::default();
        back.parse_dwg(version, &mut r).unwrap();
        assert_eq!(back.center, vp.center);
        assert_eq!(back.width, vp.width);
        assert_eq!(back.height, vp.height);
    }
}
