//! Rig configuration: the complete, immutable input of the metrics engine
//!
//! Coordinates: the camera looks along +X towards the flight line at
//! `distance_mm`; the ball flies along +Y starting at the tee (Y = 0); Z is
//! height above the tee. All lengths are millimeters.

use serde::{Deserialize, Serialize};

use crate::hardware::sensor::SensorSpec;

pub const BALL_DIAMETER_MM: f64 = 42.67;
pub const BALL_RADIUS_MM: f64 = BALL_DIAMETER_MM / 2.0;

/// FOV bottom edge when club tracking is enabled (6" before the tee)
pub const CLUB_FOV_BOTTOM_MM: f64 = -152.4;
/// Margin kept between the FOV bottom edge and the first ball image
pub const FIRST_BALL_MARGIN_MM: f64 = 25.4;

/// Standard base-to-height ratios (distance : stereo base)
pub const STEREO_RATIOS: [f64; 8] = [30.0, 20.0, 15.0, 10.0, 7.5, 5.0, 4.0, 3.0];

/// Replace a non-positive denominator with a safe fallback
pub(crate) fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Where the ball is imaged along the flight line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSchedule {
    /// Distance from the tee to the first exposure
    pub first_position_mm: f64,
    /// Distance between consecutive exposures
    pub spacing_mm: f64,
    /// Number of exposures, at least 2
    pub count: u32,
}

impl Default for BallSchedule {
    fn default() -> Self {
        Self {
            first_position_mm: 152.4,
            spacing_mm: 64.0,
            count: 2,
        }
    }
}

impl BallSchedule {
    /// Ball center of every exposure
    pub fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(move |i| self.first_position_mm + i as f64 * self.spacing_mm)
    }

    /// Distance from the tee to the last exposure, never below 1mm
    pub fn flight_distance_mm(&self) -> f64 {
        let last = self.first_position_mm + self.count.saturating_sub(1) as f64 * self.spacing_mm;
        positive_or(last, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StereoAlignment {
    /// Cameras side by side along the flight line
    Horizontal,
    /// Cameras stacked above each other
    Vertical,
}

/// Separation between the two stereo viewpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StereoBase {
    /// Fixed separation in millimeters
    Fixed(f64),
    /// Separation derived from the camera distance, `distance / ratio`, truncated to whole mm
    Ratio(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereoConfig {
    pub alignment: StereoAlignment,
    pub base: StereoBase,
}

impl StereoConfig {
    pub fn fixed(alignment: StereoAlignment, base_mm: f64) -> Self {
        Self {
            alignment,
            base: StereoBase::Fixed(base_mm),
        }
    }

    pub fn from_ratio(alignment: StereoAlignment, ratio: f64) -> Self {
        Self {
            alignment,
            base: StereoBase::Ratio(ratio),
        }
    }

    /// Stereo base in millimeters for a camera at `distance_mm`
    pub fn base_mm(&self, distance_mm: f64) -> f64 {
        match self.base {
            StereoBase::Fixed(base) => base.max(0.0),
            StereoBase::Ratio(ratio) => (distance_mm / positive_or(ratio, 1.0)).trunc().max(0.0),
        }
    }
}

/// Full description of one camera setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfiguration {
    /// Sensor as mounted (already rotated if the camera is turned)
    pub sensor: SensorSpec,
    /// 2x2 binning enabled
    pub binning: bool,
    /// Illumination wavelength in nm
    pub wavelength_nm: u32,
    pub focal_mm: f64,
    /// f-number
    pub aperture: f64,
    /// Perpendicular distance from the lens to the flight line
    pub distance_mm: f64,
    /// Focus plane shift relative to `distance_mm`
    pub focus_offset_mm: f64,
    /// Circle of confusion as a multiple of the pixel pitch
    pub coc_multiplier: f64,
    /// Vertical camera offset added to the height that puts the FOV bottom at the tee
    pub camera_offset_mm: f64,
    /// Fixed FOV center along the flight line; `None` anchors the FOV on the ball schedule
    pub parallel_center_mm: Option<f64>,
    pub balls: BallSchedule,
    pub include_club: bool,
    pub stereo: Option<StereoConfig>,
}

impl RigConfiguration {
    /// Sensor as read out, with binning applied
    pub fn effective_sensor(&self) -> SensorSpec {
        self.sensor.with_binning(self.binning)
    }

    /// Stereo base at the configured distance, 0 without stereo
    pub fn stereo_base_mm(&self) -> f64 {
        self.stereo
            .map(|s| s.base_mm(self.distance_mm))
            .unwrap_or(0.0)
    }

    pub fn stereo_alignment(&self) -> Option<StereoAlignment> {
        self.stereo.map(|s| s.alignment)
    }

    /// Read-out geometry after binning: (width px, height px, pixel size um)
    pub fn readout(&self) -> (u32, u32, f64) {
        if self.binning {
            (
                self.sensor.width_px / 2,
                self.sensor.height_px / 2,
                self.sensor.pixel_size_um * 2.0,
            )
        } else {
            (
                self.sensor.width_px,
                self.sensor.height_px,
                self.sensor.pixel_size_um,
            )
        }
    }

    /// Physical size (width, height) in mm of the read-out pixel array
    pub fn sensor_dimensions_mm(&self) -> (f64, f64) {
        let (width_px, height_px, pixel_um) = self.readout();
        let pixel_mm = pixel_um / 1000.0;
        (width_px as f64 * pixel_mm, height_px as f64 * pixel_mm)
    }

    /// Pinhole field of view (width, height) at `distance_mm`
    pub fn raw_fov_mm_at(&self, distance_mm: f64) -> (f64, f64) {
        let (sensor_w, sensor_h) = self.sensor_dimensions_mm();
        let focal = positive_or(self.focal_mm, 1.0);
        (sensor_w * distance_mm / focal, sensor_h * distance_mm / focal)
    }

    /// Field of view (width, height) shared by both cameras at the configured distance
    pub fn effective_fov_mm(&self) -> (f64, f64) {
        let (raw_w, raw_h) = self.raw_fov_mm_at(positive_or(self.distance_mm, 1.0));
        let base = self.stereo_base_mm();
        match self.stereo_alignment() {
            Some(StereoAlignment::Horizontal) => ((raw_w - base).max(0.0), raw_h),
            Some(StereoAlignment::Vertical) => (raw_w, (raw_h - base).max(0.0)),
            None => (raw_w, raw_h),
        }
    }

    /// Where the FOV bottom edge sits when no fixed center is given
    pub fn fov_anchor_mm(&self) -> f64 {
        if self.include_club {
            CLUB_FOV_BOTTOM_MM
        } else {
            self.balls.first_position_mm - FIRST_BALL_MARGIN_MM
        }
    }

    pub fn with_parallel_center(&self, center_mm: f64) -> Self {
        Self {
            parallel_center_mm: Some(center_mm),
            ..self.clone()
        }
    }
}

/// FOV center that puts the bottom edge on the anchor for the current
/// distance, focal length and stereo layout.
///
/// Call again whenever any of those inputs (or club mode) changes.
pub fn default_parallel_offset(rig: &RigConfiguration) -> f64 {
    let (fov_w, _) = rig.effective_fov_mm();
    rig.fov_anchor_mm() + fov_w / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::sensor::models;
    use approx::assert_relative_eq;

    fn rig() -> RigConfiguration {
        RigConfiguration {
            sensor: models::IMX296.clone(),
            binning: false,
            wavelength_nm: 810,
            focal_mm: 6.0,
            aperture: 1.2,
            distance_mm: 430.0,
            focus_offset_mm: 0.0,
            coc_multiplier: 2.0,
            camera_offset_mm: 0.0,
            parallel_center_mm: None,
            balls: BallSchedule::default(),
            include_club: false,
            stereo: None,
        }
    }

    #[test]
    fn test_ball_schedule() {
        let balls = BallSchedule {
            first_position_mm: 100.0,
            spacing_mm: 50.0,
            count: 3,
        };
        assert_eq!(balls.positions().collect::<Vec<_>>(), vec![100.0, 150.0, 200.0]);
        assert_eq!(balls.flight_distance_mm(), 200.0);

        let backwards = BallSchedule {
            first_position_mm: -10.0,
            spacing_mm: -5.0,
            count: 2,
        };
        assert_eq!(backwards.flight_distance_mm(), 1.0);
    }

    #[test]
    fn test_stereo_base() {
        let ratio = StereoConfig::from_ratio(StereoAlignment::Horizontal, 5.0);
        assert_eq!(ratio.base_mm(430.0), 86.0);
        assert_eq!(ratio.base_mm(433.0), 86.0);
        let fixed = StereoConfig::fixed(StereoAlignment::Vertical, 60.0);
        assert_eq!(fixed.base_mm(1000.0), 60.0);
    }

    #[test]
    fn test_effective_fov_stereo() {
        let mono = rig();
        let (raw_w, raw_h) = mono.effective_fov_mm();

        let horizontal = RigConfiguration {
            stereo: Some(StereoConfig::fixed(StereoAlignment::Horizontal, 100.0)),
            ..rig()
        };
        let (w, h) = horizontal.effective_fov_mm();
        assert_relative_eq!(w, raw_w - 100.0, epsilon = 1e-9);
        assert_eq!(h, raw_h);

        let vertical = RigConfiguration {
            stereo: Some(StereoConfig::fixed(StereoAlignment::Vertical, 100.0)),
            ..rig()
        };
        let (w, h) = vertical.effective_fov_mm();
        assert_eq!(w, raw_w);
        assert_relative_eq!(h, raw_h - 100.0, epsilon = 1e-9);

        let too_wide = RigConfiguration {
            stereo: Some(StereoConfig::fixed(StereoAlignment::Horizontal, 10_000.0)),
            ..rig()
        };
        assert_eq!(too_wide.effective_fov_mm().0, 0.0);
    }

    #[test]
    fn test_default_parallel_offset() {
        let ball_mode = rig();
        let (w, _) = ball_mode.effective_fov_mm();
        assert_relative_eq!(
            default_parallel_offset(&ball_mode),
            152.4 - 25.4 + w / 2.0,
            epsilon = 1e-9
        );

        let club_mode = RigConfiguration {
            include_club: true,
            ..rig()
        };
        assert_relative_eq!(
            default_parallel_offset(&club_mode),
            CLUB_FOV_BOTTOM_MM + w / 2.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_readout_matches_binned_sensor() {
        let binned = RigConfiguration {
            binning: true,
            ..rig()
        };
        let sensor = binned.effective_sensor();
        assert_eq!(
            binned.readout(),
            (sensor.width_px, sensor.height_px, sensor.pixel_size_um)
        );
        assert_eq!(binned.sensor_dimensions_mm(), sensor.dimensions_mm());
    }

    #[test]
    fn test_degenerate_focal_is_clamped() {
        let degenerate = RigConfiguration {
            focal_mm: 0.0,
            ..rig()
        };
        let (w, h) = degenerate.effective_fov_mm();
        assert!(w.is_finite() && h.is_finite());
    }
}
