//! Metrics engine
//!
//! [`compute_metrics`] maps a [`RigConfiguration`] to a [`MetricsResult`]:
//! field of view and its placement on the flight line, resolution, depth of
//! field, brightness relative to a baseline rig, and the launch-angle window
//! in which the ball stays both in frame and in focus.
//!
//! # Depth of field
//!
//! With circle of confusion `c = pixel_mm * coc_multiplier`, hyperfocal
//! distance `H = f² / (N c)` and focus distance `s`:
//! - near limit `H s / (H + s)`
//! - far limit `H s / (H - s)` when `H > s`, otherwise "infinite"
//!
//! Infinite limits are reported as [`INFINITE_DOF_MM`] so that comparisons and
//! percentage changes stay finite.
//!
//! # Brightness
//!
//! Relative score `qe * pixel_um² / (N² d²)`, expressed as a percentage of the
//! same score for the baseline rig. Lens transmission and vignetting are not
//! modelled.

use serde::{Deserialize, Serialize};

use crate::rig::{
    positive_or, RigConfiguration, StereoAlignment, BALL_DIAMETER_MM, BALL_RADIUS_MM,
};

/// Far limit and depth of field reported when focus is at or beyond hyperfocal
pub const INFINITE_DOF_MM: f64 = 99_999.0;
/// Far-side deviation reported alongside an infinite far limit
pub const INFINITE_SAFE_FAR_MM: f64 = 9_999.0;
/// Beyond this far limit the top of the frame is treated as unbounded
pub const VLA_FAR_LIMIT_CAP_MM: f64 = 50_000.0;
/// Max VLA when the far limit exceeds [`VLA_FAR_LIMIT_CAP_MM`]
pub const VLA_UNBOUNDED_DEG: f64 = 89.0;
/// Frame top height paired with [`VLA_UNBOUNDED_DEG`]
pub const VLA_UNBOUNDED_TOP_MM: f64 = 5_000.0;
/// Max HLA when the depth of field is infinite
pub const HLA_UNBOUNDED_DEG: f64 = 90.0;

/// Whether every scheduled ball has to fit inside the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallFit {
    /// Launch angles are reported only when all balls fit
    Enforce,
    /// Skip the check (search passes)
    Ignore,
}

/// Angular window in which the ball stays visible and in focus, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchWindow {
    /// Most negative horizontal launch angle (towards the camera)
    pub hla_min_deg: f64,
    pub hla_max_deg: f64,
    /// Lowest vertical launch angle that still shows the ball
    pub vla_min_deg: f64,
    pub vla_max_deg: f64,
}

impl LaunchWindow {
    pub fn hla_span_deg(&self) -> f64 {
        self.hla_max_deg - self.hla_min_deg
    }

    pub fn vla_span_deg(&self) -> f64 {
        self.vla_max_deg - self.vla_min_deg
    }
}

/// Everything derived from one rig configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    /// Pixels per millimeter at the flight line
    pub resolution_px_per_mm: f64,
    pub pixel_size_mm: f64,
    pub qe: f64,

    pub raw_fov_width_mm: f64,
    pub raw_fov_height_mm: f64,
    /// Overlap width for horizontal stereo, raw width otherwise
    pub fov_width_mm: f64,
    /// Overlap height for vertical stereo, raw height otherwise
    pub fov_height_mm: f64,
    pub fov_center_mm: f64,
    pub fov_top_mm: f64,
    pub fov_bottom_mm: f64,
    /// Camera height above the tee
    pub total_camera_height_mm: f64,

    pub focus_distance_mm: f64,
    pub near_limit_mm: f64,
    /// [`INFINITE_DOF_MM`] at or beyond hyperfocal
    pub far_limit_mm: f64,
    /// [`INFINITE_DOF_MM`] at or beyond hyperfocal
    pub dof_mm: f64,

    /// Percentage of the baseline brightness score
    pub brightness_pct: f64,

    /// `None` when a scheduled ball falls outside the frame
    pub launch_window: Option<LaunchWindow>,

    pub flight_distance_mm: f64,
    pub safe_near_deviation_mm: f64,
    pub safe_far_deviation_mm: f64,
    pub fov_bottom_z_near_mm: f64,
    pub fov_top_z_far_mm: f64,
    pub min_vla_rad: f64,
    pub max_vla_rad: f64,

    pub stereo_base_mm: f64,
    pub stereo_alignment: Option<StereoAlignment>,
}

impl MetricsResult {
    pub fn is_visible(&self) -> bool {
        self.launch_window.is_some()
    }

    pub fn dof_is_infinite(&self) -> bool {
        self.far_limit_mm >= INFINITE_DOF_MM
    }

    /// Angular width of the (overlap) FOV as seen from `distance_mm`
    pub fn fov_width_deg(&self, distance_mm: f64) -> f64 {
        full_angle_deg(self.fov_width_mm, distance_mm)
    }

    pub fn fov_height_deg(&self, distance_mm: f64) -> f64 {
        full_angle_deg(self.fov_height_mm, distance_mm)
    }

    /// How far the depth-of-field window is from being centered on `distance_mm`
    pub fn focus_centering_error(&self, distance_mm: f64) -> f64 {
        ((distance_mm - self.near_limit_mm) - (self.far_limit_mm - distance_mm)).abs()
    }
}

fn full_angle_deg(extent_mm: f64, distance_mm: f64) -> f64 {
    (2.0 * (extent_mm / 2.0 / positive_or(distance_mm, 1.0)).atan()).to_degrees()
}

/// Relative photometric score of a rig; only ratios of scores are meaningful
pub fn brightness_score(rig: &RigConfiguration) -> f64 {
    let (_, _, pixel_um) = rig.readout();
    let qe = rig.sensor.qe_at_wavelength(rig.wavelength_nm);
    let distance = positive_or(rig.distance_mm, 1.0);
    let aperture = positive_or(rig.aperture, 1.0);
    qe * pixel_um.powi(2) / (aperture.powi(2) * distance.powi(2))
}

/// `score` as a percentage of `baseline_score`, 0 for a degenerate baseline
pub fn brightness_pct(score: f64, baseline_score: f64) -> f64 {
    if baseline_score > 0.0 {
        score / baseline_score * 100.0
    } else {
        0.0
    }
}

/// Near limit, far limit and depth of field for a focus distance
fn depth_of_field(
    focal_mm: f64,
    aperture: f64,
    coc_mm: f64,
    focus_distance_mm: f64,
) -> (f64, f64, f64) {
    let blur = aperture * coc_mm;
    let hyperfocal = if blur > 0.0 {
        focal_mm.powi(2) / blur
    } else {
        0.001
    };

    let near = hyperfocal * focus_distance_mm / (hyperfocal + focus_distance_mm);
    if hyperfocal > focus_distance_mm {
        let far = hyperfocal * focus_distance_mm / (hyperfocal - focus_distance_mm);
        (near, far, far - near)
    } else {
        (near, INFINITE_DOF_MM, INFINITE_DOF_MM)
    }
}

/// Compute the metrics of `rig`, with brightness normalized against `baseline`.
///
/// Never fails: non-positive distances and focal lengths are replaced by 1mm
/// and "not visible" is reported through [`MetricsResult::launch_window`].
pub fn compute_metrics(
    rig: &RigConfiguration,
    baseline: &RigConfiguration,
    fit: BallFit,
) -> MetricsResult {
    compute_with_baseline_score(rig, brightness_score(baseline), fit)
}

/// Same as [`compute_metrics`] with a precomputed baseline brightness score
pub fn compute_with_baseline_score(
    rig: &RigConfiguration,
    baseline_score: f64,
    fit: BallFit,
) -> MetricsResult {
    let (width_px, _, pixel_um) = rig.readout();
    let pixel_size_mm = pixel_um / 1000.0;
    let (_, sensor_h) = rig.sensor_dimensions_mm();
    let focal = positive_or(rig.focal_mm, 1.0);
    let distance = positive_or(rig.distance_mm, 1.0);

    // Pixel geometry and stereo overlap
    let (raw_fov_w, raw_fov_h) = rig.raw_fov_mm_at(distance);
    let (fov_w, fov_h) = rig.effective_fov_mm();
    let resolution = if raw_fov_w > 0.0 {
        width_px as f64 / raw_fov_w
    } else {
        0.0
    };

    // Placement along the flight line
    let fov_center = rig
        .parallel_center_mm
        .unwrap_or_else(|| rig.fov_anchor_mm() + fov_w / 2.0);
    let fov_top = fov_center + fov_w / 2.0;
    let fov_bottom = fov_center - fov_w / 2.0;

    let total_camera_height = raw_fov_h / 2.0 + rig.camera_offset_mm;

    let focus_distance = positive_or(distance + rig.focus_offset_mm, 1.0);
    let coc_mm = pixel_size_mm * rig.coc_multiplier;
    let (near, far, dof) = depth_of_field(focal, rig.aperture, coc_mm, focus_distance);
    let infinite = far >= INFINITE_DOF_MM;

    let qe = rig.sensor.qe_at_wavelength(rig.wavelength_nm);
    let brightness = brightness_pct(brightness_score(rig), baseline_score);

    let balls_fit = match fit {
        BallFit::Ignore => true,
        BallFit::Enforce => rig.balls.positions().all(|center| {
            center - BALL_RADIUS_MM >= fov_bottom && center + BALL_RADIUS_MM <= fov_top
        }),
    };

    // Horizontal launch angles from the depth-of-field limits
    let flight = rig.balls.flight_distance_mm();
    let safe_near = (distance - near).max(0.0);
    let hla_min = -(safe_near / flight).atan().to_degrees();
    let (safe_far, hla_max) = if infinite {
        (INFINITE_SAFE_FAR_MM, HLA_UNBOUNDED_DEG)
    } else {
        let safe_far = (far - distance).max(0.0);
        (safe_far, (safe_far / flight).atan().to_degrees())
    };

    // Vertical launch angles: frame height differs at the near and far limits
    let vertical_base = match rig.stereo_alignment() {
        Some(StereoAlignment::Vertical) => rig.stereo_base_mm(),
        _ => 0.0,
    };
    let frame_height_at = |d: f64| (sensor_h * d / focal - vertical_base).max(0.0);

    let fov_bottom_z_near = total_camera_height - frame_height_at(near) / 2.0;
    let min_vla_rad = (fov_bottom_z_near / flight).atan();

    let (fov_top_z_far, max_vla_rad) = if far > VLA_FAR_LIMIT_CAP_MM {
        (VLA_UNBOUNDED_TOP_MM, VLA_UNBOUNDED_DEG.to_radians())
    } else {
        let top = total_camera_height + frame_height_at(far) / 2.0;
        (top, ((top - BALL_DIAMETER_MM) / flight).atan())
    };

    let launch_window = balls_fit.then(|| LaunchWindow {
        hla_min_deg: hla_min,
        hla_max_deg: hla_max,
        vla_min_deg: min_vla_rad.to_degrees(),
        vla_max_deg: max_vla_rad.to_degrees(),
    });

    MetricsResult {
        resolution_px_per_mm: resolution,
        pixel_size_mm,
        qe,
        raw_fov_width_mm: raw_fov_w,
        raw_fov_height_mm: raw_fov_h,
        fov_width_mm: fov_w,
        fov_height_mm: fov_h,
        fov_center_mm: fov_center,
        fov_top_mm: fov_top,
        fov_bottom_mm: fov_bottom,
        total_camera_height_mm: total_camera_height,
        focus_distance_mm: focus_distance,
        near_limit_mm: near,
        far_limit_mm: far,
        dof_mm: dof,
        brightness_pct: brightness,
        launch_window,
        flight_distance_mm: flight,
        safe_near_deviation_mm: safe_near,
        safe_far_deviation_mm: safe_far,
        fov_bottom_z_near_mm: fov_bottom_z_near,
        fov_top_z_far_mm: fov_top_z_far,
        min_vla_rad,
        max_vla_rad,
        stereo_base_mm: rig.stereo_base_mm(),
        stereo_alignment: rig.stereo_alignment(),
    }
}
