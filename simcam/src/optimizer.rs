//! Configuration search over the lens catalog
//!
//! The full search ([`Optimizer::optimize`]) walks every compatible lens and,
//! for each one:
//! 1. solves the camera distance in closed form from the resolution and
//!    brightness targets (capped at [`MAX_DISTANCE_MM`]),
//! 2. re-derives the stereo base and FOV anchor for that distance,
//! 3. centers the depth of field on the flight line with a golden-section
//!    search over the focus offset,
//! 4. drops the camera until the lowest visible launch angle matches the
//!    target,
//!
//! and keeps the candidates that still meet the vertical target. The winner
//! has the deepest depth of field, then the largest distance.
//!
//! The single-axis operations (`*_only`) adjust one parameter of an existing
//! rig with discrete scans and return the new value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algo::golden::{golden_section_search, SearchError};
use crate::algo::misc::{find_nearest, whole_mm};
use crate::hardware::lens::{distinct_apertures, distinct_focals, LensCatalog, LensSpec};
use crate::hardware::CompatibilityFilter;
use crate::metrics::{brightness_score, compute_with_baseline_score, BallFit, MetricsResult};
use crate::rig::{default_parallel_offset, RigConfiguration};

/// Upper bound of any camera distance proposed by the optimizer
pub const MAX_DISTANCE_MM: f64 = 1000.0;
/// Distance reported by the brightness bound when no brightness is required
pub const UNBOUNDED_BRIGHTNESS_DISTANCE_MM: f64 = 10_000.0;
/// Focus offsets searched, relative to the camera distance
pub const FOCUS_OFFSET_RANGE_MM: (f64, f64) = (-400.0, 200.0);
/// Bracket width at which the focus search stops
pub const FOCUS_TOLERANCE_MM: f64 = 1.0;
/// Step of the discrete focus scan
pub const FOCUS_SCAN_STEP_MM: usize = 5;
/// Step of the discrete distance scan
pub const DISTANCE_SCAN_STEP_MM: usize = 10;
/// The distance scan stops at (and excludes) this distance
pub const DISTANCE_SCAN_FLOOR_MM: i64 = 100;
/// Slack allowed on the lowest launch angle of a candidate
pub const VLA_TOLERANCE_DEG: f64 = 0.5;
/// f-number ceiling reported when no brightness is required
pub const UNBOUNDED_APERTURE: f64 = 999.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("No lens configuration meets the resolution, brightness, distance and VLA targets")]
    NoConfigurationFound,
    #[error("No lens in the catalog is compatible with the selected sensor")]
    NoCompatibleLenses,
    #[error("Constraints cannot be met: {0}")]
    ConstraintsUnsatisfiable(String),
    #[error("Focus search failed: {0}")]
    Search(#[from] SearchError),
}

/// What the optimizer is asked to achieve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTargets {
    /// Minimum resolution at the flight line
    pub resolution_px_per_mm: f64,
    /// Minimum brightness, percent of the baseline
    pub brightness_pct: f64,
    /// Minimum safe distance between camera and flight line
    pub min_distance_mm: f64,
    /// Lowest launch angle that has to stay visible
    pub min_vla_deg: f64,
}

impl Default for OptimizationTargets {
    fn default() -> Self {
        Self {
            resolution_px_per_mm: 4.0,
            brightness_pct: 100.0,
            min_distance_mm: 254.0,
            min_vla_deg: 0.0,
        }
    }
}

/// Winning configuration of a full search
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedRig {
    pub lens: LensSpec,
    pub rig: RigConfiguration,
    /// Metrics as evaluated by the search (ball fit not enforced)
    pub metrics: MetricsResult,
}

impl OptimizedRig {
    pub fn dof_mm(&self) -> f64 {
        self.metrics.dof_mm
    }

    pub fn distance_mm(&self) -> f64 {
        self.rig.distance_mm
    }
}

/// Farthest distance at which `focal_mm` still resolves `target_px_per_mm`
pub fn max_distance_for_resolution(focal_mm: f64, pixel_mm: f64, target_px_per_mm: f64) -> f64 {
    let denom = pixel_mm * target_px_per_mm;
    if denom > 0.0 {
        focal_mm / denom
    } else {
        f64::INFINITY
    }
}

/// Farthest distance at which the brightness score still reaches `target_score`
pub fn max_distance_for_brightness(
    qe: f64,
    pixel_um: f64,
    aperture: f64,
    target_score: f64,
) -> f64 {
    if target_score > 0.0 && aperture > 0.0 {
        (qe * pixel_um.powi(2) / (aperture.powi(2) * target_score)).sqrt()
    } else {
        UNBOUNDED_BRIGHTNESS_DISTANCE_MM
    }
}

/// Stateless search context: compatible lenses, targets and the baseline
/// brightness they are measured against.
#[derive(Debug, Clone)]
pub struct Optimizer<'a> {
    lenses: Vec<&'a LensSpec>,
    targets: OptimizationTargets,
    baseline_score: f64,
}

impl<'a> Optimizer<'a> {
    pub fn new(
        lenses: Vec<&'a LensSpec>,
        targets: OptimizationTargets,
        baseline_score: f64,
    ) -> Self {
        Self {
            lenses,
            targets,
            baseline_score,
        }
    }

    /// Search context for the lenses of `catalog` that pass `filter` on the sensor of `rig`
    pub fn from_catalog(
        catalog: &'a LensCatalog,
        filter: &CompatibilityFilter,
        rig: &RigConfiguration,
        targets: OptimizationTargets,
        baseline: &RigConfiguration,
    ) -> Self {
        Self::new(
            filter.apply(catalog, &rig.sensor),
            targets,
            brightness_score(baseline),
        )
    }

    pub fn lenses(&self) -> &[&'a LensSpec] {
        &self.lenses
    }

    pub fn targets(&self) -> &OptimizationTargets {
        &self.targets
    }

    fn target_score(&self) -> f64 {
        self.targets.brightness_pct / 100.0 * self.baseline_score
    }

    fn evaluate(&self, rig: &RigConfiguration) -> MetricsResult {
        compute_with_baseline_score(rig, self.baseline_score, BallFit::Ignore)
    }

    /// Focus offset (whole mm) that best centers the depth of field on the flight line
    fn search_focus_offset(&self, rig: &RigConfiguration) -> Result<f64, SearchError> {
        let mut trial = rig.clone();
        let distance = rig.distance_mm;
        let (lo, hi) = FOCUS_OFFSET_RANGE_MM;
        let best = golden_section_search(
            |offset| {
                trial.focus_offset_mm = offset;
                self.evaluate(&trial).focus_centering_error(distance)
            },
            lo,
            hi,
            FOCUS_TOLERANCE_MM,
        )?;
        Ok(whole_mm(best))
    }

    /// Try `lens` on `current`; `None` when it cannot meet the targets
    fn evaluate_lens(
        &self,
        lens: &LensSpec,
        current: &RigConfiguration,
    ) -> Result<Option<(RigConfiguration, MetricsResult)>, OptimizeError> {
        let (_, _, pixel_um) = current.readout();
        let pixel_mm = pixel_um / 1000.0;
        let qe = current.sensor.qe_at_wavelength(current.wavelength_nm);

        let d_res = max_distance_for_resolution(
            lens.focal_mm,
            pixel_mm,
            self.targets.resolution_px_per_mm,
        );
        let d_bright =
            max_distance_for_brightness(qe, pixel_um, lens.aperture, self.target_score());
        let distance = whole_mm(d_res.min(d_bright).min(MAX_DISTANCE_MM));
        if distance < self.targets.min_distance_mm {
            return Ok(None);
        }

        // Stereo base follows the distance when given as a ratio
        let mut rig = RigConfiguration {
            focal_mm: lens.focal_mm,
            aperture: lens.aperture,
            distance_mm: distance,
            focus_offset_mm: 0.0,
            camera_offset_mm: 0.0,
            parallel_center_mm: None,
            ..current.clone()
        };
        rig.parallel_center_mm = Some(default_parallel_offset(&rig));
        rig.focus_offset_mm = self.search_focus_offset(&rig)?;

        let level = self.evaluate(&rig);
        let Some(window) = level.launch_window else {
            return Ok(None);
        };
        let drop = ((window.vla_min_deg - self.targets.min_vla_deg).to_radians()).tan()
            * level.flight_distance_mm;
        rig.camera_offset_mm = whole_mm(-drop);

        let metrics = self.evaluate(&rig);
        let accepted = metrics
            .launch_window
            .is_some_and(|w| w.vla_min_deg <= self.targets.min_vla_deg + VLA_TOLERANCE_DEG);

        log::debug!(
            "{} {:.1}mm f/{:.1}: distance {} focus {:+} camera {:+} dof {:.1} -> {}",
            lens.model,
            lens.focal_mm,
            lens.aperture,
            distance,
            rig.focus_offset_mm,
            rig.camera_offset_mm,
            metrics.dof_mm,
            if accepted { "ok" } else { "rejected" }
        );

        Ok(accepted.then_some((rig, metrics)))
    }

    /// Full lens, aperture, distance, focus, height and parallel search.
    ///
    /// Fails with [`OptimizeError::NoConfigurationFound`] when no lens meets
    /// every target.
    pub fn optimize(&self, current: &RigConfiguration) -> Result<OptimizedRig, OptimizeError> {
        if self.lenses.is_empty() {
            log::warn!("Optimizer started without compatible lenses");
            return Err(OptimizeError::NoCompatibleLenses);
        }

        let mut candidates = Vec::new();
        for lens in &self.lenses {
            if let Some((rig, metrics)) = self.evaluate_lens(lens, current)? {
                candidates.push(OptimizedRig {
                    lens: (*lens).clone(),
                    rig,
                    metrics,
                });
            }
        }

        // Stable sort: equal keys keep catalog order
        candidates.sort_by(|a, b| {
            b.dof_mm()
                .total_cmp(&a.dof_mm())
                .then(b.distance_mm().total_cmp(&a.distance_mm()))
        });

        let Some(winner) = candidates.into_iter().next() else {
            log::warn!(
                "No configuration out of {} lenses meets the targets {:?}",
                self.lenses.len(),
                self.targets
            );
            return Err(OptimizeError::NoConfigurationFound);
        };

        log::info!(
            "Best configuration: {} {:.1}mm f/{:.1} at {}mm, dof {:.1}mm",
            winner.lens.model,
            winner.lens.focal_mm,
            winner.lens.aperture,
            winner.rig.distance_mm,
            winner.metrics.dof_mm
        );
        Ok(winner)
    }

    /// Compatible focal length closest to the one that gives the target resolution
    pub fn optimize_lens_only(&self, current: &RigConfiguration) -> Result<f64, OptimizeError> {
        let (_, _, pixel_um) = current.readout();
        let ideal = current.distance_mm * (pixel_um / 1000.0) * self.targets.resolution_px_per_mm;
        find_nearest(&distinct_focals(&self.lenses), ideal).ok_or(OptimizeError::NoCompatibleLenses)
    }

    /// Widest-numbered compatible f-stop that still reaches the brightness
    /// target, or the brightest one available when none does.
    pub fn optimize_aperture_only(&self, current: &RigConfiguration) -> Result<f64, OptimizeError> {
        let apertures = distinct_apertures(&self.lenses);
        let (_, _, pixel_um) = current.readout();
        let qe = current.sensor.qe_at_wavelength(current.wavelength_nm);
        let target_score = self.target_score();
        let distance = current.distance_mm;

        let max_f = if target_score > 0.0 && distance > 0.0 {
            (qe * pixel_um.powi(2) / (target_score * distance.powi(2))).sqrt()
        } else {
            UNBOUNDED_APERTURE
        };

        apertures
            .iter()
            .copied()
            .filter(|&a| a <= max_f)
            .last()
            .or_else(|| apertures.first().copied())
            .ok_or(OptimizeError::NoCompatibleLenses)
    }

    /// Largest distance that keeps both resolution and brightness targets,
    /// scanning down from the resolution limit.
    pub fn optimize_distance_only(&self, current: &RigConfiguration) -> Result<f64, OptimizeError> {
        let (_, _, pixel_um) = current.readout();
        let d_res = whole_mm(max_distance_for_resolution(
            current.focal_mm,
            pixel_um / 1000.0,
            self.targets.resolution_px_per_mm,
        ));
        let start = d_res.min(MAX_DISTANCE_MM) as i64;

        let found = (DISTANCE_SCAN_FLOOR_MM + 1..=start)
            .rev()
            .step_by(DISTANCE_SCAN_STEP_MM)
            .map(|d| d as f64)
            .find(|&d| {
                let trial = RigConfiguration {
                    distance_mm: d,
                    camera_offset_mm: 0.0,
                    ..current.clone()
                };
                self.evaluate(&trial).brightness_pct >= self.targets.brightness_pct
            });

        match found {
            Some(d) if d >= self.targets.min_distance_mm => Ok(d),
            Some(d) => {
                log::warn!("Distance scan ended at {}mm, below the safety minimum", d);
                Err(OptimizeError::ConstraintsUnsatisfiable(format!(
                    "best distance {}mm is below the minimum of {}mm",
                    d, self.targets.min_distance_mm
                )))
            }
            None => {
                log::warn!("Distance scan found no distance above {}mm", DISTANCE_SCAN_FLOOR_MM);
                Err(OptimizeError::ConstraintsUnsatisfiable(
                    "resolution and brightness cannot both be met".to_string(),
                ))
            }
        }
    }

    /// Focus offset with the best-centered depth of field, in steps of
    /// [`FOCUS_SCAN_STEP_MM`]
    pub fn optimize_focus_only(&self, current: &RigConfiguration) -> f64 {
        let (lo, hi) = FOCUS_OFFSET_RANGE_MM;
        let mut trial = current.clone();
        let mut best = (0.0, 9999.0);
        for offset in (lo as i64..hi as i64).step_by(FOCUS_SCAN_STEP_MM) {
            trial.focus_offset_mm = offset as f64;
            let error = self.evaluate(&trial).focus_centering_error(current.distance_mm);
            if error < best.1 {
                best = (offset as f64, error);
            }
        }
        best.0
    }

    /// Camera offset that puts the lowest visible launch angle on the target
    pub fn optimize_camera_height_only(&self, current: &RigConfiguration) -> f64 {
        whole_mm(self.targets.min_vla_deg.to_radians().tan() * current.balls.flight_distance_mm())
    }

    /// FOV center that anchors the frame on the club or the first ball
    pub fn optimize_parallel_only(&self, current: &RigConfiguration) -> f64 {
        default_parallel_offset(current)
    }
}
