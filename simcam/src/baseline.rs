//! Baseline rig used as the comparison reference
//!
//! The baseline normalizes brightness and every "change vs baseline" figure.
//! It is written only by explicit user actions (set current as baseline,
//! reset) and read by every metrics computation, so it lives in a single
//! [`BaselineCell`] rather than in global state.

use std::sync::{PoisonError, RwLock};
use thiserror::Error;

use crate::hardware::sensor::models;
use crate::metrics::brightness_score;
use crate::rig::{BallSchedule, RigConfiguration, FIRST_BALL_MARGIN_MM};

/// Camera height above the tee in the default baseline
pub const DEFAULT_CAMERA_HEIGHT_MM: f64 = 90.0;
/// FOV center along the flight line in the default baseline
pub const DEFAULT_PARALLEL_CENTER_MM: f64 = 530.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BaselineError {
    #[error("Baseline changed concurrently: expected revision {expected}, found {actual}")]
    StaleRevision { expected: u64, actual: u64 },
}

/// The reference hardware: IMX296 behind a 6mm f/1.2 lens at 430mm, camera
/// 90mm above the tee, FOV centered 530mm down the flight line.
pub fn default_baseline() -> RigConfiguration {
    let mut rig = RigConfiguration {
        sensor: models::IMX296.clone(),
        binning: false,
        wavelength_nm: 810,
        focal_mm: 6.0,
        aperture: 1.2,
        distance_mm: 430.0,
        focus_offset_mm: 0.0,
        coc_multiplier: 2.0,
        camera_offset_mm: 0.0,
        parallel_center_mm: Some(DEFAULT_PARALLEL_CENTER_MM),
        balls: BallSchedule::default(),
        include_club: false,
        stereo: None,
    };

    let (fov_w, fov_h) = rig.raw_fov_mm_at(rig.distance_mm);
    rig.camera_offset_mm = DEFAULT_CAMERA_HEIGHT_MM - fov_h / 2.0;
    rig.balls.first_position_mm = DEFAULT_PARALLEL_CENTER_MM - fov_w / 2.0 + FIRST_BALL_MARGIN_MM;
    rig
}

#[derive(Debug)]
struct Versioned {
    rig: RigConfiguration,
    revision: u64,
}

/// Single-writer, multi-reader holder of the baseline rig
#[derive(Debug)]
pub struct BaselineCell {
    inner: RwLock<Versioned>,
}

impl Default for BaselineCell {
    fn default() -> Self {
        Self::new(default_baseline())
    }
}

impl BaselineCell {
    pub fn new(rig: RigConfiguration) -> Self {
        Self {
            inner: RwLock::new(Versioned { rig, revision: 0 }),
        }
    }

    /// Snapshot of the current baseline
    pub fn get(&self) -> RigConfiguration {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .rig
            .clone()
    }

    pub fn revision(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }

    pub fn brightness_score(&self) -> f64 {
        brightness_score(&self.inner.read().unwrap_or_else(PoisonError::into_inner).rig)
    }

    /// Replace the baseline unconditionally, returning the new revision
    pub fn set(&self, rig: RigConfiguration) -> u64 {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.rig = rig;
        guard.revision += 1;
        guard.revision
    }

    /// Replace the baseline only if nobody changed it since `expected` was read
    pub fn compare_and_set(
        &self,
        expected: u64,
        rig: RigConfiguration,
    ) -> Result<u64, BaselineError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.revision != expected {
            return Err(BaselineError::StaleRevision {
                expected,
                actual: guard.revision,
            });
        }
        guard.rig = rig;
        guard.revision += 1;
        Ok(guard.revision)
    }

    /// Restore the hardcoded default baseline
    pub fn reset(&self) -> u64 {
        self.set(default_baseline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{compute_metrics, BallFit};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_baseline_geometry() {
        let rig = default_baseline();
        let m = compute_metrics(&rig, &rig, BallFit::Enforce);
        assert_relative_eq!(m.total_camera_height_mm, 90.0, epsilon = 1e-9);
        assert_eq!(m.fov_center_mm, 530.0);
        assert_relative_eq!(
            m.fov_bottom_mm + FIRST_BALL_MARGIN_MM,
            rig.balls.first_position_mm,
            epsilon = 1e-9
        );
        assert_eq!(m.brightness_pct, 100.0);
        assert!(m.is_visible());
    }

    #[test]
    fn test_set_and_reset() {
        let cell = BaselineCell::default();
        assert_eq!(cell.revision(), 0);

        let mut other = default_baseline();
        other.distance_mm = 600.0;
        assert_eq!(cell.set(other.clone()), 1);
        assert_eq!(cell.get(), other);

        assert_eq!(cell.reset(), 2);
        assert_eq!(cell.get(), default_baseline());
    }

    #[test]
    fn test_compare_and_set() {
        let cell = BaselineCell::default();
        let seen = cell.revision();

        let mut first = default_baseline();
        first.aperture = 2.0;
        assert_eq!(cell.compare_and_set(seen, first.clone()), Ok(1));

        let mut second = default_baseline();
        second.aperture = 4.0;
        assert_eq!(
            cell.compare_and_set(seen, second),
            Err(BaselineError::StaleRevision {
                expected: 0,
                actual: 1
            })
        );
        assert_eq!(cell.get(), first);
    }

    #[test]
    fn test_brightness_score_tracks_baseline() {
        let cell = BaselineCell::default();
        let before = cell.brightness_score();
        let mut farther = default_baseline();
        farther.distance_mm *= 2.0;
        cell.set(farther);
        assert_relative_eq!(cell.brightness_score(), before / 4.0, epsilon = 1e-15);
    }
}
