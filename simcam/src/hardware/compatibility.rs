//! Lens/sensor compatibility filter
//!
//! A lens is usable on a sensor when its image circle covers at least a given
//! percentage of the sensor diagonal. Zoom-derived entries can be excluded
//! independently of coverage.

use super::lens::{LensCatalog, LensSpec};
use super::sensor::SensorSpec;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompatibilityFilter {
    /// Required image-circle coverage of the sensor diagonal, in percent
    pub min_coverage_pct: f64,
    pub include_varifocal: bool,
}

impl Default for CompatibilityFilter {
    fn default() -> Self {
        Self {
            min_coverage_pct: 90.0,
            include_varifocal: true,
        }
    }
}

impl CompatibilityFilter {
    pub fn new(min_coverage_pct: f64, include_varifocal: bool) -> Self {
        Self {
            min_coverage_pct,
            include_varifocal,
        }
    }

    /// Minimum image circle diameter (mm) accepted for `sensor`
    pub fn threshold_mm(&self, sensor: &SensorSpec) -> f64 {
        sensor.diagonal_mm() * (self.min_coverage_pct / 100.0)
    }

    pub fn accepts(&self, lens: &LensSpec, threshold_mm: f64) -> bool {
        lens.image_circle_mm >= threshold_mm && (self.include_varifocal || !lens.is_varifocal)
    }

    /// Catalog entries usable with `sensor`, in catalog order
    pub fn apply<'a>(&self, catalog: &'a LensCatalog, sensor: &SensorSpec) -> Vec<&'a LensSpec> {
        let threshold = self.threshold_mm(sensor);
        catalog
            .iter()
            .filter(|lens| self.accepts(lens, threshold))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::lens::{build_catalog, LensValue, RawLens};
    use crate::hardware::sensor::models;
    use approx::assert_relative_eq;

    fn small_catalog() -> LensCatalog {
        LensCatalog::from_raw(&[
            RawLens {
                model: "Wide",
                focal_mm: LensValue::Fixed(4.0),
                aperture: LensValue::Fixed(2.0),
                image_circle_mm: 7.0,
            },
            RawLens {
                model: "Tiny",
                focal_mm: LensValue::Fixed(2.0),
                aperture: LensValue::Fixed(2.0),
                image_circle_mm: 3.0,
            },
            RawLens {
                model: "Zoom",
                focal_mm: LensValue::Range(4.0, 4.2),
                aperture: LensValue::Fixed(1.6),
                image_circle_mm: 9.0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_threshold_from_diagonal() {
        let sensor = &*models::IMX296;
        // 4.968 x 3.726 mm -> 6.21 mm diagonal
        assert_relative_eq!(sensor.diagonal_mm(), 6.21, epsilon = 1e-9);
        let filter = CompatibilityFilter::new(50.0, true);
        assert_relative_eq!(filter.threshold_mm(sensor), 3.105, epsilon = 1e-9);
    }

    #[test]
    fn test_coverage_filter() {
        let catalog = small_catalog();
        let sensor = &*models::IMX296;

        let full = CompatibilityFilter::new(100.0, true).apply(&catalog, sensor);
        let names: Vec<&str> = full.iter().map(|l| l.model.as_str()).collect();
        assert_eq!(names, vec!["Wide", "Zoom", "Zoom", "Zoom"]);

        let loose = CompatibilityFilter::new(40.0, true).apply(&catalog, sensor);
        assert_eq!(loose.len(), 5);
    }

    #[test]
    fn test_varifocal_flag() {
        let catalog = small_catalog();
        let sensor = &*models::IMX296;
        let fixed_only = CompatibilityFilter::new(100.0, false).apply(&catalog, sensor);
        assert_eq!(fixed_only.len(), 1);
        assert_eq!(fixed_only[0].model, "Wide");
    }

    #[test]
    fn test_filter_does_not_touch_catalog() {
        let catalog = build_catalog().unwrap();
        let before = catalog.len();
        let selected = CompatibilityFilter::default().apply(&catalog, &models::OS08A20);
        assert!(selected.len() < before);
        assert_eq!(catalog.len(), before);
        let threshold = CompatibilityFilter::default().threshold_mm(&models::OS08A20);
        assert!(selected.iter().all(|l| l.image_circle_mm >= threshold));
    }
}
