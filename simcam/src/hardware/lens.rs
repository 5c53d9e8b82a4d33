//! Lens catalog
//!
//! The raw table lists each lens model once, with focal length and f-number
//! given either as a single value or as an adjustable `[min, max]` range.
//! [`build_catalog`] expands every range in 0.1 steps (both endpoints
//! included) into one [`LensSpec`] per focal/aperture combination, giving the
//! flat list the optimizer searches.

use serde::{Deserialize, Serialize};

use super::{ensure_positive, CatalogError};

/// Granularity of expanded focal and aperture ranges
pub const RANGE_STEP: f64 = 0.1;

/// A raw table value: fixed, or continuously adjustable between two bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LensValue {
    Fixed(f64),
    Range(f64, f64),
}

impl LensValue {
    pub fn is_range(&self) -> bool {
        matches!(self, LensValue::Range(..))
    }

    /// Discrete values covered by this entry, rounded to one decimal
    fn expand(&self, model: &str, field: &'static str) -> Result<Vec<f64>, CatalogError> {
        match *self {
            LensValue::Fixed(value) => {
                ensure_positive(model, field, value)?;
                Ok(vec![value])
            }
            LensValue::Range(min, max) => {
                ensure_positive(model, field, min)?;
                if max < min {
                    return Err(CatalogError::InvertedRange {
                        model: model.to_string(),
                        min,
                        max,
                    });
                }
                let steps = ((max - min + 0.001) / RANGE_STEP).floor() as usize;
                Ok((0..=steps)
                    .map(|i| round_tenth(min + i as f64 * RANGE_STEP))
                    .collect())
            }
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One row of the manufacturer table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLens {
    pub model: &'static str,
    pub focal_mm: LensValue,
    pub aperture: LensValue,
    pub image_circle_mm: f64,
}

const fn raw(
    model: &'static str,
    focal_mm: LensValue,
    aperture: LensValue,
    image_circle_mm: f64,
) -> RawLens {
    RawLens {
        model,
        focal_mm,
        aperture,
        image_circle_mm,
    }
}

/// A concrete, searchable lens configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensSpec {
    pub model: String,
    /// Focal length in millimeters
    pub focal_mm: f64,
    /// f-number
    pub aperture: f64,
    /// Image circle diameter in millimeters
    pub image_circle_mm: f64,
    /// Derived from a zoom (focal range) entry
    pub is_varifocal: bool,
}

impl LensSpec {
    pub fn new(
        model: impl Into<String>,
        focal_mm: f64,
        aperture: f64,
        image_circle_mm: f64,
        is_varifocal: bool,
    ) -> Result<Self, CatalogError> {
        let model = model.into();
        ensure_positive(&model, "focal_mm", focal_mm)?;
        ensure_positive(&model, "aperture", aperture)?;
        ensure_positive(&model, "image_circle_mm", image_circle_mm)?;
        Ok(Self {
            model,
            focal_mm,
            aperture,
            image_circle_mm,
            is_varifocal,
        })
    }

    /// True when focal length and f-number both sit within `tolerance`
    pub fn matches(&self, focal_mm: f64, aperture: f64, tolerance: f64) -> bool {
        (self.focal_mm - focal_mm).abs() <= tolerance
            && (self.aperture - aperture).abs() <= tolerance
    }
}

impl RawLens {
    /// Every focal/aperture combination this entry offers
    pub fn expand(&self) -> Result<Vec<LensSpec>, CatalogError> {
        ensure_positive(self.model, "image_circle_mm", self.image_circle_mm)?;
        let focals = self.focal_mm.expand(self.model, "focal_mm")?;
        let apertures = self.aperture.expand(self.model, "aperture")?;
        let is_varifocal = self.focal_mm.is_range();

        let mut lenses = Vec::with_capacity(focals.len() * apertures.len());
        for &focal in &focals {
            for &aperture in &apertures {
                lenses.push(LensSpec::new(
                    self.model,
                    focal,
                    aperture,
                    self.image_circle_mm,
                    is_varifocal,
                )?);
            }
        }
        Ok(lenses)
    }
}

/// Flat, immutable lens universe
#[derive(Debug, Clone, PartialEq)]
pub struct LensCatalog {
    lenses: Vec<LensSpec>,
}

impl LensCatalog {
    /// Expand raw table rows into a catalog, rejecting any invalid row
    pub fn from_raw(table: &[RawLens]) -> Result<Self, CatalogError> {
        let mut lenses = Vec::new();
        for entry in table {
            lenses.extend(entry.expand()?);
        }
        Ok(Self { lenses })
    }

    pub fn lenses(&self) -> &[LensSpec] {
        &self.lenses
    }

    pub fn iter(&self) -> impl Iterator<Item = &LensSpec> {
        self.lenses.iter()
    }

    pub fn len(&self) -> usize {
        self.lenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lenses.is_empty()
    }

    /// Smallest and largest focal length across the catalog (manual control range)
    pub fn focal_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.lenses.iter().map(|l| l.focal_mm))
    }

    /// Smallest and largest f-number across the catalog
    pub fn aperture_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.lenses.iter().map(|l| l.aperture))
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Tolerance of the "is there a real lens with these settings" lookup
pub const LENS_MATCH_TOLERANCE: f64 = 0.05;

/// First lens whose focal length and f-number match the manual settings
pub fn find_match<'a>(
    lenses: &[&'a LensSpec],
    focal_mm: f64,
    aperture: f64,
) -> Option<&'a LensSpec> {
    lenses
        .iter()
        .copied()
        .find(|l| l.matches(focal_mm, aperture, LENS_MATCH_TOLERANCE))
}

/// Sorted, de-duplicated focal lengths offered by a lens selection
pub fn distinct_focals(lenses: &[&LensSpec]) -> Vec<f64> {
    distinct(lenses.iter().map(|l| l.focal_mm))
}

/// Sorted, de-duplicated f-numbers offered by a lens selection
pub fn distinct_apertures(lenses: &[&LensSpec]) -> Vec<f64> {
    distinct(lenses.iter().map(|l| l.aperture))
}

fn distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

/// Expand the built-in lens table. Call once at startup and share the result.
pub fn build_catalog() -> Result<LensCatalog, CatalogError> {
    let catalog = LensCatalog::from_raw(RAW_LENS_TABLE)?;
    log::info!(
        "Lens catalog expanded: {} models -> {} configurations",
        RAW_LENS_TABLE.len(),
        catalog.len()
    );
    Ok(catalog)
}

use LensValue::{Fixed, Range};

/// Manufacturer lens table
pub static RAW_LENS_TABLE: &[RawLens] = &[
    raw("Varifocal 2.8-12mm", Range(2.8, 12.0), Range(1.6, 16.0), 9.0),
    raw("Arducam LN081", Fixed(4.5), Fixed(2.0), 9.0),
    raw("Arducam LN079", Fixed(5.5), Fixed(2.8), 9.0),
    raw("Arducam LN078", Fixed(8.5), Fixed(3.0), 9.0),
    raw("Arducam LN077", Fixed(12.0), Fixed(2.8), 9.0),
    raw("Arducam LN076", Fixed(16.0), Fixed(2.8), 9.0),
    raw("Arducam LN075", Fixed(25.0), Fixed(2.8), 9.0),
    raw("Arducam M25156H18", Fixed(1.56), Fixed(2.0), 7.7),
    raw("Arducam M27210H08", Fixed(2.1), Fixed(2.0), 6.6),
    raw("Arducam M23272M14", Fixed(2.27), Fixed(2.5), 7.7),
    raw("Arducam M27280M07S", Fixed(2.8), Fixed(2.8), 6.6),
    raw("Arducam M23356H09", Fixed(3.56), Fixed(2.5), 7.7),
    raw("Arducam M25360H06S", Fixed(3.6), Fixed(3.0), 7.1),
    raw("Arducam M2306ZM13", Fixed(6.0), Fixed(2.0), 7.7),
    raw("Arducam M2506ZH04", Fixed(6.0), Fixed(2.0), 7.1),
    raw("Arducam M2508ZH02", Fixed(8.0), Fixed(2.0), 7.1),
    raw("Arducam M2512ZH03", Fixed(12.0), Fixed(2.0), 7.1),
    raw("Arducam M2516ZH01", Fixed(16.0), Fixed(2.0), 7.1),
    raw("Arducam M2025ZM02", Fixed(25.0), Fixed(2.0), 7.7),
    raw("Arducam CS 6mm F1.2", Fixed(6.0), Range(1.2, 16.0), 8.0),
    raw("Arducam CS 6mm", Fixed(6.0), Fixed(1.4), 7.7),
    raw("Arducam CS 8mm", Fixed(8.0), Fixed(1.4), 7.7),
    raw("Arducam CS 12mm", Fixed(12.0), Fixed(1.6), 7.7),
    raw("Arducam CS 16mm", Fixed(16.0), Fixed(1.6), 7.7),
    raw("Arducam CS 25mm", Fixed(25.0), Fixed(1.2), 7.7),
    raw("Arducam C 16mm", Fixed(16.0), Range(1.6, 16.0), 11.0),
    raw("Arducam C 25mm", Fixed(25.0), Range(1.4, 16.0), 16.0),
    raw("Arducam C 35mm", Fixed(35.0), Range(1.6, 16.0), 11.0),
    raw("Arducam C 50mm", Fixed(50.0), Range(1.8, 16.0), 11.0),
    raw("CIL207", Fixed(0.8), Fixed(1.9), 4.0),
    raw("CIL208", Fixed(0.9), Fixed(2.2), 2.9),
    raw("CIL212", Fixed(1.1), Fixed(2.2), 3.9),
    raw("CIL273", Fixed(1.3), Fixed(2.0), 5.8),
    raw("CIL293", Fixed(1.3), Fixed(2.2), 5.4),
    raw("CIL914", Fixed(1.4), Fixed(2.3), 4.5),
    raw("CIL215", Fixed(1.5), Fixed(2.0), 4.2),
    raw("CIL216", Fixed(1.55), Fixed(2.2), 4.7),
    raw("CIL217", Fixed(1.7), Fixed(2.7), 5.7),
    raw("CIL237", Fixed(1.7), Fixed(2.2), 5.5),
    raw("CIL018", Fixed(1.8), Fixed(2.8), 7.0),
    raw("CIL019", Fixed(1.8), Fixed(1.6), 6.6),
    raw("CIL239", Fixed(1.8), Fixed(2.0), 5.2),
    raw("CIL818", Fixed(1.8), Fixed(2.0), 5.2),
    raw("CIL220-F2.3", Fixed(1.83), Fixed(2.3), 6.8),
    raw("CIL220-F2.8", Fixed(1.83), Fixed(2.8), 6.8),
    raw("CIL219", Fixed(1.9), Fixed(2.5), 6.3),
    raw("CIL290", Fixed(1.9), Fixed(2.2), 5.7),
    raw("CIL819", Fixed(1.9), Fixed(2.0), 5.9),
    raw("CIL281", Fixed(2.0), Fixed(1.8), 6.5),
    raw("CIL821", Fixed(2.1), Fixed(2.4), 6.8),
    raw("CIL023", Fixed(2.2), Fixed(2.2), 7.8),
    raw("CIL222", Fixed(2.2), Fixed(2.0), 6.6),
    raw("CIL282", Fixed(2.2), Fixed(1.8), 6.8),
    raw("CIL292", Fixed(2.3), Fixed(2.1), 7.2),
    raw("CIL324", Fixed(2.4), Fixed(1.9), 7.0),
    raw("CIL825", Fixed(2.5), Fixed(2.0), 6.8),
    raw("CIL926", Fixed(2.5), Fixed(2.5), 7.4),
    raw("CIL028-F2.3", Fixed(2.6), Fixed(2.3), 8.0),
    raw("CIL028-F2.6", Fixed(2.6), Fixed(2.6), 8.0),
    raw("CIL027", Fixed(2.7), Fixed(2.8), 8.2),
    raw("CIL227", Fixed(2.7), Fixed(2.5), 8.2),
    raw("CIL327-F1.5", Fixed(2.7), Fixed(1.5), 7.1),
    raw("CIL327-F1.8", Fixed(2.7), Fixed(1.8), 7.1),
    raw("CIL093", Fixed(2.8), Fixed(2.4), 7.8),
    raw("CIL329", Fixed(2.8), Fixed(2.0), 7.2),
    raw("CIL326", Fixed(2.9), Fixed(1.4), 6.8),
    raw("CIL829", Fixed(2.9), Fixed(2.5), 6.8),
    raw("CIL330", Fixed(2.94), Fixed(2.6), 8.0),
    raw("CIL391", Fixed(2.94), Fixed(2.6), 8.0),
    raw("CIL030", Fixed(3.0), Fixed(2.1), 9.4),
    raw("CIL232", Fixed(3.1), Fixed(1.9), 9.1),
    raw("CIL332", Fixed(3.2), Fixed(1.8), 7.2),
    raw("CIL034-F2.3", Fixed(3.24), Fixed(2.3), 8.2),
    raw("CIL034-F2.7", Fixed(3.24), Fixed(2.7), 8.2),
    raw("CIL034-F4.2", Fixed(3.24), Fixed(4.2), 8.2),
    raw("CIL036", Fixed(3.3), Fixed(2.2), 7.2),
    raw("CIL394", Fixed(3.45), Fixed(2.1), 7.6),
    raw("CIL333", Fixed(3.5), Fixed(2.4), 8.8),
    raw("CIL334", Fixed(3.5), Fixed(2.2), 9.4),
    raw("CIL335", Fixed(3.5), Fixed(1.8), 7.8),
    raw("CIL336", Fixed(3.6), Fixed(1.9), 7.4),
    raw("CIL337", Fixed(3.6), Fixed(1.6), 7.5),
    raw("CIL038", Fixed(3.8), Fixed(3.0), 7.8),
    raw("CIL039", Fixed(3.9), Fixed(2.8), 8.0),
    raw("CIL339", Fixed(3.9), Fixed(1.6), 9.3),
    raw("CIL340", Fixed(4.0), Fixed(2.0), 9.0),
    raw("CIL341", Fixed(4.0), Fixed(2.0), 9.4),
    raw("CIL042", Fixed(4.2), Fixed(1.9), 9.4),
    raw("CIL043", Fixed(4.3), Fixed(3.2), 8.1),
    raw("CIL046", Fixed(4.4), Fixed(2.0), 9.1),
    raw("CIL343", Fixed(4.4), Fixed(2.3), 8.8),
    raw("CIL045", Fixed(4.5), Fixed(3.5), 7.2),
    raw("CIL344-F1.9", Fixed(4.5), Fixed(1.9), 11.0),
    raw("CIL344-F2.7", Fixed(4.5), Fixed(2.7), 11.0),
    raw("CIL948", Fixed(4.8), Fixed(2.0), 7.6),
    raw("CIL052", Fixed(5.2), Fixed(3.4), 9.3),
    raw("CIL355", Fixed(5.5), Fixed(1.8), 7.0),
    raw("CIL056", Fixed(5.5), Fixed(2.4), 8.0),
    raw("CIL857", Fixed(5.7), Fixed(3.0), 7.0),
    raw("CIL359", Fixed(5.78), Fixed(1.6), 7.5),
    raw("CIL358", Fixed(5.8), Fixed(1.9), 9.3),
    raw("CIL059-F1.7", Fixed(5.9), Fixed(1.7), 9.3),
    raw("CIL059-F4.0", Fixed(5.9), Fixed(4.0), 9.3),
    raw("CIL059-F5.6", Fixed(5.9), Fixed(5.6), 9.3),
    raw("CIL061", Fixed(6.0), Fixed(1.9), 7.4),
    raw("CIL361", Fixed(6.1), Fixed(1.8), 7.4),
    raw("CIL062-F2.8", Fixed(6.2), Fixed(2.8), 9.0),
    raw("CIL062-F4.0", Fixed(6.2), Fixed(4.0), 9.0),
    raw("CIL068", Fixed(6.8), Fixed(2.5), 8.8),
    raw("CIL368", Fixed(6.8), Fixed(1.8), 9.4),
    raw("CIL872", Fixed(7.2), Fixed(2.5), 8.5),
    raw("CIL078", Fixed(7.8), Fixed(2.0), 9.3),
    raw("CIL382-F2.0", Fixed(7.8), Fixed(2.0), 7.4),
    raw("CIL382-F5.6", Fixed(7.8), Fixed(5.6), 7.4),
    raw("CIL079", Fixed(7.9), Fixed(2.0), 7.6),
    raw("CIL083", Fixed(8.0), Fixed(2.8), 9.0),
    raw("CIL085-F3.0", Fixed(8.2), Fixed(3.0), 8.8),
    raw("CIL085-F4.4", Fixed(8.2), Fixed(4.4), 8.8),
    raw("CIL092", Fixed(9.2), Fixed(2.6), 9.3),
    raw("CIL104", Fixed(10.4), Fixed(3.8), 7.2),
    raw("CIL122", Fixed(12.0), Fixed(2.0), 9.3),
    raw("CIL120", Fixed(12.2), Fixed(2.4), 8.0),
    raw("CIL123", Fixed(12.5), Fixed(2.3), 8.0),
    raw("CIL125-F2.4", Fixed(12.5), Fixed(2.4), 8.2),
    raw("CIL125-F3.6", Fixed(12.5), Fixed(3.6), 8.2),
    raw("CIL125-F8.0", Fixed(12.5), Fixed(8.0), 8.2),
    raw("CIL142-F2.6", Fixed(14.4), Fixed(2.6), 9.3),
    raw("CIL142-F4.1", Fixed(14.4), Fixed(4.1), 9.3),
    raw("CIL142-F5.2", Fixed(14.4), Fixed(5.2), 9.3),
    raw("CIL160-F1.9", Fixed(16.0), Fixed(1.9), 8.4),
    raw("CIL160-F2.8", Fixed(16.0), Fixed(2.8), 8.4),
    raw("CIL160-F4.0", Fixed(16.0), Fixed(4.0), 8.4),
    raw("CIL160-F5.6", Fixed(16.0), Fixed(5.6), 8.4),
    raw("CIL161", Fixed(16.0), Fixed(2.0), 8.0),
    raw("CIL178", Fixed(17.8), Fixed(2.0), 7.2),
    raw("CIL190", Fixed(19.0), Fixed(1.6), 7.2),
    raw("CIL121-F2.8", Fixed(21.8), Fixed(2.8), 9.3),
    raw("CIL121-F5.9", Fixed(21.8), Fixed(5.9), 9.3),
    raw("CIL250", Fixed(25.0), Fixed(2.4), 9.4),
    raw("CIL350", Fixed(35.0), Fixed(2.4), 11.0),
    raw("CIL051", Fixed(50.0), Fixed(2.8), 9.4),
    raw("CIL075", Fixed(75.0), Fixed(3.5), 9.4),
    raw("CIL570 (C-Mt)", Fixed(4.0), Range(2.0, 16.0), 9.3),
    raw("CIL571 (C-Mt)", Fixed(6.0), Range(2.1, 16.0), 9.3),
    raw("CIL508 (C-Mt)", Fixed(8.5), Range(2.4, 16.0), 17.6),
    raw("CIL521 (C-Mt)", Fixed(8.0), Range(1.5, 16.0), 11.0),
    raw("CIL531 (C-Mt)", Fixed(8.0), Range(2.8, 16.0), 11.0),
    raw("CIL512 (C-Mt)", Fixed(12.0), Range(2.8, 16.0), 17.6),
    raw("CIL522 (C-Mt)", Fixed(12.0), Range(1.4, 16.0), 11.0),
    raw("CIL532 (C-Mt)", Fixed(12.0), Range(2.0, 16.0), 11.0),
    raw("CIL542 (C-Mt)", Fixed(12.0), Range(2.8, 16.0), 17.6),
    raw("CIL552 (C-Mt)", Fixed(12.0), Range(2.8, 16.0), 19.3),
    raw("CIL513 (C-Mt)", Fixed(16.0), Range(2.8, 16.0), 17.6),
    raw("CIL523 (C-Mt)", Fixed(16.0), Range(1.4, 16.0), 11.0),
    raw("CIL533 (C-Mt)", Fixed(16.0), Range(2.0, 16.0), 11.0),
    raw("CIL553 (C-Mt)", Fixed(16.0), Range(2.8, 16.0), 19.3),
    raw("CIL514 (C-Mt)", Fixed(25.0), Range(2.8, 16.0), 17.6),
    raw("CIL525 (C-Mt)", Fixed(25.0), Range(1.4, 16.0), 11.0),
    raw("CIL534 (C-Mt)", Fixed(25.0), Range(2.0, 16.0), 11.0),
    raw("CIL544 (C-Mt)", Fixed(25.0), Range(1.8, 16.0), 17.6),
    raw("CIL554 (C-Mt)", Fixed(25.0), Range(2.6, 16.0), 19.3),
    raw("CIL515 (C-Mt)", Fixed(35.0), Range(2.8, 16.0), 17.6),
    raw("CIL526 (C-Mt)", Fixed(35.0), Range(1.5, 16.0), 11.0),
    raw("CIL535 (C-Mt)", Fixed(35.0), Range(2.0, 16.0), 11.0),
    raw("CIL545 (C-Mt)", Fixed(35.0), Range(2.8, 16.0), 17.6),
    raw("CIL555 (C-Mt)", Fixed(35.0), Range(2.6, 16.0), 19.3),
    raw("CIL536 (C-Mt)", Fixed(50.0), Range(2.8, 16.0), 11.0),
    raw("CIL546 (C-Mt)", Fixed(50.0), Range(2.8, 16.0), 17.6),
    raw("CIL556 (C-Mt)", Fixed(50.0), Range(2.8, 16.0), 19.3),
    raw("CIL557 (C-Mt)", Fixed(75.0), Range(3.0, 16.0), 19.3),
    raw("CIL579 (C-Mt)", Fixed(75.0), Range(3.0, 16.0), 9.0),
    raw("CIL505 (C-Mt)", Fixed(2.2), Range(2.2, 16.0), 14.2),
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_entry_expands_to_one_lens() {
        let lenses = raw("Fixed", Fixed(6.0), Fixed(2.0), 7.7).expand().unwrap();
        assert_eq!(lenses.len(), 1);
        assert_eq!(lenses[0].focal_mm, 6.0);
        assert!(!lenses[0].is_varifocal);
    }

    #[test]
    fn test_range_expansion_includes_both_endpoints() {
        let lenses = raw("Zoom", Range(2.8, 3.2), Fixed(1.6), 9.0).expand().unwrap();
        let focals: Vec<f64> = lenses.iter().map(|l| l.focal_mm).collect();
        assert_eq!(focals, vec![2.8, 2.9, 3.0, 3.1, 3.2]);
        assert!(lenses.iter().all(|l| l.is_varifocal));
    }

    #[test]
    fn test_aperture_range_is_not_varifocal() {
        let lenses = raw("Iris", Fixed(16.0), Range(1.6, 16.0), 11.0).expand().unwrap();
        assert_eq!(lenses.len(), 145);
        assert_eq!(lenses.first().unwrap().aperture, 1.6);
        assert_eq!(lenses.last().unwrap().aperture, 16.0);
        assert!(lenses.iter().all(|l| !l.is_varifocal));
    }

    #[test]
    fn test_expansion_produces_cartesian_product() {
        let lenses = raw("Varifocal 2.8-12mm", Range(2.8, 12.0), Range(1.6, 16.0), 9.0)
            .expand()
            .unwrap();
        assert_eq!(lenses.len(), 93 * 145);
        // No accumulated float drift in the stepped values
        assert!(lenses.iter().any(|l| l.focal_mm == 8.1 && l.aperture == 4.7));
    }

    #[test]
    fn test_invalid_entries_rejected() {
        assert!(matches!(
            raw("Bad", Fixed(0.0), Fixed(2.0), 7.0).expand(),
            Err(CatalogError::NonPositive { field: "focal_mm", .. })
        ));
        assert!(matches!(
            raw("Bad", Fixed(6.0), Range(4.0, 2.0), 7.0).expand(),
            Err(CatalogError::InvertedRange { .. })
        ));
        assert!(matches!(
            raw("Bad", Fixed(6.0), Fixed(2.0), -1.0).expand(),
            Err(CatalogError::NonPositive { field: "image_circle_mm", .. })
        ));
        assert!(LensSpec::new("Bad", 6.0, 0.0, 7.0, false).is_err());
    }

    #[test]
    fn test_build_catalog_is_deterministic() {
        let a = build_catalog().unwrap();
        let b = build_catalog().unwrap();
        assert_eq!(a, b);
        assert!(a.len() > 1000);
        assert!(a
            .iter()
            .all(|l| l.focal_mm > 0.0 && l.aperture > 0.0 && l.image_circle_mm > 0.0));
    }

    #[test]
    fn test_catalog_bounds() {
        let catalog = build_catalog().unwrap();
        let (min_f, max_f) = catalog.focal_bounds().unwrap();
        assert_relative_eq!(min_f, 0.8);
        assert_relative_eq!(max_f, 75.0);
        let (min_a, max_a) = catalog.aperture_bounds().unwrap();
        assert_relative_eq!(min_a, 1.2);
        assert_relative_eq!(max_a, 16.0);
        assert!(LensCatalog::from_raw(&[]).unwrap().focal_bounds().is_none());
    }

    #[test]
    fn test_find_match_and_distinct() {
        let catalog = build_catalog().unwrap();
        let all: Vec<&LensSpec> = catalog.iter().collect();

        let found = find_match(&all, 6.04, 1.96).unwrap();
        assert_eq!(found.focal_mm, 6.0);
        assert_eq!(found.aperture, 2.0);
        assert!(find_match(&all, 200.0, 2.0).is_none());

        let focals = distinct_focals(&all);
        assert!(focals.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(focals.first().copied(), Some(0.8));
        let apertures = distinct_apertures(&all);
        assert_eq!(apertures.first().copied(), Some(1.2));
    }
}
