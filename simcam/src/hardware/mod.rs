//! Hardware catalogs: camera sensors, lenses and the image-circle compatibility filter

pub mod compatibility;
pub mod lens;
pub mod sensor;

pub use compatibility::CompatibilityFilter;
pub use lens::{build_catalog, LensCatalog, LensSpec, LensValue, RawLens, RAW_LENS_TABLE};
pub use sensor::{SensorSpec, ShutterType, SUPPORTED_WAVELENGTHS_NM};

use thiserror::Error;

/// Errors raised while loading sensor or lens tables
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("{model}: {field} must be positive, got {value}")]
    NonPositive {
        model: String,
        field: &'static str,
        value: f64,
    },
    #[error("{model}: range [{min}, {max}] is inverted")]
    InvertedRange { model: String, min: f64, max: f64 },
    #[error("Sensor {0} has zero pixel dimensions")]
    EmptySensor(String),
}

pub(crate) fn ensure_positive(
    model: &str,
    field: &'static str,
    value: f64,
) -> Result<(), CatalogError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(CatalogError::NonPositive {
            model: model.to_string(),
            field,
            value,
        })
    }
}
