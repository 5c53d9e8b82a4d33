//! Sensor specifications for the tracking camera
//!
//! A [`SensorSpec`] is an immutable catalog entry. Rotation and 2x2 binning
//! are modelled as transformations that return a derived `SensorSpec`, never as
//! in-place mutation.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ensure_positive, CatalogError};

/// Quantum Efficiency function represented as a mapping of wavelength (nm) to efficiency (0.0-1.0)
pub type QEFunction = HashMap<u32, f64>;

/// Illumination wavelengths the rig can be fitted with (nm)
pub const SUPPORTED_WAVELENGTHS_NM: [u32; 5] = [730, 780, 810, 850, 940];

/// Readout architecture of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutterType {
    Global,
    Rolling,
}

/// Configuration for a sensor detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSpec {
    /// Name/model of the sensor
    pub name: String,
    /// Quantum efficiency as a function of wavelength (nm)
    pub quantum_efficiency: QEFunction,
    /// Width of sensor in pixels
    pub width_px: u32,
    /// Height of sensor in pixels
    pub height_px: u32,
    /// Pixel size in microns
    pub pixel_size_um: f64,
    /// Optical format string, e.g. "1/2.9"
    pub format: String,
    pub shutter: ShutterType,
    /// Vendor NIR enhancement, if any
    pub nir_tech: Option<String>,
}

/// One row of the sensor overview table, native and 2x2 binned
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSummary {
    pub name: String,
    pub shutter: ShutterType,
    pub pixel_size_um: f64,
    pub megapixels: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub binned_pixel_size_um: f64,
    pub binned_megapixels: f64,
    pub binned_width_px: u32,
    pub binned_height_px: u32,
}

impl SensorSpec {
    /// Create a new sensor specification
    pub fn new(
        name: impl Into<String>,
        quantum_efficiency: QEFunction,
        width_px: u32,
        height_px: u32,
        pixel_size_um: f64,
        format: impl Into<String>,
        shutter: ShutterType,
        nir_tech: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            quantum_efficiency,
            width_px,
            height_px,
            pixel_size_um,
            format: format.into(),
            shutter,
            nir_tech: nir_tech.map(str::to_string),
        }
    }

    /// Check that the entry describes a physically meaningful sensor
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.width_px == 0 || self.height_px == 0 {
            return Err(CatalogError::EmptySensor(self.name.clone()));
        }
        ensure_positive(&self.name, "pixel_size_um", self.pixel_size_um)
    }

    /// Get quantum efficiency at specified wavelength (nm)
    /// Uses linear interpolation between nearest wavelength points
    pub fn qe_at_wavelength(&self, wavelength_nm: u32) -> f64 {
        if let Some(qe) = self.quantum_efficiency.get(&wavelength_nm) {
            return *qe;
        }

        let below = self
            .quantum_efficiency
            .keys()
            .copied()
            .filter(|&w| w < wavelength_nm)
            .max();
        let above = self
            .quantum_efficiency
            .keys()
            .copied()
            .filter(|&w| w > wavelength_nm)
            .min();

        match (below, above) {
            (Some(w_below), Some(w_above)) => {
                let qe_below = self.quantum_efficiency[&w_below];
                let qe_above = self.quantum_efficiency[&w_above];
                let factor =
                    (wavelength_nm - w_below) as f64 / (w_above - w_below) as f64;
                qe_below + factor * (qe_above - qe_below)
            }
            (Some(w), None) | (None, Some(w)) => self.quantum_efficiency[&w],
            (None, None) => 0.0,
        }
    }

    /// Pixel pitch in millimeters
    pub fn pixel_size_mm(&self) -> f64 {
        self.pixel_size_um / 1000.0
    }

    /// Get sensor dimensions in millimeters
    pub fn dimensions_mm(&self) -> (f64, f64) {
        (
            self.width_px as f64 * self.pixel_size_mm(),
            self.height_px as f64 * self.pixel_size_mm(),
        )
    }

    /// Sensor diagonal in millimeters, the size a lens image circle has to cover
    pub fn diagonal_mm(&self) -> f64 {
        let (w, h) = self.dimensions_mm();
        w.hypot(h)
    }

    pub fn megapixels(&self) -> f64 {
        (self.width_px as f64 * self.height_px as f64) / 1_000_000.0
    }

    /// Sensor turned 90 degrees: width and height swap
    pub fn rotated(&self) -> Self {
        Self {
            width_px: self.height_px,
            height_px: self.width_px,
            ..self.clone()
        }
    }

    /// 2x2 binned readout: pixel pitch doubles, pixel counts halve
    pub fn binned(&self) -> Self {
        Self {
            width_px: self.width_px / 2,
            height_px: self.height_px / 2,
            pixel_size_um: self.pixel_size_um * 2.0,
            ..self.clone()
        }
    }

    /// Sensor as read out, optionally binned
    pub fn with_binning(&self, binning: bool) -> Self {
        if binning {
            self.binned()
        } else {
            self.clone()
        }
    }

    pub fn summary(&self) -> SensorSummary {
        let binned = self.binned();
        SensorSummary {
            name: self.name.clone(),
            shutter: self.shutter,
            pixel_size_um: self.pixel_size_um,
            megapixels: self.megapixels(),
            width_px: self.width_px,
            height_px: self.height_px,
            binned_pixel_size_um: binned.pixel_size_um,
            binned_megapixels: self.megapixels() / 4.0,
            binned_width_px: binned.width_px,
            binned_height_px: binned.height_px,
        }
    }
}

/// Build a QE table from the five supported illumination wavelengths
pub fn nir_qe(qe_730: f64, qe_780: f64, qe_810: f64, qe_850: f64, qe_940: f64) -> QEFunction {
    SUPPORTED_WAVELENGTHS_NM
        .iter()
        .copied()
        .zip([qe_730, qe_780, qe_810, qe_850, qe_940])
        .collect()
}

/// Standard sensor models
pub mod models {
    use super::*;

    /// Sony IMX296, 1.6MP global shutter. Reference sensor of the default baseline.
    pub static IMX296: Lazy<SensorSpec> = Lazy::new(|| {
        SensorSpec::new(
            "IMX296",
            nir_qe(0.30, 0.25, 0.21, 0.15, 0.07),
            1440,
            1080,
            3.45,
            "1/2.9",
            ShutterType::Global,
            None,
        )
    });

    /// OmniVision OV9281, 1.0MP global shutter
    pub static OV9281: Lazy<SensorSpec> = Lazy::new(|| {
        SensorSpec::new(
            "OV9281",
            nir_qe(0.35, 0.31, 0.28, 0.20, 0.09),
            1280,
            800,
            3.0,
            "1/4",
            ShutterType::Global,
            None,
        )
    });

    /// onsemi AR0234, 2.3MP global shutter
    pub static AR0234: Lazy<SensorSpec> = Lazy::new(|| {
        SensorSpec::new(
            "AR0234",
            nir_qe(0.32, 0.28, 0.25, 0.19, 0.07),
            1920,
            1200,
            3.0,
            "1/2.6",
            ShutterType::Global,
            None,
        )
    });

    /// OmniVision OS08A20, 8.3MP rolling shutter
    pub static OS08A20: Lazy<SensorSpec> = Lazy::new(|| {
        SensorSpec::new(
            "OS08A20",
            nir_qe(0.75, 0.72, 0.70, 0.60, 0.40),
            3840,
            2160,
            2.0,
            "1/1.8",
            ShutterType::Rolling,
            Some("Nyxel"),
        )
    });

    /// OmniVision OG05B1B, 5.0MP global shutter
    pub static OG05B1B: Lazy<SensorSpec> = Lazy::new(|| {
        SensorSpec::new(
            "OG05B1B",
            nir_qe(0.70, 0.68, 0.65, 0.60, 0.40),
            2592,
            1944,
            2.2,
            "1/2.5",
            ShutterType::Global,
            Some("Nyxel"),
        )
    });

    /// Sony IMX678, 8.3MP rolling shutter
    pub static IMX678: Lazy<SensorSpec> = Lazy::new(|| {
        SensorSpec::new(
            "IMX678",
            nir_qe(0.55, 0.52, 0.50, 0.45, 0.25),
            3840,
            2160,
            2.0,
            "1/1.8",
            ShutterType::Rolling,
            Some("Starvis 2"),
        )
    });

    /// onsemi AR0822, 8.3MP rolling shutter
    pub static AR0822: Lazy<SensorSpec> = Lazy::new(|| {
        SensorSpec::new(
            "AR0822",
            nir_qe(0.62, 0.60, 0.58, 0.49, 0.29),
            3840,
            2160,
            2.0,
            "1/1.8",
            ShutterType::Rolling,
            Some("NIR+"),
        )
    });

    /// Every catalog sensor, in display order
    pub fn all() -> Vec<&'static SensorSpec> {
        vec![
            &*IMX296, &*OV9281, &*AR0234, &*OS08A20, &*OG05B1B, &*IMX678, &*AR0822,
        ]
    }

    /// Look a sensor up by model name (case insensitive)
    pub fn by_name(name: &str) -> Option<&'static SensorSpec> {
        all()
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
