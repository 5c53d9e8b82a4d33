use clap::{Parser, ValueEnum};

use crate::hardware::sensor::{models, SensorSpec, SUPPORTED_WAVELENGTHS_NM};
use crate::hardware::CompatibilityFilter;
use crate::optimizer::OptimizationTargets;
use crate::rig::{BallSchedule, RigConfiguration, StereoAlignment, StereoConfig};

/// Parse an illumination wavelength, accepting only the supported NIR bands
fn parse_wavelength(s: &str) -> Result<u32, String> {
    let nm = s
        .trim()
        .trim_end_matches("nm")
        .parse::<u32>()
        .map_err(|_| format!("Invalid wavelength '{}'", s))?;
    if SUPPORTED_WAVELENGTHS_NM.contains(&nm) {
        Ok(nm)
    } else {
        Err(format!(
            "Unsupported wavelength {}nm, expected one of {:?}",
            nm, SUPPORTED_WAVELENGTHS_NM
        ))
    }
}

/// Available sensor models for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SensorModel {
    /// Sony IMX296, 1.6MP global shutter (baseline)
    Imx296,
    /// OmniVision OV9281, 1MP global shutter
    Ov9281,
    /// onsemi AR0234, 2.3MP global shutter
    Ar0234,
    /// OmniVision OS08A20, 8.3MP rolling shutter
    Os08a20,
    /// OmniVision OG05B1B, 5MP global shutter
    Og05b1b,
    /// Sony IMX678, 8.3MP rolling shutter
    Imx678,
    /// onsemi AR0822, 8.3MP rolling shutter
    Ar0822,
}

impl std::fmt::Display for SensorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_config().name)
    }
}

impl SensorModel {
    pub fn to_config(&self) -> &'static SensorSpec {
        match self {
            SensorModel::Imx296 => &models::IMX296,
            SensorModel::Ov9281 => &models::OV9281,
            SensorModel::Ar0234 => &models::AR0234,
            SensorModel::Os08a20 => &models::OS08A20,
            SensorModel::Og05b1b => &models::OG05B1B,
            SensorModel::Imx678 => &models::IMX678,
            SensorModel::Ar0822 => &models::AR0822,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StereoMode {
    Off,
    /// Cameras side by side along the flight line
    Horizontal,
    /// Cameras stacked vertically
    Vertical,
}

/// Rig parameters shared by the binaries
#[derive(Parser, Debug, Clone)]
pub struct RigArgs {
    #[arg(long, value_enum, default_value_t = SensorModel::Imx296)]
    pub sensor: SensorModel,

    /// Mount the camera turned by 90 degrees
    #[arg(long, default_value_t = false)]
    pub rotate: bool,

    /// 2x2 binning
    #[arg(long, default_value_t = false)]
    pub binning: bool,

    /// Illumination wavelength in nm (730, 780, 810, 850 or 940)
    #[arg(long, default_value = "810", value_parser = parse_wavelength)]
    pub wavelength: u32,

    /// Focal length in mm
    #[arg(long, default_value_t = 6.0)]
    pub focal: f64,

    /// f-number
    #[arg(long, default_value_t = 1.2)]
    pub aperture: f64,

    /// Perpendicular camera distance in mm
    #[arg(long, default_value_t = 430.0)]
    pub distance: f64,

    /// Focus offset relative to the distance, in mm
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub focus_offset: f64,

    /// Circle of confusion as a multiple of the pixel pitch
    #[arg(long, default_value_t = 2.0)]
    pub coc: f64,

    /// Vertical camera offset in mm
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub camera_offset: f64,

    /// FOV center along the flight line in mm (default: anchored on the first ball or club)
    #[arg(long, allow_hyphen_values = true)]
    pub parallel: Option<f64>,

    /// Distance from the tee to the first exposure in mm
    #[arg(long, default_value_t = 152.4)]
    pub first_position: f64,

    /// Spacing between exposures in mm
    #[arg(long, default_value_t = 64.0)]
    pub spacing: f64,

    /// Number of exposures
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(2..))]
    pub positions: u32,

    /// Keep the club in frame (FOV starts 6" before the tee)
    #[arg(long, default_value_t = false)]
    pub club: bool,

    #[arg(long, value_enum, default_value_t = StereoMode::Off)]
    pub stereo: StereoMode,

    /// Fixed stereo base in mm (overrides --stereo-ratio)
    #[arg(long)]
    pub stereo_base: Option<f64>,

    /// Base-to-height ratio, distance : base
    #[arg(long, default_value_t = 5.0)]
    pub stereo_ratio: f64,
}

impl RigArgs {
    pub fn stereo_config(&self) -> Option<StereoConfig> {
        let alignment = match self.stereo {
            StereoMode::Off => return None,
            StereoMode::Horizontal => StereoAlignment::Horizontal,
            StereoMode::Vertical => StereoAlignment::Vertical,
        };
        Some(match self.stereo_base {
            Some(base) => StereoConfig::fixed(alignment, base),
            None => StereoConfig::from_ratio(alignment, self.stereo_ratio),
        })
    }

    pub fn to_rig(&self) -> RigConfiguration {
        let model = self.sensor.to_config();
        RigConfiguration {
            sensor: if self.rotate {
                model.rotated()
            } else {
                model.clone()
            },
            binning: self.binning,
            wavelength_nm: self.wavelength,
            focal_mm: self.focal,
            aperture: self.aperture,
            distance_mm: self.distance,
            focus_offset_mm: self.focus_offset,
            coc_multiplier: self.coc,
            camera_offset_mm: self.camera_offset,
            parallel_center_mm: self.parallel,
            balls: BallSchedule {
                first_position_mm: self.first_position,
                spacing_mm: self.spacing,
                count: self.positions,
            },
            include_club: self.club,
            stereo: self.stereo_config(),
        }
    }
}

/// Optimization targets and lens filter
#[derive(Parser, Debug, Clone)]
pub struct TargetArgs {
    /// Minimum resolution in px/mm
    #[arg(long, default_value_t = 4.0)]
    pub target_resolution: f64,

    /// Minimum brightness, percent of the baseline
    #[arg(long, default_value_t = 100.0)]
    pub target_brightness: f64,

    /// Minimum safe distance in mm
    #[arg(long, default_value_t = 254.0)]
    pub min_distance: f64,

    /// Lowest vertical launch angle that must stay visible, in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub min_vla: f64,

    /// Required image-circle coverage of the sensor diagonal, percent
    #[arg(long, default_value_t = 90.0)]
    pub coverage: f64,

    /// Exclude lenses derived from zoom ranges
    #[arg(long, default_value_t = false)]
    pub no_varifocal: bool,
}

impl TargetArgs {
    pub fn targets(&self) -> OptimizationTargets {
        OptimizationTargets {
            resolution_px_per_mm: self.target_resolution,
            brightness_pct: self.target_brightness,
            min_distance_mm: self.min_distance,
            min_vla_deg: self.min_vla,
        }
    }

    pub fn filter(&self) -> CompatibilityFilter {
        CompatibilityFilter::new(self.coverage, !self.no_varifocal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct TestArgs {
        #[command(flatten)]
        rig: RigArgs,
        #[command(flatten)]
        targets: TargetArgs,
    }

    #[test]
    fn test_defaults_match_tool_defaults() {
        let args = TestArgs::parse_from(["test"]);
        let rig = args.rig.to_rig();
        assert_eq!(rig.sensor, *models::IMX296);
        assert_eq!(rig.focal_mm, 6.0);
        assert_eq!(rig.aperture, 1.2);
        assert_eq!(rig.distance_mm, 430.0);
        assert_eq!(rig.wavelength_nm, 810);
        assert_eq!(rig.balls, BallSchedule::default());
        assert!(rig.stereo.is_none());
        assert_eq!(args.targets.targets(), OptimizationTargets::default());
        assert_eq!(args.targets.filter(), CompatibilityFilter::default());
    }

    #[test]
    fn test_stereo_and_rotation() {
        let args = TestArgs::parse_from([
            "test",
            "--sensor",
            "ov9281",
            "--rotate",
            "--stereo",
            "vertical",
            "--stereo-ratio",
            "10",
        ]);
        let rig = args.rig.to_rig();
        assert_eq!(rig.sensor.width_px, 800);
        assert_eq!(
            rig.stereo,
            Some(StereoConfig::from_ratio(StereoAlignment::Vertical, 10.0))
        );
        assert_eq!(rig.stereo_base_mm(), 43.0);
    }

    #[test]
    fn test_wavelength_parser() {
        assert_eq!(parse_wavelength("850"), Ok(850));
        assert_eq!(parse_wavelength("940nm"), Ok(940));
        assert!(parse_wavelength("550").is_err());
        assert!(parse_wavelength("abc").is_err());
    }

    #[test]
    fn test_sensor_model_lookup() {
        assert_eq!(SensorModel::Ar0234.to_config().name, "AR0234");
        assert_eq!(SensorModel::Imx296.to_string(), "IMX296");
    }
}
