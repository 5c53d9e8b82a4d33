//! Launch-monitor camera rig simulation
//!
//! This crate models a camera observing a golf ball at launch: field of view,
//! depth of field, brightness and the launch-angle window a given sensor and
//! lens combination can capture, plus a search over a catalog of real lenses
//! for the rig that best meets resolution, brightness and launch-angle targets.

pub mod algo;
pub mod baseline;
pub mod comparison;
pub mod hardware;
pub mod metrics;
pub mod optimizer;
pub mod rig;
pub mod shared_args;
pub mod units;

// Re-exports for easier access
pub use baseline::{default_baseline, BaselineCell, BaselineError};
pub use comparison::{compare, ComparisonRow, RowStatus, Side};
pub use hardware::{
    build_catalog, CatalogError, CompatibilityFilter, LensCatalog, LensSpec, SensorSpec,
};
pub use metrics::{compute_metrics, BallFit, LaunchWindow, MetricsResult};
pub use optimizer::{OptimizationTargets, OptimizeError, OptimizedRig, Optimizer};
pub use rig::{
    default_parallel_offset, BallSchedule, RigConfiguration, StereoAlignment, StereoConfig,
};
