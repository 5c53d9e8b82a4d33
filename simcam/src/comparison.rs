//! Baseline vs current comparison rows
//!
//! Pure computation of the table a front end shows next to the metrics: one
//! [`ComparisonRow`] per quantity with both values, the change and a verdict.
//! Rendering is left to `Display` impls on [`Value`] and [`Change`].

use std::fmt;

use crate::metrics::{LaunchWindow, MetricsResult};
use crate::optimizer::OptimizationTargets;
use crate::rig::RigConfiguration;
use crate::units::format_mm;

/// Below this magnitude an angle change is reported as 0%
const ANGLE_CHANGE_FLOOR_DEG: f64 = 0.01;

/// `(new - base) / base` in percent, `None` for a zero base
pub fn percent_change(base: f64, new: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some((new - base) / base * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Neutral,
    /// Moved in the favourable direction
    Good,
    Bad,
    /// Target met
    Pass,
    Fail,
}

impl RowStatus {
    fn good_if(condition: bool) -> Self {
        if condition {
            Self::Good
        } else {
            Self::Bad
        }
    }

    fn pass_if(condition: bool) -> Self {
        if condition {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Good | Self::Pass)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Length(f64),
    /// Stereo base; `None` for a mono rig
    StereoBase(Option<f64>),
    /// Linear FOV extent and its full angle from the camera
    Fov { mm: f64, deg: f64 },
    Resolution(f64),
    Brightness { pct: f64, wavelength_nm: u32 },
    FocusZone { dof: f64, near: f64, far: f64 },
    /// `None` when the ball leaves the frame
    Angles(Option<(f64, f64)>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{}", text),
            Value::Length(mm) => write!(f, "{}", format_mm(*mm)),
            Value::StereoBase(Some(mm)) => write!(f, "{}", format_mm(*mm)),
            Value::StereoBase(None) => write!(f, "N/A"),
            Value::Fov { mm, deg } => write!(f, "{} [{:.1}°]", format_mm(*mm), deg),
            Value::Resolution(res) => write!(f, "{:.1} px/mm", res),
            Value::Brightness { pct, wavelength_nm } => {
                write!(f, "{:.1}% @{}nm", pct, wavelength_nm)
            }
            Value::FocusZone { dof, near, far } => write!(
                f,
                "{} [{} - {}]",
                format_mm(*dof),
                format_mm(*near),
                format_mm(*far)
            ),
            Value::Angles(Some((min, max))) => write!(f, "[{:+.1}°, {:+.1}°]", min, max),
            Value::Angles(None) => write!(f, "NOT VISIBLE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    None,
    Percent(Option<f64>),
    /// Absolute difference in percentage points
    Points(f64),
    FocusZone {
        total: Option<f64>,
        near: Option<f64>,
        far: Option<f64>,
    },
    /// Percent growth of the window at its low and high ends
    Angles { min: f64, max: f64 },
}

fn fmt_pct(f: &mut fmt::Formatter<'_>, pct: Option<f64>) -> fmt::Result {
    match pct {
        Some(p) => write!(f, "{:+.1}%", p),
        None => write!(f, "n/a"),
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::None => Ok(()),
            Change::Percent(pct) => fmt_pct(f, *pct),
            Change::Points(delta) => write!(f, "{:+.1}%", delta),
            Change::FocusZone { total, near, far } => {
                fmt_pct(f, *total)?;
                write!(f, " [")?;
                fmt_pct(f, *near)?;
                write!(f, ", ")?;
                fmt_pct(f, *far)?;
                write!(f, "]")
            }
            Change::Angles { min, max } => write!(f, "[{:+.1}%, {:+.1}%]", min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub metric: String,
    pub baseline: Value,
    pub current: Value,
    pub change: Change,
    pub status: RowStatus,
}

impl ComparisonRow {
    fn new(
        metric: &str,
        baseline: Value,
        current: Value,
        change: Change,
        status: RowStatus,
    ) -> Self {
        Self {
            metric: metric.to_string(),
            baseline,
            current,
            change,
            status,
        }
    }

    fn informational(metric: &str, baseline: Value, current: Value) -> Self {
        Self::new(metric, baseline, current, Change::None, RowStatus::Neutral)
    }

    /// Row where growth is good
    fn growth(metric: &str, base: f64, new: f64, baseline: Value, current: Value) -> Self {
        let pct = percent_change(base, new);
        let status = RowStatus::good_if(pct.map_or(true, |p| p >= 0.0));
        Self::new(metric, baseline, current, Change::Percent(pct), status)
    }
}

fn angle_change(base: (f64, f64), new: (f64, f64)) -> Change {
    let relative = |delta: f64, reference: f64| {
        if reference.abs() < ANGLE_CHANGE_FLOOR_DEG {
            0.0
        } else {
            delta / reference.abs() * 100.0
        }
    };
    Change::Angles {
        min: relative(base.0 - new.0, base.0),
        max: relative(new.1 - base.1, base.1),
    }
}

fn angle_row(metric: &str, base: Option<(f64, f64)>, new: Option<(f64, f64)>) -> ComparisonRow {
    match (base, new) {
        (Some(b), Some(n)) => ComparisonRow::new(
            metric,
            Value::Angles(base),
            Value::Angles(new),
            angle_change(b, n),
            RowStatus::good_if(n.1 - n.0 >= b.1 - b.0),
        ),
        _ => ComparisonRow::new(
            metric,
            Value::Angles(base),
            Value::Angles(new),
            Change::None,
            RowStatus::Fail,
        ),
    }
}

fn hla(window: Option<LaunchWindow>) -> Option<(f64, f64)> {
    window.map(|w| (w.hla_min_deg, w.hla_max_deg))
}

fn vla(window: Option<LaunchWindow>) -> Option<(f64, f64)> {
    window.map(|w| (w.vla_min_deg, w.vla_max_deg))
}

/// A rig, evaluated, on one side of the comparison
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub rig: &'a RigConfiguration,
    pub metrics: &'a MetricsResult,
}

impl<'a> Side<'a> {
    pub fn new(rig: &'a RigConfiguration, metrics: &'a MetricsResult) -> Self {
        Self { rig, metrics }
    }

    fn lens(&self) -> String {
        format!("{}mm f/{}", self.rig.focal_mm, self.rig.aperture)
    }

    fn stereo_base(&self) -> Option<f64> {
        self.rig.stereo.map(|_| self.metrics.stereo_base_mm)
    }
}

/// Build every comparison row, in display order
pub fn compare(
    baseline: Side<'_>,
    current: Side<'_>,
    targets: &OptimizationTargets,
) -> Vec<ComparisonRow> {
    let (b, n) = (baseline.metrics, current.metrics);
    let mut rows = vec![
        ComparisonRow::informational(
            "Lens",
            Value::Text(baseline.lens()),
            Value::Text(current.lens()),
        ),
        ComparisonRow::informational(
            "Distance Perpendicular",
            Value::Length(baseline.rig.distance_mm),
            Value::Length(current.rig.distance_mm),
        ),
        ComparisonRow::informational(
            "Distance Parallel (Center)",
            Value::Length(b.fov_center_mm),
            Value::Length(n.fov_center_mm),
        ),
    ];

    if baseline.rig.stereo.is_some() || current.rig.stereo.is_some() {
        rows.push(ComparisonRow::informational(
            "Stereo Base (Camera Separation)",
            Value::StereoBase(baseline.stereo_base()),
            Value::StereoBase(current.stereo_base()),
        ));
    }

    let width_label = if current.rig.stereo.is_some() {
        "FOV Width (Overlap)"
    } else {
        "FOV Width"
    };

    rows.extend([
        ComparisonRow::informational(
            "Camera Height",
            Value::Length(b.total_camera_height_mm),
            Value::Length(n.total_camera_height_mm),
        ),
        ComparisonRow::growth(
            width_label,
            b.fov_width_mm,
            n.fov_width_mm,
            Value::Fov {
                mm: b.fov_width_mm,
                deg: b.fov_width_deg(baseline.rig.distance_mm),
            },
            Value::Fov {
                mm: n.fov_width_mm,
                deg: n.fov_width_deg(current.rig.distance_mm),
            },
        ),
        ComparisonRow::growth(
            "FOV Height",
            b.fov_height_mm,
            n.fov_height_mm,
            Value::Fov {
                mm: b.fov_height_mm,
                deg: b.fov_height_deg(baseline.rig.distance_mm),
            },
            Value::Fov {
                mm: n.fov_height_mm,
                deg: n.fov_height_deg(current.rig.distance_mm),
            },
        ),
        ComparisonRow::new(
            "Resolution",
            Value::Resolution(b.resolution_px_per_mm),
            Value::Resolution(n.resolution_px_per_mm),
            Change::Percent(percent_change(b.resolution_px_per_mm, n.resolution_px_per_mm)),
            RowStatus::pass_if(n.resolution_px_per_mm >= targets.resolution_px_per_mm),
        ),
        ComparisonRow::new(
            "Brightness",
            Value::Brightness {
                pct: b.brightness_pct,
                wavelength_nm: baseline.rig.wavelength_nm,
            },
            Value::Brightness {
                pct: n.brightness_pct,
                wavelength_nm: current.rig.wavelength_nm,
            },
            Change::Points(n.brightness_pct - b.brightness_pct),
            RowStatus::pass_if(n.brightness_pct >= targets.brightness_pct),
        ),
    ]);

    let total = percent_change(b.dof_mm, n.dof_mm);
    rows.push(ComparisonRow::new(
        "Focus Zone",
        Value::FocusZone {
            dof: b.dof_mm,
            near: b.near_limit_mm,
            far: b.far_limit_mm,
        },
        Value::FocusZone {
            dof: n.dof_mm,
            near: n.near_limit_mm,
            far: n.far_limit_mm,
        },
        Change::FocusZone {
            total,
            near: percent_change(b.near_limit_mm, n.near_limit_mm),
            far: percent_change(b.far_limit_mm, n.far_limit_mm),
        },
        RowStatus::good_if(total.map_or(true, |p| p >= 0.0)),
    ));

    rows.push(angle_row(
        "Horiz Launch Angle",
        hla(b.launch_window),
        hla(n.launch_window),
    ));
    rows.push(angle_row(
        "Vert Launch Angle",
        vla(b.launch_window),
        vla(n.launch_window),
    ));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::default_baseline;
    use crate::metrics::{compute_metrics, BallFit};
    use crate::rig::{StereoAlignment, StereoConfig};
    use approx::assert_relative_eq;

    fn row<'a>(rows: &'a [ComparisonRow], metric: &str) -> &'a ComparisonRow {
        rows.iter().find(|r| r.metric == metric).unwrap()
    }

    fn compare_rigs(current: &RigConfiguration) -> Vec<ComparisonRow> {
        let baseline = default_baseline();
        let b = compute_metrics(&baseline, &baseline, BallFit::Enforce);
        let n = compute_metrics(current, &baseline, BallFit::Enforce);
        compare(
            Side::new(&baseline, &b),
            Side::new(current, &n),
            &OptimizationTargets::default(),
        )
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(200.0, 250.0), Some(25.0));
        assert_eq!(percent_change(200.0, 100.0), Some(-50.0));
        assert_eq!(percent_change(0.0, 10.0), None);
    }

    #[test]
    fn test_angle_change() {
        match angle_change((-10.0, 20.0), (-15.0, 30.0)) {
            Change::Angles { min, max } => {
                assert_relative_eq!(min, 50.0);
                assert_relative_eq!(max, 50.0);
            }
            other => panic!("unexpected change {:?}", other),
        }
        match angle_change((0.001, 20.0), (-5.0, 10.0)) {
            Change::Angles { min, max } => {
                assert_eq!(min, 0.0);
                assert_relative_eq!(max, -50.0);
            }
            other => panic!("unexpected change {:?}", other),
        }
    }

    #[test]
    fn test_identical_rigs() {
        let rows = compare_rigs(&default_baseline());
        assert_eq!(rows.len(), 11);
        assert_eq!(row(&rows, "Resolution").change, Change::Percent(Some(0.0)));
        assert_eq!(row(&rows, "Brightness").change, Change::Points(0.0));
        assert_eq!(row(&rows, "Brightness").status, RowStatus::Pass);
        assert_eq!(row(&rows, "FOV Width").status, RowStatus::Good);
        assert_eq!(row(&rows, "Horiz Launch Angle").status, RowStatus::Good);
        assert_eq!(row(&rows, "Lens").current, Value::Text("6mm f/1.2".to_string()));
    }

    #[test]
    fn test_darker_lens_fails_brightness() {
        let current = RigConfiguration {
            aperture: 2.4,
            ..default_baseline()
        };
        let rows = compare_rigs(&current);
        let brightness = row(&rows, "Brightness");
        assert_eq!(brightness.status, RowStatus::Fail);
        match brightness.change {
            Change::Points(delta) => assert_relative_eq!(delta, -75.0, epsilon = 1e-9),
            ref other => panic!("unexpected change {:?}", other),
        }
        // Stopping down deepens the focus zone
        assert_eq!(row(&rows, "Focus Zone").status, RowStatus::Good);
    }

    #[test]
    fn test_not_visible_angles_fail() {
        let current = RigConfiguration {
            parallel_center_mm: Some(-2000.0),
            ..default_baseline()
        };
        let rows = compare_rigs(&current);
        let vert = row(&rows, "Vert Launch Angle");
        assert_eq!(vert.status, RowStatus::Fail);
        assert_eq!(vert.current, Value::Angles(None));
        assert_eq!(vert.current.to_string(), "NOT VISIBLE");
    }

    #[test]
    fn test_stereo_row_only_with_stereo() {
        let current = RigConfiguration {
            stereo: Some(StereoConfig::fixed(StereoAlignment::Horizontal, 60.0)),
            ..default_baseline()
        };
        let rows = compare_rigs(&current);
        let stereo = row(&rows, "Stereo Base (Camera Separation)");
        assert_eq!(stereo.baseline, Value::StereoBase(None));
        assert_eq!(stereo.current, Value::StereoBase(Some(60.0)));
        assert_eq!(row(&rows, "FOV Width (Overlap)").status, RowStatus::Bad);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Value::Brightness {
                pct: 100.0,
                wavelength_nm: 810
            }
            .to_string(),
            "100.0% @810nm"
        );
        assert_eq!(Value::Angles(Some((-5.0, 12.34))).to_string(), "[-5.0°, +12.3°]");
        assert_eq!(Change::Percent(None).to_string(), "n/a");
        assert_eq!(
            Change::FocusZone {
                total: Some(10.0),
                near: Some(-2.5),
                far: None
            }
            .to_string(),
            "+10.0% [-2.5%, n/a]"
        );
    }
}
