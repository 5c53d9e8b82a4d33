//! Evaluate a launch-monitor camera rig against the baseline
//!
//! Builds a rig from the command line, optionally runs the full optimizer or
//! one of the single-axis optimizers, then prints the metrics and the
//! comparison with the baseline rig.
//!
//! Usage:
//! ```
//! cargo run --release --bin rig_report -- [OPTIONS]
//! ```
//!
//! See --help for detailed options.

use clap::{Parser, ValueEnum};
use log::info;
use simcam::comparison::{compare, RowStatus, Side};
use simcam::hardware::lens::find_match;
use simcam::hardware::sensor::models;
use simcam::metrics::{compute_metrics, BallFit, MetricsResult};
use simcam::optimizer::{OptimizeError, Optimizer};
use simcam::shared_args::{RigArgs, TargetArgs};
use simcam::units::format_mm;
use simcam::{build_catalog, BaselineCell, RigConfiguration};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OptimizeMode {
    /// Lens, distance, focus, height and parallel offset together
    Full,
    /// Focal length only
    Lens,
    /// f-stop only
    Aperture,
    /// Camera distance only
    Distance,
    /// Focus offset only
    Focus,
    /// Vertical camera offset only
    CameraHeight,
    /// FOV center along the flight line only
    Parallel,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Launch-monitor camera rig metrics and optimizer")]
struct Args {
    #[command(flatten)]
    rig: RigArgs,

    #[command(flatten)]
    targets: TargetArgs,

    /// Run an optimizer before reporting
    #[arg(long, value_enum)]
    optimize: Option<OptimizeMode>,

    /// Report launch angles even when a ball leaves the frame
    #[arg(long, default_value_t = false)]
    ignore_fit: bool,

    /// Print the sensor table and exit
    #[arg(long, default_value_t = false)]
    list_sensors: bool,
}

fn print_sensor_table() {
    println!(
        "{:<10} {:<8} {:>8} {:>6} {:>11} {:>8} {:>7} {:>11}",
        "Sensor", "Shutter", "Pixel um", "MP", "Resolution", "Bin um", "Bin MP", "Bin res"
    );
    for sensor in models::all() {
        let s = sensor.summary();
        println!(
            "{:<10} {:<8} {:>8.2} {:>6.2} {:>11} {:>8.2} {:>7.2} {:>11}",
            s.name,
            format!("{:?}", s.shutter),
            s.pixel_size_um,
            s.megapixels,
            format!("{}x{}", s.width_px, s.height_px),
            s.binned_pixel_size_um,
            s.binned_megapixels,
            format!("{}x{}", s.binned_width_px, s.binned_height_px),
        );
    }
}

fn print_metrics(rig: &RigConfiguration, m: &MetricsResult) {
    println!("\n=== {} {}mm f/{} ===", rig.sensor.name, rig.focal_mm, rig.aperture);
    println!("Distance:        {}", format_mm(rig.distance_mm));
    println!("Focus offset:    {:+.0} mm", rig.focus_offset_mm);
    println!("Camera offset:   {:+.0} mm", rig.camera_offset_mm);
    println!(
        "FOV:             {:.1} x {:.1} mm ({:.1}° x {:.1}°)",
        m.fov_width_mm,
        m.fov_height_mm,
        m.fov_width_deg(rig.distance_mm),
        m.fov_height_deg(rig.distance_mm)
    );
    println!(
        "FOV span:        {:.1} .. {:.1} mm (center {:.1})",
        m.fov_bottom_mm, m.fov_top_mm, m.fov_center_mm
    );
    println!("Camera height:   {}", format_mm(m.total_camera_height_mm));
    println!("Resolution:      {:.2} px/mm", m.resolution_px_per_mm);
    println!("Brightness:      {:.1}% (QE {:.2})", m.brightness_pct, m.qe);
    if m.dof_is_infinite() {
        println!("Depth of field:  infinite (near {:.1} mm)", m.near_limit_mm);
    } else {
        println!(
            "Depth of field:  {:.1} mm ({:.1} .. {:.1} mm)",
            m.dof_mm, m.near_limit_mm, m.far_limit_mm
        );
    }
    if m.stereo_alignment.is_some() {
        println!("Stereo base:     {}", format_mm(m.stereo_base_mm));
    }
    match m.launch_window {
        Some(w) => {
            println!("HLA window:      [{:+.1}°, {:+.1}°]", w.hla_min_deg, w.hla_max_deg);
            println!("VLA window:      [{:+.1}°, {:+.1}°]", w.vla_min_deg, w.vla_max_deg);
        }
        None => println!("Launch angles:   NOT VISIBLE (ball leaves the frame)"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.list_sensors {
        print_sensor_table();
        return Ok(());
    }

    let mut rig = args.rig.to_rig();
    let targets = args.targets.targets();

    let catalog = build_catalog()?;
    let baseline = BaselineCell::default();
    let baseline_rig = baseline.get();
    let filter = args.targets.filter();
    let optimizer = Optimizer::from_catalog(&catalog, &filter, &rig, targets, &baseline_rig);
    info!(
        "{} of {} lens configurations compatible with {}",
        optimizer.lenses().len(),
        catalog.len(),
        rig.sensor.name
    );

    if let Some(mode) = args.optimize {
        let outcome: Result<(), OptimizeError> = match mode {
            OptimizeMode::Full => optimizer.optimize(&rig).map(|best| {
                println!(
                    "Optimized: {} {}mm f/{} at {}",
                    best.lens.model,
                    best.lens.focal_mm,
                    best.lens.aperture,
                    format_mm(best.rig.distance_mm)
                );
                rig = best.rig;
            }),
            OptimizeMode::Lens => optimizer.optimize_lens_only(&rig).map(|f| rig.focal_mm = f),
            OptimizeMode::Aperture => optimizer
                .optimize_aperture_only(&rig)
                .map(|a| rig.aperture = a),
            OptimizeMode::Distance => optimizer
                .optimize_distance_only(&rig)
                .map(|d| rig.distance_mm = d),
            OptimizeMode::Focus => {
                rig.focus_offset_mm = optimizer.optimize_focus_only(&rig);
                Ok(())
            }
            OptimizeMode::CameraHeight => {
                rig.camera_offset_mm = optimizer.optimize_camera_height_only(&rig);
                Ok(())
            }
            OptimizeMode::Parallel => {
                rig.parallel_center_mm = Some(optimizer.optimize_parallel_only(&rig));
                Ok(())
            }
        };
        if let Err(e) = outcome {
            println!("Optimization failed: {}", e);
        }
    }

    let lenses = optimizer.lenses();
    match find_match(lenses, rig.focal_mm, rig.aperture) {
        Some(lens) => println!("Lens model: {}", lens.model),
        None => println!(
            "Lens model: no catalog lens matches {}mm f/{}",
            rig.focal_mm, rig.aperture
        ),
    }

    let fit = if args.ignore_fit {
        BallFit::Ignore
    } else {
        BallFit::Enforce
    };
    let metrics = compute_metrics(&rig, &baseline_rig, fit);
    print_metrics(&rig, &metrics);

    let baseline_metrics = compute_metrics(&baseline_rig, &baseline_rig, fit);
    let rows = compare(
        Side::new(&baseline_rig, &baseline_metrics),
        Side::new(&rig, &metrics),
        &targets,
    );
    println!("\n{:<32} {:<48} {:<48} Change", "Metric", "Baseline", "Your Setup");
    for row in rows {
        let marker = match row.status {
            RowStatus::Neutral => " ",
            s if s.is_positive() => "+",
            _ => "-",
        };
        println!(
            "{} {:<30} {:<48} {:<48} {}",
            marker,
            row.metric,
            row.baseline.to_string(),
            row.current.to_string(),
            row.change
        );
    }

    Ok(())
}
