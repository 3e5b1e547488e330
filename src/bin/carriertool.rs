use carrier_grid::detector::frame::isolate;
use carrier_grid::detector::rows::locate_rows;
use carrier_grid::detector::tilt::estimate_tilt;
use carrier_grid::tools::batch::{BatchOutcome, process_batch};
use carrier_grid::tools::export::export_segmentation;
use carrier_grid::tools::synthetic::SyntheticCarrier;
use carrier_grid::tools::{image_id, load_image};
use carrier_grid::utils::grayscale::to_grayscale;
use carrier_grid::{CarrierConfig, CarrierError, load_config, segment_carrier};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "carriertool", version, about = "Sample carrier segmentation tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment one carrier photograph into 16 wells
    Segment {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write A1.png..D4.png, overlay.png and segments.json here
        #[arg(long)]
        out: Option<PathBuf>,
        /// Enable tilt correction regardless of the config
        #[arg(long)]
        rotate: bool,
    },
    /// Print the marker row search for one photograph
    Rows {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the tilt estimate for one photograph
    Tilt {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Segment every image under a directory
    Batch {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a synthetic carrier photograph
    Synth {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        tilt_deg: f64,
        /// Divide every length of the default carrier by this factor
        #[arg(long, default_value_t = 1)]
        scale: u32,
    },
    /// Print the default configuration as JSON
    Config,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Segment {
            image,
            config,
            out,
            rotate,
        } => segment_cmd(&image, config.as_deref(), out.as_deref(), rotate),
        Command::Rows { image, config } => rows_cmd(&image, config.as_deref()),
        Command::Tilt { image, config } => tilt_cmd(&image, config.as_deref()),
        Command::Batch { dir, config, out } => batch_cmd(&dir, config.as_deref(), out.as_deref()),
        Command::Synth {
            out,
            tilt_deg,
            scale,
        } => synth_cmd(&out, tilt_deg, scale),
        Command::Config => config_cmd(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn read_config(path: Option<&Path>) -> Result<CarrierConfig, CarrierError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(CarrierConfig::default()),
    }
}

fn with_image_id(path: &Path, err: CarrierError) -> String {
    format!("{}: {}", image_id(path), err)
}

fn segment_cmd(
    image: &Path,
    config: Option<&Path>,
    out: Option<&Path>,
    rotate: bool,
) -> Result<(), String> {
    let mut config = read_config(config).map_err(|e| e.to_string())?;
    config.frame.rotate |= rotate;

    let photo = load_image(image).map_err(|e| with_image_id(image, e))?;
    let start = Instant::now();
    let result = segment_carrier(&photo, &config).map_err(|e| with_image_id(image, e))?;
    let elapsed = start.elapsed();

    println!(
        "Image: {} ({}x{}) segmented in {:.1} ms",
        image.display(),
        photo.width(),
        photo.height(),
        elapsed.as_secs_f64() * 1000.0
    );
    println!(
        "Crop: {}x{} at ({}, {})",
        result.crop.width, result.crop.height, result.crop.left, result.crop.top
    );
    if let Some(tilt) = &result.tilt {
        println!("Tilt: {}", serde_json::to_string(tilt).map_err(|e| e.to_string())?);
    }
    println!("x_grid: {:?}", result.grid.x_grid);
    println!("y_grid: {:?}", result.grid.y_grid);
    for segment in &result.segments {
        let info = &segment.info;
        println!(
            "  {} row={} col={} x={:?} y={:?} shape={:?}",
            info.well, info.row, info.col, info.x_range, info.y_range, info.shape
        );
    }
    for warning in &result.warnings {
        println!("Warning: {warning}");
    }

    if let Some(out) = out {
        let written = export_segmentation(&image_id(image), &result, out)
            .map_err(|e| with_image_id(image, e))?;
        println!("Wrote {} files to {}", written.len(), out.display());
    }
    Ok(())
}

fn rows_cmd(image: &Path, config: Option<&Path>) -> Result<(), String> {
    let config = read_config(config).map_err(|e| e.to_string())?;
    let photo = load_image(image).map_err(|e| with_image_id(image, e))?;
    let carrier =
        isolate(&photo, &config.frame, &config.tilt).map_err(|e| with_image_id(image, e))?;
    let gray = to_grayscale(&carrier.image);

    println!("Image: {} carrier {}x{}", image.display(), gray.width(), gray.height());
    let search = locate_rows(&gray, &config.rows).map_err(|e| with_image_id(image, e))?;
    println!("Profile samples: {}", search.profile.len());
    for (row, peak) in search.rows.iter().zip(&search.peaks) {
        println!("  row y={} (band top {}, score {:.4})", row, peak.index, peak.height);
    }
    Ok(())
}

fn tilt_cmd(image: &Path, config: Option<&Path>) -> Result<(), String> {
    let config = read_config(config).map_err(|e| e.to_string())?;
    let photo = load_image(image).map_err(|e| with_image_id(image, e))?;
    let estimate = estimate_tilt(&photo, &config.tilt).map_err(|e| with_image_id(image, e))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&estimate).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn batch_cmd(dir: &Path, config: Option<&Path>, out: Option<&Path>) -> Result<(), String> {
    let config = read_config(config).map_err(|e| e.to_string())?;
    let start = Instant::now();
    let report = process_batch(dir, &config, out).map_err(|e| e.to_string())?;

    for entry in &report.entries {
        match &entry.outcome {
            BatchOutcome::Segmented { segments, warnings } => {
                println!("ok     {} ({segments} segments, {warnings} warnings)", entry.image)
            }
            BatchOutcome::Failed { error } => println!("FAILED {}: {error}", entry.image),
        }
    }
    println!(
        "Segmented {}/{} images in {:.1} s",
        report.succeeded(),
        report.entries.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn synth_cmd(out: &Path, tilt_deg: f64, scale: u32) -> Result<(), String> {
    let carrier = SyntheticCarrier::scaled(scale).with_tilt(tilt_deg);
    carrier.render().save(out).map_err(|e| e.to_string())?;
    println!(
        "Wrote {}x{} synthetic carrier to {} (tilt {tilt_deg}°)",
        carrier.width,
        carrier.height,
        out.display()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&carrier.config()).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn config_cmd() -> Result<(), String> {
    let json = serde_json::to_string_pretty(&CarrierConfig::default()).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
