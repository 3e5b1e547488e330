use image::DynamicImage;
use log::{info, warn};

use crate::config::CarrierConfig;
use crate::detector::crosses::{CROSSES_PER_ROW, CrossSearch, locate_crosses_in};
use crate::detector::frame::{CropBox, isolate};
use crate::detector::grid::build_grid;
use crate::detector::rows::{RowSearch, locate_rows_in};
use crate::detector::tilt::TiltEstimate;
use crate::error::{CalibrationFailure, CarrierWarning, Result};
use crate::models::{GridSpec, Segment};
use crate::utils::grayscale::to_grayscale;
use crate::utils::integral::IntegralImage;

/// Everything produced while segmenting one carrier photograph
#[derive(Debug, Clone)]
pub struct CarrierSegmentation {
    /// The 16 specimens in row-major order (`A1`, `A2`, ..., `D4`)
    pub segments: Vec<Segment>,
    /// Grid lines in `image` coordinates
    pub grid: GridSpec,
    /// Cropped (and possibly rotated) carrier image the grid refers to
    pub image: DynamicImage,
    /// Holder crop in the input photograph
    pub crop: CropBox,
    /// Tilt estimate, present when rotation was enabled
    pub tilt: Option<TiltEstimate>,
    /// Row search diagnostics
    pub rows: RowSearch,
    /// Cross search diagnostics
    pub crosses: CrossSearch,
    /// Non-fatal conditions from every stage
    pub warnings: Vec<CarrierWarning>,
}

/// Run the full segmentation on one photograph.
///
/// Stages run in order: holder isolation (with optional tilt correction),
/// marker row search, cross search, grid extrapolation. Any stage failing
/// to find its expected markers aborts with a typed error; no default grid
/// is ever substituted.
pub fn segment_carrier(image: &DynamicImage, config: &CarrierConfig) -> Result<CarrierSegmentation> {
    config.validate()?;

    let carrier = isolate(image, &config.frame, &config.tilt)?;
    let gray = to_grayscale(&carrier.image);
    let integral = IntegralImage::new(&gray);

    let rows = locate_rows_in(&integral, &config.rows)?;
    let crosses = locate_crosses_in(&integral, &rows.rows, &config.crosses);

    // A row short of crosses is reported by position before the grid
    // builder sees the flattened list
    if let Some(row) = crosses
        .rows
        .iter()
        .find(|row| row.crosses.len() != CROSSES_PER_ROW)
    {
        warn!(
            "crosses: row y={} has {} crosses",
            row.row_y,
            row.crosses.len()
        );
        return Err(CalibrationFailure::RowCrossCount {
            row_y: row.row_y,
            found: row.crosses.len(),
        }
        .into());
    }

    let grid = build_grid(&crosses.crosses, &carrier.image, &config.grid)?;

    let mut warnings = crosses.warnings.clone();
    warnings.extend(grid.warnings);
    info!(
        "pipeline: {} segments, {} warnings",
        grid.segments.len(),
        warnings.len()
    );

    Ok(CarrierSegmentation {
        segments: grid.segments,
        grid: grid.grid,
        image: carrier.image,
        crop: carrier.crop,
        tilt: carrier.tilt,
        rows,
        crosses,
        warnings,
    })
}
