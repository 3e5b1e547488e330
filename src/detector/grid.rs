//! Grid extrapolation from the 3×3 cross pattern and segment extraction.
//!
//! The nine crosses give three reference lines per axis. The outer two are
//! assumed to be two uniform spacings apart, and one more line is added a
//! spacing beyond each of them, giving the five boundaries of a 4×4 grid.
//! Uniform spacing is an invariant of the carrier layout; the middle line is
//! only compared against it when `middle_line_tolerance` is set.

use image::{DynamicImage, GenericImageView};
use log::{debug, info, warn};

use crate::config::GridParams;
use crate::detector::crosses::CROSSES_PER_ROW;
use crate::error::{CalibrationFailure, CarrierWarning, Result};
use crate::models::{
    Axis, CrossMark, GRID_CELLS, GRID_LINES, GridSpec, Segment, SegmentInfo, well_label,
};

/// Number of crosses in the reference pattern
pub const REFERENCE_CROSSES: usize = CROSSES_PER_ROW * CROSSES_PER_ROW;

/// Grid lines plus the 16 segments cut along them
#[derive(Debug, Clone)]
pub struct SegmentGrid {
    /// Boundary coordinates in the processed image
    pub grid: GridSpec,
    /// Row-major segments, `A1` first
    pub segments: Vec<Segment>,
    pub warnings: Vec<CarrierWarning>,
}

/// Distinct row positions with the number of crosses on each, ascending
fn crosses_per_row(crosses: &[CrossMark]) -> Vec<(usize, usize)> {
    let mut ys: Vec<usize> = crosses.iter().map(|c| c.y).collect();
    ys.sort_unstable();
    let mut rows: Vec<(usize, usize)> = Vec::new();
    for y in ys {
        match rows.last_mut() {
            Some((row_y, count)) if *row_y == y => *count += 1,
            _ => rows.push((y, 1)),
        }
    }
    rows
}

/// Three reference lines from nine sorted coordinates, each the truncated
/// mean of a group of three
fn reference_lines(mut values: Vec<usize>) -> [i64; 3] {
    values.sort_unstable();
    let mut refs = [0i64; 3];
    for (slot, group) in refs.iter_mut().zip(values.chunks(CROSSES_PER_ROW)) {
        let sum: usize = group.iter().sum();
        *slot = (sum as f64 / group.len() as f64).trunc() as i64;
    }
    refs
}

fn extrapolate(refs: [i64; 3]) -> ([i64; GRID_LINES], f64) {
    let spacing = (refs[2] - refs[0]) as f64 / 2.0;
    let lines = [
        (refs[0] as f64 - spacing).trunc() as i64,
        refs[0],
        refs[1],
        refs[2],
        (refs[2] as f64 + spacing).trunc() as i64,
    ];
    (lines, spacing)
}

fn check_middle_line(
    axis: Axis,
    refs: [i64; 3],
    spacing: f64,
    tolerance: f64,
) -> Option<CarrierWarning> {
    let expected = (refs[0] + refs[2]) as f64 / 2.0;
    let actual = refs[1] as f64;
    let tolerance = tolerance * spacing.abs();
    ((actual - expected).abs() > tolerance).then_some(CarrierWarning::MiddleLineDrift {
        axis,
        expected,
        actual,
        tolerance,
    })
}

/// Compute the 5×5 grid lines from exactly nine row-major crosses
pub fn grid_from_crosses(
    crosses: &[CrossMark],
    params: &GridParams,
) -> Result<(GridSpec, Vec<CarrierWarning>)> {
    if crosses.len() != REFERENCE_CROSSES {
        // Name the short row when the crosses came from a row search
        let short_row = crosses_per_row(crosses)
            .into_iter()
            .find(|&(_, count)| count != CROSSES_PER_ROW);
        return Err(match short_row {
            Some((row_y, found)) => CalibrationFailure::RowCrossCount { row_y, found },
            None => CalibrationFailure::TooFewCrosses {
                found: crosses.len(),
            },
        }
        .into());
    }

    let y_refs = reference_lines(crosses.iter().map(|c| c.y).collect());
    let x_refs = reference_lines(crosses.iter().map(|c| c.x).collect());
    let (y_grid, y_spacing) = extrapolate(y_refs);
    let (x_grid, x_spacing) = extrapolate(x_refs);
    let grid = GridSpec { x_grid, y_grid };

    if let Some(axis) = grid.unordered_axis() {
        return Err(CalibrationFailure::DegenerateGrid { axis }.into());
    }
    debug!("grid: x spacing {:.1}, y spacing {:.1}", x_spacing, y_spacing);

    let mut warnings = Vec::new();
    if let Some(tolerance) = params.middle_line_tolerance {
        let checks = [
            check_middle_line(Axis::X, x_refs, x_spacing, tolerance),
            check_middle_line(Axis::Y, y_refs, y_spacing, tolerance),
        ];
        for warning in checks.into_iter().flatten() {
            warn!("{}", warning);
            warnings.push(warning);
        }
    }

    info!("grid: x={:?} y={:?}", grid.x_grid, grid.y_grid);
    Ok((grid, warnings))
}

/// Cut the 16 row-major segments out of `image`, clipping every cell to
/// the image bounds
pub fn extract_segments(image: &DynamicImage, grid: &GridSpec) -> Result<Vec<Segment>> {
    let (width, height) = image.dimensions();
    let channels = image.color().channel_count();

    let mut segments = Vec::with_capacity(GRID_CELLS * GRID_CELLS);
    for row in 0..GRID_CELLS {
        for col in 0..GRID_CELLS {
            let ((x0, x1), (y0, y1)) = grid.cell_bounds(row, col, width, height);
            let pixels = image.crop_imm(x0, y0, x1 - x0, y1 - y0);
            let info = SegmentInfo {
                row,
                col,
                well: well_label(row * GRID_CELLS + col)?,
                x_range: (x0, x1),
                y_range: (y0, y1),
                shape: (pixels.height(), pixels.width(), channels),
            };
            segments.push(Segment {
                info,
                image: pixels,
            });
        }
    }
    Ok(segments)
}

/// Grid lines and segments from the nine reference crosses
pub fn build_grid(
    crosses: &[CrossMark],
    image: &DynamicImage,
    params: &GridParams,
) -> Result<SegmentGrid> {
    let (grid, warnings) = grid_from_crosses(crosses, params)?;
    let segments = extract_segments(image, &grid)?;
    Ok(SegmentGrid {
        grid,
        segments,
        warnings,
    })
}
