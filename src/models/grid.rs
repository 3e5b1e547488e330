use image::DynamicImage;
use serde::Serialize;
use std::fmt;

use crate::error::{CarrierError, Result};

/// Number of grid cells along each axis
pub const GRID_CELLS: usize = 4;
/// Number of grid lines along each axis (cells + 1)
pub const GRID_LINES: usize = GRID_CELLS + 1;
/// Number of segments produced for one carrier
pub const SEGMENT_COUNT: usize = GRID_CELLS * GRID_CELLS;

/// Image axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal (columns)
    X,
    /// Vertical (rows)
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Grid line coordinates delimiting the 4×4 segmentation.
///
/// Values are pixel coordinates in the processed carrier image and may fall
/// outside it; segment extraction clips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpec {
    /// Column boundaries, left to right
    pub x_grid: [i64; GRID_LINES],
    /// Row boundaries, top to bottom
    pub y_grid: [i64; GRID_LINES],
}

impl GridSpec {
    /// Grid lines along one axis
    pub fn lines(&self, axis: Axis) -> &[i64; GRID_LINES] {
        match axis {
            Axis::X => &self.x_grid,
            Axis::Y => &self.y_grid,
        }
    }

    /// First axis (x before y) whose lines are not strictly increasing
    pub fn unordered_axis(&self) -> Option<Axis> {
        [Axis::X, Axis::Y]
            .into_iter()
            .find(|&axis| !self.lines(axis).windows(2).all(|w| w[0] < w[1]))
    }

    /// Pixel ranges `((x0, x1), (y0, y1))` of one cell clipped to an image of
    /// `width × height`. Ranges are half-open and never inverted.
    pub fn cell_bounds(
        &self,
        row: usize,
        col: usize,
        width: u32,
        height: u32,
    ) -> ((u32, u32), (u32, u32)) {
        (
            clip_range(self.x_grid[col], self.x_grid[col + 1], width),
            clip_range(self.y_grid[row], self.y_grid[row + 1], height),
        )
    }
}

fn clip_range(start: i64, end: i64, limit: u32) -> (u32, u32) {
    let start = start.clamp(0, limit as i64) as u32;
    let end = end.clamp(0, limit as i64) as u32;
    (start, end.max(start))
}

/// Well label for a row-major segment index: `0 -> "A1"`, `15 -> "D4"`.
pub fn well_label(index: usize) -> Result<String> {
    if index >= SEGMENT_COUNT {
        return Err(CarrierError::WellIndex(index));
    }
    let row = (b'A' + (index / GRID_CELLS) as u8) as char;
    let col = index % GRID_CELLS + 1;
    Ok(format!("{row}{col}"))
}

/// Metadata recorded alongside every extracted segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentInfo {
    /// Grid row, 0..4
    pub row: usize,
    /// Grid column, 0..4
    pub col: usize,
    /// Well label (`A1`..`D4`)
    pub well: String,
    /// Half-open column range in the processed image
    pub x_range: (u32, u32),
    /// Half-open row range in the processed image
    pub y_range: (u32, u32),
    /// `(height, width, channels)` of the segment
    pub shape: (u32, u32, u8),
}

/// One of the 16 rectangular specimen sub-images
#[derive(Debug, Clone)]
pub struct Segment {
    /// Position and size metadata
    pub info: SegmentInfo,
    /// The pixels, cut from the processed carrier image
    pub image: DynamicImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_labels() {
        assert_eq!(well_label(0).unwrap(), "A1");
        assert_eq!(well_label(3).unwrap(), "A4");
        assert_eq!(well_label(4).unwrap(), "B1");
        assert_eq!(well_label(15).unwrap(), "D4");
        assert!(matches!(well_label(16), Err(CarrierError::WellIndex(16))));
    }

    #[test]
    fn test_cell_bounds_clip_to_image() {
        let grid = GridSpec {
            x_grid: [-50, 100, 200, 300, 450],
            y_grid: [0, 10, 20, 30, 40],
        };
        assert_eq!(grid.cell_bounds(0, 0, 400, 35), ((0, 100), (0, 10)));
        assert_eq!(grid.cell_bounds(3, 3, 400, 35), ((300, 400), (30, 35)));
        // A cell entirely outside the image collapses instead of inverting
        assert_eq!(grid.cell_bounds(3, 3, 250, 25), ((250, 250), (25, 25)));
    }

    #[test]
    fn test_unordered_axis() {
        let mut grid = GridSpec {
            x_grid: [0, 1, 2, 3, 4],
            y_grid: [0, 1, 2, 3, 4],
        };
        assert_eq!(grid.unordered_axis(), None);
        grid.y_grid[2] = 1;
        assert_eq!(grid.unordered_axis(), Some(Axis::Y));
        grid.x_grid[4] = 3;
        assert_eq!(grid.unordered_axis(), Some(Axis::X));
    }
}
