//! Carrier calibration stages
//!
//! Each stage consumes the previous stage's output:
//! - Frame isolation (dark holder silhouette and crop)
//! - Tilt estimation and correction (Hough lines near vertical)
//! - Marker row search (horizontal band sweep)
//! - Cross search (plus-shaped probe sweep along each row)
//! - Grid extrapolation and segment extraction

/// Plus-shaped probe sweep along the marker rows
pub mod crosses;
/// Holder frame thresholding, cleanup and crop
pub mod frame;
/// 3×3 reference pattern to 4×4 grid and segments
pub mod grid;
/// Horizontal band sweep for the three marker rows
pub mod rows;
/// Near-vertical line detection and rotation
pub mod tilt;

pub use crosses::{CrossProbe, CrossSearch, RowCrosses, locate_crosses};
pub use frame::{CropBox, IsolatedCarrier, isolate};
pub use grid::{SegmentGrid, build_grid};
pub use rows::{RowSearch, locate_rows};
pub use tilt::{Tilt, TiltEstimate, correct_tilt, estimate_tilt};
