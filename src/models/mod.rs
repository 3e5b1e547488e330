pub mod grid;
pub mod marks;
pub mod mask;

pub use grid::{Axis, GRID_CELLS, GRID_LINES, GridSpec, SEGMENT_COUNT, Segment, SegmentInfo, well_label};
pub use marks::{CrossMark, Peak};
pub use mask::BinaryMask;
