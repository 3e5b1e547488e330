//! carrier_grid - automatic segmentation of thin-film sample carriers
//!
//! A carrier photograph shows a dark holder frame around a tray of up to
//! 16 specimens laid out 4×4, with three rows of alignment crosses formed
//! by the gaps between them. [`segment_carrier`] finds the holder, optionally
//! straightens it, locates the nine reference crosses and cuts the image
//! into 16 per-specimen segments with their pixel ranges.
//!
//! ```no_run
//! use carrier_grid::{CarrierConfig, segment_carrier};
//!
//! let photo = image::open("carrier.jpg")?;
//! let result = segment_carrier(&photo, &CarrierConfig::default())?;
//! for segment in &result.segments {
//!     println!("{} {:?} {:?}", segment.info.well, segment.info.x_range, segment.info.y_range);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Tuning parameters and JSON loading
pub mod config;
/// Pipeline stages: frame, tilt, rows, crosses, grid
pub mod detector;
/// Fatal errors and non-fatal warnings
pub mod error;
/// Core data structures (GridSpec, Segment, CrossMark, BinaryMask)
pub mod models;
/// End-to-end composition of the stages
pub mod pipeline;
/// Loading, export, overlays, batches and synthetic carriers
pub mod tools;
/// Numeric kernels (grayscale, summed-area tables, peaks, components, Hough)
pub mod utils;

pub use config::{CarrierConfig, load_config};
pub use error::{CalibrationFailure, CarrierError, CarrierWarning, Result};
pub use models::{Axis, CrossMark, GridSpec, Segment, SegmentInfo, well_label};
pub use pipeline::{CarrierSegmentation, segment_carrier};
