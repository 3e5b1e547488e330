//! Tuning parameters for the segmentation pipeline.
//!
//! Defaults were tuned for one camera setup (roughly 4000×3000 px carrier
//! photographs). Other setups should load their own values from JSON; every
//! section and field is optional and falls back to the default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CarrierError, Result};

/// Holder frame isolation (dark border detection and cropping)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameParams {
    /// Normalized intensity below which a pixel belongs to the holder
    pub threshold: f32,
    /// Dark components with at most this many pixels are treated as noise
    pub max_object_size: usize,
    /// Estimate and correct the carrier tilt after cropping
    pub rotate: bool,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            threshold: 0.31,
            max_object_size: 500,
            rotate: false,
        }
    }
}

/// Tilt estimation via Canny edges and a Hough line transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltParams {
    /// Pre-blur applied before edge detection
    pub gaussian_sigma: f32,
    /// Smoothing applied as part of edge detection
    pub canny_sigma: f32,
    /// Canny hysteresis low threshold, as a fraction of full-scale gradient
    pub canny_low: f32,
    /// Canny hysteresis high threshold, as a fraction of full-scale gradient
    pub canny_high: f32,
    /// Only lines within this many degrees of vertical are considered
    pub vertical_angle_tolerance_deg: f64,
    /// Number of strongest Hough lines inspected
    pub num_lines: usize,
    /// Angular resolution of the Hough accumulator
    pub angle_resolution_deg: f64,
    /// Hough peak suppression along ρ, in pixels
    pub peak_min_distance: usize,
    /// Hough peak suppression along θ, in degrees
    pub peak_min_angle_deg: f64,
    /// Hough peaks must reach this fraction of the strongest line's votes
    pub vote_threshold_ratio: f64,
}

impl Default for TiltParams {
    fn default() -> Self {
        Self {
            gaussian_sigma: 1.0,
            canny_sigma: 2.0,
            canny_low: 0.1,
            canny_high: 0.3,
            vertical_angle_tolerance_deg: 10.0,
            num_lines: 10,
            angle_resolution_deg: 0.25,
            peak_min_distance: 9,
            peak_min_angle_deg: 10.0,
            vote_threshold_ratio: 0.5,
        }
    }
}

/// Horizontal band sweep locating the three marker rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowParams {
    /// Band height in pixels
    pub bar_height: usize,
    /// Band width in pixels, centered on the image midline
    pub bar_width: usize,
    /// Minimum profile value for a row candidate
    pub peak_height: f64,
    /// Minimum separation between row candidates
    pub peak_distance: usize,
    /// First band position (top edge) accepted as a marker row
    pub middle_start: usize,
    /// Last band position (top edge) accepted as a marker row
    pub middle_end: usize,
}

impl Default for RowParams {
    fn default() -> Self {
        Self {
            bar_height: 20,
            bar_width: 2000,
            peak_height: 0.6,
            peak_distance: 400,
            middle_start: 500,
            middle_end: 3000,
        }
    }
}

/// Cross-shaped probe sweep locating the crosses within each row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossParams {
    /// Side of the square probe
    pub cross_size: usize,
    /// Width of the probe's arms
    pub cross_width: usize,
    /// Minimum profile value for a cross candidate
    pub peak_height: f64,
    /// Minimum separation between cross candidates
    pub peak_distance: usize,
}

impl Default for CrossParams {
    fn default() -> Self {
        Self {
            cross_size: 400,
            cross_width: 20,
            peak_height: 0.6,
            peak_distance: 400,
        }
    }
}

/// Grid extrapolation checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Allowed deviation of the middle reference line from the midpoint of
    /// the outer two, as a fraction of the spacing. `None` skips the check.
    pub middle_line_tolerance: Option<f64>,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            middle_line_tolerance: Some(0.1),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierConfig {
    pub frame: FrameParams,
    pub tilt: TiltParams,
    pub rows: RowParams,
    pub crosses: CrossParams,
    pub grid: GridParams,
}

impl CarrierConfig {
    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(CarrierError::InvalidConfig(msg));

        if !(0.0..=1.0).contains(&self.frame.threshold) {
            return invalid(format!("frame.threshold {} outside [0, 1]", self.frame.threshold));
        }
        if self.tilt.gaussian_sigma <= 0.0 || self.tilt.canny_sigma <= 0.0 {
            return invalid("tilt sigmas must be positive".to_string());
        }
        if self.tilt.canny_low > self.tilt.canny_high {
            return invalid(format!(
                "tilt.canny_low {} exceeds tilt.canny_high {}",
                self.tilt.canny_low, self.tilt.canny_high
            ));
        }
        if self.tilt.angle_resolution_deg <= 0.0 {
            return invalid("tilt.angle_resolution_deg must be positive".to_string());
        }
        if self.rows.bar_height == 0 || self.rows.bar_width == 0 {
            return invalid("rows.bar_height and rows.bar_width must be positive".to_string());
        }
        if self.rows.middle_start > self.rows.middle_end {
            return invalid(format!(
                "rows.middle_start {} exceeds rows.middle_end {}",
                self.rows.middle_start, self.rows.middle_end
            ));
        }
        if self.crosses.cross_size == 0 || self.crosses.cross_width == 0 {
            return invalid("crosses.cross_size and crosses.cross_width must be positive".to_string());
        }
        if self.crosses.cross_width > self.crosses.cross_size {
            return invalid(format!(
                "crosses.cross_width {} exceeds crosses.cross_size {}",
                self.crosses.cross_width, self.crosses.cross_size
            ));
        }
        if let Some(tolerance) = self.grid.middle_line_tolerance {
            if tolerance < 0.0 {
                return invalid("grid.middle_line_tolerance must not be negative".to_string());
            }
        }
        Ok(())
    }
}

/// Load and validate a JSON configuration file
pub fn load_config(path: &Path) -> Result<CarrierConfig> {
    let contents = fs::read_to_string(path)?;
    let config: CarrierConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
