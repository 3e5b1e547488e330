//! Writing a segmentation to disk: one PNG per well, an overlay and a
//! `segments.json` metadata document.

use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detector::frame::CropBox;
use crate::detector::tilt::TiltEstimate;
use crate::error::{CarrierWarning, Result};
use crate::models::{CrossMark, GridSpec, SegmentInfo};
use crate::pipeline::CarrierSegmentation;
use crate::tools::overlay::render_overlay;

/// Metadata file written next to the segment images
pub const METADATA_FILE: &str = "segments.json";
/// Overlay image written next to the segment images
pub const OVERLAY_FILE: &str = "overlay.png";

/// Serializable summary of one segmentation
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationReport {
    /// Identifier of the source photograph
    pub image: String,
    /// `(width, height)` of the processed carrier image
    pub processed_size: (u32, u32),
    pub crop: CropBox,
    pub tilt: Option<TiltEstimate>,
    /// Marker row centers
    pub rows: Vec<usize>,
    pub crosses: Vec<CrossMark>,
    pub grid: GridSpec,
    pub segments: Vec<SegmentInfo>,
    pub warnings: Vec<CarrierWarning>,
}

impl SegmentationReport {
    /// Summarize `result` for the photograph identified by `image`
    pub fn new(image: &str, result: &CarrierSegmentation) -> Self {
        Self {
            image: image.to_string(),
            processed_size: (result.image.width(), result.image.height()),
            crop: result.crop,
            tilt: result.tilt,
            rows: result.rows.rows.clone(),
            crosses: result.crosses.crosses.clone(),
            grid: result.grid,
            segments: result.segments.iter().map(|s| s.info.clone()).collect(),
            warnings: result.warnings.clone(),
        }
    }
}

/// Write `<well>.png` for every segment plus the overlay and metadata into
/// `out_dir`, creating it if needed. Returns the paths written.
pub fn export_segmentation(
    image: &str,
    result: &CarrierSegmentation,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(result.segments.len() + 2);

    for segment in &result.segments {
        // Cells clipped away entirely have nothing to encode
        if segment.image.width() == 0 || segment.image.height() == 0 {
            continue;
        }
        let path = out_dir.join(format!("{}.png", segment.info.well));
        segment.image.save(&path)?;
        written.push(path);
    }

    let overlay_path = out_dir.join(OVERLAY_FILE);
    render_overlay(&result.image, &result.grid, &result.crosses.crosses).save(&overlay_path)?;
    written.push(overlay_path);

    let report = SegmentationReport::new(image, result);
    let metadata_path = out_dir.join(METADATA_FILE);
    fs::write(&metadata_path, serde_json::to_vec_pretty(&report)?)?;
    written.push(metadata_path);

    info!("export: {} files written to {}", written.len(), out_dir.display());
    Ok(written)
}
