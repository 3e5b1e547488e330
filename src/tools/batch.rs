//! Directory batches: segment every carrier photograph under a root and
//! report per-image outcomes without stopping at the first failure.

use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::CarrierConfig;
use crate::error::Result;
use crate::pipeline::{CarrierSegmentation, segment_carrier};
use crate::tools::export::export_segmentation;
use crate::tools::{collect_images, image_id, load_image};

/// What happened to one image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Segmented { segments: usize, warnings: usize },
    Failed { error: String },
}

/// One line of a batch report
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub image: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Outcomes for every image in a batch, in path order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Number of images segmented
    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, BatchOutcome::Segmented { .. }))
            .count()
    }

    /// Entries that failed
    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, BatchOutcome::Failed { .. }))
    }
}

/// Load and segment one file; when `out_dir` is given the results go to
/// `out_dir/<image id>/`.
pub fn process_file(
    path: &Path,
    config: &CarrierConfig,
    out_dir: Option<&Path>,
) -> Result<CarrierSegmentation> {
    let image = load_image(path)?;
    let result = segment_carrier(&image, config)?;
    if let Some(out_dir) = out_dir {
        let id = image_id(path);
        export_segmentation(&id, &result, &out_dir.join(&id))?;
    }
    Ok(result)
}

/// Segment every image below `root`
pub fn process_batch(root: &Path, config: &CarrierConfig, out_dir: Option<&Path>) -> Result<BatchReport> {
    config.validate()?;
    let images = collect_images(root)?;
    info!("batch: {} images under {}", images.len(), root.display());

    let mut report = BatchReport::default();
    for path in images {
        let image = image_id(&path);
        let outcome = match process_file(&path, config, out_dir) {
            Ok(result) => BatchOutcome::Segmented {
                segments: result.segments.len(),
                warnings: result.warnings.len(),
            },
            Err(err) => {
                warn!("batch: {}: {}", image, err);
                BatchOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        report.entries.push(BatchEntry {
            image,
            path,
            outcome,
        });
    }

    info!(
        "batch: {} of {} segmented",
        report.succeeded(),
        report.entries.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::synthetic::SyntheticCarrier;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_batch_reports_each_image() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let (root, out) = (input.path(), output.path());
        let carrier = SyntheticCarrier::scaled(5);
        carrier.render().save(root.join("carrier_a.png")).unwrap();
        RgbImage::from_pixel(200, 150, Rgb([255, 255, 255]))
            .save(root.join("blank.png"))
            .unwrap();
        fs::write(root.join("notes.txt"), b"not an image").unwrap();

        let report = process_batch(root, &carrier.config(), Some(out)).unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.succeeded(), 1);
        let failures: Vec<&BatchEntry> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].image, "blank");
        let BatchOutcome::Failed { error } = &failures[0].outcome else {
            panic!("expected failure");
        };
        assert!(error.contains("no holder frame"));

        assert!(out.join("carrier_a").join("A1.png").exists());
        assert!(out.join("carrier_a").join("D4.png").exists());
        assert!(out.join("carrier_a").join("segments.json").exists());
        assert!(!out.join("blank").exists());
    }
}
