//! Cross mark search along the located marker rows.
//!
//! A square probe with a plus-shaped active region slides horizontally over
//! each row. Only the plus-shaped pixels are scored, so the blank field
//! around a mark does not dilute the response.

use image::GrayImage;
use log::{debug, warn};
use rayon::prelude::*;

use crate::config::CrossParams;
use crate::error::CarrierWarning;
use crate::models::{BinaryMask, CrossMark};
use crate::utils::integral::IntegralImage;
use crate::utils::peaks::{find_peaks, strongest};

/// Number of crosses expected in every marker row
pub const CROSSES_PER_ROW: usize = 3;

/// Geometry of the plus-shaped probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossProbe {
    size: usize,
    arm_start: usize,
    arm_end: usize,
}

impl CrossProbe {
    /// Probe of side `size` with arms spanning `[size/2 - width/2, size/2 + width/2)`
    pub fn new(size: usize, width: usize) -> Self {
        let center = size / 2;
        let half_width = (width / 2).min(center);
        Self {
            size,
            arm_start: center - half_width,
            arm_end: (center + half_width).min(size),
        }
    }

    /// Side of the square probe
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of active pixels
    pub fn pixel_count(&self) -> usize {
        let arm = self.arm_end - self.arm_start;
        2 * arm * self.size - arm * arm
    }

    /// The probe as a boolean mask
    pub fn mask(&self) -> BinaryMask {
        let arm = self.arm_start..self.arm_end;
        BinaryMask::from_fn(self.size, self.size, |x, y| arm.contains(&x) || arm.contains(&y))
    }

    /// Mean intensity in [0, 1] under the active pixels with the probe's
    /// top-left corner at `(left, top)`. The probe must lie inside the image.
    pub fn score(&self, integral: &IntegralImage, left: usize, top: usize) -> f64 {
        let count = self.pixel_count();
        if count == 0 {
            return 0.0;
        }
        let (a0, a1) = (self.arm_start, self.arm_end);
        let vertical = integral.rect_sum(left + a0, top, left + a1, top + self.size);
        let horizontal = integral.rect_sum(left, top + a0, left + self.size, top + a1);
        let overlap = integral.rect_sum(left + a0, top + a0, left + a1, top + a1);
        (vertical + horizontal - overlap) as f64 / (count as f64 * 255.0)
    }
}

/// Crosses found in one marker row
#[derive(Debug, Clone)]
pub struct RowCrosses {
    /// Row center the probe was aligned to
    pub row_y: usize,
    /// Up to three crosses, ascending x
    pub crosses: Vec<CrossMark>,
    /// Score for every probe offset `0..=width - cross_size`
    pub profile: Vec<f64>,
}

/// Result of the cross search over all rows
#[derive(Debug, Clone, Default)]
pub struct CrossSearch {
    /// All kept crosses, sorted by y then x
    pub crosses: Vec<CrossMark>,
    /// Per-row results for the rows the probe fit in
    pub rows: Vec<RowCrosses>,
    /// Rows skipped because the probe left the image
    pub warnings: Vec<CarrierWarning>,
}

/// Probe score at every horizontal offset for a probe whose top edge is `top`
pub fn cross_profile(integral: &IntegralImage, probe: &CrossProbe, top: usize) -> Vec<f64> {
    let size = probe.size();
    if size == 0 || integral.width() < size || top + size > integral.height() {
        return Vec::new();
    }
    (0..=integral.width() - size)
        .map(|left| probe.score(integral, left, top))
        .collect()
}

fn search_row(
    integral: &IntegralImage,
    probe: &CrossProbe,
    row_y: usize,
    params: &CrossParams,
) -> Option<RowCrosses> {
    let half = probe.size() / 2;
    let top = row_y.checked_sub(half)?;
    if top + probe.size() > integral.height() {
        return None;
    }

    let profile = cross_profile(integral, probe, top);
    let candidates = find_peaks(&profile, params.peak_height, params.peak_distance);

    let mut kept = strongest(&candidates, CROSSES_PER_ROW);
    kept.sort_by_key(|p| p.index);
    let crosses = kept
        .iter()
        .map(|p| CrossMark::new(p.index + half, row_y, p.height))
        .collect();

    Some(RowCrosses {
        row_y,
        crosses,
        profile,
    })
}

/// Locate up to three crosses in each marker row
pub fn locate_crosses(gray: &GrayImage, rows: &[usize], params: &CrossParams) -> CrossSearch {
    locate_crosses_in(&IntegralImage::new(gray), rows, params)
}

/// Same as [`locate_crosses`] over a precomputed summed-area table.
///
/// Rows are searched in parallel; the combined result is sorted row-major
/// once every row has finished.
pub fn locate_crosses_in(integral: &IntegralImage, rows: &[usize], params: &CrossParams) -> CrossSearch {
    let probe = CrossProbe::new(params.cross_size, params.cross_width);

    let outcomes: Vec<(usize, Option<RowCrosses>)> = rows
        .par_iter()
        .map(|&row_y| (row_y, search_row(integral, &probe, row_y, params)))
        .collect();

    let mut search = CrossSearch::default();
    for (row_y, outcome) in outcomes {
        match outcome {
            Some(row) => {
                debug!("crosses: row y={} -> {} crosses", row_y, row.crosses.len());
                search.crosses.extend_from_slice(&row.crosses);
                search.rows.push(row);
            }
            None => {
                let warning = CarrierWarning::CrossOutOfBounds { row_y };
                warn!("{}", warning);
                search.warnings.push(warning);
            }
        }
    }

    search.crosses.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));
    search
}
