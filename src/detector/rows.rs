//! Marker row search.
//!
//! A horizontal band slides down the image and every position is scored by
//! `1 − mean|g − 1|`, the band's closeness to white. Rows that carry the
//! alignment crosses (bright gaps between specimens) show up as peaks.

use image::GrayImage;
use log::{debug, info};

use crate::config::RowParams;
use crate::error::{CalibrationFailure, Result};
use crate::models::Peak;
use crate::utils::integral::IntegralImage;
use crate::utils::peaks::{find_peaks, strongest};

/// Number of marker rows on a carrier
pub const MARKER_ROWS: usize = 3;

/// Result of the row search
#[derive(Debug, Clone)]
pub struct RowSearch {
    /// Band-center y of each marker row, ascending
    pub rows: Vec<usize>,
    /// The selected peaks (band-top indices into `profile`), ascending
    pub peaks: Vec<Peak>,
    /// Score for every band-top position `0..=height - bar_height`
    pub profile: Vec<f64>,
}

/// Band score for every vertical offset
pub fn row_profile(integral: &IntegralImage, bar_height: usize, bar_width: usize) -> Vec<f64> {
    let width = integral.width();
    let height = integral.height();
    if bar_height == 0 || height < bar_height {
        return Vec::new();
    }

    let x_center = width / 2;
    let x_start = x_center.saturating_sub(bar_width / 2);
    let x_end = (x_center + bar_width / 2).min(width);

    // With g in [0, 1], 1 - mean|g - 1| is the band's mean intensity
    (0..=height - bar_height)
        .map(|y| integral.rect_mean(x_start, y, x_end, y + bar_height))
        .collect()
}

/// Find the three marker rows in a grayscale carrier image
pub fn locate_rows(gray: &GrayImage, params: &RowParams) -> Result<RowSearch> {
    locate_rows_in(&IntegralImage::new(gray), params)
}

/// Same as [`locate_rows`] over a precomputed summed-area table
pub fn locate_rows_in(integral: &IntegralImage, params: &RowParams) -> Result<RowSearch> {
    let profile = row_profile(integral, params.bar_height, params.bar_width);
    let all_peaks = find_peaks(&profile, params.peak_height, params.peak_distance);

    let in_window: Vec<Peak> = all_peaks
        .iter()
        .copied()
        .filter(|p| p.index >= params.middle_start && p.index <= params.middle_end)
        .collect();
    debug!(
        "rows: {} peaks, {} inside [{}, {}]",
        all_peaks.len(),
        in_window.len(),
        params.middle_start,
        params.middle_end
    );

    if in_window.len() < MARKER_ROWS {
        return Err(CalibrationFailure::TooFewRows {
            found: in_window.len(),
        }
        .into());
    }

    // Strongest first, then back into position order
    let mut peaks = strongest(&in_window, MARKER_ROWS);
    peaks.sort_by_key(|p| p.index);

    let rows: Vec<usize> = peaks.iter().map(|p| p.index + params.bar_height / 2).collect();
    info!("rows: marker rows at y={:?}", rows);

    Ok(RowSearch {
        rows,
        peaks,
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CarrierError;
    use image::Luma;

    /// Mid-gray image with horizontal stripes `(center, half_height, value)`
    fn striped(stripes: &[(u32, u32, u8)]) -> GrayImage {
        GrayImage::from_fn(300, 1000, |_, y| {
            for &(center, half, value) in stripes {
                if y + half >= center && y < center + half {
                    return Luma([value]);
                }
            }
            Luma([102])
        })
    }

    fn params() -> RowParams {
        RowParams {
            bar_height: 4,
            bar_width: 200,
            peak_height: 0.6,
            peak_distance: 40,
            middle_start: 100,
            middle_end: 850,
        }
    }

    #[test]
    fn test_finds_three_rows() {
        let gray = striped(&[(200, 6, 255), (400, 6, 255), (600, 6, 255)]);
        let search = locate_rows(&gray, &params()).unwrap();
        assert_eq!(search.rows, vec![200, 400, 600]);
        assert_eq!(search.profile.len(), 1000 - 4 + 1);
        assert!(search.peaks.iter().all(|p| p.height == 1.0));
    }

    #[test]
    fn test_window_excludes_border_rows() {
        // Bright rows at 50 and 950 lie outside the search window
        let gray = striped(&[(50, 6, 255), (200, 6, 255), (400, 6, 255), (600, 6, 255), (950, 6, 255)]);
        let search = locate_rows(&gray, &params()).unwrap();
        assert_eq!(search.rows, vec![200, 400, 600]);
    }

    #[test]
    fn test_weakest_candidate_is_dropped() {
        // A dimmer fourth row inside the window loses the ranking, and the
        // survivors come back in position order
        let gray = striped(&[(200, 6, 255), (300, 6, 180), (500, 6, 250), (700, 6, 255)]);
        let search = locate_rows(&gray, &params()).unwrap();
        assert_eq!(search.rows, vec![200, 500, 700]);
    }

    #[test]
    fn test_two_rows_is_calibration_error() {
        let gray = striped(&[(200, 6, 255), (400, 6, 255)]);
        let err = locate_rows(&gray, &params()).unwrap_err();
        assert!(matches!(
            err,
            CarrierError::Calibration(CalibrationFailure::TooFewRows { found: 2 })
        ));
    }

    #[test]
    fn test_search_is_idempotent() {
        let gray = striped(&[(200, 6, 255), (300, 6, 180), (500, 6, 250), (700, 6, 255)]);
        let first = locate_rows(&gray, &params()).unwrap();
        let second = locate_rows(&gray, &params()).unwrap();
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.peaks, second.peaks);
    }

    #[test]
    fn test_image_shorter_than_band() {
        let gray = GrayImage::from_pixel(10, 3, Luma([255]));
        assert!(row_profile(&IntegralImage::new(&gray), 4, 10).is_empty());
    }
}
