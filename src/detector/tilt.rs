//! Carrier tilt estimation and correction.
//!
//! The strongest straight edges of the photograph are found with a Hough
//! transform over a Canny edge map. Among the `num_lines` strongest lines,
//! those within the vertical tolerance are kept and the one closest to
//! exactly vertical wins: true carrier edges dominate the votes and a
//! near-exact alignment beats an off-angle line with more votes.

use image::{DynamicImage, GrayImage, Luma, Rgb, Rgba};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use log::{debug, info};
use serde::Serialize;

use crate::config::TiltParams;
use crate::error::{CarrierError, Result};
use crate::utils::grayscale::to_grayscale;
use crate::utils::hough::{HoughAccumulator, PeakOptions};

/// Rotation of the carrier's vertical edge relative to the image columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tilt {
    /// Angle of the edge normal from the x axis, in degrees
    pub degrees: f64,
    /// Same angle in radians
    pub radians: f64,
    /// Signed distance of the detected edge line from the image origin
    pub line_offset: f64,
    /// Hough votes of the detected edge
    pub votes: u32,
}

/// Outcome of tilt estimation. `NotFound` means no near-vertical edge was
/// detected; callers treat it as zero tilt rather than as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TiltEstimate {
    Found(Tilt),
    NotFound,
}

impl TiltEstimate {
    /// Correction angle in radians; zero when no edge was found
    pub fn radians_or_zero(&self) -> f64 {
        match self {
            Self::Found(tilt) => tilt.radians,
            Self::NotFound => 0.0,
        }
    }

    /// Whether an edge within the tilt tolerance was detected
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Canny edge map after the two-stage Gaussian smoothing.
///
/// `imageproc`'s Canny applies its own fixed pre-blur on top of
/// `canny_sigma`; thresholds are given as fractions of full scale and
/// rescaled to 8-bit gradient units here.
pub fn edge_map(gray: &GrayImage, params: &TiltParams) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, params.gaussian_sigma);
    let smoothed = gaussian_blur_f32(&blurred, params.canny_sigma);
    canny(&smoothed, params.canny_low * 255.0, params.canny_high * 255.0)
}

/// Estimate the carrier tilt from its dominant near-vertical edge
pub fn estimate_tilt(image: &DynamicImage, params: &TiltParams) -> Result<TiltEstimate> {
    let gray = to_grayscale(image);
    let edges = edge_map(&gray, params);

    let acc = HoughAccumulator::from_edges(&edges, params.angle_resolution_deg.to_radians())
        .ok_or_else(|| {
            CarrierError::InvalidConfig(format!(
                "hough accumulator too large for {}x{} at {}° resolution",
                gray.width(),
                gray.height(),
                params.angle_resolution_deg
            ))
        })?;

    let lines = acc.peaks(&PeakOptions {
        num_peaks: params.num_lines,
        min_distance: params.peak_min_distance,
        min_angle: params.peak_min_angle_deg.to_radians(),
        threshold_ratio: params.vote_threshold_ratio,
    });
    debug!("tilt: {} hough lines inspected", lines.len());

    let mut best: Option<Tilt> = None;
    for line in &lines {
        let degrees = line.angle.to_degrees();
        if degrees.abs() >= params.vertical_angle_tolerance_deg {
            continue;
        }
        let closer = best.is_none_or(|b| line.angle.abs() < b.radians.abs());
        if closer {
            best = Some(Tilt {
                degrees,
                radians: line.angle,
                line_offset: line.rho,
                votes: line.votes,
            });
        }
    }

    match best {
        Some(tilt) => {
            info!(
                "tilt: {:.2}° (offset {:.1}px, {} votes)",
                tilt.degrees, tilt.line_offset, tilt.votes
            );
            Ok(TiltEstimate::Found(tilt))
        }
        None => {
            info!(
                "tilt: no line within {}° of vertical",
                params.vertical_angle_tolerance_deg
            );
            Ok(TiltEstimate::NotFound)
        }
    }
}

/// Rotate `image` about its center so that an edge with the given tilt
/// becomes vertical. The output keeps the input size; uncovered corners are
/// filled with black.
pub fn correct_tilt(image: &DynamicImage, tilt_radians: f64) -> DynamicImage {
    if tilt_radians == 0.0 {
        return image.clone();
    }
    // imageproc rotates clockwise on screen; undoing the tilt needs the
    // opposite sense.
    let theta = -tilt_radians as f32;
    let interpolation = Interpolation::Bilinear;

    match image {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(rotate_about_center(gray, theta, interpolation, Luma([0])))
        }
        DynamicImage::ImageRgba8(rgba) => DynamicImage::ImageRgba8(rotate_about_center(
            rgba,
            theta,
            interpolation,
            Rgba([0, 0, 0, 255]),
        )),
        other => {
            let rgb = other.to_rgb8();
            DynamicImage::ImageRgb8(rotate_about_center(&rgb, theta, interpolation, Rgb([0, 0, 0])))
        }
    }
}
