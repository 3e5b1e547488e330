//! Holder frame isolation.
//!
//! The dark holder is assumed to be the only large dark feature in the
//! photograph. Pixels darker than the threshold form a mask, small
//! components are discarded as noise, and the image is cropped to the
//! bounding box of what remains.

use image::{DynamicImage, GrayImage};
use log::{debug, info};
use serde::Serialize;

use crate::config::{FrameParams, TiltParams};
use crate::detector::tilt::{TiltEstimate, correct_tilt, estimate_tilt};
use crate::error::{CarrierError, Result};
use crate::models::BinaryMask;
use crate::utils::components::remove_small_objects;
use crate::utils::grayscale::{normalized, to_grayscale};

/// Crop rectangle in the coordinates of the input photograph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Carrier interior cut out of the photograph
#[derive(Debug, Clone)]
pub struct IsolatedCarrier {
    /// Cropped (and, if requested, tilt-corrected) image
    pub image: DynamicImage,
    /// Where the crop came from
    pub crop: CropBox,
    /// Tilt estimate, present only when rotation was requested
    pub tilt: Option<TiltEstimate>,
}

/// Pixels strictly darker than `threshold` (normalized intensity)
pub fn holder_mask(gray: &GrayImage, threshold: f32) -> BinaryMask {
    BinaryMask::from_fn(gray.width() as usize, gray.height() as usize, |x, y| {
        normalized(gray.get_pixel(x as u32, y as u32).0[0]) < threshold
    })
}

/// Bounding box of the holder silhouette
pub fn find_holder(gray: &GrayImage, threshold: f32, max_object_size: usize) -> Result<CropBox> {
    let mask = holder_mask(gray, threshold);
    debug!("frame: {} pixels below threshold {}", mask.count_ones(), threshold);

    let cleaned = remove_small_objects(&mask, max_object_size);
    let (left, top, right, bottom) = cleaned.bounding_box().ok_or(CarrierError::EmptyMask {
        threshold,
        max_object_size,
    })?;

    Ok(CropBox {
        left: left as u32,
        top: top as u32,
        width: (right - left + 1) as u32,
        height: (bottom - top + 1) as u32,
    })
}

/// Crop `image` to the holder frame, optionally correcting its tilt.
///
/// Fails with [`CarrierError::EmptyMask`] when nothing dark and large
/// enough is found; the full image is never returned as a fallback.
pub fn isolate(image: &DynamicImage, frame: &FrameParams, tilt: &TiltParams) -> Result<IsolatedCarrier> {
    let gray = to_grayscale(image);
    let crop = find_holder(&gray, frame.threshold, frame.max_object_size)?;
    info!(
        "frame: crop {}x{} at ({}, {})",
        crop.width, crop.height, crop.left, crop.top
    );

    let cropped = image.crop_imm(crop.left, crop.top, crop.width, crop.height);
    if !frame.rotate {
        return Ok(IsolatedCarrier {
            image: cropped,
            crop,
            tilt: None,
        });
    }

    let estimate = estimate_tilt(image, tilt)?;
    if !estimate.is_found() {
        info!("frame: no holder edge within tilt tolerance, crop left unrotated");
    }
    let rotated = correct_tilt(&cropped, estimate.radians_or_zero());
    Ok(IsolatedCarrier {
        image: rotated,
        crop,
        tilt: Some(estimate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// White image with a dark rectangular ring `[x0, x1) × [y0, y1)` of the given thickness
    fn framed(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32, thickness: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let inside_outer = x >= x0 && x < x1 && y >= y0 && y < y1;
            let inside_inner = x >= x0 + thickness
                && x + thickness < x1
                && y >= y0 + thickness
                && y + thickness < y1;
            if inside_outer && !inside_inner {
                Luma([10])
            } else {
                Luma([250])
            }
        })
    }

    #[test]
    fn test_find_holder_bounding_box() {
        let gray = framed(200, 150, 20, 15, 180, 140, 6);
        let crop = find_holder(&gray, 0.31, 50).unwrap();
        assert_eq!(
            crop,
            CropBox {
                left: 20,
                top: 15,
                width: 160,
                height: 125
            }
        );
    }

    #[test]
    fn test_small_specks_are_ignored() {
        let mut gray = framed(200, 150, 20, 15, 180, 140, 6);
        // A dark speck outside the frame must not widen the crop
        for (x, y) in [(2, 2), (3, 2), (2, 3)] {
            gray.put_pixel(x, y, Luma([0]));
        }
        let crop = find_holder(&gray, 0.31, 50).unwrap();
        assert_eq!((crop.left, crop.top), (20, 15));
    }

    #[test]
    fn test_bright_image_is_empty_mask() {
        let gray = GrayImage::from_pixel(100, 100, Luma([200]));
        let err = find_holder(&gray, 0.31, 500).unwrap_err();
        assert!(matches!(err, CarrierError::EmptyMask { .. }));
    }

    #[test]
    fn test_undersized_frame_is_empty_mask() {
        // The whole ring has fewer pixels than max_object_size
        let gray = framed(60, 60, 10, 10, 30, 30, 2);
        let err = find_holder(&gray, 0.31, 500).unwrap_err();
        assert!(matches!(err, CarrierError::EmptyMask { .. }));
    }

    #[test]
    fn test_isolate_crops_without_rotation() {
        let image = DynamicImage::ImageLuma8(framed(200, 150, 20, 15, 180, 140, 6));
        let frame = FrameParams {
            max_object_size: 50,
            ..Default::default()
        };
        let isolated = isolate(&image, &frame, &TiltParams::default()).unwrap();
        assert_eq!((isolated.image.width(), isolated.image.height()), (160, 125));
        assert!(isolated.tilt.is_none());
        // The crop starts on the frame itself
        assert_eq!(to_grayscale(&isolated.image).get_pixel(0, 0).0[0], 10);
    }

    #[test]
    fn test_isolate_with_rotation_reports_tilt() {
        let image = DynamicImage::ImageLuma8(framed(200, 150, 20, 15, 180, 140, 6));
        let frame = FrameParams {
            max_object_size: 50,
            rotate: true,
            ..Default::default()
        };
        let isolated = isolate(&image, &frame, &TiltParams::default()).unwrap();
        let Some(TiltEstimate::Found(tilt)) = isolated.tilt else {
            panic!("expected a tilt estimate");
        };
        assert!(tilt.degrees.abs() <= 0.25);
        assert_eq!((isolated.image.width(), isolated.image.height()), (160, 125));
    }

    #[test]
    fn test_isolate_without_tilt_estimate_keeps_crop() {
        let image = DynamicImage::ImageLuma8(framed(200, 150, 20, 15, 180, 140, 6));
        let frame = FrameParams {
            max_object_size: 50,
            rotate: true,
            ..Default::default()
        };
        // No line can be strictly within zero degrees of vertical
        let tilt = TiltParams {
            vertical_angle_tolerance_deg: 0.0,
            ..Default::default()
        };
        let isolated = isolate(&image, &frame, &tilt).unwrap();
        let estimate = isolated.tilt.expect("rotation was requested");
        assert!(!estimate.is_found());
        assert_eq!(isolated.image, image.crop_imm(20, 15, 160, 125));
    }
}
