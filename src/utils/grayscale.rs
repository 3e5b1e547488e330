/// Convert carrier photographs to 8-bit luminance
/// Y = 0.2125*R + 0.7154*G + 0.0721*B (Rec. 709 weights)
/// Uses fast integer arithmetic: Y = (54*R + 183*G + 19*B + 128) >> 8
///
/// Large images are converted row-parallel with rayon.
use image::{DynamicImage, GrayImage};
use rayon::prelude::*;

/// Coefficients for grayscale conversion; they sum to 256 so white maps to 255
const COEF_R: u32 = 54;
const COEF_G: u32 = 183;
const COEF_B: u32 = 19;

/// Pixel count above which conversion switches to the parallel path
const PARALLEL_THRESHOLD: usize = 512 * 512;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32 + 128) >> 8;
    lum.min(255) as u8
}

/// Convert interleaved pixels with `channels` samples each (RGB or RGBA) to grayscale
pub fn interleaved_to_grayscale(pixels: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    let convert_row = |(y, row): (usize, &mut [u8])| {
        let row_start = y * width * channels;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * channels;
            *out = luma(pixels[idx], pixels[idx + 1], pixels[idx + 2]);
        }
    };

    if width * height >= PARALLEL_THRESHOLD {
        gray.par_chunks_mut(width).enumerate().for_each(convert_row);
    } else {
        gray.chunks_mut(width).enumerate().for_each(convert_row);
    }

    gray
}

/// Convert RGB image bytes to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    interleaved_to_grayscale(rgb, width, height, 3)
}

/// Convert RGBA image bytes to grayscale (ignores alpha channel)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    interleaved_to_grayscale(rgba, width, height, 4)
}

/// Grayscale view of any decoded image. 8-bit gray is copied as is; 16-bit
/// and float images are reduced to 8 bits per channel first.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    let (width, height) = (image.width(), image.height());
    let data = match image {
        DynamicImage::ImageLuma8(gray) => return gray.clone(),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            return image.to_luma8();
        }
        DynamicImage::ImageRgb8(rgb) => rgb_to_grayscale(rgb.as_raw(), width as usize, height as usize),
        DynamicImage::ImageRgba8(rgba) => {
            rgba_to_grayscale(rgba.as_raw(), width as usize, height as usize)
        }
        other => {
            let rgb = other.to_rgb8();
            rgb_to_grayscale(rgb.as_raw(), width as usize, height as usize)
        }
    };
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Normalize an 8-bit intensity to [0, 1]
#[inline]
pub fn normalized(value: u8) -> f32 {
    value as f32 / 255.0
}
