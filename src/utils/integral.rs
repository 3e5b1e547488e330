//! Summed-area table over an 8-bit grayscale image.
//!
//! Sums are exact integers, so two windows with identical pixel content
//! always produce bit-identical means.

use image::GrayImage;

#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    /// `(width + 1) * (height + 1)` prefix sums with a zero first row/column
    sums: Vec<u64>,
}

impl IntegralImage {
    /// Build the table in one pass over the image
    pub fn new(gray: &GrayImage) -> Self {
        let width = gray.width() as usize;
        let height = gray.height() as usize;
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        let raw = gray.as_raw();

        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += raw[y * width + x] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }

        Self { width, height, sums }
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sum over the half-open rectangle `[x0, x1) × [y0, y1)`, clamped to the image
    pub fn rect_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return 0;
        }
        let stride = self.width + 1;
        self.sums[y1 * stride + x1] + self.sums[y0 * stride + x0]
            - self.sums[y0 * stride + x1]
            - self.sums[y1 * stride + x0]
    }

    /// Mean intensity in [0, 1] over the half-open rectangle
    pub fn rect_mean(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> f64 {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return 0.0;
        }
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        self.rect_sum(x0, y0, x1, y1) as f64 / (count * 255.0)
    }
}
