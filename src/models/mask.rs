/// Bit-packed boolean mask with the same width/height as the image it was
/// thresholded from. `true` marks a pixel darker than the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Create an all-false mask with the given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Build a mask by evaluating `predicate` on every pixel in row-major order
    pub fn from_fn<F>(width: usize, height: usize, mut predicate: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if predicate(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Mask width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y); out-of-range coordinates read as false
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Set bit at (x, y); out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// Number of set pixels
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// True when no pixel is set
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Inclusive bounding box `(left, top, right, bottom)` of the set pixels,
    /// i.e. the first/last column and row that contain any set pixel.
    pub fn bounding_box(&self) -> Option<(usize, usize, usize, usize)> {
        let mut left = usize::MAX;
        let mut top = usize::MAX;
        let mut right = 0usize;
        let mut bottom = 0usize;
        let mut any = false;

        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(x, y) {
                    continue;
                }
                any = true;
                left = left.min(x);
                right = right.max(x);
                top = top.min(y);
                bottom = bottom.max(y);
            }
        }

        any.then_some((left, top, right, bottom))
    }
}

impl Default for BinaryMask {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
