//! Synthetic carrier photographs with known geometry.
//!
//! The scene is a white background, a dark rectangular holder ring, a
//! bright tray inside it and a 4×4 array of mid-gray specimens separated by
//! bright gaps. The gaps cross at the nine interior grid intersections,
//! which is what the cross search responds to. The whole scene can be
//! rotated about the photograph's center to simulate a tilted carrier.

use image::{Rgb, RgbImage};
use rayon::prelude::*;

use crate::config::CarrierConfig;
use crate::models::{GRID_CELLS, GRID_LINES, GridSpec};

/// Geometry and shading of a rendered carrier. Lengths are pixels; grid
/// offsets are relative to the holder's outer edge, so they are also
/// coordinates in the cropped carrier image.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCarrier {
    pub width: u32,
    pub height: u32,
    pub frame_left: u32,
    pub frame_top: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_thickness: u32,
    pub grid_left: u32,
    pub grid_top: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Bright margin on each side of a specimen; gaps are twice this wide
    pub gap: u32,
    /// Scene rotation in degrees, same sense as [`crate::detector::Tilt`]
    pub tilt_deg: f64,
    pub background: u8,
    pub frame_value: u8,
    pub tray_value: u8,
    pub specimen_value: u8,
}

impl Default for SyntheticCarrier {
    /// A 4000×3000 photograph at the scale the default configuration targets
    fn default() -> Self {
        Self {
            width: 4000,
            height: 3000,
            frame_left: 200,
            frame_top: 150,
            frame_width: 3500,
            frame_height: 2700,
            frame_thickness: 100,
            grid_left: 150,
            grid_top: 150,
            cell_width: 800,
            cell_height: 600,
            gap: 40,
            tilt_deg: 0.0,
            background: 255,
            frame_value: 13,
            tray_value: 255,
            specimen_value: 115,
        }
    }
}

impl SyntheticCarrier {
    /// Default carrier with every length divided by `factor`
    pub fn scaled(factor: u32) -> Self {
        let full = Self::default();
        let factor = factor.max(1);
        Self {
            width: full.width / factor,
            height: full.height / factor,
            frame_left: full.frame_left / factor,
            frame_top: full.frame_top / factor,
            frame_width: full.frame_width / factor,
            frame_height: full.frame_height / factor,
            frame_thickness: full.frame_thickness / factor,
            grid_left: full.grid_left / factor,
            grid_top: full.grid_top / factor,
            cell_width: full.cell_width / factor,
            cell_height: full.cell_height / factor,
            gap: full.gap / factor,
            ..full
        }
    }

    /// Same carrier rotated by `degrees`
    pub fn with_tilt(self, degrees: f64) -> Self {
        Self {
            tilt_deg: degrees,
            ..self
        }
    }

    /// Grid lines the segmentation should recover from the untilted image
    pub fn grid_lines(&self) -> GridSpec {
        let mut x_grid = [0i64; GRID_LINES];
        let mut y_grid = [0i64; GRID_LINES];
        for k in 0..GRID_LINES {
            x_grid[k] = (self.grid_left + k as u32 * self.cell_width) as i64;
            y_grid[k] = (self.grid_top + k as u32 * self.cell_height) as i64;
        }
        GridSpec { x_grid, y_grid }
    }

    /// Pipeline configuration tuned to this carrier's scale
    pub fn config(&self) -> CarrierConfig {
        let mut config = CarrierConfig::default();
        let probe = (self.cell_height * 2 / 3) as usize;

        config.rows.bar_height = (self.gap / 2).max(1) as usize;
        config.rows.bar_width = (self.cell_width * 5 / 2) as usize;
        config.rows.peak_distance = probe;
        // Keep the bright tray margins above the first and below the last
        // specimen row out of the window
        config.rows.middle_start = (self.grid_top + self.cell_height / 2) as usize;
        config.rows.middle_end = (self.grid_top + 3 * self.cell_height + self.cell_height / 2) as usize;

        config.crosses.cross_size = probe;
        config.crosses.cross_width = (self.gap / 2).max(1) as usize;
        config.crosses.peak_distance = probe;
        config
    }

    /// Scene value at photograph coordinates, before rotation
    fn scene(&self, x: f64, y: f64) -> u8 {
        let fx = x - self.frame_left as f64;
        let fy = y - self.frame_top as f64;
        let (fw, fh) = (self.frame_width as f64, self.frame_height as f64);
        if fx < 0.0 || fy < 0.0 || fx >= fw || fy >= fh {
            return self.background;
        }

        let t = self.frame_thickness as f64;
        if fx < t || fy < t || fx >= fw - t || fy >= fh - t {
            return self.frame_value;
        }

        let gx = fx - self.grid_left as f64;
        let gy = fy - self.grid_top as f64;
        let (cw, ch) = (self.cell_width as f64, self.cell_height as f64);
        if gx < 0.0 || gy < 0.0 || gx >= cw * GRID_CELLS as f64 || gy >= ch * GRID_CELLS as f64 {
            return self.tray_value;
        }

        let ox = gx - (gx / cw).floor() * cw;
        let oy = gy - (gy / ch).floor() * ch;
        let gap = self.gap as f64;
        if ox >= gap && ox < cw - gap && oy >= gap && oy < ch - gap {
            self.specimen_value
        } else {
            self.tray_value
        }
    }

    /// Render the photograph as RGB
    pub fn render(&self) -> RgbImage {
        let width = self.width as usize;
        let theta = self.tilt_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        let cx = (self.width / 2) as f64;
        let cy = (self.height / 2) as f64;

        let mut pixels = vec![0u8; width * self.height as usize * 3];
        if width > 0 {
            pixels
                .par_chunks_mut(width * 3)
                .enumerate()
                .for_each(|(y, row)| {
                    let dy = y as f64 - cy;
                    for (x, px) in row.chunks_exact_mut(3).enumerate() {
                        let dx = x as f64 - cx;
                        let u = dx * cos + dy * sin + cx;
                        let v = -dx * sin + dy * cos + cy;
                        px.fill(self.scene(u, v));
                    }
                });
        }

        RgbImage::from_raw(self.width, self.height, pixels)
            .unwrap_or_else(|| RgbImage::from_pixel(self.width, self.height, Rgb([0, 0, 0])))
    }
}
