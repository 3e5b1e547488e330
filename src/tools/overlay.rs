//! Grid and cross overlay for visual inspection of a segmentation.

use image::{DynamicImage, Rgb, RgbImage};

use crate::models::{CrossMark, GridSpec};

const GRID_COLOR: Rgb<u8> = Rgb([255, 32, 32]);
const CROSS_COLOR: Rgb<u8> = Rgb([32, 220, 64]);
const LINE_HALF_WIDTH: i64 = 2;
const MARKER_RADIUS: i64 = 12;

fn put_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, color);
}

fn draw_vertical(img: &mut RgbImage, x: i64, color: Rgb<u8>) {
    for y in 0..img.height() as i64 {
        for dx in -LINE_HALF_WIDTH..=LINE_HALF_WIDTH {
            put_clipped(img, x + dx, y, color);
        }
    }
}

fn draw_horizontal(img: &mut RgbImage, y: i64, color: Rgb<u8>) {
    for x in 0..img.width() as i64 {
        for dy in -LINE_HALF_WIDTH..=LINE_HALF_WIDTH {
            put_clipped(img, x, y + dy, color);
        }
    }
}

fn draw_marker(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    for d in -MARKER_RADIUS..=MARKER_RADIUS {
        for w in -1..=1 {
            put_clipped(img, x + d, y + w, color);
            put_clipped(img, x + w, y + d, color);
        }
    }
}

/// Copy of `image` with the grid lines in red and the detected crosses
/// marked in green. Lines outside the image are skipped.
pub fn render_overlay(image: &DynamicImage, grid: &GridSpec, crosses: &[CrossMark]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for &x in &grid.x_grid {
        draw_vertical(&mut canvas, x, GRID_COLOR);
    }
    for &y in &grid.y_grid {
        draw_horizontal(&mut canvas, y, GRID_COLOR);
    }
    for cross in crosses {
        draw_marker(&mut canvas, cross.x as i64, cross.y as i64, CROSS_COLOR);
    }
    canvas
}
