//! Numeric kernels shared by the detector stages
//!
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Summed-area tables (constant-time window means)
//! - 1-D peak picking
//! - Connected components (small-object removal)
//! - Straight-line Hough transform

pub mod components;
pub mod grayscale;
pub mod hough;
pub mod integral;
pub mod peaks;
