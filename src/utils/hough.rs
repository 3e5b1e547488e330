//! Straight-line Hough transform with vote counts.
//!
//! Lines are parameterised as `x·cos θ + y·sin θ = ρ` with θ sampled over
//! [−90°, 90°). θ = 0 is a vertical line at `x = ρ`; a small positive θ is a
//! line whose lower end leans left.

use image::GrayImage;

/// Accumulator memory guard (bytes)
const MAX_ACC_BYTES: u64 = 512 * 1024 * 1024;

/// A detected line with its accumulator score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughLine {
    /// Normal angle in radians, in [−π/2, π/2)
    pub angle: f64,
    /// Signed distance from the origin in pixels
    pub rho: f64,
    /// Number of edge pixels voting for this line
    pub votes: u32,
}

/// Options for [`HoughAccumulator::peaks`]
#[derive(Debug, Clone, Copy)]
pub struct PeakOptions {
    /// Maximum number of lines to return
    pub num_peaks: usize,
    /// Suppression half-width along ρ, in pixels
    pub min_distance: usize,
    /// Suppression half-width along θ, in radians
    pub min_angle: f64,
    /// Minimum votes as a fraction of the accumulator maximum
    pub threshold_ratio: f64,
}

pub struct HoughAccumulator {
    data: Vec<u32>,
    rho_bins: usize,
    max_rho: f64,
    angles: Vec<f64>,
    cos_table: Vec<f64>,
    sin_table: Vec<f64>,
}

impl HoughAccumulator {
    /// Allocate an empty accumulator for a `width × height` image with the
    /// given angular resolution. Returns `None` if the accumulator would be
    /// unreasonably large.
    pub fn new(width: u32, height: u32, angle_resolution: f64) -> Option<Self> {
        if angle_resolution <= 0.0 {
            return None;
        }
        let max_rho = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt().ceil();
        let rho_bins = 2 * max_rho as usize + 1;
        let theta_bins = (std::f64::consts::PI / angle_resolution).round().max(1.0) as usize;

        let approx_size = (rho_bins as u64) * (theta_bins as u64) * std::mem::size_of::<u32>() as u64;
        if approx_size > MAX_ACC_BYTES {
            return None;
        }

        let step = std::f64::consts::PI / theta_bins as f64;
        let angles: Vec<f64> = (0..theta_bins)
            .map(|i| -std::f64::consts::FRAC_PI_2 + i as f64 * step)
            .collect();
        let cos_table = angles.iter().map(|a| a.cos()).collect();
        let sin_table = angles.iter().map(|a| a.sin()).collect();

        Some(Self {
            data: vec![0u32; rho_bins * theta_bins],
            rho_bins,
            max_rho,
            angles,
            cos_table,
            sin_table,
        })
    }

    /// Build an accumulator and vote with every non-zero pixel of `edges`
    pub fn from_edges(edges: &GrayImage, angle_resolution: f64) -> Option<Self> {
        let mut acc = Self::new(edges.width(), edges.height(), angle_resolution)?;
        for (x, y, pixel) in edges.enumerate_pixels() {
            if pixel.0[0] > 0 {
                acc.vote_point(x as f64, y as f64);
            }
        }
        Some(acc)
    }

    /// Number of θ samples
    pub fn theta_bins(&self) -> usize {
        self.angles.len()
    }

    /// Cast one vote per θ for the point `(x, y)`
    pub fn vote_point(&mut self, x: f64, y: f64) {
        for theta in 0..self.angles.len() {
            let rho = x * self.cos_table[theta] + y * self.sin_table[theta];
            let rho_idx = (rho + self.max_rho).round() as isize;
            if rho_idx < 0 || rho_idx as usize >= self.rho_bins {
                continue;
            }
            let idx = theta * self.rho_bins + rho_idx as usize;
            self.data[idx] = self.data[idx].saturating_add(1);
        }
    }

    #[inline]
    fn votes(&self, theta: usize, rho_idx: usize) -> u32 {
        self.data[theta * self.rho_bins + rho_idx]
    }

    /// Highest vote count in the accumulator
    pub fn max_votes(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Strongest lines, highest vote count first. A cell qualifies when it
    /// clears the vote threshold and no 8-neighbour has strictly more votes;
    /// accepted lines suppress weaker ones within `min_angle` × `min_distance`.
    pub fn peaks(&self, options: &PeakOptions) -> Vec<HoughLine> {
        let max_votes = self.max_votes();
        if max_votes == 0 || options.num_peaks == 0 {
            return Vec::new();
        }
        let threshold = ((options.threshold_ratio * max_votes as f64).ceil() as u32).max(1);
        let theta_bins = self.theta_bins();

        let mut candidates: Vec<(u32, usize, usize)> = Vec::new();
        for theta in 0..theta_bins {
            for rho_idx in 0..self.rho_bins {
                let votes = self.votes(theta, rho_idx);
                if votes < threshold {
                    continue;
                }
                if self.is_local_max(theta, rho_idx, votes) {
                    candidates.push((votes, theta, rho_idx));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let angle_step = std::f64::consts::PI / theta_bins as f64;
        let min_angle_bins = (options.min_angle / angle_step).round() as usize;

        let mut accepted: Vec<(usize, usize, u32)> = Vec::new();
        for (votes, theta, rho_idx) in candidates {
            let suppressed = accepted.iter().any(|&(t, r, _)| {
                t.abs_diff(theta) <= min_angle_bins && r.abs_diff(rho_idx) <= options.min_distance
            });
            if suppressed {
                continue;
            }
            accepted.push((theta, rho_idx, votes));
            if accepted.len() >= options.num_peaks {
                break;
            }
        }

        accepted
            .into_iter()
            .map(|(theta, rho_idx, votes)| HoughLine {
                angle: self.angles[theta],
                rho: rho_idx as f64 - self.max_rho,
                votes,
            })
            .collect()
    }

    fn is_local_max(&self, theta: usize, rho_idx: usize, votes: u32) -> bool {
        for dt in -1isize..=1 {
            for dr in -1isize..=1 {
                if dt == 0 && dr == 0 {
                    continue;
                }
                let t = theta as isize + dt;
                let r = rho_idx as isize + dr;
                if t < 0 || r < 0 || t as usize >= self.theta_bins() || r as usize >= self.rho_bins {
                    continue;
                }
                if self.votes(t as usize, r as usize) > votes {
                    return false;
                }
            }
        }
        true
    }
}
