//! One-dimensional peak picking for intensity profiles.
//!
//! A peak is a strict rise, an optional flat top and a strict fall; a flat
//! top reports its middle sample (rounded down). The first and last samples
//! are never peaks. Peaks below `min_height` are dropped first, then the
//! distance filter walks peaks from highest to lowest and removes every
//! neighbour strictly closer than `min_distance`. Equal heights are visited
//! lowest index first, so results never depend on sort stability.

use crate::models::Peak;

/// Indices of all local maxima (flat tops collapsed to their middle index)
pub fn local_maxima(profile: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if profile.len() < 3 {
        return maxima;
    }

    let i_max = profile.len() - 1;
    let mut i = 1usize;
    while i < i_max {
        if profile[i - 1] < profile[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && profile[i_ahead] == profile[i] {
                i_ahead += 1;
            }
            if profile[i_ahead] < profile[i] {
                let left = i;
                let right = i_ahead - 1;
                maxima.push((left + right) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }

    maxima
}

/// Local maxima at least `min_height` tall and at least `min_distance`
/// samples apart, in ascending index order.
pub fn find_peaks(profile: &[f64], min_height: f64, min_distance: usize) -> Vec<Peak> {
    let candidates: Vec<Peak> = local_maxima(profile)
        .into_iter()
        .filter(|&i| profile[i] >= min_height)
        .map(|i| Peak::new(i, profile[i]))
        .collect();

    if min_distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .height
            .total_cmp(&candidates[a].height)
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; candidates.len()];
    for j in order {
        if !keep[j] {
            continue;
        }
        let center = candidates[j].index;

        let mut k = j;
        while k > 0 && center - candidates[k - 1].index < min_distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < candidates.len() && candidates[k].index - center < min_distance {
            keep[k] = false;
            k += 1;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(peak, kept)| kept.then_some(peak))
        .collect()
}

/// The `n` highest peaks, highest first; equal heights keep the lower index first
pub fn strongest(peaks: &[Peak], n: usize) -> Vec<Peak> {
    let mut ranked = peaks.to_vec();
    ranked.sort_by(|a, b| b.height.total_cmp(&a.height).then(a.index.cmp(&b.index)));
    ranked.truncate(n);
    ranked
}
