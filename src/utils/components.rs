/// Connected components over a [`BinaryMask`] (4-connectivity).
/// Used to drop sensor noise and small dark specks before the holder
/// frame's bounding box is measured.
use crate::models::BinaryMask;

/// Union-Find data structure
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root of `x`, halving the path on the way up
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            // Keep the smaller label as root so labels stay in scan order
            let (lo, hi) = if root_x < root_y { (root_x, root_y) } else { (root_y, root_x) };
            self.parent[hi as usize] = lo;
        }
    }
}

/// Per-pixel component labels (0 = background) and the pixel area of every
/// label. `areas[label]` is valid for each label present in `labels`.
pub struct Components {
    pub labels: Vec<u32>,
    pub areas: Vec<usize>,
}

/// Label the set pixels of `mask` into 4-connected components
pub fn label_components(mask: &BinaryMask) -> Components {
    let width = mask.width();
    let height = mask.height();

    let mut labels = vec![0u32; width * height];
    // Label 0 is background; worst case every other pixel opens a label
    let mut uf = UnionFind::new(width * height / 2 + 2);
    let mut next_label = 1u32;

    // First pass: provisional labels
    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }
            let idx = y * width + x;
            let left = if x > 0 { labels[idx - 1] } else { 0 };
            let above = if y > 0 { labels[idx - width] } else { 0 };

            labels[idx] = match (left, above) {
                (0, 0) => {
                    let label = next_label;
                    next_label += 1;
                    label
                }
                (l, 0) => l,
                (0, a) => a,
                (l, a) => {
                    if l != a {
                        uf.union(l, a);
                    }
                    l.min(a)
                }
            };
        }
    }

    // Second pass: resolve to roots and measure areas
    let mut areas = vec![0usize; next_label as usize];
    for label in labels.iter_mut() {
        if *label == 0 {
            continue;
        }
        let root = uf.find(*label);
        *label = root;
        areas[root as usize] += 1;
    }

    Components { labels, areas }
}

/// Copy of `mask` without the components whose area is at most `max_size` pixels
pub fn remove_small_objects(mask: &BinaryMask, max_size: usize) -> BinaryMask {
    let width = mask.width();
    let components = label_components(mask);

    BinaryMask::from_fn(width, mask.height(), |x, y| {
        let label = components.labels[y * width + x];
        label != 0 && components.areas[label as usize] > max_size
    })
}
