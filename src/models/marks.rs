use serde::Serialize;

/// Local maximum of a 1-D intensity profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    /// Index into the profile
    pub index: usize,
    /// Profile value at `index`
    pub height: f64,
}

impl Peak {
    /// Create a new peak
    pub fn new(index: usize, height: f64) -> Self {
        Self { index, height }
    }
}

/// Detected alignment cross center with its correlation score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossMark {
    /// Column of the cross center
    pub x: usize,
    /// Row of the cross center
    pub y: usize,
    /// Inverted deviation-from-white score at the center
    pub score: f64,
}

impl CrossMark {
    /// Create a new cross mark
    pub fn new(x: usize, y: usize, score: f64) -> Self {
        Self { x, y, score }
    }
}
