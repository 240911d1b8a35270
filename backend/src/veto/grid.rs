//! Binned 2-D grids

/// Upper bound on bins per axis
pub const MAX_AXIS_BINS: usize = 1 << 20;

/// Binned axis described by its bin edges (ascending)
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    edges: Vec<f64>,
}

impl Axis {
    /// `bins` equal-width bins over `[min, max]`.
    pub fn uniform(bins: usize, min: f64, max: f64) -> Option<Self> {
        if bins == 0 || bins > MAX_AXIS_BINS {
            return None;
        }
        if !min.is_finite() || !max.is_finite() || min >= max {
            return None;
        }
        let width = (max - min) / bins as f64;
        let mut edges: Vec<f64> = (0..bins).map(|i| min + width * i as f64).collect();
        edges.push(max);
        Some(Self { edges })
    }

    /// Variable-width bins; needs at least two strictly increasing finite edges.
    pub fn from_edges(edges: Vec<f64>) -> Option<Self> {
        if edges.len() < 2 || edges.iter().any(|e| !e.is_finite()) {
            return None;
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some(Self { edges })
    }

    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn bins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min(), self.max())
    }

    /// 0-based bin containing `value`.
    ///
    /// Both axis ends are inside: a value equal to the upper edge falls in the
    /// last bin. Values outside `[min, max]` and NaN have no bin.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value < self.min() || value > self.max() {
            return None;
        }
        if value == self.max() {
            return Some(self.bins() - 1);
        }
        // First edge strictly above `value`, minus one
        let upper = self.edges.partition_point(|edge| *edge <= value);
        Some(upper - 1)
    }
}

/// 2-D grid of cell values, row-major with the x index varying fastest
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    pub x: Axis,
    pub y: Axis,
    values: Vec<f64>,
}

impl Grid2D {
    /// Returns `None` when `values` does not hold exactly one entry per cell.
    pub fn new(x: Axis, y: Axis, values: Vec<f64>) -> Option<Self> {
        if values.len() != x.bins() * y.bins() {
            return None;
        }
        Some(Self { x, y, values })
    }

    pub fn value(&self, ix: usize, iy: usize) -> f64 {
        self.values[iy * self.x.bins() + ix]
    }

    /// Cell value at a point, `None` outside the grid.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let ix = self.x.find_bin(x)?;
        let iy = self.y.find_bin(y)?;
        Some(self.value(ix, iy))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
