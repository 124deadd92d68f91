//! Symmetric working matrix of cluster-to-cluster distances.

/// Dense `B × B` matrix updated in place while clusters merge.
///
/// The diagonal and every retired row/column hold [`f64::INFINITY`], which no
/// real distance reaches, so they are never selected as the closest pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterDistances {
    size: usize,
    values: Vec<f64>,
}

impl ClusterDistances {
    /// Marker stored on the diagonal and on retired slots.
    pub const SENTINEL: f64 = f64::INFINITY;

    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            values: vec![Self::SENTINEL; size.saturating_mul(size)],
        }
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the distance between slots `row` and `col`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(self.values[row * self.size + col])
    }

    /// Returns whether `d(i, j) == d(j, i)` for every pair.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|row| {
            (row + 1..self.size).all(|col| {
                self.values[row * self.size + col]
                    .total_cmp(&self.values[col * self.size + row])
                    .is_eq()
            })
        })
    }

    pub(crate) fn set_symmetric(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.size + col] = value;
        self.values[col * self.size + row] = value;
    }

    pub(crate) fn retire(&mut self, slot: usize) {
        for other in 0..self.size {
            self.set_symmetric(slot, other, Self::SENTINEL);
        }
    }

    /// Returns the closest live pair `(row, col, distance)` with `row < col`.
    ///
    /// Scans in row-major order and keeps the first minimum, so ties resolve
    /// to the lowest row and then the lowest column.
    #[must_use]
    pub fn closest_pair(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for row in 0..self.size {
            for col in row + 1..self.size {
                let value = self.values[row * self.size + col];
                let current = best.map_or(Self::SENTINEL, |(_, _, distance)| distance);
                if value < current {
                    best = Some((row, col, value));
                }
            }
        }
        best
    }
}
