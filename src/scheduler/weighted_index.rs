use crate::error::{EvoError, EvoResult};
use fastrand::Rng;

/// Fixed-size multiset of non-negative weights with O(log n) update and
/// O(log n) weighted draw.
///
/// Stored as an implicit binary tree in one flat array: node `k` has
/// children `2k` and `2k + 1`, the root is node 1 and the leaves start at
/// `cap`. Leaves hold weights verbatim; every internal node is recomputed
/// as the sum of its two children whenever a leaf below it changes, so no
/// error accumulates across repeated updates.
#[derive(Debug, Clone)]
pub struct WeightedIndex {
    size: usize,
    cap: usize,
    tree: Vec<f64>,
}

impl WeightedIndex {
    pub fn new(size: usize) -> Self {
        let cap = size.max(1).next_power_of_two();
        Self {
            size,
            cap,
            tree: vec![0.0; 2 * cap],
        }
    }

    pub fn from_weights(weights: &[f64]) -> EvoResult<Self> {
        let mut index = Self::new(weights.len());
        for (i, &w) in weights.iter().enumerate() {
            index.adjust(i, w)?;
        }
        Ok(index)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline(always)]
    pub fn total(&self) -> f64 {
        self.tree[1]
    }

    pub fn weight(&self, index: usize) -> EvoResult<f64> {
        if index >= self.size {
            return Err(EvoError::Range {
                index,
                size: self.size,
            });
        }
        Ok(self.tree[self.cap + index])
    }

    /// Replaces the weight at `index`.
    pub fn adjust(&mut self, index: usize, weight: f64) -> EvoResult<()> {
        if index >= self.size {
            return Err(EvoError::Range {
                index,
                size: self.size,
            });
        }
        if !(weight >= 0.0) || !weight.is_finite() {
            return Err(EvoError::InvalidWeight(weight));
        }

        let mut node = self.cap + index;
        self.tree[node] = weight;
        node /= 2;
        while node >= 1 {
            self.tree[node] = self.tree[2 * node] + self.tree[2 * node + 1];
            node /= 2;
        }
        Ok(())
    }

    /// Draws an index with probability proportional to its weight, using a
    /// single uniform deviate. An all-zero index yields 0.
    pub fn draw(&self, rng: &mut Rng) -> usize {
        let total = self.total();
        if !(total > 0.0) {
            return 0;
        }

        let mut target = rng.f64() * total;
        let mut node = 1;
        while node < self.cap {
            let left = 2 * node;
            let right = left + 1;
            // Never step into an empty subtree, even when rounding leaves
            // `target` past the last positive weight.
            if (target < self.tree[left] && self.tree[left] > 0.0) || !(self.tree[right] > 0.0) {
                node = left;
            } else {
                target -= self.tree[left];
                node = right;
            }
        }

        (node - self.cap).min(self.size.saturating_sub(1))
    }
}
