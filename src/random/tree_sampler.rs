//! `TreeSampler` — weighted draws from a sum tree.
//!
//! The tree is a complete binary tree in heap layout: node `1` is the root,
//! node `k` has children `2k` and `2k + 1`, and the weights sit in the leaves
//! `cap..cap + n` where `cap` is `n` rounded up to a power of two. Every
//! internal node holds the sum of its children, so the root is the total.
//!
//! A draw picks `u` uniformly in `[0, total)` and walks down, going left when
//! `u` falls inside the left subtree's mass. Removing an index zeroes its
//! leaf and recomputes the sums on the path to the root.
//!
//! Nodes are summed in `f64` whatever the weight type, so large `f32`
//! weights cannot overflow the total.

use super::{validate_weights, DiscreteSampler, RandomEngine};
use crate::buffer::WeightType;
use crate::error::Result;
use core::marker::PhantomData;
use num_traits::NumCast;

/// Persistent sum-tree sampler over `[0, n)`.
#[derive(Debug, Clone)]
pub struct TreeSampler<F> {
    tree: Vec<f64>,
    cap: usize,
    len: usize,
    replace: bool,
    remaining: usize,
    _weight: PhantomData<F>,
}

impl<F: WeightType> TreeSampler<F> {
    /// Builds the tree in O(n).
    ///
    /// With `replace == false` every drawn index is removed from the tree.
    ///
    /// # Errors
    /// [`crate::Error::InvalidWeights`] for empty, negative, non-finite or
    /// all-zero weights.
    pub fn new(weights: &[F], replace: bool) -> Result<Self> {
        validate_weights(weights)?;

        let len = weights.len();
        let cap = len.next_power_of_two();
        let mut tree = vec![0.0f64; 2 * cap];
        for (leaf, w) in tree[cap..cap + len].iter_mut().zip(weights) {
            *leaf = w.to_f64().unwrap_or(0.0);
        }
        for node in (1..cap).rev() {
            tree[node] = tree[2 * node] + tree[2 * node + 1];
        }

        let remaining = tree[cap..cap + len].iter().filter(|w| **w > 0.0).count();
        Ok(Self {
            tree,
            cap,
            len,
            replace,
            remaining,
            _weight: PhantomData,
        })
    }

    /// Number of indices the sampler was built over.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; construction rejects empty populations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether drawn indices stay in the tree.
    #[inline]
    pub fn replace(&self) -> bool {
        self.replace
    }

    /// Remaining probability mass.
    #[inline]
    pub fn total(&self) -> f64 {
        self.tree[1]
    }

    /// Number of indices that can still be drawn.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Current weight of `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn weight(&self, index: usize) -> F {
        assert!(index < self.len, "Index out of bounds");
        <F as NumCast>::from(self.tree[self.cap + index]).unwrap_or_else(F::infinity)
    }

    /// Drops `index` from the distribution.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize) {
        assert!(index < self.len, "Index out of bounds");
        let mut node = self.cap + index;
        if self.tree[node] > 0.0 {
            self.remaining -= 1;
        }
        self.tree[node] = 0.0;
        while node > 1 {
            node /= 2;
            self.tree[node] = self.tree[2 * node] + self.tree[2 * node + 1];
        }
    }

    /// Leaf reached by descending with `u` in `[0, total)`.
    fn descend(&self, mut u: f64) -> usize {
        let mut node = 1;
        while node < self.cap {
            let left = self.tree[2 * node];
            let right = self.tree[2 * node + 1];
            // Rounding can leave `u` past the left mass; never step into an
            // empty subtree.
            if right <= 0.0 || (u < left && left > 0.0) {
                node *= 2;
            } else {
                u -= left;
                node = 2 * node + 1;
            }
        }
        node - self.cap
    }
}

impl<F: WeightType> DiscreteSampler for TreeSampler<F> {
    fn draw(&mut self, rng: &mut RandomEngine) -> Option<usize> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let index = self.descend(rng.uniform_f64() * total);
        debug_assert!(index < self.len && self.tree[self.cap + index] > 0.0);
        if !self.replace {
            self.remove(index);
        }
        Some(index)
    }

    fn population(&self) -> usize {
        self.len
    }
}
