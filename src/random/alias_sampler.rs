//! `AliasSampler` — Vose's alias method.
//!
//! Each of the `n` columns holds a threshold and an alias. A draw picks a
//! column uniformly, keeps it with probability `prob[i]`, and otherwise
//! returns `alias[i]`. Setup is O(n), each draw is O(1). Only sampling with
//! replacement is supported; removal would require a rebuild.

use super::{validate_weights, DiscreteSampler, RandomEngine};
use crate::buffer::WeightType;
use crate::error::Result;
use num_traits::{NumCast, One};

/// Persistent alias-table sampler over `[0, n)`, with replacement.
#[derive(Debug, Clone)]
pub struct AliasSampler<F> {
    prob: Vec<F>,
    alias: Vec<usize>,
}

impl<F: WeightType> AliasSampler<F> {
    /// Builds the alias table.
    ///
    /// # Errors
    /// [`crate::Error::InvalidWeights`] for empty, negative, non-finite or
    /// all-zero weights.
    pub fn new(weights: &[F]) -> Result<Self> {
        let total = validate_weights(weights)?;
        let n = weights.len();
        #[allow(clippy::cast_precision_loss)]
        let scale = n as f64 / total;

        let mut scaled: Vec<f64> = weights
            .iter()
            .map(|w| w.to_f64().unwrap_or(0.0) * scale)
            .collect();
        let mut prob = vec![1.0f64; n];
        let mut alias: Vec<usize> = (0..n).collect();

        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| scaled[i] < 1.0);

        while let (Some(s), Some(l)) = (small.pop(), large.last().copied()) {
            prob[s] = scaled[s];
            alias[s] = l;
            scaled[l] = (scaled[l] + scaled[s]) - 1.0;
            if scaled[l] < 1.0 {
                large.pop();
                small.push(l);
            }
        }
        // Leftovers (including a column popped when `large` ran dry) are
        // within rounding of 1 and keep prob = 1.

        Ok(Self {
            prob: prob
                .into_iter()
                .map(|p| <F as NumCast>::from(p).unwrap_or_else(<F as One>::one))
                .collect(),
            alias,
        })
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.prob.len()
    }

    /// Always `false`; construction rejects empty populations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Draws one index; never exhausts.
    pub fn sample(&self, rng: &mut RandomEngine) -> usize {
        let column = rng.rand_int(self.prob.len());
        let keep = rng.uniform_f64() < self.prob[column].to_f64().unwrap_or(1.0);
        if keep {
            column
        } else {
            self.alias[column]
        }
    }
}

impl<F: WeightType> DiscreteSampler for AliasSampler<F> {
    fn draw(&mut self, rng: &mut RandomEngine) -> Option<usize> {
        Some(self.sample(rng))
    }

    fn population(&self) -> usize {
        self.len()
    }
}
