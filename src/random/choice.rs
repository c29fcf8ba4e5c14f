//! Buffer-level sampling entry points.
//!
//! `choice*` draw from a categorical weight array, `uniform_choice*` draw from
//! `[0, population)`. The `*_into` forms write into caller-owned memory; the
//! buffer forms allocate through a [`BufferAllocator`].

use super::{DiscreteSampler, RandomEngine, TreeSampler};
use crate::buffer::{
    float_type_switch, id_type_switch, BufferAllocator, DType, Device, HostAllocator, IdType,
    TypedBuffer, WeightType,
};
use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Integer width of sampled index buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdDType {
    /// `int32` indices.
    I32,
    /// `int64` indices.
    #[default]
    I64,
}

impl IdDType {
    /// The matching buffer dtype.
    #[inline]
    pub const fn dtype(self) -> DType {
        match self {
            IdDType::I32 => DType::I32,
            IdDType::I64 => DType::I64,
        }
    }
}

impl From<IdDType> for DType {
    fn from(id: IdDType) -> Self {
        id.dtype()
    }
}

#[inline]
fn to_id<I: IdType>(index: usize) -> Result<I> {
    I::from_index(index).ok_or(Error::IndexOverflow {
        value: index,
        dtype: I::DTYPE,
    })
}

/// Fails unless every index below `population` fits in `I`.
fn check_width<I: IdType>(population: usize) -> Result<()> {
    match population.checked_sub(1) {
        Some(max) => to_id::<I>(max).map(drop),
        None => Ok(()),
    }
}

/// Draws one index with probability proportional to its weight.
///
/// # Errors
/// [`Error::InvalidWeights`] for an invalid weight array,
/// [`Error::UnsupportedDType`] for non-float buffers.
pub fn choice(rng: &mut RandomEngine, weights: &TypedBuffer) -> Result<usize> {
    weights.ensure_cpu()?;
    float_type_switch!(weights.dtype(), F, "choice", {
        choice_slice(rng, weights.as_slice::<F>()?)
    })
}

/// [`choice`] over a plain slice.
pub fn choice_slice<F: WeightType>(rng: &mut RandomEngine, weights: &[F]) -> Result<usize> {
    let mut sampler = TreeSampler::new(weights, true)?;
    sampler
        .draw(rng)
        .ok_or_else(|| Error::invalid_weights("weights sum to zero"))
}

/// Draws `num` indices from `[0, weights.len())` proportionally to `weights`.
///
/// Without replacement, `num == n` short-circuits to `[0, n)` and no draws
/// are made.
///
/// # Errors
/// - [`Error::SampleSizeExceedsPopulation`] if `!replace && num > n`.
/// - [`Error::InvalidWeights`] for an invalid weight array, or when fewer
///   than `num` indices carry positive weight and `replace` is `false`.
/// - [`Error::IndexOverflow`] if `n - 1` does not fit `dtype`.
pub fn choice_n(
    rng: &mut RandomEngine,
    num: usize,
    weights: &TypedBuffer,
    replace: bool,
    dtype: IdDType,
) -> Result<TypedBuffer> {
    choice_n_in(&HostAllocator, rng, num, weights, replace, dtype)
}

/// [`choice_n`] with the output allocated by `alloc`.
pub fn choice_n_in(
    alloc: &impl BufferAllocator,
    rng: &mut RandomEngine,
    num: usize,
    weights: &TypedBuffer,
    replace: bool,
    dtype: IdDType,
) -> Result<TypedBuffer> {
    weights.ensure_cpu()?;
    if !replace && num > weights.len() {
        return Err(Error::SampleSizeExceedsPopulation {
            num,
            population: weights.len(),
        });
    }

    let mut out = alloc.allocate(dtype.dtype(), num, weights.device())?;
    id_type_switch!(out.dtype(), I, "choice_n", {
        let slots = out.as_mut_slice::<I>()?;
        float_type_switch!(weights.dtype(), F, "choice_n", {
            choice_n_into(rng, weights.as_slice::<F>()?, replace, slots)
        })
    })?;
    Ok(out)
}

/// Fills `out` with `out.len()` weighted draws.
///
/// On error `out` is left untouched.
pub fn choice_n_into<I: IdType, F: WeightType>(
    rng: &mut RandomEngine,
    weights: &[F],
    replace: bool,
    out: &mut [I],
) -> Result<()> {
    let population = weights.len();
    let num = out.len();
    if !replace && num > population {
        return Err(Error::SampleSizeExceedsPopulation { num, population });
    }
    check_width::<I>(population)?;

    if !replace && num == population {
        tracing::debug!(num, "choice: identity permutation, no draws");
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = to_id(i)?;
        }
        return Ok(());
    }

    let mut sampler = TreeSampler::new(weights, replace)?;
    if !replace && sampler.remaining() < num {
        return Err(Error::invalid_weights(format!(
            "only {} indices have positive weight, {num} requested without replacement",
            sampler.remaining()
        )));
    }

    tracing::debug!(num, population, replace, "choice: sum-tree draws");
    for slot in out.iter_mut() {
        let index = sampler
            .draw(rng)
            .ok_or_else(|| Error::invalid_weights("weights exhausted"))?;
        *slot = to_id(index)?;
    }
    Ok(())
}

/// Draws `num` indices uniformly from `[0, population)`.
///
/// # Errors
/// - [`Error::SampleSizeExceedsPopulation`] if `!replace && num > population`.
/// - [`Error::EmptyPopulation`] if `replace`, `num > 0` and `population == 0`.
/// - [`Error::IndexOverflow`] if `population - 1` does not fit `dtype`.
pub fn uniform_choice(
    rng: &mut RandomEngine,
    num: usize,
    population: usize,
    replace: bool,
    dtype: IdDType,
) -> Result<TypedBuffer> {
    uniform_choice_in(
        &HostAllocator,
        rng,
        num,
        population,
        replace,
        dtype,
        Config::DEFAULT_REJECTION_RATIO,
    )
}

/// [`uniform_choice`] with the output allocated by `alloc` and an explicit
/// rejection ratio.
pub fn uniform_choice_in(
    alloc: &impl BufferAllocator,
    rng: &mut RandomEngine,
    num: usize,
    population: usize,
    replace: bool,
    dtype: IdDType,
    rejection_ratio: u64,
) -> Result<TypedBuffer> {
    if !replace && num > population {
        return Err(Error::SampleSizeExceedsPopulation { num, population });
    }
    let mut out = alloc.allocate(dtype.dtype(), num, Device::Cpu)?;
    id_type_switch!(out.dtype(), I, "uniform_choice", {
        uniform_choice_into_with(rng, population, replace, rejection_ratio, out.as_mut_slice::<I>()?)
    })?;
    Ok(out)
}

/// Fills `out` with uniform draws from `[0, population)`.
pub fn uniform_choice_into<I: IdType>(
    rng: &mut RandomEngine,
    population: usize,
    replace: bool,
    out: &mut [I],
) -> Result<()> {
    uniform_choice_into_with(rng, population, replace, Config::DEFAULT_REJECTION_RATIO, out)
}

/// [`uniform_choice_into`] with an explicit rejection/reservoir crossover:
/// without replacement, rejection sampling is used while
/// `num < population / rejection_ratio`.
pub fn uniform_choice_into_with<I: IdType>(
    rng: &mut RandomEngine,
    population: usize,
    replace: bool,
    rejection_ratio: u64,
    out: &mut [I],
) -> Result<()> {
    let num = out.len();
    if !replace && num > population {
        return Err(Error::SampleSizeExceedsPopulation { num, population });
    }
    if num == 0 {
        return Ok(());
    }
    if population == 0 {
        return Err(Error::EmptyPopulation);
    }
    check_width::<I>(population)?;

    if replace {
        for slot in out.iter_mut() {
            *slot = to_id(rng.rand_int(population))?;
        }
        return Ok(());
    }

    let cutoff = (population as u64)
        .checked_div(rejection_ratio)
        .ok_or_else(|| Error::Config("rejection_ratio must be positive".into()))?;
    if (num as u64) < cutoff {
        tracing::debug!(num, population, "uniform_choice: rejection sampling");
        rejection_sample(rng, population, out)
    } else {
        tracing::debug!(num, population, "uniform_choice: reservoir sampling");
        reservoir_sample(rng, population, out)
    }
}

/// Draws until `out.len()` distinct values are collected, in draw order.
fn rejection_sample<I: IdType>(rng: &mut RandomEngine, population: usize, out: &mut [I]) -> Result<()> {
    let mut seen = HashSet::with_capacity(out.len());
    let mut filled = 0;
    while filled < out.len() {
        let value = rng.rand_int(population);
        if seen.insert(value) {
            out[filled] = to_id(value)?;
            filled += 1;
        }
    }
    Ok(())
}

/// Algorithm R over the index stream `0..population`.
fn reservoir_sample<I: IdType>(rng: &mut RandomEngine, population: usize, out: &mut [I]) -> Result<()> {
    let num = out.len();
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = to_id(i)?;
    }
    for i in num..population {
        let j = rng.rand_int(i + 1);
        if j < num {
            out[j] = to_id(i)?;
        }
    }
    Ok(())
}

/// A random engine bundled with the configuration its draws use.
///
/// ```rust
/// use sparsekit::{IdDType, Sampler};
///
/// let mut sampler = Sampler::seed_from_u64(7);
/// let picks = sampler.uniform_choice(5, 100, false, IdDType::I64).unwrap();
/// assert_eq!(picks.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    engine: RandomEngine,
    config: Config,
}

impl Sampler {
    /// Creates a sampler after validating `config`.
    pub fn new(engine: RandomEngine, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    /// Seeded sampler with the default configuration.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            engine: RandomEngine::seed_from_u64(seed),
            config: Config::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying engine.
    pub fn engine_mut(&mut self) -> &mut RandomEngine {
        &mut self.engine
    }

    /// See [`choice`].
    pub fn choice(&mut self, weights: &TypedBuffer) -> Result<usize> {
        choice(&mut self.engine, weights)
    }

    /// See [`choice_n`].
    pub fn choice_n(
        &mut self,
        num: usize,
        weights: &TypedBuffer,
        replace: bool,
        dtype: IdDType,
    ) -> Result<TypedBuffer> {
        choice_n(&mut self.engine, num, weights, replace, dtype)
    }

    /// See [`uniform_choice`]; uses the configured rejection ratio.
    pub fn uniform_choice(
        &mut self,
        num: usize,
        population: usize,
        replace: bool,
        dtype: IdDType,
    ) -> Result<TypedBuffer> {
        uniform_choice_in(
            &HostAllocator,
            &mut self.engine,
            num,
            population,
            replace,
            dtype,
            self.config.rejection_ratio,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn assert_distinct_in_range(values: &[i64], population: usize) {
        let set: HashSet<i64> = values.iter().copied().collect();
        assert_eq!(set.len(), values.len(), "duplicates in {values:?}");
        assert!(values.iter().all(|&v| v >= 0 && (v as usize) < population));
    }

    #[test]
    fn test_identity_fast_path() {
        let mut rng = RandomEngine::seed_from_u64(0);
        // Weights are not even looked at.
        let weights = TypedBuffer::from_vec(vec![0.0f32; 5]);
        let out = choice_n(&mut rng, 5, &weights, false, IdDType::I32).unwrap();
        assert_eq!(out.dtype(), DType::I32);
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_choice_n_too_many_without_replacement() {
        let mut rng = RandomEngine::seed_from_u64(0);
        let weights = TypedBuffer::from_vec(vec![1.0f64; 3]);
        assert_eq!(
            choice_n(&mut rng, 4, &weights, false, IdDType::I64).unwrap_err(),
            Error::SampleSizeExceedsPopulation {
                num: 4,
                population: 3
            }
        );
        // With replacement the population size is no bound.
        let out = choice_n(&mut rng, 10, &weights, true, IdDType::I64).unwrap();
        assert!(out.to_vec::<i64>().unwrap().iter().all(|&v| (0..3).contains(&v)));
    }

    #[test]
    fn test_choice_n_without_replacement_is_distinct() {
        let mut rng = RandomEngine::seed_from_u64(9);
        let weights: Vec<f64> = (1..=20).map(f64::from).collect();
        let mut out = vec![0i64; 12];
        choice_n_into(&mut rng, &weights, false, &mut out).unwrap();
        assert_distinct_in_range(&out, 20);
    }

    #[test]
    fn test_choice_n_too_few_positive_weights() {
        let mut rng = RandomEngine::seed_from_u64(9);
        let mut out = [7i32; 3];
        let err = choice_n_into(&mut rng, &[1.0f32, 0.0, 1.0, 0.0], false, &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidWeights { .. }));
        assert_eq!(out, [7, 7, 7]);
    }

    #[test]
    fn test_choice_rejects_bad_buffers() {
        let mut rng = RandomEngine::seed_from_u64(1);
        let ints = TypedBuffer::from_vec(vec![1i32, 2]);
        assert!(matches!(
            choice(&mut rng, &ints),
            Err(Error::UnsupportedDType { .. })
        ));
        let negative = TypedBuffer::from_vec(vec![1.0f64, -2.0]);
        assert!(matches!(
            choice(&mut rng, &negative),
            Err(Error::InvalidWeights { .. })
        ));
        let empty = TypedBuffer::from_vec(Vec::<f32>::new());
        assert!(choice(&mut rng, &empty).is_err());
    }

    #[test]
    fn test_choice_single_positive_weight() {
        let mut rng = RandomEngine::seed_from_u64(4);
        let weights = TypedBuffer::from_vec(vec![0.0f32, 0.0, 3.0, 0.0]);
        for _ in 0..100 {
            assert_eq!(choice(&mut rng, &weights).unwrap(), 2);
        }
    }

    #[test]
    fn test_uniform_choice_rejection_branch() {
        let mut rng = RandomEngine::seed_from_u64(5);
        let mut out = vec![0i64; 10];
        // 10 < 1000 / 10: rejection sampling.
        uniform_choice_into(&mut rng, 1000, false, &mut out).unwrap();
        assert_distinct_in_range(&out, 1000);
    }

    #[test]
    fn test_uniform_choice_reservoir_branch() {
        let mut rng = RandomEngine::seed_from_u64(5);
        let mut out = vec![0i64; 50];
        uniform_choice_into(&mut rng, 60, false, &mut out).unwrap();
        assert_distinct_in_range(&out, 60);

        let mut all = vec![0i64; 60];
        uniform_choice_into(&mut rng, 60, false, &mut all).unwrap();
        assert_eq!(all, (0..60).collect::<Vec<_>>());
    }

    #[test]
    fn test_uniform_choice_edge_cases() {
        let mut rng = RandomEngine::seed_from_u64(6);
        let out = uniform_choice(&mut rng, 0, 0, false, IdDType::I32).unwrap();
        assert!(out.is_empty());
        assert_eq!(
            uniform_choice(&mut rng, 3, 0, true, IdDType::I32).unwrap_err(),
            Error::EmptyPopulation
        );
        assert_eq!(
            uniform_choice(&mut rng, 3, 2, false, IdDType::I64).unwrap_err(),
            Error::SampleSizeExceedsPopulation {
                num: 3,
                population: 2
            }
        );
        let mut out = [0i64; 2];
        assert!(matches!(
            uniform_choice_into_with(&mut rng, 100, false, 0, &mut out),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_index_width_overflow() {
        let mut rng = RandomEngine::seed_from_u64(6);
        let population = i32::MAX as usize + 2;
        let mut out = [0i32; 1];
        assert!(matches!(
            uniform_choice_into(&mut rng, population, true, &mut out),
            Err(Error::IndexOverflow { .. })
        ));
        let mut wide = [0i64; 1];
        uniform_choice_into(&mut rng, population, true, &mut wide).unwrap();
        assert!((0..population as i64).contains(&wide[0]));
    }

    #[test]
    fn test_sampler_uses_config_ratio() {
        let cfg = Config {
            rejection_ratio: 1,
            ..Config::default()
        };
        let mut sampler = Sampler::new(RandomEngine::seed_from_u64(2), cfg).unwrap();
        assert_eq!(sampler.config().rejection_ratio, 1);
        let out = sampler.uniform_choice(99, 100, false, IdDType::I64).unwrap();
        assert_distinct_in_range(&out.to_vec::<i64>().unwrap(), 100);

        let bad = Config {
            rejection_ratio: 0,
            ..Config::default()
        };
        assert!(Sampler::new(RandomEngine::seed_from_u64(2), bad).is_err());
    }

    #[test]
    fn test_sampler_is_reproducible() {
        let weights = TypedBuffer::from_vec(vec![1.0f64, 2.0, 3.0, 4.0]);
        let mut a = Sampler::seed_from_u64(31);
        let mut b = Sampler::seed_from_u64(31);
        assert_eq!(
            a.choice_n(3, &weights, false, IdDType::I64).unwrap(),
            b.choice_n(3, &weights, false, IdDType::I64).unwrap()
        );
        assert_eq!(a.choice(&weights).unwrap(), b.choice(&weights).unwrap());
        assert_eq!(a.engine_mut().next_u32(), b.engine_mut().next_u32());
    }
}
