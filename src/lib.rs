//! # `sparsekit` - Array Primitives for Graph Libraries
//!
//! Three low-level building blocks that graph learning frameworks run on
//! every mini-batch: dense identifier relabeling, lockstep sorting of COO
//! sparse matrices, and discrete sampling driven by an explicit random engine.
//!
//! ## Components
//!
//! 1. **Relabeling table** ([`IdHashMap`]):
//!    - Maps arbitrary `i32`/`i64` identifiers onto `0..k` in first-seen order
//!    - A fixed-size low-bit bitmap ([`IdFilter`]) answers most misses
//!      without touching the hash table
//!    - Bulk insert and bulk lookup over [`TypedBuffer`]s
//!
//! 2. **COO sort engine** ([`CooMatrix`], [`sort_in_place`], [`is_sorted`]):
//!    - Sorts `(row, col, data)` in lockstep by row, or by row then column
//!    - Materializes the implicit identity data array before permuting
//!    - Optional rayon backend behind the `parallel` feature
//!
//! 3. **Discrete sampling** ([`choice`], [`choice_n`], [`uniform_choice`]):
//!    - Weighted draws with or without replacement from a sum tree
//!    - Uniform draws switching between rejection and reservoir sampling
//!    - Persistent samplers ([`TreeSampler`], [`AliasSampler`]) for repeated draws
//!
//! All buffers go through the [`TypedBuffer`] handle, which carries its
//! dtype and device and refuses to reinterpret memory of the wrong type.
//!
//! ## Example
//!
//! ```rust
//! use sparsekit::{IdHashMap, RandomEngine, TypedBuffer, IdDType, choice_n};
//!
//! let mut map = IdHashMap::<i64>::new();
//! map.update_slice(&[5, 3, 5, 7]);
//! assert_eq!(map.values_slice(), &[5, 3, 7]);
//!
//! let mut rng = RandomEngine::seed_from_u64(42);
//! let weights = TypedBuffer::from_vec(vec![0.1f64, 0.0, 0.9]);
//! let picks = choice_n(&mut rng, 2, &weights, false, IdDType::I64).unwrap();
//! let mut picks = picks.to_vec::<i64>().unwrap();
//! picks.sort_unstable();
//! assert_eq!(picks, vec![0, 2]);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod buffer;
pub mod collections;
pub mod config;
pub mod error;
pub mod graph;
pub mod random;

pub use buffer::{BufferAllocator, DType, DTypeCode, Device, Element, HostAllocator, IdType, TypedBuffer, WeightType};
pub use collections::{IdFilter, IdHashMap};
pub use config::Config;
pub use error::{Error, Result};
pub use graph::{is_sorted, sort, sort_in_place, sort_in_place_with, CooMatrix};
pub use random::{
    choice, choice_n, choice_n_in, choice_n_into, choice_slice, uniform_choice, uniform_choice_in,
    uniform_choice_into, uniform_choice_into_with, AliasSampler, DiscreteSampler, IdDType,
    RandomEngine, Sampler, TreeSampler,
};
