//! Sparse graph layouts.
//!
//! - `coo`: coordinate-list matrix and its lockstep sort engine

pub mod coo;

pub use coo::{is_sorted, is_sorted_slices, sort, sort_in_place, sort_in_place_with, CooMatrix};
