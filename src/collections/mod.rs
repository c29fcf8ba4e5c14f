//! Identifier collections.
//!
//! - `id_filter`: fixed-size low-bit bitmap for fast negative lookups
//! - `id_map`: insertion-ordered relabeling table built on the filter

pub mod id_filter;
pub mod id_map;

pub use id_filter::IdFilter;
pub use id_map::IdHashMap;
