//! `IdHashMap` — deduplicates integer identifiers and relabels them densely.
//!
//! Each distinct identifier is assigned the next unused index in `0..k`, in the
//! order it is first seen. The map combines:
//!
//! - **Exact store**: a hash table from old id to new id, plus a dense `keys`
//!   vector holding the old ids in insertion order (so `keys[new] == old`).
//! - **Filter**: an [`IdFilter`] bitmap over the low identifier bits. Lookups
//!   test the bitmap first and skip the hash probe when the bit is unset, which
//!   makes negative queries (the common case when relabeling frontiers) cheap.
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `update` | \(O(n)\) expected | Idempotent on repeats |
//! | `contains` / `map` | \(O(1)\) expected | No hash probe on a filter miss |
//! | `values` | \(O(k)\) | Copy of the dense key vector |
//!
//! ```rust
//! use sparsekit::IdHashMap;
//!
//! let mut map = IdHashMap::<i64>::new();
//! map.update_slice(&[5, 3, 5, 7]);
//! assert_eq!(map.map(3, -1), 1);
//! assert_eq!(map.map(9, -1), -1);
//! assert_eq!(map.values_slice(), &[5, 3, 7]);
//! ```

use crate::buffer::{BufferAllocator, Device, HostAllocator, IdType, TypedBuffer};
use crate::collections::id_filter::IdFilter;
use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Insertion-ordered relabeling table with a bitmap pre-filter.
#[derive(Debug, Clone)]
pub struct IdHashMap<I: IdType> {
    filter: IdFilter,
    old_to_new: HashMap<I, I>,
    /// Old ids by new id.
    keys: Vec<I>,
}

impl<I: IdType> IdHashMap<I> {
    /// Creates an empty map with the default filter width.
    pub fn new() -> Self {
        Self::from_filter(IdFilter::new())
    }

    /// Creates an empty map whose filter covers the low `bits` id bits.
    pub fn with_filter_bits(bits: u32) -> Result<Self> {
        IdFilter::with_bits(bits).map(Self::from_filter)
    }

    /// Creates an empty map sized by `config.filter_bits`.
    pub fn with_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::with_filter_bits(config.filter_bits)
    }

    fn from_filter(filter: IdFilter) -> Self {
        Self {
            filter,
            old_to_new: HashMap::new(),
            keys: Vec::new(),
        }
    }

    /// Builds a map from an id buffer, which may contain duplicates.
    ///
    /// When `ids` has no duplicates, `ids[i]` is relabeled to `i`.
    pub fn from_ids(ids: &TypedBuffer) -> Result<Self> {
        let mut map = Self::new();
        map.reserve(ids.len());
        map.update(ids)?;
        Ok(map)
    }

    /// Slice counterpart of [`IdHashMap::from_ids`].
    pub fn from_slice(ids: &[I]) -> Self {
        let mut map = Self::new();
        map.reserve(ids.len());
        map.update_slice(ids);
        map
    }

    /// Reserves room for at least `additional` more distinct ids.
    pub fn reserve(&mut self, additional: usize) {
        self.old_to_new.reserve(additional);
        self.keys.reserve(additional);
    }

    /// Number of distinct ids inserted so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing has been inserted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The pre-filter, for inspection.
    pub fn filter(&self) -> &IdFilter {
        &self.filter
    }

    /// Inserts one id and returns its dense index, old or new.
    ///
    /// # Panics
    /// Panics if the table outgrows the index range of `I`.
    pub fn insert(&mut self, id: I) -> I {
        self.filter.insert(id.low_bits());
        match self.old_to_new.entry(id) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => {
                let next = self.keys.len();
                let new_id = I::from_index(next)
                    .unwrap_or_else(|| panic!("IdHashMap is full: index {next} overflows"));
                self.keys.push(id);
                *slot.insert(new_id)
            }
        }
    }

    /// Inserts every id of a slice; repeats and known ids are ignored.
    pub fn update_slice(&mut self, ids: &[I]) {
        let before = self.keys.len();
        for &id in ids {
            self.insert(id);
        }
        tracing::debug!(
            input = ids.len(),
            added = self.keys.len() - before,
            total = self.keys.len(),
            "IdHashMap updated"
        );
    }

    /// Inserts every id of a buffer.
    ///
    /// # Errors
    /// [`Error::DTypeMismatch`] if the buffer's element type is not `I`.
    pub fn update(&mut self, ids: &TypedBuffer) -> Result<()> {
        ids.ensure_cpu()?;
        self.update_slice(ids.as_slice::<I>()?);
        Ok(())
    }

    /// Returns `true` iff `id` was ever inserted.
    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.filter.may_contain(id.low_bits()) && self.old_to_new.contains_key(&id)
    }

    /// Dense index of `id`, or `default` when absent.
    #[inline]
    pub fn map(&self, id: I, default: I) -> I {
        if !self.filter.may_contain(id.low_bits()) {
            return default;
        }
        self.old_to_new.get(&id).copied().unwrap_or(default)
    }

    /// Element-wise [`IdHashMap::map`] over a slice.
    pub fn map_slice(&self, ids: &[I], default: I) -> Vec<I> {
        ids.iter().map(|&id| self.map(id, default)).collect()
    }

    /// Element-wise [`IdHashMap::map`] into a new buffer shaped like `ids`.
    pub fn map_array(&self, ids: &TypedBuffer, default: I) -> Result<TypedBuffer> {
        self.map_array_in(&HostAllocator, ids, default)
    }

    /// [`IdHashMap::map_array`] through a caller-provided allocator.
    pub fn map_array_in(
        &self,
        alloc: &impl BufferAllocator,
        ids: &TypedBuffer,
        default: I,
    ) -> Result<TypedBuffer> {
        ids.ensure_cpu()?;
        let input = ids.as_slice::<I>()?;
        let mut out = alloc.allocate(ids.dtype(), ids.len(), ids.device())?;
        let dst = out.as_mut_slice::<I>()?;
        if dst.len() != input.len() {
            return Err(Error::LengthMismatch {
                expected: input.len(),
                got: dst.len(),
            });
        }
        for (dst, &id) in dst.iter_mut().zip(input) {
            *dst = self.map(id, default);
        }
        Ok(out)
    }

    /// Old ids ordered by new id, borrowed.
    #[inline]
    pub fn values_slice(&self) -> &[I] {
        &self.keys
    }

    /// Old ids ordered by new id, as a CPU buffer of `I`'s width.
    pub fn values(&self) -> TypedBuffer {
        TypedBuffer::from_slice(&self.keys)
    }

    /// [`IdHashMap::values`] through a caller-provided allocator.
    pub fn values_in(&self, alloc: &impl BufferAllocator) -> Result<TypedBuffer> {
        let mut out = alloc.allocate(I::DTYPE, self.keys.len(), Device::Cpu)?;
        let dst = out.as_mut_slice::<I>()?;
        if dst.len() != self.keys.len() {
            return Err(Error::LengthMismatch {
                expected: self.keys.len(),
                got: dst.len(),
            });
        }
        dst.copy_from_slice(&self.keys);
        Ok(out)
    }

    /// Iterates `(old, new)` pairs in new-id order.
    pub fn iter(&self) -> impl Iterator<Item = (I, I)> + '_ {
        self.keys
            .iter()
            .enumerate()
            .filter_map(|(new, &old)| I::from_index(new).map(|new| (old, new)))
    }
}

impl<I: IdType> Default for IdHashMap<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IdType> Extend<I> for IdHashMap<I> {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<I: IdType> FromIterator<I> for IdHashMap<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
