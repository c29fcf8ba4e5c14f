//! `IdFilter` — a fixed-size bitmap over the low bits of an identifier.
//!
//! Each identifier selects one bit by masking its two's-complement
//! representation with `2^bits - 1`. Bits are only ever set, never cleared,
//! so an unset bit proves the identifier was never recorded while a set bit
//! only says "maybe" (other identifiers share the same low bits).
//!
//! Storage is a boxed `[u64]` of `2^bits / 64` words, allocated once.

use crate::error::{Error, Result};
use core::fmt;

/// A monotone bitmap indexed by `id & mask`.
#[derive(Clone, PartialEq, Eq)]
pub struct IdFilter {
    words: Box<[u64]>,
    mask: u64,
}

impl IdFilter {
    /// Default width in bits (a 16 M-entry bitmap).
    pub const DEFAULT_BITS: u32 = 24;
    /// Largest supported width.
    pub const MAX_BITS: u32 = 30;

    /// Creates a filter of [`Self::DEFAULT_BITS`].
    pub fn new() -> Self {
        Self::build(Self::DEFAULT_BITS)
    }

    /// Creates a filter over the low `bits` bits of each identifier.
    ///
    /// # Errors
    /// `bits` must be in `1..=MAX_BITS`.
    pub fn with_bits(bits: u32) -> Result<Self> {
        if bits == 0 || bits > Self::MAX_BITS {
            return Err(Error::Config(format!(
                "filter width must be in 1..={}, got {bits}",
                Self::MAX_BITS
            )));
        }
        Ok(Self::build(bits))
    }

    fn build(bits: u32) -> Self {
        let slots = 1usize << bits;
        let words = slots.div_ceil(64);
        Self {
            words: vec![0u64; words].into_boxed_slice(),
            mask: (1u64 << bits) - 1,
        }
    }

    #[inline(always)]
    fn locate(&self, low_bits: u64) -> (usize, u64) {
        let slot = low_bits & self.mask;
        // `slot < 2^30`, so the word index fits in usize on every target.
        ((slot / 64) as usize, 1u64 << (slot % 64))
    }

    /// Records an identifier's low bits.
    #[inline]
    pub fn insert(&mut self, low_bits: u64) {
        let (word, bit) = self.locate(low_bits);
        self.words[word] |= bit;
    }

    /// Returns `false` only if no identifier with these low bits was inserted.
    #[inline]
    pub fn may_contain(&self, low_bits: u64) -> bool {
        let (word, bit) = self.locate(low_bits);
        self.words[word] & bit != 0
    }

    /// The mask applied to identifiers.
    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Number of addressable bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * 64
    }

    /// Number of bits currently set.
    pub fn count_set(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl Default for IdFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdFilter")
            .field("mask", &format_args!("{:#x}", self.mask))
            .field("set", &self.count_set())
            .finish()
    }
}
