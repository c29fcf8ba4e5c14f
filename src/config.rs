//! Tunable constants shared by the primitives.
//!
//! Every field has a default, so a JSON document only needs to name the
//! values it overrides:
//!
//! ```rust
//! use sparsekit::Config;
//!
//! let cfg = Config::from_json_str(r#"{ "rejection_ratio": 20 }"#).unwrap();
//! assert_eq!(cfg.rejection_ratio, 20);
//! assert_eq!(cfg.filter_bits, 24);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime configuration for relabeling, sorting and sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of low identifier bits indexed by the relabeling filter.
    pub filter_bits: u32,
    /// `uniform_choice` without replacement uses rejection sampling while
    /// `num < population / rejection_ratio`, reservoir sampling otherwise.
    pub rejection_ratio: u64,
    /// Minimum number of non-zeros before the COO sort goes parallel.
    /// Only consulted with the `parallel` feature.
    pub parallel_sort_threshold: usize,
}

impl Config {
    /// Default filter width: a 2^24-bit (2 MiB) bitmap.
    pub const DEFAULT_FILTER_BITS: u32 = 24;
    /// Largest accepted filter width.
    pub const MAX_FILTER_BITS: u32 = 30;
    /// Default rejection/reservoir crossover.
    pub const DEFAULT_REJECTION_RATIO: u64 = 10;
    /// Default parallel sort cut-over.
    pub const DEFAULT_PARALLEL_SORT_THRESHOLD: usize = 1 << 16;

    /// Parses a JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Checks that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if self.filter_bits == 0 || self.filter_bits > Self::MAX_FILTER_BITS {
            return Err(Error::Config(format!(
                "filter_bits must be in 1..={}, got {}",
                Self::MAX_FILTER_BITS,
                self.filter_bits
            )));
        }
        if self.rejection_ratio == 0 {
            return Err(Error::Config("rejection_ratio must be positive".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter_bits: Self::DEFAULT_FILTER_BITS,
            rejection_ratio: Self::DEFAULT_REJECTION_RATIO,
            parallel_sort_threshold: Self::DEFAULT_PARALLEL_SORT_THRESHOLD,
        }
    }
}
