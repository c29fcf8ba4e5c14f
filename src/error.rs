//! Error types for `sparsekit`.

use crate::buffer::{DType, Device};
use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the relabeling, COO sort and sampling primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Sampling without replacement asked for more items than exist.
    #[error("cannot take {num} samples from a population of {population} when replace=false")]
    SampleSizeExceedsPopulation {
        /// Requested number of samples.
        num: usize,
        /// Size of the population.
        population: usize,
    },

    /// The categorical weight array does not describe a distribution.
    #[error("invalid weights: {reason}")]
    InvalidWeights {
        /// What is wrong with the weights.
        reason: String,
    },

    /// A draw was requested from an empty population.
    #[error("cannot draw from an empty population")]
    EmptyPopulation,

    /// A buffer's element type is not the one the operation requires.
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch {
        /// The dtype the operation needs.
        expected: DType,
        /// The dtype that was passed in.
        got: DType,
    },

    /// The operation has no kernel for this element type.
    #[error("unsupported dtype {dtype} for operation '{op}'")]
    UnsupportedDType {
        /// The rejected dtype.
        dtype: DType,
        /// The operation name.
        op: &'static str,
    },

    /// Parallel arrays that must agree in length do not.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Length of the reference array.
        expected: usize,
        /// Length of the offending array.
        got: usize,
    },

    /// The buffer lives on a device this crate cannot serve.
    #[error("unsupported device {device}")]
    UnsupportedDevice {
        /// The rejected device.
        device: Device,
    },

    /// A value does not fit the requested integer width.
    #[error("value {value} does not fit in {dtype}")]
    IndexOverflow {
        /// The value that overflowed.
        value: usize,
        /// The target dtype.
        dtype: DType,
    },

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid_weights(reason: impl Into<String>) -> Self {
        Self::InvalidWeights {
            reason: reason.into(),
        }
    }
}
