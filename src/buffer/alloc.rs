//! Buffer construction.
//!
//! The primitives never decide where memory comes from; they ask a
//! [`BufferAllocator`] for a buffer of a given dtype, length and device.

use super::storage::Storage;
use super::{DType, Device, TypedBuffer};
use crate::error::{Error, Result};

/// A service that creates zero-initialised buffers.
pub trait BufferAllocator {
    /// Allocates `len` elements of `dtype` on `device`.
    ///
    /// # Errors
    /// Implementations reject devices they cannot reach with
    /// [`Error::UnsupportedDevice`] and element types they cannot store with
    /// [`Error::UnsupportedDType`].
    fn allocate(&self, dtype: DType, len: usize, device: Device) -> Result<TypedBuffer>;
}

impl<A: BufferAllocator + ?Sized> BufferAllocator for &A {
    fn allocate(&self, dtype: DType, len: usize, device: Device) -> Result<TypedBuffer> {
        (**self).allocate(dtype, len, device)
    }
}

/// Allocator for host memory (`Device::Cpu`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HostAllocator;

impl BufferAllocator for HostAllocator {
    fn allocate(&self, dtype: DType, len: usize, device: Device) -> Result<TypedBuffer> {
        if device != Device::Cpu {
            return Err(Error::UnsupportedDevice { device });
        }
        let storage = match dtype {
            DType::I32 => Storage::I32(vec![0; len]),
            DType::I64 => Storage::I64(vec![0; len]),
            DType::F32 => Storage::F32(vec![0.0; len]),
            DType::F64 => Storage::F64(vec![0.0; len]),
            other => {
                return Err(Error::UnsupportedDType {
                    dtype: other,
                    op: "allocate",
                })
            }
        };
        Ok(TypedBuffer::from_storage(storage, device))
    }
}
