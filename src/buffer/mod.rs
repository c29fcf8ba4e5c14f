//! `TypedBuffer` — the array handle every primitive consumes and produces.
//!
//! A buffer is a contiguous, one-dimensional run of fixed-width elements with a
//! [`DType`] and a [`Device`] context. Length and element type are fixed at
//! creation; the only mutation is element writes through
//! [`TypedBuffer::as_mut_slice`].
//!
//! Typed access is checked: asking for `&[i64]` from an `int32` buffer is an
//! [`Error::DTypeMismatch`], never a reinterpretation of the bytes.
//!
//! New buffers are produced through a [`BufferAllocator`]; the crate ships a
//! [`HostAllocator`] for `Device::Cpu`.

pub mod alloc;

pub use alloc::{BufferAllocator, HostAllocator};

use crate::error::{Error, Result};
use core::fmt;
use num_traits::{Float, PrimInt};
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use zerocopy::{AsBytes, FromBytes};

/// Kind of number stored in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DTypeCode {
    /// Signed two's-complement integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// IEEE-754 floating point.
    Float,
}

/// Element type of a buffer: a code plus a bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DType {
    /// Number kind.
    pub code: DTypeCode,
    /// Width in bits.
    pub bits: u8,
}

impl DType {
    /// 32-bit signed integer.
    pub const I32: Self = Self::new(DTypeCode::Int, 32);
    /// 64-bit signed integer.
    pub const I64: Self = Self::new(DTypeCode::Int, 64);
    /// 32-bit float.
    pub const F32: Self = Self::new(DTypeCode::Float, 32);
    /// 64-bit float.
    pub const F64: Self = Self::new(DTypeCode::Float, 64);

    /// Creates a dtype descriptor.
    pub const fn new(code: DTypeCode, bits: u8) -> Self {
        Self { code, bits }
    }

    /// Signed integer of the given width.
    pub const fn int(bits: u8) -> Self {
        Self::new(DTypeCode::Int, bits)
    }

    /// Size of one element in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        (self.bits as usize + 7) / 8
    }

    /// True for signed or unsigned integers.
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self.code, DTypeCode::Int | DTypeCode::UInt)
    }

    /// True for floating point.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self.code, DTypeCode::Float)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.code {
            DTypeCode::Int => "int",
            DTypeCode::UInt => "uint",
            DTypeCode::Float => "float",
        };
        write!(f, "{prefix}{}", self.bits)
    }
}

/// Device context a buffer belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    /// Host memory.
    #[default]
    Cpu,
    /// A CUDA device by ordinal. Only representable; no kernels run there.
    Cuda(u32),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(id) => write!(f, "cuda:{id}"),
        }
    }
}

#[doc(hidden)]
pub mod storage {
    /// Backing store of a [`super::TypedBuffer`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum Storage {
        I32(Vec<i32>),
        I64(Vec<i64>),
        F32(Vec<f32>),
        F64(Vec<f64>),
    }
}

use storage::Storage;

mod private {
    pub trait Sealed {}
}

/// A Rust type that can live in a [`TypedBuffer`].
///
/// Sealed: implemented for `i32`, `i64`, `f32` and `f64`.
pub trait Element:
    Copy + Default + PartialOrd + fmt::Debug + Send + Sync + AsBytes + FromBytes + 'static + private::Sealed
{
    /// The dtype tag for this type.
    const DTYPE: DType;

    #[doc(hidden)]
    fn view(storage: &Storage) -> Option<&[Self]>;
    #[doc(hidden)]
    fn view_mut(storage: &mut Storage) -> Option<&mut [Self]>;
    #[doc(hidden)]
    fn wrap(values: Vec<Self>) -> Storage;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident, $dtype:expr) => {
        impl private::Sealed for $ty {}

        impl Element for $ty {
            const DTYPE: DType = $dtype;

            #[inline]
            fn view(storage: &Storage) -> Option<&[Self]> {
                match storage {
                    Storage::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn view_mut(storage: &mut Storage) -> Option<&mut [Self]> {
                match storage {
                    Storage::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn wrap(values: Vec<Self>) -> Storage {
                Storage::$variant(values)
            }
        }
    };
}

impl_element!(i32, I32, DType::I32);
impl_element!(i64, I64, DType::I64);
impl_element!(f32, F32, DType::F32);
impl_element!(f64, F64, DType::F64);

/// Integer element usable as an identifier or index.
pub trait IdType: Element + PrimInt + Hash + Eq + Ord {
    /// Low 64 bits of the two's-complement representation.
    fn low_bits(self) -> u64;

    /// Converts a dense index, returning `None` when it does not fit.
    fn from_index(index: usize) -> Option<Self>;

    /// Converts to an index, returning `None` for negative values.
    fn to_index(self) -> Option<usize>;
}

macro_rules! impl_id_type {
    ($ty:ty) => {
        impl IdType for $ty {
            #[inline]
            #[allow(clippy::cast_sign_loss)]
            fn low_bits(self) -> u64 {
                self as u64
            }

            #[inline]
            fn from_index(index: usize) -> Option<Self> {
                <$ty>::try_from(index).ok()
            }

            #[inline]
            fn to_index(self) -> Option<usize> {
                usize::try_from(self).ok()
            }
        }
    };
}

impl_id_type!(i32);
impl_id_type!(i64);

/// Floating-point element usable as a categorical weight.
pub trait WeightType: Element + Float {}

impl WeightType for f32 {}
impl WeightType for f64 {}

/// Runs `$body` with `$T` bound to the integer type matching `$dtype`.
///
/// Any other dtype yields [`Error::UnsupportedDType`] for operation `$op`.
macro_rules! id_type_switch {
    ($dtype:expr, $T:ident, $op:expr, $body:block) => {
        match $dtype {
            $crate::buffer::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::buffer::DType::I64 => {
                type $T = i64;
                $body
            }
            other => Err($crate::error::Error::UnsupportedDType { dtype: other, op: $op }),
        }
    };
}

/// Float counterpart of `id_type_switch!`.
macro_rules! float_type_switch {
    ($dtype:expr, $T:ident, $op:expr, $body:block) => {
        match $dtype {
            $crate::buffer::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::buffer::DType::F64 => {
                type $T = f64;
                $body
            }
            other => Err($crate::error::Error::UnsupportedDType { dtype: other, op: $op }),
        }
    };
}

pub(crate) use float_type_switch;
pub(crate) use id_type_switch;

/// A typed, contiguous, one-dimensional buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBuffer {
    storage: Storage,
    device: Device,
}

impl TypedBuffer {
    /// Wraps a vector as a CPU buffer.
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        Self::from_vec_on(values, Device::Cpu)
    }

    /// Wraps a vector and tags it with `device`.
    ///
    /// Intended for [`BufferAllocator`] implementations.
    pub fn from_vec_on<T: Element>(values: Vec<T>, device: Device) -> Self {
        Self {
            storage: T::wrap(values),
            device,
        }
    }

    /// Copies a slice into a new CPU buffer.
    pub fn from_slice<T: Element>(values: &[T]) -> Self {
        Self::from_vec(values.to_vec())
    }

    /// Allocates a zero-filled buffer with the host allocator.
    pub fn zeros(dtype: DType, len: usize, device: Device) -> Result<Self> {
        HostAllocator.allocate(dtype, len, device)
    }

    /// `[start, end)` as an integer buffer of `dtype`.
    pub fn range(start: i64, end: i64, dtype: DType, device: Device) -> Result<Self> {
        Self::range_in(&HostAllocator, start, end, dtype, device)
    }

    /// [`TypedBuffer::range`] through a caller-provided allocator.
    pub fn range_in(
        alloc: &impl BufferAllocator,
        start: i64,
        end: i64,
        dtype: DType,
        device: Device,
    ) -> Result<Self> {
        let len = usize::try_from(end.saturating_sub(start)).unwrap_or(0);
        let mut out = alloc.allocate(dtype, len, device)?;
        id_type_switch!(dtype, I, "range", {
            let slice = out.as_mut_slice::<I>()?;
            for (offset, v) in slice.iter_mut().enumerate() {
                let value = start + offset as i64;
                *v = <I as num_traits::NumCast>::from(value).ok_or(Error::IndexOverflow {
                    value: usize::try_from(value).unwrap_or(usize::MAX),
                    dtype,
                })?;
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Decodes native-endian bytes as elements of `dtype`.
    ///
    /// Fails unless `bytes.len()` is a whole number of elements.
    pub fn from_bytes(dtype: DType, bytes: &[u8], device: Device) -> Result<Self> {
        fn decode<T: Element>(bytes: &[u8]) -> Result<Vec<T>> {
            let width = core::mem::size_of::<T>();
            if bytes.len() % width != 0 {
                return Err(Error::LengthMismatch {
                    expected: bytes.len() / width * width,
                    got: bytes.len(),
                });
            }
            Ok(bytes
                .chunks_exact(width)
                .filter_map(T::read_from)
                .collect())
        }

        let storage = match dtype {
            DType::I32 => Storage::I32(decode(bytes)?),
            DType::I64 => Storage::I64(decode(bytes)?),
            DType::F32 => Storage::F32(decode(bytes)?),
            DType::F64 => Storage::F64(decode(bytes)?),
            other => {
                return Err(Error::UnsupportedDType {
                    dtype: other,
                    op: "from_bytes",
                })
            }
        };
        Ok(Self { storage, device })
    }

    /// The element type.
    #[inline]
    pub fn dtype(&self) -> DType {
        match &self.storage {
            Storage::I32(_) => DType::I32,
            Storage::I64(_) => DType::I64,
            Storage::F32(_) => DType::F32,
            Storage::F64(_) => DType::F64,
        }
    }

    /// The device context.
    #[inline]
    pub fn device(&self) -> Device {
        self.device
    }

    /// Number of elements (`shape[0]`).
    #[inline]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::I32(v) => v.len(),
            Storage::I64(v) => v.len(),
            Storage::F32(v) => v.len(),
            Storage::F64(v) => v.len(),
        }
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The one-dimensional shape.
    #[inline]
    pub fn shape(&self) -> [usize; 1] {
        [self.len()]
    }

    /// Typed read access.
    pub fn as_slice<T: Element>(&self) -> Result<&[T]> {
        let got = self.dtype();
        T::view(&self.storage).ok_or(Error::DTypeMismatch {
            expected: T::DTYPE,
            got,
        })
    }

    /// Typed write access. The length cannot change.
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T]> {
        let got = self.dtype();
        T::view_mut(&mut self.storage).ok_or(Error::DTypeMismatch {
            expected: T::DTYPE,
            got,
        })
    }

    /// Copies the contents out as a `Vec<T>`.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.as_slice::<T>().map(<[T]>::to_vec)
    }

    /// Raw bytes in native byte order.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::I32(v) => v.as_slice().as_bytes(),
            Storage::I64(v) => v.as_slice().as_bytes(),
            Storage::F32(v) => v.as_slice().as_bytes(),
            Storage::F64(v) => v.as_slice().as_bytes(),
        }
    }

    /// Fails with [`Error::UnsupportedDevice`] unless the buffer is on the host.
    pub(crate) fn ensure_cpu(&self) -> Result<()> {
        match self.device {
            Device::Cpu => Ok(()),
            device => Err(Error::UnsupportedDevice { device }),
        }
    }

    pub(crate) fn from_storage(storage: Storage, device: Device) -> Self {
        Self { storage, device }
    }
}

impl<T: Element> From<Vec<T>> for TypedBuffer {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}
