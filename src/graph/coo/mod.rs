//! A coordinate-list (COO) sparse matrix over [`TypedBuffer`] index arrays.
//!
//! COO stores one `(row, col, data)` triple per non-zero in three parallel
//! arrays. `data` holds edge-data indices (typically edge ids); when it is
//! absent the matrix behaves as if `data == [0, 1, .., nnz)`.
//!
//! Memory layout:
//! - `row`: `nnz` row indices
//! - `col`: `nnz` column indices
//! - `data`: optional `nnz` edge-data indices
//!
//! All three arrays share one integer dtype (`int32` or `int64`). The
//! `row_sorted` / `col_sorted` flags record what the sort engine has
//! established; `col_sorted` always implies `row_sorted`.

mod sort;

pub use sort::{is_sorted, is_sorted_slices, sort, sort_in_place, sort_in_place_with};

use crate::buffer::{DType, IdType, TypedBuffer};
use crate::error::{Error, Result};

/// A COO sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix {
    num_rows: usize,
    num_cols: usize,
    row: TypedBuffer,
    col: TypedBuffer,
    data: Option<TypedBuffer>,
    row_sorted: bool,
    col_sorted: bool,
}

impl CooMatrix {
    /// Assembles a matrix from index buffers. Both sort flags start `false`.
    ///
    /// # Errors
    /// - [`Error::UnsupportedDType`] if `row` is not `int32`/`int64`.
    /// - [`Error::DTypeMismatch`] if `col` or `data` differ from `row`'s dtype.
    /// - [`Error::LengthMismatch`] if the arrays differ in length.
    pub fn new(
        num_rows: usize,
        num_cols: usize,
        row: TypedBuffer,
        col: TypedBuffer,
        data: Option<TypedBuffer>,
    ) -> Result<Self> {
        let coo = Self {
            num_rows,
            num_cols,
            row,
            col,
            data,
            row_sorted: false,
            col_sorted: false,
        };
        coo.check_layout()?;
        Ok(coo)
    }

    /// Builds a matrix from typed vectors.
    pub fn from_vecs<I: IdType>(
        num_rows: usize,
        num_cols: usize,
        row: Vec<I>,
        col: Vec<I>,
        data: Option<Vec<I>>,
    ) -> Result<Self> {
        Self::new(
            num_rows,
            num_cols,
            TypedBuffer::from_vec(row),
            TypedBuffer::from_vec(col),
            data.map(TypedBuffer::from_vec),
        )
    }

    /// Overrides the sort flags, e.g. when the caller knows the input order.
    ///
    /// `col_sorted` without `row_sorted` is normalized to unsorted columns.
    #[must_use]
    pub fn with_sort_flags(mut self, row_sorted: bool, col_sorted: bool) -> Self {
        self.row_sorted = row_sorted;
        self.col_sorted = row_sorted && col_sorted;
        self
    }

    pub(crate) fn check_layout(&self) -> Result<()> {
        let dtype = self.row.dtype();
        if dtype != DType::I32 && dtype != DType::I64 {
            return Err(Error::UnsupportedDType { dtype, op: "coo" });
        }
        let nnz = self.row.len();
        for other in core::iter::once(&self.col).chain(self.data.as_ref()) {
            if other.dtype() != dtype {
                return Err(Error::DTypeMismatch {
                    expected: dtype,
                    got: other.dtype(),
                });
            }
            if other.len() != nnz {
                return Err(Error::LengthMismatch {
                    expected: nnz,
                    got: other.len(),
                });
            }
        }
        Ok(())
    }

    /// Fails with [`Error::UnsupportedDevice`] unless every array is on the host.
    pub(crate) fn ensure_cpu(&self) -> Result<()> {
        self.row.ensure_cpu()?;
        self.col.ensure_cpu()?;
        self.data.as_ref().map_or(Ok(()), TypedBuffer::ensure_cpu)
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.row.len()
    }

    /// `(num_rows, num_cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Index dtype shared by all arrays.
    #[inline]
    pub fn id_dtype(&self) -> DType {
        self.row.dtype()
    }

    /// Row indices.
    #[inline]
    pub fn row(&self) -> &TypedBuffer {
        &self.row
    }

    /// Column indices.
    #[inline]
    pub fn col(&self) -> &TypedBuffer {
        &self.col
    }

    /// Edge-data indices, if materialized.
    #[inline]
    pub fn data(&self) -> Option<&TypedBuffer> {
        self.data.as_ref()
    }

    /// Returns `true` if an explicit data array is present.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Whether rows are known to be non-decreasing.
    #[inline]
    pub fn row_sorted(&self) -> bool {
        self.row_sorted
    }

    /// Whether columns are known to be non-decreasing within each row.
    #[inline]
    pub fn col_sorted(&self) -> bool {
        self.col_sorted
    }

    /// The data array, or the identity `[0, nnz)` when absent.
    pub fn data_or_identity(&self) -> Result<TypedBuffer> {
        match &self.data {
            Some(data) => Ok(data.clone()),
            None => self.identity_data(),
        }
    }

    fn identity_data(&self) -> Result<TypedBuffer> {
        let nnz = i64::try_from(self.nnz()).map_err(|_| Error::IndexOverflow {
            value: self.nnz(),
            dtype: DType::I64,
        })?;
        TypedBuffer::range(0, nnz, self.row.dtype(), self.row.device())
    }

    /// Collects `(row, col, data)` triples; absent data reads as the position.
    pub fn triples<I: IdType>(&self) -> Result<Vec<(I, I, I)>> {
        let row = self.row.as_slice::<I>()?;
        let col = self.col.as_slice::<I>()?;
        let data = self.data_or_identity()?;
        let data = data.as_slice::<I>()?;
        Ok(row
            .iter()
            .zip(col)
            .zip(data)
            .map(|((&r, &c), &d)| (r, c, d))
            .collect())
    }
}

#[cfg(test)]
mod tests;
