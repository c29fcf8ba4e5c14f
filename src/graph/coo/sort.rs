//! In-place lockstep sorting of the three COO arrays.
//!
//! The `(row, col, data)` arrays are ordered as if they were one array of
//! triples. Instead of materializing the triples, the engine sorts a
//! permutation of positions by the key and then gathers each array through
//! that permutation once, reusing one scratch vector.
//!
//! With the `parallel` feature, matrices with at least
//! [`Config::parallel_sort_threshold`] entries sort the permutation with
//! rayon. Tie order among equal keys is unspecified either way.

use super::CooMatrix;
use crate::buffer::{id_type_switch, IdType, TypedBuffer};
use crate::config::Config;
use crate::error::Result;
use core::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sorts `coo` by row, and by column within rows when `sort_column` is set.
///
/// A missing data array is first materialized as `[0, nnz)`, so afterwards
/// `data[i]` is the original position of entry `i`.
pub fn sort_in_place(coo: &mut CooMatrix, sort_column: bool) -> Result<()> {
    sort_in_place_with(coo, sort_column, &Config::default())
}

/// [`sort_in_place`] with an explicit configuration.
pub fn sort_in_place_with(coo: &mut CooMatrix, sort_column: bool, config: &Config) -> Result<()> {
    coo.check_layout()?;
    coo.ensure_cpu()?;

    let mut data = match coo.data.take() {
        Some(data) => data,
        None => coo.identity_data()?,
    };

    tracing::trace!(nnz = coo.nnz(), sort_column, "sorting COO matrix");

    let threshold = config.parallel_sort_threshold;
    let result = id_type_switch!(coo.id_dtype(), I, "coo_sort", {
        sort_buffers::<I>(&mut coo.row, &mut coo.col, &mut data, sort_column, threshold)
    });
    coo.data = Some(data);
    result?;

    coo.row_sorted = true;
    coo.col_sorted = sort_column;
    Ok(())
}

/// Returns a sorted copy of `coo`, leaving the input untouched.
pub fn sort(coo: &CooMatrix, sort_column: bool) -> Result<CooMatrix> {
    let mut out = coo.clone();
    sort_in_place(&mut out, sort_column)?;
    Ok(out)
}

/// Scans `coo` once and reports `(row_sorted, col_sorted)`.
pub fn is_sorted(coo: &CooMatrix) -> Result<(bool, bool)> {
    coo.check_layout()?;
    coo.ensure_cpu()?;
    id_type_switch!(coo.id_dtype(), I, "coo_is_sorted", {
        Ok(is_sorted_slices(
            coo.row.as_slice::<I>()?,
            coo.col.as_slice::<I>()?,
        ))
    })
}

/// Sortedness of parallel row/column slices.
///
/// `col_sorted` requires non-decreasing columns within every run of equal
/// rows, and is always `false` when rows are out of order.
pub fn is_sorted_slices<I: PartialOrd>(row: &[I], col: &[I]) -> (bool, bool) {
    debug_assert_eq!(row.len(), col.len());
    let mut col_sorted = true;
    for (r, c) in row.windows(2).zip(col.windows(2)) {
        if r[0] > r[1] {
            return (false, false);
        }
        col_sorted = col_sorted && (r[0] < r[1] || c[0] <= c[1]);
    }
    (true, col_sorted)
}

fn sort_buffers<I: IdType>(
    row: &mut TypedBuffer,
    col: &mut TypedBuffer,
    data: &mut TypedBuffer,
    sort_column: bool,
    parallel_threshold: usize,
) -> Result<()> {
    let row = row.as_mut_slice::<I>()?;
    let col = col.as_mut_slice::<I>()?;
    let data = data.as_mut_slice::<I>()?;

    let (rows_ok, cols_ok) = is_sorted_slices(row, col);
    if rows_ok && (cols_ok || !sort_column) {
        return Ok(());
    }

    let perm = argsort(row, col, sort_column, parallel_threshold);
    let mut scratch = Vec::with_capacity(perm.len());
    gather(row, &perm, &mut scratch);
    gather(col, &perm, &mut scratch);
    gather(data, &perm, &mut scratch);
    Ok(())
}

/// Positions of the entries in key order.
fn argsort<I: IdType>(row: &[I], col: &[I], sort_column: bool, parallel_threshold: usize) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..row.len()).collect();
    let by_key = |&a: &usize, &b: &usize| -> Ordering {
        let primary = row[a].cmp(&row[b]);
        if sort_column {
            primary.then_with(|| col[a].cmp(&col[b]))
        } else {
            primary
        }
    };

    #[cfg(feature = "parallel")]
    {
        if perm.len() >= parallel_threshold {
            perm.par_sort_unstable_by(by_key);
            return perm;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel_threshold;

    perm.sort_unstable_by(by_key);
    perm
}

/// `values = values[perm]`.
fn gather<I: Copy>(values: &mut [I], perm: &[usize], scratch: &mut Vec<I>) {
    scratch.clear();
    scratch.extend(perm.iter().map(|&p| values[p]));
    values.copy_from_slice(scratch);
}
