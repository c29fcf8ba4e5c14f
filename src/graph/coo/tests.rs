//! Tests for the COO matrix and sort engine.

use super::*;
use crate::buffer::Device;
use crate::config::Config;

fn sorted_triples<I: IdType>(coo: &CooMatrix) -> Vec<(I, I, I)> {
    let mut t = coo.triples::<I>().unwrap();
    t.sort_unstable();
    t
}

#[test]
fn test_is_sorted_detects_unsorted_columns() {
    let coo = CooMatrix::from_vecs(4, 10, vec![1i64, 1, 2, 3], vec![5, 2, 9, 1], None).unwrap();
    assert_eq!(is_sorted(&coo).unwrap(), (true, false));
}

#[test]
fn test_is_sorted_unsorted_rows() {
    let coo = CooMatrix::from_vecs(4, 4, vec![2i32, 1, 3], vec![0, 1, 2], None).unwrap();
    assert_eq!(is_sorted(&coo).unwrap(), (false, false));
}

#[test]
fn test_sort_materializes_identity_data() {
    // 2 -> 0, 0 -> 1, 1 -> 2, 0 -> 0
    let mut coo =
        CooMatrix::from_vecs(3, 3, vec![2i64, 0, 1, 0], vec![0, 1, 2, 0], None).unwrap();
    assert!(!coo.has_data());

    sort_in_place(&mut coo, true).unwrap();

    assert!(coo.has_data());
    assert!(coo.row_sorted());
    assert!(coo.col_sorted());
    assert_eq!(coo.row().to_vec::<i64>().unwrap(), vec![0, 0, 1, 2]);
    assert_eq!(coo.col().to_vec::<i64>().unwrap(), vec![0, 1, 2, 0]);
    // data records where each entry came from.
    assert_eq!(coo.data().unwrap().to_vec::<i64>().unwrap(), vec![3, 1, 2, 0]);
    assert_eq!(is_sorted(&coo).unwrap(), (true, true));
}

#[test]
fn test_sort_rows_only_sets_flags() {
    let mut coo = CooMatrix::from_vecs(
        3,
        3,
        vec![1i32, 0, 1, 0],
        vec![2, 2, 0, 1],
        Some(vec![10, 11, 12, 13]),
    )
    .unwrap();
    let before = sorted_triples::<i32>(&coo);

    sort_in_place(&mut coo, false).unwrap();

    assert!(coo.row_sorted());
    assert!(!coo.col_sorted());
    assert_eq!(coo.row().to_vec::<i32>().unwrap(), vec![0, 0, 1, 1]);
    assert!(is_sorted(&coo).unwrap().0);
    assert_eq!(sorted_triples::<i32>(&coo), before);
}

#[test]
fn test_sort_keeps_triples_together() {
    let mut coo = CooMatrix::from_vecs(
        5,
        5,
        vec![4i64, 1, 3, 1, 0, 4],
        vec![0, 3, 3, 1, 4, 2],
        Some(vec![100, 101, 102, 103, 104, 105]),
    )
    .unwrap();
    let before = sorted_triples::<i64>(&coo);

    sort_in_place(&mut coo, true).unwrap();

    assert_eq!(
        coo.triples::<i64>().unwrap(),
        vec![
            (0, 4, 104),
            (1, 1, 103),
            (1, 3, 101),
            (3, 3, 102),
            (4, 0, 100),
            (4, 2, 105),
        ]
    );
    assert_eq!(sorted_triples::<i64>(&coo), before);
}

#[test]
fn test_sort_already_sorted_is_noop() {
    let mut coo =
        CooMatrix::from_vecs(3, 3, vec![0i64, 1, 2], vec![2, 1, 0], Some(vec![7, 8, 9])).unwrap();
    let before = coo.clone();
    sort_in_place(&mut coo, true).unwrap();
    assert_eq!(coo.triples::<i64>().unwrap(), before.triples::<i64>().unwrap());
    assert!(coo.col_sorted());
}

#[test]
fn test_sort_empty_matrix() {
    let mut coo = CooMatrix::from_vecs::<i32>(0, 0, vec![], vec![], None).unwrap();
    sort_in_place(&mut coo, true).unwrap();
    assert_eq!(coo.nnz(), 0);
    assert!(coo.data().unwrap().is_empty());
    assert_eq!(is_sorted(&coo).unwrap(), (true, true));
}

#[test]
fn test_out_of_place_sort() {
    let coo = CooMatrix::from_vecs(2, 2, vec![1i32, 0], vec![0, 1], None).unwrap();
    let sorted = sort(&coo, false).unwrap();
    assert!(!coo.has_data());
    assert!(!coo.row_sorted());
    assert_eq!(sorted.row().to_vec::<i32>().unwrap(), vec![0, 1]);
    assert_eq!(sorted.data().unwrap().to_vec::<i32>().unwrap(), vec![1, 0]);
}

#[test]
fn test_sort_with_small_parallel_threshold() {
    let cfg = Config {
        parallel_sort_threshold: 1,
        ..Config::default()
    };
    let rows: Vec<i64> = (0..200).map(|i| (i * 37) % 11).collect();
    let cols: Vec<i64> = (0..200).map(|i| (i * 13) % 7).collect();
    let mut coo = CooMatrix::from_vecs(11, 7, rows, cols, None).unwrap();
    let before = sorted_triples::<i64>(&coo);

    sort_in_place_with(&mut coo, true, &cfg).unwrap();

    assert_eq!(is_sorted(&coo).unwrap(), (true, true));
    assert_eq!(sorted_triples::<i64>(&coo), before);
}

#[test]
fn test_layout_errors() {
    let err = CooMatrix::from_vecs(2, 2, vec![0i32, 1], vec![0], None).unwrap_err();
    assert_eq!(err, Error::LengthMismatch { expected: 2, got: 1 });

    let err = CooMatrix::new(
        2,
        2,
        TypedBuffer::from_vec(vec![0i32]),
        TypedBuffer::from_vec(vec![0i64]),
        None,
    )
    .unwrap_err();
    assert_eq!(
        err,
        Error::DTypeMismatch {
            expected: DType::I32,
            got: DType::I64
        }
    );

    let err = CooMatrix::new(
        2,
        2,
        TypedBuffer::from_vec(vec![0.0f32]),
        TypedBuffer::from_vec(vec![0.0f32]),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedDType { .. }));
}

#[test]
fn test_sort_rejects_remote_buffers() {
    let mut coo = CooMatrix::new(
        1,
        1,
        TypedBuffer::from_vec_on(vec![0i32], Device::Cuda(0)),
        TypedBuffer::from_vec_on(vec![0i32], Device::Cuda(0)),
        None,
    )
    .unwrap();
    assert!(matches!(
        sort_in_place(&mut coo, true),
        Err(Error::UnsupportedDevice { .. })
    ));
    assert!(!coo.row_sorted());
}

#[test]
fn test_sort_rejects_remote_col_or_data() {
    let host = |v: Vec<i64>| TypedBuffer::from_vec(v);
    let remote = |v: Vec<i64>| TypedBuffer::from_vec_on(v, Device::Cuda(0));

    let mut remote_col =
        CooMatrix::new(2, 2, host(vec![1, 0]), remote(vec![0, 1]), None).unwrap();
    assert_eq!(
        sort_in_place(&mut remote_col, true).unwrap_err(),
        Error::UnsupportedDevice {
            device: Device::Cuda(0)
        }
    );
    assert!(!remote_col.row_sorted());
    assert!(!remote_col.has_data());
    assert!(matches!(
        is_sorted(&remote_col),
        Err(Error::UnsupportedDevice { .. })
    ));

    let mut remote_data = CooMatrix::new(
        2,
        2,
        host(vec![1, 0]),
        host(vec![0, 1]),
        Some(remote(vec![0, 1])),
    )
    .unwrap();
    assert!(matches!(
        sort_in_place(&mut remote_data, false),
        Err(Error::UnsupportedDevice { .. })
    ));
    assert!(!remote_data.row_sorted());
    assert_eq!(remote_data.row().as_slice::<i64>().unwrap(), &[1, 0]);
    assert!(matches!(
        is_sorted(&remote_data),
        Err(Error::UnsupportedDevice { .. })
    ));
}

#[test]
fn test_sort_flags_invariant() {
    let coo = CooMatrix::from_vecs(1, 1, vec![0i32], vec![0], None)
        .unwrap()
        .with_sort_flags(false, true);
    assert!(!coo.row_sorted());
    assert!(!coo.col_sorted());
}

#[test]
fn test_data_or_identity() {
    let coo = CooMatrix::from_vecs(3, 3, vec![0i64, 1, 2], vec![0, 1, 2], None).unwrap();
    assert_eq!(
        coo.data_or_identity().unwrap().to_vec::<i64>().unwrap(),
        vec![0, 1, 2]
    );
    assert_eq!(coo.shape(), (3, 3));
    assert_eq!(coo.id_dtype(), DType::I64);
}
