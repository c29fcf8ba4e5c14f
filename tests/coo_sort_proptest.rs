use proptest::prelude::*;
use sparsekit::{is_sorted, sort_in_place, sort_in_place_with, Config, CooMatrix};

fn entries(max_dim: i64) -> impl Strategy<Value = Vec<(i64, i64)>> {
    proptest::collection::vec((0..max_dim, 0..max_dim), 0..200)
}

fn build(entries: &[(i64, i64)], with_data: bool) -> CooMatrix {
    let row: Vec<i64> = entries.iter().map(|e| e.0).collect();
    let col: Vec<i64> = entries.iter().map(|e| e.1).collect();
    let data = with_data.then(|| (0..entries.len() as i64).map(|i| i * 10).collect());
    CooMatrix::from_vecs(32, 32, row, col, data).unwrap()
}

fn sorted_triples(coo: &CooMatrix) -> Vec<(i64, i64, i64)> {
    let mut t = coo.triples::<i64>().unwrap();
    t.sort_unstable();
    t
}

proptest! {
    #[test]
    fn test_sort_by_row_and_col(entries in entries(32), with_data in any::<bool>()) {
        let mut coo = build(&entries, with_data);
        let before = sorted_triples(&coo);

        sort_in_place(&mut coo, true).unwrap();

        prop_assert_eq!(is_sorted(&coo).unwrap(), (true, true));
        prop_assert!(coo.row_sorted() && coo.col_sorted());
        prop_assert!(coo.has_data());
        prop_assert_eq!(sorted_triples(&coo), before);
    }

    #[test]
    fn test_sort_by_row_only(entries in entries(8)) {
        let mut coo = build(&entries, false);
        let before = sorted_triples(&coo);

        sort_in_place(&mut coo, false).unwrap();

        prop_assert!(is_sorted(&coo).unwrap().0);
        prop_assert!(coo.row_sorted());
        prop_assert!(!coo.col_sorted());
        prop_assert_eq!(sorted_triples(&coo), before);
    }

    #[test]
    fn test_identity_data_records_origin(entries in entries(16)) {
        let original = build(&entries, false);
        let mut coo = original.clone();
        sort_in_place(&mut coo, true).unwrap();

        let orig_triples = original.triples::<i64>().unwrap();
        for (r, c, d) in coo.triples::<i64>().unwrap() {
            let (or, oc, _) = orig_triples[d as usize];
            prop_assert_eq!((r, c), (or, oc));
        }
    }

    #[test]
    fn test_parallel_threshold_does_not_change_result(entries in entries(16)) {
        let cfg = Config { parallel_sort_threshold: 1, ..Config::default() };
        let mut a = build(&entries, true);
        let mut b = a.clone();

        sort_in_place(&mut a, true).unwrap();
        sort_in_place_with(&mut b, true, &cfg).unwrap();

        prop_assert_eq!(is_sorted(&b).unwrap(), (true, true));
        prop_assert_eq!(sorted_triples(&a), sorted_triples(&b));
    }
}
