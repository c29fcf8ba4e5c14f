use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use sparsekit::{sort_in_place, sort_in_place_with, Config, CooMatrix, RandomEngine};

fn random_coo(nnz: usize, dim: usize, seed: u64) -> CooMatrix {
    let mut rng = RandomEngine::seed_from_u64(seed);
    let row = (0..nnz).map(|_| rng.rand_int(dim) as i64).collect();
    let col = (0..nnz).map(|_| rng.rand_int(dim) as i64).collect();
    CooMatrix::from_vecs::<i64>(dim, dim, row, col, None).unwrap()
}

// Sorting a Vec of materialized triples, for comparison.
fn naive_sort(coo: &CooMatrix) -> Vec<(i64, i64, i64)> {
    let mut triples = coo.triples::<i64>().unwrap();
    triples.sort_unstable_by_key(|t| (t.0, t.1));
    triples
}

fn bench_coo_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("COO Sort");

    for &nnz in &[10_000usize, 1_000_000] {
        let coo = random_coo(nnz, nnz / 10, 7);

        group.bench_with_input(BenchmarkId::new("Triples", nnz), &coo, |b, coo| {
            b.iter(|| black_box(naive_sort(coo)))
        });

        group.bench_with_input(BenchmarkId::new("Row+Col", nnz), &coo, |b, coo| {
            b.iter_batched(
                || coo.clone(),
                |mut m| sort_in_place(&mut m, true).unwrap(),
                BatchSize::LargeInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("Row", nnz), &coo, |b, coo| {
            b.iter_batched(
                || coo.clone(),
                |mut m| sort_in_place(&mut m, false).unwrap(),
                BatchSize::LargeInput,
            )
        });

        let serial = Config {
            parallel_sort_threshold: usize::MAX,
            ..Config::default()
        };
        group.bench_with_input(BenchmarkId::new("Row+Col Serial", nnz), &coo, |b, coo| {
            b.iter_batched(
                || coo.clone(),
                |mut m| sort_in_place_with(&mut m, true, &serial).unwrap(),
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_coo_sort);
criterion_main!(benches);
