//! Criterion benchmarks for the contraction engine on jittered grids.
//! Focus sizes: n x n cells with n in {4, 8, 16}; index build, selection, and
//! full blocking recount versus the incremental refresh.
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p octolinear

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use octolinear::orientation::{select_independent, Contraction, ContractionIndex};
use octolinear::rand::{jittered_grid, GridCfg, ReplayToken};
use octolinear::{dcel::Subdivision, GeomCfg};

fn grid(n: usize, seed: u64) -> Subdivision {
    let cfg = GridCfg {
        rows: n,
        cols: n,
        ..GridCfg::default()
    };
    jittered_grid(cfg, ReplayToken { seed, index: 0 }, &GeomCfg::default()).unwrap()
}

fn bench_contraction(c: &mut Criterion) {
    let cfg = GeomCfg {
        self_check: false,
        ..GeomCfg::default()
    };
    let mut group = c.benchmark_group("contraction");
    for &n in &[4usize, 8, 16] {
        group.bench_with_input(BenchmarkId::new("index_build", n), &n, |b, &n| {
            b.iter_batched(
                || grid(n, 43),
                |sub| {
                    let _index = ContractionIndex::build(&sub, &cfg).unwrap();
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("select_independent", n), &n, |b, &n| {
            let sub = grid(n, 44);
            let index = ContractionIndex::build(&sub, &cfg).unwrap();
            b.iter(|| {
                let all: Vec<&Contraction> = index.contractions().collect();
                let _chosen = select_independent(&all);
            })
        });

        group.bench_with_input(BenchmarkId::new("apply_and_refresh", n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let sub = grid(n, 45);
                    let index = ContractionIndex::build(&sub, &cfg).unwrap();
                    let pick = {
                        let all: Vec<&Contraction> = index.contractions().collect();
                        select_independent(&all)
                            .into_iter()
                            .map(|i| all[i].clone())
                            .find(|k| k.targets().is_some())
                    };
                    (sub, index, pick)
                },
                |(mut sub, mut index, pick)| {
                    if let Some(k) = pick {
                        let delta = sub.apply_contraction(&k, &cfg).unwrap();
                        index.refresh(&sub, &delta, &cfg).unwrap();
                    }
                },
                BatchSize::SmallInput,
            )
        });

        // Full recount versus the incremental path after one applied move.
        let mut sub = grid(n, 46);
        let before = ContractionIndex::build(&sub, &cfg).unwrap();
        let pick = {
            let all: Vec<&Contraction> = before.contractions().collect();
            select_independent(&all)
                .into_iter()
                .map(|i| all[i].clone())
                .find(|k| k.targets().is_some())
        };
        let Some(k) = pick else { continue };
        let delta = sub.apply_contraction(&k, &cfg).unwrap();
        group.bench_with_input(BenchmarkId::new("blocking_recompute", n), &n, |b, _| {
            b.iter(|| {
                before
                    .contractions()
                    .filter(|c| sub.contains_half_edge(c.inner()) && !delta.is_stale(c.inner()))
                    .map(|c| c.recompute_blocking_number(&sub).unwrap())
                    .sum::<usize>()
            })
        });
        group.bench_with_input(BenchmarkId::new("blocking_incremental", n), &n, |b, _| {
            b.iter_batched(
                || before.clone(),
                |mut index| index.refresh(&sub, &delta, &cfg).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_contraction);
criterion_main!(benches);
