mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use glam::{DVec3, IVec3};
use ray_patterns::prelude::{
    CrackleParams, Pattern, PatternKind, RenderSettings, ThreadContext,
};

fn context(budget: usize) -> ThreadContext {
    ThreadContext::new(RenderSettings::new().with_crackle_cache_budget(budget))
        .expect("valid settings")
}

fn crackle_cases() -> Vec<(&'static str, CrackleParams)> {
    vec![
        ("euclidean", CrackleParams::default()),
        ("manhattan", CrackleParams::default().with_metric(1.0)),
        ("power3", CrackleParams::default().with_metric(3.0)),
        (
            "facets",
            CrackleParams::default().with_form(DVec3::new(1.0, 0.0, 0.0)),
        ),
        ("solid", CrackleParams::default().with_solid(true)),
        (
            "repeat",
            CrackleParams::default().with_repeat(IVec3::new(4, 4, 0)),
        ),
    ]
}

fn crackle_warm_benches(c: &mut Criterion) {
    let points = common::grid_points(8.0, 64, 0.5);

    let mut group = c.benchmark_group("crackle/warm");
    group.throughput(common::elements_throughput(points.len()));
    for (name, params) in crackle_cases() {
        let pattern = Pattern::new(PatternKind::Crackle(params));
        let mut ctx = context(ray_patterns::config::DEFAULT_CRACKLE_CACHE_BUDGET);
        group.bench_with_input(BenchmarkId::from_parameter(name), &pattern, |b, pattern| {
            b.iter(|| {
                let mut sum = 0.0;
                for &p in &points {
                    sum += pattern.evaluate(black_box(p), None, &mut ctx).unwrap_or(0.0);
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

fn crackle_cache_benches(c: &mut Criterion) {
    let points = common::grid_points(8.0, 64, 0.5);
    let pattern = Pattern::new(PatternKind::Crackle(CrackleParams::default()));

    let mut group = c.benchmark_group("crackle/cache");
    group.throughput(common::elements_throughput(points.len()));
    for (name, budget) in [("cold", ray_patterns::config::DEFAULT_CRACKLE_CACHE_BUDGET), ("uncached", 0)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || context(budget),
                |mut ctx| {
                    let mut sum = 0.0;
                    for &p in &points {
                        sum += pattern.evaluate(black_box(p), None, &mut ctx).unwrap_or(0.0);
                    }
                    black_box(sum)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = crackle_warm_benches, crackle_cache_benches
}
criterion_main!(benches);
