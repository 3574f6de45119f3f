use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use impedance_synth::prelude::*;

fn worked_example() -> Expression<Scalar> {
    Expression::parallel(
        Expression::leaf(220_000.0),
        Expression::series(Expression::leaf(47_000.0), Expression::leaf(100_000.0)),
    )
}

fn bench_evaluator(c: &mut Criterion) {
    let expr = worked_example();
    let mut evaluator = Evaluator::with_capacity(expr.leaf_count());
    c.bench_function("evaluate_three_leaves", |b| {
        b.iter(|| evaluator.evaluate(std::hint::black_box(&expr)))
    });
}

fn bench_synthesis(c: &mut Criterion) {
    let catalog = Catalog::new(ESeries::E6, 10.0, 10.0e6).expect("valid catalog");
    let mut group = c.benchmark_group("synthesis_e6");
    for parallel in [false, true] {
        let config =
            SynthesisConfig::new(88_120.0, Tolerance::Relative(0.001), 3).with_parallel(parallel);
        let label = if parallel { "rayon" } else { "sequential" };
        group.bench_function(BenchmarkId::new(label, config.max_leaves), |b| {
            b.iter(|| Synthesizer::new(catalog.magnitudes(), config.clone()).run())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluator, bench_synthesis);
criterion_main!(benches);
