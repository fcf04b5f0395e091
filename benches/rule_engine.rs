// Rule engine and dispatch benchmarks
// Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use liteforge::prelude::*;

fn signup_rules() -> RuleEngine {
    let mut engine = RuleEngine::new();
    engine
        .add_rule("name", ["required", "max_length"])
        .add_rule("email", ["required", "email", "max_length"])
        .add_rule("password", ["required", "min_length", "max_length"])
        .add_rule("age", ["numeric"]);
    engine
}

/// Benchmark validating input that passes every rule
fn bench_validate_valid(c: &mut Criterion) {
    let engine = signup_rules();
    let data = fields([
        ("name", "Ana"),
        ("email", "ana@example.com"),
        ("password", "correct horse"),
        ("age", "42"),
    ]);

    c.bench_function("validate_valid", |b| {
        b.iter(|| black_box(engine.validate(black_box(&data))));
    });
}

/// Benchmark validating input where most rules fail
fn bench_validate_invalid(c: &mut Criterion) {
    let engine = signup_rules();
    let data = fields([("email", "not an email"), ("password", "abc"), ("age", "x")]);

    c.bench_function("validate_invalid", |b| {
        b.iter(|| black_box(engine.validate(black_box(&data))));
    });
}

/// Benchmark one request through middleware, filters and an action
fn bench_dispatch(c: &mut Criterion) {
    c.bench_function("dispatch_full_pipeline", |b| {
        b.iter(|| {
            let actions = ActionTable::new().with("index", |count: &mut u64, _: &[Value]| {
                *count += 1;
                Ok(())
            });
            let mut dispatcher = Dispatcher::new(0u64, actions);
            dispatcher
                .register_middleware(|| true)
                .register_middleware(|| true)
                .register_before_filter("index", || true)
                .register_after_filter("index", || true);
            black_box(dispatcher.execute(black_box("index"), &[]).ok());
        });
    });
}

criterion_group!(
    benches,
    bench_validate_valid,
    bench_validate_invalid,
    bench_dispatch
);
criterion_main!(benches);
