//! Correlation and batch planning benchmarks.

use contactsync_bench::utils::{generate_local, generate_minimal};
use contactsync_engine::{build_plan, reconcile};
use contactsync_testkit::account;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark correlating remote contacts against local records.
fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let remote = generate_minimal(count);
            let local = generate_local(count, 0.8);

            b.iter(|| {
                let result = reconcile(black_box(remote.clone()), black_box(&local));
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark how overlap between remote and local affects correlation.
fn bench_reconcile_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_overlap");
    let count = 1_000;

    for percent in [0u32, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(percent), percent, |b, &percent| {
            let remote = generate_minimal(count);
            let local = generate_local(count, f64::from(percent) / 100.0);

            b.iter(|| black_box(reconcile(remote.clone(), &local)));
        });
    }

    group.finish();
}

/// Benchmark turning a reconciliation result into batches.
fn bench_build_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_plan");
    let account = account();

    for count in [100, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let result = reconcile(generate_minimal(count), &generate_local(count, 0.5));

            b.iter(|| black_box(build_plan(&account, black_box(result.clone()))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reconcile,
    bench_reconcile_overlap,
    bench_build_plan,
);

criterion_main!(benches);
