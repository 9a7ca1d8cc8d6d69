//! End-to-end sync pass benchmarks.

use contactsync_bench::utils::{external_id, generate_remote};
use contactsync_engine::{StaticRemote, SyncConfig, SyncRunner};
use contactsync_store::MemoryStore;
use contactsync_testkit::{account, remote_account, scenarios, TEST_ACCOUNT_TYPE};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

fn remote_with(count: usize) -> Arc<StaticRemote> {
    Arc::new(StaticRemote::new().with_account(remote_account(), generate_remote(count)))
}

/// Benchmark a first pass into an empty store.
fn bench_initial_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_pass");
    group.sample_size(20);

    for count in [10, 100, 500].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let remote = remote_with(count);

            b.iter(|| {
                let runner = SyncRunner::new(
                    SyncConfig::new(TEST_ACCOUNT_TYPE),
                    Arc::clone(&remote),
                    Arc::clone(&remote),
                    MemoryStore::new(),
                );
                black_box(runner.run_sync(&account()).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark a repeat pass where every contact is replaced.
fn bench_repeat_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("repeat_pass");
    group.sample_size(20);

    for count in [10, 100, 500].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let remote = remote_with(count);
            let ids: Vec<String> = (0..count).map(external_id).collect();
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            let runner = SyncRunner::new(
                SyncConfig::new(TEST_ACCOUNT_TYPE),
                Arc::clone(&remote),
                remote,
                scenarios::mirrored_store(&ids),
            );

            b.iter(|| black_box(runner.run_sync(&account()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_initial_pass, bench_repeat_pass);

criterion_main!(benches);
