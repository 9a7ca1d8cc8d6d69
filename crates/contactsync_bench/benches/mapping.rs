//! Field mapping benchmarks.

use contactsync_bench::utils::generate_remote;
use contactsync_engine::{insert_batch, map_fields};
use contactsync_testkit::{account, sample_contact};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark mapping one fully populated contact.
fn bench_map_single(c: &mut Criterion) {
    let contact = sample_contact("bench");

    c.bench_function("map_fields_single", |b| {
        b.iter(|| black_box(map_fields(black_box(&contact))));
    });
}

/// Benchmark building insert batches for many contacts.
fn bench_insert_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_batches");
    let account = account();

    for count in [10, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let contacts = generate_remote(count);

            b.iter(|| {
                for contact in &contacts {
                    black_box(insert_batch(&account, contact));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_map_single, bench_insert_batches);

criterion_main!(benches);
