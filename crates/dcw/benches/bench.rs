use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use dcw::{CandidateGenerator, Formatter, LockCandidateGenerator, Vocabulary};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

// Candidates generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_CANDIDATES: usize = 4096;

// Large enough that no benchmark run exhausts the space.
const OUTPUT_LENGTH: usize = 16;

/// Benchmarks batch generation for a range of batch sizes.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: CandidateGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_CANDIDATES as u64));

    for batch_size in [1, 64, 1024, TOTAL_CANDIDATES] {
        group.bench_function(format!("batch/{batch_size}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = generator_factory();
                    for _ in 0..(TOTAL_CANDIDATES / batch_size) {
                        black_box(generator.try_next_batch(batch_size).unwrap());
                    }
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

/// Benchmarks contended batch generation across threads sharing one
/// checkpoint.
fn bench_generator_threaded(c: &mut Criterion, group_name: &str, batch_size: usize) {
    let mut group = c.benchmark_group(group_name);

    for threads in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements((TOTAL_CANDIDATES * threads) as u64));
        group.bench_function(format!("threads/{threads}"), |b| {
            b.iter_custom(|iters| {
                let generator =
                    LockCandidateGenerator::for_standard(Vocabulary::Hex, OUTPUT_LENGTH, Formatter::Simple)
                        .unwrap();
                let barrier = Arc::new(Barrier::new(threads + 1));

                let start = scope(|s| {
                    for _ in 0..threads {
                        let barrier = Arc::clone(&barrier);
                        let generator = generator.clone();
                        s.spawn(move || {
                            barrier.wait();
                            for _ in 0..iters {
                                for _ in 0..(TOTAL_CANDIDATES / batch_size) {
                                    black_box(generator.try_next_batch(batch_size).unwrap());
                                }
                            }
                        });
                    }
                    barrier.wait();
                    Instant::now()
                });

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn bench_checkpoint(c: &mut Criterion) {
    let generator =
        LockCandidateGenerator::for_standard(Vocabulary::Base64, OUTPUT_LENGTH, Formatter::Simple)
            .unwrap();
    generator.try_next_batch(123_456).unwrap();

    let mut group = c.benchmark_group("checkpoint");
    group.bench_function("current_state", |b| {
        b.iter(|| black_box(generator.current_state().unwrap()));
    });
    let checkpoint = generator.current_state().unwrap();
    group.bench_function("resume", |b| {
        b.iter(|| black_box(LockCandidateGenerator::resume(&checkpoint).unwrap()));
    });
    group.finish();
}

fn benchmarks(c: &mut Criterion) {
    bench_generator(c, "lock/decimal", || {
        LockCandidateGenerator::for_standard(Vocabulary::Decimals, OUTPUT_LENGTH, Formatter::Simple)
            .unwrap()
    });
    bench_generator(c, "lock/uuid4", || {
        LockCandidateGenerator::for_standard(Vocabulary::Hex, 32, Formatter::Uuid4).unwrap()
    });
    bench_generator_threaded(c, "lock/threaded", 256);
    bench_checkpoint(c);
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
