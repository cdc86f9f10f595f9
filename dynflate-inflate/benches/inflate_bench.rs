//! Inflate throughput benchmarks.
//!
//! Streams are produced by the testkit encoder, so code lengths are not
//! frequency-optimal; the numbers measure decoding work per symbol.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dynflate_core::BitReader;
use dynflate_inflate::{InflateOptions, Inflater, Retention, inflate};
use dynflate_testkit::{deflate, sample_noise, sample_text};
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

const SIZE: usize = 256 * 1024;

fn uniform(size: usize) -> Vec<u8> {
    vec![0xAA; size]
}

fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("inflate_patterns");

    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", uniform as PatternGenerator),
        ("text", sample_text as PatternGenerator),
        ("noise", sample_noise as PatternGenerator),
    ];

    for (name, generator) in patterns {
        let original = generator(SIZE);
        let compressed = deflate(&original, 16 * 1024).unwrap();

        group.throughput(Throughput::Bytes(SIZE as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &compressed, |b, data| {
            b.iter(|| black_box(inflate(black_box(data)).unwrap()));
        });
    }

    group.finish();
}

fn bench_retention(c: &mut Criterion) {
    let mut group = c.benchmark_group("inflate_retention");

    let original = sample_text(SIZE);
    let compressed = deflate(&original, 4 * 1024).unwrap();

    for (name, retention) in [("full", Retention::Full), ("window", Retention::Window)] {
        group.throughput(Throughput::Bytes(SIZE as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &compressed, |b, data| {
            b.iter(|| {
                let mut inflater =
                    Inflater::with_options(InflateOptions::new().retention(retention));
                let mut sink = std::io::sink();
                let written = inflater
                    .inflate_to(&mut BitReader::new(&data[..]), &mut sink, |_| {})
                    .unwrap();
                black_box(written);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_patterns, bench_retention);
criterion_main!(benches);
