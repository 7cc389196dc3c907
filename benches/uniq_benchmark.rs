use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use uniq_rs::uniq::{self, Mode, UniqConfig};

/// `lines` lines where every run of equal lines is `run_len` long.
fn generate_runs(lines: usize, run_len: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..lines {
        data.extend_from_slice(format!("{} field value {}\n", i % 97, i / run_len).as_bytes());
    }
    data
}

fn bench_modes(c: &mut Criterion) {
    let data = generate_runs(200_000, 3);
    let mut group = c.benchmark_group("uniq_modes");
    for mode in [
        Mode::Default,
        Mode::Count,
        Mode::RepeatedOnly,
        Mode::UniqueOnly,
    ] {
        let config = UniqConfig {
            mode,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("bytes", format!("{:?}", mode)),
            &data,
            |b, data| {
                b.iter(|| {
                    uniq::process_uniq_bytes(black_box(data), std::io::sink(), &config).unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_streaming_vs_bytes(c: &mut Criterion) {
    let data = generate_runs(200_000, 1);
    let config = UniqConfig::default();
    let mut group = c.benchmark_group("uniq_input_path");
    group.bench_function("streaming", |b| {
        b.iter(|| uniq::process_uniq(black_box(&data[..]), std::io::sink(), &config).unwrap())
    });
    group.bench_function("bytes", |b| {
        b.iter(|| uniq::process_uniq_bytes(black_box(&data), std::io::sink(), &config).unwrap())
    });
    group.finish();
}

fn bench_normalization(c: &mut Criterion) {
    let data = generate_runs(200_000, 3);
    let mut group = c.benchmark_group("uniq_key");
    let configs = [
        ("whole_line", UniqConfig::default()),
        (
            "skip_fields",
            UniqConfig {
                skip_fields: 1,
                ..Default::default()
            },
        ),
        (
            "ignore_case",
            UniqConfig {
                ignore_case: true,
                ..Default::default()
            },
        ),
    ];
    for (name, config) in &configs {
        group.bench_function(*name, |b| {
            b.iter(|| uniq::process_uniq_bytes(black_box(&data), std::io::sink(), config).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_modes,
    bench_streaming_vs_bytes,
    bench_normalization
);
criterion_main!(benches);
