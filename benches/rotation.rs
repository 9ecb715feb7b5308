use std::collections::BTreeSet;
use std::io::Cursor;
use std::time::Duration;

use criterion::{black_box, BatchSize, BenchmarkId, Criterion};
use criterion::{criterion_group, criterion_main};
use tempfile::tempdir;
use time::OffsetDateTime;

use lumberjack::core::{rotation, FixedClock, LogFamily, MemoryFs, OsFs, Stamps};
use lumberjack::{run_with, Config};

const LINES_PER_ITER: usize = 10_000;

fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");
    for &line_len in &[16_usize, 128, 1024] {
        let input: Vec<u8> = std::iter::repeat(
            std::iter::repeat(b'x').take(line_len).chain(std::iter::once(b'\n')),
        )
        .take(LINES_PER_ITER)
        .flatten()
        .collect();
        group.bench_with_input(BenchmarkId::from_parameter(line_len), &input, |b, input| {
            b.iter_batched(
                || {
                    let dir = tempdir().expect("tempdir");
                    let mut config = Config::new(dir.path().join("bench.log"));
                    config.max_lines = 1_000;
                    config.max_files = 4;
                    config.stamps = Stamps {
                        datetime: true,
                        epoch: true,
                    };
                    (dir, config)
                },
                |(_dir, config)| {
                    let clock = FixedClock::new(OffsetDateTime::UNIX_EPOCH, Duration::ZERO);
                    run_with(&config, Cursor::new(black_box(input)), OsFs, clock).expect("run");
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let family = LogFamily::new("/var/log/app.log", 100).expect("family");
    let present: BTreeSet<u32> = (0..100).collect();
    c.bench_function("plan_rotation_100", |b| {
        b.iter(|| rotation::plan_rotation(black_box(&family), black_box(&present)))
    });

    c.bench_function("rotate_in_memory_10", |b| {
        let fs = MemoryFs::new();
        let family = LogFamily::new("/var/log/app.log", 10).expect("family");
        b.iter(|| rotation::rotate(&fs, &family).expect("rotate"))
    });
}

criterion_group!(benches, bench_stream, bench_plan);
criterion_main!(benches);
