//! Benchmarks for the frame codec and delta computation
//!
//! Platform: Cross-platform (generated fixtures, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use posetrail::codec;
use posetrail::delta::{compute_deltas, render_report};
use posetrail::test_utils::{moving_frames, session};
use posetrail::transport::TransportMessage;
use std::hint::black_box;

fn bench_codec(c: &mut Criterion) {
    let frame = moving_frames(2)[1];
    let line = codec::render(&frame);

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(line.len() as u64));

    group.bench_function("render", |b| b.iter(|| black_box(codec::render(black_box(&frame)))));
    group.bench_function("parse", |b| b.iter(|| black_box(codec::parse(black_box(&line)).expect("parse"))));

    group.finish();
}

fn bench_deltas(c: &mut Criterion) {
    let mut group = c.benchmark_group("deltas");

    for count in [30usize, 300, 3000] {
        let frames = moving_frames(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("compute", count), &frames, |b, frames| {
            b.iter(|| black_box(compute_deltas(black_box(frames))))
        });

        let id = session("01012024-120000");
        let records = compute_deltas(&frames);
        group.bench_with_input(BenchmarkId::new("render_report", count), &records, |b, records| {
            b.iter(|| black_box(render_report(&id, black_box(records))))
        });
    }

    group.finish();
}

fn bench_transport_encoding(c: &mut Criterion) {
    let message = TransportMessage::from_frame(&moving_frames(2)[1]);

    c.bench_function("transport_encode", |b| b.iter(|| black_box(black_box(&message).encode().expect("encode"))));
}

criterion_group!(benches, bench_codec, bench_deltas, bench_transport_encoding);
criterion_main!(benches);
