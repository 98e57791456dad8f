//! Criterion micro-benchmarks for the replay text codec.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use procrogue_bench::{encode_replay, synthetic_replay};
use procrogue_replay::{decode_event_line, encode_event_line, hex_decode, hex_encode, ReplayFile};

/// Benchmark: encode 1000 events to lines.
fn bench_encode_events(c: &mut Criterion) {
    let replay = synthetic_replay(42, 1000);

    c.bench_function("codec_encode_1000_events", |b| {
        b.iter(|| {
            for ev in &replay.events {
                black_box(encode_event_line(ev));
            }
        });
    });
}

/// Benchmark: decode the same 1000 lines.
fn bench_decode_events(c: &mut Criterion) {
    let replay = synthetic_replay(42, 1000);
    let lines: Vec<String> = replay.events.iter().map(encode_event_line).collect();

    c.bench_function("codec_decode_1000_events", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(decode_event_line(line).unwrap());
            }
        });
    });
}

/// Benchmark: hex round trip of a 256-byte payload.
fn bench_hex(c: &mut Criterion) {
    let bytes: Vec<u8> = (0..=255u8).collect();
    let hex = hex_encode(&bytes);

    c.bench_function("hex_encode_256", |b| {
        b.iter(|| black_box(hex_encode(black_box(&bytes))));
    });
    c.bench_function("hex_decode_256", |b| {
        b.iter(|| black_box(hex_decode(black_box(&hex)).unwrap()));
    });
}

/// Benchmark: load a 10K-event replay from memory.
fn bench_load_10k(c: &mut Criterion) {
    let text = String::from_utf8(encode_replay(&synthetic_replay(7, 10_000)).unwrap()).unwrap();

    c.bench_function("load_replay_10k", |b| {
        b.iter(|| {
            let replay: ReplayFile = black_box(&text).parse().unwrap();
            black_box(replay);
        });
    });
}

criterion_group!(
    benches,
    bench_encode_events,
    bench_decode_events,
    bench_hex,
    bench_load_10k
);
criterion_main!(benches);
