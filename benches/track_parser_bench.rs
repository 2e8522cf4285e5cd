//! Performance benchmarks for the track parser.
//!
//! The parser runs synchronously on the notification path, so a swipe is
//! only published once parsing returns.
//!
//! # Run Benchmarks
//!
//! ```sh
//! # Run all parser benchmarks
//! cargo bench --bench track_parser_bench
//!
//! # Run one group
//! cargo bench --bench track_parser_bench -- track_parse_failures
//!
//! # Compare against a saved baseline
//! cargo bench --bench track_parser_bench -- --save-baseline before
//! cargo bench --bench track_parser_bench -- --baseline before
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use swipekit_track::TrackParser;

/// Benchmark successful parses of differently shaped payloads.
fn bench_track_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("track_parse");

    let payloads: Vec<(&str, &[u8])> = vec![
        ("minimal", &b"%B4111^DOE/JOHN^2512"[..]),
        (
            "track1",
            &b"%B4111111111111111^DOE/JOHN^2512101000000000000000000000000?"[..],
        ),
        (
            "dual_track",
            &b"%B4111111111111111^DOE/JOHN^2512101000000000000000000000000?;4111111111111111=25121010000000000000?"[..],
        ),
        (
            "leading_noise",
            &b";4111111111111111=2512?%Bxx%B%B4111111111111111^MUSTERMANN/ERIKA            ^2706201?"[..],
        ),
    ];

    for (name, payload) in payloads {
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::new("ok", name), &payload, |b, &raw| {
            b.iter(|| black_box(TrackParser::parse(black_box(raw))));
        });
    }

    group.finish();
}

/// Benchmark rejection paths (garbled swipes and unrelated data).
fn bench_track_parse_failures(c: &mut Criterion) {
    let mut group = c.benchmark_group("track_parse_failures");
    group.throughput(Throughput::Elements(1));

    let long_noise = "x".repeat(1024);
    let scenarios: Vec<(&str, &[u8])> = vec![
        ("empty", &b""[..]),
        ("unrelated_text", &b"hello, this is not a card"[..]),
        ("fragment", &b"%B41111111"[..]),
        ("malformed_name", &b"%B4111111111111111^DOE^2512"[..]),
        ("long_noise", long_noise.as_bytes()),
    ];

    for (name, payload) in scenarios {
        group.bench_function(name, |b| {
            b.iter(|| black_box(TrackParser::parse(black_box(payload))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_track_parse, bench_track_parse_failures);
criterion_main!(benches);
