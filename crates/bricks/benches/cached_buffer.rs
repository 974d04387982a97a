//! Benchmark – `bricks::CachedBuffer`
#![allow(missing_docs)]

use std::time::Duration;

use bricks::{CachedBuffer, SinkError};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Deterministic payload of `len` bytes.
fn make_payload(len: usize) -> Vec<u8> {
    (0..=250u8).cycle().take(len).collect()
}

/// Stores `payload` in `chunk`-sized pieces through a 512-byte cache whose
/// sink takes at most `accept_limit` bytes per call, retrying until every
/// byte is through. Returns how many bytes reached the sink.
fn run_cached_buffer(payload: &[u8], chunk: usize, accept_limit: usize) -> usize {
    let mut delivered = 0usize;
    {
        let mut cache = CachedBuffer::<_, 512>::with_sink(|bytes: &[u8]| {
            let written = bytes.len().min(accept_limit);
            delivered += written;
            written
        });
        for piece in payload.chunks(chunk) {
            let mut rest = piece;
            loop {
                match cache.store(rest) {
                    Ok(()) => break,
                    Err(SinkError::ShortWrite { written, .. }) => rest = &rest[written..],
                    Err(_) => {}
                }
            }
        }
        while !cache.is_empty() {
            let _ = cache.flush();
        }
    }
    delivered
}

fn bench_cached_buffer(c: &mut Criterion) {
    let payload = make_payload(64 * 1024);

    let mut group = c.benchmark_group("cached_buffer_store");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for &chunk in &[1usize, 16, 128, 1_024] {
        for &(label, limit) in &[("whole", usize::MAX), ("partial", 200)] {
            group.bench_with_input(BenchmarkId::new(chunk.to_string(), label), &limit, |b, &limit| {
                b.iter(|| {
                    let delivered = run_cached_buffer(black_box(&payload), chunk, limit);
                    black_box(delivered);
                });
            });
        }
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_cached_buffer }
criterion_main!(benches);
