use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use relic_decoder::{DecoderConfig, Format, Rle90Dialect, decode_binhex4, decode_rle90};
use relic_tests::{decode_chunked, golden};

fn bench_rle90_batch(c: &mut Criterion) {
    let encoded = golden("reference.rle");

    c.bench_function("rle90_batch", |b| {
        b.iter(|| decode_rle90(&encoded, Rle90Dialect::NonBuffering).unwrap());
    });
}

fn bench_binhex4_batch(c: &mut Criterion) {
    let encoded = golden("reference.hqx");

    c.bench_function("binhex4_batch", |b| {
        b.iter(|| decode_binhex4(&encoded).unwrap());
    });
}

/// Incremental decoding at different read sizes. Chunk size 1 is the
/// worst case: one call per decoded byte.
fn bench_chunk_sizes(c: &mut Criterion) {
    let fixtures = [
        (Format::Rle90, golden("reference.rle")),
        (Format::BinHex4, golden("reference.hqx")),
    ];

    for (format, encoded) in &fixtures {
        let config = DecoderConfig::new(*format);
        let decoded_len = config.decode_all(encoded).unwrap().len();

        let mut group = c.benchmark_group(format!("{format}_stream"));
        group.throughput(Throughput::Bytes(decoded_len as u64));

        for chunk in [1usize, 16, 256, 4096] {
            group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
                b.iter(|| decode_chunked(&config, encoded, chunk).unwrap());
            });
        }

        group.finish();
    }
}

/// Long runs exercise the backlog: every small read has to drain a run
/// that did not fit in the previous one.
fn bench_long_runs(c: &mut Criterion) {
    let mut encoded = Vec::new();
    for fill in 0u8..64 {
        encoded.extend_from_slice(&[fill, 0x90, 0xFF, 0x90, 0xFF]);
    }
    let config = DecoderConfig::new(Format::Rle90);

    let mut group = c.benchmark_group("rle90_long_runs");
    group.bench_function("batch", |b| {
        b.iter(|| config.decode_all(&encoded).unwrap());
    });
    group.bench_function("stream_7", |b| {
        b.iter(|| decode_chunked(&config, &encoded, 7).unwrap());
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_rle90_batch,
    bench_binhex4_batch,
    bench_chunk_sizes,
    bench_long_runs,
);
criterion_main!(benches);
