// packages/store/benches/store_bench.rs
//! Store Performance Benchmarks
//!
//! ## What We Benchmark
//!
//! - `store_add`: single-record commits into the plain and compressed stores
//! - `store_batch_add`: batch commits of 100 and 1K records
//! - `compression`: record compression and decompression at each level
//! - `parse_raw_response`: raw HTTP parsing of a captured response
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench -p respack-store
//! cargo bench -p respack-store --bench store_bench compression
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use respack_store::record::{parse_raw_response, Method, ResponseRecord};
use respack_store::store::{CompressedResponseStore, CompressionLevel, Compressor, ResponseStore};
use std::collections::HashMap;

fn create_test_record(i: usize, body_size: usize) -> ResponseRecord {
    let headers = HashMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Server".to_string(), "bench".to_string()),
    ]);
    ResponseRecord::new(
        format!("https://example.com/api/{}", i % 50),
        "example.com",
        Method::Get,
        if i % 10 == 0 { 500 } else { 200 },
        Some(headers),
        Some(vec![b'x'; body_size]),
        0,
        None,
    )
    .unwrap()
}

fn bench_store_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_add");
    group.throughput(Throughput::Elements(1));

    let record = create_test_record(1, 1024);

    group.bench_function("plain", |b| {
        let store = ResponseStore::new();
        b.iter(|| store.add(black_box(record.clone())).unwrap());
    });

    group.bench_function("compressed", |b| {
        let store = CompressedResponseStore::new();
        b.iter(|| store.add(black_box(record.clone())).unwrap());
    });

    group.finish();
}

fn bench_store_batch_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_batch_add");

    for count in [100, 1_000] {
        let records: Vec<ResponseRecord> = (0..count).map(|i| create_test_record(i, 512)).collect();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("plain", count), &records, |b, records| {
            b.iter(|| {
                let store = ResponseStore::new();
                let errors = store.batch_add(records.clone());
                assert!(errors.is_empty());
            });
        });

        group.bench_with_input(
            BenchmarkId::new("compressed", count),
            &records,
            |b, records| {
                b.iter(|| {
                    let store = CompressedResponseStore::new();
                    let errors = store.batch_add(records.clone());
                    assert!(errors.is_empty());
                });
            },
        );
    }

    group.finish();
}

fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    let record = create_test_record(7, 16 * 1024);

    for level in [
        CompressionLevel::Fast,
        CompressionLevel::Balanced,
        CompressionLevel::Best,
    ] {
        let compressor = Compressor::new(level);
        let blob = compressor.compress_record(&record).unwrap();

        group.bench_with_input(
            BenchmarkId::new("compress", format!("{:?}", level)),
            &record,
            |b, record| b.iter(|| compressor.compress_record(black_box(record)).unwrap()),
        );

        group.bench_with_input(
            BenchmarkId::new("decompress", format!("{:?}", level)),
            &blob,
            |b, blob| b.iter(|| compressor.decompress_record(black_box(blob)).unwrap()),
        );
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let body = "x".repeat(4096);
    let raw = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nServer: bench\r\n\r\n{}",
        body.len(),
        body
    );

    c.bench_function("parse_raw_response", |b| {
        b.iter(|| parse_raw_response(black_box(raw.as_bytes()), "https://example.com/file").unwrap())
    });
}

criterion_group!(
    benches,
    bench_store_add,
    bench_store_batch_add,
    bench_compression,
    bench_parse
);
criterion_main!(benches);
