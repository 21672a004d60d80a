//! Criterion microbenches for trailmark's hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - SHA-256 content hashing (the cleanup pass's inner loop)
//! - YOLO label line parsing
//! - Undo stack push/pop churn

use std::hint::black_box;
use std::io::Write;
use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use trailmark::annot::sidecar_yolo::parse_yolo_line;
use trailmark::cleanup::file_sha256;
use trailmark::session::UndoStack;

/// Benchmark hashing a 256 KiB file, roughly a small trail-camera JPEG.
fn bench_file_hash(c: &mut Criterion) {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    let chunk = [0xABu8; 4096];
    for _ in 0..64 {
        file.write_all(&chunk).expect("fill temp file");
    }
    file.flush().expect("flush temp file");

    let mut group = c.benchmark_group("cleanup");
    group.throughput(Throughput::Bytes(64 * 4096));
    group.bench_function("file_sha256_256k", |b| {
        b.iter(|| file_sha256(black_box(file.path())).unwrap())
    });
    group.finish();
}

/// Benchmark parsing a single YOLO label line.
fn bench_yolo_parse(c: &mut Criterion) {
    let path = PathBuf::from("bench.txt");
    c.bench_function("parse_yolo_line", |b| {
        b.iter(|| {
            parse_yolo_line(black_box("3 0.512345 0.498765 0.234567 0.198765"), &path, 1).unwrap()
        })
    });
}

/// Benchmark undo stack churn at the default box-edit depth.
fn bench_undo_churn(c: &mut Criterion) {
    c.bench_function("undo_stack_churn", |b| {
        b.iter(|| {
            let mut stack = UndoStack::new(20);
            for i in 0..100u32 {
                black_box(stack.push(i));
            }
            while let Some(v) = stack.pop() {
                black_box(v);
            }
        })
    });
}

criterion_group!(benches, bench_file_hash, bench_yolo_parse, bench_undo_churn);
criterion_main!(benches);
