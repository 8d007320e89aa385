//! Benchmark tests for the incremental scanner

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use unity_sweeper::project::{DispositionStore, UNITY_MARKERS};
use unity_sweeper::scanner::{IncrementalScanner, ScanOptions, ScanStatus};

fn make_project(path: &Path) {
    for marker in UNITY_MARKERS {
        fs::create_dir_all(path.join(marker)).unwrap();
    }
}

/// `width` folders per level, `depth` levels, a project in every leaf.
fn create_benchmark_tree(width: usize, depth: usize) -> TempDir {
    let dir = TempDir::new().unwrap();

    fn fill(path: &Path, width: usize, depth: usize) {
        if depth == 0 {
            make_project(path);
            return;
        }
        for i in 0..width {
            let child = path.join(format!("dir{}", i));
            fs::create_dir_all(&child).unwrap();
            fill(&child, width, depth - 1);
        }
    }

    fill(dir.path(), width, depth);
    dir
}

fn benchmark_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for (width, depth) in [(10, 2), (5, 4), (3, 6)] {
        let dir = create_benchmark_tree(width, depth);
        let label = format!("{}x{}", width, depth);

        group.bench_with_input(BenchmarkId::new("run_to_completion", &label), &label, |b, _| {
            b.iter(|| {
                let mut scanner = IncrementalScanner::new(ScanOptions::default());
                let mut store = DispositionStore::new();
                scanner
                    .run_to_completion(black_box(dir.path()), &mut store, &mut ())
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_time_slices(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_slice");
    let dir = create_benchmark_tree(5, 4);

    // A zero slice yields after every directory; measures resume overhead.
    for slice_ms in [0u64, 1, 5] {
        group.bench_with_input(BenchmarkId::from_parameter(slice_ms), &slice_ms, |b, &ms| {
            b.iter(|| {
                let options = ScanOptions::new().with_time_slice(Duration::from_millis(ms));
                let mut scanner = IncrementalScanner::new(options);
                let mut store = DispositionStore::new();
                scanner.start(dir.path(), &mut store).unwrap();

                let mut resumptions = 0usize;
                while scanner.resume(&mut store, &mut ()) == ScanStatus::Pending {
                    resumptions += 1;
                }
                black_box(resumptions)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_full_scan, benchmark_time_slices);
criterion_main!(benches);
