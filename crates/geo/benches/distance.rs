//! Benchmarks for geo crate distance calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use healthwatch_geo::{distances_from, haversine_distance, nearest_first, Coordinate};

fn create_test_points(count: usize) -> Vec<Coordinate> {
    (0..count)
        .map(|i| {
            // Grid around Accra
            let lat = 5.0 + (i as f64 * 0.01) % 2.0;
            let lng = -1.0 + (i as f64 * 0.01) % 2.0;
            Coordinate::new(lat, lng)
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let accra = Coordinate::new(5.6037, -0.1870);
    let kumasi = Coordinate::new(6.6885, -1.6244);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance(black_box(&accra), black_box(&kumasi)))
    });
}

fn bench_batch_distances(c: &mut Criterion) {
    let origin = Coordinate::new(5.6037, -0.1870);
    let mut group = c.benchmark_group("batch");

    for size in [100, 1_000, 10_000] {
        let points = create_test_points(size);
        group.bench_with_input(BenchmarkId::new("distances_from", size), &points, |b, points| {
            b.iter(|| distances_from(black_box(&origin), black_box(points)))
        });
        group.bench_with_input(BenchmarkId::new("nearest_first", size), &points, |b, points| {
            b.iter(|| nearest_first(black_box(&origin), black_box(points)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_batch_distances);
criterion_main!(benches);
