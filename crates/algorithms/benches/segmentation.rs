//! Benchmarks for the segmentation pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cellseg_algorithms::measure::region_properties;
use cellseg_algorithms::pipeline::{segment, SegmentationParams};
use cellseg_algorithms::segmentation::{binarize, distance_transform, extract_seeds, watershed, SeedParams};
use cellseg_core::Grid;

/// Grid of discs of radius 9 on a 24-pixel lattice, every other row offset
/// so neighbouring discs touch
fn create_test_response(size: usize) -> Grid<f64> {
    let mut grid = Grid::filled(size, size, 0.0);
    let spacing = 24i64;
    for row in 0..size {
        for col in 0..size {
            let (r, c) = (row as i64, col as i64);
            let band = r / spacing;
            let shift = if band % 2 == 0 { 0 } else { spacing / 2 };
            let dr = r - (band * spacing + spacing / 2);
            let dc = (c + shift) % spacing - spacing / 2;
            if dr * dr + dc * dc <= 81 {
                grid.set(row, col, 1.0).unwrap();
            }
        }
    }
    grid
}

fn create_test_intensity(size: usize) -> Grid<f64> {
    let mut grid = Grid::filled(size, size, 0.0);
    for row in 0..size {
        for col in 0..size {
            grid.set(row, col, ((row * 7 + col * 13) % 256) as f64).unwrap();
        }
    }
    grid
}

fn bench_distance_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation/distance_transform");
    for size in [256, 512, 1024] {
        let mask = binarize(&create_test_response(size), 0.5).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| distance_transform(black_box(&mask)).unwrap())
        });
    }
    group.finish();
}

fn bench_watershed(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation/watershed");
    for size in [256, 512, 1024] {
        let mask = binarize(&create_test_response(size), 0.5).unwrap();
        let distance = distance_transform(&mask).unwrap();
        let (seeds, _) = extract_seeds(&distance, SeedParams::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| watershed(black_box(&mask), &seeds, &distance).unwrap())
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation/pipeline");
    let params = SegmentationParams::default();
    for size in [256, 512, 1024] {
        let response = create_test_response(size);
        let intensity = create_test_intensity(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let seg = segment(black_box(&response), &params).unwrap();
                region_properties(&seg.labels, &intensity).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_distance_transform, bench_watershed, bench_pipeline);
criterion_main!(benches);
