#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use pris_en_flag::game::{BoundaryFeature, BoundaryIndex};
use pris_en_flag::LatLng;

/// 200 five-degree squares over the land band.
fn grid_index() -> BoundaryIndex {
    let mut features = Vec::new();
    for row in 0..8 {
        for col in 0..25 {
            let min_lng = -125.0 + f64::from(col) * 10.0;
            let min_lat = -50.0 + f64::from(row) * 12.0;
            features.push(BoundaryFeature::rectangle(
                &format!("G{row}{col:02}"),
                min_lng,
                min_lat,
                min_lng + 5.0,
                min_lat + 5.0,
            ));
        }
    }
    BoundaryIndex::new(features)
}

fn bench_resolve(c: &mut Criterion) {
    let index = grid_index();
    let inside = LatLng::new(24.5, 77.5);
    let gap = LatLng::new(21.0, 3.0);
    let outside = LatLng::new(80.0, 170.0);

    c.bench_function("resolve_inside", |b| b.iter(|| black_box(index.resolve(black_box(inside)))));
    c.bench_function("resolve_gap", |b| b.iter(|| black_box(index.resolve(black_box(gap)))));
    c.bench_function("resolve_outside_extent", |b| {
        b.iter(|| black_box(index.resolve(black_box(outside))))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
