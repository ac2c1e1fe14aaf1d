// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for the per-frame crop gesture path.
//!
//! Measures the performance of:
//! - Pan updates (constraint of the translate)
//! - Pinch updates (scale clamp and re-constraint)
//! - Crop region computation

use criterion::{criterion_group, criterion_main, Criterion};
use gallery_picker::domain::crop::{CropShape, Dimensions};
use gallery_picker::editor::CropTransformEngine;
use std::hint::black_box;

fn loaded_engine() -> CropTransformEngine {
    let mut engine = CropTransformEngine::new(Dimensions::new(360.0, 360.0), CropShape::Rectangle, 1000.0, 5.0);
    engine
        .initialize("file:///bench.jpg", (4032, 3024))
        .expect("valid dimensions");
    engine
}

fn bench_pan(c: &mut Criterion) {
    let mut group = c.benchmark_group("crop_gestures");
    let mut engine = loaded_engine();
    engine.on_pan_start();

    group.bench_function("pan_update", |b| {
        let mut step = 0.0_f64;
        b.iter(|| {
            step = (step + 1.0) % 400.0;
            black_box(engine.on_pan_update(black_box(-step), black_box(step / 2.0)));
        });
    });
    group.finish();
}

fn bench_pinch(c: &mut Criterion) {
    let mut group = c.benchmark_group("crop_gestures");
    let mut engine = loaded_engine();
    engine.on_pinch_start();

    group.bench_function("pinch_update", |b| {
        let mut factor = 1.0_f64;
        b.iter(|| {
            factor = if factor > 6.0 { 0.5 } else { factor * 1.01 };
            black_box(engine.on_pinch_update(black_box(factor)));
        });
    });
    group.finish();
}

fn bench_crop_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("crop_gestures");
    let mut engine = loaded_engine();
    engine.on_pinch_start();
    engine.on_pinch_update(2.5);
    engine.on_pinch_end();

    group.bench_function("crop_region", |b| {
        b.iter(|| black_box(engine.crop_region()));
    });
    group.finish();
}

criterion_group!(benches, bench_pan, bench_pinch, bench_crop_region);
criterion_main!(benches);
