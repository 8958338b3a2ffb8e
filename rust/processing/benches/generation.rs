// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark for segment generation.
//!
//! Measures:
//! 1. Structure generation of a single segment per kind and LOD tier
//! 2. A full window round (structure + markings) over the demo corridor
//!
//! Run with: cargo bench -p roadgen-processing --bench generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use roadgen_geometry::{
    build_markings, build_structure, estimate_structure_capacity, GeometryBuffer, GeometryConfig,
    LodTier,
};
use roadgen_processing::{demo_corridor, PipelineConfig, StreamingWindow};

fn bench_structure(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure");
    let config = GeometryConfig::default();

    for (curve, descriptor) in demo_corridor() {
        for lod in LodTier::ALL {
            let (vertices, indices) = estimate_structure_capacity(&descriptor, lod, &config);
            group.throughput(Throughput::Elements(vertices as u64));

            let name = format!("{}/{:?}", descriptor.kind.name(), lod);
            group.bench_with_input(BenchmarkId::from_parameter(name), &lod, |b, &lod| {
                b.iter(|| {
                    let mut buffer = GeometryBuffer::with_capacity(vertices, indices);
                    build_structure(&mut buffer, black_box(&curve), &descriptor, lod, &config)
                        .map(|_| buffer.index_count())
                })
            });
        }
    }

    group.finish();
}

fn bench_markings(c: &mut Criterion) {
    let config = GeometryConfig::default();
    let corridor = demo_corridor();

    c.bench_function("markings/corridor", |b| {
        b.iter(|| {
            let mut buffer = GeometryBuffer::new();
            for (curve, descriptor) in &corridor {
                black_box(build_markings(&mut buffer, black_box(curve), descriptor, &config))
                    .expect("markings");
            }
            buffer.index_count()
        })
    });
}

fn bench_window_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("window");
    group.sample_size(20);

    group.bench_function("corridor_round", |b| {
        b.iter(|| {
            let mut window = StreamingWindow::new(PipelineConfig::default()).expect("window");
            for (curve, descriptor) in demo_corridor() {
                window.enter(curve, descriptor);
            }
            black_box(window.generate().ok())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_structure, bench_markings, bench_window_round);
criterion_main!(benches);
