//! Benchmarks for the renderer crate - projection math, compositing, palettes,
//! vector projection and PNG export.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks
//! Or: cargo bench --package renderer -- composite

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use climate_common::GeoPoint;
use rand::Rng;
use renderer::{
    png, Color, CompositeOptions, PaletteRegistry, ProjectionEngine, RenderConfig,
    SampleableImage, VectorFeature, ViewParams,
};
use test_utils::{checkerboard_image, temperature_field, PALETTES_JSON};

/// Random geographic points, avoiding the poles where Newton converges slowest.
fn generate_geo_points(count: usize) -> Vec<(f64, f64)> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| (rng.gen_range(-180.0..180.0), rng.gen_range(-85.0..85.0)))
        .collect()
}

/// Random coastline-like features: short random walks with small steps.
fn generate_features(count: usize, points_per_feature: usize) -> Vec<VectorFeature> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let mut lon: f64 = rng.gen_range(-180.0..180.0);
            let mut lat: f64 = rng.gen_range(-70.0..70.0);
            let points = (0..points_per_feature)
                .map(|_| {
                    lon = (lon + rng.gen_range(-2.0..2.0)).clamp(-180.0, 180.0);
                    lat = (lat + rng.gen_range(-1.0..1.0)).clamp(-90.0, 90.0);
                    GeoPoint::new(lon, lat)
                })
                .collect();
            VectorFeature::new(format!("feature-{}", i), points)
        })
        .collect()
}

fn engine(parallel_rows: bool) -> ProjectionEngine {
    let config = RenderConfig {
        parallel_rows,
        ..Default::default()
    };
    let palettes = PaletteRegistry::from_json(PALETTES_JSON).unwrap();
    ProjectionEngine::new(config, palettes).unwrap()
}

fn composite_options(engine: &ProjectionEngine, width: usize, height: usize) -> CompositeOptions {
    let base = SampleableImage::new(
        360,
        180,
        checkerboard_image(360, 180, 15, [40, 80, 40, 255], [20, 40, 120, 255]),
    )
    .unwrap();
    let overlay = engine
        .colorize(&temperature_field(181, 360), "Temperature", 0.7)
        .unwrap();
    CompositeOptions::new(width, height)
        .with_base(base)
        .with_overlay(overlay)
}

// =============================================================================
// PROJECTION BENCHMARKS
// =============================================================================

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    let engine = engine(false);

    let points = generate_geo_points(1000);
    let projected: Vec<_> = points
        .iter()
        .map(|&(lon, lat)| engine.forward(lon, lat))
        .collect();

    group.throughput(Throughput::Elements(points.len() as u64));

    group.bench_function("forward", |b| {
        b.iter(|| {
            for &(lon, lat) in &points {
                black_box(engine.forward(black_box(lon), black_box(lat)));
            }
        });
    });

    group.bench_function("inverse", |b| {
        b.iter(|| {
            for p in &projected {
                black_box(engine.inverse(black_box(p.x), black_box(p.y)));
            }
        });
    });

    group.finish();
}

// =============================================================================
// COMPOSITE BENCHMARKS
// =============================================================================

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");
    group.sample_size(20);

    let sequential = engine(false);
    let parallel = engine(true);
    let sizes = [(256, 128), (512, 256), (1024, 512)];

    for (width, height) in sizes {
        let options = composite_options(&sequential, width, height);
        group.throughput(Throughput::Elements((width * height) as u64));

        group.bench_with_input(
            BenchmarkId::new("sequential", format!("{}x{}", width, height)),
            &options,
            |b, options| b.iter(|| sequential.render_composite(black_box(options))),
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", format!("{}x{}", width, height)),
            &options,
            |b, options| b.iter(|| parallel.render_composite(black_box(options))),
        );
    }

    group.finish();
}

fn bench_progressive_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsample");
    group.sample_size(20);

    let engine = engine(false);
    let base = composite_options(&engine, 1024, 512);

    for downsample in [8, 4, 2, 1] {
        let options = base.clone().with_downsample(downsample);
        group.bench_with_input(
            BenchmarkId::new("1024x512", downsample),
            &options,
            |b, options| b.iter(|| engine.render_composite(black_box(options))),
        );
    }

    group.finish();
}

// =============================================================================
// PALETTE BENCHMARKS
// =============================================================================

fn bench_palettes(c: &mut Criterion) {
    let mut group = c.benchmark_group("palettes");

    group.bench_function("registry_from_json", |b| {
        b.iter(|| PaletteRegistry::from_json(black_box(PALETTES_JSON)))
    });

    let engine = engine(false);
    for (rows, cols) in [(91, 180), (181, 360), (721, 1440)] {
        let grid = temperature_field(rows, cols);
        group.throughput(Throughput::Elements((rows * cols) as u64));
        group.bench_with_input(
            BenchmarkId::new("colorize", format!("{}x{}", rows, cols)),
            &grid,
            |b, grid| b.iter(|| engine.colorize(black_box(grid), "Temperature", 1.0)),
        );
    }

    group.finish();
}

// =============================================================================
// VECTOR BENCHMARKS
// =============================================================================

fn bench_vectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectors");
    let engine = engine(false);

    for count in [10, 100, 1000] {
        let features = generate_features(count, 50);
        group.throughput(Throughput::Elements((count * 50) as u64));
        group.bench_with_input(
            BenchmarkId::new("project", count),
            &features,
            |b, features| {
                b.iter(|| {
                    engine.project_vectors(black_box(features), 1024, 512, &ViewParams::default())
                })
            },
        );
    }

    group.finish();
}

// =============================================================================
// PNG ENCODING BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");

    let engine = engine(false);
    for (width, height) in [(256, 128), (1024, 512)] {
        let frame = engine
            .render_composite(&composite_options(&engine, width, height))
            .unwrap();
        group.throughput(Throughput::Bytes(frame.pixels.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("frame", format!("{}x{}", width, height)),
            &frame,
            |b, frame| b.iter(|| png::encode_frame(black_box(frame))),
        );
    }

    let solid = vec![Color::opaque(0, 0, 0).to_array(); 512 * 512].concat();
    group.bench_function("solid_512x512", |b| {
        b.iter(|| png::encode_rgba(black_box(&solid), 512, 512))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_projection,
    bench_composite,
    bench_progressive_passes,
    bench_palettes,
    bench_vectors,
    bench_png_encoding,
);
criterion_main!(benches);
