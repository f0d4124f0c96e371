//! Performance benchmarks for ride_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ride_core::animation::PathAnimation;
use ride_core::geo::GeoPoint;
use ride_core::pricing::compute_fare;
use ride_core::render::RecordingRenderer;
use ride_core::routing::{H3GridRouteProvider, RouteProvider};
use ride_core::session::RideSession;
use ride_core::test_helpers::{test_params, TEST_DROP, TEST_PICKUP};

fn bench_full_ride(c: &mut Criterion) {
    let frames = vec![("16ms", 16), ("100ms", 100), ("1s", 1_000)];

    let mut group = c.benchmark_group("full_ride");
    for (name, frame_ms) in frames {
        group.bench_with_input(BenchmarkId::from_parameter(name), &frame_ms, |b, &frame_ms| {
            b.iter(|| {
                let params = test_params().with_frame_interval_ms(frame_ms);
                let mut session = RideSession::new(&params, Box::new(RecordingRenderer::new()))
                    .expect("valid params");
                session.select_point(TEST_PICKUP);
                session.select_point(TEST_DROP);
                session.calculate_route().expect("route");
                session.confirm_ride("bike").expect("confirm");
                black_box(session.run_until_idle(1_000_000));
            });
        });
    }
    group.finish();
}

fn bench_path_animation(c: &mut Criterion) {
    // A long zig-zag so each advance may cross several segments.
    let path: Vec<GeoPoint> = (0..2_000)
        .map(|i| {
            let step = i as f64 * 0.0005;
            TEST_PICKUP.offset(step, if i % 2 == 0 { 0.0 } else { 0.0005 })
        })
        .collect();

    let mut group = c.benchmark_group("path_animation");
    group.bench_function("advance_2000_points", |b| {
        b.iter(|| {
            let mut animation = PathAnimation::new(&path, 60.0, 0).expect("animation");
            let mut now = 0;
            while !animation.is_finished() {
                now += 1_000;
                black_box(animation.advance(now));
            }
        });
    });
    group.finish();
}

fn bench_routing_and_pricing(c: &mut Criterion) {
    let provider = H3GridRouteProvider::default();
    let far = GeoPoint::new(17.50, 78.60);

    let mut group = c.benchmark_group("routing");
    group.bench_function("h3_grid_route", |b| {
        b.iter(|| black_box(provider.route(TEST_PICKUP, far)));
    });
    group.bench_function("compute_fare", |b| {
        b.iter(|| black_box(compute_fare(black_box(12_345.6))));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_full_ride,
    bench_path_animation,
    bench_routing_and_pricing
);
criterion_main!(benches);
