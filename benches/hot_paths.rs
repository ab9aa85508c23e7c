//! Benchmarks for the per-frame and per-cycle work: site generation,
//! overlay placement, and braille rasterisation of a map panel.

use std::rc::Rc;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use deforest_watch::map::{load_basemap, MapView, SiteOverlay};
use deforest_watch::rng::SeededRandom;
use deforest_watch::site::{self, Timeframe};
use deforest_watch::stats::{generate_statistics, Country, TimeRange};

fn ready_view() -> MapView {
    let mut view = MapView::new("bench", 94, 20);
    match load_basemap(None) {
        Ok(basemap) => view.init(Ok(Rc::new(basemap))),
        Err(e) => view.init(Err(&e)),
    }
    view
}

fn bench_generation(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mut rng = SeededRandom::from_seed(7);

    c.bench_function("generate_current_sites", |b| {
        b.iter(|| black_box(site::generate(Timeframe::Current, &mut rng, now)))
    });
    c.bench_function("generate_historical_sites", |b| {
        b.iter(|| black_box(site::generate(Timeframe::Historical, &mut rng, now)))
    });
    c.bench_function("generate_statistics_10y", |b| {
        b.iter(|| black_box(generate_statistics(Country::Brazil, TimeRange::TenYears, &mut rng, 2024)))
    });
}

fn bench_map(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mut rng = SeededRandom::from_seed(7);
    let sites = site::generate(Timeframe::Current, &mut rng, now);

    let mut view = ready_view();
    let mut overlay = SiteOverlay::new();

    c.bench_function("overlay_render", |b| {
        b.iter(|| overlay.render(black_box(&sites), &mut view))
    });

    c.bench_function("render_layers_94x20", |b| {
        b.iter(|| black_box(view.render_layers(94, 20)))
    });

    view.viewport.zoom_in();
    view.viewport.zoom_in();
    c.bench_function("render_layers_zoomed", |b| {
        b.iter(|| black_box(view.render_layers(94, 20)))
    });
}

criterion_group!(benches, bench_generation, bench_map);
criterion_main!(benches);
