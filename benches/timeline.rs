use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pansy_timeline::config::Config;
use pansy_timeline::layout::{StackingOptions, VirtualItem, group_overlapping, stack_items};
use pansy_timeline::parser::parse_events;
use pansy_timeline::render::render_svg;
use pansy_timeline::{RenderOptions, Timeline, build_timeline, render_timeline};
use std::hint::black_box;

const BASE_MILLIS: i64 = 1_710_028_800_000;
const MINUTE_MILLIS: i64 = 60_000;

fn events_source(count: usize, step_minutes: i64) -> String {
    let mut out = String::from("[\n");
    for i in 0..count {
        let start = BASE_MILLIS + i as i64 * step_minutes * MINUTE_MILLIS;
        if i % 3 == 0 {
            let end = start + 60 * MINUTE_MILLIS;
            out.push_str(&format!(
                "  {{\"id\": {i}, \"title\": \"Span {i}\", \"time\": [{start}, {end}]}}"
            ));
        } else {
            out.push_str(&format!(
                "  {{\"id\": {i}, \"title\": \"Event {i}\", \"time\": {start}}}"
            ));
        }
        out.push_str(if i + 1 == count { "\n" } else { ",\n" });
    }
    out.push(']');
    out
}

fn card_rects(count: usize, spacing: f64) -> Vec<VirtualItem> {
    (0..count)
        .map(|i| VirtualItem::new(i.to_string(), i as f64 * spacing, 0.0, 160.0, 49.0))
        .collect()
}

fn options() -> RenderOptions {
    let mut config = Config::default();
    config.render.height = 2000.0;
    RenderOptions {
        config,
        ..Default::default()
    }
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for count in [10, 100, 1000] {
        let input = events_source(count, 37);
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, data| {
            b.iter(|| {
                let events = parse_events(black_box(data)).expect("parse failed");
                black_box(events.len());
            });
        });
    }
    group.finish();
}

fn bench_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_overlapping");
    for (name, spacing) in [("sparse", 400.0), ("chained", 120.0), ("dense", 8.0)] {
        for count in [50, 500] {
            let items = card_rects(count, spacing);
            group.bench_with_input(BenchmarkId::new(name, count), &items, |b, data| {
                b.iter(|| black_box(group_overlapping(black_box(data)).len()));
            });
        }
    }
    group.finish();
}

fn bench_stacking(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack_items");
    let options = StackingOptions {
        container_height: 600.0,
        margin_top: 24.0,
        row_gap: 8.0,
    };
    for (name, spacing) in [("chained", 120.0), ("dense", 8.0)] {
        for count in [50, 500] {
            let items = card_rects(count, spacing);
            group.bench_with_input(BenchmarkId::new(name, count), &items, |b, data| {
                b.iter(|| {
                    let mut items = data.clone();
                    black_box(stack_items(&mut items, &options));
                });
            });
        }
    }
    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("zoom_frames");
    for count in [100, 1000] {
        let input = events_source(count, 37);
        let timeline = build_timeline(&input, &options()).expect("build failed");
        let events = timeline.events().to_vec();
        let config = timeline.config().clone();
        let container = timeline.container();
        group.bench_with_input(BenchmarkId::from_parameter(count), &events, |b, data| {
            b.iter(|| {
                let mut timeline = Timeline::create(Some(container), data.clone(), config.clone())
                    .expect("create failed");
                timeline.frame();
                for delta in [1.0, 1.0, -1.0, -1.0, -1.0] {
                    timeline.zoom(delta);
                    timeline.pan_move(black_box(35.0));
                    black_box(timeline.frame().passes);
                }
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let options = options();
    for count in [10, 100, 1000] {
        let input = events_source(count, 37);
        let layout = build_timeline(&input, &options)
            .expect("build failed")
            .layout();
        group.bench_with_input(BenchmarkId::from_parameter(count), &layout, |b, data| {
            b.iter(|| {
                let svg = render_svg(
                    black_box(data),
                    &options.config.theme,
                    &options.config.timeline,
                );
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let options = options();
    for count in [10, 100, 1000] {
        let input = events_source(count, 37);
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, data| {
            b.iter(|| {
                let svg = render_timeline(black_box(data), &options).expect("render failed");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_grouping,
    bench_stacking,
    bench_frames,
    bench_render,
    bench_end_to_end
);
criterion_main!(benches);
