use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pipeline_diagram::config::{LayoutConfig, ViewportConfig};
use pipeline_diagram::diagram::Diagram;
use pipeline_diagram::parser::parse_and_prepare;
use pipeline_diagram::text_metrics::FixedMeasurer;
use pipeline_diagram::viewport::Viewport;
use std::hint::black_box;

/// `lanes` lanes of `adapters` full adapters each, chained lane to lane.
fn pipeline_source(lanes: usize, adapters: usize) -> String {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for lane in 0..lanes {
        let children: Vec<String> = (0..adapters)
            .map(|i| format!(r#"{{ "id": "a{lane}_{i}", "label": "Adapter {lane}.{i}", "type": "adapter" }}"#))
            .collect();
        nodes.push(format!(
            r#"{{ "id": "lane{lane}", "label": "Lane {lane}", "type": "lane", "x": {x}, "y": 0, "children": [{}] }}"#,
            children.join(","),
            x = lane * 500
        ));
        if lane > 0 {
            for i in 0..adapters {
                edges.push(format!(
                    r#"{{ "source": "trn_a{prev}_{i}", "target": "stg_a{lane}_{i}", "type": "SSIS", "state": "Ready" }}"#,
                    prev = lane - 1
                ));
            }
        }
    }
    format!(r#"{{ "nodes": [{}], "edges": [{}] }}"#, nodes.join(","), edges.join(","))
}

fn build(input: &str) -> Diagram {
    Diagram::parse(input, Box::new(FixedMeasurer::default()), LayoutConfig::default()).expect("parse failed")
}

const SIZES: [(usize, usize); 3] = [(2, 4), (8, 16), (20, 40)];

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare");
    let config = LayoutConfig::default();
    for (lanes, adapters) in SIZES {
        let input = pipeline_source(lanes, adapters);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{lanes}x{adapters}")), &input, |b, data| {
            b.iter(|| {
                let prepared = parse_and_prepare(black_box(data), &config).expect("parse failed");
                black_box(prepared.roots.len());
            });
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for (lanes, adapters) in SIZES {
        let input = pipeline_source(lanes, adapters);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{lanes}x{adapters}")), &input, |b, data| {
            b.iter(|| {
                let diagram = build(black_box(data));
                black_box(diagram.index().len());
            });
        });
    }
    group.finish();
}

fn bench_collapse_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("collapse_toggle");
    for (lanes, adapters) in SIZES {
        let mut diagram = build(&pipeline_source(lanes, adapters));
        group.bench_function(BenchmarkId::from_parameter(format!("{lanes}x{adapters}")), |b| {
            b.iter(|| {
                let transition = diagram.toggle_collapsed(black_box("lane0")).expect("toggle failed");
                black_box(transition);
            });
        });
    }
    group.finish();
}

fn bench_focus(c: &mut Criterion) {
    let mut group = c.benchmark_group("focus");
    for (lanes, adapters) in SIZES {
        let diagram = build(&pipeline_source(lanes, adapters));
        let mut viewport = Viewport::new(ViewportConfig::default());
        let target = format!("stg_a{}_0", lanes / 2);
        group.bench_function(BenchmarkId::from_parameter(format!("{lanes}x{adapters}")), |b| {
            b.iter(|| {
                let focus = viewport.focus(&diagram, black_box(&target)).expect("focus failed");
                black_box(focus.transform);
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_prepare, bench_build, bench_collapse_toggle, bench_focus
);
criterion_main!(benches);
