//! Benchmarks for split planning.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic content intervals and a synthetic
//! multi-page PDF.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::{dictionary, Document, Object, Stream};

use repage::{ContentInterval, Planner, Repaginator, SplitOptions};

/// Text lines 10pt tall every 14pt down a page of `height`.
fn line_intervals(height: f32) -> Vec<ContentInterval> {
    (0..)
        .map(|i| 40.0 + 14.0 * i as f32)
        .take_while(|y| *y + 10.0 < height)
        .map(|y| ContentInterval::new(y, y + 10.0))
        .collect()
}

/// A PDF of `page_count` tall pages, each a column of text.
fn create_test_pdf(page_count: usize, height: f32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut ops = format!("BT /F1 10 Tf 14 TL 40 {} Td", height - 50.0);
    let lines = ((height - 100.0) / 14.0) as usize;
    for _ in 0..lines {
        ops.push_str(" (Benchmark line) Tj T*");
    }
    ops.push_str(" ET");

    let mut kids = Vec::new();
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(dictionary! {}, ops.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), height.into()],
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).expect("synthetic PDF");
    data
}

/// Benchmark the planner alone at various page heights.
fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_splits");
    let planner = Planner::default();

    for height in [2_000.0_f32, 20_000.0, 200_000.0] {
        let intervals = line_intervals(height);
        group.bench_function(format!("{}pt", height), |b| {
            b.iter(|| planner.plan(black_box(height), black_box(841.5), black_box(&intervals)));
        });
    }

    group.finish();
}

/// Benchmark the planner when every window is covered.
fn bench_forced_cuts(c: &mut Criterion) {
    let planner = Planner::default();
    let intervals = vec![ContentInterval::new(0.0, 100_000.0)];

    c.bench_function("forced_cuts_100000pt", |b| {
        b.iter(|| planner.plan(black_box(100_000.0), black_box(841.5), black_box(&intervals)));
    });
}

/// Benchmark whole-document repagination, sequential and parallel.
fn bench_repaginate(c: &mut Criterion) {
    let mut group = c.benchmark_group("repaginate");
    let data = create_test_pdf(10, 5_000.0);

    for (name, options) in [
        ("parallel", SplitOptions::new()),
        ("sequential", SplitOptions::new().sequential()),
    ] {
        let repaginator = Repaginator::new(options).expect("valid options");
        group.bench_function(name, |b| {
            b.iter(|| repaginator.split_bytes(black_box(&data)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_planner, bench_forced_cuts, bench_repaginate);
criterion_main!(benches);
