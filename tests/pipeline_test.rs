//! End-to-end tests over synthetic PDFs.

use lopdf::{dictionary, Document, Object, Stream};
use tempfile::tempdir;

use repage::{
    to_json, ContentInterval, Error, JsonFormat, PageSelection, PassReason, PdfSource,
    PlanOutcome, Repaginator, SplitOptions, TextGranularity, A4_ASPECT_RATIO,
};

/// A4 width in points.
const WIDTH: f32 = 595.0;

/// Target sub-page height for an A4-wide page, about 841.5.
fn desired() -> f32 {
    WIDTH * A4_ASPECT_RATIO
}

struct PageSpec {
    height: f32,
    content: String,
    rotate: i64,
}

impl PageSpec {
    fn new(height: f32, content: impl Into<String>) -> Self {
        Self {
            height,
            content: content.into(),
            rotate: 0,
        }
    }
}

/// Baselines (top-down) of a column of 10pt lines, 14pt apart.
fn text_baselines(height: f32) -> Vec<f32> {
    (0..)
        .map(|i| 50.0 + 14.0 * i as f32)
        .take_while(|b| *b <= height - 50.0)
        .collect()
}

/// Baselines of paragraphs of ten lines, 14pt apart, with a 54pt step
/// between the last line of one paragraph and the first of the next.
fn paragraph_baselines(height: f32) -> Vec<Vec<f32>> {
    (0..)
        .map(|p| {
            let first = 50.0 + 180.0 * p as f32;
            (0..10).map(|i| first + 14.0 * i as f32).collect::<Vec<f32>>()
        })
        .take_while(|para| para[9] <= height - 50.0)
        .collect()
}

/// Text operators drawing a 10pt line at each top-down baseline.
fn text_at(height: f32, baselines: &[f32]) -> String {
    let mut ops = format!("BT /F1 10 Tf 40 {} Td (line) Tj", height - baselines[0]);
    for pair in baselines.windows(2) {
        ops.push_str(&format!(" 0 -{} Td (line) Tj", pair[1] - pair[0]));
    }
    ops.push_str(" ET");
    ops
}

fn text_column(height: f32) -> String {
    text_at(height, &text_baselines(height))
}

/// Top-down extent of a 10pt line on `baseline`.
fn line_box(baseline: f32) -> ContentInterval {
    ContentInterval::new(baseline - 8.0, baseline + 2.0)
}

fn full_page_image(height: f32) -> String {
    format!("q {} 0 0 {} 0 0 cm /Im1 Do Q", WIDTH, height)
}

fn build_pdf(specs: &[PageSpec]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![128],
    ));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => dictionary! { "Im1" => image_id },
    });

    let mut kids = Vec::new();
    for spec in specs {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            spec.content.as_bytes().to_vec(),
        ));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), WIDTH.into(), spec.height.into()],
            "Contents" => content_id,
        };
        if spec.rotate != 0 {
            page.set("Rotate", spec.rotate);
        }
        kids.push(Object::from(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn pdf_bytes(specs: &[PageSpec]) -> Vec<u8> {
    let mut doc = build_pdf(specs);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn source(specs: &[PageSpec]) -> PdfSource {
    PdfSource::from_document(build_pdf(specs)).unwrap()
}

#[test]
fn test_tall_text_page_cuts_between_lines() {
    let height = 2000.0;
    let source = source(&[PageSpec::new(height, text_column(height))]);
    let options = SplitOptions::new().with_granularity(TextGranularity::Line);
    let repaginator = Repaginator::new(options).unwrap();

    let plans = repaginator.plan(&source).unwrap();
    let plan = plans[0].split_plan().unwrap();
    assert_eq!(plan.cuts.len(), 4);
    assert_eq!(plan.forced_cuts, 0);

    let lines: Vec<ContentInterval> = text_baselines(height).into_iter().map(line_box).collect();
    for cut in &plan.cuts[1..plan.cuts.len() - 1] {
        assert!(
            lines.iter().all(|l| *cut <= l.y0 || *cut >= l.y1),
            "cut {cut} goes through a line"
        );
    }
    for (top, bottom) in plan.bands() {
        assert!(bottom - top <= desired() * 1.1 + 1e-3);
    }
}

#[test]
fn test_default_cuts_fall_between_paragraphs() {
    let height = 2000.0;
    let paragraphs = paragraph_baselines(height);
    let baselines: Vec<f32> = paragraphs.iter().flatten().copied().collect();
    let source = source(&[PageSpec::new(height, text_at(height, &baselines))]);
    let repaginator = Repaginator::new(SplitOptions::default()).unwrap();

    let plans = repaginator.plan(&source).unwrap();
    let plan = plans[0].split_plan().unwrap();
    assert_eq!(plan.forced_cuts, 0);
    assert!(plan.cuts.len() > 2);

    for cut in &plan.cuts[1..plan.cuts.len() - 1] {
        for para in &paragraphs {
            let top = line_box(para[0]).y0;
            let bottom = line_box(para[9]).y1;
            assert!(
                *cut <= top || *cut >= bottom,
                "cut {cut} splits the paragraph {top}-{bottom}"
            );
        }
    }
}

#[test]
fn test_split_file_writes_stacked_pages() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tall.pdf");
    let output = dir.path().join("paged.pdf");
    let height = 2000.0;
    std::fs::write(&input, pdf_bytes(&[PageSpec::new(height, text_column(height))])).unwrap();

    let report = repage::split_file(&input, &output).unwrap();
    assert_eq!(report.totals.source_pages, 1);
    assert_eq!(report.totals.split_pages, 1);
    assert_eq!(report.totals.output_pages, 3);
    assert!(!report.has_failures());

    let written = PdfSource::open(&output).unwrap();
    let pages = written.pages();
    assert_eq!(pages.len(), 3);

    // Bands stack from the top of the source page down, without gaps.
    assert!((pages[0].page_box.y1 - height).abs() < 1e-3);
    for pair in pages.windows(2) {
        assert!((pair[0].page_box.y0 - pair[1].page_box.y1).abs() < 1e-3);
    }
    assert!(pages[2].page_box.y0.abs() < 1e-3);
    for page in &pages {
        assert!((page.page_box.width() - WIDTH).abs() < 1e-3);
    }
}

#[test]
fn test_image_forces_cuts_at_target() {
    let height = 2000.0;
    let source = source(&[PageSpec::new(height, full_page_image(height))]);
    let repaginator = Repaginator::new(SplitOptions::default()).unwrap();

    let plans = repaginator.plan(&source).unwrap();
    let plan = plans[0].split_plan().unwrap();
    let first = desired();
    let second = first + desired();
    assert_eq!(plan.cuts, vec![0.0, first, second, height]);
    assert_eq!(plan.forced_cuts, 2);
}

#[test]
fn test_mixed_document_keeps_page_order() {
    let bytes = pdf_bytes(&[
        PageSpec::new(800.0, text_column(800.0)),
        PageSpec::new(2000.0, full_page_image(2000.0)),
        PageSpec::new(300.0, ""),
    ]);
    let repaginator = Repaginator::new(SplitOptions::new().sequential()).unwrap();

    let (output, report) = repaginator.split_bytes(&bytes).unwrap();
    assert_eq!(report.totals.pass_through_pages, 2);
    assert_eq!(report.totals.output_pages, 5);

    let written = PdfSource::from_bytes(&output).unwrap();
    let heights: Vec<f32> = written
        .pages()
        .iter()
        .map(|p| p.page_box.height())
        .collect();
    let expected = [800.0, desired(), desired(), 2000.0 - 2.0 * desired(), 300.0];
    assert_eq!(heights.len(), expected.len());
    for (h, e) in heights.iter().zip(expected) {
        assert!((h - e).abs() < 1e-3, "{heights:?}");
    }
}

#[test]
fn test_unselected_and_rotated_pages_pass_through() {
    let mut rotated = PageSpec::new(2000.0, full_page_image(2000.0));
    rotated.rotate = 90;
    let source = source(&[
        PageSpec::new(2000.0, full_page_image(2000.0)),
        PageSpec::new(2000.0, full_page_image(2000.0)),
        rotated,
    ]);
    let options = SplitOptions::new().with_pages(PageSelection::parse("2-3").unwrap());
    let repaginator = Repaginator::new(options).unwrap();

    let plans = repaginator.plan(&source).unwrap();
    assert_eq!(
        plans[0].outcome,
        PlanOutcome::PassThrough {
            reason: PassReason::NotSelected
        }
    );
    assert!(!plans[1].is_pass_through());
    assert_eq!(
        plans[2].outcome,
        PlanOutcome::PassThrough {
            reason: PassReason::Rotated
        }
    );
}

#[test]
fn test_broken_content_lenient_and_strict() {
    let mut doc = build_pdf(&[PageSpec::new(2000.0, "")]);
    let page_id = doc.get_pages()[&1];
    doc.get_dictionary_mut(page_id)
        .unwrap()
        .set("Contents", Object::Integer(7));

    let lenient = Repaginator::new(SplitOptions::default()).unwrap();
    let source = PdfSource::from_document(doc.clone()).unwrap();
    let report = lenient.dry_run(&source).unwrap();
    assert_eq!(
        report.pages[0].outcome,
        PlanOutcome::PassThrough {
            reason: PassReason::ExtractionFailed
        }
    );

    let strict = Repaginator::new(SplitOptions::new().strict()).unwrap();
    let source = PdfSource::from_document(doc).unwrap();
    assert!(matches!(strict.dry_run(&source), Err(Error::PdfParse(_))));
}

#[test]
fn test_plan_file_is_a_dry_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tall.pdf");
    std::fs::write(&input, pdf_bytes(&[PageSpec::new(2000.0, full_page_image(2000.0))]))
        .unwrap();

    let report = repage::plan_file(&input).unwrap();
    assert!(report.dry_run);
    assert_eq!(report.totals.output_pages, 0);
    assert_eq!(report.planned_pages(), 3);

    let json = to_json(&report, JsonFormat::Compact).unwrap();
    assert!(json.contains(r#""kind":"split""#));
    assert!(json.contains(r#""status":"planned""#));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_short_tail_is_dropped_from_output() {
    // Forced cuts near 841.5 and 1683 leave a 30pt tail.
    let height = 1713.0;
    let bytes = pdf_bytes(&[PageSpec::new(height, full_page_image(height))]);
    let repaginator = Repaginator::new(SplitOptions::default()).unwrap();

    let (output, report) = repaginator.split_bytes(&bytes).unwrap();
    assert_eq!(report.totals.rejected_rects, 1);
    assert_eq!(report.totals.output_pages, 2);
    assert_eq!(PdfSource::from_bytes(&output).unwrap().page_count(), 2);
}
