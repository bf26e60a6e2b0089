//! # repage
//!
//! Content-aware repagination of tall PDF pages.
//!
//! Pages taller than a target aspect ratio (A4 by default) are cut into
//! several output pages. Cuts are placed in whitespace between text lines
//! and images where possible, and forced at the target height otherwise.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> repage::Result<()> {
//!     let report = repage::split_file("long-receipt.pdf", "receipt-a4.pdf")?;
//!     println!(
//!         "{} source pages -> {} output pages",
//!         report.totals.source_pages, report.totals.output_pages
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Planning without PDF input
//!
//! The planner is a pure function over page height, target height and
//! occupied vertical intervals:
//!
//! ```
//! use repage::{plan_splits, ContentInterval};
//!
//! let plan = plan_splits(400.0, 200.0, &[ContentInterval::new(100.0, 190.0)]);
//! assert_eq!(plan.cuts, vec![0.0, 205.0, 400.0]);
//! ```
//!
//! ## Features
//!
//! - **Whitespace-first cuts**: the longest free gap near the target wins
//! - **Bounded work**: the cut loop has a hard iteration cap
//! - **Lossless copying**: sub-pages share the source content streams
//! - **Parallel planning**: uses Rayon across pages
//! - **Reports**: per-page plans and per-rect outcomes as JSON

pub mod detect;
pub mod driver;
pub mod error;
pub mod extract;
pub mod materialize;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod planner;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfHeader};
pub use driver::{Paginator, PendingPage};
pub use error::{Error, Result};
pub use extract::{ContentExtractor, PdfContentExtractor};
pub use materialize::{Materializer, OutputPage, PdfMaterializer, RectOutcome, RectStatus};
pub use model::{
    ContentInterval, PageBox, PageGeometry, PagePlan, PassReason, PlanOutcome, RectRejection,
    RejectedRect, SplitPlan, SubPageRect,
};
pub use options::{
    ErrorMode, PageSelection, SplitOptions, TextGranularity, A4_ASPECT_RATIO, DEFAULT_TOLERANCE,
    DEFAULT_MIN_SUBPAGE_HEIGHT,
};
pub use pipeline::Repaginator;
pub use planner::{plan_splits, Planner};
pub use report::{to_json, JsonFormat, PageReport, PaginationReport, ReportTotals};
pub use source::{PdfSource, SourcePage};

use std::path::Path;

/// Split the tall pages of a PDF file with default options.
///
/// # Arguments
///
/// * `input` - Path to the source PDF
/// * `output` - Path the repaginated PDF is written to
///
/// # Example
///
/// ```no_run
/// let report = repage::split_file("in.pdf", "out.pdf").unwrap();
/// assert!(!report.has_failures());
/// ```
pub fn split_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<PaginationReport> {
    split_file_with_options(input, output, SplitOptions::default())
}

/// Split the tall pages of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use repage::{split_file_with_options, SplitOptions, TextGranularity};
///
/// let options = SplitOptions::new()
///     .with_granularity(TextGranularity::Line)
///     .strict();
/// split_file_with_options("in.pdf", "out.pdf", options).unwrap();
/// ```
pub fn split_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: SplitOptions,
) -> Result<PaginationReport> {
    Repaginator::new(options)?.split_file(input, output)
}

/// Split PDF bytes with default options.
pub fn split_bytes(data: &[u8]) -> Result<(Vec<u8>, PaginationReport)> {
    Repaginator::new(SplitOptions::default())?.split_bytes(data)
}

/// Plan a PDF file without writing output.
///
/// # Example
///
/// ```no_run
/// use repage::{plan_file, to_json, JsonFormat};
///
/// let report = plan_file("in.pdf").unwrap();
/// println!("{}", to_json(&report, JsonFormat::Pretty).unwrap());
/// ```
pub fn plan_file<P: AsRef<Path>>(input: P) -> Result<PaginationReport> {
    plan_file_with_options(input, SplitOptions::default())
}

/// Plan a PDF file with custom options, without writing output.
pub fn plan_file_with_options<P: AsRef<Path>>(
    input: P,
    options: SplitOptions,
) -> Result<PaginationReport> {
    Repaginator::new(options)?.plan_file(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SplitOptions::default();
        assert_eq!(options.aspect_ratio, A4_ASPECT_RATIO);
        assert_eq!(options.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(options.min_subpage_height, DEFAULT_MIN_SUBPAGE_HEIGHT);
        assert_eq!(options.error_mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_split_bytes_rejects_garbage() {
        assert!(split_bytes(b"not a pdf").is_err());
    }
}
