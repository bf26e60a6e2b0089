//! Whole-document repagination.
//!
//! # Example
//!
//! ```no_run
//! use repage::{Repaginator, SplitOptions};
//!
//! fn main() -> repage::Result<()> {
//!     let repaginator = Repaginator::new(SplitOptions::new().with_tolerance(0.15))?;
//!     let report = repaginator.split_file("scroll.pdf", "pages.pdf")?;
//!     println!("{} pages written", report.totals.output_pages);
//!     Ok(())
//! }
//! ```

use std::io::{Read, Write};
use std::path::Path;

use lopdf::Document as LopdfDocument;
use rayon::prelude::*;

use crate::driver::{Paginator, PendingPage};
use crate::error::{Error, Result};
use crate::extract::PdfContentExtractor;
use crate::materialize::{materialize_plan, PdfMaterializer};
use crate::model::PagePlan;
use crate::options::SplitOptions;
use crate::report::{PageReport, PaginationReport};
use crate::source::PdfSource;

/// Splits tall pages of a PDF into target-sized pages.
#[derive(Debug, Clone)]
pub struct Repaginator {
    paginator: Paginator,
}

impl Repaginator {
    /// Create a repaginator, validating the options.
    pub fn new(options: SplitOptions) -> Result<Self> {
        Ok(Self {
            paginator: Paginator::new(options)?,
        })
    }

    /// The options in use.
    pub fn options(&self) -> &SplitOptions {
        self.paginator.options()
    }

    /// Plan every page of a document.
    ///
    /// Extraction walks the document sequentially; planning runs across
    /// pages in parallel unless disabled.
    pub fn plan(&self, source: &PdfSource) -> Result<Vec<PagePlan>> {
        let options = self.paginator.options();
        let extractor = PdfContentExtractor::new(source, options);

        let pending = source
            .pages()
            .iter()
            .map(|page| self.paginator.prepare(page, &extractor))
            .collect::<Result<Vec<PendingPage>>>()?;

        let plans = if options.parallel {
            pending
                .into_par_iter()
                .map(|p| self.paginator.complete(p))
                .collect::<Result<Vec<_>>>()?
        } else {
            pending
                .into_iter()
                .map(|p| self.paginator.complete(p))
                .collect::<Result<Vec<_>>>()?
        };

        log::info!(
            "Planned {} pages: {} to split",
            plans.len(),
            plans.iter().filter(|p| !p.is_pass_through()).count()
        );
        Ok(plans)
    }

    /// Plan a document without writing anything.
    pub fn dry_run(&self, source: &PdfSource) -> Result<PaginationReport> {
        let mut report = PaginationReport::new(true).with_version(source.version());
        for plan in self.plan(source)? {
            report.add_page(PageReport::planned(&plan));
        }
        Ok(report)
    }

    /// Repaginate a loaded document, returning the output document.
    pub fn repaginate(&self, source: PdfSource) -> Result<(LopdfDocument, PaginationReport)> {
        let plans = self.plan(&source)?;
        let pages = source.pages();
        let error_mode = self.paginator.options().error_mode;
        let mut report = PaginationReport::new(false).with_version(source.version());

        let mut materializer = PdfMaterializer::new(source)?;
        for (page, plan) in pages.iter().zip(&plans) {
            let outcomes = materialize_plan(&mut materializer, page, plan, error_mode)?;
            report.add_page(PageReport::with_outcomes(plan, outcomes));
        }

        if materializer.output_count() == 0 {
            return Err(Error::Materialize("no pages were written".to_string()));
        }
        let doc = materializer.finish()?;

        let totals = &report.totals;
        log::info!(
            "Wrote {} pages from {} ({} split, {} dropped, {} failed)",
            totals.output_pages,
            totals.source_pages,
            totals.split_pages,
            totals.rejected_rects,
            totals.failed_rects
        );
        Ok((doc, report))
    }

    /// Repaginate a PDF file into `output`.
    pub fn split_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<PaginationReport> {
        let source = PdfSource::open(input)?;
        self.split_source(source, output)
    }

    /// Repaginate a loaded document into `output`.
    pub fn split_source<Q: AsRef<Path>>(
        &self,
        source: PdfSource,
        output: Q,
    ) -> Result<PaginationReport> {
        let (mut doc, report) = self.repaginate(source)?;
        doc.save(output)?;
        Ok(report)
    }

    /// Repaginate PDF bytes, writing the result to `writer`.
    pub fn split_to_writer<W: Write>(
        &self,
        data: &[u8],
        writer: &mut W,
    ) -> Result<PaginationReport> {
        let source = PdfSource::from_bytes(data)?;
        let (mut doc, report) = self.repaginate(source)?;
        doc.save_to(writer)?;
        Ok(report)
    }

    /// Repaginate PDF bytes into new bytes.
    pub fn split_bytes(&self, data: &[u8]) -> Result<(Vec<u8>, PaginationReport)> {
        let mut output = Vec::new();
        let report = self.split_to_writer(data, &mut output)?;
        Ok((output, report))
    }

    /// Repaginate a PDF read from `reader`.
    pub fn split_reader<R: Read, W: Write>(
        &self,
        mut reader: R,
        writer: &mut W,
    ) -> Result<PaginationReport> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.split_to_writer(&data, writer)
    }

    /// Plan a PDF file without writing anything.
    pub fn plan_file<P: AsRef<Path>>(&self, input: P) -> Result<PaginationReport> {
        let source = PdfSource::open(input)?;
        self.dry_run(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_options_rejected() {
        let result = Repaginator::new(SplitOptions::new().with_aspect_ratio(-1.0));
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_not_a_pdf() {
        let repaginator = Repaginator::new(SplitOptions::default()).unwrap();
        assert!(matches!(
            repaginator.split_bytes(b"plain text"),
            Err(Error::UnknownFormat)
        ));
    }
}
