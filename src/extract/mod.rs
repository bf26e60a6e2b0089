//! Content interval extraction.
//!
//! The planner only needs to know which vertical spans of a page hold
//! content. [`ContentExtractor`] is that seam; [`PdfContentExtractor`] fills
//! it from a page's content stream.

mod content;
mod layout;

pub use layout::{group_into_blocks, group_into_lines, TextFragment, TextLine};

use crate::error::Result;
use crate::model::ContentInterval;
use crate::options::{SplitOptions, TextGranularity};
use crate::source::{PdfSource, SourcePage};

use content::ContentWalker;

/// Source of content intervals for a page.
pub trait ContentExtractor {
    /// Vertical spans of the page occupied by content, top-down, in any order.
    fn extract_intervals(&self, page: &SourcePage) -> Result<Vec<ContentInterval>>;
}

/// Extracts text lines (or blocks) and images from PDF pages.
pub struct PdfContentExtractor<'a> {
    source: &'a PdfSource,
    granularity: TextGranularity,
    block_gap_ratio: f32,
    include_images: bool,
}

impl<'a> PdfContentExtractor<'a> {
    /// Create an extractor configured from split options.
    pub fn new(source: &'a PdfSource, options: &SplitOptions) -> Self {
        Self {
            source,
            granularity: options.granularity,
            block_gap_ratio: options.block_gap_ratio,
            include_images: options.include_images,
        }
    }

    /// Text lines of a page in top-down coordinates.
    pub fn extract_lines(&self, page: &SourcePage) -> Result<Vec<TextLine>> {
        let (fragments, _) = self.place(page)?;
        Ok(group_into_lines(fragments))
    }

    /// Walk the page and convert everything to top-down coordinates.
    fn place(&self, page: &SourcePage) -> Result<(Vec<TextFragment>, Vec<ContentInterval>)> {
        let content = self.source.page_content(page.id)?;
        let resources = self.source.resources(page.id);
        let placed = ContentWalker::new(self.source, resources, self.include_images).walk(&content)?;

        let page_box = page.page_box;
        let fragments = placed
            .text
            .iter()
            .map(|run| TextFragment {
                top: page_box.to_top_down(run.y_max),
                bottom: page_box.to_top_down(run.y_min),
                baseline: page_box.to_top_down(run.baseline),
                size: run.size,
            })
            .collect();
        let graphics = placed
            .graphics
            .iter()
            .map(|&(y_min, y_max)| {
                ContentInterval::new(page_box.to_top_down(y_max), page_box.to_top_down(y_min))
            })
            .collect();

        Ok((fragments, graphics))
    }
}

impl ContentExtractor for PdfContentExtractor<'_> {
    fn extract_intervals(&self, page: &SourcePage) -> Result<Vec<ContentInterval>> {
        let (fragments, graphics) = self.place(page)?;
        let lines = group_into_lines(fragments);

        let text = match self.granularity {
            TextGranularity::Line => lines.iter().map(TextLine::interval).collect(),
            TextGranularity::Block => group_into_blocks(&lines, self.block_gap_ratio),
        };

        let height = page.geometry().height;
        let intervals: Vec<ContentInterval> = text
            .into_iter()
            .chain(graphics)
            .filter_map(|i| i.clip(0.0, height))
            .collect();

        log::debug!(
            "Page {}: {} text lines, {} content intervals",
            page.number,
            lines.len(),
            intervals.len()
        );
        Ok(intervals)
    }
}
