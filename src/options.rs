//! Split options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Height/width ratio of an ISO 216 portrait page (A4 is 210 x 297 mm).
pub const A4_ASPECT_RATIO: f32 = 297.0 / 210.0;

/// Default half-width of the search window, as a fraction of the desired height.
pub const DEFAULT_TOLERANCE: f32 = 0.1;

/// Default minimum sub-page height in points. Shorter sub-pages are dropped.
pub const DEFAULT_MIN_SUBPAGE_HEIGHT: f32 = 50.0;

/// Options for repaginating a document.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Target height/width ratio of output pages
    pub aspect_ratio: f32,

    /// Search window half-width as a fraction of the desired height
    pub tolerance: f32,

    /// Sub-pages not taller than this are dropped
    pub min_subpage_height: f32,

    /// How text is turned into content intervals
    pub granularity: TextGranularity,

    /// Lines closer than this multiple of the average line spacing join one
    /// block (`TextGranularity::Block` only)
    pub block_gap_ratio: f32,

    /// Whether images and form XObjects count as content
    pub include_images: bool,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to plan pages in parallel
    pub parallel: bool,

    /// Pages eligible for splitting; the rest pass through
    pub pages: PageSelection,
}

impl SplitOptions {
    /// Create new split options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target aspect ratio (height / width).
    pub fn with_aspect_ratio(mut self, ratio: f32) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Set the tolerance fraction.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the minimum sub-page height.
    pub fn with_min_subpage_height(mut self, height: f32) -> Self {
        self.min_subpage_height = height;
        self
    }

    /// Set text granularity.
    pub fn with_granularity(mut self, granularity: TextGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set the block grouping threshold.
    pub fn with_block_gap_ratio(mut self, ratio: f32) -> Self {
        self.block_gap_ratio = ratio;
        self
    }

    /// Enable or disable image intervals.
    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first extraction or materialization error.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Disable parallel planning.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Check that every tunable is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(Error::InvalidOptions(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if !self.tolerance.is_finite() || !(0.0..1.0).contains(&self.tolerance) {
            return Err(Error::InvalidOptions(format!(
                "tolerance must be in [0, 1), got {}",
                self.tolerance
            )));
        }
        if !self.min_subpage_height.is_finite() || self.min_subpage_height < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "minimum sub-page height must be non-negative, got {}",
                self.min_subpage_height
            )));
        }
        if !self.block_gap_ratio.is_finite() || self.block_gap_ratio < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "block gap ratio must be non-negative, got {}",
                self.block_gap_ratio
            )));
        }
        Ok(())
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            aspect_ratio: A4_ASPECT_RATIO,
            tolerance: DEFAULT_TOLERANCE,
            min_subpage_height: DEFAULT_MIN_SUBPAGE_HEIGHT,
            granularity: TextGranularity::Block,
            block_gap_ratio: 1.5,
            include_images: true,
            error_mode: ErrorMode::Lenient,
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// Error handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    Strict,
    /// Log, record the failure in the report and continue
    #[default]
    Lenient,
}

/// Unit of text that must not be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextGranularity {
    /// Each text line is one interval; cuts may fall between lines of a paragraph
    Line,
    /// Lines are grouped into paragraph blocks first
    #[default]
    Block,
}

/// Page selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number is selected.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a selection string such as `"1-10"` or `"1,3,5-7"`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let parse_num = |part: &str| -> Result<u32> {
            let n: u32 = part
                .trim()
                .parse()
                .map_err(|_| Error::InvalidPageRange(format!("not a page number: {:?}", part)))?;
            if n == 0 {
                return Err(Error::InvalidPageRange(
                    "page numbers start at 1".to_string(),
                ));
            }
            Ok(n)
        };

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let (start, end) = (parse_num(start)?, parse_num(end)?);
                if start > end {
                    return Err(Error::InvalidPageRange(format!("{}-{}", start, end)));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = (parse_num(start)?, parse_num(end)?);
                if start > end {
                    return Err(Error::InvalidPageRange(format!("{}-{}", start, end)));
                }
                pages.extend(start..=end);
            } else {
                pages.push(parse_num(part)?);
            }
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_options_builder() {
        let options = SplitOptions::new()
            .with_aspect_ratio(1.0)
            .with_tolerance(0.2)
            .with_min_subpage_height(20.0)
            .with_granularity(TextGranularity::Line)
            .with_images(false)
            .strict()
            .sequential();

        assert_eq!(options.aspect_ratio, 1.0);
        assert_eq!(options.tolerance, 0.2);
        assert_eq!(options.min_subpage_height, 20.0);
        assert_eq!(options.granularity, TextGranularity::Line);
        assert!(!options.include_images);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = SplitOptions::default();
        assert!((options.aspect_ratio - 1.414_285_7).abs() < 1e-6);
        assert_eq!(options.tolerance, 0.1);
        assert_eq!(options.min_subpage_height, 50.0);
        assert_eq!(options.granularity, TextGranularity::Block);
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(SplitOptions::new().with_aspect_ratio(0.0).validate().is_err());
        assert!(SplitOptions::new()
            .with_aspect_ratio(f32::INFINITY)
            .validate()
            .is_err());
        assert!(SplitOptions::new().with_tolerance(1.0).validate().is_err());
        assert!(SplitOptions::new().with_tolerance(-0.1).validate().is_err());
        assert!(SplitOptions::new()
            .with_min_subpage_height(-1.0)
            .validate()
            .is_err());
        assert!(SplitOptions::new().with_tolerance(0.0).validate().is_ok());
    }

    #[test]
    fn test_page_selection_includes() {
        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
        assert!(PageSelection::All.includes(99));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("2-4").unwrap(),
            PageSelection::Range(2..=4)
        );
        assert_eq!(
            PageSelection::parse("5,1,3-4,3").unwrap(),
            PageSelection::Pages(vec![1, 3, 4, 5])
        );
        assert!(PageSelection::parse("0").is_err());
        assert!(PageSelection::parse("4-2").is_err());
        assert!(PageSelection::parse("a,b").is_err());
    }
}
