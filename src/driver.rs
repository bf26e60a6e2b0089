//! Pagination driver.
//!
//! Decides per page whether a split is needed, runs the planner and turns the
//! resulting cuts into sub-page rects. It never touches page content.

use crate::error::{Error, Result};
use crate::extract::ContentExtractor;
use crate::model::{ContentInterval, PageGeometry, PagePlan, PassReason, PlanOutcome};
use crate::options::{ErrorMode, SplitOptions};
use crate::planner::{derive_rects, Planner};
use crate::source::SourcePage;

/// Plans the sub-pages of source pages.
#[derive(Debug, Clone)]
pub struct Paginator {
    options: SplitOptions,
    planner: Planner,
}

impl Paginator {
    /// Create a paginator, validating the options.
    pub fn new(options: SplitOptions) -> Result<Self> {
        options.validate()?;
        let planner = Planner::new(options.tolerance);
        Ok(Self { options, planner })
    }

    /// The options in use.
    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Target sub-page height for a page.
    pub fn desired_height(&self, geometry: PageGeometry) -> f32 {
        geometry.desired_height(self.options.aspect_ratio)
    }

    /// Why a page should be copied unchanged, or `None` if it needs planning.
    pub fn pass_reason(&self, page: &SourcePage) -> Option<PassReason> {
        let geometry = page.geometry();
        if !self.options.pages.includes(page.number) {
            return Some(PassReason::NotSelected);
        }
        if geometry.height <= self.desired_height(geometry) {
            return Some(PassReason::FitsTarget);
        }
        if page.is_rotated() {
            log::warn!(
                "Page {} is rotated {} degrees; leaving it unsplit",
                page.number,
                page.rotation
            );
            return Some(PassReason::Rotated);
        }
        None
    }

    /// Plan a page from already extracted content intervals.
    ///
    /// Pages no taller than the desired height pass through unchanged.
    pub fn plan_page(
        &self,
        page_number: u32,
        geometry: PageGeometry,
        intervals: &[ContentInterval],
    ) -> Result<PagePlan> {
        if !geometry.is_valid() {
            return Err(Error::InvalidGeometry(format!(
                "page {} is {} x {}",
                page_number, geometry.width, geometry.height
            )));
        }

        let desired_height = self.desired_height(geometry);
        if geometry.height <= desired_height {
            return Ok(PagePlan::pass_through(
                page_number,
                geometry,
                desired_height,
                PassReason::FitsTarget,
            ));
        }

        let plan = self.planner.plan(geometry.height, desired_height, intervals);
        let derived = derive_rects(&plan, geometry, self.options.min_subpage_height);

        log::debug!(
            "Page {}: cuts {:?} ({} forced, {} iterations)",
            page_number,
            plan.cuts,
            plan.forced_cuts,
            plan.iterations
        );
        if !derived.rejected.is_empty() {
            log::info!(
                "Page {}: dropped {} of {} sub-pages",
                page_number,
                derived.rejected.len(),
                plan.band_count()
            );
        }

        Ok(PagePlan {
            page_number,
            geometry,
            desired_height,
            outcome: PlanOutcome::Split { plan },
            rects: derived.rects,
            rejected: derived.rejected,
        })
    }

    /// Plan a source page, pulling its content from `extractor` when needed.
    pub fn paginate<E: ContentExtractor + ?Sized>(
        &self,
        page: &SourcePage,
        extractor: &E,
    ) -> Result<PagePlan> {
        let pending = self.prepare(page, extractor)?;
        self.complete(pending)
    }

    /// First half of [`Paginator::paginate`]: decide pass-through and
    /// extract content. Touches the document, so it runs sequentially.
    pub fn prepare<E: ContentExtractor + ?Sized>(
        &self,
        page: &SourcePage,
        extractor: &E,
    ) -> Result<PendingPage> {
        let geometry = page.geometry();
        if let Some(reason) = self.pass_reason(page) {
            return Ok(PendingPage::Done(PagePlan::pass_through(
                page.number,
                geometry,
                self.desired_height(geometry),
                reason,
            )));
        }

        match extractor.extract_intervals(page) {
            Ok(intervals) => Ok(PendingPage::Extracted {
                page_number: page.number,
                geometry,
                intervals,
            }),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!(
                    "Failed to extract content from page {}: {}; leaving it unsplit",
                    page.number,
                    e
                );
                Ok(PendingPage::Done(PagePlan::pass_through(
                    page.number,
                    geometry,
                    self.desired_height(geometry),
                    PassReason::ExtractionFailed,
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Second half of [`Paginator::paginate`]: pure planning.
    pub fn complete(&self, pending: PendingPage) -> Result<PagePlan> {
        match pending {
            PendingPage::Done(plan) => Ok(plan),
            PendingPage::Extracted {
                page_number,
                geometry,
                intervals,
            } => self.plan_page(page_number, geometry, &intervals),
        }
    }
}

/// A page between extraction and planning.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingPage {
    /// Decided without planning
    Done(PagePlan),
    /// Content extracted, waiting for the planner
    Extracted {
        /// Page number (1-indexed)
        page_number: u32,
        /// Page size
        geometry: PageGeometry,
        /// Content intervals, top-down
        intervals: Vec<ContentInterval>,
    },
}
