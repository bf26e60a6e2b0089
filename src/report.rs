//! Pagination report.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::materialize::{RectOutcome, RectStatus};
use crate::model::{PagePlan, PlanOutcome, RejectedRect};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// What happened to one source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// Source page number (1-indexed)
    pub page_number: u32,
    /// Source page width
    pub width: f32,
    /// Source page height
    pub height: f32,
    /// Target sub-page height
    pub desired_height: f32,
    /// Pass-through reason or split plan
    pub outcome: PlanOutcome,
    /// Surviving rects and what became of them
    pub rects: Vec<RectOutcome>,
    /// Rects left out by the planner filters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedRect>,
}

impl PageReport {
    /// Report for a plan that was not materialized.
    pub fn planned(plan: &PagePlan) -> Self {
        let rects = plan
            .rects
            .iter()
            .map(|rect| RectOutcome {
                rect: *rect,
                status: RectStatus::Planned,
            })
            .collect();
        Self::with_outcomes(plan, rects)
    }

    /// Report for a plan and its materialization outcomes.
    pub fn with_outcomes(plan: &PagePlan, rects: Vec<RectOutcome>) -> Self {
        Self {
            page_number: plan.page_number,
            width: plan.geometry.width,
            height: plan.geometry.height,
            desired_height: plan.desired_height,
            outcome: plan.outcome.clone(),
            rects,
            rejected: plan.rejected.clone(),
        }
    }

    /// Whether the page was split.
    pub fn is_split(&self) -> bool {
        matches!(self.outcome, PlanOutcome::Split { .. })
    }
}

/// Document-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Pages in the source document
    pub source_pages: usize,
    /// Pages that were split
    pub split_pages: usize,
    /// Pages copied unchanged
    pub pass_through_pages: usize,
    /// Sub-pages written to the output
    pub output_pages: usize,
    /// Rects dropped by the planner filters
    pub rejected_rects: usize,
    /// Rects that failed to materialize
    pub failed_rects: usize,
}

/// Report of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationReport {
    /// Source PDF version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_version: Option<String>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Per-page entries in source order
    pub pages: Vec<PageReport>,
    /// Totals over `pages`
    pub totals: ReportTotals,
}

impl PaginationReport {
    /// Create an empty report.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Set the source PDF version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.pdf_version = Some(version.into());
        self
    }

    /// Append a page and update the totals.
    pub fn add_page(&mut self, page: PageReport) {
        let totals = &mut self.totals;
        totals.source_pages += 1;
        if page.is_split() {
            totals.split_pages += 1;
        } else {
            totals.pass_through_pages += 1;
        }
        totals.rejected_rects += page.rejected.len();
        for rect in &page.rects {
            match rect.status {
                RectStatus::Materialized { .. } => totals.output_pages += 1,
                RectStatus::Failed { .. } => totals.failed_rects += 1,
                RectStatus::Planned => {}
            }
        }
        self.pages.push(page);
    }

    /// Number of sub-pages the plans call for.
    pub fn planned_pages(&self) -> usize {
        self.pages.iter().map(|p| p.rects.len()).sum()
    }

    /// Whether any rect failed to materialize.
    pub fn has_failures(&self) -> bool {
        self.totals.failed_rects > 0
    }
}

/// Convert a report to JSON.
pub fn to_json(report: &PaginationReport, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(report),
        JsonFormat::Compact => serde_json::to_string(report),
    };

    result.map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))
}
