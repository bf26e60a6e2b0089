//! Materialization of planned sub-pages.
//!
//! A [`Materializer`] receives the driver's rects and produces output pages.
//! Every rect gets an explicit [`RectOutcome`]; what happens on failure is
//! decided by the [`ErrorMode`], not by the materializer.

mod pdf;

pub use pdf::PdfMaterializer;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{PagePlan, SubPageRect};
use crate::options::ErrorMode;
use crate::source::SourcePage;

/// An output page produced by a materializer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputPage {
    /// Position in the output document (1-indexed)
    pub number: u32,
    /// Output page width
    pub width: f32,
    /// Output page height
    pub height: f32,
}

/// Sink for planned pages.
pub trait Materializer {
    /// Copy a page to the output unchanged.
    fn pass_through(&mut self, page: &SourcePage) -> Result<OutputPage>;

    /// Copy one horizontal band of a page into a new output page.
    fn materialize(&mut self, page: &SourcePage, rect: &SubPageRect) -> Result<OutputPage>;
}

/// Result of materializing one rect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RectStatus {
    /// Planned only; nothing was written
    Planned,
    /// The rect became an output page
    Materialized {
        /// The page it became
        output_page: OutputPage,
    },
    /// The rect is missing from the output
    Failed {
        /// Error message
        reason: String,
    },
}

/// A rect together with what became of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectOutcome {
    /// The planned band
    pub rect: SubPageRect,
    /// What happened to it
    #[serde(flatten)]
    pub status: RectStatus,
}

impl RectOutcome {
    /// Whether the rect made it into the output.
    pub fn is_ok(&self) -> bool {
        matches!(self.status, RectStatus::Materialized { .. })
    }
}

/// Hand a page plan to a materializer.
///
/// In lenient mode a failed rect is logged and recorded, and the remaining
/// rects are still materialized. In strict mode the first failure is returned.
pub fn materialize_plan<M: Materializer + ?Sized>(
    materializer: &mut M,
    page: &SourcePage,
    plan: &PagePlan,
    error_mode: ErrorMode,
) -> Result<Vec<RectOutcome>> {
    let mut outcomes = Vec::with_capacity(plan.rects.len());

    for (index, rect) in plan.rects.iter().enumerate() {
        let result = if plan.is_pass_through() {
            materializer.pass_through(page)
        } else {
            materializer.materialize(page, rect)
        };

        let status = match result {
            Ok(output_page) => {
                log::debug!(
                    "Saved page {}.{} as output page {}",
                    page.number,
                    index,
                    output_page.number
                );
                RectStatus::Materialized { output_page }
            }
            Err(e) if error_mode == ErrorMode::Lenient => {
                log::warn!(
                    "Failed to copy page {}.{} ({:.1}-{:.1}): {}",
                    page.number,
                    index,
                    rect.top,
                    rect.bottom,
                    e
                );
                RectStatus::Failed {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                return Err(Error::Materialize(format!(
                    "page {} band {:.1}-{:.1}: {}",
                    page.number, rect.top, rect.bottom, e
                )))
            }
        };
        outcomes.push(RectOutcome {
            rect: *rect,
            status,
        });
    }

    Ok(outcomes)
}
