//! Split plans and per-page planning results.

use serde::{Deserialize, Serialize};

use super::{PageGeometry, SubPageRect};

/// Ordered cut offsets `[0, c1, ..., height]` for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPlan {
    /// Strictly increasing cut offsets, first is 0 and last is the page height
    /// (only `[0]` when the page had no usable height)
    pub cuts: Vec<f32>,

    /// Cuts placed at the target offset because no whitespace was available
    pub forced_cuts: usize,

    /// Number of search iterations the planner ran
    pub iterations: usize,
}

impl SplitPlan {
    /// Single-band plan covering `[0, height]`.
    pub fn whole(height: f32) -> Self {
        Self {
            cuts: vec![0.0, height],
            forced_cuts: 0,
            iterations: 1,
        }
    }

    /// Plan with no bands, for a page without a usable height.
    pub fn empty() -> Self {
        Self {
            cuts: vec![0.0],
            forced_cuts: 0,
            iterations: 0,
        }
    }

    /// Number of bands before filtering.
    pub fn band_count(&self) -> usize {
        self.cuts.len().saturating_sub(1)
    }

    /// Whether the plan keeps the page in one piece.
    pub fn is_whole(&self) -> bool {
        self.cuts.len() <= 2
    }

    /// Consecutive cut pairs as `(top, bottom)`.
    pub fn bands(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.cuts.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Why a derived rect was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RectRejection {
    /// The rect fails `0 <= top < bottom <= height`
    InvalidGeometry,
    /// The rect is not taller than the configured minimum; its content is lost
    DegenerateSubPage,
}

impl std::fmt::Display for RectRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RectRejection::InvalidGeometry => write!(f, "invalid geometry"),
            RectRejection::DegenerateSubPage => write!(f, "below minimum height"),
        }
    }
}

/// A rect dropped from a page plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RejectedRect {
    /// The dropped band
    pub rect: SubPageRect,
    /// Why it was dropped
    pub reason: RectRejection,
}

/// Why a page is copied to the output unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassReason {
    /// The page is no taller than the desired height
    FitsTarget,
    /// The page is outside the page selection
    NotSelected,
    /// The page is displayed rotated
    Rotated,
    /// Content extraction failed in lenient mode
    ExtractionFailed,
}

/// What the driver decided for a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// Emit the page as is
    PassThrough {
        /// Why the page is not split
        reason: PassReason,
    },
    /// Emit the surviving bands of a split plan
    Split {
        /// The planner's cuts
        plan: SplitPlan,
    },
}

/// The driver's result for one source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Source page number (1-indexed)
    pub page_number: u32,

    /// Source page size
    pub geometry: PageGeometry,

    /// Target sub-page height
    pub desired_height: f32,

    /// Pass-through or split
    pub outcome: PlanOutcome,

    /// Rects to materialize, in increasing `top` order
    pub rects: Vec<SubPageRect>,

    /// Rects dropped by validation or the minimum-height filter
    pub rejected: Vec<RejectedRect>,
}

impl PagePlan {
    /// Plan that copies the page unchanged.
    pub fn pass_through(
        page_number: u32,
        geometry: PageGeometry,
        desired_height: f32,
        reason: PassReason,
    ) -> Self {
        Self {
            page_number,
            geometry,
            desired_height,
            outcome: PlanOutcome::PassThrough { reason },
            rects: vec![SubPageRect::full_page(geometry)],
            rejected: Vec::new(),
        }
    }

    /// Whether the page is emitted unchanged.
    pub fn is_pass_through(&self) -> bool {
        matches!(self.outcome, PlanOutcome::PassThrough { .. })
    }

    /// The split plan, if the page was split.
    pub fn split_plan(&self) -> Option<&SplitPlan> {
        match &self.outcome {
            PlanOutcome::Split { plan } => Some(plan),
            PlanOutcome::PassThrough { .. } => None,
        }
    }

    /// Total height of content dropped by the minimum-height filter.
    pub fn dropped_height(&self) -> f32 {
        self.rejected
            .iter()
            .filter(|r| r.reason == RectRejection::DegenerateSubPage)
            .map(|r| r.rect.height())
            .sum()
    }
}
