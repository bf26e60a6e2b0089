//! Document model types for repage.

mod geometry;
mod plan;

pub use geometry::{ContentInterval, PageBox, PageGeometry, SubPageRect};
pub use plan::{PagePlan, PassReason, PlanOutcome, RectRejection, RejectedRect, SplitPlan};
