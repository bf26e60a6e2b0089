//! Content-aware split-position planner.
//!
//! Given a page height, a desired sub-page height and the vertical intervals
//! occupied by content, the planner walks down the page and picks each cut
//! inside a window around `current + desired`. Within the window it cuts at
//! the middle of the longest whitespace gap; if the window is fully covered it
//! cuts at the target offset itself.
//!
//! # Example
//!
//! ```
//! use repage::model::ContentInterval;
//! use repage::planner::plan_splits;
//!
//! let content = [ContentInterval::new(100.0, 190.0)];
//! let plan = plan_splits(400.0, 200.0, &content);
//! assert_eq!(plan.cuts, vec![0.0, 205.0, 400.0]);
//! ```

mod gaps;
mod rects;

pub use gaps::{free_gaps, longest_gap, occupied_runs, Gap};
pub use rects::{derive_rects, validate_rect, DerivedRects};

use crate::model::{ContentInterval, SplitPlan};
use crate::options::DEFAULT_TOLERANCE;

/// Cuts closer than this are merged when the plan is finalized.
pub const CUT_EPSILON: f32 = 1e-3;

/// One planner step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Step {
    /// Cut at `offset`; `forced` when it does not sit in whitespace
    Cut { offset: f32, forced: bool },
    /// The rest of the page fits in one sub-page
    Final,
}

/// Split-position planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planner {
    tolerance: f32,
}

impl Planner {
    /// Create a planner with a tolerance fraction in `[0, 1)`.
    pub fn new(tolerance: f32) -> Self {
        let tolerance = if tolerance.is_finite() {
            tolerance.clamp(0.0, 0.99)
        } else {
            DEFAULT_TOLERANCE
        };
        Self { tolerance }
    }

    /// The tolerance fraction.
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Upper bound on loop iterations for a page.
    ///
    /// Every non-final step advances by at least `(1 - tolerance) * desired`.
    pub fn iteration_bound(&self, height: f32, desired_height: f32) -> usize {
        let min_advance = (1.0 - self.tolerance) * desired_height;
        ((height / min_advance).ceil() as usize).saturating_add(1)
    }

    /// Compute cut offsets for a page.
    ///
    /// The result starts at 0 and ends at `height`. A non-positive or
    /// non-finite desired height yields the single band `[0, height]`. A page
    /// height that is not a positive finite number yields no bands at all.
    pub fn plan(&self, height: f32, desired_height: f32, intervals: &[ContentInterval]) -> SplitPlan {
        if !(height.is_finite() && height > 0.0) {
            log::warn!("Not planning page with height={}", height);
            return SplitPlan::empty();
        }
        if !(desired_height.is_finite() && desired_height > 0.0) {
            log::warn!(
                "Not planning page with height={} desired={}",
                height,
                desired_height
            );
            return SplitPlan::whole(height);
        }

        let max_iterations = self.iteration_bound(height, desired_height);
        let mut cuts = vec![0.0];
        let mut forced_cuts = 0;
        let mut iterations = 0;
        let mut current = 0.0_f32;

        while current < height {
            if iterations >= max_iterations {
                log::warn!(
                    "Planner hit its iteration cap ({}) at y={}; closing page",
                    max_iterations,
                    current
                );
                cuts.push(height);
                break;
            }
            iterations += 1;

            match self.step(current, height, desired_height, intervals) {
                Step::Final => {
                    cuts.push(height);
                    break;
                }
                Step::Cut { offset, forced } => {
                    log::debug!(
                        "Cut at {:.2} ({})",
                        offset,
                        if forced { "forced" } else { "whitespace" }
                    );
                    if forced {
                        forced_cuts += 1;
                    }
                    cuts.push(offset);
                    current = offset;
                }
            }
        }

        SplitPlan {
            cuts: finalize_cuts(cuts, height),
            forced_cuts,
            iterations,
        }
    }

    /// Choose the next cut after `current`.
    pub(crate) fn step(
        &self,
        current: f32,
        height: f32,
        desired_height: f32,
        intervals: &[ContentInterval],
    ) -> Step {
        let target = (current + desired_height).min(height);
        if target >= height || target <= current {
            return Step::Final;
        }

        let tolerance = self.tolerance * desired_height;
        let min_y = current.max(target - tolerance);
        let max_y = height.min(target + tolerance);

        let gaps = free_gaps(intervals, min_y, max_y);
        let (mut offset, mut forced) = match longest_gap(&gaps) {
            Some(gap) => (gap.midpoint(), false),
            None => (target, true),
        };

        if offset > height {
            offset = height;
        }
        if offset <= current {
            log::debug!(
                "Gap midpoint {} does not advance past {}; cutting at target {}",
                offset,
                current,
                target
            );
            offset = target;
            forced = true;
        }

        Step::Cut { offset, forced }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

/// Plan cuts with the default tolerance.
pub fn plan_splits(height: f32, desired_height: f32, intervals: &[ContentInterval]) -> SplitPlan {
    Planner::default().plan(height, desired_height, intervals)
}

/// Sort, merge near-equal cuts and pin the ends to `0` and `height`.
fn finalize_cuts(mut cuts: Vec<f32>, height: f32) -> Vec<f32> {
    cuts.sort_by(|a, b| a.total_cmp(b));
    cuts.dedup_by(|a, b| (*a - *b).abs() <= CUT_EPSILON);

    if let Some(first) = cuts.first_mut() {
        *first = 0.0;
    }
    if cuts.len() > 1 {
        if let Some(last) = cuts.last_mut() {
            *last = height;
        }
    } else {
        cuts.push(height);
    }
    cuts
}
