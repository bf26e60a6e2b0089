//! Turning cut offsets into sub-page rects.

use crate::model::{PageGeometry, RectRejection, RejectedRect, SplitPlan, SubPageRect};

/// Rects derived from a split plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedRects {
    /// Rects to emit, in increasing `top` order
    pub rects: Vec<SubPageRect>,
    /// Rects that were dropped
    pub rejected: Vec<RejectedRect>,
}

/// Check a rect against the page bounds and the minimum height.
pub fn validate_rect(
    rect: &SubPageRect,
    page_height: f32,
    min_height: f32,
) -> Result<(), RectRejection> {
    if !(0.0 <= rect.top && rect.top < rect.bottom && rect.bottom <= page_height) {
        return Err(RectRejection::InvalidGeometry);
    }
    if rect.height() <= min_height {
        return Err(RectRejection::DegenerateSubPage);
    }
    Ok(())
}

/// Pair consecutive cuts into rects and drop the ones that fail validation.
///
/// Dropping a short sub-page loses the content inside it. This favors fewer,
/// usable pages over completeness; callers can inspect `rejected` to see what
/// was left out.
pub fn derive_rects(plan: &SplitPlan, geometry: PageGeometry, min_height: f32) -> DerivedRects {
    let mut derived = DerivedRects::default();

    for (top, bottom) in plan.bands() {
        let rect = SubPageRect::new(top, bottom, geometry.width);
        match validate_rect(&rect, geometry.height, min_height) {
            Ok(()) => derived.rects.push(rect),
            Err(reason) => {
                match reason {
                    RectRejection::InvalidGeometry => log::warn!(
                        "Skipping invalid split: top={}, bottom={}, height={}",
                        top,
                        bottom,
                        geometry.height
                    ),
                    RectRejection::DegenerateSubPage => log::debug!(
                        "Dropping {:.1}pt sub-page at {:.1} (minimum {:.1})",
                        rect.height(),
                        top,
                        min_height
                    ),
                }
                derived.rejected.push(RejectedRect { rect, reason });
            }
        }
    }

    derived
}
