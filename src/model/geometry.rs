//! Page geometry types.
//!
//! All planner-facing coordinates are top-down: `y = 0` is the top edge of the
//! page box and `y` grows toward the bottom edge. PDF user space is bottom-up;
//! [`PageBox`] is the only type that speaks it.

use serde::{Deserialize, Serialize};

/// Width and height of a page in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
}

impl PageGeometry {
    /// Create a new geometry.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Target sub-page height for a height/width aspect ratio.
    pub fn desired_height(&self, aspect_ratio: f32) -> f32 {
        self.width * aspect_ratio
    }
}

/// Vertical extent `[y0, y1]` of one content element, top-down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentInterval {
    /// Top edge
    pub y0: f32,
    /// Bottom edge
    pub y1: f32,
}

impl ContentInterval {
    /// Create an interval, swapping the bounds if they are reversed.
    pub fn new(a: f32, b: f32) -> Self {
        if a <= b {
            Self { y0: a, y1: b }
        } else {
            Self { y0: b, y1: a }
        }
    }

    /// Interval height.
    pub fn len(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Zero-height interval.
    pub fn is_empty(&self) -> bool {
        self.y1 <= self.y0
    }

    /// Clip to `[min_y, max_y]`. Returns `None` when the interval lies
    /// entirely outside or only touches the window edge.
    pub fn clip(&self, min_y: f32, max_y: f32) -> Option<Self> {
        if self.y1 <= min_y || self.y0 >= max_y {
            return None;
        }
        Some(Self {
            y0: self.y0.max(min_y),
            y1: self.y1.min(max_y),
        })
    }
}

/// A horizontal band of a source page, in top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubPageRect {
    /// Top offset
    pub top: f32,
    /// Bottom offset
    pub bottom: f32,
    /// Band width (always the full page width)
    pub width: f32,
}

impl SubPageRect {
    /// Create a new rect.
    pub fn new(top: f32, bottom: f32, width: f32) -> Self {
        Self { top, bottom, width }
    }

    /// Rect covering a whole page.
    pub fn full_page(geometry: PageGeometry) -> Self {
        Self::new(0.0, geometry.height, geometry.width)
    }

    /// Band height.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// A PDF rectangle in bottom-up user space (`[x0 y0 x1 y1]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    /// Left
    pub x0: f32,
    /// Bottom
    pub y0: f32,
    /// Right
    pub x1: f32,
    /// Top
    pub y1: f32,
}

impl PageBox {
    /// Create a box, normalizing the corners so that `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// US Letter, the fallback when a page declares no usable box.
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, 612.0, 792.0)
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Geometry of this box.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.width(), self.height())
    }

    /// Convert a user-space `y` to a top-down offset inside this box.
    pub fn to_top_down(&self, y: f32) -> f32 {
        self.y1 - y
    }

    /// The user-space box covered by a top-down band of this box.
    pub fn band(&self, rect: &SubPageRect) -> PageBox {
        PageBox::new(self.x0, self.y1 - rect.bottom, self.x1, self.y1 - rect.top)
    }

    /// Encode as a PDF array.
    pub fn to_object(&self) -> lopdf::Object {
        lopdf::Object::Array(vec![
            lopdf::Object::Real(self.x0),
            lopdf::Object::Real(self.y0),
            lopdf::Object::Real(self.x1),
            lopdf::Object::Real(self.y1),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_normalizes_bounds() {
        let interval = ContentInterval::new(150.0, 100.0);
        assert_eq!(interval.y0, 100.0);
        assert_eq!(interval.y1, 150.0);
        assert_eq!(interval.len(), 50.0);
    }

    #[test]
    fn test_interval_clip() {
        let interval = ContentInterval::new(100.0, 190.0);
        assert_eq!(
            interval.clip(180.0, 220.0),
            Some(ContentInterval::new(180.0, 190.0))
        );
        assert_eq!(interval.clip(190.0, 220.0), None);
        assert_eq!(interval.clip(0.0, 100.0), None);
        assert_eq!(
            interval.clip(0.0, 500.0),
            Some(ContentInterval::new(100.0, 190.0))
        );
    }

    #[test]
    fn test_desired_height() {
        let geometry = PageGeometry::new(210.0, 1000.0);
        assert!((geometry.desired_height(297.0 / 210.0) - 297.0).abs() < 1e-3);
    }

    #[test]
    fn test_geometry_validity() {
        assert!(PageGeometry::new(100.0, 200.0).is_valid());
        assert!(!PageGeometry::new(0.0, 200.0).is_valid());
        assert!(!PageGeometry::new(100.0, f32::NAN).is_valid());
    }

    #[test]
    fn test_page_box_band() {
        let page_box = PageBox::new(0.0, 100.0, 600.0, 1100.0);
        let band = page_box.band(&SubPageRect::new(200.0, 500.0, 600.0));
        assert_eq!(band, PageBox::new(0.0, 600.0, 600.0, 900.0));
        assert_eq!(page_box.to_top_down(1100.0), 0.0);
        assert_eq!(page_box.to_top_down(100.0), 1000.0);
    }
}
