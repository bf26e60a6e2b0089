//! Grouping text runs into lines and blocks.

use crate::model::ContentInterval;

/// A text run in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFragment {
    /// Top of the glyph boxes
    pub top: f32,
    /// Bottom of the glyph boxes
    pub bottom: f32,
    /// Baseline offset
    pub baseline: f32,
    /// Font size
    pub size: f32,
}

/// A text line: fragments sharing a baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLine {
    /// Top of the line
    pub top: f32,
    /// Bottom of the line
    pub bottom: f32,
    /// Baseline of the first fragment
    pub baseline: f32,
    /// Largest font size on the line
    pub size: f32,
}

impl TextLine {
    fn from_fragment(fragment: &TextFragment) -> Self {
        Self {
            top: fragment.top,
            bottom: fragment.bottom,
            baseline: fragment.baseline,
            size: fragment.size,
        }
    }

    fn absorb(&mut self, fragment: &TextFragment) {
        self.top = self.top.min(fragment.top);
        self.bottom = self.bottom.max(fragment.bottom);
        self.size = self.size.max(fragment.size);
    }

    /// Vertical extent of the line.
    pub fn interval(&self) -> ContentInterval {
        ContentInterval::new(self.top, self.bottom)
    }
}

/// Group fragments whose baselines lie within 30% of the font size.
pub fn group_into_lines(mut fragments: Vec<TextFragment>) -> Vec<TextLine> {
    fragments.retain(|f| f.top.is_finite() && f.bottom.is_finite() && f.baseline.is_finite());
    fragments.sort_by(|a, b| a.baseline.total_cmp(&b.baseline));

    let mut lines: Vec<TextLine> = Vec::new();
    for fragment in &fragments {
        let y_tolerance = fragment.size * 0.3;
        match lines.last_mut() {
            Some(line) if (fragment.baseline - line.baseline).abs() <= y_tolerance => {
                line.absorb(fragment);
            }
            _ => lines.push(TextLine::from_fragment(fragment)),
        }
    }
    lines
}

/// Average distance between consecutive baselines.
fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[1].baseline - w[0].baseline).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Merge lines into paragraph blocks.
///
/// A new block starts when the baseline spacing exceeds `gap_ratio` times
/// the average spacing, or the font size changes by more than a point.
pub fn group_into_blocks(lines: &[TextLine], gap_ratio: f32) -> Vec<ContentInterval> {
    let avg_spacing = average_line_spacing(lines);

    let mut blocks: Vec<ContentInterval> = Vec::new();
    let mut prev: Option<&TextLine> = None;
    for line in lines {
        let joins = prev.is_some_and(|p| {
            let spacing = (line.baseline - p.baseline).abs();
            spacing <= avg_spacing * gap_ratio && (line.size - p.size).abs() <= 1.0
        });
        match blocks.last_mut() {
            Some(block) if joins => {
                block.y0 = block.y0.min(line.top);
                block.y1 = block.y1.max(line.bottom);
            }
            _ => blocks.push(line.interval()),
        }
        prev = Some(line);
    }
    blocks
}
