//! Whitespace gap search inside a window.

use crate::model::ContentInterval;

/// A free (uncovered) span of a search window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    /// Gap start
    pub start: f32,
    /// Gap end
    pub end: f32,
}

impl Gap {
    /// Gap length.
    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    /// Zero-length gap.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Gap midpoint.
    pub fn midpoint(&self) -> f32 {
        (self.start + self.end) / 2.0
    }
}

/// Clip intervals to `[min_y, max_y]` and merge them into sorted disjoint runs.
pub fn occupied_runs(
    intervals: &[ContentInterval],
    min_y: f32,
    max_y: f32,
) -> Vec<ContentInterval> {
    let mut clipped: Vec<ContentInterval> = intervals
        .iter()
        .filter(|i| i.y0.is_finite() && i.y1.is_finite())
        .filter_map(|i| i.clip(min_y, max_y))
        .collect();
    clipped.sort_by(|a, b| a.y0.total_cmp(&b.y0));

    let mut runs: Vec<ContentInterval> = Vec::with_capacity(clipped.len());
    for interval in clipped {
        match runs.last_mut() {
            Some(last) if interval.y0 <= last.y1 => {
                last.y1 = last.y1.max(interval.y1);
            }
            _ => runs.push(interval),
        }
    }
    runs
}

/// Free gaps of `[min_y, max_y]` in increasing order.
pub fn free_gaps(intervals: &[ContentInterval], min_y: f32, max_y: f32) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut last_end = min_y;
    for run in occupied_runs(intervals, min_y, max_y) {
        if run.y0 > last_end {
            gaps.push(Gap {
                start: last_end,
                end: run.y0,
            });
        }
        last_end = last_end.max(run.y1);
    }
    if last_end < max_y {
        gaps.push(Gap {
            start: last_end,
            end: max_y,
        });
    }
    gaps
}

/// The longest non-empty gap; the first one wins ties.
pub fn longest_gap(gaps: &[Gap]) -> Option<Gap> {
    let mut best: Option<Gap> = None;
    let mut best_len = 0.0;
    for gap in gaps {
        if gap.len() > best_len {
            best_len = gap.len();
            best = Some(*gap);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(y0: f32, y1: f32) -> ContentInterval {
        ContentInterval::new(y0, y1)
    }

    #[test]
    fn test_empty_window_is_one_gap() {
        let gaps = free_gaps(&[], 180.0, 220.0);
        assert_eq!(
            gaps,
            vec![Gap {
                start: 180.0,
                end: 220.0
            }]
        );
    }

    #[test]
    fn test_overlapping_and_duplicate_intervals_merge() {
        let intervals = [
            iv(190.0, 200.0),
            iv(100.0, 185.0),
            iv(195.0, 205.0),
            iv(190.0, 200.0),
        ];
        let runs = occupied_runs(&intervals, 180.0, 220.0);
        assert_eq!(runs, vec![iv(180.0, 185.0), iv(190.0, 205.0)]);

        let gaps = free_gaps(&intervals, 180.0, 220.0);
        assert_eq!(
            gaps,
            vec![
                Gap {
                    start: 185.0,
                    end: 190.0
                },
                Gap {
                    start: 205.0,
                    end: 220.0
                },
            ]
        );
    }

    #[test]
    fn test_touching_intervals_leave_no_gap() {
        let gaps = free_gaps(&[iv(180.0, 200.0), iv(200.0, 220.0)], 180.0, 220.0);
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_fully_covered_window_has_no_gap() {
        assert!(free_gaps(&[iv(0.0, 1000.0)], 180.0, 220.0).is_empty());
    }

    #[test]
    fn test_non_finite_intervals_are_ignored() {
        let gaps = free_gaps(&[iv(f32::NAN, 200.0)], 180.0, 220.0);
        assert_eq!(gaps.len(), 1);
    }

    #[test]
    fn test_longest_gap_first_wins_ties() {
        let gaps = [
            Gap {
                start: 180.0,
                end: 190.0,
            },
            Gap {
                start: 200.0,
                end: 210.0,
            },
        ];
        assert_eq!(longest_gap(&gaps), Some(gaps[0]));
    }

    #[test]
    fn test_longest_gap_ignores_empty() {
        let gaps = [Gap {
            start: 200.0,
            end: 200.0,
        }];
        assert_eq!(longest_gap(&gaps), None);
        assert_eq!(longest_gap(&[]), None);
    }
}
