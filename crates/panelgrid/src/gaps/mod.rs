//! Per-axis gap detection between panel extents.
//!
//! Each axis is reduced to the sorted set of distinct `(min, max)` panel
//! extents. Walking that list in order, any positive spacing between an
//! interval's start and the previous interval's end (beyond
//! [`GAP_TOLERANCE`]) is accumulated into a running shift. Subtracting the
//! shift of the interval a coordinate falls in removes every physical gap
//! before it.

mod normalize;

pub use normalize::{remove_gaps, remove_gaps_from_panels};

use crate::error::Axis;
use crate::layout::{Panel, Rect};

/// Spacing at or below this is treated as touching panels, not a gap.
pub const GAP_TOLERANCE: f64 = 1e-3;

/// A distinct occupied extent along one axis.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

/// One row of a shift table.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShiftEntry {
    pub interval_min: f64,
    pub interval_max: f64,
    /// Total gap width to the left of (or below) this interval.
    pub cumulative_shift: f64,
}

/// Ordered shift lookup for one axis.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ShiftTable {
    entries: Vec<ShiftEntry>,
}

impl ShiftTable {
    /// Build from intervals already sorted by `min`.
    pub fn from_sorted_intervals(intervals: &[Interval]) -> Self {
        let mut entries = Vec::with_capacity(intervals.len());
        let mut shift = 0.0;
        let mut previous_max: Option<f64> = None;
        for iv in intervals {
            if let Some(prev) = previous_max {
                let gap = iv.min - prev;
                if gap > GAP_TOLERANCE {
                    shift += gap;
                }
            }
            entries.push(ShiftEntry {
                interval_min: iv.min,
                interval_max: iv.max,
                cumulative_shift: shift,
            });
            previous_max = Some(iv.max);
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[ShiftEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the greatest `interval_min <= value`.
    ///
    /// The matched interval's `max` is not checked: values past the last
    /// known interval still resolve to it.
    pub fn lookup(&self, value: f64) -> Option<&ShiftEntry> {
        preceding_index(&self.entries, value, |e| e.interval_min).map(|i| &self.entries[i])
    }

    /// Shift to subtract at `value`; zero before the first interval.
    pub fn shift_at(&self, value: f64) -> f64 {
        self.lookup(value).map_or(0.0, |e| e.cumulative_shift)
    }

    /// Sum of all gaps along this axis.
    pub fn total_shift(&self) -> f64 {
        self.entries.last().map_or(0.0, |e| e.cumulative_shift)
    }
}

/// Shift tables for both axes.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShiftMaps {
    pub x: ShiftTable,
    pub y: ShiftTable,
}

impl ShiftMaps {
    /// Shift table for one axis.
    pub fn axis(&self, axis: Axis) -> &ShiftTable {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Map a physical coordinate pair to gap-removed space.
    pub fn normalize(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.x.shift_at(x), y - self.y.shift_at(y))
    }
}

/// Sorted distinct `(min, max)` extents of `rects` along `axis`.
pub fn axis_intervals<'a>(rects: impl IntoIterator<Item = &'a Rect>, axis: Axis) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = rects
        .into_iter()
        .map(|r| {
            let (min, max) = r.extent(axis);
            Interval { min, max }
        })
        .collect();
    intervals.sort_by(|a, b| a.min.total_cmp(&b.min).then(a.max.total_cmp(&b.max)));
    intervals.dedup();
    intervals
}

/// Build the per-axis shift tables for a panel set.
///
/// Empty input yields empty tables.
pub fn find_gaps(panels: &[Panel]) -> ShiftMaps {
    let maps = ShiftMaps {
        x: ShiftTable::from_sorted_intervals(&axis_intervals(
            panels.iter().map(|p| &p.bounds),
            Axis::X,
        )),
        y: ShiftTable::from_sorted_intervals(&axis_intervals(
            panels.iter().map(|p| &p.bounds),
            Axis::Y,
        )),
    };
    tracing::debug!(
        "gap scan: {} x intervals (total shift {:.3}), {} y intervals (total shift {:.3})",
        maps.x.len(),
        maps.x.total_shift(),
        maps.y.len(),
        maps.y.total_shift(),
    );
    maps
}

/// Index of the last item whose key is `<= value`.
pub(crate) fn preceding_index<T>(items: &[T], value: f64, key: impl Fn(&T) -> f64) -> Option<usize> {
    let n = items.partition_point(|item| key(item) <= value);
    n.checked_sub(1)
}
