//! Panel membership test for defect points.
//!
//! The default [`PointFilterMode::PerAxis`] check accepts a point when its x
//! lies inside some panel column extent and its y inside some panel row
//! extent. This is exact for a fully populated rectangular arrangement. In a
//! sparse layout a point can pass both checks while sitting in an empty
//! `(row, col)` slot; [`PointFilterMode::PanelRectangles`] tests actual
//! per-panel containment instead.

use crate::error::Axis;
use crate::gaps::{axis_intervals, preceding_index, Interval};
use crate::layout::{Panel, Point};

/// How point validity is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointFilterMode {
    /// Independent per-axis interval checks.
    #[default]
    PerAxis,
    /// Containment in at least one panel rectangle (borders included).
    PanelRectangles,
}

/// Valid points plus the number of rejected ones.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FilterOutcome {
    pub valid: Vec<Point>,
    pub n_outliers: usize,
}

/// Keep the points that fall on some panel.
///
/// Accepted points are returned unchanged and in input order.
pub fn filter_valid_points(points: &[Point], panels: &[Panel], mode: PointFilterMode) -> FilterOutcome {
    let valid: Vec<Point> = match mode {
        PointFilterMode::PerAxis => {
            let xs = axis_intervals(panels.iter().map(|p| &p.bounds), Axis::X);
            let ys = axis_intervals(panels.iter().map(|p| &p.bounds), Axis::Y);
            points
                .iter()
                .filter(|p| within_preceding(&xs, p.x) && within_preceding(&ys, p.y))
                .cloned()
                .collect()
        }
        PointFilterMode::PanelRectangles => points
            .iter()
            .filter(|p| panels.iter().any(|panel| panel.bounds.contains(p.x, p.y)))
            .cloned()
            .collect(),
    };
    let n_outliers = points.len() - valid.len();
    tracing::info!(
        "point filter ({:?}): kept {} of {} points, {} outliers",
        mode,
        valid.len(),
        points.len(),
        n_outliers
    );
    FilterOutcome { valid, n_outliers }
}

fn within_preceding(intervals: &[Interval], value: f64) -> bool {
    preceding_index(intervals, value, |iv| iv.min).is_some_and(|i| value <= intervals[i].max)
}
