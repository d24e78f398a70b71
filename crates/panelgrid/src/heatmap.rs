//! Fixed-bin heatmap over gap-removed coordinates.
//!
//! Complements the per-panel sub-grid analysis with a uniform binning of a
//! fixed coordinate window. Clusters found on the binned map are traced back
//! to the points that produced them and reported in physical coordinates.

use nalgebra::DMatrix;

use crate::density::serialize_matrix;
use crate::error::AnalysisError;
use crate::layout::{Point, Rect};
use crate::regions::{label_components, Connectivity};

/// Binned point counts. Rows index y bins, columns index x bins.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Heatmap {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub bin_size: f64,
    #[serde(serialize_with = "serialize_matrix")]
    pub counts: DMatrix<f64>,
}

/// Bounding box and size of one heatmap component.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComponentBounds {
    pub component_id: u32,
    pub bounds: Rect,
    pub point_count: usize,
}

/// Upper bound on `nx * ny` for one heatmap.
pub const MAX_HEATMAP_BINS: usize = 1 << 24;

fn n_bins(range: (f64, f64), bin_size: f64) -> Option<usize> {
    let n = ((range.1 - range.0) / bin_size).ceil();
    if n.is_finite() && n <= MAX_HEATMAP_BINS as f64 {
        Some((n as usize).max(1))
    } else {
        None
    }
}

fn bin_of(value: f64, lo: f64, bin_size: f64, n: usize) -> usize {
    let k = ((value - lo) / bin_size).floor();
    if k <= 0.0 {
        0
    } else {
        (k as usize).min(n - 1)
    }
}

impl Heatmap {
    /// Bin `points` into `bin_size` squares covering `x_range × y_range`.
    ///
    /// Points outside the closed ranges or with a non-finite coordinate are
    /// ignored; a point on the upper edge lands in the last bin. Windows that
    /// would need more than [`MAX_HEATMAP_BINS`] bins are rejected.
    pub fn from_points(
        points: &[Point],
        x_range: (f64, f64),
        y_range: (f64, f64),
        bin_size: f64,
    ) -> Result<Self, AnalysisError> {
        let invalid = || AnalysisError::InvalidHeatmapRange {
            x_range,
            y_range,
            bin_size,
        };
        let ok = |r: (f64, f64)| r.0.is_finite() && r.1.is_finite() && r.1 > r.0;
        if !ok(x_range) || !ok(y_range) || !(bin_size.is_finite() && bin_size > 0.0) {
            return Err(invalid());
        }

        let (nx, ny) = n_bins(x_range, bin_size)
            .zip(n_bins(y_range, bin_size))
            .filter(|&(nx, ny)| nx.checked_mul(ny).is_some_and(|n| n <= MAX_HEATMAP_BINS))
            .ok_or_else(invalid)?;
        let mut counts = DMatrix::<f64>::zeros(ny, nx);
        let mut binned = 0usize;
        for p in points {
            if !p.x.is_finite() || !p.y.is_finite() {
                continue;
            }
            if p.x < x_range.0 || p.x > x_range.1 || p.y < y_range.0 || p.y > y_range.1 {
                continue;
            }
            let col = bin_of(p.x, x_range.0, bin_size, nx);
            let row = bin_of(p.y, y_range.0, bin_size, ny);
            counts[(row, col)] += 1.0;
            binned += 1;
        }
        tracing::debug!(
            "heatmap {}x{} bins, {} of {} points inside range",
            ny,
            nx,
            binned,
            points.len()
        );

        Ok(Self {
            x_range,
            y_range,
            bin_size,
            counts,
        })
    }

    pub fn n_bins_x(&self) -> usize {
        self.counts.ncols()
    }

    pub fn n_bins_y(&self) -> usize {
        self.counts.nrows()
    }

    pub fn total(&self) -> f64 {
        self.counts.sum()
    }

    /// `(row, col)` of the bin for a coordinate, clamped into the grid.
    pub fn bin_index(&self, x: f64, y: f64) -> (usize, usize) {
        (
            bin_of(y, self.y_range.0, self.bin_size, self.n_bins_y()),
            bin_of(x, self.x_range.0, self.bin_size, self.n_bins_x()),
        )
    }

    /// Subtract a uniform background of `rate` defects per unit area.
    pub fn subtract_uniform_noise(&mut self, rate: f64) -> Result<(), AnalysisError> {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(AnalysisError::InvalidNoiseRate { value: rate });
        }
        let per_bin = rate * self.bin_size * self.bin_size;
        self.counts.apply(|v| *v = (*v - per_bin).max(0.0));
        Ok(())
    }

    /// 4-connected components of bins with `count > threshold`. Bins that
    /// touch only at a corner stay separate.
    pub fn label(&self, threshold: f64) -> (DMatrix<u32>, u32) {
        label_components(&self.counts.map(|v| v > threshold), Connectivity::Four)
    }

    /// Component id of each point's bin (0 for background).
    pub fn map_points_to_components(&self, labels: &DMatrix<u32>, points: &[Point]) -> Vec<u32> {
        points
            .iter()
            .map(|p| labels[self.bin_index(p.x, p.y)])
            .collect()
    }
}

/// Per-component bounding boxes of `points`, paired index-wise with
/// `components`. Background (0) is skipped; output is sorted by id.
pub fn component_bounds(points: &[Point], components: &[u32]) -> Vec<ComponentBounds> {
    let mut out: Vec<ComponentBounds> = Vec::new();
    let mut pairs: Vec<(u32, &Point)> = components
        .iter()
        .copied()
        .zip(points)
        .filter(|(id, _)| *id > 0)
        .collect();
    pairs.sort_by_key(|(id, _)| *id);

    for (id, p) in pairs {
        let rect = Rect::new(p.x, p.x, p.y, p.y);
        match out.last_mut() {
            Some(last) if last.component_id == id => {
                last.bounds = last.bounds.union(&rect);
                last.point_count += 1;
            }
            _ => out.push(ComponentBounds {
                component_id: id,
                bounds: rect,
                point_count: 1,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bins_cover_the_closed_range() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(9.99, 0.0),
            Point::new(10.0, 0.0),
            Point::new(30.0, 20.0),
            Point::new(30.1, 0.0),
            Point::new(-0.1, 5.0),
        ];
        let h = Heatmap::from_points(&points, (0.0, 30.0), (0.0, 20.0), 10.0).unwrap();
        assert_eq!((h.n_bins_y(), h.n_bins_x()), (2, 3));
        assert_eq!(h.counts[(0, 0)], 2.0);
        assert_eq!(h.counts[(0, 1)], 1.0);
        assert_eq!(h.counts[(1, 2)], 1.0);
        assert_eq!(h.total(), 4.0);
    }

    #[test]
    fn partial_last_bin_is_kept() {
        let h = Heatmap::from_points(&[Point::new(25.0, 1.0)], (0.0, 25.0), (0.0, 5.0), 10.0)
            .unwrap();
        assert_eq!(h.n_bins_x(), 3);
        assert_eq!(h.n_bins_y(), 1);
        assert_eq!(h.counts[(0, 2)], 1.0);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(Heatmap::from_points(&[], (5.0, 5.0), (0.0, 1.0), 1.0).is_err());
        assert!(Heatmap::from_points(&[], (0.0, 1.0), (0.0, 1.0), 0.0).is_err());
        assert!(Heatmap::from_points(&[], (0.0, f64::NAN), (0.0, 1.0), 1.0).is_err());
    }

    #[test]
    fn oversized_bin_grid_is_rejected() {
        let err = Heatmap::from_points(&[], (-800.0, 800.0), (-600.0, 600.0), 1e-9).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidHeatmapRange { .. }));
        assert!(Heatmap::from_points(&[], (0.0, 1e300), (0.0, 1.0), 1e-300).is_err());
        assert!(Heatmap::from_points(&[], (0.0, 4096.0), (0.0, 4096.0), 1.0).is_ok());
        assert!(Heatmap::from_points(&[], (0.0, 4096.0), (0.0, 4097.0), 1.0).is_err());
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let points = vec![
            Point::new(f64::NAN, 5.0),
            Point::new(5.0, f64::NAN),
            Point::new(f64::INFINITY, 5.0),
            Point::new(5.0, 5.0),
        ];
        let h = Heatmap::from_points(&points, (0.0, 20.0), (0.0, 20.0), 10.0).unwrap();
        assert_eq!(h.total(), 1.0);
        assert_eq!(h.counts[(0, 0)], 1.0);
    }

    #[test]
    fn noise_subtraction_clamps_at_zero() {
        let points: Vec<Point> = (0..5).map(|_| Point::new(1.0, 1.0)).collect();
        let mut h = Heatmap::from_points(&points, (0.0, 20.0), (0.0, 10.0), 10.0).unwrap();
        h.subtract_uniform_noise(0.02).unwrap();
        assert_abs_diff_eq!(h.counts[(0, 0)], 3.0, epsilon = 1e-12);
        assert_eq!(h.counts[(0, 1)], 0.0);
        assert!(h.subtract_uniform_noise(-1.0).is_err());
    }

    #[test]
    fn points_map_to_their_cluster() {
        let mut points = Vec::new();
        for _ in 0..3 {
            points.push(Point::new(5.0, 5.0));
            points.push(Point::new(15.0, 15.0));
            points.push(Point::new(45.0, 5.0));
        }
        points.push(Point::new(25.0, 35.0));
        // outside the window: clamped to the corner bin
        points.push(Point::new(-50.0, -50.0));

        let h = Heatmap::from_points(&points, (0.0, 50.0), (0.0, 40.0), 10.0).unwrap();
        let (labels, n) = h.label(1.0);
        assert_eq!(n, 3);
        let ids = h.map_points_to_components(&labels, &points);
        // (0, 0) and (0, 4) are found before the diagonal bin (1, 1)
        assert_eq!(&ids[0..3], &[1, 3, 2]);
        assert_eq!(ids[9], 0);
        assert_eq!(ids[10], 1);
    }

    #[test]
    fn corner_touching_bins_stay_separate() {
        let mut points = Vec::new();
        for _ in 0..3 {
            points.push(Point::new(5.0, 5.0));
            points.push(Point::new(15.0, 15.0));
        }
        let h = Heatmap::from_points(&points, (0.0, 20.0), (0.0, 20.0), 10.0).unwrap();
        let (labels, n) = h.label(1.0);
        assert_eq!(n, 2);
        assert_eq!((labels[(0, 0)], labels[(1, 1)]), (1, 2));
        assert_eq!((labels[(0, 1)], labels[(1, 0)]), (0, 0));
    }

    #[test]
    fn bounds_aggregate_physical_coordinates() {
        let physical = vec![
            Point::new(100.0, 10.0),
            Point::new(130.0, 40.0),
            Point::new(5.0, 5.0),
            Point::new(120.0, 0.0),
        ];
        let bounds = component_bounds(&physical, &[2, 2, 0, 1]);
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0].component_id, 1);
        assert_eq!(bounds[0].point_count, 1);
        assert_eq!(bounds[1].component_id, 2);
        assert_eq!(bounds[1].point_count, 2);
        assert_eq!(bounds[1].bounds, Rect::new(100.0, 130.0, 10.0, 40.0));
        assert!(component_bounds(&physical, &[0, 0, 0, 0]).is_empty());
    }
}
