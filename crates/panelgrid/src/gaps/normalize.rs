use super::ShiftMaps;
use crate::layout::{Panel, Point, Rect};

/// Map points to gap-removed coordinates.
///
/// Row count, row order and tags are preserved; only `x` and `y` change.
pub fn remove_gaps(points: &[Point], shifts: &ShiftMaps) -> Vec<Point> {
    points
        .iter()
        .map(|p| {
            let (x, y) = shifts.normalize(p.x, p.y);
            p.moved_to(x, y)
        })
        .collect()
}

/// Map panel rectangles (both corners) to gap-removed coordinates.
pub fn remove_gaps_from_panels(panels: &[Panel], shifts: &ShiftMaps) -> Vec<Panel> {
    panels
        .iter()
        .map(|p| {
            let (min_x, min_y) = shifts.normalize(p.bounds.min_x, p.bounds.min_y);
            let (max_x, max_y) = shifts.normalize(p.bounds.max_x, p.bounds.max_y);
            Panel {
                bounds: Rect::new(min_x, max_x, min_y, max_y),
                ..p.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaps::find_gaps;
    use crate::test_utils::synthetic_panels;
    use approx::assert_relative_eq;

    #[test]
    fn tags_and_order_survive_normalization() {
        let panels = synthetic_panels(2, 1, 100.0, 100.0, 10.0, 0.0);
        let shifts = find_gaps(&panels);
        let mut tagged = Point::new(150.0, 20.0);
        tagged.defect_type = Some("scratch".to_string());
        tagged.product_id = Some("PROD_A".to_string());
        let points = vec![tagged.clone(), Point::new(50.0, 30.0)];

        let out = remove_gaps(&points, &shifts);
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0].x, 140.0);
        assert_relative_eq!(out[0].y, 20.0);
        assert_eq!(out[0].defect_type, tagged.defect_type);
        assert_eq!(out[0].product_id, tagged.product_id);
        assert_relative_eq!(out[1].x, 50.0);
    }

    #[test]
    fn axis_order_does_not_matter() {
        let panels = synthetic_panels(3, 3, 40.0, 30.0, 7.0, 3.0);
        let shifts = find_gaps(&panels);
        let p = Point::new(101.0, 70.0);
        let x_first = p.x - shifts.x.shift_at(p.x);
        let y_first = p.y - shifts.y.shift_at(p.y);
        let both = remove_gaps(&[p], &shifts);
        assert_relative_eq!(both[0].x, x_first);
        assert_relative_eq!(both[0].y, y_first);
    }

    #[test]
    fn gap_removed_panels_span_sum_of_extents() {
        for (gap_x, gap_y) in [(10.0, 20.0), (0.5, 75.0), (250.0, 3.0)] {
            let panels = synthetic_panels(3, 2, 100.0, 50.0, gap_x, gap_y);
            let shifts = find_gaps(&panels);
            let clean = remove_gaps_from_panels(&panels, &shifts);

            let max_x = clean.iter().map(|p| p.bounds.max_x).fold(f64::MIN, f64::max);
            let max_y = clean.iter().map(|p| p.bounds.max_y).fold(f64::MIN, f64::max);
            assert_relative_eq!(max_x, 300.0, epsilon = 1e-9);
            assert_relative_eq!(max_y, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn gap_removal_is_idempotent() {
        let panels = synthetic_panels(4, 3, 25.0, 60.0, 5.0, 12.5);
        let clean = remove_gaps_from_panels(&panels, &find_gaps(&panels));
        let again = find_gaps(&clean);
        assert!(again.x.entries().iter().all(|e| e.cumulative_shift == 0.0));
        assert!(again.y.entries().iter().all(|e| e.cumulative_shift == 0.0));
    }
}
