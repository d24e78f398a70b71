//! Shared builders for synthetic panel arrangements.

use rand::prelude::*;

use crate::layout::{Panel, Point, Rect};

/// Row-major `n_cols × n_rows` arrangement of `w × h` panels starting at the
/// origin, separated by `gap_x` / `gap_y`. Ids are `Panel_{seq}` with
/// 1-based sequence numbers.
pub(crate) fn synthetic_panels(
    n_cols: usize,
    n_rows: usize,
    w: f64,
    h: f64,
    gap_x: f64,
    gap_y: f64,
) -> Vec<Panel> {
    let mut panels = Vec::with_capacity(n_cols * n_rows);
    for r in 0..n_rows {
        for c in 0..n_cols {
            let seq = (r * n_cols + c + 1) as u32;
            let min_x = c as f64 * (w + gap_x);
            let min_y = r as f64 * (h + gap_y);
            panels.push(Panel::new(
                format!("Panel_{}", seq),
                Some(seq),
                Rect::new(min_x, min_x + w, min_y, min_y + h),
            ));
        }
    }
    panels
}

/// `n` points uniformly spread over randomly chosen panels, each strictly
/// below its panel's max edges.
pub(crate) fn scatter_points(panels: &[Panel], n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let b = panels[rng.gen_range(0..panels.len())].bounds;
            Point::new(
                rng.gen_range(b.min_x..b.max_x),
                rng.gen_range(b.min_y..b.max_y),
            )
        })
        .collect()
}
