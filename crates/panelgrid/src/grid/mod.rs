//! Sub-grid generation over the panel arrangement.
//!
//! Every panel is split into `n_split_x × n_split_y` equal cells. A cell
//! keeps its physical geometry (used for counting) and its gap-removed
//! center (used for drawing the cleaned map), together with a global
//! `(row, col)` index into the arrangement-wide density matrix.

mod labels;

pub use labels::{cell_label, column_letters, panel_label, sub_grid_id};

use std::collections::HashMap;

use crate::error::{AnalysisError, Axis};
use crate::gaps::{remove_gaps, ShiftMaps};
use crate::layout::{PanelLayout, Point, Rect};

/// Per-panel split factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridSplit {
    pub n_split_x: usize,
    pub n_split_y: usize,
}

impl GridSplit {
    /// Validated split factors.
    pub fn new(n_split_x: usize, n_split_y: usize) -> Result<Self, AnalysisError> {
        if n_split_x == 0 {
            return Err(AnalysisError::InvalidSplit {
                axis: Axis::X,
                value: n_split_x,
            });
        }
        if n_split_y == 0 {
            return Err(AnalysisError::InvalidSplit {
                axis: Axis::Y,
                value: n_split_y,
            });
        }
        Ok(Self {
            n_split_x,
            n_split_y,
        })
    }

    pub fn cells_per_panel(&self) -> usize {
        self.n_split_x * self.n_split_y
    }
}

/// One sub-cell of a panel.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridCell {
    /// Center in physical coordinates.
    pub physical_center: [f64; 2],
    /// Lower-left corner in physical coordinates.
    pub physical_min: [f64; 2],
    /// Upper-right corner in physical coordinates; equals the next cell's `physical_min`.
    pub physical_max: [f64; 2],
    /// Center in gap-removed coordinates.
    pub clean_center: [f64; 2],
    pub width: f64,
    pub height: f64,
    pub panel_id: String,
    pub sub_grid_id: String,
    pub global_row: usize,
    pub global_col: usize,
}

impl GridCell {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Half-open membership in physical space: `[min, max)` per axis.
    pub fn contains_physical(&self, x: f64, y: f64) -> bool {
        let ([min_x, min_y], [max_x, max_y]) = (self.physical_min, self.physical_max);
        x >= min_x && x < max_x && y >= min_y && y < max_y
    }

    pub fn physical_rect(&self) -> Rect {
        let ([min_x, min_y], [max_x, max_y]) = (self.physical_min, self.physical_max);
        Rect::new(min_x, max_x, min_y, max_y)
    }

    /// Cell rectangle centered on the gap-removed center.
    pub fn clean_rect(&self) -> Rect {
        let [cx, cy] = self.clean_center;
        let (hw, hh) = (0.5 * self.width, 0.5 * self.height);
        Rect::new(cx - hw, cx + hw, cy - hh, cy + hh)
    }
}

/// Matrix shape `(rows, cols)` implied by a layout and split.
pub fn grid_shape(layout: &PanelLayout, split: GridSplit) -> (usize, usize) {
    (
        layout.n_rows() * split.n_split_y,
        layout.n_cols() * split.n_split_x,
    )
}

/// Split every panel of `layout` into sub-cells.
///
/// Panels are visited in sequence order; within a panel, cells are emitted
/// column-major (`i` outer, `j` inner). Gap-removed centers are computed in
/// one batch and joined back by `sub_grid_id`.
pub fn generate_grid_cells(
    split: GridSplit,
    shifts: &ShiftMaps,
    layout: &PanelLayout,
) -> Result<Vec<GridCell>, AnalysisError> {
    let mut cells: Vec<GridCell> = Vec::with_capacity(layout.n_panels() * split.cells_per_panel());
    for placed in layout.panels() {
        let bounds = placed.panel.bounds;
        let label = panel_label(placed.sequence_no, layout.n_cols());
        let step_x = bounds.width() / split.n_split_x as f64;
        let step_y = bounds.height() / split.n_split_y as f64;

        for i in 0..split.n_split_x {
            for j in 0..split.n_split_y {
                let min_x = bounds.min_x + i as f64 * step_x;
                let min_y = bounds.min_y + j as f64 * step_y;
                let max_x = bounds.min_x + (i + 1) as f64 * step_x;
                let max_y = bounds.min_y + (j + 1) as f64 * step_y;
                cells.push(GridCell {
                    physical_center: [min_x + 0.5 * step_x, min_y + 0.5 * step_y],
                    physical_min: [min_x, min_y],
                    physical_max: [max_x, max_y],
                    clean_center: [0.0, 0.0],
                    width: step_x,
                    height: step_y,
                    panel_id: placed.panel.id.clone(),
                    sub_grid_id: sub_grid_id(&label, j, i),
                    global_row: placed.row * split.n_split_y + j,
                    global_col: placed.col * split.n_split_x + i,
                });
            }
        }
    }

    let centers: Vec<Point> = cells
        .iter()
        .map(|c| Point::new(c.physical_center[0], c.physical_center[1]))
        .collect();
    let clean = remove_gaps(&centers, shifts);

    let mut clean_by_id: HashMap<&str, [f64; 2]> = HashMap::with_capacity(cells.len());
    for (cell, p) in cells.iter().zip(&clean) {
        if clean_by_id
            .insert(cell.sub_grid_id.as_str(), [p.x, p.y])
            .is_some()
        {
            return Err(AnalysisError::DuplicateCellId {
                sub_grid_id: cell.sub_grid_id.clone(),
            });
        }
    }
    let clean_centers: Vec<[f64; 2]> = cells
        .iter()
        .map(|c| clean_by_id[c.sub_grid_id.as_str()])
        .collect();
    for (cell, center) in cells.iter_mut().zip(clean_centers) {
        cell.clean_center = center;
    }

    tracing::info!(
        "{} grid cells from {} panels ({}x{} split)",
        cells.len(),
        layout.n_panels(),
        split.n_split_x,
        split.n_split_y
    );
    Ok(cells)
}
