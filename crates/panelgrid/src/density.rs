//! Per-cell defect counts, background-noise removal and the density matrix.

use nalgebra::DMatrix;

use crate::grid::GridCell;
use crate::layout::Point;

/// Cleaned counts indexed by `(global_row, global_col)`.
pub type DensityMatrix = DMatrix<u32>;

/// Count record for one grid cell.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellCount {
    pub sub_grid_id: String,
    pub global_row: usize,
    pub global_col: usize,
    /// Cell area in physical units.
    pub area: f64,
    pub raw_count: u32,
    /// Background defects expected in this cell.
    pub expected_noise: f64,
    pub cleaned_count: u32,
}

impl CellCount {
    /// Recompute the cleaned count for a background rate (defects per unit area).
    pub fn with_noise_rate(mut self, rate: f64) -> Self {
        self.expected_noise = self.area * rate;
        self.cleaned_count = cleaned_count(self.raw_count, self.expected_noise);
        self
    }
}

/// `round(max(0, raw - expected))`, rounding halves to even.
pub fn cleaned_count(raw: u32, expected_noise: f64) -> u32 {
    let v = (raw as f64 - expected_noise).max(0.0);
    v.round_ties_even() as u32
}

/// Count points per cell using physical, half-open cell bounds.
///
/// Returned rows follow `cells` order with no noise applied
/// (`cleaned_count == raw_count`).
pub fn count_defects_per_subgrid(points: &[Point], cells: &[GridCell]) -> Vec<CellCount> {
    cells
        .iter()
        .map(|cell| {
            let raw = points
                .iter()
                .filter(|p| cell.contains_physical(p.x, p.y))
                .count() as u32;
            CellCount {
                sub_grid_id: cell.sub_grid_id.clone(),
                global_row: cell.global_row,
                global_col: cell.global_col,
                area: cell.area(),
                raw_count: raw,
                expected_noise: 0.0,
                cleaned_count: raw,
            }
        })
        .collect()
}

/// Apply an area-proportional background rate to every row.
pub fn subtract_background(counts: Vec<CellCount>, rate: f64) -> Vec<CellCount> {
    counts
        .into_iter()
        .map(|c| c.with_noise_rate(rate))
        .collect()
}

/// Scatter cleaned counts into a dense zero-initialized matrix.
///
/// The shape is `(max_global_row + 1, max_global_col + 1)`; empty input
/// gives a `0 × 0` matrix.
pub fn create_subgrid_matrix(counts: &[CellCount]) -> DensityMatrix {
    let rows = counts.iter().map(|c| c.global_row + 1).max().unwrap_or(0);
    let cols = counts.iter().map(|c| c.global_col + 1).max().unwrap_or(0);
    let mut matrix = DensityMatrix::zeros(rows, cols);
    for c in counts {
        matrix[(c.global_row, c.global_col)] = c.cleaned_count;
    }
    matrix
}

/// Row-major nested copy of a matrix, for serialization.
pub fn matrix_rows<T: nalgebra::Scalar + Copy>(matrix: &DMatrix<T>) -> Vec<Vec<T>> {
    (0..matrix.nrows())
        .map(|r| (0..matrix.ncols()).map(|c| matrix[(r, c)]).collect())
        .collect()
}

pub(crate) fn serialize_matrix<S, T>(matrix: &DMatrix<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: nalgebra::Scalar + Copy + serde::Serialize,
{
    serde::Serialize::serialize(&matrix_rows(matrix), serializer)
}
