use crate::config::AnalysisConfig;
use crate::density::{serialize_matrix, CellCount, DensityMatrix};
use crate::gaps::ShiftMaps;
use crate::grid::GridCell;
use crate::heatmap::{ComponentBounds, Heatmap};
use crate::layout::{Panel, Point};
use crate::regions::RegionAnalysis;

/// Headline numbers of one analysis run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalysisSummary {
    pub n_points: usize,
    pub n_valid: usize,
    pub n_outliers: usize,
    pub n_panels: usize,
    /// Panel arrangement `[rows, cols]`.
    pub arrangement: [usize; 2],
    pub layout_complete: bool,
    pub n_cells: usize,
    /// Density matrix `[rows, cols]`.
    pub matrix_shape: [usize; 2],
    pub total_raw: u64,
    pub total_cleaned: u64,
    pub n_regions: usize,
    pub total_shift_x: f64,
    pub total_shift_y: f64,
}

/// Full output of [`crate::analyze`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisResult {
    pub config: AnalysisConfig,
    pub summary: AnalysisSummary,
    pub shifts: ShiftMaps,
    /// Points that fell on a panel, in input order.
    pub valid_points: Vec<Point>,
    /// `valid_points` in gap-removed coordinates.
    pub normalized_points: Vec<Point>,
    /// Panel rectangles in gap-removed coordinates.
    pub clean_panels: Vec<Panel>,
    pub cells: Vec<GridCell>,
    pub counts: Vec<CellCount>,
    #[serde(serialize_with = "serialize_matrix")]
    pub density: DensityMatrix,
    pub region_analysis: RegionAnalysis,
}

impl AnalysisResult {
    /// Count record for a sub-grid id.
    pub fn count_for(&self, sub_grid_id: &str) -> Option<&CellCount> {
        self.counts.iter().find(|c| c.sub_grid_id == sub_grid_id)
    }
}

/// Output of [`crate::analyze_heatmap`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct HeatmapResult {
    pub n_valid: usize,
    pub n_outliers: usize,
    /// Noise-subtracted heatmap.
    pub heatmap: Heatmap,
    #[serde(serialize_with = "serialize_matrix")]
    pub labels: nalgebra::DMatrix<u32>,
    pub n_components: u32,
    /// Component id per valid point, in input order.
    pub point_components: Vec<u32>,
    /// Component bounding boxes in physical coordinates.
    pub components: Vec<ComponentBounds>,
}
