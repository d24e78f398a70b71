//! panelgrid — gap-aware sub-grid defect density analysis for segmented
//! panel arrangements.
//!
//! A manufactured part is laid out as a row-major grid of rectangular panels
//! separated by physical gaps. Defect coordinates are analyzed in stages:
//!
//! 1. **Filter** – drop points that do not fall on any panel.
//! 2. **Gaps** – per-axis cumulative shift tables that remove inter-panel gaps.
//! 3. **Grid** – split every panel into labeled sub-cells with global
//!    `(row, col)` indices.
//! 4. **Density** – count points per cell, subtract an area-proportional
//!    background and scatter the result into a dense matrix.
//! 5. **Regions** – 8-connected clusters of above-threshold cells.
//!
//! A fixed-bin [`Heatmap`] over gap-removed coordinates is available as an
//! alternative clustering view.
//!
//! # Public API
//! - [`Analyzer`] and [`AnalysisConfig`] as primary entry points
//! - [`analyze`] / [`analyze_heatmap`] for direct pipeline calls
//! - stage functions and record types for custom pipelines

mod api;
mod config;
mod density;
mod error;
mod filter;
mod gaps;
mod grid;
mod heatmap;
mod layout;
mod pipeline;
mod regions;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::Analyzer;
pub use config::{AnalysisConfig, HeatmapConfig};
pub use density::{
    cleaned_count, count_defects_per_subgrid, create_subgrid_matrix, matrix_rows,
    subtract_background, CellCount, DensityMatrix,
};
pub use error::{AnalysisError, Axis};
pub use filter::{filter_valid_points, FilterOutcome, PointFilterMode};
pub use gaps::{
    axis_intervals, find_gaps, remove_gaps, remove_gaps_from_panels, Interval, ShiftEntry,
    ShiftMaps, ShiftTable, GAP_TOLERANCE,
};
pub use grid::{
    cell_label, column_letters, generate_grid_cells, grid_shape, panel_label, sub_grid_id,
    GridCell, GridSplit,
};
pub use heatmap::{component_bounds, ComponentBounds, Heatmap, MAX_HEATMAP_BINS};
pub use layout::{
    load_panels_json, load_points_json, panel_addr, panels_from_corners, Panel, PanelCorner,
    PanelLayout, PlacedPanel, Point, Rect,
};
pub use pipeline::{analyze, analyze_heatmap, AnalysisResult, AnalysisSummary, HeatmapResult};
pub use regions::{
    analyze_regions, label_components, CellRegion, Connectivity, Region, RegionAnalysis,
};
