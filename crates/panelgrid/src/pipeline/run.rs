use super::result::{AnalysisResult, AnalysisSummary, HeatmapResult};
use crate::config::{AnalysisConfig, HeatmapConfig};
use crate::density::{count_defects_per_subgrid, create_subgrid_matrix, subtract_background};
use crate::error::AnalysisError;
use crate::filter::{filter_valid_points, PointFilterMode};
use crate::gaps::{find_gaps, remove_gaps, remove_gaps_from_panels};
use crate::grid::generate_grid_cells;
use crate::heatmap::{component_bounds, Heatmap};
use crate::layout::{Panel, PanelLayout, Point};
use crate::regions::analyze_regions;

/// Run the sub-grid density analysis over one panel arrangement.
///
/// Empty inputs produce empty tables and a `0 × 0` matrix; invalid
/// configuration or panel data fails before any stage runs.
pub fn analyze(
    panels: &[Panel],
    points: &[Point],
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    config.validate()?;
    let split = config.split()?;
    let layout = PanelLayout::new(panels, config.n_panel_cols)?;
    if !layout.is_complete() {
        tracing::warn!(
            "panel arrangement is incomplete: {} panels for {}x{} slots",
            layout.n_panels(),
            layout.n_rows(),
            layout.n_cols()
        );
    }

    let filtered = filter_valid_points(points, panels, config.point_filter);
    let shifts = find_gaps(panels);
    let normalized_points = remove_gaps(&filtered.valid, &shifts);
    let clean_panels = remove_gaps_from_panels(panels, &shifts);

    let cells = generate_grid_cells(split, &shifts, &layout)?;
    let counts = subtract_background(
        count_defects_per_subgrid(&filtered.valid, &cells),
        config.noise_rate,
    );
    let density = create_subgrid_matrix(&counts);
    let total_raw: u64 = counts.iter().map(|c| u64::from(c.raw_count)).sum();
    let total_cleaned: u64 = counts.iter().map(|c| u64::from(c.cleaned_count)).sum();
    tracing::info!(
        "density matrix {}x{}: {} raw, {} after background removal",
        density.nrows(),
        density.ncols(),
        total_raw,
        total_cleaned
    );

    let region_analysis = analyze_regions(&density, &cells, config.region_threshold);

    let summary = AnalysisSummary {
        n_points: points.len(),
        n_valid: filtered.valid.len(),
        n_outliers: filtered.n_outliers,
        n_panels: layout.n_panels(),
        arrangement: [layout.n_rows(), layout.n_cols()],
        layout_complete: layout.is_complete(),
        n_cells: cells.len(),
        matrix_shape: [density.nrows(), density.ncols()],
        total_raw,
        total_cleaned,
        n_regions: region_analysis.n_regions(),
        total_shift_x: shifts.x.total_shift(),
        total_shift_y: shifts.y.total_shift(),
    };

    Ok(AnalysisResult {
        config: config.clone(),
        summary,
        shifts,
        valid_points: filtered.valid,
        normalized_points,
        clean_panels,
        cells,
        counts,
        density,
        region_analysis,
    })
}

/// Run the fixed-bin heatmap analysis.
///
/// Points are filtered and gap-removed as in [`analyze`], binned, cleaned of
/// a uniform background and clustered. Component bounds are reported in
/// physical coordinates.
pub fn analyze_heatmap(
    panels: &[Panel],
    points: &[Point],
    config: &HeatmapConfig,
    point_filter: PointFilterMode,
) -> Result<HeatmapResult, AnalysisError> {
    let filtered = filter_valid_points(points, panels, point_filter);
    let shifts = find_gaps(panels);
    let normalized = remove_gaps(&filtered.valid, &shifts);

    let mut heatmap = Heatmap::from_points(
        &normalized,
        config.x_range,
        config.y_range,
        config.bin_size,
    )?;
    heatmap.subtract_uniform_noise(config.noise_rate)?;
    let (labels, n_components) = heatmap.label(config.threshold);
    let point_components = heatmap.map_points_to_components(&labels, &normalized);
    let components = component_bounds(&filtered.valid, &point_components);
    tracing::info!(
        "heatmap: {} components above {} ({} bins)",
        n_components,
        config.threshold,
        labels.len()
    );

    Ok(HeatmapResult {
        n_valid: filtered.valid.len(),
        n_outliers: filtered.n_outliers,
        heatmap,
        labels,
        n_components,
        point_components,
        components,
    })
}
