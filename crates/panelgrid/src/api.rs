//! High-level analysis API.
//!
//! [`Analyzer`] wraps an [`AnalysisConfig`] and runs the sub-grid density or
//! heatmap analysis over in-memory panels and points.

use std::path::Path;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::layout::{Panel, Point};
use crate::pipeline::{self, AnalysisResult, HeatmapResult};

/// Primary analysis interface.
///
/// Create once, analyze many panel/point sets.
///
/// # Examples
///
/// ```
/// use panelgrid::{Analyzer, Panel, Point, Rect};
///
/// let panels = vec![
///     Panel::new("Panel_1", None, Rect::new(0.0, 100.0, 0.0, 50.0)),
///     Panel::new("Panel_2", None, Rect::new(110.0, 210.0, 0.0, 50.0)),
/// ];
/// let points = vec![Point::new(150.0, 20.0), Point::new(105.0, 20.0)];
/// let result = Analyzer::default().analyze(&panels, &points).unwrap();
/// assert_eq!(result.summary.n_outliers, 1);
/// assert_eq!(result.normalized_points[0].x, 140.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create with full config control.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Load configuration JSON and create an analyzer in one step.
    pub fn from_config_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_config(AnalysisConfig::from_json_file(path)?))
    }

    /// Access the current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.config
    }

    /// Sub-grid density and region analysis.
    pub fn analyze(&self, panels: &[Panel], points: &[Point]) -> Result<AnalysisResult, AnalysisError> {
        pipeline::analyze(panels, points, &self.config)
    }

    /// Fixed-bin heatmap analysis using `config.heatmap`.
    pub fn analyze_heatmap(
        &self,
        panels: &[Panel],
        points: &[Point],
    ) -> Result<HeatmapResult, AnalysisError> {
        pipeline::analyze_heatmap(panels, points, &self.config.heatmap, self.config.point_filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::synthetic_panels;

    #[test]
    fn analyzer_config_mut() {
        let mut analyzer = Analyzer::default();
        analyzer.config_mut().n_split_x = 0;
        assert_eq!(analyzer.config().n_split_x, 0);
        let panels = synthetic_panels(1, 1, 10.0, 10.0, 0.0, 0.0);
        assert!(analyzer.analyze(&panels, &[]).is_err());
    }

    #[test]
    fn analyzer_runs_both_analyses() {
        let panels = synthetic_panels(2, 2, 30.0, 30.0, 10.0, 10.0);
        let points = vec![Point::new(5.0, 5.0), Point::new(45.0, 45.0)];
        let analyzer = Analyzer::default();
        let result = analyzer.analyze(&panels, &points).unwrap();
        assert_eq!(result.summary.n_valid, 2);
        let heat = analyzer.analyze_heatmap(&panels, &points).unwrap();
        assert_eq!(heat.n_valid, 2);
        assert_eq!(heat.point_components.len(), 2);
    }
}
