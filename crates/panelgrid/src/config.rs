//! Analysis configuration.

use std::path::Path;

use crate::error::AnalysisError;
use crate::filter::PointFilterMode;
use crate::grid::GridSplit;

/// Parameters for the fixed-bin heatmap analysis.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// `(min, max)` window on the gap-removed x axis.
    pub x_range: (f64, f64),
    /// `(min, max)` window on the gap-removed y axis.
    pub y_range: (f64, f64),
    /// Square bin edge length.
    pub bin_size: f64,
    /// Uniform background in defects per unit area.
    pub noise_rate: f64,
    /// Bins with a cleaned count above this are clustered.
    pub threshold: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            x_range: (-800.0, 800.0),
            y_range: (-600.0, 600.0),
            bin_size: 10.0,
            noise_rate: 0.02,
            threshold: 1.0,
        }
    }
}

/// Configuration for the sub-grid density analysis.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sub-cells per panel along x.
    pub n_split_x: usize,
    /// Sub-cells per panel along y.
    pub n_split_y: usize,
    /// Panels per arrangement row. Inferred from distinct x extents when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_panel_cols: Option<usize>,
    /// Expected background defects per unit area.
    pub noise_rate: f64,
    /// Cells with a cleaned count above this form regions.
    pub region_threshold: u32,
    pub point_filter: PointFilterMode,
    pub heatmap: HeatmapConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_split_x: 3,
            n_split_y: 3,
            n_panel_cols: None,
            noise_rate: 0.005,
            region_threshold: 0,
            point_filter: PointFilterMode::PerAxis,
            heatmap: HeatmapConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn split(&self) -> Result<GridSplit, AnalysisError> {
        GridSplit::new(self.n_split_x, self.n_split_y)
    }

    /// Check every field that has a domain restriction.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.split()?;
        if let Some(value) = self.n_panel_cols.filter(|&v| v == 0) {
            return Err(AnalysisError::InvalidPanelColumns { value });
        }
        if !(self.noise_rate.is_finite() && self.noise_rate >= 0.0) {
            return Err(AnalysisError::InvalidNoiseRate {
                value: self.noise_rate,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Axis;

    #[test]
    fn defaults_are_valid() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.split(), GridSplit::new(3, 3));
        assert_eq!(cfg.noise_rate, 0.005);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str(
            r#"{"n_split_x": 4, "point_filter": "panel_rectangles", "heatmap": {"bin_size": 5.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.n_split_x, 4);
        assert_eq!(cfg.n_split_y, 3);
        assert_eq!(cfg.point_filter, PointFilterMode::PanelRectangles);
        assert_eq!(cfg.heatmap.bin_size, 5.0);
        assert_eq!(cfg.heatmap.x_range, (-800.0, 800.0));
        assert_eq!(cfg.n_panel_cols, None);
    }

    #[test]
    fn validate_reports_offending_field() {
        let cfg = AnalysisConfig {
            n_split_y: 0,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(AnalysisError::InvalidSplit {
                axis: Axis::Y,
                value: 0
            })
        );

        let cfg = AnalysisConfig {
            n_panel_cols: Some(0),
            ..AnalysisConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(AnalysisError::InvalidPanelColumns { value: 0 })
        );

        for rate in [-0.1, f64::NAN, f64::INFINITY] {
            let cfg = AnalysisConfig {
                noise_rate: rate,
                ..AnalysisConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(AnalysisError::InvalidNoiseRate { .. })
            ));
        }
    }
}
