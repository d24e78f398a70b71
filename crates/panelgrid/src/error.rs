//! Error type shared by all analysis stages.

/// Grid axis, used to name the offending split factor or shift table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

/// Errors raised by configuration validation and grid generation.
///
/// Every variant carries the offending value or id so a failure can be
/// diagnosed without re-running the analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Split factor must be at least 1.
    InvalidSplit {
        /// Axis of the split factor.
        axis: Axis,
        /// Rejected value.
        value: usize,
    },
    /// Panel column count must be at least 1.
    InvalidPanelColumns {
        /// Rejected value.
        value: usize,
    },
    /// Background rate must be finite and non-negative.
    InvalidNoiseRate {
        /// Rejected value.
        value: f64,
    },
    /// No sequence number given and none derivable from the panel id.
    MissingSequence {
        /// Offending panel id.
        panel_id: String,
    },
    /// Two panels claim the same position in the arrangement.
    DuplicateSequence {
        /// Shared sequence number.
        sequence_no: u32,
        /// Id of the panel seen first.
        first: String,
        /// Id of the panel seen second.
        second: String,
    },
    /// Panel bounds are non-finite or inverted.
    InvalidPanelBounds {
        /// Offending panel id.
        panel_id: String,
    },
    /// Generated sub-grid id is not unique.
    DuplicateCellId {
        /// Repeated id.
        sub_grid_id: String,
    },
    /// Heatmap range is empty or bin size is not positive.
    InvalidHeatmapRange {
        /// Requested `(min, max)` on x.
        x_range: (f64, f64),
        /// Requested `(min, max)` on y.
        y_range: (f64, f64),
        /// Requested bin size.
        bin_size: f64,
    },
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSplit { axis, value } => {
                write!(f, "n_split_{} must be >= 1, got {}", axis, value)
            }
            Self::InvalidPanelColumns { value } => {
                write!(f, "n_panel_cols must be >= 1, got {}", value)
            }
            Self::InvalidNoiseRate { value } => {
                write!(f, "noise_rate must be finite and >= 0, got {}", value)
            }
            Self::MissingSequence { panel_id } => {
                write!(
                    f,
                    "cannot derive a sequence number for panel '{}'",
                    panel_id
                )
            }
            Self::DuplicateSequence {
                sequence_no,
                first,
                second,
            } => write!(
                f,
                "panels '{}' and '{}' share sequence number {}",
                first, second, sequence_no
            ),
            Self::InvalidPanelBounds { panel_id } => {
                write!(f, "panel '{}' has non-finite or inverted bounds", panel_id)
            }
            Self::DuplicateCellId { sub_grid_id } => {
                write!(f, "duplicate sub-grid id '{}'", sub_grid_id)
            }
            Self::InvalidHeatmapRange {
                x_range,
                y_range,
                bin_size,
            } => write!(
                f,
                "invalid heatmap range x=[{}, {}] y=[{}, {}] bin={}",
                x_range.0, x_range.1, y_range.0, y_range.1, bin_size
            ),
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = AnalysisError::InvalidSplit {
            axis: Axis::Y,
            value: 0,
        };
        assert_eq!(err.to_string(), "n_split_y must be >= 1, got 0");

        let err = AnalysisError::MissingSequence {
            panel_id: "edge-left".to_string(),
        };
        assert!(err.to_string().contains("edge-left"));

        let err = AnalysisError::DuplicateSequence {
            sequence_no: 4,
            first: "P4".to_string(),
            second: "Q4".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("P4") && msg.contains("Q4") && msg.contains('4'));
    }
}
