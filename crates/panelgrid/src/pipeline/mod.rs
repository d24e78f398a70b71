//! End-to-end analysis pipeline.
//!
//! Wires the stages together in order:
//! validate -> filter -> gap detection -> normalize -> grid cells -> counts
//! -> density matrix -> regions.
//!
//! The stages themselves live in `crate::gaps`, `crate::filter`,
//! `crate::grid`, `crate::density` and `crate::regions`; this layer owns call
//! order, logging and result assembly.

mod result;
mod run;

pub use result::{AnalysisResult, AnalysisSummary, HeatmapResult};
pub use run::{analyze, analyze_heatmap};
