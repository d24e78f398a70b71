//! panelgrid CLI — command-line interface for panel defect density analysis.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use panelgrid::{
    find_gaps, load_panels_json, load_points_json, panel_addr, panel_label, AnalysisConfig, Analyzer,
    Axis, Panel, PanelLayout, Point, PointFilterMode, ShiftTable,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "panelgrid")]
#[command(about = "Gap-aware sub-grid defect density and cluster analysis for panel arrangements")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sub-grid density and region analysis.
    Analyze(CliAnalyzeArgs),

    /// Run the fixed-bin heatmap analysis.
    Heatmap(CliHeatmapArgs),

    /// Print the per-axis gap shift tables of a panel file.
    Gaps {
        /// Panel JSON (rectangles or corner rows).
        #[arg(long)]
        panels: PathBuf,
    },

    /// Print the resolved panel arrangement.
    LayoutInfo {
        /// Panel JSON (rectangles or corner rows).
        #[arg(long)]
        panels: PathBuf,

        /// Panels per arrangement row (inferred when omitted).
        #[arg(long)]
        n_panel_cols: Option<usize>,

        /// Product id prefix to strip when printing panel addresses.
        #[arg(long)]
        product_id: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
struct CliInputArgs {
    /// Panel JSON (rectangles or corner rows).
    #[arg(long)]
    panels: PathBuf,

    /// Defect point JSON.
    #[arg(long)]
    points: PathBuf,

    /// Analysis config JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write results (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Point validity test.
    #[arg(long, value_enum)]
    point_filter: Option<PointFilterArg>,
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    #[command(flatten)]
    input: CliInputArgs,

    /// Sub-cells per panel along x.
    #[arg(long)]
    n_split_x: Option<usize>,

    /// Sub-cells per panel along y.
    #[arg(long)]
    n_split_y: Option<usize>,

    /// Panels per arrangement row.
    #[arg(long)]
    n_panel_cols: Option<usize>,

    /// Background defects per unit area.
    #[arg(long)]
    noise_rate: Option<f64>,

    /// Cells with a cleaned count above this form regions.
    #[arg(long)]
    region_threshold: Option<u32>,

    /// Number of top regions to log.
    #[arg(long, default_value = "5")]
    top: usize,
}

#[derive(Debug, Clone, Args)]
struct CliHeatmapArgs {
    #[command(flatten)]
    input: CliInputArgs,

    /// Bin edge length.
    #[arg(long)]
    bin_size: Option<f64>,

    /// Heatmap window on x as `MIN,MAX`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    x_range: Option<Vec<f64>>,

    /// Heatmap window on y as `MIN,MAX`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    y_range: Option<Vec<f64>>,

    /// Background defects per unit area.
    #[arg(long)]
    noise_rate: Option<f64>,

    /// Bins with a cleaned count above this are clustered.
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PointFilterArg {
    PerAxis,
    PanelRectangles,
}

impl PointFilterArg {
    fn to_core(self) -> PointFilterMode {
        match self {
            Self::PerAxis => PointFilterMode::PerAxis,
            Self::PanelRectangles => PointFilterMode::PanelRectangles,
        }
    }
}

impl CliInputArgs {
    fn base_config(&self) -> CliResult<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading config: {}", path.display());
                AnalysisConfig::from_json_file(path)?
            }
            None => AnalysisConfig::default(),
        };
        if let Some(mode) = self.point_filter {
            config.point_filter = mode.to_core();
        }
        Ok(config)
    }
}

impl CliAnalyzeArgs {
    fn to_config(&self) -> CliResult<AnalysisConfig> {
        let mut config = self.input.base_config()?;
        if let Some(v) = self.n_split_x {
            config.n_split_x = v;
        }
        if let Some(v) = self.n_split_y {
            config.n_split_y = v;
        }
        if self.n_panel_cols.is_some() {
            config.n_panel_cols = self.n_panel_cols;
        }
        if let Some(v) = self.noise_rate {
            config.noise_rate = v;
        }
        if let Some(v) = self.region_threshold {
            config.region_threshold = v;
        }
        config.validate()?;
        Ok(config)
    }
}

fn range_arg(values: &[f64]) -> CliResult<(f64, f64)> {
    match values {
        [lo, hi] => Ok((*lo, *hi)),
        _ => Err(format!("expected MIN,MAX, got {} values", values.len()).into()),
    }
}

impl CliHeatmapArgs {
    fn to_config(&self) -> CliResult<AnalysisConfig> {
        let mut config = self.input.base_config()?;
        let heatmap = &mut config.heatmap;
        if let Some(v) = self.bin_size {
            heatmap.bin_size = v;
        }
        if let Some(v) = &self.x_range {
            heatmap.x_range = range_arg(v)?;
        }
        if let Some(v) = &self.y_range {
            heatmap.y_range = range_arg(v)?;
        }
        if let Some(v) = self.noise_rate {
            heatmap.noise_rate = v;
        }
        if let Some(v) = self.threshold {
            heatmap.threshold = v;
        }
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Heatmap(args) => run_heatmap(&args),
        Commands::Gaps { panels } => run_gaps(&panels),
        Commands::LayoutInfo {
            panels,
            n_panel_cols,
            product_id,
        } => run_layout_info(&panels, n_panel_cols, product_id.as_deref()),
    }
}

fn write_json(out: Option<&Path>, json: &str) -> CliResult<()> {
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn load_inputs(input: &CliInputArgs) -> CliResult<(Vec<Panel>, Vec<Point>)> {
    tracing::info!("Loading panels: {}", input.panels.display());
    let panels = load_panels_json(&input.panels).map_err(|e| -> CliError {
        format!("Failed to load panels {}: {}", input.panels.display(), e).into()
    })?;
    tracing::info!("Loading points: {}", input.points.display());
    let points = load_points_json(&input.points).map_err(|e| -> CliError {
        format!("Failed to load points {}: {}", input.points.display(), e).into()
    })?;
    tracing::info!("{} panels, {} points", panels.len(), points.len());
    Ok((panels, points))
}

// ── analyze ────────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    let config = args.to_config()?;
    let (panels, points) = load_inputs(&args.input)?;

    let result = Analyzer::with_config(config).analyze(&panels, &points)?;

    let s = &result.summary;
    tracing::info!(
        "{} of {} points valid, {} cells, matrix {}x{}, {} regions",
        s.n_valid,
        s.n_points,
        s.n_cells,
        s.matrix_shape[0],
        s.matrix_shape[1],
        s.n_regions,
    );
    for region in result.region_analysis.regions.iter().take(args.top) {
        tracing::info!(
            "Region {}: {} defects over {} cells (avg {:.2}), x [{:.1}, {:.1}] y [{:.1}, {:.1}]",
            region.id,
            region.total_defects,
            region.sub_grid_count,
            region.avg_defects_per_grid,
            region.physical_bounds.min_x,
            region.physical_bounds.max_x,
            region.physical_bounds.min_y,
            region.physical_bounds.max_y,
        );
    }

    let json = serde_json::to_string_pretty(&result)?;
    write_json(args.input.out.as_deref(), &json)
}

// ── heatmap ────────────────────────────────────────────────────────────

fn run_heatmap(args: &CliHeatmapArgs) -> CliResult<()> {
    let config = args.to_config()?;
    let (panels, points) = load_inputs(&args.input)?;

    let result = Analyzer::with_config(config).analyze_heatmap(&panels, &points)?;

    tracing::info!(
        "Heatmap {}x{} bins, {} components",
        result.heatmap.n_bins_y(),
        result.heatmap.n_bins_x(),
        result.n_components,
    );
    for c in &result.components {
        tracing::info!(
            "Component {}: {} points, x [{:.1}, {:.1}] y [{:.1}, {:.1}]",
            c.component_id,
            c.point_count,
            c.bounds.min_x,
            c.bounds.max_x,
            c.bounds.min_y,
            c.bounds.max_y,
        );
    }

    let json = serde_json::to_string_pretty(&result)?;
    write_json(args.input.out.as_deref(), &json)
}

// ── gaps ───────────────────────────────────────────────────────────────

fn print_shift_table(axis: Axis, table: &ShiftTable) {
    println!("  {} intervals: {}", axis, table.len());
    for e in table.entries() {
        println!(
            "    [{:>10.3}, {:>10.3}]  shift {:.3}",
            e.interval_min, e.interval_max, e.cumulative_shift
        );
    }
    println!("  total {} shift: {:.3}", axis, table.total_shift());
}

fn run_gaps(panels_path: &Path) -> CliResult<()> {
    let panels = load_panels_json(panels_path)?;
    let shifts = find_gaps(&panels);

    println!("panelgrid gap shift tables");
    println!("  panels: {}", panels.len());
    for axis in [Axis::X, Axis::Y] {
        print_shift_table(axis, shifts.axis(axis));
    }

    Ok(())
}

// ── layout-info ────────────────────────────────────────────────────────

fn run_layout_info(
    panels_path: &Path,
    n_panel_cols: Option<usize>,
    product_id: Option<&str>,
) -> CliResult<()> {
    let panels = load_panels_json(panels_path)?;
    let layout = PanelLayout::new(&panels, n_panel_cols)?;

    println!("panelgrid panel arrangement");
    println!("  panels:       {}", layout.n_panels());
    println!("  arrangement:  {} rows x {} cols", layout.n_rows(), layout.n_cols());
    println!("  complete:     {}", layout.is_complete());
    if let Some(b) = layout.bounds() {
        println!(
            "  bounds:       x [{:.3}, {:.3}] y [{:.3}, {:.3}]",
            b.min_x, b.max_x, b.min_y, b.max_y
        );
    }

    for placed in layout.panels() {
        let label = panel_label(placed.sequence_no, layout.n_cols());
        let addr = product_id.map_or(placed.panel.id.as_str(), |p| panel_addr(&placed.panel.id, p));
        println!(
            "  {:>4} {:<4} {:<16} row {} col {}  {:.1} x {:.1}",
            placed.sequence_no,
            label,
            addr,
            placed.row,
            placed.col,
            placed.panel.bounds.width(),
            placed.panel.bounds.height(),
        );
    }

    Ok(())
}
