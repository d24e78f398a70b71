use criterion::{black_box, criterion_group, criterion_main, Criterion};
use panelgrid::{
    count_defects_per_subgrid, find_gaps, generate_grid_cells, label_components, remove_gaps,
    AnalysisConfig, Connectivity, GridSplit, Panel, PanelLayout, Point, Rect,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_panels(n_cols: usize, n_rows: usize) -> Vec<Panel> {
    let (w, h, gap) = (120.0, 80.0, 6.0);
    (0..n_rows)
        .flat_map(|r| (0..n_cols).map(move |c| (r, c)))
        .map(|(r, c)| {
            let seq = (r * n_cols + c + 1) as u32;
            let min_x = c as f64 * (w + gap);
            let min_y = r as f64 * (h + gap);
            Panel::new(
                format!("Panel_{}", seq),
                Some(seq),
                Rect::new(min_x, min_x + w, min_y, min_y + h),
            )
        })
        .collect()
}

fn make_points(panels: &[Panel], n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let b = panels[rng.gen_range(0..panels.len())].bounds;
            Point::new(
                rng.gen_range(b.min_x..b.max_x),
                rng.gen_range(b.min_y..b.max_y),
            )
        })
        .collect()
}

fn bench_remove_gaps(c: &mut Criterion) {
    let panels = make_panels(8, 5);
    let points = make_points(&panels, 50_000, 7);
    let shifts = find_gaps(&panels);

    c.bench_function("remove_gaps_50k_8x5", |b| {
        b.iter(|| {
            let out = remove_gaps(black_box(&points), black_box(&shifts));
            black_box(out.len())
        })
    });
}

fn bench_count_cells(c: &mut Criterion) {
    let panels = make_panels(8, 5);
    let points = make_points(&panels, 20_000, 9);
    let layout = PanelLayout::new(&panels, None).expect("fixture layout");
    let cells = generate_grid_cells(
        GridSplit::new(3, 3).expect("fixture split"),
        &find_gaps(&panels),
        &layout,
    )
    .expect("fixture cells");

    c.bench_function("count_defects_20k_360cells", |b| {
        b.iter(|| {
            let counts = count_defects_per_subgrid(black_box(&points), black_box(&cells));
            black_box(counts.len())
        })
    });
}

fn bench_label_components(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let mask = nalgebra::DMatrix::from_fn(160, 240, |_, _| rng.gen_bool(0.35));

    c.bench_function("label_components_160x240", |b| {
        b.iter(|| {
            let (_, n) = label_components(black_box(&mask), Connectivity::Eight);
            black_box(n)
        })
    });
}

fn bench_analyze(c: &mut Criterion) {
    let panels = make_panels(8, 5);
    let points = make_points(&panels, 10_000, 11);
    let config = AnalysisConfig::default();

    c.bench_function("analyze_10k_8x5", |b| {
        b.iter(|| {
            let result = panelgrid::analyze(black_box(&panels), black_box(&points), &config)
                .expect("fixture analysis");
            black_box(result.summary.n_regions)
        })
    });
}

criterion_group!(
    hotpaths,
    bench_remove_gaps,
    bench_count_cells,
    bench_label_components,
    bench_analyze
);
criterion_main!(hotpaths);
