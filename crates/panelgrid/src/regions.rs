//! Connected high-defect regions on the density matrix.
//!
//! Cells whose cleaned count exceeds a threshold are grouped by
//! 8-connectivity using a two-pass union-find labeling. Labels are assigned
//! in row-major discovery order, starting at 1; unset cells keep 0. The
//! labeler also supports 4-connectivity for callers that must not merge
//! corner-touching cells.

use std::collections::HashMap;

use nalgebra::DMatrix;

use crate::density::{serialize_matrix, DensityMatrix};
use crate::grid::GridCell;
use crate::layout::Rect;

/// A connected group of above-threshold cells.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Region {
    pub id: u32,
    /// Member sub-grid ids in row-major order.
    pub sub_grids: Vec<String>,
    pub total_defects: u64,
    pub sub_grid_count: usize,
    pub avg_defects_per_grid: f64,
    /// Bounding box of the member cells in physical coordinates.
    pub physical_bounds: Rect,
    /// Bounding box of the member cells in gap-removed coordinates.
    pub clean_bounds: Rect,
}

/// Region assignment of one grid cell (`region == 0` means none).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CellRegion {
    pub sub_grid_id: String,
    pub global_row: usize,
    pub global_col: usize,
    pub region: u32,
}

/// Output of [`analyze_regions`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegionAnalysis {
    /// Component label per matrix position.
    #[serde(serialize_with = "serialize_matrix")]
    pub labels: DMatrix<u32>,
    pub assignments: Vec<CellRegion>,
    /// Sorted by `total_defects` descending, then `id` ascending.
    pub regions: Vec<Region>,
}

impl RegionAnalysis {
    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }
}

fn find_root(parent: &mut [u32], label: u32) -> u32 {
    let mut current = label;
    while current != parent[current as usize] {
        parent[current as usize] = parent[parent[current as usize] as usize];
        current = parent[current as usize];
    }
    current
}

fn union_labels(parent: &mut [u32], a: u32, b: u32) {
    let ra = find_root(parent, a);
    let rb = find_root(parent, b);
    if ra < rb {
        parent[rb as usize] = ra;
    } else if rb < ra {
        parent[ra as usize] = rb;
    }
}

/// Neighbourhood used when grouping set cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Edge neighbours only.
    Four,
    /// Edge and corner neighbours.
    Eight,
}

/// Label the connected components of a binary mask.
///
/// Returns the label matrix and the number of components.
pub fn label_components(mask: &DMatrix<bool>, connectivity: Connectivity) -> (DMatrix<u32>, u32) {
    let diagonals = connectivity == Connectivity::Eight;
    let (rows, cols) = mask.shape();
    let mut labels = DMatrix::<u32>::zeros(rows, cols);
    // parent[0] is background
    let mut parent: Vec<u32> = vec![0];

    for r in 0..rows {
        for c in 0..cols {
            if !mask[(r, c)] {
                continue;
            }
            // already-visited neighbors: up-left, up, up-right, left
            let mut neighbors = [0u32; 4];
            if r > 0 {
                if diagonals && c > 0 {
                    neighbors[0] = labels[(r - 1, c - 1)];
                }
                neighbors[1] = labels[(r - 1, c)];
                if diagonals && c + 1 < cols {
                    neighbors[2] = labels[(r - 1, c + 1)];
                }
            }
            if c > 0 {
                neighbors[3] = labels[(r, c - 1)];
            }

            match neighbors.iter().copied().filter(|&l| l > 0).min() {
                None => {
                    let next = parent.len() as u32;
                    parent.push(next);
                    labels[(r, c)] = next;
                }
                Some(min_label) => {
                    labels[(r, c)] = min_label;
                    for &l in neighbors.iter().filter(|&&l| l > 0 && l != min_label) {
                        union_labels(&mut parent, min_label, l);
                    }
                }
            }
        }
    }

    // Roots are the smallest label in their set, so walking provisional labels
    // in increasing order numbers components by row-major discovery.
    let mut final_label = vec![0u32; parent.len()];
    let mut count = 0u32;
    for l in 1..parent.len() as u32 {
        let root = find_root(&mut parent, l);
        if root == l {
            count += 1;
            final_label[l as usize] = count;
        } else {
            final_label[l as usize] = final_label[root as usize];
        }
    }

    for v in labels.iter_mut() {
        *v = final_label[*v as usize];
    }
    (labels, count)
}

/// Find connected regions of cells with `count > threshold`.
pub fn analyze_regions(matrix: &DensityMatrix, cells: &[GridCell], threshold: u32) -> RegionAnalysis {
    let mask = matrix.map(|v| v > threshold);
    let (labels, n_components) = label_components(&mask, Connectivity::Eight);

    let by_position: HashMap<(usize, usize), &GridCell> = cells
        .iter()
        .map(|c| ((c.global_row, c.global_col), c))
        .collect();

    struct Acc {
        members: Vec<String>,
        total: u64,
        physical: Option<Rect>,
        clean: Option<Rect>,
    }
    let mut accs: Vec<Acc> = (0..n_components)
        .map(|_| Acc {
            members: Vec::new(),
            total: 0,
            physical: None,
            clean: None,
        })
        .collect();

    for r in 0..labels.nrows() {
        for c in 0..labels.ncols() {
            let label = labels[(r, c)];
            if label == 0 {
                continue;
            }
            let acc = &mut accs[(label - 1) as usize];
            acc.total += u64::from(matrix[(r, c)]);
            if let Some(cell) = by_position.get(&(r, c)) {
                acc.members.push(cell.sub_grid_id.clone());
                let (p, k) = (cell.physical_rect(), cell.clean_rect());
                acc.physical = Some(acc.physical.map_or(p, |b| b.union(&p)));
                acc.clean = Some(acc.clean.map_or(k, |b| b.union(&k)));
            }
        }
    }

    let empty = Rect::new(0.0, 0.0, 0.0, 0.0);
    let mut regions: Vec<Region> = accs
        .into_iter()
        .enumerate()
        .map(|(i, acc)| {
            let count = acc.members.len();
            Region {
                id: i as u32 + 1,
                avg_defects_per_grid: if count > 0 {
                    acc.total as f64 / count as f64
                } else {
                    0.0
                },
                sub_grid_count: count,
                total_defects: acc.total,
                sub_grids: acc.members,
                physical_bounds: acc.physical.unwrap_or(empty),
                clean_bounds: acc.clean.unwrap_or(empty),
            }
        })
        .collect();
    regions.sort_by(|a, b| b.total_defects.cmp(&a.total_defects).then(a.id.cmp(&b.id)));

    let assignments = cells
        .iter()
        .map(|c| CellRegion {
            sub_grid_id: c.sub_grid_id.clone(),
            global_row: c.global_row,
            global_col: c.global_col,
            region: if c.global_row < labels.nrows() && c.global_col < labels.ncols() {
                labels[(c.global_row, c.global_col)]
            } else {
                0
            },
        })
        .collect();

    tracing::info!(
        "{} regions above threshold {} ({} cells flagged)",
        regions.len(),
        threshold,
        mask.iter().filter(|&&m| m).count()
    );

    RegionAnalysis {
        labels,
        assignments,
        regions,
    }
}
