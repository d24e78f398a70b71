//! Panel and point records, and the validated panel arrangement.
//!
//! Panels arrive either as rectangles (`{id, sequence_no?, min_x, max_x,
//! min_y, max_y}`) or as per-panel corner rows (`{panel_id, sequence_no?, x,
//! y}`) that are grouped into bounding rectangles. [`PanelLayout`] resolves
//! every panel's 1-based sequence number and its `(row, col)` position in the
//! row-major arrangement.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{AnalysisError, Axis};
use crate::gaps::axis_intervals;

/// Axis-aligned rectangle in physical (or gap-removed) units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// `(min, max)` extent along one axis.
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.min_x, self.max_x),
            Axis::Y => (self.min_y, self.max_y),
        }
    }

    /// Closed containment test (borders included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }
}

/// A physical panel of the manufactured grid.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Panel {
    pub id: String,
    /// 1-based row-major position. Derived from the id's trailing digits
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_no: Option<u32>,
    #[serde(flatten)]
    pub bounds: Rect,
}

impl Panel {
    pub fn new(id: impl Into<String>, sequence_no: Option<u32>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            sequence_no,
            bounds,
        }
    }

    /// Resolve the 1-based sequence number.
    pub fn sequence(&self) -> Result<u32, AnalysisError> {
        self.sequence_no
            .or_else(|| trailing_number(&self.id))
            .filter(|&seq| seq > 0)
            .ok_or_else(|| AnalysisError::MissingSequence {
                panel_id: self.id.clone(),
            })
    }
}

/// A single corner sample of a panel outline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanelCorner {
    pub panel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_no: Option<u32>,
    pub x: f64,
    pub y: f64,
}

/// A defect observation. Tags are carried through untouched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            defect_type: None,
            product_id: None,
        }
    }

    /// Copy of this point with new coordinates and the same tags.
    pub fn moved_to(&self, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }
}

/// Group corner rows into one bounding rectangle per panel id.
///
/// Panels are returned in order of first appearance. The first non-empty
/// sequence number seen for a panel wins.
pub fn panels_from_corners(corners: &[PanelCorner]) -> Vec<Panel> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut panels: Vec<Panel> = Vec::new();
    for c in corners {
        match index.get(c.panel_id.as_str()) {
            Some(&i) => {
                let p = &mut panels[i];
                p.bounds = p.bounds.union(&Rect::new(c.x, c.x, c.y, c.y));
                if p.sequence_no.is_none() {
                    p.sequence_no = c.sequence_no;
                }
            }
            None => {
                index.insert(c.panel_id.as_str(), panels.len());
                panels.push(Panel::new(
                    c.panel_id.clone(),
                    c.sequence_no,
                    Rect::new(c.x, c.x, c.y, c.y),
                ));
            }
        }
    }
    panels
}

/// Strip the product-id prefix from a panel id.
///
/// The prefix length is measured in characters. Ids shorter than the prefix
/// yield an empty address.
pub fn panel_addr<'a>(panel_id: &'a str, product_id: &str) -> &'a str {
    let skip = product_id.chars().count();
    match panel_id.char_indices().nth(skip) {
        Some((offset, _)) => &panel_id[offset..],
        None => "",
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PanelRecords {
    Rects(Vec<Panel>),
    Corners(Vec<PanelCorner>),
}

/// Load panels from a JSON array of rectangles or corner rows.
pub fn load_panels_json(path: &Path) -> Result<Vec<Panel>, Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(path)?;
    let records: PanelRecords = serde_json::from_str(&data)?;
    Ok(match records {
        PanelRecords::Rects(panels) => panels,
        PanelRecords::Corners(corners) => panels_from_corners(&corners),
    })
}

/// Load defect points from a JSON array.
pub fn load_points_json(path: &Path) -> Result<Vec<Point>, Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// A panel with its resolved arrangement position.
#[derive(Debug, Clone)]
pub struct PlacedPanel {
    pub panel: Panel,
    pub sequence_no: u32,
    pub row: usize,
    pub col: usize,
}

/// Validated row-major panel arrangement.
#[derive(Debug, Clone)]
pub struct PanelLayout {
    placed: Vec<PlacedPanel>,
    n_cols: usize,
    n_rows: usize,
}

impl PanelLayout {
    /// Resolve sequence numbers and arrangement positions.
    ///
    /// When `n_panel_cols` is `None` the column count is the number of
    /// distinct x extents among the panels.
    pub fn new(panels: &[Panel], n_panel_cols: Option<usize>) -> Result<Self, AnalysisError> {
        if let Some(value) = n_panel_cols.filter(|&v| v == 0) {
            return Err(AnalysisError::InvalidPanelColumns { value });
        }

        let mut seen: HashMap<u32, &str> = HashMap::new();
        let mut with_seq = Vec::with_capacity(panels.len());
        for panel in panels {
            if !panel.bounds.is_valid() {
                return Err(AnalysisError::InvalidPanelBounds {
                    panel_id: panel.id.clone(),
                });
            }
            let seq = panel.sequence()?;
            if let Some(first) = seen.insert(seq, panel.id.as_str()) {
                return Err(AnalysisError::DuplicateSequence {
                    sequence_no: seq,
                    first: first.to_string(),
                    second: panel.id.clone(),
                });
            }
            with_seq.push((seq, panel));
        }
        with_seq.sort_by_key(|(seq, _)| *seq);

        let n_cols = n_panel_cols
            .unwrap_or_else(|| axis_intervals(panels.iter().map(|p| &p.bounds), Axis::X).len());
        let placed: Vec<PlacedPanel> = with_seq
            .into_iter()
            .map(|(seq, panel)| {
                let idx = (seq - 1) as usize;
                PlacedPanel {
                    panel: panel.clone(),
                    sequence_no: seq,
                    row: idx / n_cols,
                    col: idx % n_cols,
                }
            })
            .collect();
        let n_rows = placed.iter().map(|p| p.row + 1).max().unwrap_or(0);

        Ok(Self {
            placed,
            n_cols,
            n_rows,
        })
    }

    /// Panels in ascending sequence order.
    pub fn panels(&self) -> &[PlacedPanel] {
        &self.placed
    }

    pub fn n_panels(&self) -> usize {
        self.placed.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// True when every `(row, col)` slot of the arrangement holds a panel.
    pub fn is_complete(&self) -> bool {
        self.placed.len() == self.n_rows * self.n_cols
    }

    /// Bounding rectangle of all panels.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.placed.first()?.panel.bounds;
        Some(
            self.placed[1..]
                .iter()
                .fold(first, |acc, p| acc.union(&p.panel.bounds)),
        )
    }
}

fn trailing_number(id: &str) -> Option<u32> {
    let digits_start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    id[digits_start..].parse().ok()
}
