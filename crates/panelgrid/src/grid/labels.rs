//! Hierarchical labels: `a1` for a panel, `a1-b2` for one of its sub-cells.
//!
//! Columns use spreadsheet-style letters (`a..z`, then `aa`, `ab`, ...),
//! which equal the single-letter form up to index 25 and stay unique past it.
//! Rows are 1-based numbers.

/// Letters for a 0-based column index.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'a' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Label for a 0-based `(row, col)` position, e.g. `(1, 2)` → `c2`.
pub fn cell_label(row: usize, col: usize) -> String {
    format!("{}{}", column_letters(col), row + 1)
}

/// Panel label from a 1-based sequence number in a row-major arrangement.
pub fn panel_label(sequence_no: u32, n_cols: usize) -> String {
    let idx = sequence_no.saturating_sub(1) as usize;
    let n_cols = n_cols.max(1);
    cell_label(idx / n_cols, idx % n_cols)
}

/// Full sub-grid id, e.g. `b1-c3`.
pub fn sub_grid_id(panel_label: &str, sub_row: usize, sub_col: usize) -> String {
    format!("{}-{}", panel_label, cell_label(sub_row, sub_col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_letters_then_pairs() {
        assert_eq!(column_letters(0), "a");
        assert_eq!(column_letters(25), "z");
        assert_eq!(column_letters(26), "aa");
        assert_eq!(column_letters(27), "ab");
        assert_eq!(column_letters(51), "az");
        assert_eq!(column_letters(52), "ba");
        assert_eq!(column_letters(701), "zz");
        assert_eq!(column_letters(702), "aaa");
    }

    #[test]
    fn panel_labels_fill_row_major() {
        assert_eq!(panel_label(1, 8), "a1");
        assert_eq!(panel_label(8, 8), "h1");
        assert_eq!(panel_label(9, 8), "a2");
        assert_eq!(panel_label(40, 8), "h5");
    }

    #[test]
    fn sub_grid_ids_join_panel_and_cell() {
        assert_eq!(sub_grid_id("b2", 0, 0), "b2-a1");
        assert_eq!(sub_grid_id("b2", 2, 1), "b2-b3");
    }
}
