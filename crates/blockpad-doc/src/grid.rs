//! Table grid editor.
//!
//! The free functions are pure: they take a grid and return the next grid, or
//! `None` when the edit is refused (out of range, or it would leave the table
//! without a row or a column). The `BlockDocument` methods wrap them and commit
//! the result into the owning table block.
//!
//! Cell edits land directly in `rows[r].cells[c].content`. They never go
//! through the whole-block content baselines, since a table is not a
//! string-content block.

use tracing::debug;

use blockpad_types::{BlockContent, BlockId, CellId, RowId, TableCell, TableContent, TableRow};

use crate::surface::FocusTarget;
use crate::{BlockDocument, DocError, Result};

/// Direction of Tab navigation between cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabDirection {
    /// Tab: left to right, then down.
    Forward,
    /// Shift+Tab.
    Backward,
}

/// Insert an empty row right after `index`, as wide as the table.
pub fn insert_row_after(grid: &TableContent, index: usize) -> Option<TableContent> {
    if index >= grid.row_count() {
        return None;
    }
    let mut next = grid.clone();
    next.rows.insert(index + 1, TableRow::empty(grid.column_count().max(1)));
    Some(next)
}

/// Insert an empty cell after column `index` in every row.
pub fn insert_column_after(grid: &TableContent, index: usize) -> Option<TableContent> {
    if index >= grid.column_count() {
        return None;
    }
    let mut next = grid.clone();
    for row in &mut next.rows {
        let at = (index + 1).min(row.cells.len());
        row.cells.insert(at, TableCell::empty());
    }
    Some(next)
}

/// Remove row `index`. Refused for the last remaining row.
pub fn delete_row(grid: &TableContent, index: usize) -> Option<TableContent> {
    if grid.row_count() <= 1 || index >= grid.row_count() {
        return None;
    }
    let mut next = grid.clone();
    next.rows.remove(index);
    Some(next)
}

/// Remove column `index` from every row. Refused for the last remaining column.
pub fn delete_column(grid: &TableContent, index: usize) -> Option<TableContent> {
    if grid.column_count() <= 1 || index >= grid.column_count() {
        return None;
    }
    let mut next = grid.clone();
    for row in &mut next.rows {
        if index < row.cells.len() {
            row.cells.remove(index);
        }
    }
    Some(next)
}

/// Replace one cell's content. `None` if the cell does not exist.
pub fn set_cell(grid: &TableContent, row: usize, column: usize, text: &str) -> Option<TableContent> {
    grid.cell(row, column)?;
    let mut next = grid.clone();
    next.rows[row].cells[column].content = text.to_string();
    Some(next)
}

/// Coordinates of the cell Tab (or Shift+Tab) moves to.
///
/// Wraps across rows. Tab in the last cell and Shift+Tab in the first cell
/// go nowhere; no row is created.
pub fn neighbor(
    grid: &TableContent,
    (row, column): (usize, usize),
    direction: TabDirection,
) -> Option<(usize, usize)> {
    let columns = grid.rows.get(row)?.cells.len();
    if column >= columns {
        return None;
    }
    match direction {
        TabDirection::Forward => {
            if column + 1 < columns {
                Some((row, column + 1))
            } else if row + 1 < grid.row_count() {
                Some((row + 1, 0))
            } else {
                None
            }
        }
        TabDirection::Backward => {
            if column > 0 {
                Some((row, column - 1))
            } else if row > 0 {
                let prev = grid.rows[row - 1].cells.len();
                prev.checked_sub(1).map(|c| (row - 1, c))
            } else {
                None
            }
        }
    }
}

impl BlockDocument {
    /// Index and grid of a table block.
    fn table_at(&self, id: &BlockId) -> Result<(usize, &TableContent)> {
        let idx = self.index_of(id)?;
        match &self.blocks()[idx].content {
            BlockContent::Table(grid) => Ok((idx, grid)),
            BlockContent::Text(_) => Err(DocError::NotATable(id.clone())),
        }
    }

    fn commit_grid(&mut self, idx: usize, grid: TableContent) {
        self.commit_with(idx, |b| b.content = BlockContent::Table(grid));
    }

    /// Focus target of the cell at grid coordinates.
    pub fn cell_target(&self, id: &BlockId, row: usize, column: usize) -> Result<FocusTarget> {
        let (_, grid) = self.table_at(id)?;
        let (row_id, cell_id) = grid.ids_at(row, column).ok_or(DocError::IndexOutOfBounds {
            index: row,
            len: grid.row_count(),
            axis: "row",
        })?;
        Ok(FocusTarget::cell(id.clone(), row_id, cell_id))
    }

    /// Grid coordinates of a cell addressed by ids.
    pub fn cell_position(&self, id: &BlockId, row: &RowId, cell: &CellId) -> Result<(usize, usize)> {
        let (_, grid) = self.table_at(id)?;
        if !grid.rows.iter().any(|r| &r.id == row) {
            return Err(DocError::RowNotFound(row.clone()));
        }
        grid.position(row, cell)
            .ok_or_else(|| DocError::CellNotFound(cell.clone()))
    }

    /// Insert a row after `after`; returns the new row's first cell.
    pub fn insert_row(&mut self, id: &BlockId, after: usize) -> Result<FocusTarget> {
        let (idx, grid) = self.table_at(id)?;
        let next = insert_row_after(grid, after).ok_or(DocError::IndexOutOfBounds {
            index: after,
            len: grid.row_count(),
            axis: "row",
        })?;
        debug!("table {}: insert row after {}", id, after);
        self.commit_grid(idx, next);
        self.cell_target(id, after + 1, 0)
    }

    /// Insert a column after `after`; returns the new column's cell in row 0.
    pub fn insert_column(&mut self, id: &BlockId, after: usize) -> Result<FocusTarget> {
        let (idx, grid) = self.table_at(id)?;
        let next = insert_column_after(grid, after).ok_or(DocError::IndexOutOfBounds {
            index: after,
            len: grid.column_count(),
            axis: "column",
        })?;
        debug!("table {}: insert column after {}", id, after);
        self.commit_grid(idx, next);
        self.cell_target(id, 0, after + 1)
    }

    /// Delete a row. `Ok(false)` if refused (last row or out of range).
    pub fn delete_row(&mut self, id: &BlockId, row: usize) -> Result<bool> {
        let (idx, grid) = self.table_at(id)?;
        match delete_row(grid, row) {
            Some(next) => {
                self.commit_grid(idx, next);
                Ok(true)
            }
            None => {
                debug!("table {}: refused to delete row {}", id, row);
                Ok(false)
            }
        }
    }

    /// Delete a column. `Ok(false)` if refused (last column or out of range).
    pub fn delete_column(&mut self, id: &BlockId, column: usize) -> Result<bool> {
        let (idx, grid) = self.table_at(id)?;
        match delete_column(grid, column) {
            Some(next) => {
                self.commit_grid(idx, next);
                Ok(true)
            }
            None => {
                debug!("table {}: refused to delete column {}", id, column);
                Ok(false)
            }
        }
    }

    /// Commit a cell's blurred text. `Ok(false)` if it was already current.
    pub fn set_cell_text(
        &mut self,
        id: &BlockId,
        row: &RowId,
        cell: &CellId,
        text: &str,
    ) -> Result<bool> {
        let (r, c) = self.cell_position(id, row, cell)?;
        let (idx, grid) = self.table_at(id)?;
        if grid.rows[r].cells[c].content == text {
            return Ok(false);
        }
        let next = set_cell(grid, r, c, text).ok_or_else(|| DocError::CellNotFound(cell.clone()))?;
        self.commit_grid(idx, next);
        Ok(true)
    }

    /// Toggle the header row flag.
    pub fn set_table_headers(&mut self, id: &BlockId, has_headers: bool) -> Result<bool> {
        let (idx, grid) = self.table_at(id)?;
        if grid.has_headers == has_headers {
            return Ok(false);
        }
        let mut next = grid.clone();
        next.has_headers = has_headers;
        self.commit_grid(idx, next);
        Ok(true)
    }

    /// Cell that Tab or Shift+Tab moves to from the given cell, if any.
    pub fn tab_from(
        &self,
        id: &BlockId,
        row: &RowId,
        cell: &CellId,
        direction: TabDirection,
    ) -> Result<Option<FocusTarget>> {
        let at = self.cell_position(id, row, cell)?;
        let (_, grid) = self.table_at(id)?;
        Ok(neighbor(grid, at, direction)
            .and_then(|(r, c)| grid.ids_at(r, c))
            .map(|(row, cell)| FocusTarget::cell(id.clone(), row, cell)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use blockpad_types::{Block, PageId};

    fn grid_strings(grid: &TableContent) -> Vec<Vec<&str>> {
        grid.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.content.as_str()).collect())
            .collect()
    }

    fn table_doc(rows: Vec<Vec<&str>>) -> (BlockDocument, BlockId) {
        let block = Block::table(TableContent::from_strings(rows)).with_id("t");
        let id = block.id.clone();
        (BlockDocument::new(PageId::from("p"), vec![block]), id)
    }

    fn grid_of(doc: &BlockDocument, id: &BlockId) -> TableContent {
        doc.get(id).and_then(|b| b.grid()).cloned().unwrap()
    }

    // ── Pure grid edits ─────────────────────────────────────────────────

    #[test]
    fn test_insert_row_matches_column_count() {
        let grid = TableContent::from_strings(vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
        let next = insert_row_after(&grid, 0).unwrap();
        assert_eq!(
            grid_strings(&next),
            vec![vec!["a", "b", "c"], vec!["", "", ""], vec!["d", "e", "f"]]
        );
        assert!(next.is_well_formed());
        // Fresh ids.
        assert_ne!(next.rows[1].id, grid.rows[1].id);
        // Input untouched.
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn test_insert_column_after_index() {
        let grid = TableContent::from_strings(vec![vec!["a", "b"], vec!["c", "d"]]);
        let next = insert_column_after(&grid, 0).unwrap();
        assert_eq!(grid_strings(&next), vec![vec!["a", "", "b"], vec!["c", "", "d"]]);
        assert_ne!(next.rows[0].cells[1].id, next.rows[1].cells[1].id);
    }

    #[test]
    fn test_delete_last_row_or_column_refused() {
        let one_row = TableContent::from_strings(vec![vec!["a", "b"]]);
        assert!(delete_row(&one_row, 0).is_none());

        let one_col = TableContent::from_strings(vec![vec!["a"], vec!["b"]]);
        assert!(delete_column(&one_col, 0).is_none());

        let next = delete_row(&one_col, 1).unwrap();
        assert_eq!(grid_strings(&next), vec![vec!["a"]]);
    }

    #[test]
    fn test_out_of_range_edits_refused() {
        let grid = TableContent::grid(2, 2);
        assert!(insert_row_after(&grid, 5).is_none());
        assert!(insert_column_after(&grid, 2).is_none());
        assert!(delete_column(&grid, 9).is_none());
        assert!(set_cell(&grid, 2, 0, "x").is_none());
    }

    #[test]
    fn test_tab_order_wraps_rows() {
        let grid = TableContent::grid(2, 2);
        let fwd = TabDirection::Forward;
        assert_eq!(neighbor(&grid, (0, 0), fwd), Some((0, 1)));
        assert_eq!(neighbor(&grid, (0, 1), fwd), Some((1, 0)));
        assert_eq!(neighbor(&grid, (1, 1), fwd), None);

        let back = TabDirection::Backward;
        assert_eq!(neighbor(&grid, (1, 0), back), Some((0, 1)));
        assert_eq!(neighbor(&grid, (0, 0), back), None);
    }

    // ── Document wrappers ───────────────────────────────────────────────

    #[test]
    fn test_doc_insert_row_focuses_first_new_cell() {
        let (mut doc, id) = table_doc(vec![vec!["a", "b"]]);
        let target = doc.insert_row(&id, 0).unwrap();
        let grid = grid_of(&doc, &id);
        let (row, cell) = grid.ids_at(1, 0).unwrap();
        assert_eq!(target, FocusTarget::cell(id.clone(), row, cell));
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_doc_delete_last_row_leaves_grid_unchanged() {
        let (mut doc, id) = table_doc(vec![vec!["a", "b", "c"]]);
        assert!(!doc.delete_row(&id, 0).unwrap());
        let grid = grid_of(&doc, &id);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_doc_delete_column() {
        let (mut doc, id) = table_doc(vec![vec!["a", "b"], vec!["c", "d"]]);
        assert!(doc.delete_column(&id, 0).unwrap());
        assert_eq!(grid_strings(&grid_of(&doc, &id)), vec![vec!["b"], vec!["d"]]);
        assert!(!doc.delete_column(&id, 0).unwrap());
    }

    #[test]
    fn test_set_cell_text_by_ids() {
        let (mut doc, id) = table_doc(vec![vec!["a", "b"], vec!["c", "d"]]);
        let (row, cell) = grid_of(&doc, &id).ids_at(1, 1).unwrap();
        assert!(doc.set_cell_text(&id, &row, &cell, "D").unwrap());
        assert!(!doc.set_cell_text(&id, &row, &cell, "D").unwrap());
        assert_eq!(grid_of(&doc, &id).cell(1, 1).unwrap().content, "D");
    }

    #[test]
    fn test_set_cell_text_unknown_row() {
        let (mut doc, id) = table_doc(vec![vec!["a"]]);
        let err = doc
            .set_cell_text(&id, &RowId::from("nope"), &CellId::from("x"), "v")
            .unwrap_err();
        assert_eq!(err, DocError::RowNotFound(RowId::from("nope")));
    }

    #[test]
    fn test_grid_ops_on_text_block_fail() {
        let mut doc = BlockDocument::new(PageId::from("p"), vec![Block::paragraph("x").with_id("b")]);
        let err = doc.insert_row(&BlockId::from("b"), 0).unwrap_err();
        assert_eq!(err, DocError::NotATable(BlockId::from("b")));
    }

    #[test]
    fn test_tab_from_last_cell_is_noop() {
        let (doc, id) = table_doc(vec![vec!["a", "b"], vec!["c", "d"]]);
        let grid = grid_of(&doc, &id);
        let (row, cell) = grid.ids_at(1, 1).unwrap();
        assert_eq!(doc.tab_from(&id, &row, &cell, TabDirection::Forward).unwrap(), None);

        let prev = doc.tab_from(&id, &row, &cell, TabDirection::Backward).unwrap();
        let (r, c) = grid.ids_at(1, 0).unwrap();
        assert_eq!(prev, Some(FocusTarget::cell(id.clone(), r, c)));
    }

    #[test]
    fn test_headers_flag() {
        let (mut doc, id) = table_doc(vec![vec!["a"]]);
        assert!(doc.set_table_headers(&id, true).unwrap());
        assert!(grid_of(&doc, &id).has_headers);
        assert!(!doc.set_table_headers(&id, true).unwrap());
    }
}
