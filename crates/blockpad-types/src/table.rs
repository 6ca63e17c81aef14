//! Table grid types.
//!
//! A table is a rectangular grid: every row has the same cell count, and there
//! is always at least one row and one column. Row and cell ids are globally
//! unique so a surface can address a cell as `(row id, cell id)`.

use serde::{Deserialize, Serialize};

use crate::ids::{CellId, RowId};

/// Rows in a freshly inserted table.
pub const DEFAULT_TABLE_ROWS: usize = 2;

/// Columns in a freshly inserted table.
pub const DEFAULT_TABLE_COLUMNS: usize = 3;

/// One cell of a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub id: CellId,
    pub content: String,
}

impl TableCell {
    /// An empty cell with a fresh id.
    pub fn empty() -> Self {
        Self {
            id: CellId::new(),
            content: String::new(),
        }
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            id: CellId::new(),
            content: content.into(),
        }
    }
}

/// One row of a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: RowId,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// A row of `columns` empty cells, all with fresh ids.
    pub fn empty(columns: usize) -> Self {
        Self {
            id: RowId::new(),
            cells: (0..columns).map(|_| TableCell::empty()).collect(),
        }
    }
}

/// Table block payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    /// Whether the first row renders as a header row.
    pub has_headers: bool,
    pub rows: Vec<TableRow>,
}

impl TableContent {
    /// An empty `rows × columns` grid. Both dimensions are clamped to at least 1.
    pub fn grid(rows: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        Self {
            has_headers: false,
            rows: (0..rows.max(1)).map(|_| TableRow::empty(columns)).collect(),
        }
    }

    /// The grid a block gets when it is turned into a table.
    pub fn default_grid() -> Self {
        Self::grid(DEFAULT_TABLE_ROWS, DEFAULT_TABLE_COLUMNS)
    }

    /// Build from plain strings, one inner vec per row. Short rows are padded.
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut rows: Vec<TableRow> = rows
            .into_iter()
            .map(|cells| TableRow {
                id: RowId::new(),
                cells: cells.into_iter().map(TableCell::with_content).collect(),
            })
            .collect();
        if rows.is_empty() {
            rows.push(TableRow::empty(1));
        }
        let mut table = Self {
            has_headers: false,
            rows,
        };
        table.pad_to_rectangle();
        table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count, taken from the first row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Every row has the same, non-zero cell count and there is at least one row.
    pub fn is_well_formed(&self) -> bool {
        let columns = self.column_count();
        columns > 0 && self.rows.iter().all(|r| r.cells.len() == columns)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(column))
    }

    /// Grid coordinates of a cell addressed by ids.
    pub fn position(&self, row: &RowId, cell: &CellId) -> Option<(usize, usize)> {
        let r = self.rows.iter().position(|x| &x.id == row)?;
        let c = self.rows[r].cells.iter().position(|x| &x.id == cell)?;
        Some((r, c))
    }

    /// Ids of the cell at grid coordinates.
    pub fn ids_at(&self, row: usize, column: usize) -> Option<(RowId, CellId)> {
        let r = self.rows.get(row)?;
        let c = r.cells.get(column)?;
        Some((r.id.clone(), c.id.clone()))
    }

    /// Pad short rows with empty cells up to the widest row (minimum 1 column).
    ///
    /// Returns the number of cells added.
    pub fn pad_to_rectangle(&mut self) -> usize {
        let width = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0).max(1);
        let mut added = 0;
        for row in &mut self.rows {
            while row.cells.len() < width {
                row.cells.push(TableCell::empty());
                added += 1;
            }
        }
        added
    }
}

impl Default for TableContent {
    fn default() -> Self {
        Self::default_grid()
    }
}

// ============================================================================
// Tests
// ============================================================================
