//! Error types for document operations.
//!
//! Only addressing mistakes are errors. Operations refused to protect an
//! invariant (deleting the last table row, merging the sole block) are not —
//! they report `false`/`None` and leave the document untouched.

use thiserror::Error;

use blockpad_types::{BlockId, CellId, PageId, RowId};

/// Errors that can occur during document operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocError {
    /// Block not found in the active document.
    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),

    /// A table operation was aimed at a block that holds text.
    #[error("block {0:?} is not a table")]
    NotATable(BlockId),

    /// Row not found in the addressed table.
    #[error("row not found: {0:?}")]
    RowNotFound(RowId),

    /// Cell not found in the addressed row.
    #[error("cell not found: {0:?}")]
    CellNotFound(CellId),

    /// Grid index out of bounds.
    #[error("grid index {index} out of bounds for {len} {axis}")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        axis: &'static str,
    },

    /// Page not found in the page list.
    #[error("page not found: {0:?}")]
    PageNotFound(PageId),
}
