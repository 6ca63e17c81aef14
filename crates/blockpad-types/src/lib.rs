//! Shared page, block, and table types for blockpad.
//!
//! This crate is the data model: typed ids, pages, blocks, and table grids.
//! It has **no internal blockpad dependencies** — a pure leaf crate that the
//! editing engine and the session build on.
//!
//! # Model Overview
//!
//! ```text
//! Page (PageId)
//!     └── parent_id forms the page tree
//!     └── content: ordered Block list (never empty)
//!
//! Block (BlockId)
//!     └── type: BlockType (paragraph, heading1, todo, table, ...)
//!     └── content: text/HTML string, or TableContent for `table`
//!     └── checked: only meaningful for `todo`
//!
//! TableContent
//!     └── rows: TableRow (RowId) → cells: TableCell (CellId)
//! ```
//!
//! # Key Types
//!
//! | Type             | Purpose                                        |
//! |------------------|------------------------------------------------|
//! | [`Page`]         | Titled document with tree parent and blocks    |
//! | [`Block`]        | Atomic editable unit                           |
//! | [`BlockType`]    | What a block is                                |
//! | [`BlockContent`] | Text string or table grid                      |
//! | [`TableContent`] | Rectangular grid of cells                      |
//! | [`PageStatus`]   | todo / in-progress / done                      |

pub mod block;
pub mod ids;
pub mod page;
pub mod table;

// Re-export primary types at crate root for convenience.
pub use block::{Block, BlockContent, BlockType, EMPTY_PLACEHOLDER, is_blank_content};
pub use ids::{BlockId, CellId, PageId, PrefixError, RowId, resolve_page_prefix};
pub use page::{DEFAULT_TITLE, Page, PageStatus};
pub use table::{
    DEFAULT_TABLE_COLUMNS, DEFAULT_TABLE_ROWS, TableCell, TableContent, TableRow,
};
