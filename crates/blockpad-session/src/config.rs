//! Editor timing and default configuration.
//!
//! Loaded from RON; every field is optional and falls back to its default:
//!
//! ```ron
//! (
//!     title_debounce_ms: 500,
//!     content_debounce_ms: 500,
//!     todo_removal_ms: 300,
//!     table_focus_ms: 50,
//!     table_rows: 2,
//!     table_columns: 3,
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use blockpad_types::{DEFAULT_TABLE_COLUMNS, DEFAULT_TABLE_ROWS};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last title edit before it is saved.
    pub title_debounce_ms: u64,
    /// Quiet period after the last content change before it is saved.
    pub content_debounce_ms: u64,
    /// How long a checked to-do stays visible before it is removed.
    pub todo_removal_ms: u64,
    /// Delay before focusing the first cell of a freshly created table.
    pub table_focus_ms: u64,
    pub table_rows: usize,
    pub table_columns: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            title_debounce_ms: 500,
            content_debounce_ms: 500,
            todo_removal_ms: 300,
            table_focus_ms: 50,
            table_rows: DEFAULT_TABLE_ROWS,
            table_columns: DEFAULT_TABLE_COLUMNS,
        }
    }
}

impl EditorConfig {
    /// Parse from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(text)?;
        Ok(config.clamped())
    }

    /// Read and parse a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Table dimensions of at least 1×1.
    fn clamped(mut self) -> Self {
        self.table_rows = self.table_rows.max(1);
        self.table_columns = self.table_columns.max(1);
        self
    }

    pub fn title_debounce(&self) -> Duration {
        Duration::from_millis(self.title_debounce_ms)
    }

    pub fn content_debounce(&self) -> Duration {
        Duration::from_millis(self.content_debounce_ms)
    }

    pub fn todo_removal(&self) -> Duration {
        Duration::from_millis(self.todo_removal_ms)
    }

    pub fn table_focus(&self) -> Duration {
        Duration::from_millis(self.table_focus_ms)
    }

    /// `(rows, columns)` for a block retyped to a table.
    pub fn table_size(&self) -> (usize, usize) {
        (self.table_rows.max(1), self.table_columns.max(1))
    }
}
