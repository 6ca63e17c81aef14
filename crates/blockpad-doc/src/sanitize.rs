//! Defensive snapshot loading.
//!
//! A snapshot is a JSON array of pages. Loading never rejects a page for a
//! bad field: every field of the wrong runtime type is replaced by its
//! default, and each coercion is recorded as a note (and logged at `warn`).
//!
//! | Input                               | Result                                  |
//! |-------------------------------------|-----------------------------------------|
//! | unknown block `type`                | `paragraph`                             |
//! | string page `content`               | one paragraph per line                  |
//! | non-array page `content`            | one empty paragraph                     |
//! | non-string text content             | `""`                                    |
//! | legacy table `{ cells: [[..]] }`    | `rows` of `cells` with fresh ids        |
//! | ragged table rows                   | padded to the widest row                |
//! | missing or duplicate id             | fresh id                                |
//! | numeric id                          | the number as a string                  |
//! | empty `parentId`                    | top level                               |
//! | dangling or cyclic `parentId`       | detached to the top level               |
//!
//! Well-formed input passes through unchanged and produces no notes.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use blockpad_types::{
    Block, BlockContent, BlockId, BlockType, CellId, DEFAULT_TITLE, Page, PageId, PageStatus, RowId,
    TableCell, TableContent, TableRow,
};

use crate::page_tree::repair_parents;

/// Sanitized pages plus a description of every coercion applied.
#[derive(Clone, Debug, Default)]
pub struct Sanitized {
    pub pages: Vec<Page>,
    pub notes: Vec<String>,
}

impl Sanitized {
    /// True if the input was already well-formed.
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Parse snapshot text. Only a JSON syntax error fails; everything else is coerced.
pub fn parse_snapshot(text: &str) -> serde_json::Result<Sanitized> {
    let value: Value = serde_json::from_str(text)?;
    Ok(sanitize_snapshot(&value))
}

/// Sanitize an already-parsed snapshot value.
pub fn sanitize_snapshot(value: &Value) -> Sanitized {
    let mut s = Sanitizer::default();
    let mut pages = match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| s.page(i, item))
            .collect(),
        other => {
            s.note(format!("snapshot is a {}, not an array; no pages loaded", kind_of(other)));
            Vec::new()
        }
    };
    for note in repair_parents(&mut pages) {
        s.note(note);
    }
    Sanitized {
        pages,
        notes: s.notes,
    }
}

/// Sanitize a single page value (an import of one page).
pub fn sanitize_page(value: &Value) -> (Page, Vec<String>) {
    let mut s = Sanitizer::default();
    let page = s.page(0, value).unwrap_or_default();
    (page, s.notes)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Default)]
struct Sanitizer {
    page_ids: HashSet<String>,
    block_ids: HashSet<String>,
    row_ids: HashSet<String>,
    cell_ids: HashSet<String>,
    notes: Vec<String>,
}

/// Claim `raw` in `seen`, or mint a fresh id if it is missing, empty or taken.
///
/// A numeric id is kept as its string form but still reported.
fn claim<T>(seen: &mut HashSet<String>, raw: Option<&Value>) -> (T, Option<&'static str>)
where
    T: From<String> + AsRef<str> + Default,
{
    let candidate = match raw {
        Some(Value::String(s)) if !s.is_empty() => Some((s.clone(), None)),
        Some(Value::Number(n)) => Some((n.to_string(), Some("numeric"))),
        _ => None,
    };
    let why = match candidate {
        Some((s, why)) if seen.insert(s.clone()) => return (T::from(s), why),
        Some(_) => "duplicate",
        None => "missing",
    };
    let id = T::default();
    seen.insert(id.as_ref().to_string());
    (id, Some(why))
}

fn opt_string(value: Option<&Value>) -> Result<Option<String>, &'static str> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(kind_of(other)),
    }
}

impl Sanitizer {
    fn note(&mut self, note: String) {
        warn!("snapshot: {}", note);
        self.notes.push(note);
    }

    fn page(&mut self, index: usize, value: &Value) -> Option<Page> {
        let Value::Object(obj) = value else {
            self.note(format!("page #{index}: {} is not an object; skipped", kind_of(value)));
            return None;
        };

        let (id, why): (PageId, _) = claim(&mut self.page_ids, obj.get("id"));
        if let Some(why) = why {
            self.note(format!("page #{index}: {why} id, assigned {id}"));
        }

        let title = match obj.get("title") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => {
                self.note(format!("page {id}: missing title"));
                DEFAULT_TITLE.to_string()
            }
            Some(other) => {
                self.note(format!("page {id}: title is a {}", kind_of(other)));
                DEFAULT_TITLE.to_string()
            }
        };

        let icon = self.optional_field(&id, obj, "icon");
        let due_date = self.optional_field(&id, obj, "dueDate");
        let parent_id = match self.optional_field(&id, obj, "parentId") {
            Some(raw) => {
                let parent = PageId::parse(raw);
                if parent.is_none() {
                    self.note(format!("page {id}: empty parentId, moved to the top level"));
                }
                parent
            }
            None => None,
        };

        let status = match opt_string(obj.get("status")) {
            Ok(None) => None,
            Ok(Some(s)) => {
                let status = PageStatus::from_str(&s);
                if status.is_none() {
                    self.note(format!("page {id}: unknown status {s:?}"));
                }
                status
            }
            Err(kind) => {
                self.note(format!("page {id}: status is a {kind}"));
                None
            }
        };

        let mut content = self.page_content(&id, obj.get("content"));
        if content.is_empty() {
            self.note(format!("page {id}: empty content, added a paragraph"));
            content.push(Block::empty_paragraph());
        }

        Some(Page {
            id,
            title,
            icon,
            parent_id,
            due_date,
            status,
            content,
        })
    }

    fn optional_field(&mut self, id: &PageId, obj: &Map<String, Value>, key: &str) -> Option<String> {
        match opt_string(obj.get(key)) {
            Ok(v) => v,
            Err(kind) => {
                self.note(format!("page {id}: {key} is a {kind}"));
                None
            }
        }
    }

    fn page_content(&mut self, id: &PageId, value: Option<&Value>) -> Vec<Block> {
        match value {
            Some(Value::Array(items)) => items.iter().map(|b| self.block(id, b)).collect(),
            Some(Value::String(legacy)) => {
                self.note(format!("page {id}: migrated string content to paragraphs"));
                legacy.lines().map(|line| self.fresh_block(Block::paragraph(line))).collect()
            }
            None | Some(Value::Null) => {
                self.note(format!("page {id}: missing content"));
                Vec::new()
            }
            Some(other) => {
                self.note(format!("page {id}: content is a {}", kind_of(other)));
                Vec::new()
            }
        }
    }

    /// Register a constructed block's fresh id.
    fn fresh_block(&mut self, block: Block) -> Block {
        self.block_ids.insert(block.id.as_str().to_string());
        block
    }

    fn block(&mut self, page: &PageId, value: &Value) -> Block {
        let obj = match value {
            Value::Object(obj) => obj,
            Value::String(text) => {
                self.note(format!("page {page}: bare string block wrapped in a paragraph"));
                return self.fresh_block(Block::paragraph(text.as_str()));
            }
            other => {
                self.note(format!("page {page}: {} block replaced by a paragraph", kind_of(other)));
                return self.fresh_block(Block::empty_paragraph());
            }
        };

        let (id, why): (BlockId, _) = claim(&mut self.block_ids, obj.get("id"));
        if let Some(why) = why {
            self.note(format!("page {page}: {why} block id, assigned {id}"));
        }

        let kind = match obj.get("type") {
            Some(Value::String(s)) => match BlockType::from_str(s) {
                Some(kind) => {
                    if kind.as_str() != s {
                        self.note(format!("block {id}: type {s:?} read as {kind}"));
                    }
                    kind
                }
                None => {
                    self.note(format!("block {id}: unknown type {s:?}, using paragraph"));
                    BlockType::Paragraph
                }
            },
            other => {
                self.note(format!(
                    "block {id}: type is {}, using paragraph",
                    other.map(kind_of).unwrap_or("missing")
                ));
                BlockType::Paragraph
            }
        };

        let content = match kind {
            BlockType::Table => BlockContent::Table(self.table(&id, obj.get("content"))),
            _ => BlockContent::Text(self.text_content(&id, kind, obj.get("content"))),
        };

        let checked = match (kind, obj.get("checked")) {
            (BlockType::Todo, Some(Value::Bool(b))) => Some(*b),
            (BlockType::Todo, None | Some(Value::Null)) => None,
            (BlockType::Todo, Some(other)) => {
                self.note(format!("block {id}: checked is a {}", kind_of(other)));
                Some(false)
            }
            (_, None | Some(Value::Null)) => None,
            (_, Some(_)) => {
                self.note(format!("block {id}: dropped checked on a {kind}"));
                None
            }
        };

        Block {
            id,
            kind,
            content,
            checked,
        }
    }

    fn text_content(&mut self, id: &BlockId, kind: BlockType, value: Option<&Value>) -> String {
        let text = match value {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => {
                self.note(format!("block {id}: {} content on a {kind}, emptied", kind_of(other)));
                String::new()
            }
        };
        if kind == BlockType::Divider && !text.is_empty() {
            self.note(format!("block {id}: divider content emptied"));
            return String::new();
        }
        text
    }

    fn table(&mut self, id: &BlockId, value: Option<&Value>) -> TableContent {
        let (has_headers, rows) = match value {
            Some(Value::Object(obj)) => {
                let has_headers = matches!(obj.get("hasHeaders"), Some(Value::Bool(true)));
                let rows: Vec<TableRow> = match (obj.get("rows"), obj.get("cells")) {
                    (Some(Value::Array(rows)), _) => {
                        rows.iter().map(|r| self.table_row(id, r)).collect()
                    }
                    (_, Some(Value::Array(legacy))) => {
                        self.note(format!("block {id}: upgraded legacy cells table"));
                        legacy.iter().map(|r| self.legacy_row(r)).collect()
                    }
                    _ => {
                        self.note(format!("block {id}: table without rows"));
                        Vec::new()
                    }
                };
                (has_headers, rows)
            }
            Some(Value::Array(legacy)) => {
                self.note(format!("block {id}: upgraded bare array table"));
                (false, legacy.iter().map(|r| self.legacy_row(r)).collect())
            }
            other => {
                self.note(format!(
                    "block {id}: table content is {}, using default grid",
                    other.map(kind_of).unwrap_or("missing")
                ));
                return self.register_grid(TableContent::default_grid());
            }
        };

        let mut grid = TableContent { has_headers, rows };
        if grid.rows.is_empty() {
            grid.rows.push(TableRow::empty(1));
        }
        let padded = grid.pad_to_rectangle();
        if padded > 0 {
            self.note(format!("block {id}: padded ragged table with {padded} cells"));
        }
        self.register_grid(grid)
    }

    /// Record ids minted by grid constructors or padding.
    fn register_grid(&mut self, grid: TableContent) -> TableContent {
        for row in &grid.rows {
            self.row_ids.insert(row.id.as_str().to_string());
            for cell in &row.cells {
                self.cell_ids.insert(cell.id.as_str().to_string());
            }
        }
        grid
    }

    fn table_row(&mut self, block: &BlockId, value: &Value) -> TableRow {
        let Value::Object(obj) = value else {
            // A bare array in `rows` is a row of cells without ids.
            return self.legacy_row(value);
        };
        let (id, why): (RowId, _) = claim(&mut self.row_ids, obj.get("id"));
        if let Some(why) = why {
            self.note(format!("block {block}: {why} row id, assigned {id}"));
        }
        let cells = match obj.get("cells") {
            Some(Value::Array(cells)) => cells.iter().map(|c| self.table_cell(block, c)).collect(),
            _ => {
                self.note(format!("block {block}: row {id} without cells"));
                Vec::new()
            }
        };
        TableRow { id, cells }
    }

    fn table_cell(&mut self, block: &BlockId, value: &Value) -> TableCell {
        let Value::Object(obj) = value else {
            self.note(format!("block {block}: bare cell value given an id"));
            return TableCell::with_content(cell_text(value));
        };
        let (id, why): (CellId, _) = claim(&mut self.cell_ids, obj.get("id"));
        if let Some(why) = why {
            self.note(format!("block {block}: {why} cell id, assigned {id}"));
        }
        let content = match obj.get("content") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => {
                self.note(format!("block {block}: cell {id} content is a {}", kind_of(other)));
                String::new()
            }
        };
        TableCell { id, content }
    }

    /// A row from the legacy array-of-arrays format.
    fn legacy_row(&mut self, value: &Value) -> TableRow {
        let cells = match value {
            Value::Array(cells) => cells
                .iter()
                .map(|c| TableCell::with_content(cell_text(c)))
                .collect(),
            other => vec![TableCell::with_content(cell_text(other))],
        };
        TableRow {
            id: RowId::new(),
            cells,
        }
    }
}

/// Legacy cell values: strings as-is, scalars stringified, anything else empty.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(obj) => match obj.get("content") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        },
        Value::Null | Value::Array(_) => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sanitize(value: Value) -> Sanitized {
        sanitize_snapshot(&value)
    }

    // ── Well-formed input ───────────────────────────────────────────────

    #[test]
    fn test_well_formed_round_trip() {
        let grid = TableContent::from_strings(vec![vec!["a", "b"], vec!["c", "d"]]);
        let pages = vec![
            Page::new("Home").with_id("home").with_content(vec![
                Block::paragraph("hello").with_id("b1"),
                Block::todo("task", true).with_id("b2"),
                Block::table(grid).with_id("b3"),
                Block::new(BlockType::Divider, "").with_id("b4"),
                Block {
                    checked: None,
                    ..Block::todo("never toggled", false).with_id("b5")
                },
            ]),
            Page {
                icon: Some("📓".into()),
                due_date: Some("2024-05-01".into()),
                status: Some(PageStatus::InProgress),
                ..Page::new("Child").with_id("child").with_parent(Some(PageId::from("home")))
            },
        ];

        let text = serde_json::to_string(&pages).unwrap();
        let loaded = parse_snapshot(&text).unwrap();
        assert!(loaded.is_clean(), "unexpected notes: {:?}", loaded.notes);
        assert_eq!(loaded.pages, pages);
        assert!(!loaded.pages[0].content[4].is_checked());
    }

    #[test]
    fn test_syntax_error_is_an_error() {
        assert!(parse_snapshot("[{").is_err());
    }

    // ── Coercions ───────────────────────────────────────────────────────

    #[test]
    fn test_unknown_type_becomes_paragraph() {
        let s = sanitize(json!([{
            "id": "p", "title": "T",
            "content": [{ "id": "b", "type": "hologram", "content": "x" }]
        }]));
        let block = &s.pages[0].content[0];
        assert_eq!(block.kind, BlockType::Paragraph);
        assert_eq!(block.text(), Some("x"));
        assert_eq!(s.notes.len(), 1);
    }

    #[test]
    fn test_legacy_string_content_splits_lines() {
        let s = sanitize(json!([{ "id": "p", "title": "T", "content": "one\ntwo\nthree" }]));
        let texts: Vec<_> = s.pages[0].content.iter().map(|b| b.text().unwrap()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!(s.pages[0].content.iter().all(|b| b.kind == BlockType::Paragraph));
    }

    #[test]
    fn test_missing_content_gets_one_paragraph() {
        let s = sanitize(json!([{ "id": "p", "title": "T", "content": 42 }]));
        assert_eq!(s.pages[0].content.len(), 1);
        assert!(s.pages[0].content[0].is_blank());
    }

    #[test]
    fn test_legacy_cells_table_upgraded() {
        let s = sanitize(json!([{
            "id": "p", "title": "T",
            "content": [{ "id": "t", "type": "table", "content": { "cells": [["a", "b"], ["c"]] } }]
        }]));
        let grid = s.pages[0].content[0].grid().unwrap();
        assert!(grid.is_well_formed());
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.cell(1, 0).unwrap().content, "c");
        assert_eq!(grid.cell(1, 1).unwrap().content, "");
    }

    #[test]
    fn test_table_content_on_text_block_emptied() {
        let s = sanitize(json!([{
            "id": "p", "title": "T",
            "content": [{ "id": "b", "type": "paragraph", "content": { "rows": [] } }]
        }]));
        assert_eq!(s.pages[0].content[0].text(), Some(""));
    }

    #[test]
    fn test_string_content_on_table_gets_default_grid() {
        let s = sanitize(json!([{
            "id": "p", "title": "T",
            "content": [{ "id": "t", "type": "table", "content": "oops" }]
        }]));
        let grid = s.pages[0].content[0].grid().unwrap();
        assert_eq!((grid.row_count(), grid.column_count()), (2, 3));
    }

    #[test]
    fn test_wrong_field_types_use_defaults() {
        let s = sanitize(json!([{
            "id": "p", "title": 7, "icon": [], "status": "someday", "dueDate": false,
            "content": [{ "id": "b", "type": "todo", "content": "x", "checked": "yes" }]
        }]));
        let page = &s.pages[0];
        assert_eq!(page.title, DEFAULT_TITLE);
        assert_eq!(page.icon, None);
        assert_eq!(page.status, None);
        assert_eq!(page.due_date, None);
        assert_eq!(page.content[0].checked, Some(false));
        assert_eq!(s.notes.len(), 5);
    }

    #[test]
    fn test_duplicate_and_missing_ids_regenerated() {
        let s = sanitize(json!([
            { "id": "p", "title": "A", "content": [
                { "id": "b", "type": "paragraph", "content": "1" },
                { "id": "b", "type": "paragraph", "content": "2" },
                { "type": "paragraph", "content": "3" }
            ]},
            { "id": "p", "title": "B", "content": [] }
        ]));
        let blocks = &s.pages[0].content;
        assert_eq!(blocks[0].id, BlockId::from("b"));
        assert_ne!(blocks[1].id, BlockId::from("b"));
        assert_ne!(blocks[2].id, blocks[1].id);
        assert_ne!(s.pages[1].id, PageId::from("p"));
    }

    #[test]
    fn test_numeric_ids_kept_as_strings_and_reported() {
        let s = sanitize(json!([{
            "id": 7, "title": "T",
            "content": [{ "id": 42, "type": "paragraph", "content": "x" }]
        }]));
        assert_eq!(s.pages[0].id, PageId::from("7"));
        assert_eq!(s.pages[0].content[0].id, BlockId::from("42"));
        assert_eq!(s.notes.len(), 2);
        assert!(s.notes.iter().all(|n| n.contains("numeric")));
    }

    #[test]
    fn test_empty_parent_id_reported() {
        let s = sanitize(json!([{ "id": "p", "title": "T", "parentId": "", "content": [
            { "id": "b", "type": "paragraph", "content": "" }
        ]}]));
        assert!(s.pages[0].is_root());
        assert_eq!(s.notes, vec!["page p: empty parentId, moved to the top level".to_string()]);
    }

    #[test]
    fn test_non_array_snapshot_loads_nothing() {
        let s = sanitize(json!({ "pages": [] }));
        assert!(s.pages.is_empty());
        assert_eq!(s.notes.len(), 1);
    }

    #[test]
    fn test_non_object_pages_skipped() {
        let s = sanitize(json!([1, null, { "id": "p", "title": "ok", "content": [] }]));
        assert_eq!(s.pages.len(), 1);
        assert_eq!(s.pages[0].title, "ok");
    }

    #[test]
    fn test_checked_dropped_on_non_todo() {
        let s = sanitize(json!([{
            "id": "p", "title": "T",
            "content": [{ "id": "b", "type": "paragraph", "content": "", "checked": true }]
        }]));
        assert_eq!(s.pages[0].content[0].checked, None);
    }

    #[test]
    fn test_dangling_parent_detached() {
        let s = sanitize(json!([{ "id": "p", "title": "T", "parentId": "ghost", "content": [] }]));
        assert!(s.pages[0].is_root());
    }

    #[test]
    fn test_arbitrary_values_never_panic() {
        let samples = [
            json!(null),
            json!("text"),
            json!([[], {}, "x", 3.5, true]),
            json!([{ "content": [null, 1, [], { "type": 5, "content": {} }] }]),
            json!([{ "content": [{ "type": "table", "content": { "rows": [1, [2, 3], { "cells": "x" }] } }] }]),
            json!([{ "content": [{ "type": "table", "content": [] }] }]),
        ];
        for value in samples {
            let s = sanitize_snapshot(&value);
            for page in &s.pages {
                assert!(!page.content.is_empty());
                assert!(page.content.iter().all(Block::is_consistent));
            }
        }
    }

    #[test]
    fn test_sanitize_single_page() {
        let (page, notes) = sanitize_page(&json!({ "title": "Solo", "content": "a" }));
        assert_eq!(page.title, "Solo");
        assert_eq!(page.content.len(), 1);
        assert_eq!(notes.len(), 2);
    }
}
