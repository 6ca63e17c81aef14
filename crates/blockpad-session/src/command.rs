//! User gestures, as commands routed to the editor.
//!
//! A host translates its input events (key presses, clicks, pointer moves,
//! picker results) into these and hands them to
//! [`Editor::dispatch`](crate::Editor::dispatch). Keyboard commands act on the
//! element that currently holds focus.

use blockpad_doc::{FocusTarget, Rect, TabDirection};
use blockpad_types::{BlockId, BlockType, Page, PageStatus};

#[derive(Clone, Debug, PartialEq)]
pub enum EditorCommand {
    // ── Page ────────────────────────────────────────────────────────────
    /// Replace the active page. `None` shows the empty state.
    Load(Option<Page>),
    SetTitle(String),
    /// Written through immediately.
    SetIcon(Option<String>),
    /// ISO-8601 date, written through immediately.
    SetDueDate(Option<String>),
    /// Written through immediately.
    SetStatus(Option<PageStatus>),

    // ── Text surface ────────────────────────────────────────────────────
    Focus(FocusTarget),
    /// The element's live content changed.
    Input { target: FocusTarget, text: String },
    /// Caret moved within the focused element (char offset).
    MoveCaret(usize),
    /// Focus left the element; commit its live content.
    Blur,
    Enter,
    Backspace,
    /// Tab or Shift+Tab inside a table cell.
    Tab(TabDirection),

    // ── Block menu ──────────────────────────────────────────────────────
    Retype { block: BlockId, kind: BlockType },
    ToggleTodo { block: BlockId, checked: bool },
    Delete(BlockId),
    /// Image picker result.
    SetImage { block: BlockId, src: String },

    // ── Table ───────────────────────────────────────────────────────────
    InsertRow { block: BlockId, after: usize },
    InsertColumn { block: BlockId, after: usize },
    DeleteRow { block: BlockId, row: usize },
    DeleteColumn { block: BlockId, column: usize },
    SetTableHeaders { block: BlockId, enabled: bool },

    // ── Drag ────────────────────────────────────────────────────────────
    DragStart(BlockId),
    DragOver { target: BlockId, rect: Rect, y: f32 },
    Drop,
    /// Drag ended without a drop (or outside any block).
    DragEnd,

    /// The host finished drawing; run post-render work.
    Render,
}

impl EditorCommand {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::Load(_) => "load",
            EditorCommand::SetTitle(_) => "set-title",
            EditorCommand::SetIcon(_) => "set-icon",
            EditorCommand::SetDueDate(_) => "set-due-date",
            EditorCommand::SetStatus(_) => "set-status",
            EditorCommand::Focus(_) => "focus",
            EditorCommand::Input { .. } => "input",
            EditorCommand::MoveCaret(_) => "move-caret",
            EditorCommand::Blur => "blur",
            EditorCommand::Enter => "enter",
            EditorCommand::Backspace => "backspace",
            EditorCommand::Tab(_) => "tab",
            EditorCommand::Retype { .. } => "retype",
            EditorCommand::ToggleTodo { .. } => "toggle-todo",
            EditorCommand::Delete(_) => "delete",
            EditorCommand::SetImage { .. } => "set-image",
            EditorCommand::InsertRow { .. } => "insert-row",
            EditorCommand::InsertColumn { .. } => "insert-column",
            EditorCommand::DeleteRow { .. } => "delete-row",
            EditorCommand::DeleteColumn { .. } => "delete-column",
            EditorCommand::SetTableHeaders { .. } => "set-table-headers",
            EditorCommand::DragStart(_) => "drag-start",
            EditorCommand::DragOver { .. } => "drag-over",
            EditorCommand::Drop => "drop",
            EditorCommand::DragEnd => "drag-end",
            EditorCommand::Render => "render",
        }
    }

    /// Commands that only make sense with a page loaded.
    pub fn needs_page(&self) -> bool {
        !matches!(self, EditorCommand::Load(_) | EditorCommand::Render)
    }
}
