//! Page types.
//!
//! A `Page` is a titled document made of an ordered block list, optionally
//! parented under another page. The parent pointer forms the sidebar tree;
//! the editing engine only ever works on one page's `content` at a time.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::block::Block;
use crate::ids::PageId;

/// Title given to pages created without one (and to pages whose title is garbage).
pub const DEFAULT_TITLE: &str = "Untitled";

/// Workflow status of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum PageStatus {
    #[strum(serialize = "todo")]
    Todo,
    #[strum(serialize = "in-progress", serialize = "in_progress", serialize = "doing")]
    InProgress,
    #[strum(serialize = "done")]
    Done,
}

impl PageStatus {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to the persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Todo => "todo",
            PageStatus::InProgress => "in-progress",
            PageStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A page and its content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    /// Emoji or icon name shown next to the title.
    pub icon: Option<String>,
    /// Parent in the page tree (None for top-level pages).
    pub parent_id: Option<PageId>,
    /// ISO-8601 due date.
    pub due_date: Option<String>,
    pub status: Option<PageStatus>,
    /// Ordered blocks. Never empty.
    pub content: Vec<Block>,
}

impl Page {
    /// A top-level page holding a single empty paragraph.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: PageId::new(),
            title: title.into(),
            icon: None,
            parent_id: None,
            due_date: None,
            status: None,
            content: vec![Block::empty_paragraph()],
        }
    }

    /// Builder: replace the id.
    pub fn with_id(mut self, id: impl Into<PageId>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: set the parent page.
    pub fn with_parent(mut self, parent: Option<PageId>) -> Self {
        self.parent_id = parent;
        self
    }

    /// Builder: replace the content (an empty list becomes one empty paragraph).
    pub fn with_content(mut self, content: Vec<Block>) -> Self {
        self.content = content;
        self.ensure_content();
        self
    }

    /// Restore the non-empty content invariant. Returns true if a block was added.
    pub fn ensure_content(&mut self) -> bool {
        if self.content.is_empty() {
            self.content.push(Block::empty_paragraph());
            true
        } else {
            false
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Icon (if any) followed by the title.
    pub fn display_name(&self) -> String {
        match self.icon.as_deref() {
            Some(icon) if !icon.is_empty() => format!("{} {}", icon, self.title),
            _ => self.title.clone(),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

// ============================================================================
// Tests
// ============================================================================
