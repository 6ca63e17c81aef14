//! Block types: what a block *is* and what it holds.
//!
//! ## Design: BlockType + BlockContent
//!
//! `BlockType` names the rendering/behavior of a block. `BlockContent` is the
//! payload shape, and only two shapes exist: raw text/HTML for every type
//! except `table`, and a [`TableContent`] grid for `table`. The pairing is an
//! invariant maintained by every constructor and by retyping — a non-table
//! block never carries a grid.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::BlockId;
use crate::table::TableContent;

/// Markup a contenteditable surface leaves behind in a visually empty element.
pub const EMPTY_PLACEHOLDER: &str = "<br>";

/// Whether serialized block content should count as empty.
///
/// Treats surrounding whitespace and the lone `<br>` placeholder as empty.
pub fn is_blank_content(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.is_empty() || trimmed == EMPTY_PLACEHOLDER
}

/// What a block *is*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum BlockType {
    /// Plain paragraph — the fallback for anything unknown.
    #[default]
    #[serde(rename = "paragraph")]
    #[strum(serialize = "paragraph", serialize = "text")]
    Paragraph,
    #[serde(rename = "heading1")]
    #[strum(serialize = "heading1", serialize = "h1")]
    Heading1,
    #[serde(rename = "heading2")]
    #[strum(serialize = "heading2", serialize = "h2")]
    Heading2,
    /// Image; content holds the image source once one is chosen.
    #[serde(rename = "image")]
    #[strum(serialize = "image")]
    Image,
    #[serde(rename = "code")]
    #[strum(serialize = "code")]
    Code,
    /// Checkable to-do item; the only type for which `checked` matters.
    #[serde(rename = "todo")]
    #[strum(serialize = "todo", serialize = "to-do")]
    Todo,
    #[serde(rename = "blockquote")]
    #[strum(serialize = "blockquote", serialize = "quote")]
    Blockquote,
    #[serde(rename = "bulleted-list-item")]
    #[strum(serialize = "bulleted-list-item", serialize = "bullet")]
    BulletedListItem,
    /// Horizontal rule; content is always empty.
    #[serde(rename = "divider")]
    #[strum(serialize = "divider")]
    Divider,
    /// Grid of cells; the only type whose content is a [`TableContent`].
    #[serde(rename = "table")]
    #[strum(serialize = "table")]
    Table,
    #[serde(rename = "ai-prompt")]
    #[strum(serialize = "ai-prompt")]
    AiPrompt,
    #[serde(rename = "json-schema")]
    #[strum(serialize = "json-schema")]
    JsonSchema,
    #[serde(rename = "ui-component")]
    #[strum(serialize = "ui-component")]
    UiComponent,
}

impl BlockType {
    /// Every block type, in block-type menu order.
    pub const ALL: [BlockType; 13] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Image,
        BlockType::Code,
        BlockType::Todo,
        BlockType::Blockquote,
        BlockType::BulletedListItem,
        BlockType::Divider,
        BlockType::Table,
        BlockType::AiPrompt,
        BlockType::JsonSchema,
        BlockType::UiComponent,
    ];

    /// Parse from string (case-insensitive, accepts a few short aliases).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to the persisted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Image => "image",
            BlockType::Code => "code",
            BlockType::Todo => "todo",
            BlockType::Blockquote => "blockquote",
            BlockType::BulletedListItem => "bulleted-list-item",
            BlockType::Divider => "divider",
            BlockType::Table => "table",
            BlockType::AiPrompt => "ai-prompt",
            BlockType::JsonSchema => "json-schema",
            BlockType::UiComponent => "ui-component",
        }
    }

    /// List types continue themselves when Enter splits them.
    pub fn is_list(&self) -> bool {
        matches!(self, BlockType::BulletedListItem | BlockType::Todo)
    }

    /// Whether this type's content is a string (everything but `table`).
    pub fn has_text_content(&self) -> bool {
        !matches!(self, BlockType::Table)
    }

    /// Whether typing writes into this block's own text.
    ///
    /// A divider has no text and an image's source is only set through the
    /// picker. Tables are edited cell by cell, never as one string.
    pub fn is_editable(&self) -> bool {
        self.has_text_content() && !matches!(self, BlockType::Divider | BlockType::Image)
    }

    /// The type a block spawned by Enter after this one should have.
    pub fn continuation(&self) -> BlockType {
        if self.is_list() { *self } else { BlockType::Paragraph }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Block payload: a raw text/HTML string, or a table grid.
///
/// Untagged on the wire — a JSON string is text, a JSON object is a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    Text(String),
    Table(TableContent),
}

impl BlockContent {
    /// The text, if this is string content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BlockContent::Text(s) => Some(s),
            BlockContent::Table(_) => None,
        }
    }

    /// The grid, if this is table content.
    pub fn as_table(&self) -> Option<&TableContent> {
        match self {
            BlockContent::Table(t) => Some(t),
            BlockContent::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, BlockContent::Text(_))
    }
}

impl Default for BlockContent {
    fn default() -> Self {
        BlockContent::Text(String::new())
    }
}

impl From<&str> for BlockContent {
    fn from(s: &str) -> Self {
        BlockContent::Text(s.to_string())
    }
}

impl From<String> for BlockContent {
    fn from(s: String) -> Self {
        BlockContent::Text(s)
    }
}

impl From<TableContent> for BlockContent {
    fn from(t: TableContent) -> Self {
        BlockContent::Table(t)
    }
}

/// The atomic editable unit of a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub content: BlockContent,
    /// Completion flag (only meaningful for `todo`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl Block {
    /// Create a string-content block of the given type with a fresh id.
    ///
    /// Table requests get a 1×1 grid; use [`Block::table`] for a sized one.
    pub fn new(kind: BlockType, text: impl Into<String>) -> Self {
        let content = match kind {
            BlockType::Table => BlockContent::Table(TableContent::grid(1, 1)),
            BlockType::Divider => BlockContent::Text(String::new()),
            _ => BlockContent::Text(text.into()),
        };
        Self {
            id: BlockId::new(),
            kind,
            content,
            checked: (kind == BlockType::Todo).then_some(false),
        }
    }

    /// A paragraph with the given text.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockType::Paragraph, text)
    }

    /// An empty paragraph — the stand-in for a page with nothing else.
    pub fn empty_paragraph() -> Self {
        Self::paragraph("")
    }

    /// A to-do item.
    pub fn todo(text: impl Into<String>, checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::new(BlockType::Todo, text)
        }
    }

    /// A table block holding the given grid.
    pub fn table(grid: TableContent) -> Self {
        Self {
            id: BlockId::new(),
            kind: BlockType::Table,
            content: BlockContent::Table(grid),
            checked: None,
        }
    }

    /// Builder: replace the id (snapshots and tests use fixed ids).
    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = id.into();
        self
    }

    /// String content, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }

    /// Table content, if any.
    pub fn grid(&self) -> Option<&TableContent> {
        self.content.as_table()
    }

    /// True for string content that counts as empty (see [`is_blank_content`]).
    pub fn is_blank(&self) -> bool {
        self.text().is_some_and(is_blank_content)
    }

    pub fn is_checked(&self) -> bool {
        self.checked == Some(true)
    }

    /// Whether the type/content pairing holds.
    pub fn is_consistent(&self) -> bool {
        match (&self.kind, &self.content) {
            (BlockType::Table, BlockContent::Table(t)) => t.is_well_formed(),
            (BlockType::Table, BlockContent::Text(_)) => false,
            (_, BlockContent::Text(_)) => true,
            (_, BlockContent::Table(_)) => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
