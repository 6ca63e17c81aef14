//! Block mutation engine: split, merge, delete, retype, and to-do completion.
//!
//! Each operation either commits a new block list or leaves the document
//! untouched. Operations report where the caret should go next; placing it is
//! the focus scheduler's job once the surface has rendered.

use tracing::debug;

use blockpad_types::{Block, BlockContent, BlockId, BlockType, TableContent, is_blank_content};

use crate::focus::FocusRequest;
use crate::surface::FocusTarget;
use crate::{BlockDocument, Result};

/// Result of pressing Enter in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Split {
    /// An empty list item turned into a paragraph instead of splitting.
    ExitedList,
    /// A new block was inserted after the current one.
    Inserted(BlockId),
    /// The block cannot be split (tables split nothing).
    Ignored,
}

impl Split {
    /// Where the caret goes after the split renders.
    pub fn focus(&self, current: &BlockId) -> Option<FocusRequest> {
        match self {
            Split::Inserted(id) => Some(FocusRequest::start(FocusTarget::Block(id.clone()))),
            Split::ExitedList => Some(FocusRequest::start(FocusTarget::Block(current.clone()))),
            Split::Ignored => None,
        }
    }
}

/// Result of a block type change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Retype {
    /// The block already had the requested type.
    Unchanged,
    /// Now a string-content block; content kept if it already was a string.
    Text,
    /// Now a blank image block; the host should open its picker.
    Image,
    /// Now a table; the first cell is where the caret should land once mounted.
    Table(FocusTarget),
}

/// Byte index of the `caret`-th char, clamped to the end of `text`.
fn byte_offset(text: &str, caret: usize) -> usize {
    text.char_indices()
        .nth(caret)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

impl BlockDocument {
    /// Enter (no shift) in a text block.
    ///
    /// `live` is the element's current serialized content and `caret` the
    /// char offset of the caret in it. An empty bulleted item or to-do turns
    /// into a paragraph. Otherwise the text before the caret stays in the
    /// block and the rest moves into a new block inserted right after it,
    /// typed as a continuation (list types continue, everything else becomes
    /// a paragraph; a continued to-do starts unchecked). Blocks that don't
    /// take typed text (table, image, divider) are left alone.
    pub fn split_block(&mut self, id: &BlockId, live: &str, caret: usize) -> Result<Split> {
        let idx = self.index_of(id)?;
        let block = &self.blocks()[idx];

        if !block.kind.is_editable() {
            return Ok(Split::Ignored);
        }

        if block.kind.is_list() && is_blank_content(live) {
            debug!("exit list mode at {}", id);
            self.commit_with(idx, |b| {
                b.kind = BlockType::Paragraph;
                b.content = BlockContent::Text(String::new());
                b.checked = None;
            });
            return Ok(Split::ExitedList);
        }

        let at = byte_offset(live, caret);
        let (head, tail) = live.split_at(at);
        let new_block = Block::new(block.kind.continuation(), tail);
        let new_id = new_block.id.clone();

        let mut next = self.blocks().to_vec();
        next[idx].content = BlockContent::Text(head.to_string());
        next.insert(idx + 1, new_block);
        self.commit(next);

        Ok(Split::Inserted(new_id))
    }

    /// Backspace in a block whose live content is `live`.
    ///
    /// Only an empty block merges away, and never the sole block. Returns the
    /// caret placement: end of the previous block, or start of the block that
    /// moved into first place when the removed block was first.
    pub fn merge_backspace(&mut self, id: &BlockId, live: &str) -> Result<Option<FocusRequest>> {
        let idx = self.index_of(id)?;
        if !is_blank_content(live) || self.len() <= 1 {
            return Ok(None);
        }

        let mut next = self.blocks().to_vec();
        next.remove(idx);
        let focus = match idx.checked_sub(1) {
            Some(prev) => FocusRequest::end(FocusTarget::Block(next[prev].id.clone())),
            None => FocusRequest::start(FocusTarget::Block(next[0].id.clone())),
        };
        self.commit(next);
        Ok(Some(focus))
    }

    /// Remove a block. The sole block is reset to an empty paragraph instead.
    pub fn delete_block(&mut self, id: &BlockId) -> Result<()> {
        let idx = self.index_of(id)?;
        if self.len() > 1 {
            let mut next = self.blocks().to_vec();
            next.remove(idx);
            self.commit(next);
        } else {
            self.commit_with(idx, |b| {
                b.kind = BlockType::Paragraph;
                b.content = BlockContent::Text(String::new());
                b.checked = None;
            });
        }
        Ok(())
    }

    /// Change a block's type.
    ///
    /// - `image`: content blanked
    /// - `table`: content replaced by an empty `rows × columns` grid
    /// - `divider`: content emptied
    /// - anything else: string content kept, table content dropped for `""`
    ///
    /// `checked` becomes `Some(false)` for `todo` and `None` otherwise.
    pub fn retype(
        &mut self,
        id: &BlockId,
        kind: BlockType,
        (rows, columns): (usize, usize),
    ) -> Result<Retype> {
        let idx = self.index_of(id)?;
        let block = &self.blocks()[idx];
        if block.kind == kind {
            return Ok(Retype::Unchanged);
        }

        let (content, outcome) = match kind {
            BlockType::Image => (BlockContent::Text(String::new()), Retype::Image),
            BlockType::Table => {
                let grid = TableContent::grid(rows, columns);
                let first = match grid.ids_at(0, 0) {
                    Some((row, cell)) => FocusTarget::cell(id.clone(), row, cell),
                    None => FocusTarget::Block(id.clone()),
                };
                (BlockContent::Table(grid), Retype::Table(first))
            }
            BlockType::Divider => (BlockContent::Text(String::new()), Retype::Text),
            _ => {
                let text = block.text().unwrap_or_default().to_string();
                (BlockContent::Text(text), Retype::Text)
            }
        };

        debug!("retype {} {} -> {}", id, block.kind, kind);
        self.commit_with(idx, |b| {
            b.kind = kind;
            b.content = content;
            b.checked = (kind == BlockType::Todo).then_some(false);
        });
        Ok(outcome)
    }

    /// Write committed text into a string-content block.
    ///
    /// Returns false without touching anything if the block holds a table
    /// (a stale commit aimed at a block that changed shape), if its type
    /// doesn't take typed text, or if the text is already current.
    pub fn update_text(&mut self, id: &BlockId, text: &str) -> Result<bool> {
        let idx = self.index_of(id)?;
        if !self.blocks()[idx].kind.is_editable() {
            return Ok(false);
        }
        match self.blocks()[idx].text() {
            Some(current) if current == text => Ok(false),
            Some(_) => {
                let text = text.to_string();
                self.commit_with(idx, |b| b.content = BlockContent::Text(text));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Set a to-do's checked flag. Non-to-do blocks are left alone (false).
    pub fn set_checked(&mut self, id: &BlockId, checked: bool) -> Result<bool> {
        let idx = self.index_of(id)?;
        let block = &self.blocks()[idx];
        if block.kind != BlockType::Todo || block.is_checked() == checked {
            return Ok(false);
        }
        self.commit_with(idx, |b| b.checked = Some(checked));
        Ok(true)
    }

    /// Remove a to-do whose completion delay elapsed.
    ///
    /// Only acts if the block still exists and is still checked; the sole
    /// block becomes an empty paragraph instead of disappearing.
    pub fn remove_completed(&mut self, id: &BlockId) -> bool {
        match self.get(id) {
            Some(block) if block.kind == BlockType::Todo && block.is_checked() => {
                self.delete_block(id).is_ok()
            }
            _ => false,
        }
    }

    /// Store the chosen image source into an image block.
    pub fn set_image(&mut self, id: &BlockId, src: &str) -> Result<bool> {
        let idx = self.index_of(id)?;
        if self.blocks()[idx].kind != BlockType::Image {
            return Ok(false);
        }
        let src = src.to_string();
        self.commit_with(idx, |b| b.content = BlockContent::Text(src));
        Ok(true)
    }
}

// ============================================================================
// Tests
// ============================================================================
