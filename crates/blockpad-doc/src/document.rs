//! In-memory block document for the active page.
//!
//! `BlockDocument` owns the ordered block list of exactly one page. It is
//! loaded wholesale from a [`Page`] and never merged across pages: switching
//! pages builds a new document.
//!
//! # Mutation discipline
//!
//! Every mutation builds the next block list and swaps it in through
//! [`BlockDocument::commit`] — no block is edited in place while it is still
//! part of the current list. Each commit bumps [`version`](BlockDocument::version),
//! which the session uses to decide when a content save is due.
//!
//! The list is never empty. If a commit would leave it empty, a single empty
//! paragraph takes its place.
//!
//! The editing operations themselves live next to their concerns:
//! `mutation.rs` (split, merge, delete, retype, to-do), `grid.rs` (tables),
//! `drag.rs` (reorder).

use tracing::debug;

use blockpad_types::{Block, BlockId, Page, PageId};

use crate::{DocError, Result};

/// Ordered block list of the active page.
#[derive(Clone, Debug)]
pub struct BlockDocument {
    /// Page this document was loaded from.
    page_id: PageId,

    /// Current blocks, in display order. Never empty.
    blocks: Vec<Block>,

    /// Incremented on each committed mutation.
    version: u64,
}

impl BlockDocument {
    /// Load a page's content. An empty content list becomes one empty paragraph.
    pub fn load(page: &Page) -> Self {
        Self::new(page.id.clone(), page.content.clone())
    }

    /// Build a document from a block list.
    pub fn new(page_id: PageId, mut blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::empty_paragraph());
        }
        Self {
            page_id,
            blocks,
            version: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The page this document belongs to.
    pub fn page_id(&self) -> &PageId {
        &self.page_id
    }

    /// Blocks in display order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get the current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get the number of blocks (always at least 1).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by id.
    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Index of a block in display order.
    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    /// Index of a block, or `BlockNotFound`.
    pub fn index_of(&self, id: &BlockId) -> Result<usize> {
        self.position(id).ok_or_else(|| DocError::BlockNotFound(id.clone()))
    }

    /// The block before `id`, if any.
    pub fn previous(&self, id: &BlockId) -> Option<&Block> {
        let idx = self.position(id)?;
        idx.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    /// Concatenated text of all string-content blocks (tables skipped).
    pub fn full_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Consume the document, returning its blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Swap in the next block list.
    ///
    /// An empty list is replaced by one empty paragraph so the document is
    /// never left without a block.
    pub(crate) fn commit(&mut self, mut next: Vec<Block>) {
        if next.is_empty() {
            next.push(Block::empty_paragraph());
        }
        self.blocks = next;
        self.version += 1;
        debug!(
            "document {} committed v{} ({} blocks)",
            self.page_id.short(),
            self.version,
            self.blocks.len()
        );
    }

    /// Clone the current list, apply `f` to the block at `idx`, and commit.
    pub(crate) fn commit_with(&mut self, idx: usize, f: impl FnOnce(&mut Block)) {
        let mut next = self.blocks.clone();
        f(&mut next[idx]);
        self.commit(next);
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Insert a block after `after`, or at the beginning if `after` is None.
    pub fn insert_block(&mut self, after: Option<&BlockId>, block: Block) -> Result<BlockId> {
        let at = match after {
            Some(id) => self.index_of(id)? + 1,
            None => 0,
        };
        let id = block.id.clone();
        let mut next = self.blocks.clone();
        next.insert(at, block);
        self.commit(next);
        Ok(id)
    }

    /// Append a block at the end.
    pub fn push_block(&mut self, block: Block) -> BlockId {
        let id = block.id.clone();
        let mut next = self.blocks.clone();
        next.push(block);
        self.commit(next);
        id
    }
}

// ============================================================================
// Tests
// ============================================================================
