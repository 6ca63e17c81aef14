//! Content sync layer: focus baselines and blur commits.
//!
//! On focus the layer records the block's serialized content as a baseline.
//! On blur it compares the live content against that baseline and only writes
//! back a real change, and only into a block that still takes typed text.
//! The baseline is dropped after every blur, whatever the outcome.

use std::collections::HashMap;

use tracing::debug;

use blockpad_types::{BlockContent, BlockId};

use crate::guard::TransitionGuard;
use crate::BlockDocument;

/// What a blur did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurOutcome {
    /// Live content matched the baseline; nothing written.
    Unchanged,
    /// The change was written into the block.
    Committed,
    /// The block is mid-retype; the stale content was dropped.
    DiscardedRetyping,
    /// The block no longer takes typed text (now a table, image or
    /// divider); the commit was dropped.
    DiscardedStale,
    /// The block is gone.
    NotFound,
}

/// Per-block content-on-focus baselines.
#[derive(Debug, Default)]
pub struct ContentSync {
    baselines: HashMap<BlockId, String>,
}

impl ContentSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the baseline for a block that just gained focus.
    ///
    /// Blocks that don't take typed text have no baseline and are skipped.
    pub fn capture(&mut self, doc: &BlockDocument, id: &BlockId) -> bool {
        let editable = doc.get(id).filter(|b| b.kind.is_editable());
        match editable.and_then(|b| b.text()) {
            Some(text) => {
                self.baselines.insert(id.clone(), text.to_string());
                true
            }
            None => false,
        }
    }

    pub fn baseline(&self, id: &BlockId) -> Option<&str> {
        self.baselines.get(id).map(String::as_str)
    }

    /// Drop a block's baseline without comparing.
    pub fn forget(&mut self, id: &BlockId) {
        self.baselines.remove(id);
    }

    /// Drop every baseline (page switch).
    pub fn clear(&mut self) {
        self.baselines.clear();
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }

    /// Handle a blur carrying the element's live content.
    ///
    /// Without a baseline (focus was never captured) the live content is
    /// compared against the block's current model content instead.
    pub fn commit_blur(
        &mut self,
        doc: &mut BlockDocument,
        guard: &TransitionGuard,
        id: &BlockId,
        live: &str,
    ) -> BlurOutcome {
        let baseline = self.baselines.remove(id);

        if guard.blocks_commit(id) {
            debug!("blur of {} discarded: retype in flight", id);
            return BlurOutcome::DiscardedRetyping;
        }

        let Some(block) = doc.get(id) else {
            return BlurOutcome::NotFound;
        };
        let current = match &block.content {
            BlockContent::Text(text) if block.kind.is_editable() => text,
            _ => {
                debug!("blur of {} discarded: {} takes no typed text", id, block.kind);
                return BlurOutcome::DiscardedStale;
            }
        };

        let unchanged = match &baseline {
            Some(base) => base == live,
            None => current == live,
        };
        if unchanged {
            return BlurOutcome::Unchanged;
        }

        match doc.update_text(id, live) {
            Ok(true) => BlurOutcome::Committed,
            Ok(false) => BlurOutcome::Unchanged,
            Err(_) => BlurOutcome::NotFound,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
