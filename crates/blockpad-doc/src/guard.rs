//! Retype transition guard.
//!
//! Changing a block's type re-renders it as a different element (a text
//! element becomes a grid, an image placeholder, ...). Until that render
//! lands, a blur from the old element can still arrive carrying the old live
//! text. The guard marks the block as mid-retype so the content sync layer
//! discards such blurs instead of writing them into the new block.
//!
//! ```text
//!   Idle ──retype(b)──▶ Retyping(b) ──render settles──▶ Idle
//!                           │
//!                           └──retype(c)──▶ Retyping(c)   (supersedes, logged)
//! ```

use tracing::{debug, warn};

use blockpad_types::BlockId;

/// Guard state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TransitionGuard {
    #[default]
    Idle,
    /// A retype of this block is waiting for its render to settle.
    Retyping(BlockId),
}

impl TransitionGuard {
    /// Mark a retype as in flight. Set before the type change is applied.
    pub fn begin(&mut self, block: &BlockId) {
        if let TransitionGuard::Retyping(previous) = &*self
            && previous != block
        {
            warn!(
                "retype of {} requested while retype of {} is still pending; tracking the newer one",
                block, previous
            );
        }
        *self = TransitionGuard::Retyping(block.clone());
    }

    /// The pending render finished; the guarded window is over.
    pub fn settle(&mut self) -> Option<BlockId> {
        match std::mem::take(self) {
            TransitionGuard::Retyping(block) => {
                debug!("retype of {} settled", block);
                Some(block)
            }
            TransitionGuard::Idle => None,
        }
    }

    /// Whether blur commits for this block must be discarded right now.
    pub fn blocks_commit(&self, block: &BlockId) -> bool {
        matches!(self, TransitionGuard::Retyping(b) if b == block)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TransitionGuard::Retyping(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
