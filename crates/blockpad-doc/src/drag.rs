//! Drag-reorder controller for blocks.
//!
//! Drag start records the dragged block. Each drag-over computes, from the
//! pointer's y coordinate against the hovered block's rectangle, whether the
//! drop lands before or after it (midpoint split). Drop splices the dragged
//! block into place; drag end without a drop just resets.

use tracing::debug;

use blockpad_types::BlockId;

use crate::BlockDocument;

/// Before or after the hovered element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
}

/// Vertical extent of an element, in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub top: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Pointer y as a fraction of the height (0.0 at the top edge).
    pub fn fraction(&self, y: f32) -> f32 {
        if self.height <= 0.0 {
            return 0.0;
        }
        (y - self.top) / self.height
    }

    /// Midpoint split: upper half is `Before`, lower half is `After`.
    pub fn half(&self, y: f32) -> DropPosition {
        if self.fraction(y) < 0.5 {
            DropPosition::Before
        } else {
            DropPosition::After
        }
    }
}

/// Current drop intent, shown as an insertion line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropIndicator {
    pub target: BlockId,
    pub position: DropPosition,
}

/// Move `dragged` next to `target` in `items`, as a pure reorder.
///
/// The dragged item is removed first and the target's index recomputed in
/// the shortened list. Returns `None` if either is missing or they are the
/// same item.
pub fn reorder<T: Clone, K: PartialEq + ?Sized>(
    items: &[T],
    key: impl Fn(&T) -> &K,
    dragged: &K,
    target: &K,
    position: DropPosition,
) -> Option<Vec<T>> {
    if dragged == target {
        return None;
    }
    let from = items.iter().position(|i| key(i) == dragged)?;
    let mut next = items.to_vec();
    let item = next.remove(from);
    let mut at = next.iter().position(|i| key(i) == target)?;
    if position == DropPosition::After {
        at += 1;
    }
    next.insert(at, item);
    Some(next)
}

impl BlockDocument {
    /// Move a block before or after another. Returns false if nothing moved.
    pub fn move_block(&mut self, dragged: &BlockId, target: &BlockId, position: DropPosition) -> bool {
        match reorder(self.blocks(), |b| &b.id, dragged, target, position) {
            Some(next) if next != self.blocks() => {
                self.commit(next);
                true
            }
            _ => false,
        }
    }
}

/// Drag state for the active page's block list.
#[derive(Debug, Default)]
pub struct DragController {
    dragged: Option<BlockId>,
    indicator: Option<DropIndicator>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, block: BlockId) {
        debug!("drag start {}", block);
        self.dragged = Some(block);
        self.indicator = None;
    }

    pub fn dragged(&self) -> Option<&BlockId> {
        self.dragged.as_ref()
    }

    pub fn indicator(&self) -> Option<&DropIndicator> {
        self.indicator.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Pointer moved over `target`. Hovering the dragged block clears the indicator.
    pub fn over(&mut self, target: BlockId, rect: Rect, y: f32) -> Option<&DropIndicator> {
        let dragged = self.dragged.as_ref()?;
        if dragged == &target {
            self.indicator = None;
            return None;
        }
        self.indicator = Some(DropIndicator {
            target,
            position: rect.half(y),
        });
        self.indicator.as_ref()
    }

    /// Apply the drop to the document. State resets whether or not it moved.
    pub fn drop_on(&mut self, doc: &mut BlockDocument) -> bool {
        let dragged = self.dragged.take();
        let indicator = self.indicator.take();
        match (dragged, indicator) {
            (Some(dragged), Some(DropIndicator { target, position })) => {
                let moved = doc.move_block(&dragged, &target, position);
                debug!("drop {} {:?} {}: moved={}", dragged, position, target, moved);
                moved
            }
            _ => false,
        }
    }

    /// Drag ended (or was dropped outside): back to neutral, no mutation.
    pub fn cancel(&mut self) {
        self.dragged = None;
        self.indicator = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
