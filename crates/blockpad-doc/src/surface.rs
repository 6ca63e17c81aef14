//! Editable surface abstraction.
//!
//! The engine never owns widgets. It talks to whatever displays the blocks
//! through [`EditSurface`]: a set of focusable text elements addressed by
//! [`FocusTarget`], each holding the *live* serialized content the user is
//! typing, plus a single caret. [`BufferSurface`] is the in-memory
//! implementation used by the session driver, the CLI, and tests.
//!
//! Element keys are stable across renders: `block-{block id}` for a text
//! block, `cell-{row id}-{cell id}` for a table cell.

use std::collections::HashMap;

use blockpad_types::{Block, BlockContent, BlockId, CellId, RowId};

/// Where inside an element the caret should land.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Caret {
    Start,
    End,
}

/// An addressable editable element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// The whole-block text element of a string-content block.
    Block(BlockId),
    /// One cell of a table block.
    Cell {
        block: BlockId,
        row: RowId,
        cell: CellId,
    },
}

impl FocusTarget {
    pub fn cell(block: BlockId, row: RowId, cell: CellId) -> Self {
        FocusTarget::Cell { block, row, cell }
    }

    /// The block this element belongs to.
    pub fn block_id(&self) -> &BlockId {
        match self {
            FocusTarget::Block(id) => id,
            FocusTarget::Cell { block, .. } => block,
        }
    }

    /// Stable element key (the id attribute a DOM surface would carry).
    pub fn element_key(&self) -> String {
        match self {
            FocusTarget::Block(id) => format!("block-{id}"),
            FocusTarget::Cell { row, cell, .. } => format!("cell-{row}-{cell}"),
        }
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, FocusTarget::Cell { .. })
    }
}

impl std::fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.element_key())
    }
}

/// The editable text surface the engine renders into and reads from.
pub trait EditSurface {
    /// Bring the element set in line with the block list.
    ///
    /// Called after a mutation commits. Elements whose model content did not
    /// change since the previous render keep their live text.
    fn render(&mut self, blocks: &[Block]);

    /// Whether an element for the target is currently mounted.
    fn contains(&self, target: &FocusTarget) -> bool;

    /// Live serialized content of an element.
    fn text(&self, target: &FocusTarget) -> Option<String>;

    /// Caret offset (in chars) if the target holds focus.
    fn caret(&self, target: &FocusTarget) -> Option<usize>;

    /// Focus an element and collapse the selection to its start or end.
    ///
    /// Returns false if no such element is mounted.
    fn focus(&mut self, target: &FocusTarget, caret: Caret) -> bool;

    /// The element holding focus, if any.
    fn focused(&self) -> Option<&FocusTarget>;

    /// Drop focus without moving it anywhere. Returns the element that had it.
    fn blur(&mut self) -> Option<FocusTarget>;

    /// Replace an element's live text, as typing would. Moves the caret to the end.
    ///
    /// Returns false if the element is not mounted.
    fn type_text(&mut self, target: &FocusTarget, text: &str) -> bool;

    /// Move the caret within the focused element (clamped to its length).
    fn set_caret(&mut self, offset: usize);

    /// Ask the host to open its image picker for an image block.
    fn request_image(&mut self, block: &BlockId);
}

#[derive(Clone, Debug)]
struct Element {
    /// What the user sees (and types into).
    text: String,
    /// Model content at the last render that touched this element.
    rendered: String,
}

/// In-memory [`EditSurface`]: one text buffer per element and a single caret.
#[derive(Clone, Debug, Default)]
pub struct BufferSurface {
    elements: HashMap<FocusTarget, Element>,
    order: Vec<FocusTarget>,
    focused: Option<FocusTarget>,
    caret: usize,
    image_requests: Vec<BlockId>,
    renders: u64,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounted elements in document order.
    pub fn targets(&self) -> &[FocusTarget] {
        &self.order
    }

    /// Image picker requests raised since the last call.
    pub fn take_image_requests(&mut self) -> Vec<BlockId> {
        std::mem::take(&mut self.image_requests)
    }

    /// Number of render passes so far.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    fn mount(&mut self, target: FocusTarget, model: &str, next: &mut HashMap<FocusTarget, Element>) {
        let element = match self.elements.remove(&target) {
            Some(existing) if existing.rendered == model => existing,
            _ => Element {
                text: model.to_string(),
                rendered: model.to_string(),
            },
        };
        next.insert(target.clone(), element);
        self.order.push(target);
    }
}

impl EditSurface for BufferSurface {
    fn render(&mut self, blocks: &[Block]) {
        let mut next = HashMap::with_capacity(self.elements.len());
        self.order.clear();

        for block in blocks {
            match &block.content {
                BlockContent::Text(text) => {
                    self.mount(FocusTarget::Block(block.id.clone()), text, &mut next);
                }
                BlockContent::Table(grid) => {
                    for row in &grid.rows {
                        for cell in &row.cells {
                            let target =
                                FocusTarget::cell(block.id.clone(), row.id.clone(), cell.id.clone());
                            self.mount(target, &cell.content, &mut next);
                        }
                    }
                }
            }
        }

        self.elements = next;
        if let Some(focused) = &self.focused
            && !self.elements.contains_key(focused)
        {
            self.focused = None;
            self.caret = 0;
        }
        self.renders += 1;
    }

    fn contains(&self, target: &FocusTarget) -> bool {
        self.elements.contains_key(target)
    }

    fn text(&self, target: &FocusTarget) -> Option<String> {
        self.elements.get(target).map(|e| e.text.clone())
    }

    fn caret(&self, target: &FocusTarget) -> Option<usize> {
        (self.focused.as_ref() == Some(target)).then_some(self.caret)
    }

    fn focus(&mut self, target: &FocusTarget, caret: Caret) -> bool {
        let Some(element) = self.elements.get(target) else {
            return false;
        };
        self.caret = match caret {
            Caret::Start => 0,
            Caret::End => element.text.chars().count(),
        };
        self.focused = Some(target.clone());
        true
    }

    fn focused(&self) -> Option<&FocusTarget> {
        self.focused.as_ref()
    }

    fn blur(&mut self) -> Option<FocusTarget> {
        self.caret = 0;
        self.focused.take()
    }

    fn type_text(&mut self, target: &FocusTarget, text: &str) -> bool {
        let Some(element) = self.elements.get_mut(target) else {
            return false;
        };
        element.text = text.to_string();
        if self.focused.as_ref() == Some(target) {
            self.caret = element.text.chars().count();
        }
        true
    }

    fn set_caret(&mut self, offset: usize) {
        let len = self
            .focused
            .as_ref()
            .and_then(|t| self.elements.get(t))
            .map(|e| e.text.chars().count())
            .unwrap_or(0);
        self.caret = offset.min(len);
    }

    fn request_image(&mut self, block: &BlockId) {
        self.image_requests.push(block.clone());
    }
}

// ============================================================================
// Tests
// ============================================================================
