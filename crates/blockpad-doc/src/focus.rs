//! Post-render focus placement.
//!
//! Structural edits (split, retype, merge, table insertion) decide where the
//! caret should go before the element exists. They record a [`FocusRequest`];
//! after the next render the scheduler finds the element, focuses it, and
//! clears the request. A request is consumed exactly once, found or not.

use tracing::debug;

use crate::surface::{Caret, EditSurface, FocusTarget};

/// Desired caret placement after the next render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub target: FocusTarget,
    pub caret: Caret,
}

impl FocusRequest {
    pub fn start(target: FocusTarget) -> Self {
        Self {
            target,
            caret: Caret::Start,
        }
    }

    pub fn end(target: FocusTarget) -> Self {
        Self {
            target,
            caret: Caret::End,
        }
    }
}

/// Holds at most one pending focus request; the latest request wins.
#[derive(Debug, Default)]
pub struct FocusScheduler {
    pending: Option<FocusRequest>,
}

impl FocusScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where the caret should land once the surface has rendered.
    pub fn request(&mut self, request: FocusRequest) {
        if let Some(previous) = self.pending.replace(request) {
            debug!("focus request for {} superseded", previous.target);
        }
    }

    pub fn pending(&self) -> Option<&FocusRequest> {
        self.pending.as_ref()
    }

    /// Drop any pending request (page switch).
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Apply the pending request to a freshly rendered surface.
    ///
    /// Returns the focused target, or None if nothing was pending or the
    /// element was not mounted. The request is cleared either way.
    pub fn flush<S: EditSurface + ?Sized>(&mut self, surface: &mut S) -> Option<FocusTarget> {
        let request = self.pending.take()?;
        if surface.focus(&request.target, request.caret) {
            Some(request.target)
        } else {
            debug!("focus target {} not mounted, dropping request", request.target);
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
