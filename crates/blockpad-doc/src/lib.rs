//! Block document editing engine for blockpad.
//!
//! Pure and synchronous: no timers, no I/O. The session crate drives it and
//! owns the clock.
//!
//! # Control Flow
//!
//! ```text
//! input ─▶ ContentSync (baseline on focus, diff on blur)
//!       ─▶ BlockDocument mutation (split / merge / retype / grid / reorder)
//!       ─▶ EditSurface::render
//!       ─▶ FocusScheduler::flush (caret placement, once per request)
//! ```
//!
//! # Mutation Semantics
//!
//! Every mutation commits a whole new block list or does nothing. The list is
//! never empty. Refusals that protect an invariant (merging the sole block,
//! deleting the last table row) are not errors: they return `false`/`None`.
//! Errors are reserved for addressing a block, row or cell that is not there.
//!
//! # Retype Race
//!
//! A retype swaps the element a block renders as. A blur from the old element
//! can still arrive after the model changed; [`TransitionGuard`] marks the
//! block as mid-retype until the next render settles, and [`ContentSync`]
//! discards blurs for it in that window.

mod document;
mod drag;
mod error;
mod focus;
pub mod grid;
mod guard;
mod mutation;
pub mod page_tree;
pub mod sanitize;
mod surface;
mod sync;

pub use document::BlockDocument;
pub use drag::{DragController, DropIndicator, DropPosition, Rect, reorder};
pub use error::DocError;
pub use focus::{FocusRequest, FocusScheduler};
pub use grid::TabDirection;
pub use guard::TransitionGuard;
pub use mutation::{Retype, Split};
pub use page_tree::TreeZone;
pub use sanitize::{Sanitized, parse_snapshot, sanitize_snapshot};
pub use surface::{BufferSurface, Caret, EditSurface, FocusTarget};
pub use sync::{BlurOutcome, ContentSync};

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocError>;
