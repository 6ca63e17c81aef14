//! Editing session for blockpad.
//!
//! Drives the pure engine in `blockpad-doc` with a clock and a persistence
//! boundary:
//!
//! - [`Editor`]: one active page; routes [`EditorCommand`]s, runs post-render
//!   work, applies fired timers
//! - [`EditorSession`] / [`SessionHandle`]: the editor on its own task,
//!   reachable from anywhere through a cloneable handle
//! - [`Timers`]: debounced title/content saves and short UI delays
//! - [`PageSink`]: where updates leave the session
//! - [`SnapshotStore`]: the JSON page snapshot on disk
//!
//! # Saves
//!
//! Title and content are saved after 500 ms without further changes (both
//! configurable), and only if they differ from what was last saved. Icon, due
//! date and status are written through immediately. Loading another page
//! cancels every pending save of the previous one.

mod command;
mod config;
mod editor;
mod error;
mod session;
mod sink;
mod store;
mod timer;

pub use command::EditorCommand;
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{ConfigError, Result, SessionError, StoreError};
pub use session::{EditorSession, SessionHandle};
pub use sink::{ChannelSink, EventSink, PageSink, SinkEvent};
pub use store::{SnapshotStore, StoreSink};
pub use timer::{AbortOnDrop, Deferred, Timed, TimerQueue, Timers};
