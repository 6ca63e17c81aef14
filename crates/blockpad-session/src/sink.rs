//! Persistence callbacks.
//!
//! The editor never writes pages itself. Every change that must escape the
//! session goes through a [`PageSink`]: title and content through the
//! debouncer, icon, due date and status immediately. Calls are
//! fire-and-forget; the editor never waits on or retries them.

use tokio::sync::mpsc;
use tracing::debug;

use blockpad_types::{Block, Page, PageId, PageStatus};

/// Receiver of page updates.
pub trait PageSink: Send + 'static {
    fn update_title(&mut self, page: &PageId, title: &str);
    fn update_content(&mut self, page: &PageId, blocks: &[Block]);
    fn update_icon(&mut self, page: &PageId, icon: Option<&str>);
    fn update_date(&mut self, page: &PageId, date: Option<&str>);
    fn update_status(&mut self, page: &PageId, status: Option<PageStatus>);
}

/// One page update, as a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    Title { page: PageId, title: String },
    Content { page: PageId, blocks: Vec<Block> },
    Icon { page: PageId, icon: Option<String> },
    Date { page: PageId, date: Option<String> },
    Status { page: PageId, status: Option<PageStatus> },
}

impl SinkEvent {
    pub fn page(&self) -> &PageId {
        match self {
            SinkEvent::Title { page, .. }
            | SinkEvent::Content { page, .. }
            | SinkEvent::Icon { page, .. }
            | SinkEvent::Date { page, .. }
            | SinkEvent::Status { page, .. } => page,
        }
    }

    /// Write the update into its page. Returns false if the page is not in the list.
    pub fn apply(&self, pages: &mut [Page]) -> bool {
        let Some(target) = pages.iter_mut().find(|p| &p.id == self.page()) else {
            return false;
        };
        match self {
            SinkEvent::Title { title, .. } => target.title = title.clone(),
            SinkEvent::Content { blocks, .. } => {
                target.content = blocks.clone();
                target.ensure_content();
            }
            SinkEvent::Icon { icon, .. } => target.icon = icon.clone(),
            SinkEvent::Date { date, .. } => target.due_date = date.clone(),
            SinkEvent::Status { status, .. } => target.status = *status,
        }
        true
    }
}

/// Any event consumer can be a sink by receiving [`SinkEvent`]s.
pub trait EventSink: Send + 'static {
    fn send(&mut self, event: SinkEvent);
}

impl<T: EventSink> PageSink for T {
    fn update_title(&mut self, page: &PageId, title: &str) {
        self.send(SinkEvent::Title {
            page: page.clone(),
            title: title.to_string(),
        });
    }

    fn update_content(&mut self, page: &PageId, blocks: &[Block]) {
        self.send(SinkEvent::Content {
            page: page.clone(),
            blocks: blocks.to_vec(),
        });
    }

    fn update_icon(&mut self, page: &PageId, icon: Option<&str>) {
        self.send(SinkEvent::Icon {
            page: page.clone(),
            icon: icon.map(str::to_string),
        });
    }

    fn update_date(&mut self, page: &PageId, date: Option<&str>) {
        self.send(SinkEvent::Date {
            page: page.clone(),
            date: date.map(str::to_string),
        });
    }

    fn update_status(&mut self, page: &PageId, status: Option<PageStatus>) {
        self.send(SinkEvent::Status {
            page: page.clone(),
            status,
        });
    }
}

/// Collects events in memory.
impl EventSink for Vec<SinkEvent> {
    fn send(&mut self, event: SinkEvent) {
        self.push(event);
    }
}

/// Forwards events over a channel to whoever persists them.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn send(&mut self, event: SinkEvent) {
        if self.tx.send(event).is_err() {
            debug!("sink receiver dropped; update discarded");
        }
    }
}
