//! Deferred work: debounced saves and short UI delays.
//!
//! Each timer is a spawned task that sleeps and then posts a [`Timed`]
//! message back to the session. Timer tasks never touch editor state; only
//! the session applies the message, so all mutation stays on one owner.
//!
//! Debounce windows are restarted by replacing the task handle: dropping the
//! old [`AbortOnDrop`] aborts its sleep. Loading another page bumps the epoch
//! and drops every handle, and any message that still slipped through carries
//! the old epoch and is ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use blockpad_doc::FocusTarget;
use blockpad_types::BlockId;

/// Aborts the wrapped task when dropped.
#[derive(Debug)]
pub struct AbortOnDrop(tokio::task::AbortHandle);

impl AbortOnDrop {
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// What to do when a timer fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Title debounce elapsed.
    FlushTitle,
    /// Content debounce elapsed.
    FlushContent,
    /// A checked to-do's visual delay elapsed.
    RemoveCompletedTodo(BlockId),
    /// A new table has had time to mount; focus its first cell.
    FocusCell(FocusTarget),
}

/// A fired timer, tagged with the page epoch it was scheduled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timed {
    pub epoch: u64,
    pub deferred: Deferred,
}

/// Receiving end of fired timers.
pub type TimerQueue = mpsc::UnboundedReceiver<Timed>;

/// Owns every pending timer of a session.
#[derive(Debug)]
pub struct Timers {
    tx: mpsc::UnboundedSender<Timed>,
    epoch: u64,
    title: Option<AbortOnDrop>,
    content: Option<AbortOnDrop>,
    delayed: Vec<AbortOnDrop>,
}

impl Timers {
    pub fn new() -> (Self, TimerQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            tx,
            epoch: 0,
            title: None,
            content: None,
            delayed: Vec::new(),
        };
        (timers, rx)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a fired timer belongs to the current page.
    pub fn is_current(&self, timed: &Timed) -> bool {
        timed.epoch == self.epoch
    }

    fn spawn(&self, delay: Duration, deferred: Deferred) -> AbortOnDrop {
        let tx = self.tx.clone();
        let timed = Timed {
            epoch: self.epoch,
            deferred,
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session ended.
            let _ = tx.send(timed);
        });
        AbortOnDrop(handle.abort_handle())
    }

    /// Start or restart the title debounce window.
    pub fn debounce_title(&mut self, delay: Duration) {
        self.title = Some(self.spawn(delay, Deferred::FlushTitle));
    }

    /// Start or restart the content debounce window.
    pub fn debounce_content(&mut self, delay: Duration) {
        self.content = Some(self.spawn(delay, Deferred::FlushContent));
    }

    /// Run `deferred` once after `delay`. Not restarted by later calls.
    pub fn after(&mut self, delay: Duration, deferred: Deferred) {
        self.delayed.retain(|t| !t.is_finished());
        let timer = self.spawn(delay, deferred);
        self.delayed.push(timer);
    }

    /// Whether a title or content save is still waiting.
    pub fn save_pending(&self) -> bool {
        let live = |t: &Option<AbortOnDrop>| t.as_ref().is_some_and(|t| !t.is_finished());
        live(&self.title) || live(&self.content)
    }

    /// Cancel pending title and content saves, keeping delayed UI work.
    pub fn cancel_saves(&mut self) {
        self.title = None;
        self.content = None;
    }

    /// Cancel everything and move to a new epoch (page switch).
    pub fn reset(&mut self) {
        let dropped = self.title.is_some() as usize + self.content.is_some() as usize + self.delayed.len();
        self.title = None;
        self.content = None;
        self.delayed.clear();
        self.epoch += 1;
        debug!("timers reset to epoch {} ({} dropped)", self.epoch, dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[tokio::test(start_paused = true)]
    async fn test_debounce_restarts_window() {
        let (mut timers, mut queue) = Timers::new();
        timers.debounce_title(500 * MS);
        tokio::time::sleep(300 * MS).await;
        timers.debounce_title(500 * MS);
        tokio::time::sleep(300 * MS).await;
        assert!(queue.try_recv().is_err());

        let fired = queue.recv().await.unwrap();
        assert_eq!(fired.deferred, Deferred::FlushTitle);
        assert!(timers.is_current(&fired));
        tokio::time::sleep(1000 * MS).await;
        assert!(queue.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_windows() {
        let (mut timers, mut queue) = Timers::new();
        timers.debounce_title(100 * MS);
        timers.debounce_content(200 * MS);
        assert_eq!(queue.recv().await.unwrap().deferred, Deferred::FlushTitle);
        assert_eq!(queue.recv().await.unwrap().deferred, Deferred::FlushContent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_and_bumps_epoch() {
        let (mut timers, mut queue) = Timers::new();
        timers.debounce_content(100 * MS);
        timers.after(50 * MS, Deferred::RemoveCompletedTodo(BlockId::from("t")));
        assert!(timers.save_pending());
        timers.reset();
        assert_eq!(timers.epoch(), 1);
        assert!(!timers.save_pending());
        tokio::time::sleep(500 * MS).await;
        assert!(queue.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_timers_all_fire() {
        let (mut timers, mut queue) = Timers::new();
        timers.after(30 * MS, Deferred::RemoveCompletedTodo(BlockId::from("a")));
        timers.after(10 * MS, Deferred::RemoveCompletedTodo(BlockId::from("b")));
        let first = queue.recv().await.unwrap();
        let second = queue.recv().await.unwrap();
        assert_eq!(first.deferred, Deferred::RemoveCompletedTodo(BlockId::from("b")));
        assert_eq!(second.deferred, Deferred::RemoveCompletedTodo(BlockId::from("a")));
    }

    #[test]
    fn test_stale_epoch_rejected() {
        let (mut timers, _queue) = Timers::new();
        let old = Timed {
            epoch: timers.epoch(),
            deferred: Deferred::FlushContent,
        };
        timers.reset();
        assert!(!timers.is_current(&old));
    }
}
