//! Editing session actor.
//!
//! Owns an [`Editor`] on a single task and serializes all access to it.
//! Commands from any number of [`SessionHandle`]s and fired timers are
//! processed one at a time, so no lock guards editor state.
//!
//! The actor plays the host: after each command or fired timer it runs the
//! editor's post-render work against its [`BufferSurface`], before replying,
//! so a caller always observes a rendered surface.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use blockpad_doc::{BufferSurface, EditSurface, FocusTarget};
use blockpad_types::Page;

use crate::command::EditorCommand;
use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::error::{Result, SessionError};
use crate::sink::PageSink;
use crate::timer::TimerQueue;

/// Messages accepted by the session task.
enum SessionMessage {
    Command {
        command: EditorCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<Option<Page>>,
    },
    Focused {
        reply: oneshot::Sender<Option<FocusTarget>>,
    },
    ElementText {
        target: FocusTarget,
        reply: oneshot::Sender<Option<String>>,
    },
    SavePending {
        reply: oneshot::Sender<bool>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

/// Handle for talking to a running session. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl std::fmt::Debug for SessionMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMessage::Command { command, .. } => write!(f, "Command({})", command.name()),
            SessionMessage::Snapshot { .. } => f.write_str("Snapshot"),
            SessionMessage::Focused { .. } => f.write_str("Focused"),
            SessionMessage::ElementText { target, .. } => write!(f, "ElementText({})", target),
            SessionMessage::SavePending { .. } => f.write_str("SavePending"),
            SessionMessage::Flush { .. } => f.write_str("Flush"),
        }
    }
}

impl SessionHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| SessionError::Shutdown)?;
        rx.await.map_err(|_| SessionError::Shutdown)
    }

    /// Apply a command and wait for its result.
    pub async fn dispatch(&self, command: EditorCommand) -> Result<()> {
        self.request(|reply| SessionMessage::Command { command, reply })
            .await?
    }

    pub async fn load(&self, page: Option<Page>) -> Result<()> {
        self.dispatch(EditorCommand::Load(page)).await
    }

    /// The active page as the editor currently holds it.
    pub async fn snapshot(&self) -> Result<Option<Page>> {
        self.request(|reply| SessionMessage::Snapshot { reply }).await
    }

    pub async fn focused(&self) -> Result<Option<FocusTarget>> {
        self.request(|reply| SessionMessage::Focused { reply }).await
    }

    /// Live text of a mounted element.
    pub async fn element_text(&self, target: FocusTarget) -> Result<Option<String>> {
        self.request(|reply| SessionMessage::ElementText { target, reply })
            .await
    }

    pub async fn save_pending(&self) -> Result<bool> {
        self.request(|reply| SessionMessage::SavePending { reply }).await
    }

    /// Save pending title and content changes now.
    pub async fn flush(&self) -> Result<()> {
        self.request(|reply| SessionMessage::Flush { reply }).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The session task.
pub struct EditorSession<K: PageSink> {
    editor: Editor<BufferSurface, K>,
    timers: TimerQueue,
}

impl<K: PageSink> EditorSession<K> {
    /// Spawn a session on the current runtime.
    ///
    /// The task ends when every handle has been dropped.
    pub fn spawn(config: EditorConfig, sink: K) -> SessionHandle {
        let (editor, timers) = Editor::new(config, BufferSurface::new(), sink);
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self { editor, timers };
        tokio::spawn(session.run(rx));
        SessionHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionMessage>) {
        info!("editor session started");
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    self.handle(msg);
                }
                Some(timed) = self.timers.recv() => {
                    self.editor.on_timer(timed);
                    self.editor.after_render();
                }
            }
        }
        info!("editor session stopped");
    }

    fn handle(&mut self, msg: SessionMessage) {
        debug!("session message {:?}", msg);
        match msg {
            SessionMessage::Command { command, reply } => {
                let result = self.editor.dispatch(command);
                self.editor.after_render();
                let _ = reply.send(result);
            }
            SessionMessage::Snapshot { reply } => {
                let _ = reply.send(self.editor.page());
            }
            SessionMessage::Focused { reply } => {
                let _ = reply.send(self.editor.surface().focused().cloned());
            }
            SessionMessage::ElementText { target, reply } => {
                let _ = reply.send(self.editor.surface().text(&target));
            }
            SessionMessage::SavePending { reply } => {
                let _ = reply.send(self.editor.save_pending());
            }
            SessionMessage::Flush { reply } => {
                self.editor.flush();
                let _ = reply.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sink::{ChannelSink, SinkEvent};
    use blockpad_types::{Block, BlockId};

    fn page() -> Page {
        Page::new("Journal")
            .with_id("p1")
            .with_content(vec![Block::paragraph("first").with_id("b1")])
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_render_automatically() {
        let (sink, _events) = ChannelSink::new();
        let handle = EditorSession::spawn(EditorConfig::default(), sink);
        handle.load(Some(page())).await.unwrap();

        let target = FocusTarget::Block(BlockId::from("b1"));
        handle.dispatch(EditorCommand::Focus(target.clone())).await.unwrap();
        assert_eq!(handle.focused().await.unwrap(), Some(target.clone()));
        assert_eq!(
            handle.element_text(target).await.unwrap().as_deref(),
            Some("first")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_reach_the_sink() {
        let (sink, mut events) = ChannelSink::new();
        let handle = EditorSession::spawn(EditorConfig::default(), sink);
        handle.load(Some(page())).await.unwrap();
        handle
            .dispatch(EditorCommand::SetTitle("Journal 2".into()))
            .await
            .unwrap();
        assert!(handle.save_pending().await.unwrap());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            SinkEvent::Title {
                page: "p1".into(),
                title: "Journal 2".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_returned_to_caller() {
        let (sink, _events) = ChannelSink::new();
        let handle = EditorSession::spawn(EditorConfig::default(), sink);
        handle.load(Some(page())).await.unwrap();
        let err = handle
            .dispatch(EditorCommand::Delete(BlockId::from("missing")))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Doc(_)));

        let snapshot = handle.snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.content.len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_one_session() {
        let (sink, _events) = ChannelSink::new();
        let handle = EditorSession::spawn(EditorConfig::default(), sink);
        let other = handle.clone();
        handle.load(Some(page())).await.unwrap();
        let snapshot = other.snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.title, "Journal");
    }
}
