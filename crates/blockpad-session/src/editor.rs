//! The editor: one active page, one surface, one sink.
//!
//! `Editor` wires the pure engine in `blockpad-doc` to time and the outside
//! world. It routes [`EditorCommand`]s to document mutations, schedules the
//! deferred work they need (debounced saves, to-do removal, table focus), and
//! runs post-render work when the host reports a render.
//!
//! ```text
//!   dispatch(cmd) ──▶ BlockDocument mutation ──▶ content debounce restarted
//!        │
//!   after_render() ──▶ surface.render ──▶ guard.settle ──▶ focus.flush
//!        │
//!   on_timer(t) ──▶ FlushTitle / FlushContent ──▶ PageSink
//! ```
//!
//! The editor never calls the sink from inside a mutation: saves go through
//! the debouncer, and icon/date/status write through from their own commands.

use tracing::{debug, info};

use blockpad_doc::{
    BlockDocument, Caret, ContentSync, DragController, EditSurface, FocusRequest, FocusScheduler,
    FocusTarget, Retype, TabDirection, TransitionGuard,
};
use blockpad_types::{Block, BlockId, BlockType, Page};

use crate::command::EditorCommand;
use crate::config::EditorConfig;
use crate::error::Result;
use crate::sink::PageSink;
use crate::timer::{Deferred, Timed, TimerQueue, Timers};

/// The loaded page and what was last handed to the sink.
#[derive(Debug)]
struct ActivePage {
    /// Page metadata. `page.content` is stale; the document owns the blocks.
    page: Page,
    doc: BlockDocument,
    saved_title: String,
    saved_content: Vec<Block>,
}

impl ActivePage {
    fn new(page: Page) -> Self {
        let doc = BlockDocument::load(&page);
        Self {
            saved_title: page.title.clone(),
            saved_content: doc.blocks().to_vec(),
            doc,
            page,
        }
    }

    fn flush_title(&mut self, sink: &mut impl PageSink) {
        if self.page.title != self.saved_title {
            sink.update_title(&self.page.id, &self.page.title);
            self.saved_title = self.page.title.clone();
        }
    }

    fn flush_content(&mut self, sink: &mut impl PageSink) {
        if self.doc.blocks() != self.saved_content.as_slice() {
            sink.update_content(&self.page.id, self.doc.blocks());
            self.saved_content = self.doc.blocks().to_vec();
        }
    }
}

/// Editing session state for a single active page.
pub struct Editor<S: EditSurface, K: PageSink> {
    config: EditorConfig,
    surface: S,
    sink: K,
    timers: Timers,
    active: Option<ActivePage>,
    sync: ContentSync,
    guard: TransitionGuard,
    focus: FocusScheduler,
    drag: DragController,
    /// `(timer epoch, document version)` last drawn on the surface.
    rendered: Option<(u64, u64)>,
}

impl<S: EditSurface, K: PageSink> Editor<S, K> {
    /// Create an editor with no page loaded.
    ///
    /// Fired timers arrive on the returned queue and must be handed back
    /// through [`on_timer`](Self::on_timer).
    pub fn new(config: EditorConfig, surface: S, sink: K) -> (Self, TimerQueue) {
        let (timers, queue) = Timers::new();
        let editor = Self {
            config,
            surface,
            sink,
            timers,
            active: None,
            sync: ContentSync::new(),
            guard: TransitionGuard::default(),
            focus: FocusScheduler::new(),
            drag: DragController::new(),
            rendered: None,
        };
        (editor, queue)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn document(&self) -> Option<&BlockDocument> {
        self.active.as_ref().map(|a| &a.doc)
    }

    pub fn guard(&self) -> &TransitionGuard {
        &self.guard
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn has_page(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a title or content save is still waiting on its debounce.
    pub fn save_pending(&self) -> bool {
        self.timers.save_pending()
    }

    /// The active page with its current title and blocks.
    pub fn page(&self) -> Option<Page> {
        self.active.as_ref().map(|a| Page {
            content: a.doc.blocks().to_vec(),
            ..a.page.clone()
        })
    }

    fn version(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.doc.version())
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Apply one user gesture.
    ///
    /// Without a page loaded, everything but `Load` and `Render` is ignored.
    pub fn dispatch(&mut self, command: EditorCommand) -> Result<()> {
        if command.needs_page() && self.active.is_none() {
            debug!("no page loaded; {} ignored", command.name());
            return Ok(());
        }
        debug!("dispatch {}", command.name());

        let loading = matches!(command, EditorCommand::Load(_));
        let before = self.version();
        let result = self.apply(command);
        if !loading && self.version() != before {
            self.timers.debounce_content(self.config.content_debounce());
        }
        result
    }

    fn apply(&mut self, command: EditorCommand) -> Result<()> {
        match command {
            EditorCommand::Load(page) => self.load(page),
            EditorCommand::SetTitle(title) => {
                if let Some(active) = self.active.as_mut() {
                    active.page.title = title;
                    self.timers.debounce_title(self.config.title_debounce());
                }
            }
            EditorCommand::SetIcon(icon) => {
                if let Some(active) = self.active.as_mut() {
                    self.sink.update_icon(&active.page.id, icon.as_deref());
                    active.page.icon = icon;
                }
            }
            EditorCommand::SetDueDate(date) => {
                if let Some(active) = self.active.as_mut() {
                    self.sink.update_date(&active.page.id, date.as_deref());
                    active.page.due_date = date;
                }
            }
            EditorCommand::SetStatus(status) => {
                if let Some(active) = self.active.as_mut() {
                    self.sink.update_status(&active.page.id, status);
                    active.page.status = status;
                }
            }

            EditorCommand::Focus(target) => self.focus_element(target),
            EditorCommand::Input { target, text } => {
                if !self.surface.type_text(&target, &text) {
                    debug!("input for unmounted {} dropped", target);
                }
            }
            EditorCommand::MoveCaret(offset) => self.surface.set_caret(offset),
            EditorCommand::Blur => {
                if let Some(target) = self.surface.blur() {
                    self.commit_element(&target)?;
                }
            }
            EditorCommand::Enter => self.enter()?,
            EditorCommand::Backspace => self.backspace()?,
            EditorCommand::Tab(direction) => self.tab(direction)?,

            EditorCommand::Retype { block, kind } => self.retype(block, kind)?,
            EditorCommand::ToggleTodo { block, checked } => {
                if let Some(active) = self.active.as_mut()
                    && active.doc.set_checked(&block, checked)?
                    && checked
                {
                    self.timers
                        .after(self.config.todo_removal(), Deferred::RemoveCompletedTodo(block));
                }
            }
            EditorCommand::Delete(block) => {
                if let Some(active) = self.active.as_mut() {
                    active.doc.delete_block(&block)?;
                    self.sync.forget(&block);
                }
            }
            EditorCommand::SetImage { block, src } => {
                if let Some(active) = self.active.as_mut() {
                    active.doc.set_image(&block, &src)?;
                }
            }

            EditorCommand::InsertRow { block, after } => {
                if let Some(active) = self.active.as_mut() {
                    let target = active.doc.insert_row(&block, after)?;
                    self.focus.request(FocusRequest::start(target));
                }
            }
            EditorCommand::InsertColumn { block, after } => {
                if let Some(active) = self.active.as_mut() {
                    let target = active.doc.insert_column(&block, after)?;
                    self.focus.request(FocusRequest::start(target));
                }
            }
            EditorCommand::DeleteRow { block, row } => {
                if let Some(active) = self.active.as_mut() {
                    active.doc.delete_row(&block, row)?;
                }
            }
            EditorCommand::DeleteColumn { block, column } => {
                if let Some(active) = self.active.as_mut() {
                    active.doc.delete_column(&block, column)?;
                }
            }
            EditorCommand::SetTableHeaders { block, enabled } => {
                if let Some(active) = self.active.as_mut() {
                    active.doc.set_table_headers(&block, enabled)?;
                }
            }

            EditorCommand::DragStart(block) => self.drag.start(block),
            EditorCommand::DragOver { target, rect, y } => {
                self.drag.over(target, rect, y);
            }
            EditorCommand::Drop => {
                if let Some(active) = self.active.as_mut() {
                    self.drag.drop_on(&mut active.doc);
                }
            }
            EditorCommand::DragEnd => self.drag.cancel(),

            EditorCommand::Render => self.after_render(),
        }
        Ok(())
    }

    /// Replace the active page and reset all derived state.
    ///
    /// Pending saves for the previous page are dropped with its timers.
    fn load(&mut self, page: Option<Page>) {
        self.timers.reset();
        self.sync.clear();
        self.focus.clear();
        self.drag.cancel();
        self.guard = TransitionGuard::default();
        self.surface.blur();
        self.rendered = None;

        match &page {
            Some(p) => info!("editing page {} ({})", p.id, p.title),
            None => info!("no page loaded"),
        }
        self.active = page.map(ActivePage::new);
    }

    fn focus_element(&mut self, target: FocusTarget) {
        if !self.surface.focus(&target, Caret::End) {
            debug!("focus on unmounted {} ignored", target);
            return;
        }
        if let (FocusTarget::Block(id), Some(active)) = (&target, &self.active) {
            self.sync.capture(&active.doc, id);
        }
    }

    /// Commit an element's live content into the model.
    fn commit_element(&mut self, target: &FocusTarget) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let Some(live) = self.surface.text(target) else {
            debug!("blur of unmounted {}", target);
            return Ok(());
        };
        match target {
            FocusTarget::Block(id) => {
                let outcome = self.sync.commit_blur(&mut active.doc, &self.guard, id, &live);
                debug!("blur {}: {:?}", id, outcome);
            }
            FocusTarget::Cell { block, row, cell } => {
                // A cell whose table was retyped away is stale, not an error.
                if let Err(e) = active.doc.set_cell_text(block, row, cell, &live) {
                    debug!("cell blur discarded: {}", e);
                }
            }
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let Some(FocusTarget::Block(id)) = self.surface.focused().cloned() else {
            return Ok(());
        };
        let target = FocusTarget::Block(id.clone());
        let live = self.surface.text(&target).unwrap_or_default();
        let caret = self
            .surface
            .caret(&target)
            .unwrap_or_else(|| live.chars().count());

        let split = active.doc.split_block(&id, &live, caret)?;
        self.sync.forget(&id);
        if let Some(request) = split.focus(&id) {
            self.focus.request(request);
        }
        Ok(())
    }

    fn backspace(&mut self) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let Some(FocusTarget::Block(id)) = self.surface.focused().cloned() else {
            return Ok(());
        };
        let live = self
            .surface
            .text(&FocusTarget::Block(id.clone()))
            .unwrap_or_default();
        if let Some(request) = active.doc.merge_backspace(&id, &live)? {
            self.sync.forget(&id);
            self.focus.request(request);
        }
        Ok(())
    }

    fn tab(&mut self, direction: TabDirection) -> Result<()> {
        let Some(target) = self.surface.focused().cloned() else {
            return Ok(());
        };
        let FocusTarget::Cell { block, row, cell } = &target else {
            return Ok(());
        };
        self.commit_element(&target)?;
        let Some(active) = self.active.as_ref() else {
            return Ok(());
        };
        if let Some(next) = active.doc.tab_from(block, row, cell, direction)? {
            self.focus.request(FocusRequest::end(next));
        }
        Ok(())
    }

    fn retype(&mut self, block: BlockId, kind: BlockType) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        self.guard.begin(&block);
        let outcome = match active.doc.retype(&block, kind, self.config.table_size()) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.guard.settle();
                return Err(e.into());
            }
        };
        self.sync.forget(&block);

        match outcome {
            Retype::Unchanged => {}
            Retype::Text => self
                .focus
                .request(FocusRequest::end(FocusTarget::Block(block))),
            Retype::Image => self.surface.request_image(&block),
            Retype::Table(first) => self
                .timers
                .after(self.config.table_focus(), Deferred::FocusCell(first)),
        }
        Ok(())
    }

    // =========================================================================
    // Post-render
    // =========================================================================

    /// Draw if the document changed, settle the retype guard, place the caret.
    pub fn after_render(&mut self) {
        let current = self.version().map(|v| (self.timers.epoch(), v));
        if current != self.rendered || current.is_none() {
            match &self.active {
                Some(active) => self.surface.render(active.doc.blocks()),
                None => self.surface.render(&[]),
            }
            self.rendered = current;
        }

        self.guard.settle();

        if let Some(FocusTarget::Block(id)) = self.focus.flush(&mut self.surface)
            && let Some(active) = &self.active
        {
            self.sync.capture(&active.doc, &id);
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Handle a fired timer. Timers from a previous page are ignored.
    pub fn on_timer(&mut self, timed: Timed) {
        if !self.timers.is_current(&timed) {
            debug!("stale timer {:?} ignored", timed.deferred);
            return;
        }
        let Some(active) = self.active.as_mut() else {
            return;
        };

        match timed.deferred {
            Deferred::FlushTitle => active.flush_title(&mut self.sink),
            Deferred::FlushContent => active.flush_content(&mut self.sink),
            Deferred::RemoveCompletedTodo(id) => {
                if active.doc.remove_completed(&id) {
                    debug!("completed to-do {} removed", id);
                    self.sync.forget(&id);
                    self.timers.debounce_content(self.config.content_debounce());
                }
            }
            Deferred::FocusCell(target) => {
                if self.surface.contains(&target) {
                    self.surface.focus(&target, Caret::Start);
                } else {
                    self.focus.request(FocusRequest::start(target));
                }
            }
        }
    }

    /// Save title and content now instead of waiting out their debounce.
    pub fn flush(&mut self) {
        self.timers.cancel_saves();
        if let Some(active) = self.active.as_mut() {
            active.flush_title(&mut self.sink);
            active.flush_content(&mut self.sink);
        }
    }

    /// Apply every timer that has already fired.
    pub fn pump(&mut self, queue: &mut TimerQueue) -> usize {
        let mut handled = 0;
        while let Ok(timed) = queue.try_recv() {
            self.on_timer(timed);
            handled += 1;
        }
        handled
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sink::SinkEvent;
    use blockpad_doc::{BufferSurface, DropPosition, Rect};
    use blockpad_types::{PageId, PageStatus, TableContent};

    type TestEditor = Editor<BufferSurface, Vec<SinkEvent>>;

    fn page() -> Page {
        Page::new("Notes").with_id("p1").with_content(vec![
            Block::paragraph("hello").with_id("b1"),
            Block::paragraph("world").with_id("b2"),
        ])
    }

    fn editor_with(page: Page) -> (TestEditor, TimerQueue) {
        let (mut editor, queue) = Editor::new(EditorConfig::default(), BufferSurface::new(), Vec::new());
        editor.dispatch(EditorCommand::Load(Some(page))).unwrap();
        editor.after_render();
        (editor, queue)
    }

    fn block(id: &str) -> FocusTarget {
        FocusTarget::Block(BlockId::from(id))
    }

    async fn advance(editor: &mut TestEditor, queue: &mut TimerQueue, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        editor.pump(queue);
        editor.after_render();
    }

    fn texts(editor: &TestEditor) -> Vec<String> {
        editor
            .document()
            .unwrap()
            .blocks()
            .iter()
            .map(|b| b.text().unwrap_or("<table>").to_string())
            .collect()
    }

    fn content_saves(editor: &TestEditor) -> usize {
        editor
            .sink()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Content { .. }))
            .count()
    }

    // ── Typing and blur ─────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_type_and_blur_saves_after_debounce() {
        let (mut editor, mut queue) = editor_with(page());
        editor.dispatch(EditorCommand::Focus(block("b1"))).unwrap();
        editor
            .dispatch(EditorCommand::Input {
                target: block("b1"),
                text: "hello there".into(),
            })
            .unwrap();
        editor.dispatch(EditorCommand::Blur).unwrap();
        assert_eq!(texts(&editor), vec!["hello there", "world"]);
        assert!(editor.sink().is_empty());

        advance(&mut editor, &mut queue, 600).await;
        assert_eq!(content_saves(&editor), 1);
        let SinkEvent::Content { page, blocks } = &editor.sink()[0] else {
            panic!("expected a content save");
        };
        assert_eq!(page, &PageId::from("p1"));
        assert_eq!(blocks[0].text(), Some("hello there"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_blur_never_saves() {
        let (mut editor, mut queue) = editor_with(page());
        editor.dispatch(EditorCommand::Focus(block("b1"))).unwrap();
        editor.dispatch(EditorCommand::Blur).unwrap();
        advance(&mut editor, &mut queue, 1000).await;
        assert!(editor.sink().is_empty());
    }

    // ── Enter / Backspace ───────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_enter_splits_at_caret_and_focuses_new_block() {
        let (mut editor, _queue) = editor_with(page());
        editor.dispatch(EditorCommand::Focus(block("b1"))).unwrap();
        editor.dispatch(EditorCommand::MoveCaret(2)).unwrap();
        editor.dispatch(EditorCommand::Enter).unwrap();
        editor.dispatch(EditorCommand::Render).unwrap();

        assert_eq!(texts(&editor), vec!["he", "llo", "world"]);
        let new_id = editor.document().unwrap().blocks()[1].id.clone();
        let target = FocusTarget::Block(new_id);
        assert_eq!(editor.surface().focused(), Some(&target));
        assert_eq!(editor.surface().caret(&target), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backspace_on_empty_block_focuses_previous_end() {
        let p = Page::new("x").with_content(vec![
            Block::paragraph("abc").with_id("b1"),
            Block::paragraph("").with_id("b2"),
        ]);
        let (mut editor, _queue) = editor_with(p);
        editor.dispatch(EditorCommand::Focus(block("b2"))).unwrap();
        editor.dispatch(EditorCommand::Backspace).unwrap();
        editor.dispatch(EditorCommand::Render).unwrap();

        assert_eq!(texts(&editor), vec!["abc"]);
        assert_eq!(editor.surface().focused(), Some(&block("b1")));
        assert_eq!(editor.surface().caret(&block("b1")), Some(3));
    }

    // ── Retype race ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_blur_racing_retype_is_discarded() {
        let (mut editor, mut queue) = editor_with(page());
        editor.dispatch(EditorCommand::Focus(block("b1"))).unwrap();
        editor
            .dispatch(EditorCommand::Input {
                target: block("b1"),
                text: "late typing".into(),
            })
            .unwrap();
        editor
            .dispatch(EditorCommand::Retype {
                block: BlockId::from("b1"),
                kind: BlockType::Table,
            })
            .unwrap();
        assert!(editor.guard().is_active());

        // Old element blurs before the grid renders.
        editor.dispatch(EditorCommand::Blur).unwrap();
        let grid = editor.document().unwrap().blocks()[0].grid().cloned().unwrap();
        assert_eq!((grid.row_count(), grid.column_count()), (2, 3));

        editor.dispatch(EditorCommand::Render).unwrap();
        assert!(!editor.guard().is_active());

        // First cell focused once the table has had time to mount.
        advance(&mut editor, &mut queue, 60).await;
        let (row, cell) = grid.ids_at(0, 0).unwrap();
        let first = FocusTarget::cell(BlockId::from("b1"), row, cell);
        assert_eq!(editor.surface().focused(), Some(&first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retype_to_image_requests_picker() {
        let (mut editor, _queue) = editor_with(page());
        editor
            .dispatch(EditorCommand::Retype {
                block: BlockId::from("b2"),
                kind: BlockType::Image,
            })
            .unwrap();
        assert_eq!(editor.surface_mut().take_image_requests(), vec![BlockId::from("b2")]);
        editor
            .dispatch(EditorCommand::SetImage {
                block: BlockId::from("b2"),
                src: "cat.png".into(),
            })
            .unwrap();
        assert_eq!(texts(&editor)[1], "cat.png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retype_missing_block_errors_and_clears_guard() {
        let (mut editor, _queue) = editor_with(page());
        let result = editor.dispatch(EditorCommand::Retype {
            block: BlockId::from("nope"),
            kind: BlockType::Code,
        });
        assert!(result.is_err());
        assert!(!editor.guard().is_active());
    }

    // ── To-do completion ────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_checked_todo_removed_after_delay() {
        let p = Page::new("x").with_content(vec![
            Block::todo("task", false).with_id("t1"),
            Block::paragraph("rest").with_id("b2"),
        ]);
        let (mut editor, mut queue) = editor_with(p);
        editor
            .dispatch(EditorCommand::ToggleTodo {
                block: BlockId::from("t1"),
                checked: true,
            })
            .unwrap();
        assert!(editor.document().unwrap().blocks()[0].is_checked());

        advance(&mut editor, &mut queue, 100).await;
        assert_eq!(editor.document().unwrap().len(), 2);

        advance(&mut editor, &mut queue, 300).await;
        assert_eq!(texts(&editor), vec!["rest"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchecked_before_delay_survives() {
        let p = Page::new("x").with_content(vec![Block::todo("task", false).with_id("t1")]);
        let (mut editor, mut queue) = editor_with(p);
        let t1 = BlockId::from("t1");
        editor
            .dispatch(EditorCommand::ToggleTodo { block: t1.clone(), checked: true })
            .unwrap();
        editor
            .dispatch(EditorCommand::ToggleTodo { block: t1.clone(), checked: false })
            .unwrap();
        advance(&mut editor, &mut queue, 500).await;
        assert_eq!(editor.document().unwrap().blocks()[0].kind, BlockType::Todo);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sole_checked_todo_becomes_empty_paragraph() {
        let p = Page::new("x").with_content(vec![Block::todo("only", false).with_id("t1")]);
        let (mut editor, mut queue) = editor_with(p);
        editor
            .dispatch(EditorCommand::ToggleTodo {
                block: BlockId::from("t1"),
                checked: true,
            })
            .unwrap();
        advance(&mut editor, &mut queue, 400).await;
        let doc = editor.document().unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].kind, BlockType::Paragraph);
    }

    // ── Title debounce ──────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_rapid_title_edits_save_once() {
        let (mut editor, mut queue) = editor_with(page());
        for title in ["N", "No", "Not", "Notes v2"] {
            editor.dispatch(EditorCommand::SetTitle(title.into())).unwrap();
            advance(&mut editor, &mut queue, 100).await;
        }
        advance(&mut editor, &mut queue, 600).await;
        let titles: Vec<_> = editor
            .sink()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Title { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["Notes v2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_restored_before_expiry_saves_nothing() {
        let (mut editor, mut queue) = editor_with(page());
        editor.dispatch(EditorCommand::SetTitle("Other".into())).unwrap();
        editor.dispatch(EditorCommand::SetTitle("Notes".into())).unwrap();
        advance(&mut editor, &mut queue, 600).await;
        assert!(editor.sink().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_without_waiting() {
        let (mut editor, mut queue) = editor_with(page());
        editor.dispatch(EditorCommand::SetTitle("Now".into())).unwrap();
        editor
            .dispatch(EditorCommand::Delete(BlockId::from("b1")))
            .unwrap();
        editor.flush();
        assert_eq!(editor.sink().len(), 2);
        assert!(!editor.save_pending());

        advance(&mut editor, &mut queue, 1000).await;
        assert_eq!(editor.sink().len(), 2);
    }

    // ── Immediate writes ────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_icon_date_status_write_through() {
        let (mut editor, _queue) = editor_with(page());
        editor.dispatch(EditorCommand::SetIcon(Some("🗒".into()))).unwrap();
        editor
            .dispatch(EditorCommand::SetDueDate(Some("2024-06-01".into())))
            .unwrap();
        editor
            .dispatch(EditorCommand::SetStatus(Some(PageStatus::Done)))
            .unwrap();
        assert_eq!(editor.sink().len(), 3);
        let page = editor.page().unwrap();
        assert_eq!(page.icon.as_deref(), Some("🗒"));
        assert_eq!(page.status, Some(PageStatus::Done));
    }

    // ── Page switch ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_page_switch_drops_pending_save() {
        let (mut editor, mut queue) = editor_with(page());
        editor
            .dispatch(EditorCommand::Delete(BlockId::from("b2")))
            .unwrap();
        assert!(editor.save_pending());

        let other = Page::new("Other").with_id("p2");
        editor.dispatch(EditorCommand::Load(Some(other))).unwrap();
        advance(&mut editor, &mut queue, 1000).await;
        assert!(editor.sink().is_empty());
        assert_eq!(editor.page().unwrap().id, PageId::from("p2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_null_page_ignores_mutations() {
        let (mut editor, _queue) =
            Editor::new(EditorConfig::default(), BufferSurface::new(), Vec::<SinkEvent>::new());
        editor
            .dispatch(EditorCommand::Delete(BlockId::from("b1")))
            .unwrap();
        editor.dispatch(EditorCommand::SetTitle("x".into())).unwrap();
        editor.dispatch(EditorCommand::Render).unwrap();
        assert!(editor.page().is_none());
        assert!(editor.surface().targets().is_empty());
    }

    // ── Tables ──────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_cell_edit_and_tab_navigation() {
        let grid = TableContent::from_strings(vec![vec!["a", "b"], vec!["c", "d"]]);
        let p = Page::new("t").with_content(vec![Block::table(grid.clone()).with_id("t")]);
        let (mut editor, _queue) = editor_with(p);
        let t = BlockId::from("t");
        let (r0, c0) = grid.ids_at(0, 0).unwrap();
        let first = FocusTarget::cell(t.clone(), r0, c0);

        editor.dispatch(EditorCommand::Focus(first.clone())).unwrap();
        editor
            .dispatch(EditorCommand::Input {
                target: first.clone(),
                text: "A".into(),
            })
            .unwrap();
        editor.dispatch(EditorCommand::Tab(TabDirection::Forward)).unwrap();
        editor.dispatch(EditorCommand::Render).unwrap();

        let table = editor.document().unwrap().blocks()[0].grid().cloned().unwrap();
        assert_eq!(table.cell(0, 0).unwrap().content, "A");
        let (r1, c1) = grid.ids_at(0, 1).unwrap();
        assert_eq!(editor.surface().focused(), Some(&FocusTarget::cell(t, r1, c1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_row_focuses_new_row() {
        let p = Page::new("t").with_content(vec![Block::table(TableContent::grid(1, 2)).with_id("t")]);
        let (mut editor, _queue) = editor_with(p);
        editor
            .dispatch(EditorCommand::InsertRow {
                block: BlockId::from("t"),
                after: 0,
            })
            .unwrap();
        editor.dispatch(EditorCommand::Render).unwrap();
        let grid = editor.document().unwrap().blocks()[0].grid().cloned().unwrap();
        assert_eq!(grid.row_count(), 2);
        let (row, cell) = grid.ids_at(1, 0).unwrap();
        assert_eq!(
            editor.surface().focused(),
            Some(&FocusTarget::cell(BlockId::from("t"), row, cell))
        );
    }

    // ── Drag ────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_drag_reorder_and_cancel() {
        let (mut editor, _queue) = editor_with(page());
        editor.dispatch(EditorCommand::DragStart(BlockId::from("b2"))).unwrap();
        editor
            .dispatch(EditorCommand::DragOver {
                target: BlockId::from("b1"),
                rect: Rect::new(0.0, 20.0),
                y: 3.0,
            })
            .unwrap();
        assert_eq!(
            editor.drag().indicator().map(|i| i.position),
            Some(DropPosition::Before)
        );
        editor.dispatch(EditorCommand::Drop).unwrap();
        assert_eq!(texts(&editor), vec!["world", "hello"]);

        editor.dispatch(EditorCommand::DragStart(BlockId::from("b2"))).unwrap();
        editor.dispatch(EditorCommand::DragEnd).unwrap();
        editor.dispatch(EditorCommand::Drop).unwrap();
        assert_eq!(texts(&editor), vec!["world", "hello"]);
    }
}
