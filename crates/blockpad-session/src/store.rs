//! JSON snapshot file holding every page.
//!
//! Reads go through the sanitizer, so a damaged or legacy file still loads.
//! Writes are atomic: the snapshot is written to a temp file in the same
//! directory and renamed over the old one.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use blockpad_doc::{Sanitized, parse_snapshot};
use blockpad_types::Page;

use crate::error::StoreError;
use crate::sink::{EventSink, SinkEvent};

/// A snapshot file on disk.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and sanitize the snapshot. A missing file is an empty workspace.
    pub fn load(&self) -> Result<Sanitized, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no snapshot at {}", self.path.display());
                return Ok(Sanitized::default());
            }
            Err(e) => return Err(e.into()),
        };
        let sanitized = parse_snapshot(&text)?;
        if !sanitized.is_clean() {
            info!(
                "{}: {} repairs applied on load",
                self.path.display(),
                sanitized.notes.len()
            );
        }
        Ok(sanitized)
    }

    /// Replace the snapshot with `pages`.
    pub fn save(&self, pages: &[Page]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, pages)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        debug!("saved {} pages to {}", pages.len(), self.path.display());
        Ok(())
    }
}

/// Sink that applies each update to an in-memory copy and rewrites the file.
#[derive(Debug)]
pub struct StoreSink {
    store: SnapshotStore,
    pages: Vec<Page>,
}

impl StoreSink {
    /// Load the current snapshot and start tracking it.
    pub fn open(store: SnapshotStore) -> Result<Self, StoreError> {
        let pages = store.load()?.pages;
        Ok(Self { store, pages })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: &blockpad_types::PageId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }
}

impl EventSink for StoreSink {
    fn send(&mut self, event: SinkEvent) {
        if !event.apply(&mut self.pages) {
            warn!("update for unknown page {} dropped", event.page());
            return;
        }
        if let Err(e) = self.store.save(&self.pages) {
            warn!("failed to save {}: {}", self.store.path().display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::PageSink;
    use blockpad_types::{Block, PageId};

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("pages.json"));
        let loaded = store.load().unwrap();
        assert!(loaded.pages.is_empty());
        assert!(loaded.is_clean());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("pages.json"));
        let pages = vec![
            Page::new("Home").with_id("home"),
            Page::new("Child")
                .with_id("child")
                .with_parent(Some(PageId::from("home")))
                .with_content(vec![Block::todo("water plants", true)]),
        ];
        store.save(&pages).unwrap();
        let loaded = store.load().unwrap();
        assert!(loaded.is_clean(), "{:?}", loaded.notes);
        assert_eq!(loaded.pages, pages);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.json");
        std::fs::write(&path, "[{").unwrap();
        let err = SnapshotStore::new(path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[test]
    fn test_store_sink_persists_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("pages.json"));
        store.save(&[Page::new("Draft").with_id("p")]).unwrap();

        let mut sink = StoreSink::open(store.clone()).unwrap();
        sink.update_title(&PageId::from("p"), "Final");
        sink.update_icon(&PageId::from("ghost"), Some("👻"));

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.pages.len(), 1);
        assert_eq!(reloaded.pages[0].title, "Final");
        assert_eq!(sink.page(&PageId::from("p")).unwrap().title, "Final");
    }
}
