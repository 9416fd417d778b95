//! Command history mirrored to a flat, line-oriented file.
//!
//! The in-memory list grows without bound for the life of a session; only the
//! most recent [`MAX_PERSISTED_ENTRIES`] lines are ever written back to disk.

use anyhow::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const MAX_PERSISTED_ENTRIES: usize = 1000;
pub const DEFAULT_RECENT: usize = 20;

pub struct HistoryStore {
    path: Option<PathBuf>,
    entries: Vec<String>,
}

impl HistoryStore {
    /// Creates a store backed by `path` without reading it yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: Vec::new(),
        }
    }

    /// A store with no backing file; `persist` is a no-op.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Vec::new(),
        }
    }

    /// Opens the store and loads it, logging and ignoring a load failure.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        if let Err(e) = store.load() {
            warn!("Ignoring unreadable history file: {}", e);
        }
        store
    }

    /// Opens the resolved history path, or keeps history in memory only when
    /// no path could be resolved (e.g. no home directory).
    pub fn open_resolved(path: Result<PathBuf>) -> Self {
        match path {
            Ok(path) => Self::open(path),
            Err(e) => {
                warn!("History will not be saved: {}", e);
                Self::in_memory()
            }
        }
    }

    /// Reads the backing file. A missing file leaves the store empty; on a
    /// read error the store is also left empty.
    pub fn load(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No history file at {}", path.display());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.entries = content.lines().map(str::to_string).collect();
        debug!("Loaded {} history entries from {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Records `line` and persists immediately. Returns `Ok(false)` for
    /// blank input, which is not recorded.
    pub fn append(&mut self, line: &str) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(false);
        }
        self.entries.push(line.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Overwrites the backing file with the newest entries, oldest first.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let start = self.entries.len().saturating_sub(MAX_PERSISTED_ENTRIES);
        let mut content = self.entries[start..].join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// The last `n` entries paired with their 1-based position in the full list.
    pub fn recent(&self, n: usize) -> Vec<(usize, &str)> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..]
            .iter()
            .enumerate()
            .map(|(offset, entry)| (start + offset + 1, entry.as_str()))
            .collect()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
