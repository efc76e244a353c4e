//! Durable cursor persistence
//!
//! Implements atomic write-then-rename with an advisory file lock, so a crash
//! mid-save leaves either the old cursor or the new one on disk, never a
//! partial file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tracing::{debug, info};

use super::{Cursor, ResumeError, ResumeResult};

/// Loads and saves the cursor file for one fetch target.
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    /// Create a store backed by the given cursor file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted cursor, or `None` if no state file exists yet.
    ///
    /// # Errors
    /// Returns [`ResumeError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(&self) -> ResumeResult<Option<Cursor>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no cursor file, starting fresh");
            return Ok(None);
        }

        let lock_file = self.open_lock_file()?;
        let lock = RwLock::new(lock_file);
        let _guard = lock
            .read()
            .map_err(|e| ResumeError::Lock(format!("failed to acquire read lock: {e}")))?;

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ResumeError::Io(format!("failed to read {}: {e}", self.path.display())))?;
        let cursor: Cursor = serde_json::from_str(&contents).map_err(|e| {
            ResumeError::Corrupt(format!("unparseable cursor {}: {e}", self.path.display()))
        })?;

        info!(
            path = %self.path.display(),
            since_id = ?cursor.since_id,
            "resuming from persisted cursor"
        );
        Ok(Some(cursor))
    }

    /// Atomically persist the cursor.
    ///
    /// Writes to a temp file in the same directory, syncs it, renames over
    /// the target, and syncs the directory.
    ///
    /// # Errors
    /// Returns [`ResumeError`] on any I/O failure along the way.
    pub fn save(&self, cursor: &Cursor) -> ResumeResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ResumeError::Io(format!("failed to create state dir: {e}")))?;
        }

        let json = serde_json::to_string_pretty(cursor)
            .map_err(|e| ResumeError::Serialization(e.to_string()))?;

        let lock_file = self.open_lock_file()?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock
            .write()
            .map_err(|e| ResumeError::Lock(format!("failed to acquire write lock: {e}")))?;

        let parent_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
            .map_err(|e| ResumeError::Io(format!("failed to create temp file: {e}")))?;
        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| ResumeError::Io(format!("failed to write temp file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| ResumeError::Io(format!("failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| ResumeError::Io(format!("failed to sync temp file: {e}")))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| ResumeError::Io(format!("failed to persist cursor: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        debug!(path = %self.path.display(), since_id = ?cursor.since_id, "cursor saved");
        Ok(())
    }

    fn open_lock_file(&self) -> ResumeResult<std::fs::File> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.path.with_extension("lock"))
            .map_err(|e| ResumeError::Lock(format!("failed to open lock file: {e}")))
    }
}
