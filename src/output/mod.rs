//! Append-only post collections
//!
//! A collection file holds `{"data": [...], "meta": {"totalCount": N}}` where
//! `totalCount` always equals the number of stored records. Collections only
//! grow; they are never truncated across restarts. Writes are atomic
//! (temp file, sync, rename) so a crash never leaves a torn file.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PageMeta, Post};

pub mod path;

pub use path::TargetPaths;

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// An existing collection file cannot be parsed
    #[error("corrupt collection: {0}")]
    Corrupt(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// An on-disk aggregate of fetched posts with a maintained count.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostCollection {
    /// Stored posts, in fetch order
    pub data: Vec<Post>,
    /// Collection metadata; `totalCount` tracks `data.len()`
    #[serde(default)]
    pub meta: PageMeta,
}

impl PostCollection {
    /// Load a collection file.
    ///
    /// # Errors
    /// [`OutputError::Io`] if the file cannot be read, [`OutputError::Corrupt`]
    /// if it cannot be parsed.
    pub fn load(path: &Path) -> OutputResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OutputError::Io(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| OutputError::Corrupt(format!("{}: {e}", path.display())))
    }

    fn append(&mut self, posts: &[&Post]) {
        self.data.extend(posts.iter().map(|p| (*p).clone()));
        self.meta.total_count = self.data.len() as i64;
    }
}

/// Append-only writer for one collection file.
pub struct PostSink {
    path: PathBuf,
}

impl PostSink {
    /// Create a sink backed by the given collection file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append posts to the collection, creating it if absent.
    ///
    /// Reads the existing collection, extends it, updates the count, and
    /// atomically rewrites the file. Returns the new total count.
    ///
    /// # Errors
    /// Returns [`OutputError`] on read, parse, or write failure.
    pub fn append(&self, posts: &[&Post]) -> OutputResult<u64> {
        let mut collection = if self.path.exists() {
            PostCollection::load(&self.path)?
        } else {
            PostCollection::default()
        };

        collection.append(posts);
        self.write_atomic(&collection)?;

        debug!(
            path = %self.path.display(),
            appended = posts.len(),
            total = collection.meta.total_count,
            "collection updated"
        );
        Ok(collection.meta.total_count as u64)
    }

    fn write_atomic(&self, collection: &PostCollection) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::Io(format!("failed to create output dir: {e}")))?;
        }

        let json = serde_json::to_string(collection)
            .map_err(|e| OutputError::Serialization(e.to_string()))?;

        let parent_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
            .map_err(|e| OutputError::Io(format!("failed to create temp file: {e}")))?;
        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| OutputError::Io(format!("failed to write temp file: {e}")))?;
        temp_file
            .flush()
            .map_err(|e| OutputError::Io(format!("failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| OutputError::Io(format!("failed to sync temp file: {e}")))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| OutputError::Io(format!("failed to persist collection: {e}")))?;

        Ok(())
    }
}
