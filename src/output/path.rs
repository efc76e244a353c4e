//! Per-target on-disk layout
//!
//! Each fetch target owns a directory under the output root:
//!
//! ```text
//! {root}/{target}/posts_{target}.json
//! {root}/{target}/with_content/posts_with_{target}.json
//! {root}/{target}/without_content/posts_without_{target}.json
//! {root}/{target}/state_{target}.json
//! ```

use std::path::{Path, PathBuf};

use super::{OutputError, OutputResult};

/// File locations for one fetch target.
#[derive(Debug, Clone)]
pub struct TargetPaths {
    dir: PathBuf,
    target: String,
}

impl TargetPaths {
    /// Build the layout for `target` under `root`.
    ///
    /// The target identifier is sanitized for filesystem safety: `/`, `\`,
    /// `:` and `..` are replaced with `_`.
    pub fn new(root: &Path, target: &str) -> Self {
        let target = sanitize_target(target);
        Self {
            dir: root.join(&target),
            target,
        }
    }

    /// The sanitized target identifier.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Combined collection of every fetched post.
    pub fn all_posts_file(&self) -> PathBuf {
        self.dir.join(format!("posts_{}.json", self.target))
    }

    /// Collection of posts with a non-empty body.
    pub fn with_content_file(&self) -> PathBuf {
        self.dir
            .join("with_content")
            .join(format!("posts_with_{}.json", self.target))
    }

    /// Collection of posts lacking a body.
    pub fn without_content_file(&self) -> PathBuf {
        self.dir
            .join("without_content")
            .join(format!("posts_without_{}.json", self.target))
    }

    /// The persisted cursor file.
    pub fn cursor_file(&self) -> PathBuf {
        self.dir.join(format!("state_{}.json", self.target))
    }

    /// Create the target directory tree.
    ///
    /// # Errors
    /// Returns [`OutputError::Io`] if a directory cannot be created.
    pub fn ensure_directories(&self) -> OutputResult<()> {
        for dir in [
            self.dir.clone(),
            self.dir.join("with_content"),
            self.dir.join("without_content"),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                OutputError::Io(format!("failed to create {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }
}

/// Replace path-hostile characters in a target identifier.
fn sanitize_target(target: &str) -> String {
    target
        .replace("..", "_")
        .replace(['/', '\\', ':'], "_")
}
