//! Durable pagination cursor
//!
//! The cursor is the only durability mechanism of the fetch loop: it is
//! persisted after every committed page and read back on startup to resume.

pub mod cursor;
pub mod store;

pub use cursor::Cursor;
pub use store::CursorStore;

/// Errors related to cursor persistence
#[derive(Debug, thiserror::Error)]
pub enum ResumeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// The state file exists but cannot be parsed
    #[error("corrupt state file: {0}")]
    Corrupt(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File lock error
    #[error("lock error: {0}")]
    Lock(String),
}

/// Result type for resume operations
pub type ResumeResult<T> = Result<T, ResumeError>;
