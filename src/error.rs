//! Error types for pagepool operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::buffer_pool::{BufferPool, ReplacementStrategy};
use crate::storage::page::PageId;

/// Result type alias using [`PoolError`].
pub type Result<T> = std::result::Result<T, PoolError>;

/// Error types for buffer pool and page file operations.
#[derive(Debug, Error)]
pub enum PoolError {
    // ==================== Page File Errors ====================
    /// The backing page file does not exist or cannot be opened.
    #[error("Page file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// A read or write addressed a page outside `[0, num_pages)`.
    #[error("Page {page} is out of range (file has {num_pages} pages)")]
    PageOutOfRange { page: PageId, num_pages: u32 },

    /// A relative read stepped back from the first page.
    #[error("There is no page before page 0")]
    BeforeFirstPage,

    /// General storage/I/O error.
    #[error("Storage error: {0}")]
    StorageError(String),

    // ==================== Buffer Pool Errors ====================
    /// Pin on a miss with every frame busy.
    #[error("Buffer pool is full: all {num_frames} frames are in use")]
    BufferFull { num_frames: usize },

    /// The page is not resident in the buffer pool.
    #[error("Page {page} is not in the buffer pool")]
    NotInBuffer { page: PageId },

    /// `mark_dirty` on a page that is not resident.
    #[error("Cannot mark page {page} dirty: page is not in the buffer pool")]
    DirtyFailed { page: PageId },

    /// Writing a page back to the page file failed.
    #[error("Failed to flush page {page}: {reason}")]
    FlushFailed { page: PageId, reason: String },

    /// Shutdown attempted while frames are still pinned.
    #[error("Cannot shut down buffer pool: {pinned_frames} frame(s) still pinned")]
    BufferShutdownFailed { pinned_frames: usize },

    /// Shutdown attempted through a shared handle while other handles exist.
    #[error("Cannot shut down buffer pool: {handles} handle(s) still in use")]
    PoolInUse { handles: usize },

    /// Eviction requested under a strategy with no replacement policy.
    #[error("Replacement strategy {0} has no eviction policy")]
    UnsupportedStrategy(ReplacementStrategy),

    /// Invalid buffer pool configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PoolError {
    /// Creates a flush failure for `page`.
    pub fn flush_failed(page: PageId, reason: impl Into<String>) -> Self {
        Self::FlushFailed {
            page,
            reason: reason.into(),
        }
    }

    /// Returns true if the caller may retry once other frames are released.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BufferFull { .. })
    }
}

/// Returned by [`BufferPool::shutdown`] when the pool refuses to close.
///
/// The pool is handed back untouched so pinned frames can be released and
/// shutdown retried.
pub struct ShutdownError {
    pool: BufferPool,
    source: PoolError,
}

impl ShutdownError {
    pub(crate) fn new(pool: BufferPool, source: PoolError) -> Self {
        Self { pool, source }
    }

    /// Returns the reason shutdown was refused.
    #[must_use]
    pub fn error(&self) -> &PoolError {
        &self.source
    }

    /// Recovers the still-open pool.
    #[must_use]
    pub fn into_pool(self) -> BufferPool {
        self.pool
    }

    /// Splits into the pool and the reason shutdown was refused.
    #[must_use]
    pub fn into_parts(self) -> (BufferPool, PoolError) {
        (self.pool, self.source)
    }
}

impl std::fmt::Debug for ShutdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownError")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Shutdown refused: {}", self.source)
    }
}

impl std::error::Error for ShutdownError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<ShutdownError> for PoolError {
    fn from(err: ShutdownError) -> Self {
        err.source
    }
}
