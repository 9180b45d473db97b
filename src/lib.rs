//! pagepool - fixed-capacity page cache over a flat page file.
//!
//! Table and index managers pin pages by number, read and modify the frame
//! bytes, mark them dirty and unpin them. The pool loads pages on demand,
//! defers writes until a page is forced, flushed or evicted, and never
//! evicts a page that is still pinned.
//!
//! ```ignore
//! use pagepool::{BufferPool, BufferPoolConfig, PageId, ReplacementStrategy};
//!
//! let config = BufferPoolConfig::new("table.bin")
//!     .with_num_frames(16)
//!     .with_strategy(ReplacementStrategy::Lru)
//!     .with_create_if_missing(true);
//! let mut pool = BufferPool::open(&config)?;
//! let page = pool.append_empty_page()?;
//! let handle = pool.pin(page)?;
//! pool.page_mut(&handle)?[..5].copy_from_slice(b"hello");
//! pool.mark_dirty(page)?;
//! pool.unpin(page)?;
//! pool.shutdown()?;
//! ```

pub mod config;
pub mod error;
pub mod storage;

pub use config::BufferPoolConfig;
pub use error::{PoolError, Result, ShutdownError};
pub use storage::{
    BufferPool, BufferPoolStats, PageFile, PageHandle, PageId, ReplacementStrategy,
    SharedBufferPool, PAGE_SIZE,
};
