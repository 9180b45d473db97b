//! Storage module for paged data.
//!
//! This module provides the storage layer for pagepool:
//! - Page-level I/O ([`page`])
//! - Buffer pool management ([`buffer_pool`])

pub mod buffer_pool;
pub mod page;

// Re-export commonly used types
pub use buffer_pool::{
    BufferPool, BufferPoolStats, PageHandle, ReplacementStrategy, SharedBufferPool,
};
pub use page::{PageFile, PageId, PAGE_SIZE};
