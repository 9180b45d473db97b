//! Page-level storage primitives.
//!
//! This module defines the page abstractions the buffer pool sits on:
//! - `PageId`: Number of a page within the page file
//! - `PageFile`: Flat file of fixed-size pages
//! - `PAGE_SIZE`: Size of every page and every buffer frame

mod page_file;
mod page_id;

pub use page_file::PageFile;
pub use page_id::PageId;

/// Page size in bytes (4KB).
pub const PAGE_SIZE: usize = 4096;
