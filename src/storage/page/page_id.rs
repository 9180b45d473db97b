//! Page number type.

use serde::{Deserialize, Serialize};

/// Number of a page within the page file, counted from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u32);

impl PageId {
    /// Creates a new page ID.
    #[must_use]
    pub const fn new(page_num: u32) -> Self {
        Self(page_num)
    }

    /// Returns the raw page number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the byte offset of this page within the page file.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.0 as u64) * (super::PAGE_SIZE as u64)
    }
}

impl From<u32> for PageId {
    fn from(page_num: u32) -> Self {
        Self(page_num)
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
