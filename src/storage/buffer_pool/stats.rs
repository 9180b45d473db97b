//! Buffer pool I/O statistics.

/// Counters accumulated from pool initialization on.
///
/// Every counter only grows; a new pool starts from zero.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct IoCounters {
    pub reads: u64,
    pub writes: u64,
    pub hits: u64,
}

/// Snapshot of buffer pool counters and occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPoolStats {
    /// Number of frames in the pool.
    pub num_frames: usize,
    /// Frames currently holding a page.
    pub resident_pages: usize,
    /// Resident frames marked dirty.
    pub dirty_pages: usize,
    /// Frames with an outstanding fix.
    pub pinned_pages: usize,
    /// Pages read from the page file (misses).
    pub disk_reads: u64,
    /// Pages written to the page file.
    pub disk_writes: u64,
    /// Pins served without disk I/O.
    pub cache_hits: u64,
}

impl BufferPoolStats {
    /// Returns the total number of pin requests (hits + misses).
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.cache_hits + self.disk_reads
    }

    /// Calculates the cache hit rate (0.0 to 1.0).
    ///
    /// Returns `None` if no page has been pinned yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.total_requests();
        if total == 0 {
            None
        } else {
            Some(self.cache_hits as f64 / total as f64)
        }
    }
}
