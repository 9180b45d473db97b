//! Buffer pool management for page caching.
//!
//! This module implements a fixed-capacity buffer pool in front of a
//! [`PageFile`]. It provides:
//! - Page pinning and unpinning with fix counts
//! - FIFO and LRU replacement over an intrusive candidate queue
//! - Deferred write-back of dirty pages on eviction, flush or shutdown
//! - Exact read/write/hit counters
//!
//! # Architecture
//!
//! A [`PageTable`] maps resident pages to frames. Frames that have never held
//! a page sit in the free queue; once filled they move to the replacement
//! queue, whose head is the next eviction candidate. A frame with the
//! `pinned` bit set or a non-zero fix count is never chosen.
//!
//! # Example
//!
//! ```ignore
//! let mut pool = BufferPool::init(path, 3, ReplacementStrategy::Lru)?;
//! let handle = pool.pin(PageId::new(1))?;
//! pool.page_mut(&handle)?[0] = 42;
//! pool.mark_dirty(handle.page_id())?;
//! pool.unpin(handle.page_id())?;
//! pool.shutdown()?;
//! ```

mod buffer_frame;
mod eviction;
mod page_table;
mod shared;
mod stats;
mod strategy;

pub use buffer_frame::{BufferFrame, FrameId, FrameTable};
pub use eviction::CandidateQueue;
pub use page_table::PageTable;
pub use shared::SharedBufferPool;
pub use stats::BufferPoolStats;
pub use strategy::ReplacementStrategy;

use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::config::BufferPoolConfig;
use crate::error::{PoolError, Result, ShutdownError};
use crate::storage::page::{PageFile, PageId};
use stats::IoCounters;

/// Buffer pool caching pages of one page file in a fixed set of frames.
pub struct BufferPool {
    /// Backing page file.
    page_file: PageFile,
    /// Replacement strategy chosen at init.
    strategy: ReplacementStrategy,
    /// Frame descriptors and page storage.
    frames: FrameTable,
    /// Maps resident page IDs to frame indices.
    page_table: PageTable,
    /// Frames that have never held a page.
    free_list: CandidateQueue,
    /// Eviction order; present only for strategies with a policy.
    replacement: Option<CandidateQueue>,
    /// Disk read/write and hit counters.
    counters: IoCounters,
}

/// A pinned page: the page ID and the frame it occupies.
///
/// Access the bytes through [`BufferPool::page`] and
/// [`BufferPool::page_mut`]. The handle stays valid until the page is
/// unpinned and its frame reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle {
    page_id: PageId,
    frame_id: FrameId,
}

impl PageHandle {
    /// Returns the page ID.
    #[must_use]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the frame holding the page.
    #[must_use]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl BufferPool {
    /// Opens `page_file` and creates a pool of `num_frames` empty frames.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the page file does not exist, or
    /// `InvalidConfig` if `num_frames` is 0.
    pub fn init(page_file: &Path, num_frames: usize, strategy: ReplacementStrategy) -> Result<Self> {
        if num_frames == 0 {
            return Err(PoolError::InvalidConfig(
                "Buffer pool must have at least one frame".into(),
            ));
        }

        let page_file = PageFile::open(page_file)?;

        info!(
            path = %page_file.path().display(),
            num_frames,
            %strategy,
            num_pages = page_file.num_pages(),
            "buffer pool initialized"
        );

        Ok(Self {
            page_file,
            strategy,
            frames: FrameTable::new(num_frames),
            page_table: PageTable::new(num_frames),
            free_list: CandidateQueue::filled(num_frames),
            replacement: strategy
                .has_eviction_policy()
                .then(|| CandidateQueue::new(num_frames)),
            counters: IoCounters::default(),
        })
    }

    /// Creates a pool from a configuration, creating the page file first if
    /// the configuration allows it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the page file
    /// cannot be opened.
    pub fn open(config: &BufferPoolConfig) -> Result<Self> {
        config.validate()?;
        if config.create_if_missing && !config.page_file.exists() {
            debug!(path = %config.page_file.display(), "creating page file");
            PageFile::create(&config.page_file)?;
        }
        Self::init(&config.page_file, config.num_frames, config.strategy)
    }

    /// Pins a page, loading it from the page file if it is not resident.
    ///
    /// Each pin must be matched by an [`unpin`](Self::unpin). While the fix
    /// count is above zero the page stays in its frame.
    ///
    /// # Errors
    ///
    /// - `PageOutOfRange` if the page is past the end of the page file
    /// - `BufferFull` if every frame is in use
    /// - `UnsupportedStrategy` if an eviction is needed and the strategy has
    ///   no policy
    /// - `FlushFailed` if the chosen victim is dirty and cannot be written
    pub fn pin(&mut self, page_id: PageId) -> Result<PageHandle> {
        if let Some(frame_id) = self.page_table.get(page_id) {
            if self.strategy.touches_on_hit() {
                if let Some(queue) = self.replacement.as_mut() {
                    queue.touch(frame_id);
                }
            }
            self.counters.hits += 1;
            trace!(page = %page_id, frame_id, "buffer hit");
            return Ok(self.fix(frame_id, page_id));
        }

        let num_pages = self.page_file.num_pages();
        if page_id.get() >= num_pages {
            warn!(page = %page_id, num_pages, "pin past end of page file");
            return Err(PoolError::PageOutOfRange {
                page: page_id,
                num_pages,
            });
        }

        let frame_id = self.claim_frame()?;
        let previous = self.frames.frame(frame_id).page_id;

        if let Err(err) = self
            .page_file
            .read_page(page_id, self.frames.data_mut(frame_id))
        {
            self.release_frame(frame_id, previous);
            return Err(err);
        }

        self.page_table.replace(previous, page_id, frame_id);
        let frame = self.frames.frame_mut(frame_id);
        frame.page_id = Some(page_id);
        frame.dirty = false;
        self.counters.reads += 1;
        trace!(page = %page_id, frame_id, "buffer miss");

        Ok(self.fix(frame_id, page_id))
    }

    /// Appends a zero-filled page to the page file and pins it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot grow or the page cannot be pinned.
    pub fn new_page(&mut self) -> Result<PageHandle> {
        let page_id = self.page_file.append_empty_page()?;
        self.pin(page_id)
    }

    /// Releases one pin on a page.
    ///
    /// Clears the `pinned` bit and decrements the fix count, which never goes
    /// below zero.
    ///
    /// # Errors
    ///
    /// Returns `NotInBuffer` if the page is not resident.
    pub fn unpin(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self
            .page_table
            .get(page_id)
            .ok_or(PoolError::NotInBuffer { page: page_id })?;
        self.frames.frame_mut(frame_id).unpin();
        trace!(page = %page_id, frame_id, "unpinned");
        Ok(())
    }

    /// Marks a resident page as modified.
    ///
    /// # Errors
    ///
    /// Returns `DirtyFailed` if the page is not resident.
    pub fn mark_dirty(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self
            .page_table
            .get(page_id)
            .ok_or(PoolError::DirtyFailed { page: page_id })?;
        self.frames.frame_mut(frame_id).dirty = true;
        Ok(())
    }

    /// Writes a resident page back to the page file.
    ///
    /// The write is counted even if the page is clean. The dirty flag is
    /// cleared only when no fix is outstanding.
    ///
    /// # Errors
    ///
    /// Returns `FlushFailed` if the page is not resident or the write fails.
    pub fn force_page(&mut self, page_id: PageId) -> Result<()> {
        let frame_id = self
            .page_table
            .get(page_id)
            .ok_or_else(|| PoolError::flush_failed(page_id, "page is not in the buffer pool"))?;
        self.write_back(frame_id, page_id)
    }

    /// Writes every dirty resident page back to the page file.
    ///
    /// # Errors
    ///
    /// Returns `FlushFailed` on the first page that cannot be written.
    pub fn force_flush_pool(&mut self) -> Result<()> {
        let dirty: Vec<(FrameId, PageId)> = self
            .frames
            .iter()
            .filter(|frame| frame.dirty)
            .filter_map(|frame| frame.page_id.map(|page_id| (frame.frame_id, page_id)))
            .collect();

        if !dirty.is_empty() {
            debug!(pages = dirty.len(), "flushing dirty pages");
        }
        for (frame_id, page_id) in dirty {
            self.write_back(frame_id, page_id)?;
        }
        Ok(())
    }

    /// Flushes all dirty pages and closes the page file.
    ///
    /// # Errors
    ///
    /// Refuses with the pool handed back intact if a flush fails
    /// (`FlushFailed`) or a frame is still pinned (`BufferShutdownFailed`).
    pub fn shutdown(mut self) -> std::result::Result<(), ShutdownError> {
        if let Err(err) = self.force_flush_pool() {
            warn!(error = %err, "buffer pool shutdown aborted by failed flush");
            return Err(ShutdownError::new(self, err));
        }

        let pinned_frames = self.frames.iter().filter(|frame| frame.pinned).count();
        if pinned_frames > 0 {
            warn!(pinned_frames, "refusing to shut down buffer pool with pinned frames");
            return Err(ShutdownError::new(
                self,
                PoolError::BufferShutdownFailed { pinned_frames },
            ));
        }

        let path = self.page_file.path().to_path_buf();
        let page_file = self.page_file;
        if let Err((page_file, err)) = page_file.close() {
            warn!(error = %err, "buffer pool shutdown aborted by failed close");
            self.page_file = page_file;
            return Err(ShutdownError::new(self, err));
        }

        info!(
            path = %path.display(),
            disk_reads = self.counters.reads,
            disk_writes = self.counters.writes,
            cache_hits = self.counters.hits,
            "buffer pool shut down"
        );
        Ok(())
    }

    /// Returns the bytes of a pinned page.
    ///
    /// # Errors
    ///
    /// Returns `NotInBuffer` if the handle's frame no longer holds its page.
    pub fn page(&self, handle: &PageHandle) -> Result<&[u8]> {
        self.check_handle(handle)?;
        Ok(self.frames.data(handle.frame_id))
    }

    /// Returns the bytes of a pinned page for modification.
    ///
    /// Writing does not mark the page dirty; call
    /// [`mark_dirty`](Self::mark_dirty) to have the change written back.
    ///
    /// # Errors
    ///
    /// Returns `NotInBuffer` if the handle's frame no longer holds its page.
    pub fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut [u8]> {
        self.check_handle(handle)?;
        Ok(self.frames.data_mut(handle.frame_id))
    }

    /// Appends a zero-filled page to the page file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be extended.
    pub fn append_empty_page(&mut self) -> Result<PageId> {
        self.page_file.append_empty_page()
    }

    /// Grows the page file to at least `num_pages` pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be extended.
    pub fn ensure_capacity(&mut self, num_pages: u32) -> Result<()> {
        self.page_file.ensure_capacity(num_pages)
    }

    /// Returns the number of pages in the page file.
    #[must_use]
    pub fn num_pages_in_file(&self) -> u32 {
        self.page_file.num_pages()
    }

    /// Returns the path of the page file.
    #[must_use]
    pub fn page_file_path(&self) -> &Path {
        self.page_file.path()
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Returns the replacement strategy.
    #[must_use]
    pub fn strategy(&self) -> ReplacementStrategy {
        self.strategy
    }

    /// Returns true if the page is resident.
    #[must_use]
    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.page_table.contains(page_id)
    }

    /// Returns the resident page of each frame, indexed by frame ID.
    #[must_use]
    pub fn frame_contents(&self) -> Vec<Option<PageId>> {
        self.frames.iter().map(|frame| frame.page_id).collect()
    }

    /// Returns the dirty flag of each frame, indexed by frame ID.
    #[must_use]
    pub fn dirty_flags(&self) -> Vec<bool> {
        self.frames.iter().map(|frame| frame.dirty).collect()
    }

    /// Returns the fix count of each frame, indexed by frame ID.
    #[must_use]
    pub fn fix_counts(&self) -> Vec<u32> {
        self.frames.iter().map(|frame| frame.fix_count).collect()
    }

    /// Returns the number of pages read from the page file.
    #[must_use]
    pub fn read_count(&self) -> u64 {
        self.counters.reads
    }

    /// Returns the number of pages written to the page file.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.counters.writes
    }

    /// Returns the number of pins served from the pool.
    #[must_use]
    pub fn hit_count(&self) -> u64 {
        self.counters.hits
    }

    /// Returns buffer pool statistics.
    #[must_use]
    pub fn stats(&self) -> BufferPoolStats {
        let mut dirty_pages = 0;
        let mut pinned_pages = 0;

        for frame in self.frames.iter().filter(|frame| !frame.is_empty()) {
            if frame.dirty {
                dirty_pages += 1;
            }
            if frame.fix_count > 0 {
                pinned_pages += 1;
            }
        }

        BufferPoolStats {
            num_frames: self.frames.len(),
            resident_pages: self.page_table.len(),
            dirty_pages,
            pinned_pages,
            disk_reads: self.counters.reads,
            disk_writes: self.counters.writes,
            cache_hits: self.counters.hits,
        }
    }

    /// Internal: Records a pin on a frame that now holds `page_id`.
    fn fix(&mut self, frame_id: FrameId, page_id: PageId) -> PageHandle {
        let frame = self.frames.frame_mut(frame_id);
        frame.page_id = Some(page_id);
        frame.pin();
        PageHandle { page_id, frame_id }
    }

    /// Internal: Takes a free frame, or evicts one.
    fn claim_frame(&mut self) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.pop_front() {
            // A filled frame is an eviction candidate from now on
            if let Some(queue) = self.replacement.as_mut() {
                queue.push_back(frame_id);
            }
            return Ok(frame_id);
        }

        self.evict_frame()
    }

    /// Internal: Picks the first idle frame from the head of the replacement
    /// queue and writes it back if dirty.
    fn evict_frame(&mut self) -> Result<FrameId> {
        let Some(queue) = self.replacement.as_ref() else {
            return Err(PoolError::UnsupportedStrategy(self.strategy));
        };

        let frames = &self.frames;
        let victim = queue
            .find_from_head(|frame_id| !frames.frame(frame_id).is_busy())
            .ok_or(PoolError::BufferFull {
                num_frames: frames.len(),
            })?;

        let frame = self.frames.frame(victim);
        if let (true, Some(old_page)) = (frame.dirty, frame.page_id) {
            self.write_back(victim, old_page)?;
        }

        debug!(
            frame_id = victim,
            page = ?self.frames.frame(victim).page_id,
            strategy = %self.strategy,
            "evicting frame"
        );

        // The victim is about to hold a freshly loaded page
        if let Some(queue) = self.replacement.as_mut() {
            queue.push_back(victim);
        }
        Ok(victim)
    }

    /// Internal: Returns a claimed frame to the free queue after a failed load.
    fn release_frame(&mut self, frame_id: FrameId, previous: Option<PageId>) {
        if let Some(page_id) = previous {
            self.page_table.remove(page_id);
        }
        self.frames.frame_mut(frame_id).reset();
        if let Some(queue) = self.replacement.as_mut() {
            queue.unlink(frame_id);
        }
        self.free_list.push_back(frame_id);
    }

    /// Internal: Writes a frame to its page and updates the dirty flag.
    fn write_back(&mut self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        self.page_file
            .write_page(page_id, self.frames.data(frame_id))
            .map_err(|e| PoolError::flush_failed(page_id, e.to_string()))?;
        self.counters.writes += 1;

        let frame = self.frames.frame_mut(frame_id);
        if frame.fix_count == 0 {
            frame.dirty = false;
        }
        trace!(page = %page_id, frame_id, "page written back");
        Ok(())
    }

    fn check_handle(&self, handle: &PageHandle) -> Result<()> {
        let holds_page = handle.frame_id < self.frames.len()
            && self.frames.frame(handle.frame_id).page_id == Some(handle.page_id);
        if holds_page {
            Ok(())
        } else {
            Err(PoolError::NotInBuffer {
                page: handle.page_id,
            })
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("page_file", &self.page_file)
            .field("strategy", &self.strategy)
            .field("num_frames", &self.frames.len())
            .field("resident_pages", &self.page_table.len())
            .finish_non_exhaustive()
    }
}
