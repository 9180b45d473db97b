//! Buffer frames and the backing frame storage.

use crate::storage::page::{PageId, PAGE_SIZE};

/// Index of a frame in the buffer pool, fixed for the pool's lifetime.
pub type FrameId = usize;

/// Descriptor of one slot in the buffer pool.
///
/// Each frame tracks:
/// - The page currently resident (if any)
/// - Whether the page has been modified (dirty)
/// - Whether a caller has pinned it since the last unpin
/// - How many pins are outstanding (fix count)
///
/// `pinned` is a single bit: any unpin clears it even while `fix_count` is
/// still above zero. `fix_count` is the authoritative in-use counter.
#[derive(Debug, Clone)]
pub struct BufferFrame {
    /// Index of this frame in the buffer pool.
    pub frame_id: FrameId,
    /// The page currently resident in this frame, if any.
    pub page_id: Option<PageId>,
    /// Whether the page has been modified since last flush.
    pub dirty: bool,
    /// Set by pin, cleared by any unpin.
    pub pinned: bool,
    /// Number of pins not yet matched by an unpin.
    pub fix_count: u32,
}

impl BufferFrame {
    /// Creates a new empty buffer frame.
    #[must_use]
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            page_id: None,
            dirty: false,
            pinned: false,
            fix_count: 0,
        }
    }

    /// Records one more pin.
    pub fn pin(&mut self) {
        self.pinned = true;
        self.fix_count = self.fix_count.saturating_add(1);
    }

    /// Records one unpin. Never drops the fix count below zero.
    pub fn unpin(&mut self) {
        self.pinned = false;
        self.fix_count = self.fix_count.saturating_sub(1);
    }

    /// Returns whether a pin or an unmatched fix keeps this frame in use.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pinned || self.fix_count > 0
    }

    /// Returns whether this frame is empty (no page resident).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_id.is_none()
    }

    /// Resets the frame to empty state.
    pub fn reset(&mut self) {
        self.page_id = None;
        self.dirty = false;
        self.pinned = false;
        self.fix_count = 0;
    }
}

/// The frame descriptors plus one contiguous block of page-sized storage.
#[derive(Debug)]
pub struct FrameTable {
    frames: Vec<BufferFrame>,
    data: Box<[u8]>,
}

impl FrameTable {
    /// Allocates `num_frames` empty frames and zeroed storage.
    #[must_use]
    pub fn new(num_frames: usize) -> Self {
        Self {
            frames: (0..num_frames).map(BufferFrame::new).collect(),
            data: vec![0u8; num_frames * PAGE_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the table has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the descriptor of a frame.
    #[must_use]
    pub fn frame(&self, frame_id: FrameId) -> &BufferFrame {
        &self.frames[frame_id]
    }

    /// Returns the mutable descriptor of a frame.
    pub fn frame_mut(&mut self, frame_id: FrameId) -> &mut BufferFrame {
        &mut self.frames[frame_id]
    }

    /// Iterates over all frame descriptors in frame order.
    pub fn iter(&self) -> std::slice::Iter<'_, BufferFrame> {
        self.frames.iter()
    }

    /// Returns the page bytes held by a frame.
    #[must_use]
    pub fn data(&self, frame_id: FrameId) -> &[u8] {
        let start = frame_id * PAGE_SIZE;
        &self.data[start..start + PAGE_SIZE]
    }

    /// Returns the page bytes held by a frame, mutably.
    pub fn data_mut(&mut self, frame_id: FrameId) -> &mut [u8] {
        let start = frame_id * PAGE_SIZE;
        &mut self.data[start..start + PAGE_SIZE]
    }
}
