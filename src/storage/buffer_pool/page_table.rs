//! Page table mapping resident page IDs to frame IDs.

use super::buffer_frame::FrameId;
use crate::storage::page::PageId;

/// Fibonacci hashing multiplier, 2^32 / golden ratio.
const FIB_MULTIPLIER: u32 = 0x9E37_79B9;

#[derive(Debug, Clone, Copy)]
struct Entry {
    page: PageId,
    frame: FrameId,
}

/// Fixed-size chained hash table from page ID to frame ID.
///
/// The bucket count is the next power of two at or above twice the number of
/// frames and never changes. Keys are hashed with multiplicative (Fibonacci)
/// hashing, and colliding keys share a bucket chain. Each page ID appears at
/// most once.
#[derive(Debug)]
pub struct PageTable {
    buckets: Box<[Vec<Entry>]>,
    /// Right shift that keeps the top `log2(buckets)` bits of the product.
    shift: u32,
    len: usize,
}

impl PageTable {
    /// Creates a page table sized for `num_frames` resident pages.
    #[must_use]
    pub fn new(num_frames: usize) -> Self {
        let num_buckets = (num_frames.max(1) * 2).next_power_of_two();
        let shift = u32::BITS - num_buckets.trailing_zeros();

        Self {
            buckets: (0..num_buckets).map(|_| Vec::new()).collect(),
            shift,
            len: 0,
        }
    }

    #[inline]
    fn bucket_of(&self, page: PageId) -> usize {
        (page.get().wrapping_mul(FIB_MULTIPLIER) >> self.shift) as usize
    }

    /// Returns the frame holding `page`, if resident.
    #[must_use]
    pub fn get(&self, page: PageId) -> Option<FrameId> {
        self.buckets[self.bucket_of(page)]
            .iter()
            .find(|entry| entry.page == page)
            .map(|entry| entry.frame)
    }

    /// Returns true if `page` has a binding.
    #[must_use]
    pub fn contains(&self, page: PageId) -> bool {
        self.get(page).is_some()
    }

    /// Binds `page` to `frame`, overwriting any existing binding for `page`.
    pub fn insert(&mut self, page: PageId, frame: FrameId) {
        let bucket = self.bucket_of(page);
        let chain = &mut self.buckets[bucket];
        if let Some(entry) = chain.iter_mut().find(|entry| entry.page == page) {
            entry.frame = frame;
        } else {
            chain.push(Entry { page, frame });
            self.len += 1;
        }
    }

    /// Removes the binding for `page`. No-op if absent.
    pub fn remove(&mut self, page: PageId) -> Option<FrameId> {
        let bucket = self.bucket_of(page);
        let chain = &mut self.buckets[bucket];
        let pos = chain.iter().position(|entry| entry.page == page)?;
        self.len -= 1;
        Some(chain.swap_remove(pos).frame)
    }

    /// Rebinds a frame that is being repurposed from `old` to `new`.
    ///
    /// Both steps happen under one `&mut` borrow, so no caller can observe the
    /// frame mapped to `old` once the new page is bound.
    pub fn replace(&mut self, old: Option<PageId>, new: PageId, frame: FrameId) {
        if let Some(old) = old {
            self.remove(old);
        }
        self.insert(new, frame);
    }

    /// Returns the number of bound pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no page is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the fixed number of buckets.
    #[must_use]
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Iterates over all `(page, frame)` bindings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (PageId, FrameId)> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|entry| (entry.page, entry.frame)))
    }
}
