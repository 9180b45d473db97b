//! Candidate queues for the buffer pool.
//!
//! One implementation serves both the free list (frames never yet used) and
//! the replacement list (FIFO insertion order, or LRU recency order with the
//! most recently touched frame at the tail).

use super::buffer_frame::FrameId;

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<FrameId>,
    next: Option<FrameId>,
    linked: bool,
}

/// Ordered queue of frame IDs stored as an intrusive list over the frame
/// array.
///
/// Links are frame indices, so unlinking or moving a frame to the tail is
/// O(1) and needs no allocation after construction. A frame is in the queue
/// at most once.
#[derive(Debug)]
pub struct CandidateQueue {
    links: Vec<Link>,
    head: Option<FrameId>,
    tail: Option<FrameId>,
    len: usize,
}

impl CandidateQueue {
    /// Creates an empty queue for frames `0..num_frames`.
    #[must_use]
    pub fn new(num_frames: usize) -> Self {
        Self {
            links: vec![Link::default(); num_frames],
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates a queue holding every frame in ascending order.
    #[must_use]
    pub fn filled(num_frames: usize) -> Self {
        let mut queue = Self::new(num_frames);
        for frame_id in 0..num_frames {
            queue.push_back(frame_id);
        }
        queue
    }

    /// Appends a frame at the tail.
    ///
    /// If the frame is already queued, it is moved to the tail instead.
    pub fn push_back(&mut self, frame_id: FrameId) {
        if self.links[frame_id].linked {
            self.unlink(frame_id);
        }

        self.links[frame_id] = Link {
            prev: self.tail,
            next: None,
            linked: true,
        };
        match self.tail {
            Some(tail) => self.links[tail].next = Some(frame_id),
            None => self.head = Some(frame_id),
        }
        self.tail = Some(frame_id);
        self.len += 1;
    }

    /// Removes and returns the frame at the head.
    ///
    /// Returns `None` if the queue is empty.
    pub fn pop_front(&mut self) -> Option<FrameId> {
        let head = self.head?;
        self.unlink(head);
        Some(head)
    }

    /// Removes a frame from the queue. Returns false if it was not queued.
    pub fn unlink(&mut self, frame_id: FrameId) -> bool {
        let link = self.links[frame_id];
        if !link.linked {
            return false;
        }

        match link.prev {
            Some(prev) => self.links[prev].next = link.next,
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => self.links[next].prev = link.prev,
            None => self.tail = link.prev,
        }
        self.links[frame_id] = Link::default();
        self.len -= 1;
        true
    }

    /// Moves a queued frame to the tail (LRU touch).
    ///
    /// No-op for frames not in the queue.
    pub fn touch(&mut self, frame_id: FrameId) {
        if self.links[frame_id].linked {
            self.push_back(frame_id);
        }
    }

    /// Returns the first frame, walking from the head, that satisfies `pred`.
    ///
    /// The frame stays queued.
    pub fn find_from_head(&self, mut pred: impl FnMut(FrameId) -> bool) -> Option<FrameId> {
        self.iter().find(|&frame_id| pred(frame_id))
    }

    /// Returns true if the frame is queued.
    #[must_use]
    pub fn contains(&self, frame_id: FrameId) -> bool {
        self.links[frame_id].linked
    }

    /// Returns the number of queued frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the frame IDs from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = FrameId> + '_ {
        std::iter::successors(self.head, move |&frame_id| self.links[frame_id].next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(queue: &CandidateQueue) -> Vec<FrameId> {
        queue.iter().collect()
    }

    #[test]
    fn test_push_pop() {
        let mut queue = CandidateQueue::new(10);

        queue.push_back(0);
        queue.push_back(1);
        queue.push_back(2);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop_front(), Some(0)); // Oldest first
        assert_eq!(queue.pop_front(), Some(1));
        assert_eq!(queue.pop_front(), Some(2));
        assert_eq!(queue.pop_front(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_filled() {
        let mut queue = CandidateQueue::filled(3);
        assert_eq!(order(&queue), vec![0, 1, 2]);
        assert_eq!(queue.pop_front(), Some(0));
        assert_eq!(order(&queue), vec![1, 2]);
    }

    #[test]
    fn test_touch_moves_to_back() {
        let mut queue = CandidateQueue::filled(3);

        queue.touch(0);
        assert_eq!(order(&queue), vec![1, 2, 0]);

        queue.touch(2);
        assert_eq!(order(&queue), vec![1, 0, 2]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_touch_unqueued_is_noop() {
        let mut queue = CandidateQueue::new(4);
        queue.push_back(1);
        queue.touch(3);
        assert_eq!(order(&queue), vec![1]);
    }

    #[test]
    fn test_push_back_existing_does_not_duplicate() {
        let mut queue = CandidateQueue::filled(3);
        queue.push_back(1);
        assert_eq!(order(&queue), vec![0, 2, 1]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_unlink() {
        let mut queue = CandidateQueue::filled(4);

        assert!(queue.unlink(1)); // middle
        assert!(queue.unlink(0)); // head
        assert!(queue.unlink(3)); // tail
        assert!(!queue.unlink(3));

        assert_eq!(order(&queue), vec![2]);
        assert!(queue.contains(2));
        assert!(!queue.contains(0));
    }

    #[test]
    fn test_find_from_head() {
        let mut queue = CandidateQueue::filled(4);
        queue.touch(0);

        assert_eq!(queue.find_from_head(|id| id % 2 == 0), Some(2));
        assert_eq!(queue.find_from_head(|id| id > 10), None);
        // Scanning does not reorder
        assert_eq!(order(&queue), vec![1, 2, 3, 0]);
    }
}
