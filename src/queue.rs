use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// FIFO of serialized frames waiting for a write opportunity.
///
/// The lock is held only for the push or pop itself. A popped buffer belongs
/// to the caller; the queue never sees it again, even if the write fails.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    buffers: Mutex<VecDeque<Bytes>>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the deque half-updated, so
    // a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Bytes>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, buf: Bytes) {
        self.lock().push_back(buf);
    }

    /// Remove the oldest buffer.
    pub fn pop(&self) -> Option<Bytes> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every pending buffer, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut q = self.lock();
        let n = q.len();
        q.clear();
        n
    }
}
