//! Mutex-guarded buffer pool handle for use across threads.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::warn;

use super::{BufferPool, BufferPoolStats};
use crate::error::{PoolError, Result};
use crate::storage::page::PageId;

/// Cloneable handle to one buffer pool behind a single mutex.
///
/// The pool itself does no locking; every operation through this handle
/// runs with the whole pool locked. Table and index managers receive a clone
/// of the handle instead of reaching for a process-wide pool.
#[derive(Clone)]
pub struct SharedBufferPool {
    inner: Arc<Mutex<BufferPool>>,
}

impl SharedBufferPool {
    /// Wraps a pool in a shared handle.
    #[must_use]
    pub fn new(pool: BufferPool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Locks the pool for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, BufferPool> {
        self.inner.lock()
    }

    /// Pins a page, passes its bytes to `f`, then unpins it.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be pinned.
    pub fn with_page<R>(&self, page_id: PageId, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let mut pool = self.inner.lock();
        let handle = pool.pin(page_id)?;
        let result = pool.page(&handle).map(f);
        pool.unpin(page_id)?;
        result
    }

    /// Pins a page, lets `f` modify its bytes, marks it dirty, then unpins it.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be pinned.
    pub fn with_page_mut<R>(
        &self,
        page_id: PageId,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        let mut pool = self.inner.lock();
        let handle = pool.pin(page_id)?;
        let result = pool.page_mut(&handle).map(f);
        if result.is_ok() {
            pool.mark_dirty(page_id)?;
        }
        pool.unpin(page_id)?;
        result
    }

    /// Returns a snapshot of the pool statistics.
    #[must_use]
    pub fn stats(&self) -> BufferPoolStats {
        self.inner.lock().stats()
    }

    /// Shuts the pool down if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns `PoolInUse` if other handles are alive, `BufferShutdownFailed`
    /// if frames are still pinned, and `FlushFailed` if a dirty page cannot be written. On
    /// error the handle stays usable.
    pub fn try_shutdown(self) -> std::result::Result<(), (Self, PoolError)> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().shutdown().map_err(|err| {
                let (pool, source) = err.into_parts();
                (Self::new(pool), source)
            }),
            Err(inner) => {
                let handles = Arc::strong_count(&inner) - 1;
                warn!(handles, "refusing to shut down shared buffer pool");
                Err((Self { inner }, PoolError::PoolInUse { handles }))
            }
        }
    }
}

impl std::fmt::Debug for SharedBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBufferPool")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}
