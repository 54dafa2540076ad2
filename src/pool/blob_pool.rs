//! Concurrent pool handing out blobs over a fixed set of arena chunks.
//!
//! Free chunks and idle wrapper cores live in lock-free queues, so
//! synchronous acquisitions never take a lock. Only the pending-request queue
//! is behind a mutex; a release checks it first and transfers the chunk
//! straight to the oldest waiter instead of parking it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{fence, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;
use tracing::{debug, error, trace};

use super::arena::{Arena, Chunk};
use super::blob::{Blob, BlobCore};
use super::config::PoolConfig;
use super::pending::PendingRequest;
use crate::error::{Error, Result};

/// Relaxed ordering for counters (eventual visibility is fine for stats).
const RELAXED: Ordering = Ordering::Relaxed;

/// State shared by a pool and every blob it issued.
pub(crate) struct Shared {
    arena: Arena,
    /// Free chunks, FIFO.
    free_chunks: ArrayQueue<Chunk>,
    /// Parked wrapper cores.
    idle_blobs: ArrayQueue<Box<BlobCore>>,
    /// Pending requests, oldest first.
    waiters: Mutex<VecDeque<PendingRequest>>,
    /// Mirror of `waiters.len()` readable without the lock.
    waiting: AtomicUsize,
    next_id: AtomicUsize,

    acquired: AtomicUsize,
    released: AtomicUsize,
    handoffs: AtomicUsize,
    exhausted: AtomicUsize,
    waits: AtomicUsize,
}

impl Shared {
    fn new(config: PoolConfig) -> Self {
        let arena = Arena::new(config.chunk_count, config.chunk_size);
        let free_chunks = ArrayQueue::new(config.chunk_count);
        for chunk in arena.carve() {
            let _ = free_chunks.push(chunk);
        }
        Self {
            arena,
            free_chunks,
            idle_blobs: ArrayQueue::new(config.chunk_count),
            waiters: Mutex::new(VecDeque::new()),
            waiting: AtomicUsize::new(0),
            next_id: AtomicUsize::new(0),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            handoffs: AtomicUsize::new(0),
            exhausted: AtomicUsize::new(0),
            waits: AtomicUsize::new(0),
        }
    }

    /// Reuse an idle core or create one, and give it `chunk`.
    ///
    /// Callers always hold a chunk here, and `park` publishes a core before
    /// its chunk, so a new core is only created while fewer than
    /// `chunk_count` exist.
    fn take_core(&self, chunk: Chunk) -> Box<BlobCore> {
        let mut core = match self.idle_blobs.pop() {
            Some(core) => core,
            None => {
                let id = self.next_id.fetch_add(1, RELAXED);
                trace!(blob = id, "new blob wrapper");
                Box::new(BlobCore::new(id))
            }
        };
        core.attach(chunk);
        core
    }

    /// Pop a free chunk and wrap it in a lease.
    fn try_take(self: &Arc<Self>) -> Option<Blob> {
        let chunk = self.free_chunks.pop()?;
        let core = self.take_core(chunk);
        self.acquired.fetch_add(1, RELAXED);
        debug!(offset = core.offset(), blob = core.id(), "chunk assigned");
        Some(Blob::new(core, Arc::clone(self)))
    }

    /// Put the core in the idle set, then its chunk in the free list.
    ///
    /// The core goes first: whoever pops the chunk must find it waiting.
    fn park(&self, mut core: Box<BlobCore>) {
        let chunk = core.detach();
        let offset = chunk.offset();
        let id = core.id();
        if self.idle_blobs.push(core).is_err() {
            error!(offset, blob = id, "idle set overflow, wrapper dropped");
        }
        if self.free_chunks.push(chunk).is_err() {
            error!(offset, "free list overflow, chunk dropped");
        }
        trace!(
            offset,
            blob = id,
            free = self.free_chunks.len(),
            idle = self.idle_blobs.len(),
            "chunk freed"
        );
    }

    fn sync_waiting(&self, waiters: &VecDeque<PendingRequest>) {
        self.waiting.store(waiters.len(), Ordering::SeqCst);
    }

    /// Offer a blob to pending requests, oldest first.
    ///
    /// Returns the core when every remaining waiter had cancelled.
    fn hand_off(
        self: &Arc<Self>,
        waiters: &mut VecDeque<PendingRequest>,
        core: Box<BlobCore>,
    ) -> Option<Box<BlobCore>> {
        let offset = core.offset();
        let mut blob = Blob::new(core, Arc::clone(self));
        while let Some(request) = waiters.pop_front() {
            self.sync_waiting(waiters);
            match request.fulfill(blob) {
                Ok(()) => {
                    self.acquired.fetch_add(1, RELAXED);
                    self.handoffs.fetch_add(1, RELAXED);
                    debug!(offset, pending = waiters.len(), "chunk handed off");
                    return None;
                }
                Err(returned) => {
                    trace!(offset, "waiter cancelled, trying next");
                    blob = returned;
                }
            }
        }
        blob.take_core()
    }

    /// Match free chunks with waiters until one side runs out.
    fn pump(self: &Arc<Self>, waiters: &mut VecDeque<PendingRequest>) {
        while !waiters.is_empty() {
            let Some(chunk) = self.free_chunks.pop() else {
                break;
            };
            let core = self.take_core(chunk);
            if let Some(core) = self.hand_off(waiters, core) {
                self.park(core);
            }
        }
    }

    /// Release path for a lease. Called once per lease by [`Blob::release`].
    pub(crate) fn release_core(self: &Arc<Self>, mut core: Box<BlobCore>) {
        core.reset();
        self.released.fetch_add(1, RELAXED);
        trace!(offset = core.offset(), blob = core.id(), "blob released");

        if self.waiting.load(Ordering::SeqCst) > 0 {
            let mut waiters = self.waiters.lock();
            if let Some(core) = self.hand_off(&mut waiters, core) {
                self.park(core);
            }
            return;
        }

        self.park(core);

        // A waiter may have queued after the check above and missed the chunk
        // just parked. Pairs with the fence in `enqueue`.
        fence(Ordering::SeqCst);
        if self.waiting.load(Ordering::SeqCst) > 0 {
            let mut waiters = self.waiters.lock();
            self.pump(&mut waiters);
        }
    }

    /// Queue a pending request, then serve it at once if a chunk is free.
    fn enqueue(self: &Arc<Self>) -> tokio::sync::oneshot::Receiver<Blob> {
        let (request, rx) = PendingRequest::new();
        let mut waiters = self.waiters.lock();
        waiters.retain(|w| !w.is_cancelled());
        waiters.push_back(request);
        self.sync_waiting(&waiters);
        self.waits.fetch_add(1, RELAXED);
        debug!(pending = waiters.len(), "waiting for a free chunk");

        fence(Ordering::SeqCst);
        self.pump(&mut waiters);
        rx
    }

    /// Drop cancelled requests and return how many are still live.
    fn prune(&self) -> usize {
        let mut waiters = self.waiters.lock();
        waiters.retain(|w| !w.is_cancelled());
        self.sync_waiting(&waiters);
        waiters.len()
    }
}

/// Fixed-capacity pool of [`Blob`]s carved from one arena.
///
/// Cloning is cheap; clones share the same arena and queues.
#[derive(Clone)]
pub struct BlobPool {
    shared: Arc<Shared>,
}

impl BlobPool {
    /// Create a pool of `chunk_count` chunks of `chunk_size` bytes each.
    pub fn new(chunk_count: usize, chunk_size: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(chunk_count, chunk_size))
    }

    /// Create a pool from a validated config.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            chunks = config.chunk_count,
            chunk_size = config.chunk_size,
            "blob pool created"
        );
        Ok(Self {
            shared: Arc::new(Shared::new(config)),
        })
    }

    /// Take a free chunk or fail with [`Error::Exhausted`]. Never waits.
    pub fn acquire(&self) -> Result<Blob> {
        self.try_acquire().ok_or_else(|| {
            self.shared.exhausted.fetch_add(1, RELAXED);
            debug!("no free chunk for synchronous acquire");
            Error::Exhausted
        })
    }

    /// Take a free chunk if there is one. Never waits.
    #[inline]
    pub fn try_acquire(&self) -> Option<Blob> {
        self.shared.try_take()
    }

    /// Take a free chunk, or wait in FIFO order until a release hands one over.
    ///
    /// Dropping the returned future cancels the wait; a chunk later offered to
    /// the cancelled request goes to the next waiter instead.
    pub async fn acquire_async(&self) -> Blob {
        loop {
            if let Some(blob) = self.shared.try_take() {
                return blob;
            }
            // A request is only dropped unfulfilled once its receiver is gone,
            // so this resolves with a blob; queue again if it ever does not.
            if let Ok(blob) = self.shared.enqueue().await {
                return blob;
            }
        }
    }

    /// [`BlobPool::acquire_async`] bounded by `timeout`. `None` on expiry.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Option<Blob> {
        match tokio::time::timeout(timeout, self.acquire_async()).await {
            Ok(blob) => Some(blob),
            Err(_) => {
                debug!(?timeout, "acquire timed out");
                None
            }
        }
    }

    /// Release a blob into this pool.
    ///
    /// Idempotent for blobs this pool issued. A blob from another pool is
    /// rejected with [`Error::ForeignBlob`] and left untouched.
    pub fn release(&self, blob: &mut Blob) -> Result<()> {
        if !self.owns(blob) {
            error!(offset = blob.offset(), "blob released into a foreign pool");
            return Err(Error::ForeignBlob);
        }
        blob.release();
        Ok(())
    }

    /// True if `blob` was issued by this pool.
    pub fn owns(&self, blob: &Blob) -> bool {
        Arc::ptr_eq(&self.shared, blob.shared())
    }

    /// Number of chunks in the arena.
    pub fn chunk_count(&self) -> usize {
        self.shared.arena.chunk_count()
    }

    /// Size of every chunk in bytes.
    pub fn chunk_size(&self) -> usize {
        self.shared.arena.chunk_size()
    }

    /// Chunks currently in the free list.
    pub fn available_chunks(&self) -> usize {
        self.shared.free_chunks.len()
    }

    /// Idle wrapper cores ready for reuse.
    pub fn available_blobs(&self) -> usize {
        self.shared.idle_blobs.len()
    }

    /// Live requests waiting for a chunk. Cancelled ones are pruned first.
    pub fn pending_requests(&self) -> usize {
        self.shared.prune()
    }

    /// Get pool statistics.
    pub fn stats(&self) -> PoolStats {
        let s = &self.shared;
        PoolStats {
            available_chunks: s.free_chunks.len(),
            idle_blobs: s.idle_blobs.len(),
            pending_requests: s.prune(),
            acquired: s.acquired.load(RELAXED),
            released: s.released.load(RELAXED),
            handoffs: s.handoffs.load(RELAXED),
            exhausted: s.exhausted.load(RELAXED),
            waits: s.waits.load(RELAXED),
            wrappers_created: s.next_id.load(RELAXED),
        }
    }
}

impl fmt::Debug for BlobPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobPool")
            .field("chunk_count", &self.chunk_count())
            .field("chunk_size", &self.chunk_size())
            .field("available_chunks", &self.available_chunks())
            .field("pending_requests", &self.pending_requests())
            .finish()
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Chunks in the free list.
    pub available_chunks: usize,
    /// Idle wrapper cores.
    pub idle_blobs: usize,
    /// Live requests waiting for a chunk.
    pub pending_requests: usize,
    /// Leases granted, hand-offs included.
    pub acquired: usize,
    /// Leases returned.
    pub released: usize,
    /// Releases transferred straight to a waiter.
    pub handoffs: usize,
    /// Synchronous acquires that found no chunk.
    pub exhausted: usize,
    /// Asynchronous acquires that had to wait.
    pub waits: usize,
    /// Wrapper cores ever allocated.
    pub wrappers_created: usize,
}

impl PoolStats {
    /// Fraction of leases served by direct hand-off (0.0 to 1.0).
    pub fn handoff_rate(&self) -> f64 {
        if self.acquired == 0 {
            0.0
        } else {
            self.handoffs as f64 / self.acquired as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_acquire_release() {
        let pool = BlobPool::new(10, 64).unwrap();
        let mut blob = pool.acquire().unwrap();
        assert_eq!(blob.capacity(), 64);
        assert_eq!(pool.available_chunks(), 9);
        assert_eq!(pool.available_blobs(), 0);

        blob.write_u8(1).unwrap();
        blob.release();

        assert_eq!(pool.available_blobs(), 1);
        assert_eq!(pool.available_chunks(), 10);
    }

    #[test]
    fn test_double_release_counts_once() {
        let pool = BlobPool::new(10, 64).unwrap();
        let mut blob = pool.acquire().unwrap();
        blob.write_u8(1).unwrap();
        blob.release();
        blob.release();
        pool.release(&mut blob).unwrap();
        drop(blob);

        assert_eq!(pool.available_blobs(), 1);
        assert_eq!(pool.available_chunks(), 10);
        assert_eq!(pool.stats().released, 1);
    }

    #[test]
    fn test_drop_releases() {
        let pool = BlobPool::new(2, 32).unwrap();
        {
            let _a = pool.acquire().unwrap();
            let _b = pool.acquire().unwrap();
            assert_eq!(pool.available_chunks(), 0);
        }
        assert_eq!(pool.available_chunks(), 2);
        assert_eq!(pool.available_blobs(), 2);
    }

    #[test]
    fn test_wrappers_recycled() {
        let pool = BlobPool::new(4, 32).unwrap();
        let first = pool.acquire().unwrap();
        let id = first.id();
        drop(first);

        let mut second = pool.acquire().unwrap();
        assert_eq!(second.id(), id);
        // Reset on release: nothing carried over from the previous lease.
        assert_eq!(second.position(), 0);
        assert_eq!(second.high_water_mark(), 0);
        assert_eq!(second.prefix_origin(), 0);
        second.write_u8(1).unwrap();
        assert_eq!(pool.stats().wrappers_created, 1);
    }

    #[test]
    fn test_release_resets_prefix() {
        let pool = BlobPool::new(1, 32).unwrap();
        let mut blob = pool.acquire().unwrap();
        blob.reserve_prefix(4).unwrap();
        blob.write_u64(9).unwrap();
        drop(blob);

        let blob = pool.acquire().unwrap();
        assert_eq!(blob.prefix_origin(), 0);
        assert_eq!(blob.position(), 0);
        assert!(blob.written().is_empty());
    }

    #[test]
    fn test_exhaustion() {
        let k = 3;
        let pool = BlobPool::new(k, 16).unwrap();
        let held: Vec<_> = (0..k).map(|_| pool.acquire().unwrap()).collect();

        assert_eq!(pool.acquire().unwrap_err(), Error::Exhausted);
        assert!(pool.try_acquire().is_none());
        assert_eq!(pool.stats().exhausted, 1);

        drop(held);
        assert!(pool.try_acquire().is_some());
    }

    #[test]
    fn test_fifo_chunk_order() {
        let pool = BlobPool::new(3, 16).unwrap();
        let offsets: Vec<_> = (0..3).map(|_| pool.acquire().unwrap().offset()).collect();
        // Each blob is dropped right away, so the free list rotates.
        assert_eq!(offsets, vec![0, 16, 32]);
    }

    #[test]
    fn test_foreign_release_rejected() {
        let pool_a = BlobPool::new(2, 16).unwrap();
        let pool_b = BlobPool::new(2, 16).unwrap();
        let mut blob = pool_a.acquire().unwrap();

        assert_eq!(pool_b.release(&mut blob), Err(Error::ForeignBlob));
        assert!(!blob.is_released());
        assert_eq!(pool_a.available_chunks(), 1);
        assert_eq!(pool_b.available_chunks(), 2);

        assert!(pool_a.owns(&blob));
        pool_a.release(&mut blob).unwrap();
        assert_eq!(pool_a.available_chunks(), 2);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            BlobPool::new(0, 16),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_async_acquire_immediate() {
        let pool = BlobPool::new(1, 16).unwrap();
        let blob = pool.acquire_async().await;
        assert_eq!(blob.capacity(), 16);
        assert_eq!(pool.stats().waits, 0);
    }

    #[tokio::test]
    async fn test_async_acquire_waits_for_release() {
        let pool = BlobPool::new(1, 16).unwrap();
        let mut held = pool.acquire().unwrap();
        held.write_u32(42).unwrap();
        let offset = held.offset();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire_async().await })
        };
        while pool.pending_requests() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!waiter.is_finished());

        held.release();
        let blob = waiter.await.unwrap();
        assert_eq!(blob.offset(), offset);
        assert_eq!(blob.position(), 0);
        assert_eq!(blob.high_water_mark(), 0);

        // Handed off directly: the chunk never reached the free list.
        let stats = pool.stats();
        assert_eq!(stats.handoffs, 1);
        assert_eq!(stats.available_chunks, 0);
        assert_eq!(stats.pending_requests, 0);
    }

    #[tokio::test]
    async fn test_handoff_is_fifo() {
        let pool = BlobPool::new(1, 16).unwrap();
        let mut held = pool.acquire().unwrap();

        let a = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire_async().await })
        };
        while pool.pending_requests() < 1 {
            tokio::task::yield_now().await;
        }
        let b = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire_async().await })
        };
        while pool.pending_requests() < 2 {
            tokio::task::yield_now().await;
        }

        held.release();
        let mut blob_a = a.await.unwrap();
        assert!(!b.is_finished());
        assert_eq!(pool.pending_requests(), 1);

        blob_a.release();
        let blob_b = b.await.unwrap();
        assert_eq!(blob_b.offset(), 0);
        assert_eq!(pool.stats().handoffs, 2);
    }

    #[tokio::test]
    async fn test_sync_acquire_cannot_steal_handoff() {
        let pool = BlobPool::new(1, 16).unwrap();
        let mut held = pool.acquire().unwrap();
        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire_async().await })
        };
        while pool.pending_requests() == 0 {
            tokio::task::yield_now().await;
        }

        held.release();
        assert!(pool.try_acquire().is_none());
        assert_eq!(waiter.await.unwrap().offset(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_skipped() {
        let pool = BlobPool::new(1, 16).unwrap();
        let mut held = pool.acquire().unwrap();

        let timed_out = pool.acquire_timeout(Duration::from_millis(10)).await;
        assert!(timed_out.is_none());

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire_async().await })
        };
        while pool.stats().waits < 2 {
            tokio::task::yield_now().await;
        }

        held.release();
        assert_eq!(waiter.await.unwrap().capacity(), 16);
        assert_eq!(pool.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_returns_chunk_to_free_list() {
        let pool = BlobPool::new(1, 16).unwrap();
        let mut held = pool.acquire().unwrap();

        assert!(pool
            .acquire_timeout(Duration::from_millis(5))
            .await
            .is_none());

        held.release();
        assert_eq!(pool.available_chunks(), 1);
        assert_eq!(pool.available_blobs(), 1);
        assert_eq!(pool.pending_requests(), 0);
        assert_eq!(pool.stats().handoffs, 0);
    }

    #[tokio::test]
    async fn test_acquire_timeout_success() {
        let pool = BlobPool::new(1, 16).unwrap();
        let blob = pool.acquire_timeout(Duration::from_millis(10)).await;
        assert!(blob.is_some());
    }

    #[tokio::test]
    async fn test_cancelled_waiter_not_counted() {
        let pool = BlobPool::new(1, 16).unwrap();
        let _held = pool.acquire().unwrap();

        assert!(pool
            .acquire_timeout(Duration::from_millis(5))
            .await
            .is_none());

        // Nothing queued since, yet the abandoned request is not reported.
        assert_eq!(pool.pending_requests(), 0);
        let stats = pool.stats();
        assert_eq!(stats.pending_requests, 0);
        assert_eq!(stats.waits, 1);
    }

    #[test]
    fn test_concurrent_exclusivity() {
        let pool = BlobPool::new(8, 32).unwrap();
        let live = Arc::new(Mutex::new(HashSet::new()));
        let mut handles = vec![];

        for t in 0..8u8 {
            let pool = pool.clone();
            let live = live.clone();
            handles.push(thread::spawn(move || {
                for i in 0..500u32 {
                    let Some(mut blob) = pool.try_acquire() else {
                        thread::yield_now();
                        continue;
                    };
                    assert!(
                        live.lock().insert(blob.offset()),
                        "offset {} issued twice",
                        blob.offset()
                    );
                    blob.write_u8(t).unwrap();
                    blob.write_u32(i).unwrap();
                    blob.seek_to_logical_start().unwrap();
                    assert_eq!(blob.read_u8().unwrap(), t);
                    assert_eq!(blob.read_u32().unwrap(), i);
                    assert!(live.lock().remove(&blob.offset()));
                    blob.release();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.available_chunks(), 8);
        let stats = pool.stats();
        assert_eq!(stats.acquired, stats.released);
        assert!(stats.wrappers_created <= 8);
        // Every wrapper ever created is parked again.
        assert_eq!(stats.idle_blobs, stats.wrappers_created);
    }

    #[test]
    fn test_single_chunk_keeps_single_wrapper() {
        let pool = BlobPool::new(1, 16).unwrap();
        let mut handles = vec![];

        for t in 0..8u8 {
            let pool = pool.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50_000 {
                    if let Some(mut blob) = pool.try_acquire() {
                        blob.write_u8(t).unwrap();
                        blob.release();
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = pool.stats();
        assert_eq!(stats.wrappers_created, 1);
        assert_eq!(stats.idle_blobs, 1);
        assert_eq!(stats.available_chunks, 1);
        assert_eq!(stats.acquired, stats.released);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_async_churn() {
        let pool = BlobPool::new(4, 64).unwrap();
        let live = Arc::new(Mutex::new(HashSet::new()));
        let mut tasks = vec![];

        for t in 0..16u32 {
            let pool = pool.clone();
            let live = live.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..200u32 {
                    let mut blob = pool.acquire_async().await;
                    assert!(live.lock().insert(blob.offset()));
                    blob.write_u32(t).unwrap();
                    blob.write_u32(i).unwrap();
                    tokio::task::yield_now().await;
                    blob.seek_to_logical_start().unwrap();
                    assert_eq!(blob.read_u32().unwrap(), t);
                    assert_eq!(blob.read_u32().unwrap(), i);
                    assert!(live.lock().remove(&blob.offset()));
                    blob.release();
                }
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }

        let stats = pool.stats();
        assert_eq!(stats.acquired, 16 * 200);
        assert_eq!(stats.released, 16 * 200);
        assert_eq!(pool.available_chunks(), 4);
        assert_eq!(pool.pending_requests(), 0);
    }

    #[test]
    fn test_handoff_rate() {
        let stats = PoolStats {
            available_chunks: 0,
            idle_blobs: 0,
            pending_requests: 0,
            acquired: 100,
            released: 100,
            handoffs: 25,
            exhausted: 0,
            waits: 25,
            wrappers_created: 4,
        };
        assert!((stats.handoff_rate() - 0.25).abs() < 0.001);
    }
}
