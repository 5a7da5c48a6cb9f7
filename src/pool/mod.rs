//! Pool — bounded reusable line buffers.
//!
//! Every input line is decoded into a `Vec<char>` borrowed from this pool
//! and returned by the terminal pipeline stage. The pool bounds
//! steady-state memory: at most `pool_size` buffers of `capacity`
//! characters circulate at once, and a reader that outruns the rest of
//! the pipeline parks on `acquire` instead of allocating.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::Semaphore;
use tracing::warn;

#[derive(Debug)]
pub struct LineBufferPool {
    free: Mutex<Vec<Vec<char>>>,
    available: Semaphore,
    pool_size: usize,
    capacity: usize,
    acquired: AtomicU64,
    released: AtomicU64,
    over_return_logged: AtomicBool,
}

/// Monotone acquire/release counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub acquired: u64,
    pub released: u64,
}

impl LineBufferPool {
    pub fn new(pool_size: usize, capacity: usize) -> Self {
        assert!(pool_size > 0 && capacity > 0, "pool parameters must be non-zero");
        let free = (0..pool_size)
            .map(|_| Vec::with_capacity(capacity))
            .collect();
        Self {
            free: Mutex::new(free),
            available: Semaphore::new(pool_size),
            pool_size,
            capacity,
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            over_return_logged: AtomicBool::new(false),
        }
    }

    /// Take an empty buffer. Awaits while the pool is exhausted.
    pub async fn acquire(&self) -> Vec<char> {
        let permit = self
            .available
            .acquire()
            .await
            .expect("line pool semaphore closed");
        permit.forget();
        self.acquired.fetch_add(1, Ordering::Relaxed);
        self.free
            .lock()
            .expect("line pool poisoned")
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.capacity))
    }

    /// Return a buffer. Buffers whose capacity drifted (a long line grew
    /// the allocation) are swapped for fresh ones; returns beyond the
    /// pool bound are discarded and logged once.
    pub fn release(&self, mut buf: Vec<char>) {
        self.released.fetch_add(1, Ordering::Relaxed);

        if buf.capacity() != self.capacity {
            buf = Vec::with_capacity(self.capacity);
        } else {
            buf.clear();
        }

        let mut free = self.free.lock().expect("line pool poisoned");
        if free.len() < self.pool_size {
            free.push(buf);
            drop(free);
            self.available.add_permits(1);
        } else {
            drop(free);
            if !self.over_return_logged.swap(true, Ordering::Relaxed) {
                warn!("line pool over-return, extra buffer discarded");
            }
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }

    /// True when every acquired buffer has been returned.
    pub fn balanced(&self) -> bool {
        let stats = self.stats();
        stats.acquired == stats.released
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
