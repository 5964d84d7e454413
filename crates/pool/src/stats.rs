//! Statistics tracking for object pools

use core::sync::atomic::{AtomicU64, Ordering};

/// Running counters for one pool.
///
/// Updated while the pool lock is held, read without it, so a snapshot taken
/// during concurrent use may mix values from adjacent operations.
#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    created: AtomicU64,
    reused: AtomicU64,
    recycled: AtomicU64,
    discarded: AtomicU64,
    cleared: AtomicU64,
}

impl PoolStats {
    /// Record an `obtain` served by the factory's `create`
    pub(crate) fn record_create(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an `obtain` served from the free list
    pub(crate) fn record_reuse(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an instance retained by `recycle`
    pub(crate) fn record_recycle(&self) {
        self.recycled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an instance dropped by `recycle` because the pool was full
    pub(crate) fn record_discard(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record instances dropped by `clear`
    pub(crate) fn record_clear(&self, dropped: usize) {
        self.cleared.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            cleared: self.cleared.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a pool's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Instances built by the factory (pool misses).
    pub created: u64,
    /// Instances handed out again after a recycle (pool hits).
    pub reused: u64,
    /// Instances accepted back into the free list.
    pub recycled: u64,
    /// Instances dropped because the pool was full.
    pub discarded: u64,
    /// Instances dropped by `clear`.
    pub cleared: u64,
}

impl PoolStatsSnapshot {
    /// Total number of `obtain` calls that returned an instance.
    pub fn obtained(&self) -> u64 {
        self.created + self.reused
    }

    /// Fraction of obtains served from the free list (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.obtained();
        if total == 0 {
            0.0
        } else {
            self.reused as f64 / total as f64
        }
    }
}
