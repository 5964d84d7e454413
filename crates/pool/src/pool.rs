//! Bounded, thread-safe object pool
//!
//! Idle instances live in an owned, singly linked LIFO chain guarded by one
//! mutex per pool. `obtain`, `recycle` and `clear` are mutually exclusive on
//! the same pool; different pools never contend with each other.

use core::convert::Infallible;
use core::fmt;
use core::mem;

use parking_lot::Mutex;
use tracing::trace;

use crate::config::PoolConfig;
use crate::factory::ObjectFactory;
use crate::reusable::Reusable;
use crate::stats::{PoolStats, PoolStatsSnapshot};

type BoxedFactory<T, A, E> = Box<dyn ObjectFactory<T, Args = A, Error = E>>;

/// Bounded pool of reusable `T` instances.
///
/// `A` is the argument type and `E` the error type of the pool's
/// [`ObjectFactory`]. The most recently recycled instance is the next one
/// handed out.
///
/// The pool does not track instances it has handed out and does not check
/// where a recycled instance came from: whatever is recycled will be reset
/// and returned by a later `obtain`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use nebula_pool::{ObjectPool, factory};
///
/// let pool = Arc::new(ObjectPool::new(
///     factory::from_fn(|()| Vec::<u8>::with_capacity(1024), |buf: &mut Vec<u8>, ()| buf.clear()),
///     4,
/// ));
///
/// let handles: Vec<_> = (0..8u8)
///     .map(|i| {
///         let pool = Arc::clone(&pool);
///         thread::spawn(move || {
///             let Ok(mut buffer) = pool.obtain(());
///             buffer.push(i);
///             pool.recycle(buffer);
///         })
///     })
///     .collect();
///
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert!(pool.len() <= pool.max_size());
/// ```
pub struct ObjectPool<T: Reusable, A = (), E = Infallible> {
    free: Mutex<FreeList<T>>,
    factory: BoxedFactory<T, A, E>,
    max_size: usize,
    stats: PoolStats,
}

impl<T: Reusable, A: 'static, E: 'static> ObjectPool<T, A, E> {
    /// Create an empty pool that retains at most `max_size` idle instances.
    pub fn new<F>(factory: F, max_size: usize) -> Self
    where
        F: ObjectFactory<T, Args = A, Error = E>,
    {
        Self {
            free: Mutex::new(FreeList::new()),
            factory: Box::new(factory),
            max_size,
            stats: PoolStats::default(),
        }
    }

    /// Create an empty pool from a [`PoolConfig`].
    pub fn with_config<F>(factory: F, config: PoolConfig) -> Self
    where
        F: ObjectFactory<T, Args = A, Error = E>,
    {
        Self::new(factory, config.max_size)
    }

    /// Take an instance out of the pool.
    ///
    /// Pops the most recently recycled instance and resets it with
    /// [`ObjectFactory::reuse`], or builds a new one with
    /// [`ObjectFactory::create`] when the pool is empty. The factory runs
    /// with the pool lock held and must not call back into the same pool.
    /// Its error is returned unchanged; an instance whose reset failed is
    /// dropped.
    pub fn obtain(&self, args: A) -> Result<T, E> {
        let mut free = self.free.lock();

        if let Some(mut instance) = free.pop() {
            self.factory.reuse(&mut instance, args)?;
            self.stats.record_reuse();
            trace!(pool = type_name::<T>(), idle = free.len, "reused pooled instance");
            return Ok(instance);
        }

        let instance = self.factory.create(args)?;
        self.stats.record_create();
        trace!(pool = type_name::<T>(), "pool empty, created instance");
        Ok(instance)
    }

    /// Hand an instance back for later reuse.
    ///
    /// If the pool already holds `max_size` instances the instance is
    /// dropped and the pool is left untouched.
    pub fn recycle(&self, instance: T) {
        let mut free = self.free.lock();

        if free.len < self.max_size {
            free.push(instance);
            self.stats.record_recycle();
            trace!(pool = type_name::<T>(), idle = free.len, "recycled instance");
            return;
        }

        drop(free);
        self.stats.record_discard();
        trace!(
            pool = type_name::<T>(),
            max_size = self.max_size,
            "pool full, discarding instance"
        );
    }

    /// Drop every idle instance.
    ///
    /// The pool stays usable; the next `obtain` creates.
    pub fn clear(&self) {
        let detached = mem::take(&mut *self.free.lock());
        let dropped = detached.len;
        self.stats.record_clear(dropped);
        if dropped > 0 {
            trace!(pool = type_name::<T>(), dropped, "cleared pool");
        }
        // Instances are dropped here, after the lock has been released.
    }

    /// Number of idle instances currently held.
    pub fn len(&self) -> usize {
        self.free.lock().len
    }

    /// Whether the next `obtain` will call the factory's `create`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of idle instances the pool retains.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Snapshot of the pool's counters.
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.stats.snapshot()
    }
}

impl<T: Reusable, A: 'static, E: 'static> fmt::Debug for ObjectPool<T, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("type", &type_name::<T>())
            .field("len", &self.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

fn type_name<T>() -> &'static str {
    core::any::type_name::<T>()
}

// ---------------------------------------------------------------------------
// Free list
// ---------------------------------------------------------------------------

struct Node<T> {
    value: T,
    next: Option<Box<Node<T>>>,
}

/// Owned LIFO chain; `len` always equals the number of linked nodes.
struct FreeList<T> {
    head: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> FreeList<T> {
    const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    fn push(&mut self, value: T) {
        let node = Box::new(Node {
            value,
            next: self.head.take(),
        });
        self.head = Some(node);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<T> {
        let node = self.head.take()?;
        let Node { value, next } = *node;
        self.head = next;
        self.len -= 1;
        Some(value)
    }
}

impl<T> Default for FreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for FreeList<T> {
    fn drop(&mut self) {
        // Unlink iteratively; the default recursive drop can overflow the
        // stack on long chains.
        let mut next = self.head.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    use super::*;
    use crate::factory::{from_fn, try_from_fn};

    #[derive(Debug, PartialEq, Eq)]
    struct Tagged {
        id: u32,
        label: &'static str,
    }

    impl Reusable for Tagged {}

    #[derive(Default)]
    struct Calls {
        next_id: AtomicU32,
        creates: AtomicUsize,
        reuses: AtomicUsize,
    }

    fn tagged_pool(max_size: usize) -> (ObjectPool<Tagged, &'static str>, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let on_create = Arc::clone(&calls);
        let on_reuse = Arc::clone(&calls);
        let pool = ObjectPool::new(
            from_fn(
                move |label| {
                    on_create.creates.fetch_add(1, Ordering::SeqCst);
                    Tagged {
                        id: on_create.next_id.fetch_add(1, Ordering::SeqCst),
                        label,
                    }
                },
                move |tagged: &mut Tagged, label| {
                    on_reuse.reuses.fetch_add(1, Ordering::SeqCst);
                    tagged.label = label;
                },
            ),
            max_size,
        );
        (pool, calls)
    }

    #[test]
    fn test_obtain_from_empty_pool_creates() {
        let (pool, calls) = tagged_pool(3);

        let Ok(tagged) = pool.obtain("fresh");
        assert_eq!(tagged, Tagged { id: 0, label: "fresh" });
        assert_eq!(calls.creates.load(Ordering::SeqCst), 1);
        assert_eq!(calls.reuses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_obtain_reuses_most_recent_first() {
        let (pool, calls) = tagged_pool(3);
        let Ok(a) = pool.obtain("a");
        let Ok(b) = pool.obtain("b");

        pool.recycle(a);
        pool.recycle(b);
        assert_eq!(pool.len(), 2);

        let Ok(first) = pool.obtain("again");
        assert_eq!(first, Tagged { id: 1, label: "again" });
        assert_eq!(pool.len(), 1);

        let Ok(second) = pool.obtain("again");
        assert_eq!(second.id, 0);
        assert_eq!(pool.len(), 0);

        assert_eq!(calls.reuses.load(Ordering::SeqCst), 2);
        assert_eq!(calls.creates.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_recycle_into_full_pool_discards() {
        let (pool, _calls) = tagged_pool(1);
        pool.recycle(Tagged { id: 10, label: "kept" });
        pool.recycle(Tagged { id: 11, label: "dropped" });

        assert_eq!(pool.len(), 1);
        let Ok(kept) = pool.obtain("x");
        assert_eq!(kept.id, 10);

        let stats = pool.stats();
        assert_eq!(stats.recycled, 1);
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_zero_capacity_never_retains() {
        let (pool, calls) = tagged_pool(0);
        for _ in 0..3 {
            let Ok(tagged) = pool.obtain("z");
            pool.recycle(tagged);
            assert!(pool.is_empty());
        }
        assert_eq!(calls.creates.load(Ordering::SeqCst), 3);
        assert_eq!(calls.reuses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let (pool, calls) = tagged_pool(4);
        for id in 0..4 {
            pool.recycle(Tagged { id, label: "idle" });
        }
        assert_eq!(pool.len(), 4);

        pool.clear();
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.stats().cleared, 4);

        let Ok(_) = pool.obtain("after clear");
        assert_eq!(calls.creates.load(Ordering::SeqCst), 1);
        assert_eq!(calls.reuses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_create_error_is_returned_unchanged() {
        let pool: ObjectPool<String, bool, &'static str> = ObjectPool::new(
            try_from_fn(
                |ok: bool| {
                    if ok {
                        Ok(String::new())
                    } else {
                        Err("create failed")
                    }
                },
                |_: &mut String, _| Ok(()),
            ),
            2,
        );

        assert_eq!(pool.obtain(false), Err("create failed"));
        assert_eq!(pool.stats().created, 0);
        assert!(pool.obtain(true).is_ok());
    }

    #[test]
    fn test_reuse_error_drops_instance() {
        let pool: ObjectPool<String, bool, String> = ObjectPool::new(
            try_from_fn(
                |_| Ok(String::from("new")),
                |s: &mut String, ok: bool| {
                    if ok {
                        s.clear();
                        Ok(())
                    } else {
                        Err(format!("cannot reset {s:?}"))
                    }
                },
            ),
            2,
        );
        pool.recycle(String::from("stale"));

        assert_eq!(
            pool.obtain(false),
            Err(String::from("cannot reset \"stale\""))
        );
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.obtain(true), Ok(String::from("new")));
    }

    #[test]
    fn test_panicking_factory_releases_lock() {
        let pool = ObjectPool::new(
            from_fn(
                |explode: bool| {
                    assert!(!explode, "factory blew up");
                    Vec::<u8>::new()
                },
                |buf: &mut Vec<u8>, _| buf.clear(),
            ),
            2,
        );

        let result = catch_unwind(AssertUnwindSafe(|| pool.obtain(true)));
        assert!(result.is_err());

        pool.recycle(vec![4]);
        pool.recycle(vec![5]);
        assert_eq!(pool.len(), 2);
        let Ok(buf) = pool.obtain(false);
        assert!(buf.is_empty());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_long_chain_drops_without_recursion() {
        let pool = ObjectPool::new(
            from_fn(|()| String::new(), |s: &mut String, ()| s.clear()),
            200_000,
        );
        for n in 0..200_000u64 {
            pool.recycle(n.to_string());
        }
        assert_eq!(pool.len(), 200_000);
        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_debug_shows_capacity_not_contents() {
        let (pool, _calls) = tagged_pool(7);
        pool.recycle(Tagged { id: 1, label: "secret" });
        let debug = format!("{pool:?}");
        assert!(debug.contains("max_size: 7"));
        assert!(debug.contains("len: 1"));
        assert!(!debug.contains("secret"));
    }

    fn generic_buffer_pool<A: 'static, E: 'static>(
        create: fn(A) -> Result<Vec<u8>, E>,
    ) -> ObjectPool<Vec<u8>, A, E> {
        ObjectPool::new(
            try_from_fn(create, |buf: &mut Vec<u8>, _: A| {
                buf.clear();
                Ok(())
            }),
            2,
        )
    }

    #[test]
    fn test_pool_is_usable_from_generic_code() {
        let pool = generic_buffer_pool(|(cap, fill): (usize, u8)| {
            Ok::<_, String>(vec![fill; cap])
        });

        let buf = pool.obtain((3, 7)).unwrap();
        assert_eq!(buf, vec![7, 7, 7]);
        pool.recycle(buf);

        let buf = pool.obtain((1, 0)).unwrap();
        assert!(buf.is_empty());
        assert!(format!("{pool:?}").contains("max_size: 2"));
    }
}
