//! Pool registry: keyed store of type-erased pools.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{PoolError, PoolResult};
use crate::pool::ObjectPool;
use crate::reusable::Reusable;

// ---------------------------------------------------------------------------
// Type-erased pool wrapper
// ---------------------------------------------------------------------------

/// Object-safe view of an `ObjectPool<T, A, E>` so pools of different types
/// can share one map.
trait ErasedPool: Send + Sync {
    /// Drain the pool.
    fn clear(&self);

    /// Concrete pool type, for diagnostics.
    fn pool_type(&self) -> &'static str;

    /// Recover the concrete pool.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T, A, E> ErasedPool for ObjectPool<T, A, E>
where
    T: Reusable,
    A: 'static,
    E: 'static,
{
    fn clear(&self) {
        ObjectPool::clear(self);
    }

    fn pool_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn downcast<T, A, E>(
    key: &str,
    pool: Arc<dyn ErasedPool>,
) -> PoolResult<Arc<ObjectPool<T, A, E>>>
where
    T: Reusable,
    A: 'static,
    E: 'static,
{
    let found = pool.pool_type();
    pool.into_any().downcast().map_err(|_| {
        let expected = std::any::type_name::<ObjectPool<T, A, E>>();
        warn!(key = %key, expected, found, "pool requested with mismatched type");
        PoolError::type_mismatch(key, expected, found)
    })
}

// ---------------------------------------------------------------------------
// PoolRegistry
// ---------------------------------------------------------------------------

/// Maps string keys to pools of arbitrary element types.
///
/// Lookups take a shared lock and may run in parallel; `put` and `clear`
/// take the exclusive lock. A pool is stored without its element type, and a
/// typed lookup with a different `ObjectPool<T, A, E>` than the one stored
/// fails with [`PoolError::TypeMismatch`].
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use nebula_pool::{ObjectPool, PoolRegistry, factory};
///
/// let registry = PoolRegistry::new();
/// let pool = Arc::new(ObjectPool::new(
///     factory::from_fn(|()| String::new(), |s: &mut String, ()| s.clear()),
///     8,
/// ));
/// registry.put("lines", Arc::clone(&pool));
///
/// let found = registry.get::<String, (), _>("lines").unwrap().unwrap();
/// assert!(Arc::ptr_eq(&found, &pool));
/// assert!(registry.get::<Vec<u8>, (), std::convert::Infallible>("lines").is_err());
/// ```
#[derive(Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<String, Arc<dyn ErasedPool>>>,
}

impl PoolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the pool stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is registered under `key`.
    pub fn get<T, A, E>(&self, key: &str) -> PoolResult<Option<Arc<ObjectPool<T, A, E>>>>
    where
        T: Reusable,
        A: 'static,
        E: 'static,
    {
        let entry = self.pools.read().get(key).cloned();
        entry.map(|pool| downcast(key, pool)).transpose()
    }

    /// Store `pool` under `key`.
    ///
    /// A different pool previously stored under `key` is drained before it is
    /// released, under the same exclusive lock as the replacement. Holders of
    /// the old pool keep a working but empty pool.
    pub fn put<T, A, E>(&self, key: impl Into<String>, pool: Arc<ObjectPool<T, A, E>>)
    where
        T: Reusable,
        A: 'static,
        E: 'static,
    {
        let key = key.into();
        let new_ptr = Arc::as_ptr(&pool);
        let mut pools = self.pools.write();

        if let Some(old) = pools.insert(key.clone(), pool) {
            if std::ptr::addr_eq(Arc::as_ptr(&old), new_ptr) {
                return;
            }
            old.clear();
            debug!(
                key = %key,
                replaced = old.pool_type(),
                "replaced pool, drained previous entry"
            );
        }
    }

    /// Return the pool stored under `key`, or store the one built by `make`.
    ///
    /// The miss path re-checks under the exclusive lock, so concurrent first
    /// callers all receive the same pool and no live pool is replaced.
    pub fn get_or_insert_with<T, A, E, F>(
        &self,
        key: &str,
        make: F,
    ) -> PoolResult<Arc<ObjectPool<T, A, E>>>
    where
        T: Reusable,
        A: 'static,
        E: 'static,
        F: FnOnce() -> ObjectPool<T, A, E>,
    {
        if let Some(pool) = self.get(key)? {
            return Ok(pool);
        }

        let mut pools = self.pools.write();
        if let Some(existing) = pools.get(key) {
            return downcast(key, Arc::clone(existing));
        }

        let pool = Arc::new(make());
        pools.insert(key.to_owned(), Arc::clone(&pool) as Arc<dyn ErasedPool>);
        debug!(key = %key, max_size = pool.max_size(), "registered pool");
        Ok(pool)
    }

    /// Drain every pool and remove all entries.
    pub fn clear(&self) {
        let mut pools = self.pools.write();
        for pool in pools.values() {
            pool.clear();
        }
        let removed = pools.len();
        pools.clear();
        debug!(removed, "cleared pool registry");
    }

    /// Whether a pool is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.pools.read().contains_key(key)
    }

    /// Keys of all registered pools, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.pools.read().keys().cloned().collect()
    }

    /// Number of registered pools.
    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    /// Whether no pool is registered.
    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }
}

impl fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pool_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::factory::from_fn;

    type StringPool = ObjectPool<String>;

    fn string_pool(max_size: usize) -> Arc<StringPool> {
        Arc::new(ObjectPool::new(
            from_fn(|()| String::new(), |s: &mut String, ()| s.clear()),
            max_size,
        ))
    }

    #[test]
    fn test_get_missing_key() {
        let registry = PoolRegistry::new();
        assert!(registry.get::<String, (), Infallible>("nothing").unwrap().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_put_then_get_returns_same_pool() {
        let registry = PoolRegistry::new();
        let pool = string_pool(4);
        registry.put("strings", Arc::clone(&pool));

        let found = registry.get::<String, (), Infallible>("strings").unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &pool));
        assert!(registry.contains_key("strings"));
        assert_eq!(registry.keys(), vec!["strings".to_owned()]);
    }

    #[test]
    fn test_get_with_wrong_type_is_mismatch() {
        let registry = PoolRegistry::new();
        registry.put("strings", string_pool(4));

        let err = registry.get::<Vec<u8>, (), Infallible>("strings").unwrap_err();
        assert_eq!(err.code(), "POOL:TYPE_MISMATCH");
        let PoolError::TypeMismatch { key, expected, found } = err;
        assert_eq!(key, "strings");
        assert!(expected.contains("Vec<u8>"));
        assert!(found.contains("String"));
    }

    #[test]
    fn test_get_with_wrong_args_is_mismatch() {
        let registry = PoolRegistry::new();
        registry.put("strings", string_pool(4));
        assert!(registry.get::<String, usize, Infallible>("strings").is_err());
    }

    #[test]
    fn test_put_drains_replaced_pool() {
        let registry = PoolRegistry::new();
        let old = string_pool(4);
        old.recycle("a".to_owned());
        old.recycle("b".to_owned());
        registry.put("strings", Arc::clone(&old));

        let new = string_pool(4);
        registry.put("strings", Arc::clone(&new));

        assert_eq!(old.len(), 0);
        let found = registry.get::<String, (), Infallible>("strings").unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &new));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_put_same_pool_twice_keeps_instances() {
        let registry = PoolRegistry::new();
        let pool = string_pool(4);
        pool.recycle("idle".to_owned());

        registry.put("strings", Arc::clone(&pool));
        registry.put("strings", Arc::clone(&pool));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_get_or_insert_with_builds_once() {
        let registry = PoolRegistry::new();
        let first = registry
            .get_or_insert_with("strings", || {
                ObjectPool::new(from_fn(|()| String::new(), |s: &mut String, ()| s.clear()), 2)
            })
            .unwrap();

        let second = registry
            .get_or_insert_with::<String, (), Infallible, _>("strings", || {
                panic!("must not build a second pool")
            })
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.max_size(), 2);
    }

    #[test]
    fn test_clear_drains_all_pools() {
        let registry = PoolRegistry::new();
        let strings = string_pool(4);
        strings.recycle("x".to_owned());
        let buffers: Arc<ObjectPool<Vec<u8>>> = Arc::new(ObjectPool::new(
            from_fn(|()| Vec::new(), |b: &mut Vec<u8>, ()| b.clear()),
            4,
        ));
        buffers.recycle(vec![1, 2, 3]);

        registry.put("strings", Arc::clone(&strings));
        registry.put("buffers", Arc::clone(&buffers));
        registry.clear();

        assert!(registry.is_empty());
        assert!(strings.is_empty());
        assert!(buffers.is_empty());
    }
}
