//! Pool provider: per-type pool lookup with lazy creation.

use std::any::type_name;
use std::sync::Arc;

use crate::config::{PoolConfig, ProviderConfig};
use crate::error::PoolResult;
use crate::factory::ObjectFactory;
use crate::owner::{GlobalOwner, RegistryOwner};
use crate::pool::ObjectPool;
use crate::registry::PoolRegistry;
use crate::reusable::Reusable;

/// Pool returned for element type `T` built by factory `F`.
pub type ProvidedPool<T, F> =
    ObjectPool<T, <F as ObjectFactory<T>>::Args, <F as ObjectFactory<T>>::Error>;

/// Resolves one pool per element type through an owner's registry.
///
/// The registry key for `T` is `"{namespace}:{type name of T}"`. The first
/// lookup for a type creates and registers its pool; every later lookup
/// through the same registry returns that pool and ignores the factory and
/// size it was given.
///
/// Type names are not guaranteed unique; two types that share one surface
/// as [`PoolError::TypeMismatch`](crate::PoolError::TypeMismatch), never as
/// a wrong pool.
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use nebula_pool::{PoolProvider, PoolRegistry, factory};
///
/// let provider = PoolProvider::create(PoolRegistry::new());
/// let first = provider
///     .get_with_size(
///         factory::from_fn(|()| String::new(), |s: &mut String, ()| s.clear()),
///         16,
///     )
///     .unwrap();
/// let second = provider
///     .get(factory::from_fn(|()| String::from("unused"), |s: &mut String, ()| s.clear()))
///     .unwrap();
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(second.max_size(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct PoolProvider<O: RegistryOwner = GlobalOwner> {
    owner: O,
    config: ProviderConfig,
}

impl PoolProvider<GlobalOwner> {
    /// Provider bound to the process-wide registry.
    pub fn global() -> Self {
        Self::create(GlobalOwner)
    }

    /// Drain and remove every pool in the process-wide registry.
    ///
    /// Shorthand for [`GlobalOwner::shutdown`].
    pub fn shutdown_global() {
        GlobalOwner::shutdown();
    }
}

impl<O: RegistryOwner> PoolProvider<O> {
    /// Provider bound to `owner`'s registry.
    pub fn create(owner: O) -> Self {
        Self {
            owner,
            config: ProviderConfig::default(),
        }
    }

    /// Replace the provider configuration.
    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// The registry pools are resolved through.
    pub fn registry(&self) -> &PoolRegistry {
        self.owner.registry()
    }

    /// The owner this provider is bound to.
    pub fn owner(&self) -> &O {
        &self.owner
    }

    /// Current configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Registry key used for element type `T`.
    pub fn key_for<T: ?Sized>(&self) -> String {
        format!("{}:{}", self.config.namespace, type_name::<T>())
    }

    /// Pool for `T`, created with `factory` and the configured default size
    /// if none is registered yet.
    ///
    /// Fails with [`PoolError::TypeMismatch`](crate::PoolError::TypeMismatch)
    /// if the pool registered for `T` uses a different argument or error type
    /// than `factory`.
    pub fn get<T, F>(&self, factory: F) -> PoolResult<Arc<ProvidedPool<T, F>>>
    where
        T: Reusable,
        F: ObjectFactory<T>,
        F::Args: 'static,
        F::Error: 'static,
    {
        self.get_with_config(factory, self.config.pool)
    }

    /// Like [`get`](Self::get), with an explicit capacity for a newly
    /// created pool.
    pub fn get_with_size<T, F>(
        &self,
        factory: F,
        max_size: usize,
    ) -> PoolResult<Arc<ProvidedPool<T, F>>>
    where
        T: Reusable,
        F: ObjectFactory<T>,
        F::Args: 'static,
        F::Error: 'static,
    {
        self.get_with_config(factory, PoolConfig::new(max_size))
    }

    /// Like [`get`](Self::get), with an explicit configuration for a newly
    /// created pool.
    pub fn get_with_config<T, F>(
        &self,
        factory: F,
        config: PoolConfig,
    ) -> PoolResult<Arc<ProvidedPool<T, F>>>
    where
        T: Reusable,
        F: ObjectFactory<T>,
        F::Args: 'static,
        F::Error: 'static,
    {
        let key = self.key_for::<T>();
        self.registry()
            .get_or_insert_with(&key, || ObjectPool::with_config(factory, config))
    }
}
