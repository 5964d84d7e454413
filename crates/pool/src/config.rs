//! Pool and provider configuration types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of idle instances a pool retains.
pub const DEFAULT_MAX_POOL_SIZE: usize = 5;

/// Namespace prepended to every registry key derived by a
/// [`PoolProvider`](crate::PoolProvider), so provider-managed pools cannot
/// collide with other users of a shared registry.
pub const DEFAULT_KEY_PREFIX: &str = "nebula.pool.DEFAULT_KEY";

/// Configuration for a single object pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Maximum number of idle instances kept for reuse.
    ///
    /// Recycling into a full pool drops the instance. `0` disables
    /// retention entirely: every `obtain` creates.
    pub max_size: usize,
}

impl PoolConfig {
    /// Create a configuration with the given capacity.
    pub const fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// Set the maximum number of idle instances.
    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POOL_SIZE)
    }
}

/// Configuration for a [`PoolProvider`](crate::PoolProvider)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProviderConfig {
    /// Prefix of every registry key the provider derives.
    pub namespace: String,
    /// Settings for pools the provider creates without an explicit size.
    pub pool: PoolConfig,
}

impl ProviderConfig {
    /// Use a different key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Use a different default pool configuration.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_KEY_PREFIX.to_owned(),
            pool: PoolConfig::default(),
        }
    }
}
