//! Registry ownership: who holds a [`PoolRegistry`] and for how long.
//!
//! A [`PoolProvider`](crate::PoolProvider) only needs "give me the
//! registry". The owner decides the registry's lifetime:
//!
//! - [`GlobalOwner`]: one registry for the whole process, cleared explicitly
//!   with [`GlobalOwner::shutdown`].
//! - [`PoolScope`]: a registry owned by a component, cleared when the scope
//!   is closed or dropped.
//! - A plain [`PoolRegistry`], `&O` or `Arc<O>`: the caller manages it.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::registry::PoolRegistry;

/// Exposes the registry a provider resolves pools through.
///
/// Implementations must return the same registry for as long as they are
/// used by a provider.
pub trait RegistryOwner: Send + Sync {
    /// The owned registry.
    fn registry(&self) -> &PoolRegistry;
}

impl RegistryOwner for PoolRegistry {
    fn registry(&self) -> &PoolRegistry {
        self
    }
}

impl<O: RegistryOwner + ?Sized> RegistryOwner for &O {
    fn registry(&self) -> &PoolRegistry {
        (**self).registry()
    }
}

impl<O: RegistryOwner + ?Sized> RegistryOwner for Arc<O> {
    fn registry(&self) -> &PoolRegistry {
        (**self).registry()
    }
}

// ---------------------------------------------------------------------------
// GlobalOwner
// ---------------------------------------------------------------------------

static GLOBAL_REGISTRY: OnceLock<PoolRegistry> = OnceLock::new();

/// Owner of the process-wide registry.
///
/// The registry is built once, on the first call to [`init`](Self::init) or
/// the first provider lookup, and lives until the process exits. It is
/// never cleared implicitly; call [`shutdown`](Self::shutdown) to drain it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOwner;

impl GlobalOwner {
    /// Initialize the process-wide registry if needed and return it.
    ///
    /// Calling this more than once returns the same registry.
    pub fn init() -> &'static PoolRegistry {
        GLOBAL_REGISTRY.get_or_init(|| {
            debug!("initialized global pool registry");
            PoolRegistry::new()
        })
    }

    /// The process-wide registry, if it has been initialized.
    pub fn try_get() -> Option<&'static PoolRegistry> {
        GLOBAL_REGISTRY.get()
    }

    /// Drain and remove every pool in the process-wide registry.
    ///
    /// The registry itself stays usable; later lookups start from scratch.
    pub fn shutdown() {
        if let Some(registry) = Self::try_get() {
            registry.clear();
            debug!("global pool registry shut down");
        }
    }
}

impl RegistryOwner for GlobalOwner {
    fn registry(&self) -> &PoolRegistry {
        Self::init()
    }
}

// ---------------------------------------------------------------------------
// PoolScope
// ---------------------------------------------------------------------------

/// Registry owned by a component.
///
/// Pools resolved through a scope are independent of the global registry
/// and of other scopes. All of them are drained when the scope is closed or
/// dropped.
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use nebula_pool::{PoolProvider, PoolScope, factory};
///
/// let scope = Arc::new(PoolScope::new("http-worker"));
/// let provider = PoolProvider::create(Arc::clone(&scope));
///
/// let pool = provider
///     .get(factory::from_fn(|()| Vec::<u8>::new(), |b: &mut Vec<u8>, ()| b.clear()))
///     .unwrap();
/// pool.recycle(Vec::with_capacity(512));
/// assert_eq!(pool.len(), 1);
///
/// drop(provider);
/// drop(scope);
/// assert!(pool.is_empty());
/// ```
pub struct PoolScope {
    name: String,
    registry: PoolRegistry,
}

impl PoolScope {
    /// Create a scope with its own empty registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: PoolRegistry::new(),
        }
    }

    /// Scope name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drain and remove every pool in this scope.
    ///
    /// The scope stays usable; later lookups start from scratch.
    pub fn close(&self) {
        let pools = self.registry.len();
        self.registry.clear();
        debug!(scope = %self.name, pools, "closed pool scope");
    }
}

impl RegistryOwner for PoolScope {
    fn registry(&self) -> &PoolRegistry {
        &self.registry
    }
}

impl Drop for PoolScope {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for PoolScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolScope")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish()
    }
}
