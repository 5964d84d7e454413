//! # nebula-pool
//!
//! Bounded pools of reusable objects for the Nebula workflow engine.
//!
//! Short-lived values that are created over and over (per-request buffers,
//! event wrappers, scratch maps) can be *obtained* from a pool and
//! *recycled* back into it instead of being rebuilt from scratch every time.
//!
//! - [`ObjectPool`] is a bounded LIFO free list of instances of one type,
//!   guarded by a mutex. Instances are built and reset by an
//!   [`ObjectFactory`] supplied by the caller.
//! - [`PoolRegistry`] maps a string key to a type-erased pool.
//! - [`RegistryOwner`] decides how long a registry lives: process-wide
//!   ([`GlobalOwner`]) or tied to a component ([`PoolScope`]).
//! - [`PoolProvider`] resolves the pool for a type through an owner's
//!   registry, creating it on first use.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_pool::{PoolProvider, Reusable, factory};
//!
//! struct Event {
//!     name: String,
//!     payload: Vec<u8>,
//! }
//!
//! impl Reusable for Event {}
//!
//! let provider = PoolProvider::global();
//! let pool = provider
//!     .get(factory::from_fn(
//!         |name: &'static str| Event { name: name.to_owned(), payload: Vec::new() },
//!         |event: &mut Event, name: &'static str| {
//!             event.name.clear();
//!             event.name.push_str(name);
//!             event.payload.clear();
//!         },
//!     ))
//!     .expect("first registration of Event");
//!
//! let Ok(event) = pool.obtain("started");
//! assert_eq!(event.name, "started");
//! pool.recycle(event);
//!
//! let Ok(event) = pool.obtain("finished");
//! assert_eq!(event.name, "finished");
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`PoolConfig`] and [`ProviderConfig`]

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod factory;
pub mod owner;
pub mod pool;
pub mod provider;
pub mod registry;
pub mod reusable;
pub mod stats;

pub use config::{DEFAULT_KEY_PREFIX, DEFAULT_MAX_POOL_SIZE, PoolConfig, ProviderConfig};
pub use error::{PoolError, PoolResult};
pub use factory::{FnFactory, ObjectFactory};
pub use owner::{GlobalOwner, PoolScope, RegistryOwner};
pub use pool::ObjectPool;
pub use provider::PoolProvider;
pub use registry::PoolRegistry;
pub use reusable::Reusable;
pub use stats::PoolStatsSnapshot;

/// Convenient re-exports of commonly used types and traits.
pub mod prelude {
    pub use crate::config::{PoolConfig, ProviderConfig};
    pub use crate::error::{PoolError, PoolResult};
    pub use crate::factory::{ObjectFactory, from_fn};
    pub use crate::owner::{GlobalOwner, PoolScope, RegistryOwner};
    pub use crate::pool::ObjectPool;
    pub use crate::provider::PoolProvider;
    pub use crate::registry::PoolRegistry;
    pub use crate::reusable::Reusable;
}
