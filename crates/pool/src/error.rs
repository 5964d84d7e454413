//! Error types for nebula-pool
//!
//! The pool itself never fails: factory errors reach the caller of
//! [`ObjectPool::obtain`](crate::ObjectPool::obtain) as the factory's own
//! error type. [`PoolError`] covers the registry and provider, where a
//! type-erased pool has to be handed back as a concrete type.

use thiserror::Error;

/// Registry and provider errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A key was requested with a different pool type than it was
    /// registered with.
    #[error("pool '{key}' holds {found}, requested as {expected}")]
    TypeMismatch {
        /// Registry key that was looked up.
        key: String,
        /// Pool type the caller asked for.
        expected: &'static str,
        /// Pool type stored under the key.
        found: &'static str,
    },
}

impl PoolError {
    /// Create a type mismatch error
    pub fn type_mismatch(key: &str, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.to_owned(),
            expected,
            found,
        }
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "POOL:TYPE_MISMATCH",
        }
    }
}

/// Result type for registry and provider operations
pub type PoolResult<T> = Result<T, PoolError>;
