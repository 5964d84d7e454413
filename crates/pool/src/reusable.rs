//! Marker trait for pool-eligible types

use std::collections::{HashMap, VecDeque};
use std::hash::BuildHasher;

/// Marker for types that may be stored in an [`ObjectPool`](crate::ObjectPool).
///
/// The trait carries no behaviour. How an instance is built and how it is
/// brought back to a fresh state is decided by the
/// [`ObjectFactory`](crate::ObjectFactory) the pool was created with, so the
/// same type can be pooled with different reset strategies.
///
/// # Example
/// ```
/// use nebula_pool::Reusable;
///
/// struct Frame {
///     header: [u8; 16],
///     body: Vec<u8>,
/// }
///
/// impl Reusable for Frame {}
/// ```
pub trait Reusable: Send + 'static {}

// Standard library implementations

impl Reusable for String {}

impl<T: Send + 'static> Reusable for Vec<T> {}

impl<T: Send + 'static> Reusable for VecDeque<T> {}

impl<T: Send + 'static> Reusable for Box<T> {}

impl<K, V, S> Reusable for HashMap<K, V, S>
where
    K: Send + 'static,
    V: Send + 'static,
    S: BuildHasher + Send + 'static,
{
}

/// Implement [`Reusable`] for one or more types.
///
/// ```
/// struct Request;
/// struct Response;
///
/// nebula_pool::impl_reusable!(Request, Response);
/// ```
#[macro_export]
macro_rules! impl_reusable {
    ($($type:ty),+ $(,)?) => {
        $(impl $crate::reusable::Reusable for $type {})+
    };
}
