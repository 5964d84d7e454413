//! Creation and reset strategy for pooled objects

use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;

use crate::reusable::Reusable;

/// Builds new instances of `T` and resets recycled ones.
///
/// A pool calls [`create`](Self::create) when its free list is empty and
/// [`reuse`](Self::reuse) on the most recently recycled instance otherwise.
/// Both are called **while the pool lock is held**: they must not touch the
/// same pool again and should not block for long, or every other caller of
/// that pool stalls behind them.
///
/// Errors are returned to the `obtain` caller exactly as produced.
///
/// # Example
/// ```
/// use std::convert::Infallible;
///
/// use nebula_pool::{ObjectFactory, ObjectPool};
///
/// struct BufferFactory;
///
/// impl ObjectFactory<Vec<u8>> for BufferFactory {
///     type Args = usize;
///     type Error = Infallible;
///
///     fn create(&self, capacity: usize) -> Result<Vec<u8>, Infallible> {
///         Ok(Vec::with_capacity(capacity))
///     }
///
///     fn reuse(&self, buffer: &mut Vec<u8>, capacity: usize) -> Result<(), Infallible> {
///         buffer.clear();
///         buffer.reserve(capacity);
///         Ok(())
///     }
/// }
///
/// let pool = ObjectPool::new(BufferFactory, 8);
/// let Ok(buffer) = pool.obtain(4096);
/// assert!(buffer.capacity() >= 4096);
/// ```
pub trait ObjectFactory<T: Reusable>: Send + Sync + 'static {
    /// Arguments passed to both `create` and `reuse`. Use a tuple for
    /// several values and `()` for none.
    type Args;

    /// Failure reported by the factory.
    type Error;

    /// Build a new, fully usable instance.
    fn create(&self, args: Self::Args) -> Result<T, Self::Error>;

    /// Bring a recycled instance back to a fresh state for `args`.
    ///
    /// If this fails the instance is dropped; it is not returned to the pool.
    fn reuse(&self, instance: &mut T, args: Self::Args) -> Result<(), Self::Error>;
}

/// Factory built from a pair of infallible closures. See [`from_fn`].
pub struct FnFactory<T, A, C, R> {
    create: C,
    reuse: R,
    _marker: PhantomData<fn(A) -> T>,
}

/// Factory built from a pair of fallible closures. See [`try_from_fn`].
pub struct TryFnFactory<T, A, E, C, R> {
    create: C,
    reuse: R,
    _marker: PhantomData<fn(A) -> Result<T, E>>,
}

/// Build a factory from a `create` and a `reuse` closure that cannot fail.
///
/// ```
/// use nebula_pool::{ObjectPool, factory};
///
/// let pool = ObjectPool::new(
///     factory::from_fn(|()| String::with_capacity(256), |s: &mut String, ()| s.clear()),
///     4,
/// );
/// let Ok(mut line) = pool.obtain(());
/// line.push_str("hello");
/// pool.recycle(line);
///
/// let Ok(line) = pool.obtain(());
/// assert!(line.is_empty());
/// ```
pub fn from_fn<T, A, C, R>(create: C, reuse: R) -> FnFactory<T, A, C, R>
where
    T: Reusable,
    C: Fn(A) -> T + Send + Sync + 'static,
    R: Fn(&mut T, A) + Send + Sync + 'static,
{
    FnFactory {
        create,
        reuse,
        _marker: PhantomData,
    }
}

/// Build a factory from a `create` and a `reuse` closure that may fail.
pub fn try_from_fn<T, A, E, C, R>(create: C, reuse: R) -> TryFnFactory<T, A, E, C, R>
where
    T: Reusable,
    C: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    R: Fn(&mut T, A) -> Result<(), E> + Send + Sync + 'static,
{
    TryFnFactory {
        create,
        reuse,
        _marker: PhantomData,
    }
}

impl<T, A, C, R> ObjectFactory<T> for FnFactory<T, A, C, R>
where
    T: Reusable,
    A: 'static,
    C: Fn(A) -> T + Send + Sync + 'static,
    R: Fn(&mut T, A) + Send + Sync + 'static,
{
    type Args = A;
    type Error = Infallible;

    fn create(&self, args: A) -> Result<T, Infallible> {
        Ok((self.create)(args))
    }

    fn reuse(&self, instance: &mut T, args: A) -> Result<(), Infallible> {
        (self.reuse)(instance, args);
        Ok(())
    }
}

impl<T, A, E, C, R> ObjectFactory<T> for TryFnFactory<T, A, E, C, R>
where
    T: Reusable,
    A: 'static,
    E: 'static,
    C: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    R: Fn(&mut T, A) -> Result<(), E> + Send + Sync + 'static,
{
    type Args = A;
    type Error = E;

    fn create(&self, args: A) -> Result<T, E> {
        (self.create)(args)
    }

    fn reuse(&self, instance: &mut T, args: A) -> Result<(), E> {
        (self.reuse)(instance, args)
    }
}

impl<T, A, C, R> fmt::Debug for FnFactory<T, A, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("type", &core::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T, A, E, C, R> fmt::Debug for TryFnFactory<T, A, E, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFnFactory")
            .field("type", &core::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
