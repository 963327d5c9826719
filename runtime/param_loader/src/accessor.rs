use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::Failure;

/// The outcome of an accessor invocation.
///
/// An accessor either resolves the identifier right away ([`Outcome::Ready`]) or
/// hands back a computation that will complete later on ([`Outcome::Pending`]).
///
/// Both `Result<T, E>` (where `E: Into<Failure>`) and [`Failure`] can be converted
/// into an [`Outcome`], so most accessors never need to name this type explicitly.
pub enum Outcome<T> {
    /// The accessor has already succeeded or failed.
    Ready(Result<T, Failure>),
    /// The accessor will complete asynchronously.
    Pending(BoxFuture<'static, Result<T, Failure>>),
}

impl<T> Outcome<T> {
    /// A successful outcome.
    pub fn value(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    /// A failed outcome.
    pub fn failure(failure: impl Into<Failure>) -> Self {
        Self::Ready(Err(failure.into()))
    }

    /// An outcome that will be known when `future` completes.
    pub fn pending<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: 'static,
        E: Into<Failure> + 'static,
    {
        Self::Pending(future.map(|r| r.map_err(Into::into)).boxed())
    }
}

impl<T> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(Ok(_)) => f.write_str("Ready(Ok(..))"),
            Self::Ready(Err(e)) => f.debug_tuple("Ready").field(&Err::<(), _>(e)).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T>
where
    E: Into<Failure>,
{
    fn from(result: Result<T, E>) -> Self {
        Self::Ready(result.map_err(Into::into))
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Self::Ready(Err(failure))
    }
}

type AccessorFn<C, T> = dyn Fn(&str, &C) -> Outcome<T> + Send + Sync;

/// The function used to resolve a route parameter identifier into a domain value.
///
/// It's invoked with the raw identifier extracted from the request path and with the
/// current request context.
///
/// The number of parameters it declares is part of its description: it's checked
/// when the [`ParamLoader`] is built, never at request time.
///
/// # Example
///
/// ```rust
/// use param_loader::{Accessor, Outcome, context::PlainContext};
///
/// // Synchronous
/// let by_id = Accessor::from_fn(|id: &str, _ctx: &PlainContext| {
///     id.parse::<u64>().map_err(|e| e.to_string())
/// });
///
/// // Asynchronous
/// let by_name = Accessor::from_fn(|name: &str, _ctx: &PlainContext| {
///     let name = name.to_owned();
///     Outcome::pending(async move { Ok::<_, String>(name.to_uppercase()) })
/// });
/// ```
///
/// [`ParamLoader`]: crate::ParamLoader
pub struct Accessor<C, T> {
    arity: usize,
    call: Arc<AccessorFn<C, T>>,
}

impl<C, T> Accessor<C, T>
where
    C: 'static,
    T: 'static,
{
    /// Wrap a function taking the route parameter identifier and the request context.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&str, &C) -> R + Send + Sync + 'static,
        R: Into<Outcome<T>>,
    {
        Self::with_arity(2, f)
    }

    /// Wrap a function whose declared number of parameters is specified explicitly.
    ///
    /// Useful when the accessor is described by an external signature (e.g. a
    /// binding to a scripting layer) rather than by its Rust type.
    /// The loader only accepts accessors that declare exactly two parameters.
    pub fn with_arity<F, R>(arity: usize, f: F) -> Self
    where
        F: Fn(&str, &C) -> R + Send + Sync + 'static,
        R: Into<Outcome<T>>,
    {
        Self {
            arity,
            call: Arc::new(move |identifier: &str, ctx: &C| f(identifier, ctx).into()),
        }
    }
}

impl<C, T> Accessor<C, T> {
    /// The number of parameters declared by the accessor.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn call(&self, identifier: &str, ctx: &C) -> Outcome<T> {
        (self.call)(identifier, ctx)
    }
}

impl<C, T> Clone for Accessor<C, T> {
    fn clone(&self) -> Self {
        Self {
            arity: self.arity,
            call: Arc::clone(&self.call),
        }
    }
}

impl<C, T> fmt::Debug for Accessor<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
