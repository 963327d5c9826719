use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures_util::FutureExt;

use crate::config::LoaderConfig;
use crate::context::{RequestContext, Resolved, ResolvedSlot, write};
use crate::observer::{ResolutionObserver, TracingObserver};
use crate::{Accessor, ConfigurationError, Failure, Outcome, ResolutionError};

/// The number of parameters an accessor must declare: the identifier and the request context.
const ACCESSOR_ARITY: usize = 2;

/// Whether the request processing should carry on after a route parameter
/// has been resolved.
///
/// It mirrors the return type of a pre-processing middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Processing {
    /// Move on to the next stage of the pipeline.
    Continue,
    /// The resolution failed and the loader was configured to propagate failures.
    EarlyReturn(ResolutionError),
}

impl Processing {
    /// Returns the error to be propagated, if any.
    pub fn into_error(self) -> Option<ResolutionError> {
        match self {
            Processing::Continue => None,
            Processing::EarlyReturn(e) => Some(e),
        }
    }
}

/// Resolve a route parameter into a domain value and attach the outcome to the
/// request context.
///
/// A [`ParamLoader`] is bound to an [`Accessor`], the function in charge of turning the
/// raw identifier extracted from the request path into a value of type `T`.
/// The outcome is stored in the request context under the configured name
/// (see [`LoaderConfig::used_name`]), or under the name of the route parameter.
///
/// # Failures
///
/// The accessor may fail by returning an error, by handing back a future that
/// resolves to an error, or by panicking. In all cases, the failure is normalized
/// into a [`ResolutionError`]. What happens next depends on
/// [`LoaderConfig::raise_on_error`]:
///
/// - `false` (default): the error is recorded into the request context, as a
///   [`Resolved<T>`], and the request processing carries on.
/// - `true`: the error is propagated to the pipeline and the request context is
///   left untouched.
///
/// # Example
///
/// ```rust
/// use param_loader::{Accessor, ParamLoader, context::{PlainContext, Resolved}};
///
/// # async fn run() {
/// let loader = ParamLoader::builder()
///     .accessor(Accessor::from_fn(|id: &str, _ctx: &PlainContext| {
///         id.parse::<u64>().map_err(|e| e.to_string())
///     }))
///     .used_name("user_id")
///     .build()
///     .unwrap();
///
/// let mut ctx = PlainContext::new();
/// let processing = loader.resolve(&mut ctx, "42", "id").await;
/// assert!(processing.into_error().is_none());
///
/// let slot = ctx.field::<Resolved<u64>>("user_id").unwrap();
/// assert_eq!(slot.value(), Some(&42));
/// # }
/// ```
pub struct ParamLoader<C, T> {
    accessor: Accessor<C, T>,
    config: LoaderConfig,
    observer: Arc<dyn ResolutionObserver>,
}

impl<C, T> ParamLoader<C, T> {
    /// Start building a new [`ParamLoader`].
    pub fn builder() -> ParamLoaderBuilder<C, T> {
        ParamLoaderBuilder::new()
    }

    /// Build a new [`ParamLoader`] in one go.
    ///
    /// `used_name` overrides the key used to store the outcome in the request context.
    /// `raise_on_error` selects whether failures are propagated to the pipeline.
    pub fn new(
        accessor: Accessor<C, T>,
        used_name: Option<&str>,
        raise_on_error: bool,
    ) -> Result<Self, ConfigurationError> {
        let mut config = LoaderConfig::new().raise_on_error(raise_on_error);
        config.used_name = used_name.map(ToOwned::to_owned);
        Self::builder().accessor(accessor).config(config).build()
    }

    /// The configuration of this loader.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn storage_key(&self, param_name: &str) -> String {
        self.config
            .used_name
            .as_deref()
            .unwrap_or(param_name)
            .to_owned()
    }
}

impl<C, T> ParamLoader<C, T>
where
    T: Send + Sync + 'static,
{
    /// Resolve `identifier` and attach the outcome to the request context.
    ///
    /// It follows the conventional signature of route parameter middlewares:
    /// `response` is never read, `proceed` is invoked exactly once, with the error
    /// to be propagated, if any.
    pub async fn handle<Res, P, O>(
        &self,
        ctx: &mut C,
        _response: &mut Res,
        proceed: P,
        identifier: &str,
        param_name: &str,
    ) -> O
    where
        C: RequestContext,
        Res: ?Sized,
        P: FnOnce(Option<ResolutionError>) -> O,
    {
        let processing = self.resolve(ctx, identifier, param_name).await;
        proceed(processing.into_error())
    }

    /// Resolve `identifier` and attach the outcome to the request context.
    pub async fn resolve(&self, ctx: &mut C, identifier: &str, param_name: &str) -> Processing
    where
        C: RequestContext,
    {
        self.load(ctx, identifier, param_name).await.apply(ctx)
    }

    /// Resolve `identifier`, without touching the request context.
    ///
    /// Use [`LoadedParam::apply`] to attach the outcome to the request context.
    /// Splitting the two steps lets you resolve several route parameters
    /// of the same request concurrently.
    pub async fn load(&self, ctx: &C, identifier: &str, param_name: &str) -> LoadedParam<T> {
        let key = self.storage_key(param_name);
        let raise_on_error = self.config.raise_on_error;

        let outcome = match catch_unwind(AssertUnwindSafe(|| {
            self.accessor.call(identifier, ctx)
        })) {
            Ok(Outcome::Ready(result)) => result,
            Ok(Outcome::Pending(future)) => match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(Failure::Panic(payload)),
            },
            Err(payload) => Err(Failure::Panic(payload)),
        };
        let outcome = outcome.map_err(ResolutionError::normalize);

        match &outcome {
            Ok(_) => self.observer.on_loaded(&key, identifier),
            Err(e) => self.observer.on_failed(&key, identifier, e, raise_on_error),
        }

        LoadedParam {
            key,
            outcome,
            raise_on_error,
        }
    }
}

impl<C, T> Clone for ParamLoader<C, T> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            config: self.config.clone(),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<C, T> fmt::Debug for ParamLoader<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamLoader")
            .field("accessor", &self.accessor)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A route parameter that has been resolved, but not yet attached to the request context.
///
/// It's returned by [`ParamLoader::load`].
#[derive(Debug)]
#[must_use = "The outcome is lost unless you attach it to the request context with `apply`"]
pub struct LoadedParam<T> {
    key: String,
    outcome: Result<T, ResolutionError>,
    raise_on_error: bool,
}

impl<T> LoadedParam<T>
where
    T: Send + Sync + 'static,
{
    /// The key the outcome will be stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The outcome of the resolution.
    pub fn outcome(&self) -> Result<&T, &ResolutionError> {
        self.outcome.as_ref()
    }

    /// Attach the outcome to the request context.
    ///
    /// Nothing is written if the resolution failed and failures are propagated.
    pub fn apply<C>(self, ctx: &mut C) -> Processing
    where
        C: RequestContext + ?Sized,
    {
        let slot = match (self.outcome, self.raise_on_error) {
            (Err(e), true) => return Processing::EarlyReturn(e),
            (Ok(value), true) => ResolvedSlot::Bare(value),
            (outcome, false) => ResolvedSlot::Captured(Resolved::from(outcome)),
        };
        write(ctx, &self.key, slot.into());
        Processing::Continue
    }
}

/// A builder for [`ParamLoader`].
///
/// Use [`ParamLoader::builder`] to get one.
pub struct ParamLoaderBuilder<C, T> {
    accessor: Option<Accessor<C, T>>,
    config: LoaderConfig,
    observer: Arc<dyn ResolutionObserver>,
}

impl<C, T> ParamLoaderBuilder<C, T> {
    fn new() -> Self {
        Self {
            accessor: None,
            config: LoaderConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// The function used to resolve route parameter identifiers.
    pub fn accessor(mut self, accessor: Accessor<C, T>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Store the outcome under `name` rather than under the route parameter name.
    pub fn used_name(mut self, name: impl Into<String>) -> Self {
        self.config.used_name = Some(name.into());
        self
    }

    /// Choose whether failures should be propagated to the pipeline.
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.config.raise_on_error = raise;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Get notified of what the loader is doing.
    ///
    /// [`TracingObserver`] is used if no observer is specified.
    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: ResolutionObserver + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    /// Build the [`ParamLoader`].
    ///
    /// It fails if no accessor was provided, or if the accessor doesn't declare
    /// exactly two parameters.
    pub fn build(self) -> Result<ParamLoader<C, T>, ConfigurationError> {
        let Some(accessor) = self.accessor else {
            return Err(ConfigurationError::MissingAccessor);
        };
        if accessor.arity() != ACCESSOR_ARITY {
            return Err(ConfigurationError::InvalidArity {
                declared: accessor.arity(),
            });
        }
        self.observer.on_created();
        Ok(ParamLoader {
            accessor,
            config: self.config,
            observer: self.observer,
        })
    }
}

impl<C, T> fmt::Debug for ParamLoaderBuilder<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamLoaderBuilder")
            .field("accessor", &self.accessor)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
