//! How resolved route parameters are attached to the request context.
//!
//! The loader doesn't know (or care) about the shape of your request context.
//! It only relies on [`RequestContext`]:
//!
//! - If the context exposes a dedicated [`ParamStore`] (via [`RequestContext::param_store`]),
//!   resolved parameters are stored there. This lets the context namespace them
//!   however it sees fit, e.g. to avoid collisions with its own fields.
//! - Otherwise, they are written as plain fields of the context, using
//!   [`RequestContext::set_field`].
//!
//! Two ready-made contexts are provided, [`PlainContext`] and [`StructuredContext`].
//! [`RequestContext`] is also implemented for [`http::Request`]: resolved parameters
//! are stored in its extensions, as a [`ParamMap`].
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ResolutionError;

/// A type-erased resolved slot, as stored in the request context.
///
/// Use [`Slot::downcast_ref`] (or [`Slot::resolved`]) to get the typed value back.
#[derive(Clone)]
pub struct Slot(Arc<dyn Any + Send + Sync>);

impl Slot {
    /// Erase the type of a slot value.
    pub fn new<S>(value: S) -> Self
    where
        S: Any + Send + Sync,
    {
        Self(Arc::new(value))
    }

    /// Returns a reference to the slot value, if it is of type `S`.
    pub fn downcast_ref<S: Any>(&self) -> Option<&S> {
        self.0.downcast_ref()
    }

    /// Returns the captured outcome of a resolution, if the slot holds a [`Resolved<T>`].
    pub fn resolved<T: Any>(&self) -> Option<&Resolved<T>> {
        self.downcast_ref()
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot").finish_non_exhaustive()
    }
}

/// The outcome of a resolution, captured rather than propagated.
///
/// It holds either a value or an error, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T>(Result<T, ResolutionError>);

impl<T> Resolved<T> {
    /// The resolved value, if the resolution succeeded.
    pub fn value(&self) -> Option<&T> {
        self.0.as_ref().ok()
    }

    /// The resolution error, if the resolution failed.
    pub fn err(&self) -> Option<&ResolutionError> {
        self.0.as_ref().err()
    }

    /// View the outcome as a `Result`.
    pub fn as_result(&self) -> Result<&T, &ResolutionError> {
        self.0.as_ref()
    }

    /// Convert the outcome into a `Result`.
    pub fn into_result(self) -> Result<T, ResolutionError> {
        self.0
    }
}

impl<T> From<Result<T, ResolutionError>> for Resolved<T> {
    fn from(result: Result<T, ResolutionError>) -> Self {
        Self(result)
    }
}

/// What gets written into the request context for a route parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSlot<T> {
    /// The bare resolved value.
    ///
    /// Used when failures are propagated to the pipeline: there's no error to record.
    Bare(T),
    /// The captured outcome of the resolution.
    ///
    /// Used when failures are recorded in the request context.
    Captured(Resolved<T>),
}

impl<T> From<ResolvedSlot<T>> for Slot
where
    T: Any + Send + Sync,
{
    fn from(slot: ResolvedSlot<T>) -> Self {
        match slot {
            ResolvedSlot::Bare(value) => Slot::new(value),
            ResolvedSlot::Captured(resolved) => Slot::new(resolved),
        }
    }
}

/// A dedicated storage area for resolved route parameters.
pub trait ParamStore {
    /// Store the slot for the given route parameter, replacing any previous one.
    fn set_param(&mut self, key: &str, slot: Slot);

    /// Retrieve the slot for the given route parameter.
    fn get_param(&self, key: &str) -> Option<&Slot>;

    /// Check if a slot has been stored for the given route parameter.
    fn has_param(&self, key: &str) -> bool {
        self.get_param(key).is_some()
    }
}

/// The per-request context resolved route parameters are attached to.
pub trait RequestContext {
    /// The dedicated storage area for route parameters, if the context has one.
    ///
    /// It returns `None` by default: resolved parameters are then written
    /// using [`RequestContext::set_field`].
    fn param_store(&mut self) -> Option<&mut dyn ParamStore> {
        None
    }

    /// Write a slot as a plain field of the context.
    fn set_field(&mut self, key: &str, slot: Slot);
}

/// Attach `slot` to the context, under `key`.
pub(crate) fn write<C>(ctx: &mut C, key: &str, slot: Slot)
where
    C: RequestContext + ?Sized,
{
    match ctx.param_store() {
        Some(store) => store.set_param(key, slot),
        None => ctx.set_field(key, slot),
    }
}

/// A map of resolved route parameters, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ParamMap(HashMap<String, Slot>);

impl ParamMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the value stored for `key`, if it is of type `S`.
    pub fn get<S: Any>(&self, key: &str) -> Option<&S> {
        self.0.get(key).and_then(Slot::downcast_ref)
    }

    /// The number of stored route parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no route parameter has been stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ParamStore for ParamMap {
    fn set_param(&mut self, key: &str, slot: Slot) {
        self.0.insert(key.to_owned(), slot);
    }

    fn get_param(&self, key: &str) -> Option<&Slot> {
        self.0.get(key)
    }
}

/// A request context that exposes nothing but plain fields.
///
/// Resolved route parameters become fields of the context, named after the parameter.
#[derive(Debug, Clone, Default)]
pub struct PlainContext {
    fields: HashMap<String, Slot>,
}

impl PlainContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the field value, if it exists and is of type `S`.
    pub fn field<S: Any>(&self, key: &str) -> Option<&S> {
        self.fields.get(key).and_then(Slot::downcast_ref)
    }

    /// Check if a field with the given name exists.
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

impl RequestContext for PlainContext {
    fn set_field(&mut self, key: &str, slot: Slot) {
        self.fields.insert(key.to_owned(), slot);
    }
}

/// A request context that keeps resolved route parameters apart from its own fields.
///
/// A route parameter named `user` won't clash with a `user` field that was set
/// by another component of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct StructuredContext {
    fields: HashMap<String, Slot>,
    params: ParamMap,
}

impl StructuredContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved route parameters.
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// Returns a reference to the value stored for the route parameter, if it is of type `S`.
    pub fn get<S: Any>(&self, key: &str) -> Option<&S> {
        self.params.get(key)
    }

    /// Check if a slot has been stored for the given route parameter.
    pub fn has_param(&self, key: &str) -> bool {
        self.params.has_param(key)
    }

    /// Returns a reference to the field value, if it exists and is of type `S`.
    pub fn field<S: Any>(&self, key: &str) -> Option<&S> {
        self.fields.get(key).and_then(Slot::downcast_ref)
    }
}

impl RequestContext for StructuredContext {
    fn param_store(&mut self) -> Option<&mut dyn ParamStore> {
        Some(&mut self.params)
    }

    fn set_field(&mut self, key: &str, slot: Slot) {
        self.fields.insert(key.to_owned(), slot);
    }
}

impl<B> RequestContext for http::Request<B> {
    fn param_store(&mut self) -> Option<&mut dyn ParamStore> {
        let extensions = self.extensions_mut();
        if extensions.get::<ParamMap>().is_none() {
            extensions.insert(ParamMap::new());
        }
        extensions
            .get_mut::<ParamMap>()
            .map(|params| params as &mut dyn ParamStore)
    }

    fn set_field(&mut self, key: &str, slot: Slot) {
        if let Some(store) = self.param_store() {
            store.set_param(key, slot);
        }
    }
}
