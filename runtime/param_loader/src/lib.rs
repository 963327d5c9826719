//! # `param_loader`
//!
//! Resolve route parameters into domain values before your request handlers run.
//!
//! Route parameters are raw identifiers: `/users/{user_id}` gives you the string
//! that was matched against `{user_id}`, not the user.
//! A [`ParamLoader`] takes care of the boring part:
//!
//! - It invokes your [`Accessor`] with the raw identifier and the request context.
//!   The accessor can succeed or fail right away, or return a future.
//! - It normalizes failures into a [`ResolutionError`], a message paired with
//!   an HTTP status code.
//! - It attaches the outcome to the request context, under the route parameter name
//!   (or a name of your choice), via the [`RequestContext`] trait.
//! - It tells the pipeline whether to carry on, see [`Processing`].
//!
//! # Example
//!
//! ```rust
//! use http::StatusCode;
//! use param_loader::{
//!     Accessor, ParamLoader, ResolutionError,
//!     context::{Resolved, StructuredContext},
//! };
//!
//! # async fn run() {
//! let loader = ParamLoader::builder()
//!     .accessor(Accessor::from_fn(|id: &str, _ctx: &StructuredContext| {
//!         match id {
//!             "1" => Ok("Alice".to_owned()),
//!             _ => Err(ResolutionError::new(StatusCode::NOT_FOUND)),
//!         }
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let mut ctx = StructuredContext::new();
//! loader.resolve(&mut ctx, "2", "user").await;
//!
//! let user = ctx.get::<Resolved<String>>("user").unwrap();
//! assert_eq!(user.value(), None);
//! assert_eq!(user.err().unwrap().status_code(), StatusCode::NOT_FOUND);
//! # }
//! ```
//!
//! [`RequestContext`]: crate::context::RequestContext
pub use accessor::{Accessor, Outcome};
pub use error::{ConfigurationError, ResolutionError};
pub use failure::Failure;
pub use loader::{LoadedParam, ParamLoader, ParamLoaderBuilder, Processing};

mod accessor;
pub mod config;
pub mod context;
mod error;
mod failure;
mod loader;
pub mod observer;
