//! Hooks to observe what a [`ParamLoader`] is doing.
//!
//! [`ParamLoader`]: crate::ParamLoader
use tracing::Level;
use tracing_log_error::log_error;

use crate::ResolutionError;

/// Get notified when a loader is built and whenever a route parameter is resolved.
///
/// [`TracingObserver`] is used by default.
/// Use [`NoopObserver`] to silence a loader entirely.
pub trait ResolutionObserver: Send + Sync {
    /// A loader has been built.
    fn on_created(&self) {}

    /// The route parameter `name` was successfully resolved for `identifier`.
    fn on_loaded(&self, _name: &str, _identifier: &str) {}

    /// The route parameter `name` couldn't be resolved for `identifier`.
    ///
    /// `raised` is `true` if the error is going to be propagated to the pipeline.
    fn on_failed(
        &self,
        _name: &str,
        _identifier: &str,
        _error: &ResolutionError,
        _raised: bool,
    ) {
    }
}

/// Emit a `tracing` event for every notification.
///
/// Errors are logged at `ERROR` level when propagated, at `WARN` level when
/// recorded into the request context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ResolutionObserver for TracingObserver {
    fn on_created(&self) {
        tracing::debug!("Route parameter loader created");
    }

    fn on_loaded(&self, name: &str, identifier: &str) {
        tracing::debug!(
            param.name = name,
            param.identifier = identifier,
            "{name} \"{identifier}\" loaded"
        );
    }

    fn on_failed(&self, name: &str, identifier: &str, error: &ResolutionError, raised: bool) {
        let status_code = error.status_code().as_u16();
        if raised {
            log_error!(
                error,
                level: Level::ERROR,
                param.name = name,
                param.identifier = identifier,
                http.response.status_code = status_code,
                "Unknown {name} \"{identifier}\""
            );
        } else {
            log_error!(
                error,
                level: Level::WARN,
                param.name = name,
                param.identifier = identifier,
                http.response.status_code = status_code,
                "Unknown {name} \"{identifier}\""
            );
        }
    }
}

/// Ignore all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ResolutionObserver for NoopObserver {}
