//! Errors returned when building a [`ParamLoader`] or when resolving a route parameter.
//!
//! [`ParamLoader`]: crate::ParamLoader
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};

use crate::Failure;

/// The message used when we can't extract anything meaningful from a failure.
const GENERIC_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`ParamLoaderBuilder::build`] when the loader is misconfigured.
///
/// It is always a programmer error: it should surface when the application starts,
/// before any request is processed.
///
/// [`ParamLoaderBuilder::build`]: crate::ParamLoaderBuilder::build
pub enum ConfigurationError {
    /// No accessor was provided.
    #[error("Please define the access method as first parameter of the middleware factory.")]
    MissingAccessor,
    /// The accessor doesn't declare exactly two parameters (the identifier and the request context).
    #[error("The access method as first parameter need two and only two arguments")]
    InvalidArity {
        /// The number of parameters declared by the accessor.
        declared: usize,
    },
}

/// A failure to resolve a route parameter, normalized to a message and an HTTP status code.
///
/// Both fields are always populated.
/// The status code defaults to `500 Internal Server Error` when the original failure
/// doesn't carry a more specific one.
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use param_loader::ResolutionError;
///
/// let e = ResolutionError::new(StatusCode::NOT_FOUND);
/// assert_eq!(e.message(), "Not Found");
/// assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolutionError {
    message: String,
    status_code: StatusCode,
}

impl ResolutionError {
    /// Build a [`ResolutionError`] using the canonical reason phrase of the status code
    /// as error message.
    pub fn new(status_code: StatusCode) -> Self {
        Self::with_message(status_code, "")
    }

    /// Build a [`ResolutionError`] with a custom error message.
    ///
    /// The canonical reason phrase of the status code is used if the message is empty.
    pub fn with_message(status_code: StatusCode, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = status_code
                .canonical_reason()
                .unwrap_or(GENERIC_MESSAGE)
                .to_owned();
        }
        Self {
            message,
            status_code,
        }
    }

    /// Normalize an arbitrary [`Failure`].
    ///
    /// - A failure that's already been normalized is returned unchanged. This
    ///   includes errors that carry a [`ResolutionError`] in their source chain.
    /// - A bare message is used as is, with a `500` status code.
    /// - An error-like value with an explicit, valid status code is passed through:
    ///   its `Display` representation and its status code are kept as they are.
    /// - An error-like value without a usable status code contributes its `Display`
    ///   representation as message, with a `500` status code.
    /// - A panic payload is normalized like a returned failure if it's a
    ///   [`ResolutionError`] or a [`Failure`]. It's used as message if it's a string.
    /// - Everything else becomes an opaque `500 Internal Server Error`.
    pub fn normalize(failure: Failure) -> Self {
        match failure {
            Failure::Resolution(e) => e,
            Failure::Message(message) => {
                Self::with_message(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            Failure::Error { source, status } => {
                if let Some(e) = find_in_chain(&*source) {
                    return e.clone();
                }
                match status.and_then(|s| StatusCode::from_u16(s).ok()) {
                    Some(status_code) => Self {
                        message: source.to_string(),
                        status_code,
                    },
                    None => {
                        Self::with_message(StatusCode::INTERNAL_SERVER_ERROR, source.to_string())
                    }
                }
            }
            Failure::Panic(payload) => {
                let payload = match payload.downcast::<ResolutionError>() {
                    Ok(e) => return *e,
                    Err(payload) => payload,
                };
                let payload = match payload.downcast::<Failure>() {
                    Ok(failure) => return Self::normalize(*failure),
                    Err(payload) => payload,
                };
                let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
                    (*message).to_owned()
                } else if let Some(message) = payload.downcast_ref::<String>() {
                    message.clone()
                } else {
                    String::new()
                };
                Self::with_message(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            Failure::Unknown => Self::new(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status code associated with this failure.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Convert a [`ResolutionError`] into an HTTP response.
    ///
    /// The status code is preserved, the error message is used as a plain text body.
    pub fn to_response(&self) -> http::Response<String> {
        let mut response = http::Response::new(self.message.clone());
        *response.status_mut() = self.status_code;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

impl From<Failure> for ResolutionError {
    fn from(failure: Failure) -> Self {
        Self::normalize(failure)
    }
}

fn find_in_chain<'a>(
    error: &'a (dyn std::error::Error + 'static),
) -> Option<&'a ResolutionError> {
    let mut current = Some(error);
    while let Some(e) = current {
        if let Some(resolution_error) = e.downcast_ref::<ResolutionError>() {
            return Some(resolution_error);
        }
        current = e.source();
    }
    None
}
