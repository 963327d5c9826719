use std::any::Any;
use std::fmt;

use crate::ResolutionError;

/// Whatever went wrong while an accessor was trying to resolve a route parameter.
///
/// Accessors are free to fail in many different ways: with a bare message, with a
/// full-fledged error type (optionally carrying an HTTP status code), with an error
/// that's already been normalized, or by panicking.
/// [`Failure`] captures all of them, and it's then turned into a [`ResolutionError`]
/// before being exposed to the rest of the request processing pipeline.
///
/// You rarely need to build a [`Failure`] explicitly: most accessors return
/// `Result<T, E>` where `E` converts into [`Failure`] (e.g. `&str`, `String`,
/// [`anyhow::Error`] or [`ResolutionError`]).
#[non_exhaustive]
pub enum Failure {
    /// A bare error message.
    Message(String),
    /// An error-like value.
    ///
    /// Its `Display` representation is used as error message.
    /// If `status` is set, it's used as the status code of the normalized error.
    Error {
        source: Box<dyn std::error::Error + Send + Sync>,
        status: Option<u16>,
    },
    /// An error that has already been normalized.
    Resolution(ResolutionError),
    /// The payload of a panic that occurred while the accessor was running.
    Panic(Box<dyn Any + Send>),
    /// A failure we know nothing about.
    Unknown,
}

impl Failure {
    /// Build a [`Failure`] from a bare error message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Build a [`Failure`] from an error-like value, with no explicit status code.
    pub fn error<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Error {
            source: error.into(),
            status: None,
        }
    }

    /// Attach an explicit status code to this failure.
    ///
    /// It has no effect on failures that have already been normalized.
    pub fn with_status(self, status: u16) -> Self {
        match self {
            Self::Message(message) => Self::Error {
                source: message.into(),
                status: Some(status),
            },
            Self::Error { source, .. } => Self::Error {
                source,
                status: Some(status),
            },
            Self::Panic(_) | Self::Unknown => Self::Error {
                source: "Internal Server Error".into(),
                status: Some(status),
            },
            Self::Resolution(e) => Self::Resolution(e),
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Self::Error { source, status } => f
                .debug_struct("Error")
                .field("source", source)
                .field("status", status)
                .finish(),
            Self::Resolution(e) => f.debug_tuple("Resolution").field(e).finish(),
            Self::Panic(_) => f.debug_tuple("Panic").finish_non_exhaustive(),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<ResolutionError> for Failure {
    fn from(e: ResolutionError) -> Self {
        Self::Resolution(e)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Self::error(e)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Failure {
    fn from(source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Error {
            source,
            status: None,
        }
    }
}
