//! Objects related to reporting errors from this library

use crate::record::RecordKind;

/// A list of error types that can occur within this library
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The CMS could not be reached, answered with an unexpected status, or
    /// sent a payload that could not be decoded
    #[error("Failed to fetch {what}")]
    Fetch {
        what: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Expected a record of type '{expected}' but got '{actual}'")]
    UnexpectedKind {
        expected: RecordKind,
        actual: RecordKind,
    },

    /// The map library could not be initialized, or no usable access
    /// credential is configured
    #[error("Map unavailable: {0}")]
    MapUnavailable(String),

    /// The map library refused to draw a marker
    #[error("Unable to create marker: {0}")]
    Marker(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn fetch<E>(what: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Fetch {
            what: what.into(),
            source: source.into(),
        }
    }
}

/// A convenience type alias for a [Result] with [Error] as its error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
