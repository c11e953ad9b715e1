use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`PlacefinderClient`](crate::api::PlacefinderClient).
///
/// An empty match list is not an error; it is reported through
/// [`Matches`](crate::domain::Matches).
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Connection failure, timeout, or an HTTP client that could not be built.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with an empty body.
    #[error("empty response from geocoding service")]
    EmptyResponse,

    /// The body was not valid JSON.
    #[error("invalid JSON in geocoding response: {0}")]
    Json(#[from] serde_json::Error),

    /// The body was JSON, but neither an object nor an array.
    #[error("unexpected geocoding response shape: expected object or array, got {0}")]
    UnexpectedShape(&'static str),

    /// A strict field rule failed while remapping results.
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Errors raised while remapping result fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A strict member rule referenced a key the item does not have.
    #[error("result item has no field '{0}'")]
    MissingField(String),
}

/// Errors raised while reading a settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
