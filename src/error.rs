//! Error types for the tier balancer

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a tier balance pass
#[derive(Error, Debug)]
pub enum Error {
    /// Size string could not be parsed
    #[error("unparseable size string: {0:?}")]
    MalformedSize(String),

    /// Index store connection error
    #[error("index store connection error: {0}")]
    StoreConnection(#[source] reqwest::Error),

    /// Index store rejected a request
    #[error("index store query error: {0}")]
    StoreQuery(String),

    /// Index store response parse error
    #[error("failed to parse index store response: {0}")]
    StoreResponseParse(String),

    /// Index present in one listing but missing from the other
    #[error("inconsistent snapshot metadata for index {index}")]
    InconsistentSnapshot { index: String },

    /// Cold tier could not be shrunk enough to make room
    #[error("eviction freed {freed_gb:.1} GB of {needed_gb:.1} GB needed in the cold tier")]
    EvictionInsufficient { needed_gb: f64, freed_gb: f64 },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
