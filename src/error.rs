use thiserror::Error;

use crate::domain::error::ArbError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Arb(#[from] ArbError),

    /// Chain, quote or qualification retrieval failed. Never retried implicitly.
    #[error("data fetch failed: {0}")]
    DataFetch(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::DataFetch`] with a formatted reason.
    pub fn data_fetch(reason: impl Into<String>) -> Self {
        Self::DataFetch(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
