//! Error types for MargaNav

use thiserror::Error;

/// MargaNav error type
///
/// The decision step itself is infallible: every mode has a defined action
/// for every reachable input, including empty feature sets. Errors only
/// arise while loading configuration.
#[derive(Error, Debug)]
pub enum NavError {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, NavError>;
