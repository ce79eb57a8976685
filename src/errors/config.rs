use std::env::VarError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Represents an error related to environment variables.
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),

    /// A value was present but could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A value parsed but is unusable, e.g. an empty naming pool.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
