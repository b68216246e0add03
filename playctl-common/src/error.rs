//! Common error types for playctl

use thiserror::Error;

/// Common result type for playctl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the playctl crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
