//! Error types for playctl
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use playctl_common::events::EngineErrorKind;
use thiserror::Error;

/// Failure reported synchronously by an engine adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Main error type for the playctl crate
#[derive(Error, Debug)]
pub enum Error {
    /// Media descriptor is structurally invalid (empty URI, no scheme)
    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    /// Engine refused to build or start the media
    #[error("Request rejected by engine: {0}")]
    Rejected(EngineError),

    /// Notification channel has no free capacity
    #[error("Notification channel full")]
    ChannelFull,

    /// Notification receiver has been dropped
    #[error("Notification channel closed")]
    ChannelClosed,

    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors bubbled up from the common crate
    #[error(transparent)]
    Common(#[from] playctl_common::Error),
}

/// Convenience Result type using the playctl Error
pub type Result<T> = std::result::Result<T, Error>;
