//! Media descriptors
//!
//! A descriptor is a location URI plus an optional opaque JSON payload.
//! The controller never interprets the payload; engines may.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Media item handed to the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<serde_json::Value>,
}

impl Media {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            payload: None,
        }
    }

    pub fn with_payload(uri: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            uri: uri.into(),
            payload: Some(payload),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// URI scheme (text before `://`), if the URI has one
    pub fn scheme(&self) -> Option<&str> {
        self.uri
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .filter(|scheme| !scheme.is_empty())
    }

    /// Unsigned integer field from an object payload
    pub fn payload_u64(&self, key: &str) -> Option<u64> {
        self.payload.as_ref()?.get(key)?.as_u64()
    }

    /// Structural validity check
    ///
    /// Valid descriptors have a non-blank URI that either carries a
    /// `scheme://` prefix or is an absolute filesystem path.
    pub fn validate(&self) -> Result<()> {
        let uri = self.uri.trim();
        if uri.is_empty() {
            return Err(Error::InvalidMedia("empty URI".to_string()));
        }
        if self.scheme().is_some() || Path::new(uri).is_absolute() {
            return Ok(());
        }
        Err(Error::InvalidMedia(format!(
            "URI '{}' has no scheme and is not an absolute path",
            self.uri
        )))
    }
}

impl std::fmt::Display for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}
