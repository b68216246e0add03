//! Playback request tokens
//!
//! A token ties a play request to later requests that mean to revise it.
//! Example: `play(1, X, now)` then `play(2, Y, later)` then `play(2, Z, later)`.
//! The third call always refers to the second one, even if Y already
//! started playing by the time it arrives.

use serde::{Deserialize, Serialize};

/// Opaque identifier associated with a play request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub u64);

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
