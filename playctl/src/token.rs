//! Token generation

use playctl_common::Token;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic token source owned by a controller
///
/// Tokens start at 1. Callers mixing their own tokens with generated ones
/// are responsible for avoiding collisions.
#[derive(Debug)]
pub struct TokenGenerator {
    next: AtomicU64,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_token(&self) -> Token {
        Token(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
