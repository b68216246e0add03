//! Current / next playback slots
//!
//! Tracks which media item is playing and which one follows it.

use crate::media::Media;
use playctl_common::Token;

/// A media descriptor bound to its token
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub token: Token,
    pub media: Media,
}

impl Slot {
    pub fn new(token: Token, media: Media) -> Self {
        Self { token, media }
    }
}

/// Outcome of scheduling a next item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextUpdate {
    /// Next was empty or held a different token
    Scheduled,
    /// Next already held this token; its media was replaced
    Replaced,
}

#[derive(Debug, Default)]
pub struct Slots {
    current: Option<Slot>,
    next: Option<Slot>,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Slot> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Slot> {
        self.next.as_ref()
    }

    pub fn current_token(&self) -> Option<Token> {
        self.current.as_ref().map(|slot| slot.token)
    }

    pub fn is_current_token(&self, token: Token) -> bool {
        self.current_token() == Some(token)
    }

    /// Make `slot` current and discard any scheduled next item
    pub fn start(&mut self, slot: Slot) {
        self.current = Some(slot);
        self.next = None;
    }

    /// Schedule `media` to follow the current item
    pub fn schedule_next(&mut self, token: Token, media: Media) -> NextUpdate {
        match &mut self.next {
            Some(next) if next.token == token => {
                next.media = media;
                NextUpdate::Replaced
            }
            _ => {
                self.next = Some(Slot::new(token, media));
                NextUpdate::Scheduled
            }
        }
    }

    /// Promote next to current
    ///
    /// Returns the new current slot, or `None` (with current cleared) when
    /// nothing was scheduled.
    pub fn advance(&mut self) -> Option<&Slot> {
        self.current = self.next.take();
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.next = None;
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }
}
