//! Engine → controller notification channel
//!
//! A bounded, ordered `tokio::sync::mpsc` channel. Engines hold a
//! [`NotificationSender`]; the controller's handler task owns the receiver.
//!
//! Every notification travels inside an [`EngineMessage`] stamped with the
//! token of the media graph it came from. The controller drops messages
//! stamped for a graph it has already replaced, so an acknowledgement still
//! queued for the previous media is never mistaken for one about the new.

use super::EngineState;
use crate::error::{Error, Result};
use playctl_common::events::EngineErrorKind;
use playctl_common::Token;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::warn;

/// Asynchronous progress reports from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotification {
    /// Engine settled in a new state
    StateReached(EngineState),
    /// Current media finished
    EndOfStream,
    /// Buffer fill level, 0-100
    BufferingProgress(u8),
    /// Durations may have changed; the controller re-queries them
    DurationChanged,
    /// Seek started by `EngineAdapter::seek` completed
    SeekDone,
    Error {
        kind: EngineErrorKind,
        message: String,
    },
    /// Current media is close to its end
    AboutToEnd,
    /// Current media gained or lost the ability to seek
    SeekabilityChanged(bool),
    /// Current media is (or is not) a live source
    LiveChanged(bool),
    /// Metadata tags found in the stream
    Tags(BTreeMap<String, String>),
    Info(String),
    Warning(String),
}

/// A notification stamped with the media it concerns
#[derive(Debug, Clone, PartialEq)]
pub struct EngineMessage {
    /// Token given to the `build_and_start` call whose graph produced the
    /// notification, `None` if the engine cannot attribute it
    pub token: Option<Token>,
    pub notification: EngineNotification,
}

impl EngineMessage {
    pub fn new(token: Option<Token>, notification: EngineNotification) -> Self {
        Self {
            token,
            notification,
        }
    }
}

impl From<EngineNotification> for EngineMessage {
    fn from(notification: EngineNotification) -> Self {
        Self::new(None, notification)
    }
}

pub type NotificationReceiver = mpsc::Receiver<EngineMessage>;

/// Sending half given to engines
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<EngineMessage>,
}

impl NotificationSender {
    /// Post without waiting; fails if the channel is full or closed
    pub fn notify(&self, message: impl Into<EngineMessage>) -> Result<()> {
        self.tx.try_send(message.into()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(dropped) => {
                warn!("Notification channel full, dropping {:?}", dropped);
                Error::ChannelFull
            }
            mpsc::error::TrySendError::Closed(_) => Error::ChannelClosed,
        })
    }

    /// Post, waiting for capacity
    pub async fn notify_async(&self, message: impl Into<EngineMessage>) -> Result<()> {
        self.tx
            .send(message.into())
            .await
            .map_err(|_| Error::ChannelClosed)
    }
}

/// Create a bounded notification channel
///
/// A zero capacity is raised to 1.
pub fn notification_channel(capacity: usize) -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (NotificationSender { tx }, rx)
}
