//! Event types for the playctl event system
//!
//! Provides the pipeline event definitions and the EventBus that
//! distributes them to subscribers.

mod pipeline_types;

pub use pipeline_types::{EngineErrorKind, PipelineState};

use crate::token::Token;
use crate::units::PositionUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::broadcast;

/// Events emitted by the pipeline controller
///
/// Events are broadcast via EventBus and serialize with a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Controller state changed
    StateChanged {
        old_state: PipelineState,
        new_state: PipelineState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Engine was asked to start a media item
    ///
    /// Emitted on immediate play and on gapless hand-off to the next item.
    MediaStarted {
        token: Token,
        uri: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Current media ended with nothing scheduled after it
    EndOfStream {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Buffering level reported by the engine
    BufferingUpdated { token: Option<Token>, percent: u8 },

    /// Cached duration of the current media changed for one unit
    DurationUpdated {
        token: Option<Token>,
        unit: PositionUnit,
        duration: Option<u64>,
    },

    /// Engine reported whether the current media accepts seeks
    SeekabilityChanged { token: Option<Token>, seekable: bool },

    /// Engine reported whether the current media is a live source
    ///
    /// Live media never enter the buffering state.
    LiveChanged { token: Option<Token>, live: bool },

    /// Metadata tags found in the current media
    TagsUpdated {
        token: Option<Token>,
        tags: BTreeMap<String, String>,
    },

    /// Periodic position report (nanoseconds)
    PositionUpdated {
        token: Option<Token>,
        position_ns: Option<u64>,
        duration_ns: Option<u64>,
    },

    /// Current media is close to its end; the next item should be scheduled now
    MediaAboutToEnd { token: Token },

    /// Informational engine message
    Info { message: String },

    /// Non-fatal engine warning
    Warning { message: String },

    /// Engine error or request rejection
    Error {
        kind: EngineErrorKind,
        message: String,
        /// True when the controller tore down to idle
        fatal: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

// ========================================
// EventBus Implementation
// ========================================

/// Broadcast bus for pipeline events
///
/// Wraps `tokio::sync::broadcast`:
/// - every subscriber sees every event emitted after it subscribed
/// - slow subscribers lag and lose the oldest events instead of blocking emitters
///
/// # Examples
///
/// ```
/// use playctl_common::events::{EventBus, PipelineEvent, PipelineState};
///
/// let bus = EventBus::new(100);
/// let _rx = bus.subscribe();
/// bus.emit(PipelineEvent::StateChanged {
///     old_state: PipelineState::Idle,
///     new_state: PipelineState::Starting,
///     timestamp: chrono::Utc::now(),
/// }).ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PipelineEvent,
    ) -> Result<usize, broadcast::error::SendError<PipelineEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}
