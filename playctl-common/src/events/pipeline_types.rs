//! Pipeline state and engine error classification

use serde::{Deserialize, Serialize};

/// Observable controller state
///
/// `Starting`, `Stopping`, `Seeking` and `Buffering` are transitional.
/// `Seeking` and `Buffering` always resolve back to the `Playing` or
/// `Paused` state that was active before they began.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Starting,
    Stopping,
    Seeking,
    Buffering,
    Playing,
    Paused,
}

impl PipelineState {
    /// True while an engine operation is in flight
    pub fn is_transitioning(self) -> bool {
        matches!(
            self,
            PipelineState::Starting
                | PipelineState::Stopping
                | PipelineState::Seeking
                | PipelineState::Buffering
        )
    }

    /// True for the two settled states a seek or buffering cycle returns to
    pub fn is_active(self) -> bool {
        matches!(self, PipelineState::Playing | PipelineState::Paused)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Starting => "starting",
            PipelineState::Stopping => "stopping",
            PipelineState::Seeking => "seeking",
            PipelineState::Buffering => "buffering",
            PipelineState::Playing => "playing",
            PipelineState::Paused => "paused",
        };
        write!(f, "{}", name)
    }
}

/// Classification of engine failures
///
/// Whether a kind is fatal is decided by controller configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EngineErrorKind {
    /// Device or sink could not be acquired
    Resource,
    /// Stream format or container problem
    Stream,
    /// Decoder failure
    Decode,
    /// Network source failure
    Network,
    /// Anything else inside the engine
    Internal,
}

impl EngineErrorKind {
    pub const ALL: [EngineErrorKind; 5] = [
        EngineErrorKind::Resource,
        EngineErrorKind::Stream,
        EngineErrorKind::Decode,
        EngineErrorKind::Network,
        EngineErrorKind::Internal,
    ];
}

impl std::fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineErrorKind::Resource => write!(f, "resource"),
            EngineErrorKind::Stream => write!(f, "stream"),
            EngineErrorKind::Decode => write!(f, "decode"),
            EngineErrorKind::Network => write!(f, "network"),
            EngineErrorKind::Internal => write!(f, "internal"),
        }
    }
}
