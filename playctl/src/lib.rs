//! # playctl Library
//!
//! Playback controller over an asynchronous streaming engine.
//!
//! **Purpose:** Accept play, stop, pause, seek and volume requests at any
//! time, defer the ones that arrive mid-transition, resolve next-item races
//! with tokens, and hand off gaplessly from one media item to the next.
//!
//! **Architecture:** A `PipelineController` state machine drives an
//! `EngineAdapter` and consumes its notifications from a bounded channel.
//! State changes are broadcast as `PipelineEvent`s.

pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod token;

pub use error::{EngineError, Error, Result};
pub use media::Media;
pub use pipeline::{Pipeline, PipelineController};
