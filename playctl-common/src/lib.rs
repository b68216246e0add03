//! # playctl Common Library
//!
//! Shared code for the playctl crates including:
//! - Pipeline state and event types (PipelineEvent enum, EventBus)
//! - Playback tokens and positioning/volume units
//! - Bootstrap configuration loading
//! - Human-readable position formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod token;
pub mod units;

pub use error::{Error, Result};
pub use events::{EventBus, PipelineEvent, PipelineState};
pub use token::Token;
pub use units::{PositionUnit, VolumeFormat};
