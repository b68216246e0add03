//! Interactive console driver
//!
//! Reads command lines, tokenizes them and dispatches through the command
//! table. A background task prints pipeline events as they arrive.

pub mod commands;
pub mod tokenizer;

pub use commands::{dispatch, Outcome};
pub use tokenizer::tokenize_line;

use crate::pipeline::Pipeline;
use futures::stream::StreamExt;
use playctl_common::human_time::{format_clock, format_position};
use playctl_common::{PipelineEvent, Token};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// How events are rendered on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    Text,
    Json,
}

/// One-line human-readable description of an event
pub fn describe_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::StateChanged {
            old_state,
            new_state,
            ..
        } => format!("State change: old: {} new: {}", old_state, new_state),
        PipelineEvent::MediaStarted { token, uri, .. } => {
            format!("Media started with URI {} and token {}", uri, token)
        }
        PipelineEvent::EndOfStream { .. } => "End-Of-Stream reported".to_string(),
        PipelineEvent::BufferingUpdated { token, percent } => {
            format!("Buffering: {}%{}", percent, token_suffix(*token))
        }
        PipelineEvent::DurationUpdated {
            token,
            unit,
            duration,
        } => format!(
            "Duration ({}): {}{}",
            unit,
            format_position(*duration, *unit),
            token_suffix(*token)
        ),
        PipelineEvent::SeekabilityChanged { token, seekable } => format!(
            "Media is {}seekable{}",
            if *seekable { "" } else { "not " },
            token_suffix(*token)
        ),
        PipelineEvent::LiveChanged { token, live } => format!(
            "Media is {}live{}",
            if *live { "" } else { "not " },
            token_suffix(*token)
        ),
        PipelineEvent::TagsUpdated { token, tags } => {
            let listed: Vec<String> = tags
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            format!("New tags{}: {}", token_suffix(*token), listed.join(", "))
        }
        PipelineEvent::PositionUpdated {
            token,
            position_ns,
            duration_ns,
        } => format!(
            "Position: {} / {}{}",
            position_ns.map(format_clock).unwrap_or_else(|| "unknown".to_string()),
            duration_ns.map(format_clock).unwrap_or_else(|| "unknown".to_string()),
            token_suffix(*token)
        ),
        PipelineEvent::MediaAboutToEnd { token } => {
            format!("Media with token {} about to end", token)
        }
        PipelineEvent::Info { message } => format!("Info message: {}", message),
        PipelineEvent::Warning { message } => format!("Warning message: {}", message),
        PipelineEvent::Error {
            kind,
            message,
            fatal,
            ..
        } => format!(
            "Error message ({}{}): {}",
            kind,
            if *fatal { ", fatal" } else { "" },
            message
        ),
    }
}

fn token_suffix(token: Option<Token>) -> String {
    token.map(|t| format!(" (token {})", t)).unwrap_or_default()
}

/// Print events from `rx` to stderr until the bus closes
pub fn spawn_event_printer(
    rx: broadcast::Receiver<PipelineEvent>,
    format: EventFormat,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = Box::pin(BroadcastStream::new(rx).filter_map(|result| async move {
            match result {
                Ok(event) => match format {
                    EventFormat::Text => Some(describe_event(&event)),
                    EventFormat::Json => match serde_json::to_string(&event) {
                        Ok(json) => Some(json),
                        Err(e) => {
                            warn!("Failed to serialize event: {}", e);
                            None
                        }
                    },
                },
                Err(e) => {
                    // Lagged: the printer fell behind the bus
                    warn!("Event stream error: {:?}", e);
                    None
                }
            }
        }));

        while let Some(line) = stream.next().await {
            eprintln!("{}", line);
        }
        debug!("Event bus closed, printer exiting");
    })
}

/// Read and execute commands from `input` until `quit` or end of input
pub async fn run<R>(pipeline: &dyn Pipeline, input: R) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    eprintln!("Type help to get a list of valid commands\n");

    let mut lines = input.lines();
    let mut stderr = std::io::stderr();

    while let Some(line) = lines.next_line().await? {
        let tokens = tokenize_line(&line);
        if tokens.is_empty() {
            continue;
        }
        if dispatch(pipeline, &tokens, &mut stderr)? == Outcome::Quit {
            break;
        }
    }
    Ok(())
}
