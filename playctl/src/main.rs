//! playctl - interactive playback console
//!
//! Drives a `PipelineController` over the simulated engine from commands
//! typed on stdin. Pipeline events are printed to stderr as they occur.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playctl::config::PlayctlConfig;
use playctl::console::{self, EventFormat};
use playctl::engine::{notification_channel, SimulatedEngine};
use playctl::{Media, Pipeline, PipelineController};
use tokio::io::BufReader;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for playctl
#[derive(Parser, Debug)]
#[command(name = "playctl")]
#[command(about = "Interactive playback controller console")]
#[command(version)]
struct Args {
    /// Config file (overrides PLAYCTL_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides the config file)
    #[arg(short, long, env = "PLAYCTL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print events as JSON lines
    #[arg(long)]
    json_events: bool,

    /// Media to play immediately
    now: Option<String>,

    /// Media to play after the first one
    next: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config must be read before the log level is known; report its
    // warnings through a temporary stderr subscriber
    let bootstrap = tracing_subscriber::fmt().with_writer(std::io::stderr).finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        PlayctlConfig::load(args.config.as_deref())
    })
    .context("Failed to load configuration")?;

    // RUST_LOG wins, then --log-level, then the config file
    let level = args.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("playctl={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting playctl console");

    let (notifier, notifications) = notification_channel(config.controller.notification_capacity);
    let engine = SimulatedEngine::spawn(config.engine.clone(), notifier);
    let position_interval = config.controller.position_update_interval();
    let controller = PipelineController::new(engine, config.controller.clone());

    let handler = controller.spawn_notification_handler(notifications);
    let reporter = controller.spawn_position_reporter(position_interval);
    let format = if args.json_events {
        EventFormat::Json
    } else {
        EventFormat::Text
    };
    let printer = console::spawn_event_printer(controller.subscribe(), format);

    if let Some(uri) = &args.now {
        let token = controller.get_new_token();
        if let Err(e) = controller.play_media(token, Media::new(uri.as_str()), true) {
            error!("Cannot play {}: {}", uri, e);
        }
    }
    if let Some(uri) = &args.next {
        let token = controller.get_new_token();
        if let Err(e) = controller.play_media(token, Media::new(uri.as_str()), false) {
            error!("Cannot schedule {}: {}", uri, e);
        }
    }

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = console::run(&controller, stdin) => {
            result.context("Console input failed")?;
        }
        _ = shutdown_signal() => {}
    }

    controller.stop();
    reporter.abort();
    handler.abort();
    printer.abort();

    info!("playctl shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
