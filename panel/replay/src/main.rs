//! Panel Replay
//!
//! Headless surface for the action-prompt engine. Replays a transcript of
//! printer console output (or, with the `websocket` feature, listens to a
//! live Moonraker instance) and prints every prompt and dispatched command.
//!
//! # Usage
//!
//! ```bash
//! # Replay a captured console log, pressing the first button of every prompt
//! panel-replay --transcript runout.log --select 0
//!
//! # Replay raw JSON-RPC frames from stdin
//! panel-replay --transcript - --jsonrpc < moonraker.jsonl
//!
//! # Watch a live printer (built with --features websocket)
//! panel-replay --url ws://voron.local:7125/websocket
//!
//! # With verbose logging
//! RUST_LOG=panel_core=debug panel-replay --transcript runout.log
//! ```
//!
//! # Environment Variables
//!
//! - `PRINTPANEL_CONFIG`: Config file path
//! - `PRINTPANEL_VRES`: Display vertical resolution
//! - `PRINTPANEL_MOONRAKER_URL`: Moonraker WebSocket URL
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

mod presenter;
mod replay;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use panel_core::transport::TransportType;
use panel_core::{load_config, ConfigOverrides, PanelConfig};

use crate::replay::{Replayer, TranscriptFormat};

/// Replay printer console output through the action-prompt engine
#[derive(Parser, Debug)]
#[command(name = "panel-replay", version, about)]
struct Args {
    /// Transcript to replay, one line per console response ("-" for stdin)
    #[arg(short, long, value_name = "FILE")]
    transcript: Option<PathBuf>,

    /// Transcript lines are raw JSON-RPC frames instead of console lines
    #[arg(long)]
    jsonrpc: bool,

    /// Press this button (zero-based) whenever a prompt is shown
    #[arg(short, long, value_name = "INDEX")]
    select: Option<usize>,

    /// Config file (default: $XDG_CONFIG_HOME/printpanel/panel.toml)
    #[arg(short, long, value_name = "FILE", env = "PRINTPANEL_CONFIG")]
    config: Option<PathBuf>,

    /// Display vertical resolution used for layout
    #[arg(long, value_name = "PIXELS")]
    vres: Option<u32>,

    /// Moonraker WebSocket URL (selects the live transport)
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout carries the replay output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("panel_replay=info".parse()?)
                .add_directive("panel_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();

    let overrides = ConfigOverrides {
        vertical_resolution: args.vres,
        moonraker_url: args.url.clone(),
    };
    let (config, source) =
        load_config(args.config.as_deref(), &overrides).context("Failed to load configuration")?;
    info!(?source, vres = config.display.vertical_resolution, "Configuration loaded");

    let format = if args.jsonrpc {
        TranscriptFormat::JsonRpc
    } else {
        TranscriptFormat::Console
    };

    match (&args.transcript, config.transport.transport) {
        (Some(path), _) => replay_transcript(&config, Some(path), format, args.select).await,
        (None, TransportType::InProcess) => replay_transcript(&config, None, format, args.select).await,
        (None, TransportType::WebSocket) => live(&config, args.select).await,
    }
}

/// Replay a file, or stdin when `path` is `None` or `-`
async fn replay_transcript(
    config: &PanelConfig,
    path: Option<&PathBuf>,
    format: TranscriptFormat,
    select: Option<usize>,
) -> anyhow::Result<()> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open transcript {}", path.display()))?;
            info!(path = %path.display(), "Replaying transcript");
            Box::new(BufReader::new(file))
        }
        _ => {
            info!("Replaying transcript from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };

    let mut replayer = Replayer::new(config, format, select);
    let mut lines = reader.lines();
    let stdout = std::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read transcript")? {
        let mut out = stdout.lock();
        replayer.feed_line(&line, &mut out)?;
        out.flush()?;
    }

    let stats = replayer.stats();
    info!(
        lines = stats.lines,
        prompts = stats.prompts_shown,
        commands = stats.commands_sent,
        "Replay finished"
    );
    Ok(())
}

#[cfg(feature = "websocket")]
async fn live(config: &PanelConfig, select: Option<usize>) -> anyhow::Result<()> {
    use std::sync::Arc;

    use panel_core::transport::MoonrakerSocket;
    use panel_core::{attach_prompt_handler, CommandDispatcher, PrinterTransport, PromptAccumulator};
    use tokio::signal;

    use crate::presenter::{write_prompt, ChannelPresenter, PresenterMessage};

    let mut socket = MoonrakerSocket::connect(&config.transport.url, &config.transport.gcode_method)
        .await
        .with_context(|| format!("Failed to connect to {}", config.transport.url))?;

    let (presenter, mut presenter_rx) = ChannelPresenter::new(config.display.vertical_resolution);
    let accumulator = PromptAccumulator::new(
        Arc::new(presenter),
        CommandDispatcher::new(socket.command_sink()),
    );
    attach_prompt_handler(
        &socket.router(),
        &config.transport.notification_method,
        &accumulator,
    );

    let run = socket.run();
    tokio::pin!(run);

    loop {
        tokio::select! {
            result = &mut run => {
                result.context("Moonraker connection failed")?;
                break;
            }
            Some(message) = presenter_rx.recv() => {
                let mut out = std::io::stdout().lock();
                match message {
                    PresenterMessage::Render { snapshot, layout, on_activate, .. } => {
                        write_prompt(&mut out, &snapshot, &layout)?;
                        if let Some(index) = select {
                            writeln!(out, "    pressing [{index}]")?;
                            on_activate(index);
                        }
                    }
                    PresenterMessage::Close(_) => writeln!(out, "    (closed)")?,
                }
                out.flush()?;
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "websocket"))]
async fn live(_config: &PanelConfig, _select: Option<usize>) -> anyhow::Result<()> {
    anyhow::bail!("this build has no WebSocket transport; rebuild with --features websocket or pass --transcript")
}
