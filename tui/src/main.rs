//! Panel TUI Entry Point
//!
//! Terminal surface for printer action prompts.
//!
//! Usage:
//!   panel-tui --transcript runout.log [--delay-ms 150]
//!   panel-tui --url ws://voron.local:7125/websocket   (built with --features websocket)
//!
//! Options:
//!   --transcript <FILE>  Console lines to play through an in-process transport
//!                        (wins over a WebSocket transport in the config)
//!   --delay-ms <MS>      Pause between transcript lines (default: 150)
//!   --config <FILE>      Config file (env: PRINTPANEL_CONFIG)
//!   --url <URL>          Moonraker WebSocket URL (selects the live transport)
//!   --log-file <FILE>    Write logs here; the terminal is busy drawing

use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use panel_core::transport::JsonRpcNotification;
use panel_core::{
    attach_prompt_handler, console_line, load_config, CommandDispatcher, CommandSink,
    ConfigOverrides, InProcessTransport, NotificationRouter, PanelConfig, PrinterTransport,
    PromptAccumulator,
};
use panel_tui::{feed_source, App, AppEvent, EchoSink, FeedSource, TuiPresenter};

/// Subscriber name for the console pane feed
const CONSOLE_SUBSCRIBER: &str = "console_log";

/// Terminal surface for printer action prompts
#[derive(Parser, Debug)]
#[command(name = "panel-tui", version, about)]
struct Args {
    /// Console transcript to play through an in-process transport
    #[arg(short, long, value_name = "FILE")]
    transcript: Option<PathBuf>,

    /// Pause between transcript lines
    #[arg(long, value_name = "MS", default_value_t = 150)]
    delay_ms: u64,

    /// Config file (default: $XDG_CONFIG_HOME/printpanel/panel.toml)
    #[arg(short, long, value_name = "FILE", env = "PRINTPANEL_CONFIG")]
    config: Option<PathBuf>,

    /// Moonraker WebSocket URL (selects the live transport)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Log file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("panel-tui requires a terminal (TTY); use panel-replay for pipes");
        std::process::exit(1);
    }

    let overrides = ConfigOverrides {
        vertical_resolution: None,
        moonraker_url: args.url.clone(),
    };
    let (config, source) =
        load_config(args.config.as_deref(), &overrides).context("Failed to load configuration")?;
    tracing::info!(?source, transport = ?config.transport.transport, "Starting panel TUI");

    let presenter = TuiPresenter::new();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let feed = feed_source(config.transport.transport, args.transcript.as_deref())
        .context("nothing to show: pass --transcript, or --url for a live printer")?;
    let accumulator = match feed {
        FeedSource::Transcript(path) => {
            let delay = Duration::from_millis(args.delay_ms);
            start_replay(&config, path, delay, &presenter, events_tx).await?
        }
        FeedSource::Live => start_live(&config, &presenter, events_tx).await?,
    };

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(presenter, accumulator, events_rx);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    // Without a log file there is nowhere to write that won't tear the screen
    let Some(path) = path else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("panel_tui=info".parse()?)
                .add_directive("panel_core=info".parse()?),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Build the accumulator on top of a transport and feed the console pane
fn wire(
    router: &NotificationRouter,
    sink: Arc<dyn CommandSink>,
    config: &PanelConfig,
    presenter: &TuiPresenter,
    events: mpsc::UnboundedSender<AppEvent>,
) -> PromptAccumulator {
    let method = &config.transport.notification_method;
    let dispatcher = CommandDispatcher::new(Arc::new(EchoSink::new(sink, events.clone())));
    let accumulator = PromptAccumulator::new(Arc::new(presenter.clone()), dispatcher);

    attach_prompt_handler(router, method, &accumulator);
    router.register(method, CONSOLE_SUBSCRIBER, move |params| {
        if let Some(line) = console_line(params) {
            let _ = events.send(AppEvent::Console(line.to_string()));
        }
    });

    accumulator
}

/// Play a transcript through an in-process transport
async fn start_replay(
    config: &PanelConfig,
    path: &Path,
    delay: Duration,
    presenter: &TuiPresenter,
    events: mpsc::UnboundedSender<AppEvent>,
) -> anyhow::Result<PromptAccumulator> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open transcript {}", path.display()))?;

    let (mut transport, notify_tx, mut command_rx) =
        InProcessTransport::new_pair_with_capacity(config.transport.channel_capacity);
    let accumulator = wire(
        &transport.router(),
        transport.command_sink(),
        config,
        presenter,
        events.clone(),
    );

    // Printer side of the pair
    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            tracing::info!(%command, "Printer received command");
        }
    });

    let method = config.transport.notification_method.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(file).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let notification = JsonRpcNotification::new(method.as_str(), json!([line]));
                    if notify_tx.send(notification).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(delay).await;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Transcript read failed: {}", e);
                    break;
                }
            }
        }
        tracing::info!("Transcript finished");
        // Stay connected so the last prompt can still be answered
        notify_tx.closed().await;
    });

    tokio::spawn(async move {
        if let Err(e) = transport.run().await {
            tracing::warn!("Transport stopped: {}", e);
        }
        let _ = events.send(AppEvent::Disconnected);
    });

    Ok(accumulator)
}

#[cfg(feature = "websocket")]
async fn start_live(
    config: &PanelConfig,
    presenter: &TuiPresenter,
    events: mpsc::UnboundedSender<AppEvent>,
) -> anyhow::Result<PromptAccumulator> {
    use panel_core::transport::MoonrakerSocket;

    let mut socket = MoonrakerSocket::connect(&config.transport.url, &config.transport.gcode_method)
        .await
        .with_context(|| format!("Failed to connect to {}", config.transport.url))?;

    let accumulator = wire(
        &socket.router(),
        socket.command_sink(),
        config,
        presenter,
        events.clone(),
    );

    tokio::spawn(async move {
        if let Err(e) = socket.run().await {
            tracing::warn!("Moonraker connection failed: {}", e);
        }
        let _ = events.send(AppEvent::Disconnected);
    });

    Ok(accumulator)
}

#[cfg(not(feature = "websocket"))]
async fn start_live(
    _config: &PanelConfig,
    _presenter: &TuiPresenter,
    _events: mpsc::UnboundedSender<AppEvent>,
) -> anyhow::Result<PromptAccumulator> {
    anyhow::bail!("this build has no WebSocket transport; rebuild with --features websocket or pass --transcript")
}
