//! Integration Tests for the Prompt Flow
//!
//! Drive the whole subsystem the way a printer host would: JSON-RPC
//! notifications in, G-code commands out.
//!
//! # Test Coverage
//!
//! 1. **Happy path**: begin, text, buttons, show, press, end
//! 2. **Pre-emption**: a new prompt replaces one that was never answered
//! 3. **Hostile input**: truncated, interleaved, and out-of-order lines
//! 4. **Transport failure**: a dead connection does not disturb the prompt
//! 5. **Cross-thread handoff**: feeding and pressing from two threads

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

use panel_core::{
    attach_prompt_handler, ButtonStyle, CommandDispatcher, CommandSink, HeadlessPresenter,
    InProcessTransport, PrinterTransport, PromptAccumulator, PromptButton, PromptState,
    TransportError, GCODE_RESPONSE_METHOD,
};
use panel_core::transport::JsonRpcNotification;

// ============================================================================
// Test Host
// ============================================================================

/// Plays the printer host side of an in-process transport
struct TestHost {
    transport: InProcessTransport,
    notify_tx: mpsc::Sender<JsonRpcNotification>,
    command_rx: mpsc::Receiver<String>,
    presenter: Arc<HeadlessPresenter>,
    accumulator: PromptAccumulator,
}

impl TestHost {
    fn new() -> Self {
        let (transport, notify_tx, command_rx) = InProcessTransport::new_pair();
        let presenter = Arc::new(HeadlessPresenter::new(480));
        let accumulator = PromptAccumulator::new(
            presenter.clone(),
            CommandDispatcher::new(transport.command_sink()),
        );
        attach_prompt_handler(&transport.router(), GCODE_RESPONSE_METHOD, &accumulator);

        Self {
            transport,
            notify_tx,
            command_rx,
            presenter,
            accumulator,
        }
    }

    /// Emit console lines and let the transport route them
    async fn emit(&mut self, lines: &[&str]) {
        for line in lines {
            self.notify_tx
                .send(JsonRpcNotification::new(GCODE_RESPONSE_METHOD, json!([line])))
                .await
                .unwrap();
        }
        self.transport.process_pending();
    }

    fn commands(&mut self) -> Vec<String> {
        let mut commands = Vec::new();
        while let Ok(command) = self.command_rx.try_recv() {
            commands.push(command);
        }
        commands
    }
}

const PAUSE_PROMPT: &[&str] = &[
    "// action:prompt_begin Print paused",
    "// action:prompt_text Nozzle clog detected. Clean it, then choose.",
    "// action:prompt_footer_button Resume|RESUME",
    "// action:prompt_footer_button Purge|PURGE_LINE LENGTH=50|info",
    "// action:prompt_footer_button Abort|CANCEL_PRINT|ERROR",
    "// action:prompt_show",
];

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_prompt_round_trip() {
    let mut host = TestHost::new();
    host.emit(PAUSE_PROMPT).await;

    let shown = host.presenter.open_prompt().expect("prompt should be open");
    assert_eq!(shown.header_text(), "Print paused");
    assert_eq!(
        shown.body_text(),
        "Nozzle clog detected. Clean it, then choose."
    );
    assert_eq!(
        shown.buttons,
        vec![
            PromptButton::new("Resume", "RESUME", ButtonStyle::Primary),
            PromptButton::new("Purge", "PURGE_LINE LENGTH=50", ButtonStyle::Info),
            PromptButton::new("Abort", "CANCEL_PRINT", ButtonStyle::Error),
        ]
    );

    // 100 / 3 = 33 at the reference resolution
    assert_eq!(
        host.presenter.last_layout().unwrap().button_row_height_px(),
        33
    );

    assert!(host.presenter.press(1));
    assert_eq!(host.commands(), vec!["PURGE_LINE LENGTH=50".to_string()]);
    assert!(!host.presenter.is_open());
    assert_eq!(host.accumulator.state(), PromptState::Shown);

    host.emit(&["// action:prompt_end"]).await;
    assert_eq!(host.accumulator.state(), PromptState::Idle);
    assert!(host.accumulator.snapshot().is_empty());
}

#[tokio::test]
async fn test_transport_run_loop_delivers_in_order() {
    let (mut transport, notify_tx, mut command_rx) = InProcessTransport::new_pair();
    let presenter = Arc::new(HeadlessPresenter::new(600));
    let accumulator = PromptAccumulator::new(
        presenter.clone(),
        CommandDispatcher::new(transport.command_sink()),
    );
    attach_prompt_handler(&transport.router(), GCODE_RESPONSE_METHOD, &accumulator);

    let pump = tokio::spawn(async move { transport.run().await });

    for line in [
        "// action:prompt_begin Bed mesh",
        "// action:prompt_footer_button Calibrate|BED_MESH_CALIBRATE",
        "// action:prompt_show",
    ] {
        notify_tx
            .send(JsonRpcNotification::new(GCODE_RESPONSE_METHOD, json!([line])))
            .await
            .unwrap();
    }
    timeout(Duration::from_secs(1), async {
        while !presenter.is_open() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("prompt should be shown");

    assert!(presenter.press(0));
    let command = timeout(Duration::from_secs(1), command_rx.recv())
        .await
        .unwrap();
    assert_eq!(command.as_deref(), Some("BED_MESH_CALIBRATE"));

    drop(notify_tx);
    timeout(Duration::from_secs(1), pump)
        .await
        .expect("pump should finish")
        .expect("pump task should not panic")
        .expect("in-process run should succeed");
}

// ============================================================================
// Pre-emption
// ============================================================================

#[tokio::test]
async fn test_new_prompt_preempts_unanswered_one() {
    let mut host = TestHost::new();
    host.emit(PAUSE_PROMPT).await;
    let first = host.accumulator.current_prompt().unwrap();

    host.emit(&[
        "// action:prompt_begin Runout",
        "// action:prompt_footer_button Continue|RESUME|warning",
        "// action:prompt_show",
    ])
    .await;

    let second = host.accumulator.current_prompt().unwrap();
    assert_ne!(first, second);
    assert_eq!(host.presenter.render_count(), 2);

    let shown = host.presenter.open_prompt().unwrap();
    assert_eq!(shown.id, second);
    assert_eq!(shown.body, None);
    assert_eq!(
        shown.buttons,
        vec![PromptButton::new("Continue", "RESUME", ButtonStyle::Warning)]
    );
}

// ============================================================================
// Hostile Input
// ============================================================================

#[tokio::test]
async fn test_hostile_sequences_never_panic() {
    let mut host = TestHost::new();
    host.emit(&[
        "// action:prompt_show",
        "// action:prompt_footer_button Orphan|ORPHAN",
        "// action:prompt_end",
        "// action:",
        "// action:prompt_begin",
        "// action:prompt_footer_button",
        "// action:prompt_footer_button ||",
        "// action:prompt_footer_button |||||",
        "echo: unrelated output",
        "// action:prompt_show",
        "// action:prompt_show",
        "// action:prompt_text late text",
        "// action:prompt_footer_button Late|LATE",
    ])
    .await;

    assert_eq!(host.accumulator.state(), PromptState::Shown);
    let shown = host.presenter.open_prompt().unwrap();
    assert_eq!(shown.header_text(), "");
    assert_eq!(shown.body, None);
    assert_eq!(shown.button_count(), 3);
    assert!(shown.buttons.iter().all(|b| b.style == ButtonStyle::Primary));

    assert!(host.presenter.press(0));
    // "" label, "" command: still sent verbatim
    assert_eq!(host.commands(), vec![String::new()]);
}

#[tokio::test]
async fn test_non_string_params_are_skipped() {
    let mut host = TestHost::new();
    for params in [json!(null), json!([]), json!([17]), json!({"0": "x"})] {
        host.notify_tx
            .send(JsonRpcNotification::new(GCODE_RESPONSE_METHOD, params))
            .await
            .unwrap();
    }
    host.emit(PAUSE_PROMPT).await;

    assert_eq!(host.accumulator.state(), PromptState::Shown);
    assert_eq!(host.presenter.render_count(), 1);
}

// ============================================================================
// Transport Failure
// ============================================================================

#[tokio::test]
async fn test_dead_connection_does_not_disturb_prompt() {
    let mut host = TestHost::new();
    host.emit(PAUSE_PROMPT).await;

    host.transport.disconnect();
    assert!(host.presenter.press(0));

    // Dispatch failed and was swallowed; the modal is still gone
    assert!(host.commands().is_empty());
    assert!(!host.presenter.is_open());
    assert_eq!(host.accumulator.state(), PromptState::Shown);
}

// ============================================================================
// Cross-thread Handoff
// ============================================================================

/// Sink that records every command it is handed
#[derive(Default)]
struct RecordingSink {
    sent: parking_lot::Mutex<Vec<String>>,
}

impl CommandSink for RecordingSink {
    fn send_command(&self, command: &str) -> Result<(), TransportError> {
        self.sent.lock().push(command.to_string());
        Ok(())
    }
}

#[test]
fn test_concurrent_feed_and_press_dispatch_each_prompt_at_most_once() {
    const PROMPTS: usize = 2_000;

    let presenter = Arc::new(HeadlessPresenter::new(480));
    let sink = Arc::new(RecordingSink::default());
    let accumulator = PromptAccumulator::new(presenter.clone(), CommandDispatcher::new(sink.clone()));
    let feeding = Arc::new(AtomicBool::new(true));
    let (done_tx, done_rx) = std::sync::mpsc::channel();

    let feeder = {
        let accumulator = accumulator.clone();
        let feeding = feeding.clone();
        let done_tx = done_tx.clone();
        thread::spawn(move || {
            for i in 0..PROMPTS {
                accumulator.handle_line(&format!("// action:prompt_begin Prompt {i}"));
                accumulator.handle_line(&format!("// action:prompt_footer_button Go|CMD_{i}"));
                accumulator.handle_line("// action:prompt_show");
                accumulator.handle_line("// action:prompt_end");
            }
            feeding.store(false, Ordering::SeqCst);
            done_tx.send("feeder").unwrap();
        })
    };

    let presser = {
        let presenter = presenter.clone();
        let feeding = feeding.clone();
        thread::spawn(move || {
            let mut presses = 0usize;
            while feeding.load(Ordering::SeqCst) {
                if presenter.press(0) {
                    presses += 1;
                }
            }
            done_tx.send("presser").unwrap();
            presses
        })
    };

    // A deadlock shows up as a timeout here instead of a hung test run
    for _ in 0..2 {
        done_rx
            .recv_timeout(Duration::from_secs(30))
            .expect("feeder and presser should finish");
    }
    feeder.join().unwrap();
    presser.join().unwrap();

    let sent = sink.sent.lock().clone();
    let unique: HashSet<&String> = sent.iter().collect();
    assert_eq!(unique.len(), sent.len(), "a prompt was dispatched twice");
    assert!(sent.iter().all(|c| c.starts_with("CMD_")));
    assert_eq!(presenter.render_count(), PROMPTS);
    assert_eq!(accumulator.state(), PromptState::Idle);
    assert!(!presenter.is_open());
}
