//! Main Application
//!
//! The App is a thin terminal surface over the prompt engine:
//! - Event loop (keyboard, resize)
//! - Console pane fed by the notification stream
//! - Prompt modal drawn from the shared `TuiPresenter`
//!
//! # Data Flow
//!
//! ```text
//! transport ──▶ NotificationRouter ──▶ PromptAccumulator ──▶ TuiPresenter
//!                      │                        ▲                  │
//!                      ▼                        │ activation       │ view()
//!                 AppEvent::Console             └──── App ◀────────┘
//!                                                      │
//!                                               key presses
//! ```
//!
//! The accumulator owns the prompt; the App only reads the modal view and
//! forwards key presses. Commands the engine sends arrive back as
//! `AppEvent::Command` so the operator sees them in the console pane.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;

use panel_core::PromptAccumulator;

use crate::presenter::TuiPresenter;
use crate::theme::{CONSOLE_COMMAND, CONSOLE_TEXT, STATUS_BAR};
use crate::widgets::PromptModal;

/// Console lines kept for the scrollback pane
pub const CONSOLE_HISTORY: usize = 200;

/// Frame tick
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Something the App should show that did not come from the keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A console line from the printer
    Console(String),
    /// A command the engine sent to the printer
    Command(String),
    /// The printer connection ended
    Disconnected,
}

/// One line of the console pane
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleEntry {
    Response(String),
    Command(String),
    Notice(String),
}

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Modal slot shared with the accumulator
    presenter: TuiPresenter,
    /// Prompt engine, read for the status bar
    accumulator: PromptAccumulator,
    /// Console scrollback, oldest first
    console: VecDeque<ConsoleEntry>,
    /// Lines and commands from the transport side
    events: mpsc::UnboundedReceiver<AppEvent>,
    /// Whether the printer connection is still up
    connected: bool,
}

impl App {
    /// Create a new App instance
    pub fn new(
        presenter: TuiPresenter,
        accumulator: PromptAccumulator,
        events: mpsc::UnboundedReceiver<AppEvent>,
    ) -> Self {
        Self {
            running: true,
            presenter,
            accumulator,
            console: VecDeque::with_capacity(CONSOLE_HISTORY),
            events,
            connected: true,
        }
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events first so keys stay responsive
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("Terminal event error: {}", e);
                        }
                        None => self.running = false,
                    }
                }

                _ = tokio::time::sleep(FRAME_INTERVAL) => {}
            }

            self.drain_events();
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    /// Apply every queued transport event
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        let entry = match event {
            AppEvent::Console(line) => ConsoleEntry::Response(line),
            AppEvent::Command(command) => ConsoleEntry::Command(command),
            AppEvent::Disconnected => {
                if !self.connected {
                    return;
                }
                self.connected = false;
                ConsoleEntry::Notice("printer disconnected".to_string())
            }
        };

        if self.console.len() == CONSOLE_HISTORY {
            self.console.pop_front();
        }
        self.console.push_back(entry);
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        if self.presenter.is_open() {
            match key.code {
                KeyCode::Left | KeyCode::BackTab => self.presenter.focus_prev(),
                KeyCode::Right | KeyCode::Tab => self.presenter.focus_next(),
                KeyCode::Enter => {
                    self.presenter.activate_focused();
                }
                KeyCode::Char(c @ '1'..='9') => {
                    // '1' is the first button
                    let index = c as usize - '1' as usize;
                    self.presenter.activate(index);
                }
                KeyCode::Esc => {
                    self.presenter.dismiss();
                }
                _ => {}
            }
            return;
        }

        if key.code == KeyCode::Char('q') {
            self.running = false;
        }
    }

    /// Draw one frame
    pub fn draw(&self, frame: &mut Frame) {
        let [console_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

        self.draw_console(frame, console_area);
        self.draw_status(frame, status_area);

        if let Some(view) = self.presenter.view() {
            frame.render_widget(PromptModal::new(&view), frame.area());
        }
    }

    fn draw_console(&self, frame: &mut Frame, area: Rect) {
        let visible = usize::from(area.height);
        let skip = self.console.len().saturating_sub(visible);

        let lines: Vec<Line> = self
            .console
            .iter()
            .skip(skip)
            .map(|entry| match entry {
                ConsoleEntry::Response(line) => {
                    Line::from(Span::styled(line.as_str(), Style::default().fg(CONSOLE_TEXT)))
                }
                ConsoleEntry::Command(command) => Line::from(Span::styled(
                    format!(">>> {command}"),
                    Style::default().fg(CONSOLE_COMMAND),
                )),
                ConsoleEntry::Notice(text) => {
                    Line::from(Span::styled(format!("-- {text} --"), Style::default().fg(STATUS_BAR)))
                }
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.presenter.is_open() {
            "←/→ select | Enter press | 1-9 pick | Esc hide"
        } else {
            "q quit"
        };
        let link = if self.connected { "online" } else { "offline" };
        // Hints first: narrow terminals lose the state segments, not the keys
        let status = format!(" {} | {} | {}", hints, self.accumulator.state(), link);

        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(STATUS_BAR)),
            area,
        );
    }
}
