//! Prompt Model
//!
//! The dialog a printer macro is assembling: a header, a body, and an
//! ordered list of footer buttons, each bound to one G-code command.
//!
//! The model is owned by the [`PromptAccumulator`](crate::PromptAccumulator)
//! for the whole lifetime of the application and is only ever mutated on
//! the notification path. Surfaces see it through [`PromptSnapshot`], an
//! immutable copy taken at `prompt_show`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Generation number of a presented prompt
///
/// Minted on every `prompt_show`. Activation callbacks carry the id of the
/// prompt they were created for, so a tap on a modal that has since been
/// pre-empted can be recognized and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PromptId(u64);

impl PromptId {
    /// Create a new unique prompt ID
    #[must_use]
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw numeric value
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for PromptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prompt-{}", self.0)
    }
}

// ============================================================================
// Buttons
// ============================================================================

/// Visual emphasis requested for a footer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    /// Default emphasis
    #[default]
    Primary,
    /// Muted
    Secondary,
    /// Informational
    Info,
    /// Needs attention
    Warning,
    /// Destructive or failure path
    Error,
}

impl ButtonStyle {
    /// All styles, in protocol order
    pub const ALL: [ButtonStyle; 5] = [
        ButtonStyle::Primary,
        ButtonStyle::Secondary,
        ButtonStyle::Info,
        ButtonStyle::Warning,
        ButtonStyle::Error,
    ];

    /// Map a protocol style token to a style
    ///
    /// Matching is case-insensitive and exact; anything else (including an
    /// empty token) falls back to [`ButtonStyle::Primary`].
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|style| token.eq_ignore_ascii_case(style.as_str()))
            .unwrap_or_default()
    }

    /// Protocol token for this style
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ButtonStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One footer button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptButton {
    /// Text shown on the button
    pub label: String,
    /// G-code sent verbatim when the button is activated
    pub command: String,
    /// Visual emphasis
    pub style: ButtonStyle,
}

impl PromptButton {
    /// Create a button
    #[must_use]
    pub fn new(label: impl Into<String>, command: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
            style,
        }
    }
}

/// Decompose a `prompt_footer_button` payload
///
/// Format is `<label>|<command>[|<style>]`:
///
/// - no `|`: the whole payload is the label, command is empty
/// - one `|`: label before it, command after it
/// - two or more: label, command between the first two, style after the
///   second (unrecognized styles fall back to primary)
///
/// Never fails.
#[must_use]
pub fn parse_button_spec(raw: &str) -> PromptButton {
    let Some((label, rest)) = raw.split_once('|') else {
        return PromptButton::new(raw, "", ButtonStyle::Primary);
    };

    match rest.split_once('|') {
        Some((command, style)) => PromptButton::new(label, command, ButtonStyle::from_token(style)),
        None => PromptButton::new(label, rest, ButtonStyle::Primary),
    }
}

// ============================================================================
// Model
// ============================================================================

/// Lifecycle state of the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptState {
    /// No prompt in progress
    #[default]
    Idle,
    /// `prompt_begin` seen, collecting text and buttons
    Building,
    /// Handed to the presenter
    Shown,
}

impl fmt::Display for PromptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Shown => "shown",
        };
        f.write_str(name)
    }
}

/// Accumulated dialog state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptModel {
    /// Header from `prompt_begin`
    pub header: Option<String>,
    /// Body from the latest `prompt_text`
    pub body: Option<String>,
    /// Footer buttons in arrival order
    pub buttons: Vec<PromptButton>,
    /// Lifecycle state
    pub state: PromptState,
}

impl PromptModel {
    /// Create an empty, idle model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop header, body and buttons; state is left alone
    pub fn clear_content(&mut self) {
        self.header = None;
        self.body = None;
        self.buttons.clear();
    }

    /// Whether header, body and buttons are all absent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.body.is_none() && self.buttons.is_empty()
    }

    /// Take an immutable copy for a presenter
    #[must_use]
    pub fn snapshot(&self, id: PromptId) -> PromptSnapshot {
        PromptSnapshot {
            id,
            header: self.header.clone(),
            body: self.body.clone(),
            buttons: self.buttons.clone(),
        }
    }
}

/// Read-only copy of a prompt as handed to a presenter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSnapshot {
    /// Generation of this presentation
    pub id: PromptId,
    /// Header text
    pub header: Option<String>,
    /// Body text
    pub body: Option<String>,
    /// Footer buttons in rendering order
    pub buttons: Vec<PromptButton>,
}

impl PromptSnapshot {
    /// Header text, empty when absent
    #[must_use]
    pub fn header_text(&self) -> &str {
        self.header.as_deref().unwrap_or_default()
    }

    /// Body text, empty when absent
    #[must_use]
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Number of footer buttons
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }
}
