//! Action Comment Extraction
//!
//! Printer macros request interactive dialogs by writing console lines that
//! start with the `// action:` marker. The extractor classifies a single
//! console line into one of the prompt sub-commands without interpreting
//! its payload; button specs are decomposed later by the accumulator.
//!
//! ```text
//! // action:prompt_footer_button Resume|RESUME|warning
//! └──marker──┘└──────token──────┘ └──────payload─────┘
//! ```
//!
//! The marker must match exactly, including case and spacing. The token
//! ends at the first whitespace character, and exactly that one separator
//! is consumed, so the payload is everything after it verbatim.

/// Prefix that identifies an action comment in the console stream
pub const ACTION_MARKER: &str = "// action:";

/// A classified console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionComment {
    /// Ordinary console output, not part of the prompt protocol
    NoAction,

    /// `prompt_begin <header>`: start a new prompt
    Begin(String),

    /// `prompt_text <body>`: set the body text
    Text(String),

    /// `prompt_footer_button <label>|<command>[|<style>]`, undecomposed
    ButtonSpec(String),

    /// `prompt_show`: present the accumulated prompt
    Show,

    /// `prompt_end`: tear the prompt down
    End,

    /// Marker present but the sub-command is not one we handle
    UnknownAction(String),
}

impl ActionComment {
    /// Whether this line belongs to the prompt protocol at all
    #[must_use]
    pub fn is_action(&self) -> bool {
        !matches!(self, Self::NoAction)
    }

    /// Sub-command name, for logging
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NoAction => "none",
            Self::Begin(_) => "prompt_begin",
            Self::Text(_) => "prompt_text",
            Self::ButtonSpec(_) => "prompt_footer_button",
            Self::Show => "prompt_show",
            Self::End => "prompt_end",
            Self::UnknownAction(name) => name,
        }
    }
}

/// Classifies console lines into [`ActionComment`]s
///
/// Stateless; every line is classified on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionCommentExtractor;

impl ActionCommentExtractor {
    /// Create a new extractor
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify one console line
    ///
    /// Trailing line terminators are ignored. Lines without the marker
    /// (including empty lines) yield [`ActionComment::NoAction`].
    #[must_use]
    pub fn classify(&self, line: &str) -> ActionComment {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(rest) = line.strip_prefix(ACTION_MARKER) else {
            return ActionComment::NoAction;
        };

        let (token, payload) = match rest.find(char::is_whitespace) {
            Some(pos) => {
                let separator_len = rest[pos..].chars().next().map_or(1, char::len_utf8);
                (&rest[..pos], &rest[pos + separator_len..])
            }
            None => (rest, ""),
        };

        match token {
            "prompt_begin" => ActionComment::Begin(payload.to_string()),
            "prompt_text" => ActionComment::Text(payload.to_string()),
            "prompt_footer_button" => ActionComment::ButtonSpec(payload.to_string()),
            "prompt_show" => ActionComment::Show,
            "prompt_end" => ActionComment::End,
            other => ActionComment::UnknownAction(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> ActionComment {
        ActionCommentExtractor::new().classify(line)
    }

    #[test]
    fn test_plain_console_output_is_not_an_action() {
        assert_eq!(classify("ok"), ActionComment::NoAction);
        assert_eq!(classify(""), ActionComment::NoAction);
        assert_eq!(classify("echo: // action:prompt_show"), ActionComment::NoAction);
    }

    #[test]
    fn test_marker_must_match_exactly() {
        assert_eq!(classify("//action:prompt_show"), ActionComment::NoAction);
        assert_eq!(classify("// Action:prompt_show"), ActionComment::NoAction);
        assert_eq!(classify("// action: prompt_show"), ActionComment::UnknownAction(String::new()));
        assert_eq!(classify(" // action:prompt_show"), ActionComment::NoAction);
    }

    #[test]
    fn test_begin_carries_header() {
        assert_eq!(
            classify("// action:prompt_begin Filament runout"),
            ActionComment::Begin("Filament runout".to_string())
        );
    }

    #[test]
    fn test_text_carries_body() {
        assert_eq!(
            classify("// action:prompt_text Load new filament and press Resume"),
            ActionComment::Text("Load new filament and press Resume".to_string())
        );
    }

    #[test]
    fn test_button_payload_is_left_undecomposed() {
        assert_eq!(
            classify("// action:prompt_footer_button Continue|RESUME|warning"),
            ActionComment::ButtonSpec("Continue|RESUME|warning".to_string())
        );
    }

    #[test]
    fn test_show_and_end() {
        assert_eq!(classify("// action:prompt_show"), ActionComment::Show);
        assert_eq!(classify("// action:prompt_end"), ActionComment::End);
    }

    #[test]
    fn test_only_one_separator_is_consumed() {
        assert_eq!(
            classify("// action:prompt_begin  Two spaces"),
            ActionComment::Begin(" Two spaces".to_string())
        );
        assert_eq!(
            classify("// action:prompt_text\tTabbed"),
            ActionComment::Text("Tabbed".to_string())
        );
    }

    #[test]
    fn test_missing_payload_is_empty() {
        assert_eq!(classify("// action:prompt_begin"), ActionComment::Begin(String::new()));
        assert_eq!(classify("// action:prompt_text"), ActionComment::Text(String::new()));
    }

    #[test]
    fn test_line_terminators_are_stripped() {
        assert_eq!(classify("// action:prompt_show\r\n"), ActionComment::Show);
        assert_eq!(
            classify("// action:prompt_begin Header\n"),
            ActionComment::Begin("Header".to_string())
        );
    }

    #[test]
    fn test_unknown_sub_command() {
        let comment = classify("// action:notification Heating done");
        assert_eq!(comment, ActionComment::UnknownAction("notification".to_string()));
        assert!(comment.is_action());
        assert_eq!(comment.name(), "notification");
    }

    #[test]
    fn test_sub_command_is_case_sensitive() {
        assert_eq!(
            classify("// action:PROMPT_SHOW"),
            ActionComment::UnknownAction("PROMPT_SHOW".to_string())
        );
    }

    #[test]
    fn test_show_ignores_trailing_payload() {
        assert_eq!(classify("// action:prompt_show now"), ActionComment::Show);
    }
}
