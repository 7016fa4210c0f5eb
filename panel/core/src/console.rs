//! Console Response Glue
//!
//! Moonraker forwards every line the firmware prints as a
//! `notify_gcode_response` notification whose single positional parameter
//! is the line. This module plugs the prompt accumulator into that stream.

use serde_json::Value;

use crate::accumulator::PromptAccumulator;
use crate::transport::NotificationRouter;

/// Notification carrying console output
pub const GCODE_RESPONSE_METHOD: &str = "notify_gcode_response";

/// Subscriber name the accumulator registers under
pub const PROMPT_SUBSCRIBER: &str = "prompt_accumulator";

/// Extract the console line from a notification's params (`params[0]`)
#[must_use]
pub fn console_line(params: &Value) -> Option<&str> {
    params.pointer("/0").and_then(Value::as_str)
}

/// Feed every console line delivered for `method` into `accumulator`
///
/// Notifications whose first parameter is missing or not a string are
/// logged and skipped.
pub fn attach_prompt_handler(
    router: &NotificationRouter,
    method: &str,
    accumulator: &PromptAccumulator,
) {
    let accumulator = accumulator.clone();
    let method_name = method.to_string();

    router.register(method, PROMPT_SUBSCRIBER, move |params| {
        match console_line(params) {
            Some(line) => {
                tracing::trace!(line, "Console response");
                accumulator.handle_line(line);
            }
            None => {
                tracing::warn!(method = %method_name, %params, "Console notification without a text line");
            }
        }
    });

    tracing::debug!(method, "Prompt handler attached");
}

/// Undo [`attach_prompt_handler`]
pub fn detach_prompt_handler(router: &NotificationRouter, method: &str) -> bool {
    router.unregister(method, PROMPT_SUBSCRIBER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::CommandDispatcher;
    use crate::presenter::HeadlessPresenter;
    use crate::prompt::PromptState;
    use crate::transport::{InProcessTransport, JsonRpcNotification, PrinterTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_console_line_reads_first_param() {
        assert_eq!(console_line(&json!(["ok", "extra"])), Some("ok"));
        assert_eq!(console_line(&json!([])), None);
        assert_eq!(console_line(&json!([42])), None);
        assert_eq!(console_line(&json!({"line": "ok"})), None);
        assert_eq!(console_line(&Value::Null), None);
    }

    #[test]
    fn test_notifications_drive_accumulator() {
        let (mut transport, notify_tx, _command_rx) = InProcessTransport::new_pair();
        let presenter = Arc::new(HeadlessPresenter::new(480));
        let accumulator =
            PromptAccumulator::new(presenter.clone(), CommandDispatcher::new(transport.command_sink()));
        let router = transport.router();
        attach_prompt_handler(&router, GCODE_RESPONSE_METHOD, &accumulator);

        for line in [
            "// action:prompt_begin Hello",
            "// action:prompt_footer_button Ok|OK",
            "// action:prompt_show",
        ] {
            notify_tx
                .try_send(JsonRpcNotification::new(GCODE_RESPONSE_METHOD, json!([line])))
                .unwrap();
        }
        // Malformed payloads are skipped without disturbing the prompt
        notify_tx
            .try_send(JsonRpcNotification::new(GCODE_RESPONSE_METHOD, json!({})))
            .unwrap();

        assert_eq!(transport.process_pending(), 4);
        assert_eq!(accumulator.state(), PromptState::Shown);
        assert_eq!(presenter.open_prompt().unwrap().header_text(), "Hello");
    }

    #[test]
    fn test_detach() {
        let router = NotificationRouter::new();
        let presenter = Arc::new(HeadlessPresenter::new(480));
        let (transport, _tx, _rx) = InProcessTransport::new_pair();
        let accumulator = PromptAccumulator::new(presenter, CommandDispatcher::new(transport.command_sink()));

        attach_prompt_handler(&router, GCODE_RESPONSE_METHOD, &accumulator);
        assert_eq!(router.subscriber_count(GCODE_RESPONSE_METHOD), 1);
        assert!(detach_prompt_handler(&router, GCODE_RESPONSE_METHOD));
        assert_eq!(router.subscriber_count(GCODE_RESPONSE_METHOD), 0);
    }
}
