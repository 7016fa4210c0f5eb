//! Integration Test: Headless Core
//!
//! **Policy**: `panel/core` is the prompt engine and nothing else. It must
//! not reach for terminal, CLI, or logging-backend crates; surfaces own
//! those.
//! **Required**: Presentation goes through `PromptPresenter`, logging
//! through `tracing` macros.

use architectural_enforcement::{report, scan};

const CORE: &[&str] = &["panel/core/src"];

const SURFACE_CRATES: &[&str] = &[
    "ratatui",
    "crossterm",
    "clap",
    "tracing_subscriber",
    "anyhow",
];

#[test]
fn test_core_does_not_use_surface_crates() {
    let violations = scan(CORE, "Surface crate in core", |code| {
        SURFACE_CRATES
            .iter()
            .any(|krate| code.contains(&format!("{krate}::")))
    });

    report("Prompt engine depends on a surface crate", &violations);
}

#[test]
fn test_core_does_not_print() {
    let violations = scan(CORE, "Direct output in core", |code| {
        ["println!", "eprintln!", "print!(", "eprint!(", "dbg!("]
            .iter()
            .any(|mac| code.contains(mac))
    });

    report("Prompt engine writes to stdout/stderr; use tracing", &violations);
}
