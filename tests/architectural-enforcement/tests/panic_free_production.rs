//! Integration Test: No Panicking Shortcuts
//!
//! **Policy**: Production code propagates errors with `?` or handles them.
//! `.unwrap()`, `.expect(..)`, and `panic!` belong in tests only.
//! **Also**: No `std::thread::sleep` on async paths; use
//! `tokio::time::sleep`.

use architectural_enforcement::{report, scan};

const PRODUCTION: &[&str] = &["panel/core/src", "panel/replay/src", "tui/src"];

#[test]
fn test_no_unwrap_or_expect_in_production_code() {
    let violations = scan(PRODUCTION, "Panicking unwrap", |code| {
        code.contains(".unwrap()") || code.contains(".expect(")
    });

    report("unwrap/expect in production code", &violations);
}

#[test]
fn test_no_panic_in_production_code() {
    let violations = scan(PRODUCTION, "Explicit panic", |code| {
        code.contains("panic!(") || code.contains("unreachable!(") || code.contains("todo!(")
    });

    report("panic in production code", &violations);
}

#[test]
fn test_no_blocking_sleep() {
    let violations = scan(PRODUCTION, "Blocking sleep", |code| {
        code.contains("thread::sleep")
    });

    report("std::thread::sleep in production code", &violations);
}
