//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The prompt engine stays headless (no terminal or CLI crates in core)
//! - Production code propagates errors instead of panicking
//! - Core logs through `tracing`, never to stdout/stderr
//!
//! The helpers here walk the workspace sources and hand each test the
//! production lines of every file: comments stripped, `#[cfg(test)]`
//! modules cut off.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    assert!(root.is_dir(), "source directory {} is missing", root.display());

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// A line of production code
pub struct SourceLine {
    /// 1-based line number
    pub number: usize,
    /// The line with any `//` comment removed
    pub code: String,
}

/// Production lines of `path`
///
/// Stops at the first `#[cfg(test)]`; test modules live at the bottom of
/// each file in this workspace.
pub fn production_lines(path: &Path) -> Vec<SourceLine> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| SourceLine {
            number: idx + 1,
            code: strip_comment(line).to_string(),
        })
        .collect()
}

/// Everything before a `//` that is not inside a string literal
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    let bytes = line.as_bytes();

    for (idx, &byte) in bytes.iter().enumerate() {
        match byte {
            _ if escaped => escaped = false,
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(idx + 1) == Some(&b'/') => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// Collect `path:line - what: code` for each production line matching `rule`
pub fn scan(dirs: &[&str], what: &str, rule: impl Fn(&str) -> bool) -> Vec<String> {
    let mut violations = Vec::new();
    for dir in dirs {
        for path in rust_files(dir) {
            for line in production_lines(&path) {
                if rule(&line.code) {
                    violations.push(format!(
                        "{}:{} - {}: {}",
                        path.display(),
                        line.number,
                        what,
                        line.code.trim()
                    ));
                }
            }
        }
    }
    violations
}

/// Fail the test with every violation listed
pub fn report(title: &str, violations: &[String]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!("\nFound {} violation(s). Fix these before merging!", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("let a = 1; // note"), "let a = 1; ");
        assert_eq!(strip_comment("//! doc"), "");
        assert_eq!(
            strip_comment(r#"let url = "ws://host"; // x"#),
            r#"let url = "ws://host"; "#
        );
        assert_eq!(strip_comment(r#"let s = "a\"//b";"#), r#"let s = "a\"//b";"#);
    }

    #[test]
    fn test_workspace_root_has_members() {
        assert!(workspace_root().join("panel/core/src/lib.rs").is_file());
    }
}
