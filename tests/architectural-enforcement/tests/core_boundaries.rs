//! Integration Test: Widget Core Boundaries
//!
//! **Policy**: The widget core propagates errors instead of panicking, and
//! never depends on a UI framework. Surfaces depend on the core, not the
//! other way around.

use std::fs;

use architectural_enforcement::{code_part, production_sources, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

#[test]
fn test_no_unwrap_or_expect_in_widget_core() {
    let mut violations = Vec::new();

    for file in production_sources("widget/core/src") {
        for (idx, line) in file.lines.iter().enumerate() {
            let code = code_part(line);
            if code.contains(".unwrap()") || code.contains(".expect(") {
                violations.push(format!(
                    "{}:{} - {}",
                    file.path.display(),
                    idx + 1,
                    line.trim()
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Panicking calls in widget core production code:\n  {}",
        violations.join("\n  ")
    );
}

#[test]
fn test_widget_core_has_no_ui_dependencies() {
    let manifest = workspace_root().join("widget/core/Cargo.toml");
    let manifest = fs::read_to_string(&manifest).unwrap_or_default();

    for krate in UI_CRATES {
        let declared = manifest
            .lines()
            .map(code_part_toml)
            .any(|line| line.trim_start().starts_with(krate));
        assert!(!declared, "widget core must not depend on {krate}");
    }

    for file in production_sources("widget/core/src") {
        for line in &file.lines {
            let code = code_part(line);
            for krate in UI_CRATES {
                assert!(
                    !code.contains(&format!("{krate}::")),
                    "{} uses {krate}",
                    file.path.display()
                );
            }
        }
    }
}

#[test]
fn test_sources_are_found() {
    assert!(!production_sources("widget/core/src").is_empty());
    assert!(!production_sources("tui/src").is_empty());
}

fn code_part_toml(line: &str) -> &str {
    line.split('#').next().unwrap_or(line)
}
