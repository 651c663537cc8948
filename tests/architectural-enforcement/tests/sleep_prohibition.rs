//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep to wait for something.
//! **Exceptions**: Frame rate limiting in the TUI app loop, test code
//!
//! The typewriter driver waits on `tokio::time::interval`, which is not a
//! sleep and is always allowed.

use architectural_enforcement::{code_part, production_sources, SourceFile};

#[test]
fn test_no_sleep_in_widget_core() {
    let violations = find_sleep_violations("widget/core/src", false);
    report(&violations);
}

#[test]
fn test_tui_only_sleeps_for_frame_limiting() {
    let violations = find_sleep_violations("tui/src", true);
    report(&violations);
}

fn report(violations: &[String]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\nSleep calls found in production code:\n");
    for violation in violations {
        eprintln!("  {violation}");
    }
    eprintln!("\nAcceptable sleep uses:");
    eprintln!("  - Frame rate limiting in tui/src/app.rs");
    eprintln!("  - Test code");
    eprintln!("\nUse tokio::time::interval or wait on a channel instead.");

    panic!("Found {} sleep violation(s)", violations.len());
}

fn find_sleep_violations(dir: &str, allow_frame_limiting: bool) -> Vec<String> {
    let mut violations = Vec::new();

    for file in production_sources(dir) {
        for (idx, line) in file.lines.iter().enumerate() {
            let code = code_part(line);
            if !(code.contains("::sleep(") || code.contains(".sleep(")) {
                continue;
            }

            if allow_frame_limiting
                && file.path.ends_with("tui/src/app.rs")
                && is_frame_limiting_context(&file, idx)
            {
                continue;
            }

            violations.push(format!(
                "{}:{} - {}",
                file.path.display(),
                idx + 1,
                line.trim()
            ));
        }
    }

    violations
}

/// Check if sleep is used for frame rate limiting
fn is_frame_limiting_context(file: &SourceFile, current_idx: usize) -> bool {
    let start = current_idx.saturating_sub(10);
    let end = (current_idx + 5).min(file.lines.len());

    file.lines[start..end].iter().any(|line| {
        let line = line.to_lowercase();
        line.contains("frame") || line.contains("fps") || line.contains("rate limit")
    })
}

#[test]
fn test_frame_limiting_detection() {
    let file = SourceFile {
        path: "tui/src/app.rs".into(),
        lines: vec![
            "// Frame rate limiting".to_string(),
            "tokio::time::sleep(FRAME_DURATION - elapsed).await;".to_string(),
        ],
    };
    assert!(is_frame_limiting_context(&file, 1));

    let file = SourceFile {
        path: "tui/src/app.rs".into(),
        lines: vec!["tokio::time::sleep(Duration::from_secs(1)).await;".to_string()],
    };
    assert!(!is_frame_limiting_context(&file, 0));
}
