use std::time::Duration;

use launch_ready::scanner::model::{Finding, PhaseResult};
use launch_ready::trace::logger::TraceLogger;
use launch_ready::trace::trace::TraceEvent;

fn temp_path(name: &str) -> String {
    let path = std::env::temp_dir().join(format!("launch_ready_{}_{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path.to_string_lossy().into_owned()
}

fn sample_phase() -> PhaseResult {
    PhaseResult::new(
        "Security",
        55,
        vec![
            Finding::success("Served over HTTPS"),
            Finding::warning("Content-Security-Policy missing"),
            Finding::warning("Referrer-Policy missing"),
            Finding::error("Something broke"),
        ],
        vec![],
    )
}

#[test]
fn trace_event_counts_findings() {
    let event = TraceEvent::for_phase("https://acme.dev", &sample_phase(), Duration::from_millis(250));
    assert_eq!(event.phase, "Security");
    assert_eq!(event.score, 55);
    assert_eq!(event.max_score, 100);
    assert_eq!(event.duration_ms, 250);
    assert_eq!((event.successes, event.warnings, event.errors), (1, 2, 1));
    assert!(!event.timed_out);
    assert!(event.snapshot_fingerprint.is_none());
}

#[test]
fn trace_event_builders() {
    let event = TraceEvent::for_phase("https://acme.dev", &sample_phase(), Duration::ZERO)
        .with_timeout()
        .with_fingerprint("abc123");
    assert!(event.timed_out);
    assert_eq!(event.snapshot_fingerprint.as_deref(), Some("abc123"));
}

#[test]
fn trace_logger_appends_json_lines() {
    let path = temp_path("trace_append.jsonl");
    let logger = TraceLogger::new(&path);
    assert!(logger.is_enabled());

    let event = TraceEvent::for_phase("https://acme.dev", &sample_phase(), Duration::from_millis(5));
    logger.log(&event);
    logger.log(&event.with_timeout());

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["url"], "https://acme.dev");
    assert_eq!(lines[0]["timed_out"], false);
    assert_eq!(lines[1]["timed_out"], true);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn trace_logger_with_bad_path_is_disabled() {
    let logger = TraceLogger::new("/nonexistent/dir/trace.jsonl");
    assert!(!logger.is_enabled());

    // Logging to a disabled tracer is a no-op
    let event = TraceEvent::for_phase("https://acme.dev", &sample_phase(), Duration::ZERO);
    logger.log(&event);
}
