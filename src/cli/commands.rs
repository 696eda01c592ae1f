use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::browser::fetcher::BrowserlessFetcher;
use crate::cli::config::{LoggingConfig, ScanSettings};
use crate::llm::inference::{OpenAiBackend, TextInference};
use crate::net::http::ReqwestWebClient;
use crate::net::pagespeed::{GooglePageSpeed, PageSpeedApi};
use crate::phases::{Phase, ScanServices};
use crate::report::render;
use crate::scanner::error::ScanError;
use crate::scanner::pipeline::Scanner;
use crate::trace::logger::TraceLogger;

// ============================================================================
// scan subcommand
// ============================================================================

/// Run a scan and return whether it met `min_score` (always true without one).
pub fn cmd_scan(
    url: &str,
    format: &str,
    output: Option<&str>,
    min_score: Option<u32>,
    settings: &ScanSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    let url = normalize_url(url);
    let scanner = build_scanner(settings)?;

    let result = scanner.scan(&url)?;
    let rendered = render(&result, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            info!(path, "report written");
        }
        None => print!("{}", rendered),
    }

    Ok(min_score.is_none_or(|min| result.score >= min))
}

// ============================================================================
// snapshot subcommand
// ============================================================================

/// What `snapshot` prints: the snapshot minus the raw HTML.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary<'a> {
    pub url: &'a str,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub title: &'a str,
    pub meta_tags: &'a std::collections::BTreeMap<String, String>,
    pub scripts: &'a [String],
    pub html_bytes: usize,
    pub fingerprint: String,
}

pub fn cmd_snapshot(url: &str, settings: &ScanSettings) -> Result<(), Box<dyn std::error::Error>> {
    let url = normalize_url(url);
    let scanner = build_scanner(settings)?;
    let snapshot = scanner.snapshot(&url);

    let summary = SnapshotSummary {
        url: &url,
        loaded: snapshot.loaded,
        error: snapshot.error.as_deref(),
        title: &snapshot.title,
        meta_tags: &snapshot.meta_tags,
        scripts: &snapshot.scripts,
        html_bytes: snapshot.html.len(),
        fingerprint: snapshot.fingerprint(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

// ============================================================================
// phases subcommand
// ============================================================================

pub fn format_phase_list() -> String {
    Phase::ALL
        .iter()
        .enumerate()
        .map(|(i, phase)| format!("{}. {:<12} {}\n", i + 1, phase.name(), phase.description()))
        .collect()
}

pub fn cmd_phases() {
    print!("{}", format_phase_list());
}

// ============================================================================
// Helpers
// ============================================================================

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid regex"));

/// Trim the input and prefix `https://` when it has no scheme.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    // Only a leading scheme counts; `://` later on is part of a path or query
    if SCHEME_RE.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    }
}

/// Wire real clients from settings. Optional services are only built when
/// their key is present.
pub fn build_scanner(settings: &ScanSettings) -> Result<Scanner, ScanError> {
    let timeouts = settings.timeouts;

    let fetcher = BrowserlessFetcher::new(
        &settings.browserless_endpoint,
        settings.browserless_key.clone(),
        timeouts.navigation,
    );

    let pagespeed = settings.pagespeed_key.as_deref().map(|key| {
        Arc::new(GooglePageSpeed::new(
            &settings.pagespeed_endpoint,
            key,
            &settings.pagespeed_strategy,
            timeouts.pagespeed,
        )) as Arc<dyn PageSpeedApi>
    });

    let llm = settings.openai_key.as_deref().map(|key| {
        Arc::new(OpenAiBackend::new(&settings.openai_endpoint, &settings.openai_model, key))
            as Arc<dyn TextInference>
    });

    let services = ScanServices {
        web: Arc::new(ReqwestWebClient::new()?),
        pagespeed,
        llm,
        timeouts,
    };

    let scanner = Scanner::new(Arc::new(fetcher), services);
    Ok(match &settings.trace_path {
        Some(path) => scanner.with_tracer(TraceLogger::new(path)),
        None => scanner,
    })
}

/// Filter directive: `RUST_LOG` > config `logging.level` > `-v` count.
pub fn log_directive(verbose: u8, logging: &LoggingConfig) -> String {
    if let Some(level) = logging.level.as_deref().filter(|l| !l.trim().is_empty()) {
        return level.to_string();
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

/// Install the global subscriber, writing to stderr.
pub fn init_logging(verbose: u8, logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose, logging)));

    let layer = if logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}
