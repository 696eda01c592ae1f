use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::browser::fetcher::DEFAULT_BROWSERLESS_ENDPOINT;
use crate::llm::inference::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL};
use crate::net::pagespeed::DEFAULT_PAGESPEED_ENDPOINT;
use crate::phases::Timeouts;

pub const DEFAULT_CONFIG_FILE: &str = "launch-ready.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "launch-ready",
    version,
    about = "Score a website's launch readiness across eight phases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: launch-ready.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// OpenAI model used for content analysis and the executive summary
    #[arg(long, global = true)]
    pub openai_model: Option<String>,

    /// Append one JSON line per phase to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full readiness scan
    Scan {
        /// Website to scan (https:// is assumed when no scheme is given)
        #[arg(long)]
        url: String,

        /// Output format: console, html, json
        #[arg(long, default_value = "console")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Exit with status 1 when the readiness score is below this value
        #[arg(long)]
        min_score: Option<u32>,
    },

    /// Fetch and print the page snapshot only
    Snapshot {
        #[arg(long)]
        url: String,
    },

    /// List the scan phases in report order
    Phases,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `launch-ready.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browserless: BrowserlessConfig,
    #[serde(default)]
    pub pagespeed: PageSpeedConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub trace_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserlessConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpeedConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,

    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for PageSpeedConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            strategy: default_strategy(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Per-call budgets in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_ten")]
    pub navigation_secs: u64,

    #[serde(default = "default_thirty")]
    pub pagespeed_secs: u64,

    #[serde(default = "default_ten")]
    pub headers_secs: u64,

    #[serde(default = "default_five")]
    pub robots_secs: u64,

    #[serde(default = "default_fifteen")]
    pub llm_secs: u64,

    #[serde(default = "default_sixty")]
    pub phase_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            navigation_secs: 10,
            pagespeed_secs: 30,
            headers_secs: 10,
            robots_secs: 5,
            llm_secs: 15,
            phase_secs: 60,
        }
    }
}

impl TimeoutsConfig {
    pub fn to_timeouts(&self) -> Timeouts {
        Timeouts {
            navigation: Duration::from_secs(self.navigation_secs),
            pagespeed: Duration::from_secs(self.pagespeed_secs),
            headers: Duration::from_secs(self.headers_secs),
            robots: Duration::from_secs(self.robots_secs),
            llm: Duration::from_secs(self.llm_secs),
            phase: Duration::from_secs(self.phase_secs),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `launch_ready=debug`
    pub level: Option<String>,

    #[serde(default)]
    pub json: bool,
}

// Serde default helpers
fn default_five() -> u64 { 5 }
fn default_ten() -> u64 { 10 }
fn default_fifteen() -> u64 { 15 }
fn default_thirty() -> u64 { 30 }
fn default_sixty() -> u64 { 60 }
fn default_strategy() -> String { "mobile".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "ignoring malformed config file");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Effective settings (config file merged with environment)
// ============================================================================

/// Everything needed to wire a `Scanner`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub browserless_endpoint: String,
    pub browserless_key: Option<String>,
    pub pagespeed_endpoint: String,
    pub pagespeed_key: Option<String>,
    pub pagespeed_strategy: String,
    pub openai_endpoint: String,
    pub openai_model: String,
    pub openai_key: Option<String>,
    pub timeouts: Timeouts,
    pub trace_path: Option<String>,
}

impl ScanSettings {
    /// Merge the config file with `env`. File values win; empty strings count
    /// as absent.
    pub fn resolve<F>(config: &AppConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |file: &Option<String>, var: &str| {
            non_empty(file.clone()).or_else(|| non_empty(env(var)))
        };

        Self {
            browserless_endpoint: pick(&config.browserless.endpoint, "BROWSERLESS_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_BROWSERLESS_ENDPOINT.to_string()),
            browserless_key: pick(&config.browserless.api_key, "BROWSERLESS_API_KEY"),
            pagespeed_endpoint: non_empty(config.pagespeed.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_PAGESPEED_ENDPOINT.to_string()),
            pagespeed_key: pick(&config.pagespeed.api_key, "GOOGLE_PAGESPEED_API_KEY"),
            pagespeed_strategy: config.pagespeed.strategy.clone(),
            openai_endpoint: pick(&config.openai.endpoint, "OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
            openai_model: non_empty(config.openai.model.clone())
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_key: pick(&config.openai.api_key, "OPENAI_API_KEY"),
            timeouts: config.timeouts.to_timeouts(),
            trace_path: non_empty(config.trace_path.clone()),
        }
    }

    /// Resolve against the process environment.
    pub fn from_env(config: &AppConfig) -> Self {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    /// Apply CLI flags on top of the resolved settings.
    pub fn with_overrides(mut self, openai_model: Option<&str>, trace_path: Option<&str>) -> Self {
        if let Some(model) = openai_model.filter(|m| !m.trim().is_empty()) {
            self.openai_model = model.to_string();
        }
        if let Some(path) = trace_path.filter(|p| !p.trim().is_empty()) {
            self.trace_path = Some(path.to_string());
        }
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
