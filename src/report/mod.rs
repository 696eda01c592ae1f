pub mod console;
pub mod html;

use crate::scanner::error::ScanError;
use crate::scanner::model::ScanResult;

/// Render a scan result as `console`, `html` or `json`.
/// Unknown formats fall back to console output.
pub fn render(result: &ScanResult, format: &str) -> Result<String, ScanError> {
    let rendered = match format {
        "html" => html::generate_html_report(result),
        "json" => serde_json::to_string_pretty(result)?,
        _ => console::format_console_report(result),
    };
    Ok(rendered)
}
