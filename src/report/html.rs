use crate::report::console::priority_label;
use crate::scanner::model::{FindingKind, ScanResult};

// ============================================================================
// HTML reporter — self-contained HTML report
// ============================================================================

/// Colour for a score: green from 80, amber from 50, red below.
pub fn score_color(score: u32) -> &'static str {
    match score {
        80.. => "#4CAF50",
        50..=79 => "#FF9800",
        _ => "#f44336",
    }
}

/// Generate a self-contained HTML report.
///
/// Features:
/// - Header coloured by the readiness score band
/// - Executive summary and top priorities when available
/// - One section per phase with findings and recommendations
/// - Inline CSS (no external dependencies)
pub fn generate_html_report(result: &ScanResult) -> String {
    let mut summary = String::new();
    if let Some(ref text) = result.executive_summary {
        summary.push_str(&format!("<p class=\"summary\">{}</p>\n", escape_html(text)));
    }
    if let Some(ref priorities) = result.top_priorities {
        if !priorities.is_empty() {
            summary.push_str("<ol class=\"priorities\">\n");
            for p in priorities {
                summary.push_str(&format!("<li>{}</li>\n", escape_html(p)));
            }
            summary.push_str("</ol>\n");
        }
    }

    let mut phases = String::new();
    for phase in &result.phases {
        phases.push_str(&format!(
            r#"<div class="phase" style="border-left-color: {color}">
<h3>{name} <span class="score">{score}/{max}</span></h3>
"#,
            color = score_color(phase.score),
            name = escape_html(&phase.phase_name),
            score = phase.score,
            max = phase.max_score,
        ));

        if !phase.findings.is_empty() {
            phases.push_str("<ul class=\"findings\">\n");
            for finding in &phase.findings {
                let class = match finding.kind {
                    FindingKind::Success => "success",
                    FindingKind::Warning => "warning",
                    FindingKind::Error => "error",
                };
                let details = finding
                    .details
                    .as_deref()
                    .map(|d| format!(" <small>{}</small>", escape_html(d)))
                    .unwrap_or_default();
                phases.push_str(&format!(
                    "<li class=\"{}\">{}{}</li>\n",
                    class,
                    escape_html(&finding.message),
                    details
                ));
            }
            phases.push_str("</ul>\n");
        }

        if !phase.recommendations.is_empty() {
            phases.push_str("<ul class=\"recommendations\">\n");
            for rec in &phase.recommendations {
                let label = priority_label(rec.priority);
                phases.push_str(&format!(
                    "<li><span class=\"priority {label}\">{label}</span> <strong>{title}</strong>: {description} <em>{actionable}</em></li>\n",
                    label = label,
                    title = escape_html(&rec.title),
                    description = escape_html(&rec.description),
                    actionable = escape_html(&rec.actionable),
                ));
            }
            phases.push_str("</ul>\n");
        }

        phases.push_str("</div>\n");
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{url} — Launch Readiness Report</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 0; background: #f5f5f5; }}
.header {{ background: {header_color}; color: white; padding: 20px 30px; }}
.header h1 {{ margin: 0 0 8px 0; font-size: 24px; }}
.header p {{ margin: 0; font-size: 16px; opacity: 0.9; }}
.content {{ max-width: 900px; margin: 20px auto; padding: 0 20px; }}
.summary {{ background: white; border-radius: 6px; padding: 16px 20px; }}
.phase {{ background: white; border-radius: 6px; padding: 16px 20px; margin-bottom: 12px; border-left: 4px solid #ccc; }}
.phase h3 {{ margin: 0 0 8px 0; font-size: 16px; }}
.phase .score {{ float: right; color: #666; }}
.findings li {{ font-size: 14px; margin-bottom: 4px; }}
.findings .success {{ color: #2e7d32; }}
.findings .warning {{ color: #ef6c00; }}
.findings .error {{ color: #c62828; }}
.recommendations li {{ font-size: 13px; margin-bottom: 6px; color: #333; }}
.priority {{ display: inline-block; padding: 1px 6px; border-radius: 3px; font-size: 11px; color: white; text-transform: uppercase; }}
.priority.high {{ background: #f44336; }}
.priority.medium {{ background: #FF9800; }}
.priority.low {{ background: #9e9e9e; }}
</style>
</head>
<body>
<div class="header">
<h1>Readiness score: {score}/{max}</h1>
<p>{url}</p>
</div>
<div class="content">
{summary}
{phases}
</div>
</body>
</html>"##,
        url = escape_html(&result.url),
        header_color = score_color(result.score),
        score = result.score,
        max = result.max_score,
        summary = summary,
        phases = phases,
    )
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
