use crate::scanner::model::{FindingKind, Priority, ScanResult};

// ============================================================================
// Console reporter — formatted terminal output
// ============================================================================

/// Format a scan result for terminal output.
///
/// Produces output like:
/// ```text
/// === Launch readiness: https://example.com ===
/// Score: 72/100
///
/// [Domain] 95/100
///   ✓ HTTPS enabled
///   ✓ Apex domain in use — No www. prefix on example.com
///   → [low] Configure a www redirect: Redirect www.example.com to ...
/// ```
pub fn format_console_report(result: &ScanResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Launch readiness: {} ===\n", result.url));
    out.push_str(&format!("Score: {}/{}\n", result.score, result.max_score));

    if let Some(ref summary) = result.executive_summary {
        out.push_str(&format!("\n{}\n", summary));
    }

    if let Some(ref priorities) = result.top_priorities {
        if !priorities.is_empty() {
            out.push_str("\nTop priorities:\n");
            for (i, p) in priorities.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, p));
            }
        }
    }

    for phase in &result.phases {
        out.push_str(&format!(
            "\n[{}] {}/{}\n",
            phase.phase_name, phase.score, phase.max_score
        ));

        for finding in &phase.findings {
            let marker = finding_marker(finding.kind);
            match finding.details {
                Some(ref details) => out.push_str(&format!(
                    "  {} {} — {}\n",
                    marker, finding.message, details
                )),
                None => out.push_str(&format!("  {} {}\n", marker, finding.message)),
            }
        }

        for rec in &phase.recommendations {
            out.push_str(&format!(
                "  \u{2192} [{}] {}: {}\n",
                priority_label(rec.priority),
                rec.title,
                rec.actionable
            ));
        }
    }

    out.push_str(&format!(
        "\n=== Scanned {} ===\n",
        result
            .scanned_at
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default()
    ));

    out
}

fn finding_marker(kind: FindingKind) -> &'static str {
    match kind {
        FindingKind::Success => "\u{2713}",
        FindingKind::Warning => "!",
        FindingKind::Error => "\u{2717}",
    }
}

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}
