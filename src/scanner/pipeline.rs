use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::browser::fetcher::PageFetcher;
use crate::browser::snapshot::PageSnapshot;
use crate::llm::analysis::{ExecutiveSummary, parse_structured};
use crate::llm::inference::{InferenceRequest, TextInference};
use crate::phases::{PhaseContext, PhaseScorer, ScanServices, Timeouts, default_scorers};
use crate::scanner::error::ScanError;
use crate::scanner::model::{Finding, PhaseResult, Priority, ScanResult};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

const SUMMARY_MAX_TOKENS: u32 = 400;
/// Recommendation titles quoted to the model for the summary.
const SUMMARY_MAX_RECOMMENDATIONS: usize = 15;

const SUMMARY_SYSTEM_PROMPT: &str = r#"You are a launch readiness consultant. Given a website's readiness scan, write a short executive summary for the founder.
Respond with ONLY a JSON object of this exact shape:
{"summary": "<2-3 sentences on overall readiness and the biggest risks>", "priorities": ["<first thing to fix>", "<second>", "<third>"]}"#;

// ============================================================================
// Scanner — fetch once, fan out the phases, aggregate
// ============================================================================

/// Runs readiness scans.
///
/// A scan fetches one snapshot, runs every phase concurrently against it,
/// normalizes the summed phase scores and optionally asks the language model
/// for an executive summary. Network failures only ever lower scores.
pub struct Scanner {
    fetcher: Arc<dyn PageFetcher>,
    services: ScanServices,
    scorers: Vec<Arc<dyn PhaseScorer>>,
    tracer: Option<Arc<TraceLogger>>,
}

/// Outcome of one phase worker.
struct PhaseOutcome {
    index: usize,
    result: PhaseResult,
    elapsed: Duration,
}

impl Scanner {
    pub fn new(fetcher: Arc<dyn PageFetcher>, services: ScanServices) -> Self {
        Self {
            fetcher,
            services,
            scorers: default_scorers(),
            tracer: None,
        }
    }

    /// Replace the phase scorers (results are still reported in phase order).
    pub fn with_scorers(mut self, scorers: Vec<Arc<dyn PhaseScorer>>) -> Self {
        self.scorers = scorers;
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.services.timeouts
    }

    pub fn snapshot(&self, url: &str) -> PageSnapshot {
        self.fetcher.fetch(url)
    }

    /// Scan `url`, which must already carry a scheme.
    ///
    /// Returns `Err` only when a phase worker panics.
    pub fn scan(&self, url: &str) -> Result<ScanResult, ScanError> {
        let started = Instant::now();
        info!(url, "scan started");

        let snapshot = self.fetcher.fetch(url);
        let fingerprint = snapshot.loaded.then(|| snapshot.fingerprint());

        let ctx = Arc::new(PhaseContext {
            url: url.to_string(),
            snapshot,
            services: self.services.clone(),
        });

        let phases = self.run_phases(&ctx, fingerprint.as_deref())?;
        let mut result = ScanResult::from_phases(url, phases);

        if let Some(llm) = &self.services.llm {
            match summarize(llm.as_ref(), &result, &self.services.timeouts) {
                Ok(summary) => {
                    result.top_priorities = Some(summary.top_priorities());
                    result.executive_summary = Some(summary.summary.trim().to_string());
                }
                Err(e) => warn!(url, error = %e, "executive summary unavailable"),
            }
        }

        info!(
            url,
            score = result.score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );
        Ok(result)
    }

    /// Run every scorer on its own thread and collect results within the
    /// phase budget. Late phases are reported as timed out.
    fn run_phases(
        &self,
        ctx: &Arc<PhaseContext>,
        fingerprint: Option<&str>,
    ) -> Result<Vec<PhaseResult>, ScanError> {
        let (tx, rx) = mpsc::channel::<PhaseOutcome>();
        let mut handles: Vec<Option<JoinHandle<()>>> = Vec::with_capacity(self.scorers.len());

        for (index, scorer) in self.scorers.iter().enumerate() {
            let scorer = Arc::clone(scorer);
            let ctx = Arc::clone(ctx);
            let tx = tx.clone();
            let handle = thread::Builder::new()
                .name(format!("phase-{}", scorer.phase().name().to_lowercase()))
                .spawn(move || {
                    let started = Instant::now();
                    let result = scorer.score(&ctx);
                    // Receiver is gone once the scan gave up on this phase
                    let _ = tx.send(PhaseOutcome {
                        index,
                        result,
                        elapsed: started.elapsed(),
                    });
                })?;
            handles.push(Some(handle));
        }
        drop(tx);

        let budget = self.services.timeouts.phase;
        let deadline = Instant::now() + budget;
        let mut outcomes: Vec<Option<PhaseOutcome>> = (0..self.scorers.len()).map(|_| None).collect();
        let mut received = 0;
        let mut all_exited = false;

        while received < outcomes.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    let index = outcome.index;
                    outcomes[index] = Some(outcome);
                    received += 1;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    all_exited = true;
                    break;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => break,
            }
        }

        // Anything still missing either panicked or overran the budget.
        // Once every sender is gone the workers are unwinding, so joining is short.
        for (index, slot) in handles.iter_mut().enumerate() {
            if outcomes[index].is_some() {
                continue;
            }
            let finished = all_exited || slot.as_ref().is_some_and(|h| h.is_finished());
            if finished {
                if let Some(handle) = slot.take() {
                    if let Err(payload) = handle.join() {
                        return Err(ScanError::PhaseFailed {
                            phase: self.scorers[index].phase().name().to_string(),
                            reason: panic_message(payload.as_ref()),
                        });
                    }
                }
            }
        }
        while let Ok(outcome) = rx.try_recv() {
            let index = outcome.index;
            outcomes[index] = Some(outcome);
        }

        let mut results: Vec<(usize, PhaseResult)> = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            let phase = self.scorers[index].phase();
            let (result, event) = match outcome {
                Some(outcome) => {
                    let event = TraceEvent::for_phase(&ctx.url, &outcome.result, outcome.elapsed);
                    (outcome.result, event)
                }
                None => {
                    warn!(url = %ctx.url, phase = phase.name(), "phase timed out");
                    let result = timed_out_result(phase.name(), budget);
                    let event = TraceEvent::for_phase(&ctx.url, &result, budget).with_timeout();
                    (result, event)
                }
            };
            if let Some(tracer) = &self.tracer {
                let event = match fingerprint {
                    Some(fp) => event.with_fingerprint(fp),
                    None => event,
                };
                tracer.log(&event);
            }
            results.push((index, result));
        }

        results.sort_by_key(|(index, _)| self.scorers[*index].phase());
        Ok(results.into_iter().map(|(_, result)| result).collect())
    }
}

fn timed_out_result(phase_name: &str, budget: Duration) -> PhaseResult {
    PhaseResult::new(
        phase_name,
        0,
        vec![Finding::error("Phase timed out").with_details(format!(
            "No result within {} seconds",
            budget.as_secs()
        ))],
        vec![],
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "phase worker panicked".to_string()
    }
}

// ============================================================================
// Executive summary
// ============================================================================

/// Prompt listing phase scores and the high/medium recommendation titles.
pub fn summary_prompt(result: &ScanResult) -> String {
    let phases = result
        .phases
        .iter()
        .map(|p| format!("- {}: {}/{}", p.phase_name, p.score, p.max_score))
        .collect::<Vec<_>>()
        .join("\n");

    let recommendations = result
        .phases
        .iter()
        .flat_map(|p| p.recommendations.iter().map(move |r| (p, r)))
        .filter(|(_, r)| matches!(r.priority, Priority::High | Priority::Medium))
        .take(SUMMARY_MAX_RECOMMENDATIONS)
        .map(|(p, r)| format!("- [{:?}] {} ({})", r.priority, r.title, p.phase_name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Website: {}\nOverall readiness score: {}/{}\n\nPhase scores:\n{}\n\nKey recommendations:\n{}",
        result.url,
        result.score,
        result.max_score,
        phases,
        if recommendations.is_empty() {
            "(none)".to_string()
        } else {
            recommendations
        }
    )
}

pub fn summarize(
    llm: &dyn TextInference,
    result: &ScanResult,
    timeouts: &Timeouts,
) -> Result<ExecutiveSummary, ScanError> {
    let request = InferenceRequest {
        system: SUMMARY_SYSTEM_PROMPT.to_string(),
        prompt: summary_prompt(result),
        max_tokens: SUMMARY_MAX_TOKENS,
        temperature: 0.3,
        timeout: timeouts.llm,
    };
    let response = llm.infer_text(&request)?;
    Ok(parse_structured::<ExecutiveSummary>(&response)?)
}
