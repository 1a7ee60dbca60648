//! Run statistics
//!
//! A [`RunContext`] is created (or reset) at the start of every named run and
//! threaded through the executor by `&mut`; nothing is process-global. Each
//! result is recorded synchronously right after its call resolves. Once the
//! run ends, [`RunContext::summary`] derives an immutable [`RunSummary`].

use chrono::{DateTime, Utc};
use iwv_model::{BusinessRule, ErrorKind, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use uuid::Uuid;

/// Responses slower than this are flagged in recommendations
pub const SLOW_RESPONSE_MS: u64 = 30_000;

/// Live tally of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Items that attempted a remote call
    pub api_calls: usize,
    /// Remote calls that ended in api, network or timeout errors
    pub api_failures: usize,
    /// Failing results, in completion order
    pub failures: Vec<ValidationResult>,
    pub response_times_ms: Vec<u64>,
}

/// Identity and tally of one named run
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: Uuid,
    run_name: String,
    started_at: DateTime<Utc>,
    stats: RunStatistics,
}

impl RunContext {
    /// Fresh context for a named run
    #[must_use]
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            run_name: run_name.into(),
            started_at: Utc::now(),
            stats: RunStatistics::default(),
        }
    }

    /// Start a new run: new id, new start time, zeroed tally
    pub fn reset(&mut self, run_name: impl Into<String>) {
        *self = Self::new(run_name);
    }

    #[inline]
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[inline]
    #[must_use]
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    #[inline]
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Fold one completed result into the tally
    pub fn record(&mut self, result: &ValidationResult) {
        let stats = &mut self.stats;
        stats.total += 1;

        if result.remote_called {
            stats.api_calls += 1;
            if result.remote_failed() {
                stats.api_failures += 1;
            }
        }
        if let Some(ms) = result.performance.response_time_ms {
            stats.response_times_ms.push(ms);
        }

        if result.passed() {
            stats.passed += 1;
        } else {
            stats.failed += 1;
            stats.failures.push(result.clone());
        }
    }

    /// Immutable summary of the run so far
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let stats = &self.stats;

        let mut errors_by_kind = BTreeMap::new();
        let mut errors_by_rule = BTreeMap::new();
        for error in stats.failures.iter().flat_map(|r| &r.errors) {
            *errors_by_kind.entry(error.kind).or_insert(0) += 1;
            if let Some(rule) = error.rule {
                *errors_by_rule.entry(rule).or_insert(0) += 1;
            }
        }

        let mut summary = RunSummary {
            run_id: self.run_id,
            run_name: self.run_name.clone(),
            started_at: self.started_at,
            total: stats.total,
            passed: stats.passed,
            failed: stats.failed,
            pass_rate: percentage(stats.passed, stats.total),
            api_calls: stats.api_calls,
            api_failures: stats.api_failures,
            api_success_rate: (stats.api_calls > 0)
                .then(|| percentage(stats.api_calls - stats.api_failures, stats.api_calls)),
            errors_by_kind,
            errors_by_rule,
            response_times: ResponseTimeStats::from_samples(&stats.response_times_ms),
            recommendations: Vec::new(),
        };
        summary.recommendations = recommendations(&summary);
        summary
    }
}

/// Response-time distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeStats {
    pub count: usize,
    pub mean_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub p50_ms: u64,
    pub p90_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

impl ResponseTimeStats {
    /// Stats over the samples, `None` when empty
    #[must_use]
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let (&min_ms, &max_ms) = (sorted.first()?, sorted.last()?);
        let sum: u64 = sorted.iter().sum();

        #[allow(clippy::cast_precision_loss)]
        let mean_ms = sum as f64 / sorted.len() as f64;

        Some(Self {
            count: sorted.len(),
            mean_ms,
            min_ms,
            max_ms,
            p50_ms: percentile(&sorted, 50),
            p90_ms: percentile(&sorted, 90),
            p95_ms: percentile(&sorted, 95),
            p99_ms: percentile(&sorted, 99),
        })
    }
}

/// Nearest-rank percentile of sorted, non-empty samples
#[must_use]
pub fn percentile(sorted: &[u64], pct: usize) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank.min(sorted.len()) - 1]
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Immutable end-of-run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub run_name: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percent of items that met their expectation
    pub pass_rate: f64,
    pub api_calls: usize,
    pub api_failures: usize,
    /// Percent of remote calls that succeeded, when any were made
    pub api_success_rate: Option<f64>,
    /// Errors on failing items, by kind
    pub errors_by_kind: BTreeMap<ErrorKind, usize>,
    /// Business-rule errors on failing items, by rule
    pub errors_by_rule: BTreeMap<BusinessRule, usize>,
    pub response_times: Option<ResponseTimeStats>,
    pub recommendations: Vec<String>,
}

impl RunSummary {
    /// Whether every item met its expectation
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failed == 0
    }

    /// Plain-text overview for the console
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut report = String::new();

        let _ = writeln!(report, "=== {} ===\n", self.run_name);
        let _ = writeln!(report, "Run ID: {}", self.run_id);
        let _ = writeln!(report, "Started: {}", self.started_at.to_rfc3339());
        let _ = writeln!(report, "Total Tests: {}", self.total);
        let _ = writeln!(report, "Passed: {}", self.passed);
        let _ = writeln!(report, "Failed: {}", self.failed);
        let _ = writeln!(report, "Pass Rate: {:.1}%", self.pass_rate);
        let _ = writeln!(report, "API Calls: {}", self.api_calls);
        let _ = writeln!(report, "API Failures: {}", self.api_failures);
        if let Some(rate) = self.api_success_rate {
            let _ = writeln!(report, "API Success Rate: {rate:.1}%");
        }

        if let Some(times) = &self.response_times {
            report.push_str("\n=== Response Times ===\n");
            let _ = writeln!(
                report,
                "Mean: {:.0}ms  Min: {}ms  Max: {}ms",
                times.mean_ms, times.min_ms, times.max_ms
            );
            let _ = writeln!(
                report,
                "p50: {}ms  p90: {}ms  p95: {}ms  p99: {}ms",
                times.p50_ms, times.p90_ms, times.p95_ms, times.p99_ms
            );
        }

        if !self.errors_by_kind.is_empty() {
            report.push_str("\n=== Errors By Kind ===\n");
            for (kind, count) in &self.errors_by_kind {
                let _ = writeln!(report, "{kind}: {count}");
            }
        }
        if !self.errors_by_rule.is_empty() {
            report.push_str("\n=== Business Rules ===\n");
            for (rule, count) in &self.errors_by_rule {
                let _ = writeln!(report, "{rule}: {count}");
            }
        }

        report.push_str("\n=== Recommendations ===\n");
        for recommendation in &self.recommendations {
            let _ = writeln!(report, "- {recommendation}");
        }

        let _ = writeln!(
            report,
            "\n=== Result: {} ===",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

fn recommendations(summary: &RunSummary) -> Vec<String> {
    let mut out = Vec::new();

    if summary.failed > 0 {
        out.push(format!(
            "Address {} failed test(s) before relying on this endpoint",
            summary.failed
        ));
    }
    if summary.api_failures > 0 {
        out.push(format!(
            "{} of {} API call(s) failed; check endpoint availability and credentials",
            summary.api_failures, summary.api_calls
        ));
    }
    if let Some(count) = summary.errors_by_kind.get(&ErrorKind::TimeoutError) {
        out.push(format!(
            "{count} call(s) timed out; consider increasing request_timeout_secs"
        ));
    }
    if let Some(times) = &summary.response_times {
        if times.max_ms > SLOW_RESPONSE_MS {
            out.push(format!(
                "Slow responses: max {}ms exceeds {SLOW_RESPONSE_MS}ms",
                times.max_ms
            ));
        }
    }
    if let Some(count) = summary.errors_by_rule.get(&BusinessRule::ComplexityOracle) {
        out.push(format!(
            "{count} complexity tag(s) disagree with the heuristic; review the test oracle"
        ));
    }

    if out.is_empty() {
        out.push("All tests passed".to_owned());
    }
    out
}
