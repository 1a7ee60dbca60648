//! Failure reports
//!
//! One JSON document per failing run, named after the run and a timestamp so
//! earlier reports are never overwritten. Runs without failures write
//! nothing.

use crate::client::truncate;
use crate::error::ReportError;
use crate::stats::{RunContext, RunSummary};
use chrono::{DateTime, Utc};
use iwv_model::{
    DecisionKind, FfirSummary, Performance, PirSummary, TestInput, TestOutput, ValidationError,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Characters of the raw body kept in a condensed response
pub const RAW_PREVIEW_CHARS: usize = 500;

/// Condensed view of a raw response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDigest {
    pub decision_count: usize,
    pub pir_decisions: usize,
    pub ffir_decisions: usize,
    pub unspecified_decisions: usize,
    /// Absent when the body does not parse as a response
    pub pir_summary: Option<PirSummary>,
    pub ffir_summary: Option<FfirSummary>,
    /// Leading characters of the serialized body
    pub raw_preview: String,
}

impl ResponseDigest {
    /// Condense a raw response body
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        let raw = body.to_string();
        let raw_preview = truncate(&raw, RAW_PREVIEW_CHARS);

        match serde_json::from_value::<TestOutput>(body.clone()) {
            Ok(output) => Self {
                decision_count: output.decisions.len(),
                pir_decisions: output.pir_count(),
                ffir_decisions: output.ffir_count(),
                unspecified_decisions: output.count_of(DecisionKind::Unspecified),
                pir_summary: Some(output.pir_workflow.summary),
                ffir_summary: Some(output.ffir_workflow.summary),
                raw_preview,
            },
            Err(_) => Self {
                decision_count: 0,
                pir_decisions: 0,
                ffir_decisions: 0,
                unspecified_decisions: 0,
                pir_summary: None,
                ffir_summary: None,
                raw_preview,
            },
        }
    }
}

/// One failing item in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetail {
    pub input: TestInput,
    pub errors: Vec<ValidationError>,
    pub response: Option<ResponseDigest>,
    pub performance: Performance,
    pub timestamp: DateTime<Utc>,
}

impl From<&ValidationResult> for FailureDetail {
    fn from(result: &ValidationResult) -> Self {
        Self {
            input: result.input.clone(),
            errors: result.errors.clone(),
            response: result.api_response.as_ref().map(ResponseDigest::from_body),
            performance: result.performance,
            timestamp: result.timestamp,
        }
    }
}

/// Persisted failure report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub run_name: String,
    pub generated_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub failures: Vec<FailureDetail>,
}

/// Writes failure reports into a directory
#[derive(Debug, Clone)]
pub struct FailureReporter {
    dir: PathBuf,
}

impl FailureReporter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the failures of a run
    ///
    /// Returns the written path, or `None` when the run had no failures.
    ///
    /// # Errors
    /// `ReportError` if the directory or file cannot be written.
    pub async fn save_failure_details(
        &self,
        ctx: &RunContext,
    ) -> Result<Option<PathBuf>, ReportError> {
        let failures = &ctx.stats().failures;
        if failures.is_empty() {
            tracing::debug!("No failures in {}, no report written", ctx.run_name());
            return Ok(None);
        }

        let generated_at = Utc::now();
        let report = FailureReport {
            run_name: ctx.run_name().to_owned(),
            generated_at,
            summary: ctx.summary(),
            failures: failures.iter().map(FailureDetail::from).collect(),
        };
        let json = serde_json::to_vec_pretty(&report)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ReportError::io_error(&self.dir, e))?;
        let path = self.write_new_file(ctx.run_name(), generated_at, &json).await?;

        tracing::info!(
            "Wrote {} failure(s) for {} to {}",
            report.failures.len(),
            ctx.run_name(),
            path.display()
        );
        Ok(Some(path))
    }

    /// Create a file that did not exist before, suffixing on collision
    async fn write_new_file(
        &self,
        run_name: &str,
        at: DateTime<Utc>,
        contents: &[u8],
    ) -> Result<PathBuf, ReportError> {
        use tokio::io::AsyncWriteExt;

        let stem = format!(
            "{}_{}",
            sanitize(run_name),
            at.format("%Y%m%dT%H%M%S%.3fZ")
        );
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.json")
            } else {
                format!("{stem}_{attempt}.json")
            };
            let path = self.dir.join(name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(contents)
                        .await
                        .map_err(|e| ReportError::io_error(&path, e))?;
                    file.flush()
                        .await
                        .map_err(|e| ReportError::io_error(&path, e))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(ReportError::io_error(&path, e)),
            }
        }
    }
}

/// File-name-safe form of a run label
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "run".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_counts_kinds_and_previews_body() {
        let body = json!({
            "decisions": [
                {"id": "1", "question": "a", "kind": "PIR"},
                {"id": "2", "question": "b"}
            ],
            "pirWorkflow": {"summary": {"totalDecisions": 1}},
            "ffirWorkflow": {"summary": {"totalDecisions": 0}},
            "padding": "x".repeat(1000)
        });
        let digest = ResponseDigest::from_body(&body);
        assert_eq!(digest.decision_count, 2);
        assert_eq!(digest.pir_decisions, 1);
        assert_eq!(digest.unspecified_decisions, 1);
        assert_eq!(digest.pir_summary.unwrap().total_decisions, 1);
        assert_eq!(digest.raw_preview.chars().count(), RAW_PREVIEW_CHARS);
    }

    #[test]
    fn digest_of_unparsable_body() {
        let digest = ResponseDigest::from_body(&json!("<html>oops</html>"));
        assert_eq!(digest.decision_count, 0);
        assert!(digest.pir_summary.is_none());
        assert!(digest.raw_preview.contains("oops"));
    }

    #[test]
    fn sanitize_keeps_safe_chars() {
        assert_eq!(sanitize("scenario edge/cases"), "scenario_edge_cases");
        assert_eq!(sanitize("quick-run_1"), "quick-run_1");
        assert_eq!(sanitize(""), "run");
    }

    #[tokio::test]
    async fn colliding_names_get_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = FailureReporter::new(dir.path());
        let at = Utc::now();

        let first = reporter.write_new_file("quick", at, b"{}").await.unwrap();
        let second = reporter.write_new_file("quick", at, b"{}").await.unwrap();
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("_1.json"));
    }
}
