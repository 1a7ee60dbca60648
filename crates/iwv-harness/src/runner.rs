//! Run orchestration
//!
//! Wires generator, executor, statistics and reporter together for named
//! profiles and scenario families, and runs the standalone health check.

use crate::client::{elapsed_ms, HttpRemoteClient, RemoteSystem};
use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::executor::{BatchExecutor, BatchPerformance, ProgressEvent};
use crate::profile::TestProfile;
use crate::report::FailureReporter;
use crate::stats::{RunContext, RunSummary};
use iwv_model::{TestInput, ValidationResult};
use iwv_scenario::{ScenarioGenerator, ScenarioType};
use iwv_validation::SchemaValidator;
use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

/// Input used by the health check round-trip
pub const HEALTH_CHECK_INTENT: &str = "Expand our SaaS platform into the European mid-market segment";

/// Outcome of one named run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub performance: BatchPerformance,
    pub results: Vec<ValidationResult>,
    /// Failure report, when one was written
    pub report_path: Option<PathBuf>,
    /// Why the failure report could not be written
    pub report_error: Option<String>,
}

impl RunReport {
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.summary.passed()
    }

    /// Summary plus batch timing
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut text = self.summary.render_text();
        let perf = &self.performance;
        let _ = writeln!(text, "\n=== Performance ===");
        let _ = writeln!(text, "Total Time: {}ms", perf.total_time_ms);
        let _ = writeln!(text, "Average Per Item: {:.0}ms", perf.average_time_ms);
        let _ = writeln!(text, "Throughput: {:.2} items/s", perf.throughput_per_sec);
        if let Some(calls) = perf.calls_per_sec {
            let _ = writeln!(text, "API Calls: {calls:.2}/s");
        }
        if let Some(path) = &self.report_path {
            let _ = writeln!(text, "\nFailure report: {}", path.display());
        }
        if let Some(error) = &self.report_error {
            let _ = writeln!(text, "\nFailure report not written: {error}");
        }
        text
    }
}

/// One health sub-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
    pub duration_ms: u64,
}

/// All health sub-checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub target: String,
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// PASS only when every sub-check passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    #[must_use]
    pub fn check(&self, name: &str) -> Option<&HealthCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let mut text = String::from("=== Health Check ===\n\n");
        let _ = writeln!(text, "Target: {}", self.target);
        for check in &self.checks {
            let _ = writeln!(
                text,
                "[{}] {} ({}ms): {}",
                if check.passed { "PASS" } else { "FAIL" },
                check.name,
                check.duration_ms,
                check.detail
            );
        }
        let _ = writeln!(
            text,
            "\n=== Result: {} ===",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        text
    }
}

/// Entry point for profiles, scenarios and health checks
pub struct Runner {
    config: HarnessConfig,
    schemas: Arc<SchemaValidator>,
    remote: Arc<dyn RemoteSystem>,
    reporter: FailureReporter,
    generator: ScenarioGenerator,
    ctx: RunContext,
    force_local: bool,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("remote", &self.remote.target())
            .field("reporter", &self.reporter)
            .field("force_local", &self.force_local)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Runner with explicit collaborators
    pub fn new(
        config: HarnessConfig,
        schemas: Arc<SchemaValidator>,
        remote: Arc<dyn RemoteSystem>,
    ) -> Self {
        let reporter = FailureReporter::new(config.report_dir.clone());
        Self {
            config,
            schemas,
            remote,
            reporter,
            generator: ScenarioGenerator::new(),
            ctx: RunContext::new("idle"),
            force_local: false,
            progress: None,
        }
    }

    /// Runner talking HTTP to the configured endpoint
    ///
    /// # Errors
    /// Schema loading or HTTP client construction failures.
    pub fn from_config(config: HarnessConfig) -> HarnessResult<Self> {
        let schemas = match &config.schema_dir {
            Some(dir) => SchemaValidator::from_dir(dir)?,
            None => SchemaValidator::embedded()?,
        };
        let remote = HttpRemoteClient::from_config(&config)?;
        Ok(Self::new(config, Arc::new(schemas), Arc::new(remote)))
    }

    /// With a specific generator, e.g. a seeded one
    #[inline]
    #[must_use]
    pub fn with_generator(mut self, generator: ScenarioGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Never call the remote system
    #[inline]
    #[must_use]
    pub fn with_local(mut self, local: bool) -> Self {
        self.force_local = local;
        self
    }

    /// Publish progress on a channel
    #[inline]
    #[must_use]
    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    #[inline]
    #[must_use]
    pub fn reporter(&self) -> &FailureReporter {
        &self.reporter
    }

    fn executor(&self) -> BatchExecutor {
        let executor = BatchExecutor::new(self.schemas.clone(), self.remote.clone())
            .with_config(self.config.executor_config());
        match &self.progress {
            Some(sender) => executor.with_progress(sender.clone()),
            None => executor,
        }
    }

    /// Context of the latest run
    #[inline]
    #[must_use]
    pub fn last_run(&self) -> &RunContext {
        &self.ctx
    }

    /// Generate and run a profile batch
    pub async fn run_profile(&mut self, profile: TestProfile) -> RunReport {
        let inputs = self.generator.generate_batch(profile.count());
        self.run_inputs(profile.as_str(), &inputs, TestProfile::TEST_REMOTE, profile.parallel())
            .await
    }

    /// Generate and run a scenario family
    pub async fn run_scenario(&mut self, scenario: ScenarioType, parallel: bool) -> RunReport {
        let inputs = self.generator.generate_scenarios(scenario);
        let name = format!("scenario_{scenario}");
        self.run_inputs(&name, &inputs, true, parallel).await
    }

    /// Run prepared inputs as one named run
    ///
    /// Always completes. A failure report that cannot be written is logged
    /// and carried on the returned [`RunReport`].
    pub async fn run_inputs(
        &mut self,
        name: &str,
        inputs: &[TestInput],
        test_remote: bool,
        parallel: bool,
    ) -> RunReport {
        let test_remote = test_remote && !self.force_local;
        self.ctx.reset(name);
        tracing::info!("Run {} ({}) started", self.ctx.run_name(), self.ctx.run_id());

        let outcome = self
            .executor()
            .validate_batch(inputs, test_remote, parallel, &mut self.ctx)
            .await;
        let summary = self.ctx.summary();
        let (report_path, report_error) = match self.reporter.save_failure_details(&self.ctx).await
        {
            Ok(path) => (path, None),
            Err(e) => {
                tracing::error!("Run {}: {e}", summary.run_name);
                (None, Some(e.to_string()))
            }
        };

        tracing::info!(
            "Run {} finished: {}/{} passed",
            summary.run_name,
            summary.passed,
            summary.total
        );
        RunReport {
            summary,
            performance: outcome.performance,
            results: outcome.results,
            report_path,
            report_error,
        }
    }

    /// Schema, generator, connectivity and round-trip checks
    pub async fn health_check(&mut self) -> HealthReport {
        let mut checks = Vec::with_capacity(4);

        let start = Instant::now();
        let (passed, detail) = self.check_schemas();
        checks.push(HealthCheck {
            name: "schemas",
            passed,
            detail,
            duration_ms: elapsed_ms(start),
        });

        let start = Instant::now();
        let (passed, detail) = self.check_generator();
        checks.push(HealthCheck {
            name: "generator",
            passed,
            detail,
            duration_ms: elapsed_ms(start),
        });

        let start = Instant::now();
        let (passed, detail) = match self.remote.probe().await {
            Ok(()) => (true, format!("{} reachable", self.remote.target())),
            Err(failure) => (false, failure.to_string()),
        };
        checks.push(HealthCheck {
            name: "connectivity",
            passed,
            detail,
            duration_ms: elapsed_ms(start),
        });

        let start = Instant::now();
        let (passed, detail) = self.check_round_trip().await;
        checks.push(HealthCheck {
            name: "round_trip",
            passed,
            detail,
            duration_ms: elapsed_ms(start),
        });

        let report = HealthReport {
            target: self.remote.target(),
            checks,
        };
        for check in report.checks.iter().filter(|c| !c.passed) {
            tracing::error!("Health check {} failed: {}", check.name, check.detail);
        }
        report
    }

    fn check_schemas(&self) -> (bool, String) {
        let input = json!({"strategicIntent": HEALTH_CHECK_INTENT});
        let output = json!({
            "decisions": [{"id": "d1", "question": "Which segment first?", "kind": "PIR"}],
            "pirWorkflow": {"summary": {"totalDecisions": 1}},
            "ffirWorkflow": {"summary": {"totalDecisions": 0}}
        });
        let input_report = self.schemas.validate_input(&input);
        let output_report = self.schemas.validate_output(&output);
        match (input_report.valid, output_report.valid) {
            (true, true) => (true, "input and output schemas loaded".to_owned()),
            (input_ok, output_ok) => (
                false,
                format!("reference documents rejected (input: {input_ok}, output: {output_ok})"),
            ),
        }
    }

    fn check_generator(&mut self) -> (bool, String) {
        let input = self.generator.generate_single();
        match input.payload() {
            Ok(payload) => {
                let report = self.schemas.validate_input(&payload);
                if report.valid {
                    (true, format!("generated '{}'", input.label()))
                } else {
                    (false, format!("generated input rejected: {:?}", report.errors))
                }
            }
            Err(e) => (false, format!("cannot serialize generated input: {e}")),
        }
    }

    async fn check_round_trip(&self) -> (bool, String) {
        let input = TestInput::new(HEALTH_CHECK_INTENT).with_test_id("health_round_trip");
        let result = self.executor().validate_single(&input, true).await;

        if result.remote_called && !result.remote_failed() && result.output_valid {
            let ms = result.performance.response_time_ms.unwrap_or_default();
            (true, format!("conformant response in {ms}ms"))
        } else {
            let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
            (false, errors.join("; "))
        }
    }
}
