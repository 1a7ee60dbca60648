//! Batch executor
//!
//! Per item: input schema → remote call → output schema → business rules.
//!
//! # Pipeline invariants
//!
//! - An input that fails its contract never reaches the remote system
//! - A remote failure skips output and rule validation
//! - On a successful call both output layers always run and their errors merge
//! - A panic anywhere in the pipeline becomes a `system_error` on that item
//!
//! # Modes
//!
//! Sequential runs one item at a time with a fixed delay between remote
//! calls. Parallel runs fixed-width waves, awaits every call in a wave, then
//! waits a fixed delay before the next wave. Both return results in input
//! order.

use crate::client::{elapsed_ms, RemoteSystem};
use crate::stats::RunContext;
use futures::future::join_all;
use futures::FutureExt;
use iwv_model::{
    BusinessRule, ErrorKind, TestInput, TestOutput, ValidationError, ValidationResult,
};
use iwv_validation::{BusinessRuleValidator, SchemaValidator};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep, Instant};

/// Scheduling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Concurrent items per parallel wave
    pub wave_size: usize,
    /// Pause between sequential remote calls
    pub call_delay: Duration,
    /// Pause between parallel waves
    pub wave_delay: Duration,
    /// Progress is published every N completed items
    pub progress_interval: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            wave_size: 5,
            call_delay: Duration::from_millis(1000),
            wave_delay: Duration::from_millis(2000),
            progress_interval: 10,
        }
    }
}

impl ExecutorConfig {
    /// No delays, for local runs and tests
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            call_delay: Duration::ZERO,
            wave_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Periodic progress notification
///
/// Counts cover the current batch only, whatever the run context already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl ProgressEvent {
    fn start(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            passed: 0,
            failed: 0,
        }
    }

    fn advance(&mut self, result: &ValidationResult) {
        self.completed += 1;
        if result.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Run-level timing of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPerformance {
    pub total_time_ms: u64,
    /// Mean per-item pipeline time
    pub average_time_ms: f64,
    /// Items per second of wall time
    pub throughput_per_sec: f64,
    /// Remote calls per second, when remote testing was enabled
    pub calls_per_sec: Option<f64>,
}

impl BatchPerformance {
    #[allow(clippy::cast_precision_loss)]
    fn compute(results: &[ValidationResult], total_time_ms: u64, test_remote: bool) -> Self {
        let count = results.len() as f64;
        let seconds = (total_time_ms as f64 / 1000.0).max(f64::EPSILON);
        let item_time: u64 = results.iter().map(|r| r.performance.total_time_ms).sum();
        let calls = results.iter().filter(|r| r.remote_called).count() as f64;

        Self {
            total_time_ms,
            average_time_ms: if results.is_empty() {
                0.0
            } else {
                item_time as f64 / count
            },
            throughput_per_sec: count / seconds,
            calls_per_sec: test_remote.then(|| calls / seconds),
        }
    }
}

/// Results of one batch, in input order
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<ValidationResult>,
    pub performance: BatchPerformance,
}

/// Orchestrates per-item validation across a batch
pub struct BatchExecutor {
    schemas: Arc<SchemaValidator>,
    rules: BusinessRuleValidator,
    remote: Arc<dyn RemoteSystem>,
    config: ExecutorConfig,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl std::fmt::Debug for BatchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExecutor")
            .field("remote", &self.remote.target())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BatchExecutor {
    /// Create executor with default rules and scheduling
    pub fn new(schemas: Arc<SchemaValidator>, remote: Arc<dyn RemoteSystem>) -> Self {
        Self {
            schemas,
            rules: BusinessRuleValidator::new(),
            remote,
            config: ExecutorConfig::default(),
            progress: None,
        }
    }

    /// With scheduling settings
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// With custom business rules
    #[inline]
    #[must_use]
    pub fn with_rules(mut self, rules: BusinessRuleValidator) -> Self {
        self.rules = rules;
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
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Full pipeline for one input
    ///
    /// Never fails: every problem, including a panic, is recorded on the
    /// returned result.
    pub async fn validate_single(&self, input: &TestInput, test_remote: bool) -> ValidationResult {
        let start = Instant::now();

        // Stages completed before a panic stay recorded on the result
        let mut result = ValidationResult::new(input.clone());
        let outcome = AssertUnwindSafe(self.run_pipeline(input, test_remote, &mut result))
            .catch_unwind()
            .await;
        if let Err(panic) = outcome {
            let message = panic_message(panic.as_ref());
            tracing::error!("{}: pipeline panicked: {message}", input.label());
            result
                .errors
                .push(ValidationError::system(format!("unexpected fault: {message}")));
        }

        check_expected_error(&mut result);
        result.performance.total_time_ms = elapsed_ms(start);

        if result.passed() {
            tracing::debug!("{}: passed", input.label());
        } else {
            tracing::warn!(
                "{}: failed with {} error(s)",
                input.label(),
                result.errors.len()
            );
        }
        result
    }

    async fn run_pipeline(
        &self,
        input: &TestInput,
        test_remote: bool,
        result: &mut ValidationResult,
    ) {
        let payload = match input.payload() {
            Ok(payload) => payload,
            Err(e) => {
                result
                    .errors
                    .push(ValidationError::system(format!("cannot serialize input: {e}")));
                return;
            }
        };

        let report = self.schemas.validate_input(&payload);
        result.input_valid = report.valid;
        if !report.valid {
            result
                .errors
                .extend(report.into_validation_errors(ErrorKind::InputValidation));
            return;
        }
        if !test_remote {
            return;
        }

        result.remote_called = true;
        let call = self.remote.call(&payload).await;
        result.performance.response_time_ms = Some(call.response_time_ms);

        let body = match call.outcome {
            Ok(body) => body,
            Err(failure) => {
                result.errors.push(failure.to_validation_error());
                return;
            }
        };

        let report = self.schemas.validate_output(&body);
        result.output_valid = report.valid;
        result
            .errors
            .extend(report.into_validation_errors(ErrorKind::OutputValidation));

        match serde_json::from_value::<TestOutput>(body.clone()) {
            Ok(output) => result.errors.extend(self.rules.validate(input, &output)),
            Err(e) => tracing::debug!("{}: business rules skipped: {e}", input.label()),
        }

        result.api_response = Some(body);
    }

    /// Validate a batch, recording every result into `ctx`
    pub async fn validate_batch(
        &self,
        inputs: &[TestInput],
        test_remote: bool,
        parallel: bool,
        ctx: &mut RunContext,
    ) -> BatchOutcome {
        let start = Instant::now();
        tracing::info!(
            "Starting {} batch of {} item(s) for run {} (remote: {test_remote})",
            if parallel { "parallel" } else { "sequential" },
            inputs.len(),
            ctx.run_name()
        );

        let results = if parallel {
            self.run_waves(inputs, test_remote, ctx).await
        } else {
            self.run_sequential(inputs, test_remote, ctx).await
        };

        let performance = BatchPerformance::compute(&results, elapsed_ms(start), test_remote);
        tracing::info!(
            "Batch finished in {}ms ({:.2} items/s)",
            performance.total_time_ms,
            performance.throughput_per_sec
        );
        BatchOutcome {
            results,
            performance,
        }
    }

    async fn run_sequential(
        &self,
        inputs: &[TestInput],
        test_remote: bool,
        ctx: &mut RunContext,
    ) -> Vec<ValidationResult> {
        let mut results = Vec::with_capacity(inputs.len());
        let mut progress = ProgressEvent::start(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            if i > 0 && test_remote && !self.config.call_delay.is_zero() {
                sleep(self.config.call_delay).await;
            }
            let result = self.validate_single(input, test_remote).await;
            ctx.record(&result);
            progress.advance(&result);
            results.push(result);
            self.report_progress(progress);
        }
        results
    }

    async fn run_waves(
        &self,
        inputs: &[TestInput],
        test_remote: bool,
        ctx: &mut RunContext,
    ) -> Vec<ValidationResult> {
        let mut results = Vec::with_capacity(inputs.len());
        let mut progress = ProgressEvent::start(inputs.len());
        let wave_size = self.config.wave_size.max(1);

        for (w, wave) in inputs.chunks(wave_size).enumerate() {
            if w > 0 && test_remote && !self.config.wave_delay.is_zero() {
                sleep(self.config.wave_delay).await;
            }
            tracing::debug!("Wave {} with {} item(s)", w + 1, wave.len());

            let wave_results = join_all(
                wave.iter()
                    .map(|input| self.validate_single(input, test_remote)),
            )
            .await;

            for result in wave_results {
                ctx.record(&result);
                progress.advance(&result);
                results.push(result);
                self.report_progress(progress);
            }
        }
        results
    }

    fn report_progress(&self, event: ProgressEvent) {
        if event.completed % self.config.progress_interval.max(1) != 0
            && event.completed != event.total
        {
            return;
        }

        tracing::info!(
            "Progress: {}/{} ({} passed, {} failed)",
            event.completed,
            event.total,
            event.passed,
            event.failed
        );
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is watching
            let _ = sender.send(event);
        }
    }
}

/// Flag items whose designed failure did not happen
fn check_expected_error(result: &mut ValidationResult) {
    let Some(expected) = result.input.meta.expected_error else {
        return;
    };
    if result.has_error_kind(expected) {
        return;
    }

    let actual: Vec<&str> = result.errors.iter().map(|e| e.kind.as_str()).collect();
    result.errors.push(ValidationError::business(
        BusinessRule::ExpectedErrorNotRaised,
        format!("expected a {expected} error, none was raised"),
        json!(expected),
        json!(actual),
    ));
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
