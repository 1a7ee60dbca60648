//! Testing utilities for the IWV workspace
//!
//! A deterministic stand-in for the generation service plus response fixtures.

#![allow(missing_docs)]

use iwv_harness::{RemoteCall, RemoteFailure, RemoteSystem};
use iwv_model::{
    complexity_target, strip_test_metadata, DecisionKind, DecisionRecord, TestInput, TestOutput,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Injected misbehaviour of the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubFailure {
    /// Answer with a non-2xx status
    Status(u16),
    /// Fail at the transport layer
    Network,
    /// Answer with a body that is not a response object
    Malformed,
    /// Answer with exactly this many decisions, ignoring the request
    DecisionCount(usize),
    /// Tag every decision as unspecified
    Untyped,
    /// Declare one extra PIR decision in the summary
    InconsistentSummary,
}

/// Deterministic remote system
///
/// Answers with a conformant response: the requested decision count or the
/// complexity target, alternating PIR and FFIR, consistent summaries.
#[derive(Debug, Default)]
pub struct StubRemote {
    calls: AtomicUsize,
    failure: Option<StubFailure>,
    delay: Duration,
    payloads: Mutex<Vec<Value>>,
}

impl StubRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Misbehave on every call
    #[must_use]
    pub fn failing(failure: StubFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// Wait this long before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Payloads received, in arrival order
    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn respond(&self, payload: &Value) -> Result<Value, RemoteFailure> {
        match &self.failure {
            Some(StubFailure::Status(status)) => Err(RemoteFailure::Api {
                status: *status,
                reason: "stub failure".to_owned(),
            }),
            Some(StubFailure::Network) => {
                Err(RemoteFailure::Network("connection refused".to_owned()))
            }
            Some(StubFailure::Malformed) => Ok(Value::String("not a response".to_owned())),
            Some(StubFailure::DecisionCount(count)) => Ok(to_value(&conformant_output(*count))),
            Some(StubFailure::Untyped) => {
                let mut output = conformant_output(decision_count_for(payload));
                for decision in &mut output.decisions {
                    decision.kind = DecisionKind::Unspecified;
                }
                output.pir_workflow.summary.total_decisions = 0;
                output.ffir_workflow.summary.total_decisions = 0;
                Ok(to_value(&output))
            }
            Some(StubFailure::InconsistentSummary) => {
                let mut output = conformant_output(decision_count_for(payload));
                output.pir_workflow.summary.total_decisions += 1;
                Ok(to_value(&output))
            }
            None => Ok(to_value(&conformant_output(decision_count_for(payload)))),
        }
    }
}

#[async_trait::async_trait]
impl RemoteSystem for StubRemote {
    async fn call(&self, payload: &Value) -> RemoteCall {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.push(payload.clone());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let millis = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX);
        match self.respond(payload) {
            Ok(body) => RemoteCall::success(body, millis),
            Err(failure) => RemoteCall::failure(failure, millis),
        }
    }

    async fn probe(&self) -> Result<(), RemoteFailure> {
        match self.failure {
            Some(StubFailure::Network) => Err(RemoteFailure::Network("connection refused".to_owned())),
            _ => Ok(()),
        }
    }

    fn target(&self) -> String {
        "stub".to_owned()
    }
}

/// Decisions the stub produces for a payload
#[must_use]
pub fn decision_count_for(payload: &Value) -> usize {
    if let Some(count) = payload
        .get("requestedDecisionCount")
        .and_then(Value::as_u64)
        .and_then(|c| usize::try_from(c).ok())
    {
        return count;
    }
    match serde_json::from_value::<TestInput>(strip_test_metadata(payload)) {
        Ok(input) => complexity_target(input.complexity()),
        Err(_) => 3,
    }
}

/// Conformant response with `count` decisions alternating PIR and FFIR
#[must_use]
pub fn conformant_output(count: usize) -> TestOutput {
    let decisions: Vec<DecisionRecord> = (0..count)
        .map(|i| {
            let kind = if i % 2 == 0 {
                DecisionKind::Pir
            } else {
                DecisionKind::Ffir
            };
            let mut record = DecisionRecord::new(
                format!("decision-{}", i + 1),
                format!("Strategic question {}", i + 1),
                kind,
            );
            record.status = Some("pending".to_owned());
            record
        })
        .collect();

    let mut output = TestOutput {
        decisions,
        ..TestOutput::default()
    };
    let pirs = output.pir_count() as u64;
    let ffirs = output.ffir_count() as u64;
    output.pir_workflow.summary.total_decisions = pirs;
    output.pir_workflow.summary.total_pirs = pirs * 2;
    output.pir_workflow.summary.total_indicators = pirs * 4;
    output.ffir_workflow.summary.total_decisions = ffirs;
    output.ffir_workflow.summary.total_ffirs = ffirs * 2;
    output.ffir_workflow.summary.total_company_indicators = ffirs * 3;
    output
}

fn to_value(output: &TestOutput) -> Value {
    serde_json::to_value(output).unwrap_or(Value::Null)
}
