//! IWV Harness
//!
//! Rate-limited batch testing of the intelligence-workflow generation service.
//!
//! # Architecture
//!
//! ```text
//! ScenarioGenerator → BatchExecutor ─┬─ SchemaValidator (input)
//!                                    ├─ RemoteSystem (HTTP or stub)
//!                                    ├─ SchemaValidator (output)
//!                                    └─ BusinessRuleValidator
//!                          │
//!                          ▼
//!                     RunContext → RunSummary → FailureReporter
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use iwv_harness::{HarnessConfig, Runner, TestProfile};
//!
//! let mut runner = Runner::from_config(HarnessConfig::load(None)?)?;
//! let report = runner.run_profile(TestProfile::Quick).await;
//! println!("{}", report.render_text());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod profile;
pub mod report;
pub mod runner;
pub mod stats;

pub use client::{HttpRemoteClient, RemoteCall, RemoteFailure, RemoteSystem};
pub use config::{HarnessConfig, LogFormat};
pub use error::{ConfigError, HarnessError, HarnessResult, ReportError};
pub use executor::{BatchExecutor, BatchOutcome, BatchPerformance, ExecutorConfig, ProgressEvent};
pub use profile::TestProfile;
pub use report::{FailureDetail, FailureReport, FailureReporter, ResponseDigest};
pub use runner::{HealthCheck, HealthReport, RunReport, Runner};
pub use stats::{ResponseTimeStats, RunContext, RunStatistics, RunSummary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
