//! IWV Model
//!
//! Shared vocabulary of the intelligence-workflow validation harness.
//!
//! # Core Concepts
//!
//! - [`TestInput`]: a request payload under test, plus namespaced test-only metadata
//! - [`TestOutput`]: the generated decisions and the two workflow summaries
//! - [`DecisionRecord`] / [`DecisionKind`]: one decision point, PIR, FFIR or unspecified
//! - [`Complexity`]: keyword/length heuristic shared by generator and validator
//! - [`ValidationResult`] / [`ValidationError`]: per-item outcome with tagged errors
//!
//! # Example
//!
//! ```rust,ignore
//! use iwv_model::{TestInput, strip_test_metadata};
//!
//! let input = TestInput::new("Expand into the Nordic market")
//!     .with_requested_count(4)
//!     .with_test_id("batch_001");
//!
//! // Only contract fields reach the remote service
//! let payload = strip_test_metadata(&input.to_value()?);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod complexity;
mod input;
mod output;
mod result;

pub use complexity::{
    assess_complexity, complexity_target, Complexity, HIGH_COMPLEXITY_KEYWORDS,
    HIGH_COMPLEXITY_KEYWORD_THRESHOLD, HIGH_COMPLEXITY_LENGTH_THRESHOLD,
};
pub use input::{
    is_metadata_key, strip_test_metadata, TestInput, TestMetadata, METADATA_PREFIX,
};
pub use output::{
    DecisionKind, DecisionRecord, FfirSummary, FfirWorkflow, PirSummary, PirWorkflow, TestOutput,
};
pub use result::{
    BusinessRule, DefectOrigin, ErrorKind, Performance, ValidationError, ValidationResult,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
