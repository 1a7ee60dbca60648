//! IWV Scenario
//!
//! Synthetic strategic-planning inputs for the validation harness.
//!
//! # Core Concepts
//!
//! - [`IntentCategory`]: fixed taxonomy of strategic intents with template phrases
//! - [`ScenarioGenerator`]: single inputs, scheduled batches and named scenario families
//! - [`ScenarioType`]: the named families (`complexity_*`, `decision_counts`,
//!   `edge_cases`, `validation_tests`)
//!
//! # Example
//!
//! ```rust,ignore
//! use iwv_scenario::{ScenarioGenerator, ScenarioType};
//!
//! let mut generator = ScenarioGenerator::with_seed(42);
//! let batch = generator.generate_batch(20);
//! let edge_cases = generator.generate_scenarios(ScenarioType::EdgeCases);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod generator;
pub mod taxonomy;

pub use generator::{ScenarioError, ScenarioGenerator, ScenarioType};
pub use taxonomy::{IntentCategory, LOW_COMPLEXITY_KEYWORDS, MEDIUM_COMPLEXITY_KEYWORDS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
