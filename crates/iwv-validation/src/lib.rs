//! IWV Validation
//!
//! Two-layer validation of intelligence workflows:
//! 1. **Schema conformance**: request and response contracts as JSON Schema
//! 2. **Business rules**: semantic invariants across the (input, output) pair
//!
//! Failures are returned as structured error lists, never raised.
//!
//! # Example
//!
//! ```rust,ignore
//! use iwv_validation::{BusinessRuleValidator, SchemaValidator};
//!
//! let schemas = SchemaValidator::embedded()?;
//! let report = schemas.validate_input(&input.payload()?);
//!
//! let output: TestOutput = serde_json::from_value(body)?;
//! let violations = BusinessRuleValidator::new().validate(&input, &output);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod rules;
pub mod schema;

pub use error::SchemaError;
pub use rules::{BusinessRuleValidator, RuleConfig};
pub use schema::{SchemaKind, SchemaReport, SchemaValidator, SchemaViolation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
