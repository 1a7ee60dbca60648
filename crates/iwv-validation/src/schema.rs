//! Structural validation against the request and response contracts
//!
//! Both contracts are standard JSON Schema (draft 7) documents, compiled once
//! and reused. Violations come back as data, one entry per failing keyword,
//! carrying the field pointer, the offending value and the schema fragment
//! that rejected it.

use crate::error::SchemaError;
use iwv_model::{ErrorKind, ValidationError};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::fmt;
use std::path::Path;

const EMBEDDED_INPUT_SCHEMA: &str = include_str!("../schemas/input.schema.json");
const EMBEDDED_OUTPUT_SCHEMA: &str = include_str!("../schemas/output.schema.json");

/// Which contract a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Request contract
    Input,
    /// Response contract
    Output,
}

impl SchemaKind {
    /// File name used when loading from a directory
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Input => "input.schema.json",
            Self::Output => "output.schema.json",
        }
    }

    /// Error kind reported for violations of this contract
    #[inline]
    #[must_use]
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::Input => ErrorKind::InputValidation,
            Self::Output => ErrorKind::OutputValidation,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// One failing schema keyword
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// JSON pointer of the failing instance location, `/` for the root
    pub field: String,
    pub message: String,
    /// Value found at `field`
    pub value: Value,
    /// Subschema that rejected the value
    pub schema: Option<Value>,
}

/// Outcome of validating one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<SchemaViolation>,
}

impl SchemaReport {
    /// Convert violations into tagged validation errors
    #[must_use]
    pub fn into_validation_errors(self, kind: ErrorKind) -> Vec<ValidationError> {
        self.errors
            .into_iter()
            .map(|v| ValidationError::schema_violation(kind, v.field, v.message, v.value, v.schema))
            .collect()
    }
}

/// A compiled schema together with its source document
struct CompiledSchema {
    raw: Value,
    compiled: JSONSchema,
}

impl CompiledSchema {
    fn compile(kind: SchemaKind, raw: Value) -> Result<Self, SchemaError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&raw)
            .map_err(|e| SchemaError::compile_error(kind, e.to_string()))?;
        Ok(Self { raw, compiled })
    }

    fn validate(&self, candidate: &Value) -> SchemaReport {
        let errors: Vec<SchemaViolation> = match self.compiled.validate(candidate) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| {
                    let field = error.instance_path.to_string();
                    let schema_path = error.schema_path.to_string();
                    SchemaViolation {
                        field: if field.is_empty() { "/".to_owned() } else { field },
                        message: error.to_string(),
                        value: error.instance.clone().into_owned(),
                        schema: self.fragment(&schema_path),
                    }
                })
                .collect(),
        };

        SchemaReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Subschema owning the keyword at `schema_path`
    ///
    /// Keywords of the root schema resolve to the keyword value itself so the
    /// whole document is not copied into every error.
    fn fragment(&self, schema_path: &str) -> Option<Value> {
        let parent = schema_path.rsplit_once('/').map_or("", |(parent, _)| parent);
        let pointer = if parent.is_empty() { schema_path } else { parent };
        self.raw.pointer(pointer).cloned()
    }
}

/// Validator for the request and response contracts
pub struct SchemaValidator {
    input: CompiledSchema,
    output: CompiledSchema,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("input", &self.input.raw.get("title"))
            .field("output", &self.output.raw.get("title"))
            .finish()
    }
}

impl SchemaValidator {
    /// Compile validators from two schema documents
    ///
    /// # Errors
    /// `SchemaError::Compile` if either document is not a valid schema.
    pub fn from_documents(input: Value, output: Value) -> Result<Self, SchemaError> {
        Ok(Self {
            input: CompiledSchema::compile(SchemaKind::Input, input)?,
            output: CompiledSchema::compile(SchemaKind::Output, output)?,
        })
    }

    /// Validators built from the schemas shipped with this crate
    ///
    /// # Errors
    /// Only if the embedded documents are broken.
    pub fn embedded() -> Result<Self, SchemaError> {
        let input = parse_document(Path::new(SchemaKind::Input.file_name()), EMBEDDED_INPUT_SCHEMA)?;
        let output =
            parse_document(Path::new(SchemaKind::Output.file_name()), EMBEDDED_OUTPUT_SCHEMA)?;
        Self::from_documents(input, output)
    }

    /// Load `input.schema.json` and `output.schema.json` from a directory
    ///
    /// # Errors
    /// IO, JSON or compile errors for either document.
    pub fn from_dir(dir: &Path) -> Result<Self, SchemaError> {
        let input = load_document(&dir.join(SchemaKind::Input.file_name()))?;
        let output = load_document(&dir.join(SchemaKind::Output.file_name()))?;
        tracing::debug!("Loaded schemas from {}", dir.display());
        Self::from_documents(input, output)
    }

    /// Validate a request payload (metadata already stripped)
    #[must_use]
    pub fn validate_input(&self, candidate: &Value) -> SchemaReport {
        self.input.validate(candidate)
    }

    /// Validate a response body
    #[must_use]
    pub fn validate_output(&self, candidate: &Value) -> SchemaReport {
        self.output.validate(candidate)
    }

    /// Validate against either contract
    #[must_use]
    pub fn validate(&self, kind: SchemaKind, candidate: &Value) -> SchemaReport {
        match kind {
            SchemaKind::Input => self.validate_input(candidate),
            SchemaKind::Output => self.validate_output(candidate),
        }
    }

    /// Source document of a contract
    #[must_use]
    pub fn document(&self, kind: SchemaKind) -> &Value {
        match kind {
            SchemaKind::Input => &self.input.raw,
            SchemaKind::Output => &self.output.raw,
        }
    }
}

fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|e| SchemaError::io_error(path, e))?;
    parse_document(path, &text)
}

fn parse_document(path: &Path, text: &str) -> Result<Value, SchemaError> {
    serde_json::from_str(text).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
