//! Error types for schema loading
//!
//! Validation failures are never errors; these cover the schema documents
//! themselves:
//! - Reading a schema file
//! - Parsing it as JSON
//! - Compiling it into a validator

use crate::schema::SchemaKind;
use std::path::PathBuf;

/// Errors while loading or compiling schema documents
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON
    #[error("invalid json in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Document is not a usable JSON Schema
    #[error("{kind} schema does not compile: {message}")]
    Compile { kind: SchemaKind, message: String },
}

impl SchemaError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create compile error
    pub fn compile_error(kind: SchemaKind, message: impl Into<String>) -> Self {
        Self::Compile {
            kind,
            message: message.into(),
        }
    }
}
