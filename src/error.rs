//! Error types.

use thiserror::Error;

/// Errors produced while decoding a predictor descriptor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown predictor kind '{0}' (expected static, gshare, tournament, or custom)")]
    UnknownKind(String),

    #[error("{kind} expects {expected} (got {found} field(s))")]
    Arity {
        kind: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("{kind}: field '{field}' is not a non-negative integer: '{value}'")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{kind}: {field} = {value} is out of range ({range})")]
    OutOfRange {
        kind: &'static str,
        field: &'static str,
        value: u64,
        range: String,
    },
}

/// Errors produced while reading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed trace record at line {line}: {reason}: '{text}'")]
    Malformed {
        line: usize,
        reason: &'static str,
        text: String,
    },
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),
}
