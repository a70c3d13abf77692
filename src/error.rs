use thiserror::Error;

/// Errors raised while converting units or evaluating a formula.
///
/// Every variant is scoped to a single evaluation attempt; the caller reports
/// the message and keeps its previous state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    /// No entry for the ordered `(from, to)` pair in the conversion table.
    #[error("Unsupported unit conversion: {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    /// The formula references a symbol with no supplied test value.
    #[error("Missing value for parameter: {0}")]
    MissingParameter(String),

    /// The substituted expression could not be parsed.
    #[error("Malformed expression: {0}")]
    Malformed(String),

    /// Evaluation produced infinity or NaN (e.g. division by zero).
    #[error("Result is not a finite number")]
    NonFinite,
}

/// Errors returned by a calculator store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored document exists but one of its fields has the wrong shape.
    #[error("Malformed calculator document {id}: {reason}")]
    Malformed { id: String, reason: String },
}

/// Required fields left blank at submit time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

/// Failure of an editor submit: either the form was rejected locally or the
/// store call failed.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

/// A list filter name that is not one of `all`, `popular` or `recent`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter '{0}'")]
    Unknown(String),
}

/// Configuration problems detected at process start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown store kind '{0}' (expected 'file' or 'memory')")]
    UnknownStore(String),

    #[error("Invalid bind address '{0}'")]
    InvalidBindAddr(String),
}
