use crate::value::{Value, ValueType};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing or validating an element.
///
/// Validation messages are prefixed with the offending key in brackets so a
/// failing parameter can be identified straight from the error text.
#[derive(Error, Debug, Clone)]
pub enum ElementError {
    #[error("Key cannot be empty")]
    EmptyKey,

    #[error("Keys starting with \"_\" are reserved: {0}")]
    ReservedKey(String),

    #[error("The following metadata names are reserved: {}", .0.join(", "))]
    ReservedMetadata(Vec<String>),

    #[error("[{key}] Value is required: none provided")]
    ValueRequired { key: String },

    #[error("[{key}] Invalid value type for {found}, expected: {expected}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        found: Value,
    },

    #[error("[{key}] Invalid value {found}, expected: list[{expected}]")]
    ListExpected {
        key: String,
        expected: ValueType,
        found: Value,
    },

    #[error("[{key}] {message}")]
    Invalid { key: String, message: String },

    #[error("Unknown Project mode {0}")]
    UnknownMode(String),

    #[error(transparent)]
    Expr(#[from] ExprError),
}

impl ElementError {
    /// Domain-violation error carrying the element key prefix.
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ElementError::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors from parsing or evaluating a dynamic expression.
#[derive(Error, Debug, Clone)]
pub enum ExprError {
    #[error("Failed to parse expression '{text}': {message} (offset {offset})")]
    Parse {
        text: String,
        message: String,
        offset: usize,
    },

    #[error("Unknown function '{0}' (allowed: len, abs, min, max)")]
    UnknownFunction(String),

    #[error("Key '{0}' not found in the project data")]
    KeyNotFound(String),

    #[error("Field '{field}' not found on the value of '{key}'")]
    FieldNotFound { key: String, field: String },

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Count expression must resolve to a non-negative whole number, got '{0}'")]
    InvalidCount(Value),

    #[error("Condition expression must resolve to a boolean, got '{0}'")]
    InvalidCondition(Value),

    #[error("Options expression must resolve to a list, got '{0}'")]
    InvalidOptions(Value),
}

/// Configuration and state errors from the [`Project`](crate::Project)
/// context. These are programming or environment mistakes, never retried.
#[derive(Error, Debug, Clone)]
pub enum ProjectError {
    #[error("Invalid data path: {0}")]
    InvalidDataPath(PathBuf),

    #[error("Key cannot be empty")]
    EmptyDataKey,

    #[error("Config key not found: {0}")]
    ConfigKeyNotFound(String),

    #[error("Invalid element name: {0} must be of form \"<module>.<TypeName>\"")]
    InvalidElementName(String),

    #[error("Invalid element name: {0} must not be snake case")]
    SnakeCaseElementName(String),

    #[error("Failed to read parameter file {path}: {message}")]
    ParameterFile { path: PathBuf, message: String },
}

/// Errors from the append-only manifest writer.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("No flow is currently running: cannot derive a manifest path")]
    NoActiveFlow,

    #[error("Could not acquire the manifest lock at {path} within {timeout_secs}s")]
    LockTimeout { path: PathBuf, timeout_secs: u64 },

    #[error("Manifest I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode manifest entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from reading or updating the flow configuration file.
#[derive(Error, Debug)]
pub enum FlowConfigError {
    #[error("Empty flow name")]
    EmptyName,

    #[error("Flow {0} is already registered, please pick another name")]
    Duplicate(String),

    #[error("Failed to read flow config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write flow config {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Umbrella error for running flow programs through the evaluator.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Element(#[from] ElementError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Flow '{flow}' cannot carry the same name as a parameter key")]
    FlowKeyCollision { flow: String },
}

impl From<ExprError> for RunError {
    fn from(err: ExprError) -> Self {
        RunError::Element(ElementError::Expr(err))
    }
}
