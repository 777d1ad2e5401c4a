use serde::{Deserialize, Serialize};
use std::fmt;

/// The process-wide execution mode every element dispatches on.
///
/// The set of built-in modes is closed, but dispatch is extensible: a tag
/// with no built-in meaning lands in [`Mode::Custom`] and is routed to the
/// element's `custom_mode` hook, so derived element types can add modes
/// without touching the core. An unhandled custom tag is a hard error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    /// Hand the element back untouched, for interactive exploration.
    #[default]
    Introspect,
    /// Resolve, validate and record element values; write outputs.
    Execute,
    /// Like `Execute`, but previously loaded parameter values overwrite
    /// element defaults before resolution.
    ReplayThenExecute,
    /// Dump `key -> default value` pairs without validation.
    ExtractValues,
    /// Dump the full per-element descriptor (kind, label, count, ...).
    ExtractAll,
    /// Emit a JSON-schema style descriptor for external form generation.
    BuildDescriptor,
    /// A third-party mode tag, dispatched by name.
    Custom(String),
}

impl Mode {
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Introspect => "introspect",
            Mode::Execute => "execute",
            Mode::ReplayThenExecute => "replay_then_execute",
            Mode::ExtractValues => "extract_values",
            Mode::ExtractAll => "extract_all",
            Mode::BuildDescriptor => "build_descriptor",
            Mode::Custom(tag) => tag,
        }
    }
}

impl From<&str> for Mode {
    fn from(tag: &str) -> Self {
        match tag {
            "introspect" => Mode::Introspect,
            "execute" => Mode::Execute,
            "replay_then_execute" => Mode::ReplayThenExecute,
            "extract_values" => Mode::ExtractValues,
            "extract_all" => Mode::ExtractAll,
            "build_descriptor" => Mode::BuildDescriptor,
            other => Mode::Custom(other.to_string()),
        }
    }
}

impl From<String> for Mode {
    fn from(tag: String) -> Self {
        Mode::from(tag.as_str())
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
