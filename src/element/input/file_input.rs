use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::project::Project;
use crate::value::{Value, ValueType};
use std::path::Path;

/// Path to one or more existing files under the project data root.
///
/// Relative paths resolve against the data root at dispatch time; absolute
/// paths pass through untouched. With a `count` the raw value is a list of
/// paths, each resolved and checked individually.
#[derive(Debug, Clone)]
pub struct FileInput {
    spec: InputSpec,
    extensions: Vec<String>,
}

impl FileInput {
    pub fn new(spec: InputSpec) -> FileInput {
        FileInput {
            spec,
            extensions: Vec::new(),
        }
    }

    /// Restricts accepted files to the given extensions (without the dot,
    /// case-insensitive).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> FileInput
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().to_ascii_lowercase())
            .collect();
        self
    }

    fn check_path(&self, value: &Value) -> Result<(), ElementError> {
        let Some(text) = value.as_text() else {
            return Err(ElementError::TypeMismatch {
                key: self.spec.key().to_string(),
                expected: ValueType::Text,
                found: value.clone(),
            });
        };
        let path = Path::new(text);
        if !path.is_file() {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("File does not exist: {text}"),
            ));
        }
        if !self.extensions.is_empty() {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            if !ext.is_some_and(|e| self.extensions.contains(&e)) {
                return Err(ElementError::invalid(
                    self.spec.key(),
                    format!(
                        "Invalid file extension for {text}, expected one of: {}",
                        self.extensions.join(", ")
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl InputElement for FileInput {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "FileInput"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn resolve(&self, project: &Project) -> Result<Value, ElementError> {
        let resolve_one = |value: &Value| match value {
            Value::Text(path) => Value::Text(
                project.get_input_path(path).to_string_lossy().into_owned(),
            ),
            other => other.clone(),
        };
        match self.spec.raw_value() {
            Value::List(items) => Ok(Value::List(items.iter().map(resolve_one).collect())),
            other => Ok(resolve_one(other)),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        self.check_path(value)
    }

    fn descriptor(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "string",
            "title": self.spec.label(),
            "kind": self.kind(),
            "extensions": self.extensions,
        })
    }
}
