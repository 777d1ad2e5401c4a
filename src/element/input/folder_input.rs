use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::project::Project;
use crate::value::{Value, ValueType};
use std::path::Path;

/// Path to an existing directory, resolved against the data root.
#[derive(Debug, Clone)]
pub struct FolderInput {
    spec: InputSpec,
}

impl FolderInput {
    pub fn new(spec: InputSpec) -> FolderInput {
        FolderInput { spec }
    }
}

impl InputElement for FolderInput {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "FolderInput"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn resolve(&self, project: &Project) -> Result<Value, ElementError> {
        match self.spec.raw_value() {
            Value::Text(path) => Ok(Value::Text(
                project.get_input_path(path).to_string_lossy().into_owned(),
            )),
            other => Ok(other.clone()),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        let Some(text) = value.as_text() else {
            return Err(ElementError::TypeMismatch {
                key: self.spec.key().to_string(),
                expected: ValueType::Text,
                found: value.clone(),
            });
        };
        if !Path::new(text).is_dir() {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("Folder does not exist: {text}"),
            ));
        }
        Ok(())
    }
}
