use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::value::{Value, ValueType};

/// Free text input with an optional character limit.
#[derive(Debug, Clone)]
pub struct TextInput {
    spec: InputSpec,
    max_chars: Option<usize>,
}

impl TextInput {
    pub fn new(spec: InputSpec) -> TextInput {
        TextInput {
            spec,
            max_chars: None,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> TextInput {
        self.max_chars = Some(max_chars);
        self
    }
}

impl InputElement for TextInput {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "TextInput"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        let Some(text) = value.as_text() else {
            return Err(ElementError::TypeMismatch {
                key: self.spec.key().to_string(),
                expected: ValueType::Text,
                found: value.clone(),
            });
        };
        if let Some(max) = self.max_chars {
            let chars = text.chars().count();
            if chars > max {
                return Err(ElementError::invalid(
                    self.spec.key(),
                    format!("Too many characters: {chars} > {max}"),
                ));
            }
        }
        Ok(())
    }

    fn descriptor(&self) -> serde_json::Value {
        let mut property = serde_json::json!({
            "type": "string",
            "title": self.spec.label(),
            "kind": self.kind(),
        });
        if let Some(max) = self.max_chars {
            property["maxLength"] = serde_json::json!(max);
        }
        property
    }
}
