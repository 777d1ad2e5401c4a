use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::expr::Options;
use crate::value::{Value, ValueType};
use std::collections::BTreeSet;

/// Single choice rendered as a radio group.
#[derive(Debug, Clone)]
pub struct RadioButton {
    spec: InputSpec,
    options: Options,
    horizontal: bool,
}

impl RadioButton {
    pub fn new(spec: InputSpec, options: Options) -> RadioButton {
        RadioButton {
            spec,
            options,
            horizontal: false,
        }
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> RadioButton {
        self.horizontal = horizontal;
        self
    }
}

impl InputElement for RadioButton {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "RadioButton"
    }

    fn value_type(&self) -> ValueType {
        ValueType::text_or_number()
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        let Options::Fixed(choices) = &self.options else {
            return Ok(());
        };
        if choices.contains(value) {
            Ok(())
        } else {
            Err(ElementError::invalid(
                self.spec.key(),
                format!("Not a valid choice: {value}"),
            ))
        }
    }

    fn dependencies(&self) -> BTreeSet<String> {
        let mut keys = self.spec.expression_keys();
        self.options.referenced_keys(&mut keys);
        keys
    }

    fn descriptor(&self) -> serde_json::Value {
        let mut property = serde_json::json!({
            "type": "string",
            "title": self.spec.label(),
            "kind": self.kind(),
            "horizontal": self.horizontal,
        });
        if let Options::Fixed(choices) = &self.options {
            property["enum"] =
                serde_json::Value::Array(choices.iter().map(Value::to_json).collect());
        }
        property
    }
}
