use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::expr::Options;
use crate::value::{Value, ValueType};
use std::collections::BTreeSet;

/// Single- or multi-select over a fixed or dynamic list of choices.
///
/// Membership can only be enforced against fixed choices; dynamic options
/// are resolved by the caller at display time and skip validation.
#[derive(Debug, Clone)]
pub struct Dropdown {
    spec: InputSpec,
    options: Options,
    multiple: bool,
}

impl Dropdown {
    pub fn new(spec: InputSpec, options: Options) -> Dropdown {
        Dropdown {
            spec,
            options,
            multiple: false,
        }
    }

    pub fn with_multiple(mut self, multiple: bool) -> Dropdown {
        self.multiple = multiple;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    fn check_choice(&self, value: &Value) -> Result<(), ElementError> {
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
}

impl InputElement for Dropdown {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "Dropdown"
    }

    fn value_type(&self) -> ValueType {
        if self.multiple {
            ValueType::List(Box::new(ValueType::text_or_number()))
        } else {
            ValueType::text_or_number()
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        match value {
            Value::List(items) => items.iter().try_for_each(|item| self.check_choice(item)),
            other => self.check_choice(other),
        }
    }

    fn dependencies(&self) -> BTreeSet<String> {
        let mut keys = self.spec.expression_keys();
        self.options.referenced_keys(&mut keys);
        keys
    }

    fn descriptor(&self) -> serde_json::Value {
        let mut property = serde_json::json!({
            "title": self.spec.label(),
            "kind": self.kind(),
            "multiple": self.multiple,
        });
        property["type"] = serde_json::json!(if self.multiple { "array" } else { "string" });
        match &self.options {
            Options::Fixed(choices) => {
                property["enum"] =
                    serde_json::Value::Array(choices.iter().map(Value::to_json).collect());
            }
            Options::Dynamic { source, .. } => {
                property["optionsExpression"] = serde_json::json!(source);
            }
        }
        property
    }
}
