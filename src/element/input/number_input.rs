use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::value::{Value, ValueType};

/// Free numeric input with optional bounds.
#[derive(Debug, Clone)]
pub struct NumberInput {
    spec: InputSpec,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberInput {
    pub fn new(spec: InputSpec) -> NumberInput {
        NumberInput {
            spec,
            min: None,
            max: None,
        }
    }

    pub fn with_min(mut self, min: f64) -> NumberInput {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> NumberInput {
        self.max = Some(max);
        self
    }
}

impl InputElement for NumberInput {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "NumberInput"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Number
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        let Some(n) = value.as_number() else {
            return Err(ElementError::TypeMismatch {
                key: self.spec.key().to_string(),
                expected: ValueType::Number,
                found: value.clone(),
            });
        };
        if let Some(min) = self.min
            && n < min
        {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("Value lower than minimum: {n} < {min}"),
            ));
        }
        if let Some(max) = self.max
            && n > max
        {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("Value greater than maximum: {n} > {max}"),
            ));
        }
        Ok(())
    }

    fn descriptor(&self) -> serde_json::Value {
        let mut property = serde_json::json!({
            "type": "number",
            "title": self.spec.label(),
            "kind": self.kind(),
        });
        if let Some(min) = self.min {
            property["minimum"] = serde_json::json!(min);
        }
        if let Some(max) = self.max {
            property["maximum"] = serde_json::json!(max);
        }
        property
    }
}
