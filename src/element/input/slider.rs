use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::value::{Value, ValueType};

/// Bounded numeric input. The range is validated at construction, the
/// value against the range on every execute-style dispatch.
#[derive(Debug, Clone)]
pub struct Slider {
    spec: InputSpec,
    min: f64,
    max: f64,
    step: f64,
}

impl Slider {
    pub fn new(spec: InputSpec) -> Slider {
        Slider {
            spec,
            min: 0.0,
            max: 100.0,
            step: 1.0,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Result<Slider, ElementError> {
        if min > max {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("Minimum cannot be greater than maximum: {min} > {max}"),
            ));
        }
        self.min = min;
        self.max = max;
        Ok(self)
    }

    pub fn with_step(mut self, step: f64) -> Result<Slider, ElementError> {
        if step <= 0.0 {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("Step must be a positive number: {step}"),
            ));
        }
        self.step = step;
        Ok(self)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl InputElement for Slider {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "Slider"
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
        if n < self.min {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("Value lower than minimum: {n} < {}", self.min),
            ));
        }
        if n > self.max {
            return Err(ElementError::invalid(
                self.spec.key(),
                format!("Value greater than maximum: {n} > {}", self.max),
            ));
        }
        Ok(())
    }

    fn descriptor(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "number",
            "title": self.spec.label(),
            "kind": self.kind(),
            "minimum": self.min,
            "maximum": self.max,
            "multipleOf": self.step,
        })
    }
}
