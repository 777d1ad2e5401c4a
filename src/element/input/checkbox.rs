use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::value::{Value, ValueType};

/// Boolean toggle. The type check is the whole validation.
#[derive(Debug, Clone)]
pub struct Checkbox {
    spec: InputSpec,
}

impl Checkbox {
    pub fn new(spec: InputSpec) -> Checkbox {
        Checkbox { spec }
    }
}

impl InputElement for Checkbox {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "Checkbox"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Bool
    }

    fn validate(&self, _value: &Value) -> Result<(), ElementError> {
        Ok(())
    }
}
