use crate::element::output::check_output_path;
use crate::element::{ElementSpec, OutputElement};
use crate::error::ElementError;
use crate::value::Value;

/// Plain-text artifact.
#[derive(Debug, Clone)]
pub struct TextOutput {
    spec: ElementSpec,
}

impl TextOutput {
    pub fn new(spec: ElementSpec) -> TextOutput {
        TextOutput { spec }
    }
}

impl OutputElement for TextOutput {
    fn spec(&self) -> &ElementSpec {
        &self.spec
    }

    fn kind(&self) -> &'static str {
        "TextOutput"
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        check_output_path(self.spec.key(), value, &["txt", "md", "log"])
    }
}
