use crate::element::output::check_output_path;
use crate::element::{ElementSpec, OutputElement};
use crate::error::ElementError;
use crate::value::Value;

/// Generic file artifact, any extension.
#[derive(Debug, Clone)]
pub struct FileOutput {
    spec: ElementSpec,
}

impl FileOutput {
    pub fn new(spec: ElementSpec) -> FileOutput {
        FileOutput { spec }
    }
}

impl OutputElement for FileOutput {
    fn spec(&self) -> &ElementSpec {
        &self.spec
    }

    fn kind(&self) -> &'static str {
        "FileOutput"
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        check_output_path(self.spec.key(), value, &[])
    }
}
