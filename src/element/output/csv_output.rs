use crate::element::output::check_output_path;
use crate::element::{ElementSpec, OutputElement};
use crate::error::ElementError;
use crate::value::Value;

/// CSV artifact, `.csv` only.
#[derive(Debug, Clone)]
pub struct CsvOutput {
    spec: ElementSpec,
}

impl CsvOutput {
    pub fn new(spec: ElementSpec) -> CsvOutput {
        CsvOutput { spec }
    }
}

impl OutputElement for CsvOutput {
    fn spec(&self) -> &ElementSpec {
        &self.spec
    }

    fn kind(&self) -> &'static str {
        "CsvOutput"
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        check_output_path(self.spec.key(), value, &["csv"])
    }
}
