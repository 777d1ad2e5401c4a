use crate::element::output::check_output_path;
use crate::element::{ElementSpec, OutputElement};
use crate::error::ElementError;
use crate::value::Value;

/// Image artifact; accepts the raster and vector formats the viewer can
/// display.
#[derive(Debug, Clone)]
pub struct ImageOutput {
    spec: ElementSpec,
}

impl ImageOutput {
    pub fn new(spec: ElementSpec) -> ImageOutput {
        ImageOutput { spec }
    }
}

impl OutputElement for ImageOutput {
    fn spec(&self) -> &ElementSpec {
        &self.spec
    }

    fn kind(&self) -> &'static str {
        "ImageOutput"
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        check_output_path(self.spec.key(), value, &["jpg", "jpeg", "png", "svg"])
    }
}
