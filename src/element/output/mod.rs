//! Built-in output elements.
//!
//! Outputs declare artifacts a flow produces. Under execute-style modes
//! their resolved path and attributes are appended to the flow manifest;
//! they contribute nothing to value extraction.

mod csv_output;
mod file_output;
mod image_output;
mod text_output;

pub use csv_output::CsvOutput;
pub use file_output::FileOutput;
pub use image_output::ImageOutput;
pub use text_output::TextOutput;

use crate::error::ElementError;
use crate::value::Value;
use std::path::Path;

/// Shared path validation: non-empty text with an allowed extension.
/// An empty allow-list accepts any extension.
fn check_output_path(key: &str, value: &Value, allowed: &[&str]) -> Result<(), ElementError> {
    let Some(text) = value.as_text() else {
        return Err(ElementError::invalid(
            key,
            format!("Expected a file path, got: {value}"),
        ));
    };
    if text.is_empty() {
        return Err(ElementError::invalid(key, "Output path cannot be empty"));
    }
    if allowed.is_empty() {
        return Ok(());
    }
    let ext = Path::new(text)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if ext.is_some_and(|e| allowed.contains(&e.as_str())) {
        Ok(())
    } else {
        Err(ElementError::invalid(
            key,
            format!(
                "Invalid file extension for {text}, expected one of: {}",
                allowed.join(", ")
            ),
        ))
    }
}
