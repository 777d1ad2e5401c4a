//! Common test utilities for building projects and flow programs.
use keiro::prelude::*;
use tempfile::TempDir;

/// A project rooted in a fresh temporary directory. The directory handle
/// must outlive the project or the data root disappears.
#[allow(dead_code)]
pub fn test_project() -> (TempDir, Project) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let mut project = Project::new().expect("failed to create project");
    project
        .set_data_root(dir.path())
        .expect("failed to set data root");
    (dir, project)
}

/// A slider over `0..=100` with the given default.
#[allow(dead_code)]
pub fn slider(key: &str, value: f64) -> Slider {
    Slider::new(InputSpec::new(key, Value::from(value)).expect("valid spec"))
        .with_range(0.0, 100.0)
        .expect("valid range")
}

/// A small flow with two inputs and one file output.
///
/// Identifier: `quality_check`.
#[allow(dead_code)]
pub fn sample_program() -> FlowProgram {
    let label = TextInput::new(
        InputSpec::new("Run label", Value::from("nightly"))
            .expect("valid spec")
            .with_optional(true),
    );
    FlowProgram::new("Quality check")
        .with_statement(Statement::input("run", slider("threshold", 42.0)))
        .with_statement(Statement::input("run", label))
        .with_statement(Statement::output(
            "run",
            FileOutput::new(
                ElementSpec::new("report", Value::from("report.json")).expect("valid spec"),
            ),
        ))
}
