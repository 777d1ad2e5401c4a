//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and traits from the keiro
//! crate. Import this module to define and run flows without having to
//! import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let mut project = Project::new()?;
//!
//! let slider = Slider::new(InputSpec::new("threshold", Value::from(0.5))?)
//!     .with_range(0.0, 1.0)?
//!     .with_step(0.05)?;
//!
//! let mut programs = vec![
//!     FlowProgram::new("Quality check")
//!         .with_statement(Statement::input("run", slider))
//!         .with_statement(Statement::output(
//!             "run",
//!             FileOutput::new(ElementSpec::new("report", Value::from("report.json"))?),
//!         )),
//! ];
//!
//! let values = execute(&mut project, &mut programs)?;
//! println!("Resolved values: {values:?}");
//! # Ok(())
//! # }
//! ```

// Project context and modes
pub use crate::mode::Mode;
pub use crate::project::Project;

// Element contracts and built-ins
pub use crate::element::input::{
    Checkbox, CsvReader, Dropdown, FileInput, FolderInput, NumberInput, RadioButton, Slider,
    TextInput,
};
pub use crate::element::output::{CsvOutput, FileOutput, ImageOutput, TextOutput};
pub use crate::element::{
    ElementSpec, InputElement, InputSpec, Outcome, OutputElement, dispatch_input, dispatch_output,
};

// Values and expressions
pub use crate::expr::{Condition, Count, Options};
pub use crate::value::{Value, ValueType};

// Flow evaluation
pub use crate::runner::{
    FlowProgram, FlowRun, Runner, Statement, build_descriptor, execute, extract_metadata,
    extract_values, replay, write_parameters,
};

// Manifest access
pub use crate::manifest::{ManifestEntry, read_manifest};

// Error types
pub use crate::error::{ElementError, ExprError, ManifestError, ProjectError, RunError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RunError>;
