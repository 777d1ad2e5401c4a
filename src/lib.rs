//! # Keiro - Parameter Definition and Flow Orchestration
//!
//! **Keiro** turns a pipeline's parameters and artifacts into declarative
//! *elements* whose runtime behavior is selected by the active [`Mode`]:
//! the same element definitions execute with real values, replay a
//! recorded run, extract their defaults and metadata, or describe
//! themselves as a JSON schema, without the pipeline code changing.
//!
//! ## Core Workflow
//!
//! 1. **Declare elements**: wrap each tunable parameter in an input
//!    element ([`Slider`](element::input::Slider),
//!    [`Dropdown`](element::input::Dropdown), ...) and each produced
//!    artifact in an output element
//!    ([`FileOutput`](element::output::FileOutput), ...). Attributes like
//!    `count` and `optional` may be dynamic expressions over other keys
//!    (`"len($files$)"`, `"$threshold$ > 0.5"`).
//! 2. **Assemble flows**: list the element call sites as
//!    [`Statement`](runner::Statement)s of a
//!    [`FlowProgram`](runner::FlowProgram), dependencies first.
//! 3. **Pick a mode and run**: [`execute`](runner::execute),
//!    [`replay`](runner::replay), [`extract_values`](runner::extract_values),
//!    [`extract_metadata`](runner::extract_metadata) and
//!    [`build_descriptor`](runner::build_descriptor) each run the same
//!    programs against a [`Project`] in the matching mode.
//!
//! Output elements append their resolved attributes to a per-flow,
//! lock-protected `MANIFEST.txt` under the project's output directory, so
//! concurrent flows can record artifacts safely.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//!
//! fn main() -> keiro::prelude::Result<()> {
//!     let mut project = Project::new()?;
//!
//!     let threshold = Slider::new(InputSpec::new("threshold", Value::from(0.5))?)
//!         .with_range(0.0, 1.0)?;
//!     let report = FileOutput::new(ElementSpec::new("report", Value::from("report.json"))?);
//!
//!     let mut programs = vec![
//!         FlowProgram::new("Quality check")
//!             .with_statement(Statement::input("run", threshold))
//!             .with_statement(Statement::output("run", report)),
//!     ];
//!
//!     // Extract the defaults, persist them, replay them later:
//!     let defaults = extract_values(&mut project, &mut programs)?;
//!     write_parameters(std::path::Path::new("parameters.json"), &defaults)?;
//!
//!     let values = replay(
//!         &mut project,
//!         std::path::Path::new("parameters.json"),
//!         &mut programs,
//!     )?;
//!     println!("{values:?}");
//!     Ok(())
//! }
//! ```

pub mod element;
pub mod error;
pub mod expr;
pub mod flow;
pub mod manifest;
pub mod mode;
pub mod prelude;
pub mod project;
pub mod runner;
pub mod slug;
pub mod value;

pub use mode::Mode;
pub use project::Project;
pub use value::Value;
