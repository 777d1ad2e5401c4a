//! Statement evaluation and per-mode aggregation.
//!
//! A [`FlowProgram`] is an ordered list of element statements, typically
//! produced by an external extractor walking a pipeline's call graph. The
//! [`Runner`] walks the statements in order under the project's active
//! mode and aggregates what each dispatch contributes. Ordering matters:
//! a statement whose expressions reference `$key$` must come after the
//! statement declaring that key.

use crate::element::{InputElement, Outcome, OutputElement, dispatch_input, dispatch_output};
use crate::error::{ProjectError, RunError};
use crate::mode::Mode;
use crate::project::Project;
use crate::slug::slug;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// The element call a statement wraps.
#[derive(Debug)]
pub enum Call {
    Input(Box<dyn InputElement>),
    Output(Box<dyn OutputElement>),
}

/// One element call site, tagged with the name of the function it was
/// lifted from.
#[derive(Debug)]
pub struct Statement {
    pub func: String,
    pub call: Call,
}

impl Statement {
    pub fn input(func: impl Into<String>, element: impl InputElement + 'static) -> Statement {
        Statement {
            func: func.into(),
            call: Call::Input(Box::new(element)),
        }
    }

    pub fn output(func: impl Into<String>, element: impl OutputElement + 'static) -> Statement {
        Statement {
            func: func.into(),
            call: Call::Output(Box::new(element)),
        }
    }

    pub fn key(&self) -> &str {
        match &self.call {
            Call::Input(element) => element.spec().key(),
            Call::Output(element) => element.spec().key(),
        }
    }
}

/// An ordered flow: identifier, display label and statements.
#[derive(Debug)]
pub struct FlowProgram {
    id: String,
    label: String,
    pub statements: Vec<Statement>,
}

impl FlowProgram {
    /// The identifier is the slugified label.
    pub fn new(label: impl Into<String>) -> FlowProgram {
        let label = label.into();
        FlowProgram {
            id: slug(&label),
            label,
            statements: Vec::new(),
        }
    }

    pub fn with_statement(mut self, statement: Statement) -> FlowProgram {
        self.statements.push(statement);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// What one flow contributed under the active mode. Only the parts the
/// mode produces are populated.
#[derive(Debug, Default)]
pub struct FlowRun {
    /// Execute/replay/extract-values: resolved or recorded input values.
    pub values: BTreeMap<String, Value>,
    /// Extract-all: full per-element descriptors.
    pub descriptors: BTreeMap<String, serde_json::Value>,
    /// Build-descriptor: the flow's schema document.
    pub schema: Option<serde_json::Value>,
}

/// Evaluates flow programs against a project.
pub struct Runner<'a> {
    project: &'a mut Project,
}

impl<'a> Runner<'a> {
    pub fn new(project: &'a mut Project) -> Runner<'a> {
        Runner { project }
    }

    /// Runs one flow under the project's active mode. The flow identifier
    /// is the current flow for the duration, so manifest writes land under
    /// `outputs/<flow>/`.
    pub fn run_flow(&mut self, program: &mut FlowProgram) -> Result<FlowRun, RunError> {
        self.project.set_current_flow(program.id.clone());
        let result = self.run_statements(program);
        self.project.clear_current_flow();
        result
    }

    fn run_statements(&mut self, program: &mut FlowProgram) -> Result<FlowRun, RunError> {
        let mode = self.project.mode().clone();
        // Extraction is best-effort: one broken statement must not hide
        // the values of the rest.
        let best_effort = matches!(mode, Mode::ExtractValues | Mode::ExtractAll);
        debug!(flow = %program.id, mode = %mode, statements = program.statements.len(), "running flow");

        let mut run = FlowRun::default();
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        let mut defaults = serde_json::Map::new();
        let mut fragments = Vec::new();
        let mut seen_kinds = BTreeSet::new();

        for statement in &mut program.statements {
            let key = statement.key().to_string();
            let outcome = match &mut statement.call {
                Call::Input(element) => dispatch_input(element.as_mut(), self.project),
                Call::Output(element) => dispatch_output(element.as_ref(), self.project),
            };
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) if best_effort => {
                    warn!(flow = %program.id, func = %statement.func, key = %key, %err, "skipping statement");
                    continue;
                }
                Err(err) => return Err(err),
            };
            match outcome {
                Outcome::Element | Outcome::Skipped => {}
                Outcome::Value(value) => {
                    if matches!(statement.call, Call::Input(_)) {
                        run.values.insert(key, value);
                    }
                }
                Outcome::Entry { key, value } => {
                    run.values.insert(key, value);
                }
                Outcome::Metadata { key, descriptor } => {
                    run.descriptors.insert(key, descriptor);
                }
                Outcome::Schema {
                    key,
                    property,
                    value,
                    required: is_required,
                } => {
                    if is_required {
                        required.push(serde_json::Value::String(key.clone()));
                    }
                    defaults.insert(key.clone(), value.to_json());
                    properties.insert(key, property);
                }
                Outcome::Fragment { kind, fragment } => {
                    if seen_kinds.insert(kind) {
                        fragments.push(fragment);
                    }
                }
            }
        }

        if matches!(mode, Mode::BuildDescriptor) {
            if properties.contains_key(&program.id) {
                return Err(RunError::FlowKeyCollision {
                    flow: program.id.clone(),
                });
            }
            run.schema = Some(serde_json::json!({
                "title": program.label,
                "type": "object",
                "required": required,
                "properties": properties,
                "defaults": defaults,
                "outputs": fragments,
            }));
        }
        Ok(run)
    }
}

/// Runs every flow and merges their value maps. A key recorded by several
/// flows resolves last-write-wins, in flow order.
fn process(
    project: &mut Project,
    programs: &mut [FlowProgram],
) -> Result<BTreeMap<String, Value>, RunError> {
    let mut merged = BTreeMap::new();
    let mut runner = Runner::new(project);
    for program in programs.iter_mut() {
        let run = runner.run_flow(program)?;
        for (key, value) in run.values {
            if merged.insert(key.clone(), value).is_some() {
                debug!(flow = %program.id(), key = %key, "key overwritten by later flow");
            }
        }
    }
    Ok(merged)
}

/// Runs the flows with their declared defaults.
pub fn execute(
    project: &mut Project,
    programs: &mut [FlowProgram],
) -> Result<BTreeMap<String, Value>, RunError> {
    project.set_mode(Mode::Execute);
    process(project, programs)
}

/// Loads a recorded parameter file, then runs the flows against it.
/// Replaying the output of [`extract_values`] reproduces the same values.
pub fn replay(
    project: &mut Project,
    parameters: &Path,
    programs: &mut [FlowProgram],
) -> Result<BTreeMap<String, Value>, RunError> {
    project.set_mode(Mode::ReplayThenExecute);
    project.load_parameters(parameters)?;
    process(project, programs)
}

/// Collects every input key with its default value, best-effort.
pub fn extract_values(
    project: &mut Project,
    programs: &mut [FlowProgram],
) -> Result<BTreeMap<String, Value>, RunError> {
    project.set_mode(Mode::ExtractValues);
    process(project, programs)
}

/// Collects the full descriptor of every input, best-effort. A key
/// declared by elements of different kinds keeps the last descriptor and
/// logs the discrepancy.
pub fn extract_metadata(
    project: &mut Project,
    programs: &mut [FlowProgram],
) -> Result<BTreeMap<String, serde_json::Value>, RunError> {
    project.set_mode(Mode::ExtractAll);
    let mut merged: BTreeMap<String, serde_json::Value> = BTreeMap::new();
    let mut runner = Runner::new(project);
    for program in programs.iter_mut() {
        let run = runner.run_flow(program)?;
        for (key, descriptor) in run.descriptors {
            if let Some(previous) = merged.get(&key)
                && previous.get("kind") != descriptor.get("kind")
            {
                warn!(
                    key = %key,
                    previous = %previous["kind"],
                    current = %descriptor["kind"],
                    "key redeclared with a different element kind"
                );
            }
            merged.insert(key, descriptor);
        }
    }
    Ok(merged)
}

/// Builds one schema document per flow, keyed by flow identifier.
pub fn build_descriptor(
    project: &mut Project,
    programs: &mut [FlowProgram],
) -> Result<serde_json::Value, RunError> {
    project.set_mode(Mode::BuildDescriptor);
    let mut document = serde_json::Map::new();
    let mut runner = Runner::new(project);
    for program in programs.iter_mut() {
        let run = runner.run_flow(program)?;
        if let Some(schema) = run.schema {
            document.insert(program.id().to_string(), schema);
        }
    }
    Ok(serde_json::Value::Object(document))
}

/// Persists an extracted value map as a parameter file suitable for
/// [`replay`].
pub fn write_parameters(
    path: &Path,
    values: &BTreeMap<String, Value>,
) -> Result<(), ProjectError> {
    let document: serde_json::Map<String, serde_json::Value> = values
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();
    let encoded = serde_json::to_string_pretty(&serde_json::Value::Object(document))
        .map_err(|e| ProjectError::ParameterFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    fs::write(path, encoded).map_err(|e| ProjectError::ParameterFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
