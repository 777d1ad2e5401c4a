//! Element base contracts and mode dispatch.
//!
//! An element is a declarative parameter (input) or artifact (output)
//! definition whose runtime behavior is entirely redirected by the active
//! [`Mode`](crate::Mode): the same declaration introspects, executes,
//! replays, extracts or describes itself depending on the project it is
//! dispatched against.

pub mod input;
pub mod output;

use crate::error::{ElementError, RunError};
use crate::expr::{Condition, Count};
use crate::manifest::ManifestEntry;
use crate::mode::Mode;
use crate::project::Project;
use crate::slug::slug;
use crate::value::{Value, ValueType};
use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::fmt;
use tracing::{debug, warn};

/// Metadata names that collide with the fields flattened into manifest
/// entries and descriptors, rejected at construction.
const RESERVED_NAMES: &[&str] = &[
    "key", "label", "value", "kind", "count", "optional", "disabled",
];

/// Fully-qualified names of the built-in element types, seeded into the
/// project's extraction registry on reset.
pub fn builtin_elements() -> impl Iterator<Item = &'static str> {
    [
        "keiro.Slider",
        "keiro.NumberInput",
        "keiro.TextInput",
        "keiro.Checkbox",
        "keiro.Dropdown",
        "keiro.RadioButton",
        "keiro.FileInput",
        "keiro.FolderInput",
        "keiro.CsvReader",
        "keiro.FileOutput",
        "keiro.TextOutput",
        "keiro.CsvOutput",
        "keiro.ImageOutput",
    ]
    .into_iter()
}

/// Construction state shared by every element: the slugified key, the
/// display label, the raw (unresolved) value and free-form metadata.
///
/// Metadata lives in its own namespaced map rather than being flattened
/// into the element, so user names can never shadow element behavior; only
/// the fixed reserved set is refused.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    key: String,
    label: String,
    value: Value,
    metadata: BTreeMap<String, Value>,
}

impl ElementSpec {
    /// Fails on the reserved `_` prefix and on keys whose slug is empty
    /// (whitespace- or symbol-only input). The label defaults to the key
    /// as written.
    pub fn new(key: &str, value: Value) -> Result<ElementSpec, ElementError> {
        if key.starts_with('_') {
            return Err(ElementError::ReservedKey(key.to_string()));
        }
        let slugged = slug(key);
        if slugged.is_empty() {
            return Err(ElementError::EmptyKey);
        }
        Ok(ElementSpec {
            label: key.to_string(),
            key: slugged,
            value,
            metadata: BTreeMap::new(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn raw_value(&self) -> &Value {
        &self.value
    }

    pub fn set_raw_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn insert_metadata(&mut self, name: &str, value: Value) -> Result<(), ElementError> {
        if RESERVED_NAMES.contains(&name) {
            return Err(ElementError::ReservedMetadata(vec![name.to_string()]));
        }
        self.metadata.insert(name.to_string(), value);
        Ok(())
    }
}

/// Construction state of an input element: the shared [`ElementSpec`] plus
/// the repeat `count`, the `optional` condition and the UI hint
/// `hide_when_disabled`. Built with chained `with_*` calls.
#[derive(Debug, Clone)]
pub struct InputSpec {
    element: ElementSpec,
    count: Option<Count>,
    optional: Condition,
    hide_when_disabled: bool,
}

impl InputSpec {
    pub fn new(key: &str, value: Value) -> Result<InputSpec, ElementError> {
        Ok(InputSpec {
            element: ElementSpec::new(key, value)?,
            count: None,
            optional: Condition::Fixed(false),
            hide_when_disabled: false,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.element.set_label(label);
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(Count::Fixed(count));
        self
    }

    /// Dynamic count, e.g. `"len($b$)"`.
    pub fn with_count_expr(mut self, text: &str) -> Result<Self, ElementError> {
        self.count = Some(Count::parse(text)?);
        Ok(self)
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = Condition::Fixed(optional);
        self
    }

    /// Dynamic optional condition, e.g. `"$a$ > 1"`.
    pub fn with_optional_expr(mut self, text: &str) -> Result<Self, ElementError> {
        self.optional = Condition::parse(text)?;
        Ok(self)
    }

    pub fn with_hide_when_disabled(mut self, hide: bool) -> Self {
        self.hide_when_disabled = hide;
        self
    }

    pub fn with_metadata(mut self, name: &str, value: Value) -> Result<Self, ElementError> {
        self.element.insert_metadata(name, value)?;
        Ok(self)
    }

    pub fn key(&self) -> &str {
        self.element.key()
    }

    pub fn label(&self) -> &str {
        self.element.label()
    }

    pub fn raw_value(&self) -> &Value {
        self.element.raw_value()
    }

    pub fn set_raw_value(&mut self, value: Value) {
        self.element.set_raw_value(value);
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        self.element.metadata()
    }

    pub fn count(&self) -> Option<&Count> {
        self.count.as_ref()
    }

    pub fn optional(&self) -> &Condition {
        &self.optional
    }

    pub fn hide_when_disabled(&self) -> bool {
        self.hide_when_disabled
    }

    /// Whether a missing value is acceptable right now. Dynamic conditions
    /// are evaluated against the data map; a condition that cannot be
    /// evaluated yet is treated as optional rather than failing the run.
    pub fn is_optional_now(&self, data: Option<&AHashMap<String, Value>>) -> bool {
        match &self.optional {
            Condition::Fixed(b) => *b,
            dynamic => match dynamic.resolve(data) {
                Ok(b) => b,
                Err(err) => {
                    warn!(key = self.key(), %err, "optional condition unresolved, treating as optional");
                    true
                }
            },
        }
    }

    /// Keys referenced by the expression-bearing attributes (`optional`
    /// and `count`); choice elements extend this with their options.
    pub fn expression_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        self.optional.referenced_keys(&mut keys);
        if let Some(count) = &self.count {
            count.referenced_keys(&mut keys);
        }
        keys
    }

    /// The `disabled` descriptor field: `false` for a plain required
    /// element, the `_optional_<key>` toggle name for a fixed-optional one,
    /// or the condition source text.
    pub fn disabled_json(&self) -> serde_json::Value {
        match &self.optional {
            Condition::Fixed(false) => serde_json::json!(false),
            Condition::Fixed(true) => serde_json::json!(format!("_optional_{}", self.key())),
            Condition::Dynamic { source, .. } => serde_json::json!(source),
        }
    }

    fn optional_flag(&self) -> bool {
        !self.optional.is_fixed_false()
    }
}

/// The result of dispatching one element under the active mode.
#[derive(Debug)]
pub enum Outcome {
    /// Introspect mode: the element itself is the result; the caller holds
    /// it already, nothing was evaluated.
    Element,
    /// Execute/replay: the resolved, validated value.
    Value(Value),
    /// Extract-values: one `key -> value` pair, unvalidated.
    Entry { key: String, value: Value },
    /// Extract-all: the full per-element descriptor.
    Metadata {
        key: String,
        descriptor: serde_json::Value,
    },
    /// Build-descriptor, inputs: one schema property plus its default.
    Schema {
        key: String,
        property: serde_json::Value,
        value: Value,
        required: bool,
    },
    /// Build-descriptor, outputs: a per-kind fragment, deduplicated by the
    /// runner.
    Fragment {
        kind: String,
        fragment: serde_json::Value,
    },
    /// Nothing to contribute in this mode (outputs under extraction).
    Skipped,
}

/// The input-element contract. Concrete types supply the declared value
/// type, domain validation and optionally their own value resolution; the
/// shared execute/extract behavior lives in [`dispatch_input`].
pub trait InputElement: fmt::Debug + Send {
    fn spec(&self) -> &InputSpec;

    fn spec_mut(&mut self) -> &mut InputSpec;

    /// The element type name as recorded in descriptors (`"Slider"`).
    fn kind(&self) -> &'static str;

    /// Declared value type, checked structurally before validation.
    fn value_type(&self) -> ValueType;

    /// Resolves the raw constructor value into the runtime value. The
    /// default hands the raw value back; path-based elements resolve
    /// against the data root, tabular elements load their source.
    fn resolve(&self, _project: &Project) -> Result<Value, ElementError> {
        Ok(self.spec().raw_value().clone())
    }

    /// Domain validation hook, called once per scalar after the type
    /// check. Must reject out-of-domain values with a `[key]`-prefixed
    /// error.
    fn validate(&self, value: &Value) -> Result<(), ElementError>;

    /// The keys this element's dynamic expressions depend on.
    fn dependencies(&self) -> BTreeSet<String> {
        self.spec().expression_keys()
    }

    /// Schema property emitted in build-descriptor mode. The default
    /// carries the type and title; widgets add their own constraints.
    fn descriptor(&self) -> serde_json::Value {
        let mut property = serde_json::Map::new();
        if let Some(t) = schema_type(&self.value_type()) {
            property.insert("type".to_string(), serde_json::json!(t));
        }
        property.insert("title".to_string(), serde_json::json!(self.spec().label()));
        property.insert("kind".to_string(), serde_json::json!(self.kind()));
        serde_json::Value::Object(property)
    }

    /// Hook for third-party modes. The default preserves the hard
    /// unknown-mode error.
    fn custom_mode(&self, mode: &str, _project: &mut Project) -> Result<Outcome, ElementError> {
        Err(ElementError::UnknownMode(mode.to_string()))
    }
}

/// The output-element contract. Outputs only act in execute-style modes,
/// where they validate their resolved value and append it to the manifest.
pub trait OutputElement: fmt::Debug + Send {
    fn spec(&self) -> &ElementSpec;

    fn kind(&self) -> &'static str;

    /// Resolves the raw value; the default routes text values through
    /// [`Project::get_output_path`] and creates the parent directory, so
    /// the pipeline can write the artifact without path bookkeeping.
    fn resolve(&self, project: &Project) -> Result<Value, ElementError> {
        match self.spec().raw_value() {
            Value::Text(path) => {
                let resolved = project.get_output_path(path);
                if let Some(parent) = resolved.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs::create_dir_all(parent).map_err(|e| {
                        ElementError::invalid(
                            self.spec().key(),
                            format!("Failed to create output directory: {e}"),
                        )
                    })?;
                }
                Ok(Value::Text(resolved.to_string_lossy().into_owned()))
            }
            other => Ok(other.clone()),
        }
    }

    /// Domain validation hook; typically a file-extension check.
    fn validate(&self, value: &Value) -> Result<(), ElementError>;

    /// Per-kind fragment emitted in build-descriptor mode.
    fn descriptor(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind(),
            "fields": ["key", "label", "value", "kind"],
        })
    }

    fn custom_mode(&self, mode: &str, _project: &mut Project) -> Result<Outcome, ElementError> {
        Err(ElementError::UnknownMode(mode.to_string()))
    }
}

/// Maps a declared value type onto a JSON-schema type tag where one exists.
fn schema_type(value_type: &ValueType) -> Option<&'static str> {
    match value_type {
        ValueType::Number => Some("number"),
        ValueType::Bool => Some("boolean"),
        ValueType::Text => Some("string"),
        ValueType::List(_) => Some("array"),
        ValueType::Object => Some("object"),
        ValueType::Union(_) | ValueType::Any => None,
    }
}

/// Routes an input element to the behavior selected by the project's
/// active mode. This is the central dispatch point: every mode funnels
/// through here, and all of them enforce the same construction-time
/// invariants the element was built with.
pub fn dispatch_input(
    element: &mut dyn InputElement,
    project: &mut Project,
) -> Result<Outcome, RunError> {
    let key = element.spec().key().to_string();
    debug!(key = %key, mode = %project.mode(), kind = element.kind(), "dispatching input");
    match project.mode().clone() {
        Mode::Introspect => Ok(Outcome::Element),

        Mode::Execute => {
            let value = match project.data().and_then(|d| d.get(&key)).cloned() {
                Some(recorded) => recorded,
                None => {
                    let resolved = element.resolve(project)?;
                    record(project, &key, resolved.clone());
                    resolved
                }
            };
            prepare_and_validate(element, &value, project.data())?;
            Ok(Outcome::Value(value))
        }

        Mode::ReplayThenExecute => {
            let value = match project.data().and_then(|d| d.get(&key)).cloned() {
                Some(loaded) => {
                    // A previously persisted value overrides the declared
                    // default, then goes through normal resolution.
                    element.spec_mut().set_raw_value(loaded);
                    let resolved = element.resolve(project)?;
                    record(project, &key, resolved.clone());
                    resolved
                }
                None => {
                    let resolved = element.resolve(project)?;
                    record(project, &key, resolved.clone());
                    resolved
                }
            };
            prepare_and_validate(element, &value, project.data())?;
            Ok(Outcome::Value(value))
        }

        Mode::ExtractValues => {
            let value = extract_value(element, project);
            if env::var(crate::project::TYPECHECK_ENV).is_ok()
                && !value.is_null()
                && element.spec().count().is_none()
                && !element.value_type().matches(&value)
            {
                warn!(
                    key = %key,
                    expected = %element.value_type(),
                    "extracted default does not match the declared type"
                );
            }
            Ok(Outcome::Entry { key, value })
        }

        Mode::ExtractAll => {
            let value = extract_value(element, project);
            let spec = element.spec();
            let mut descriptor = serde_json::Map::new();
            descriptor.insert("key".to_string(), serde_json::json!(spec.key()));
            descriptor.insert("kind".to_string(), serde_json::json!(element.kind()));
            descriptor.insert("label".to_string(), serde_json::json!(spec.label()));
            descriptor.insert("value".to_string(), value.to_json());
            descriptor.insert(
                "count".to_string(),
                spec.count()
                    .map(Count::as_json)
                    .unwrap_or(serde_json::Value::Null),
            );
            descriptor.insert(
                "optional".to_string(),
                serde_json::json!(spec.optional_flag()),
            );
            descriptor.insert("disabled".to_string(), spec.disabled_json());
            for (name, meta) in spec.metadata() {
                descriptor.insert(name.clone(), meta.to_json());
            }
            Ok(Outcome::Metadata {
                key,
                descriptor: serde_json::Value::Object(descriptor),
            })
        }

        Mode::BuildDescriptor => {
            let value = extract_value(element, project);
            let required = !element.spec().optional_flag();
            Ok(Outcome::Schema {
                property: element.descriptor(),
                key,
                value,
                required,
            })
        }

        Mode::Custom(tag) => Ok(element.custom_mode(&tag, project)?),
    }
}

/// Routes an output element. Only execute-style modes act; extraction
/// modes skip outputs entirely because their attributes end up in the
/// manifest instead.
pub fn dispatch_output(
    element: &dyn OutputElement,
    project: &mut Project,
) -> Result<Outcome, RunError> {
    let spec = element.spec();
    debug!(key = spec.key(), mode = %project.mode(), kind = element.kind(), "dispatching output");
    match project.mode().clone() {
        Mode::Introspect => Ok(Outcome::Element),

        Mode::Execute | Mode::ReplayThenExecute => {
            let value = element.resolve(project)?;
            element.validate(&value)?;
            let entry = ManifestEntry {
                key: spec.key().to_string(),
                label: spec.label().to_string(),
                value: value.clone(),
                kind: element.kind().to_string(),
                extra: spec.metadata().clone(),
            };
            project.write_output(&entry)?;
            Ok(Outcome::Value(value))
        }

        Mode::ExtractValues | Mode::ExtractAll => Ok(Outcome::Skipped),

        Mode::BuildDescriptor => Ok(Outcome::Fragment {
            kind: element.kind().to_string(),
            fragment: element.descriptor(),
        }),

        Mode::Custom(tag) => Ok(element.custom_mode(&tag, project)?),
    }
}

/// Extraction reads the recorded value if the key is already in the data
/// map, otherwise records the raw (unresolved) default.
fn extract_value(element: &dyn InputElement, project: &mut Project) -> Value {
    let key = element.spec().key().to_string();
    match project.data().and_then(|d| d.get(&key)).cloned() {
        Some(recorded) => recorded,
        None => {
            let raw = element.spec().raw_value().clone();
            record(project, &key, raw.clone());
            raw
        }
    }
}

fn record(project: &mut Project, key: &str, value: Value) {
    // Keys are validated non-empty at construction, so this cannot fail.
    if let Err(err) = project.add_data(key, value) {
        warn!(key, %err, "failed to record element value");
    }
}

/// Presence, count and type enforcement shared by execute and replay.
///
/// A missing value on a non-optional element is an error. With a `count`,
/// the value must be a list whose items each pass the type check and the
/// element's own domain validation; without one, the scalar is checked the
/// same way.
fn prepare_and_validate(
    element: &dyn InputElement,
    value: &Value,
    data: Option<&AHashMap<String, Value>>,
) -> Result<(), ElementError> {
    let spec = element.spec();
    let expected = element.value_type();

    if value.is_null() {
        if !spec.is_optional_now(data) {
            return Err(ElementError::ValueRequired {
                key: spec.key().to_string(),
            });
        }
        return Ok(());
    }

    match spec.count() {
        None => {
            if !expected.matches(value) {
                return Err(ElementError::TypeMismatch {
                    key: spec.key().to_string(),
                    expected,
                    found: value.clone(),
                });
            }
            element.validate(value)
        }
        Some(count) => {
            let Value::List(items) = value else {
                return Err(ElementError::ListExpected {
                    key: spec.key().to_string(),
                    expected,
                    found: value.clone(),
                });
            };
            for item in items {
                if !expected.matches(item) {
                    return Err(ElementError::TypeMismatch {
                        key: spec.key().to_string(),
                        expected,
                        found: item.clone(),
                    });
                }
            }
            for item in items {
                element.validate(item)?;
            }
            if let Ok(expected_len) = count.resolve(data)
                && expected_len as usize != items.len()
            {
                warn!(
                    key = spec.key(),
                    expected = expected_len,
                    found = items.len(),
                    "list length does not match the declared count"
                );
            }
            Ok(())
        }
    }
}
