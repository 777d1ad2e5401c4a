use crate::element::builtin_elements;
use crate::error::{ManifestError, ProjectError};
use crate::manifest::{ManifestEntry, ManifestWriter};
use crate::mode::Mode;
use crate::slug::slug;
use crate::value::Value;
use ahash::AHashMap;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the data root directory.
pub const DATA_ENV: &str = "KEIRO_PROJECT_DATA";
/// Environment variable toggling optional runtime type-checking during
/// value extraction.
pub const TYPECHECK_ENV: &str = "KEIRO_DO_TYPECHECK";
/// Environment variable selecting the logger namespace.
pub const LOGGER_ENV: &str = "KEIRO_LOGGER_NAME";
/// Environment variable naming the on-disk flow configuration file.
pub const CONFIG_FILE_ENV: &str = "KEIRO_CONFIG_FILE";
/// Default flow configuration filename at the project root.
pub const DEFAULT_CONFIG_FILE: &str = ".keiro.json";

/// Prefix for string config values picked up from the environment.
pub const CONFIG_PREFIX: &str = "KEIRO_CONFIG_";
/// Prefix for boolean config flags picked up from the environment.
pub const FLAG_PREFIX: &str = "KEIRO_FLAG_";

/// Built-in config option names.
pub const FLUSH_STDOUT: &str = "FLUSH_STDOUT";
pub const LOGGER_COLOR: &str = "LOGGER_COLOR";
pub const LOGGER_TIMESTAMP: &str = "LOGGER_TIMESTAMP";

/// Namespace prefix of the built-in elements kept across [`Project::reset`].
const CORE_NAMESPACE: &str = "keiro.";

/// The evaluation context threaded through element dispatch: active mode,
/// current flow, the shared data map, the data root and the project
/// configuration. One `Project` per evaluation pass; state mutation is
/// explicit, never implicit.
///
/// A separate OS process gets its own `Project`; the manifest written via
/// [`Project::write_output`] is the only resource shared between them.
#[derive(Debug, Clone)]
pub struct Project {
    mode: Mode,
    current_flow: Option<String>,
    data: Option<AHashMap<String, Value>>,
    data_root: PathBuf,
    config: AHashMap<String, Value>,
    registered_elements: HashSet<String>,
}

impl Project {
    /// Creates a freshly reset project. Fails if the environment names a
    /// data directory that does not exist.
    pub fn new() -> Result<Project, ProjectError> {
        let mut project = Project {
            mode: Mode::Introspect,
            current_flow: None,
            data: None,
            data_root: PathBuf::new(),
            config: AHashMap::new(),
            registered_elements: HashSet::new(),
        };
        project.reset()?;
        Ok(project)
    }

    /// Resets the project to its defaults:
    /// - `data_root` resolves, in priority order, to the `KEIRO_PROJECT_DATA`
    ///   environment override, a `data` directory next to the working
    ///   directory if one exists, or the working directory itself;
    /// - mode back to [`Mode::Introspect`], flow and data cleared;
    /// - registered elements restored to the built-ins plus any previously
    ///   registered entry in the `keiro.` namespace;
    /// - config reseeded from defaults and `KEIRO_CONFIG_*` / `KEIRO_FLAG_*`
    ///   environment variables.
    pub fn reset(&mut self) -> Result<(), ProjectError> {
        if let Ok(dir) = env::var(DATA_ENV) {
            self.set_data_root(dir)?;
        } else {
            let cwd = env::current_dir()
                .map_err(|_| ProjectError::InvalidDataPath(PathBuf::from(".")))?;
            let sibling = cwd.join("data");
            self.data_root = if sibling.is_dir() { sibling } else { cwd };
        }

        self.registered_elements
            .retain(|name| name.starts_with(CORE_NAMESPACE));
        self.registered_elements
            .extend(builtin_elements().map(str::to_string));

        self.mode = Mode::Introspect;
        self.current_flow = None;
        self.data = None;

        self.config = AHashMap::new();
        self.config
            .insert(FLUSH_STDOUT.to_string(), Value::Bool(false));
        self.config
            .insert(LOGGER_COLOR.to_string(), Value::Bool(true));
        self.config
            .insert(LOGGER_TIMESTAMP.to_string(), Value::Bool(true));
        for (name, value) in env::vars() {
            if let Some(key) = name.strip_prefix(CONFIG_PREFIX) {
                self.config.insert(key.to_string(), Value::Text(value));
            } else if let Some(key) = name.strip_prefix(FLAG_PREFIX) {
                let flag = matches!(
                    value.to_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                );
                self.config.insert(key.to_string(), Value::Bool(flag));
            }
        }

        debug!(data_root = %self.data_root.display(), "project reset");
        Ok(())
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn current_flow(&self) -> Option<&str> {
        self.current_flow.as_deref()
    }

    pub fn set_current_flow(&mut self, flow: impl Into<String>) {
        self.current_flow = Some(flow.into());
    }

    pub fn clear_current_flow(&mut self) {
        self.current_flow = None;
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Points the project at an explicit data directory. Changing the data
    /// root while a flow is running is unsafe.
    pub fn set_data_root(&mut self, path: impl Into<PathBuf>) -> Result<(), ProjectError> {
        let path = path.into();
        if !path.is_dir() {
            return Err(ProjectError::InvalidDataPath(path));
        }
        self.data_root = path;
        Ok(())
    }

    /// The shared data map, `None` until the first write.
    pub fn data(&self) -> Option<&AHashMap<String, Value>> {
        self.data.as_ref()
    }

    /// Replaces the data map wholesale, typically before a replay run.
    pub fn set_data(&mut self, data: AHashMap<String, Value>) {
        self.data = Some(data);
    }

    /// Records a resolved value. Re-declaring a key overwrites the previous
    /// value (documented last-write-wins).
    pub fn add_data(&mut self, key: &str, value: Value) -> Result<(), ProjectError> {
        if key.is_empty() {
            return Err(ProjectError::EmptyDataKey);
        }
        self.data
            .get_or_insert_with(AHashMap::new)
            .insert(key.to_string(), value);
        Ok(())
    }

    pub fn config(&self) -> &AHashMap<String, Value> {
        &self.config
    }

    pub fn set_config(&mut self, key: &str, value: Value) -> Result<(), ProjectError> {
        if key.is_empty() {
            return Err(ProjectError::EmptyDataKey);
        }
        self.config.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get_config(&self, key: &str) -> Result<&Value, ProjectError> {
        self.config
            .get(key)
            .ok_or_else(|| ProjectError::ConfigKeyNotFound(key.to_string()))
    }

    /// Registers an element type for call-graph extraction. The name must
    /// be of the form `<module>.<TypeName>` with a non-snake-case type part
    /// (the extractor maps it to its snake-case constructor itself).
    pub fn register_element(&mut self, name: &str) -> Result<(), ProjectError> {
        let parts: Vec<&str> = name.split('.').collect();
        let [_, type_name] = parts.as_slice() else {
            return Err(ProjectError::InvalidElementName(name.to_string()));
        };
        if *type_name == slug(type_name) {
            return Err(ProjectError::SnakeCaseElementName(type_name.to_string()));
        }
        self.registered_elements.insert(name.to_string());
        Ok(())
    }

    pub fn registered_elements(&self) -> &HashSet<String> {
        &self.registered_elements
    }

    /// Input paths: identity for absolute or empty paths, otherwise joined
    /// on the data root. This indirection keeps element declarations
    /// portable while the runtime controls actual file locations.
    pub fn get_input_path(&self, path: &str) -> PathBuf {
        if path.is_empty() || Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.data_root.join(path)
        }
    }

    /// Output paths: like [`Project::get_input_path`] but anchored at
    /// `<data_root>/outputs`.
    pub fn get_output_path(&self, path: &str) -> PathBuf {
        if path.is_empty() || Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.data_root.join("outputs").join(path)
        }
    }

    /// Path to the current flow's manifest,
    /// `<data_root>/outputs/<flow>/MANIFEST.txt`, creating the output and
    /// lock directories if absent. Requires a running flow.
    pub fn get_output_manifest(&self) -> Result<PathBuf, ManifestError> {
        let flow = self.current_flow().ok_or(ManifestError::NoActiveFlow)?;
        Ok(ManifestWriter::new(&self.data_root, flow)?.path().to_path_buf())
    }

    /// Appends one entry to the current flow's manifest under the
    /// cross-process lock. Safe against concurrent writers from parallel
    /// worker processes sharing the same flow.
    pub fn write_output(&self, entry: &ManifestEntry) -> Result<(), ManifestError> {
        let flow = self.current_flow().ok_or(ManifestError::NoActiveFlow)?;
        ManifestWriter::new(&self.data_root, flow)?.append(entry)
    }

    /// Loads a parameter file (one JSON object of `key -> value`) into the
    /// data map, letting replay mode override element defaults.
    pub fn load_parameters(&mut self, path: &Path) -> Result<(), ProjectError> {
        let raw = fs::read_to_string(path).map_err(|e| ProjectError::ParameterFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|e| ProjectError::ParameterFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let data = self.data.get_or_insert_with(AHashMap::new);
        for (key, value) in parsed {
            data.insert(key, Value::from_json(value));
        }
        Ok(())
    }
}
