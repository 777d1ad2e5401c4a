//! On-disk flow registry.
//!
//! A project keeps the ordered list of its flows in a small JSON file at
//! the project root (`.keiro.json` by default, overridable through
//! `KEIRO_CONFIG_FILE`). Each entry pairs a flow file with its display
//! label; the slugified label doubles as the flow identifier.

use crate::error::FlowConfigError;
use crate::project::{CONFIG_FILE_ENV, DEFAULT_CONFIG_FILE};
use crate::slug::slug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One registered flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowEntry {
    /// Flow source file, relative to the project root.
    pub file: String,
    /// Display label; `slug(label)` is the flow identifier.
    pub label: String,
    /// Free-form attributes carried along verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl FlowEntry {
    pub fn id(&self) -> String {
        slug(&self.label)
    }
}

/// The active config filename, after the environment override.
pub fn config_file_name() -> String {
    env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string())
}

fn config_path(root: &Path) -> PathBuf {
    root.join(config_file_name())
}

/// Loads the registered flows. A missing config file is an empty registry,
/// not an error.
pub fn load_flows(root: &Path) -> Result<Vec<FlowEntry>, FlowConfigError> {
    let path = config_path(root);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(&path).map_err(|e| FlowConfigError::Read {
        path: path.clone(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| FlowConfigError::Read {
        path,
        message: e.to_string(),
    })
}

/// Writes the whole registry back, pretty-printed for hand-editing.
pub fn save_flows(root: &Path, flows: &[FlowEntry]) -> Result<(), FlowConfigError> {
    let path = config_path(root);
    let encoded = serde_json::to_string_pretty(flows).map_err(|e| FlowConfigError::Write {
        path: path.clone(),
        message: e.to_string(),
    })?;
    fs::write(&path, encoded).map_err(|e| FlowConfigError::Write {
        path,
        message: e.to_string(),
    })
}

/// Registers a new flow, optionally inserted before an existing one
/// (by identifier). Duplicate identifiers are refused.
pub fn add_flow(
    root: &Path,
    entry: FlowEntry,
    before: Option<&str>,
) -> Result<Vec<FlowEntry>, FlowConfigError> {
    if entry.label.trim().is_empty() {
        return Err(FlowConfigError::EmptyName);
    }
    let mut flows = load_flows(root)?;
    let id = entry.id();
    if flows.iter().any(|f| f.id() == id) {
        return Err(FlowConfigError::Duplicate(id));
    }
    let position = before
        .and_then(|target| flows.iter().position(|f| f.id() == target))
        .unwrap_or(flows.len());
    debug!(flow = %id, position, "registering flow");
    flows.insert(position, entry);
    save_flows(root, &flows)?;
    Ok(flows)
}
