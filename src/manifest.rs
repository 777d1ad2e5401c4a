use crate::error::ManifestError;
use crate::value::Value;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

pub const MANIFEST_FILE: &str = "MANIFEST.txt";
const LOCK_DIR: &str = ".locks";
const LOCK_FILE: &str = "MANIFEST.lock";

/// Bound on lock acquisition so a crashed holder cannot block forever.
const LOCK_LIFETIME: Duration = Duration::from_secs(3);
const LOCK_POLL: Duration = Duration::from_millis(20);

/// One output-element record in the per-flow manifest. Extra metadata is
/// flattened alongside the core fields, matching the on-disk line shape:
///
/// ```json
/// {"key": "x", "label": "x", "value": "file1.csv", "kind": "CsvOutput", "tags": ["CSV"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub key: String,
    pub label: String,
    pub value: Value,
    pub kind: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Appends newline-delimited JSON entries to a flow manifest under a
/// file-system lock scoped to the flow's `.locks` directory. The manifest
/// is append-only; each line is independently parseable and never a JSON
/// array. Multiple processes may hold writers against the same flow.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    lock_path: PathBuf,
}

impl ManifestWriter {
    /// Builds the writer for `<data_root>/outputs/<flow>/MANIFEST.txt`,
    /// creating the flow output directory and its lock directory if absent.
    pub fn new(data_root: &Path, flow: &str) -> Result<ManifestWriter, ManifestError> {
        let flow_dir = data_root.join("outputs").join(flow);
        let lock_dir = flow_dir.join(LOCK_DIR);
        fs::create_dir_all(&lock_dir)?;
        Ok(ManifestWriter {
            path: flow_dir.join(MANIFEST_FILE),
            lock_path: lock_dir.join(LOCK_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the entry and appends it as one line while holding the
    /// exclusive lock, so concurrent writers never interleave or truncate
    /// lines. Acquisition past the lifetime bound is a fatal error, not
    /// retried.
    pub fn append(&self, entry: &ManifestEntry) -> Result<(), ManifestError> {
        let line = serde_json::to_string(entry)?;
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        self.acquire(&lock_file)?;
        let result = self.append_line(&line);
        let _ = FileExt::unlock(&lock_file);
        result
    }

    fn acquire(&self, lock_file: &File) -> Result<(), ManifestError> {
        let deadline = Instant::now() + LOCK_LIFETIME;
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => return Ok(()),
                Err(_) if Instant::now() < deadline => thread::sleep(LOCK_POLL),
                Err(_) => {
                    return Err(ManifestError::LockTimeout {
                        path: self.lock_path.clone(),
                        timeout_secs: LOCK_LIFETIME.as_secs(),
                    });
                }
            }
        }
    }

    fn append_line(&self, line: &str) -> Result<(), ManifestError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }
}

/// Reads a manifest back as parsed entries, skipping blank lines. Intended
/// for tooling and tests; the runtime itself only ever appends.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
    let raw = fs::read_to_string(path)?;
    let mut entries = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(line)?);
    }
    Ok(entries)
}
