//! Append-only round history.
//!
//! Every exploration round persists `{design_space snapshot, results}` under
//! a key derived from the concept and domain. The JSON file layout matches
//! what the viewer tier reads: one file per key holding
//! `{"history": [record, ...]}`.

use crate::space::{DesignSpace, Example};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub run_id: String,
    pub recorded_at: String,
    pub design_space: DesignSpace,
    pub results: Vec<Example>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    history: Vec<HistoryRecord>,
}

pub trait HistoryStore: Send + Sync {
    /// Append one round record under `key`, creating the key on first use.
    fn append(&self, key: &str, record: HistoryRecord) -> anyhow::Result<()>;

    /// All records appended under `key`, oldest first; empty for an unknown
    /// key.
    fn load(&self, key: &str) -> anyhow::Result<Vec<HistoryRecord>>;
}

/// One JSON file per key under a root directory.
pub struct JsonFileHistory {
    root: PathBuf,
}

impl JsonFileHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }

    fn read_file(path: &Path) -> anyhow::Result<HistoryFile> {
        if !path.exists() {
            return Ok(HistoryFile::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read history file {}", path.display()))?;
        let file = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse history file {}", path.display()))?;
        Ok(file)
    }
}

impl HistoryStore for JsonFileHistory {
    fn append(&self, key: &str, record: HistoryRecord) -> anyhow::Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create history dir {}", self.root.display()))?;

        let path = self.path_for(key);
        let mut file = Self::read_file(&path)?;
        file.history.push(record);

        let encoded = serde_json::to_string(&file).context("failed to encode history")?;
        fs::write(&path, encoded)
            .with_context(|| format!("failed to write history file {}", path.display()))?;
        debug!(key, rounds = file.history.len(), "appended history record");
        Ok(())
    }

    fn load(&self, key: &str) -> anyhow::Result<Vec<HistoryRecord>> {
        Ok(Self::read_file(&self.path_for(key))?.history)
    }
}

/// Keys come from free-form concept strings; keep filenames tame.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{Axis, AxisStatus, Tag};
    use tempfile::TempDir;

    fn record(run_id: &str) -> HistoryRecord {
        HistoryRecord {
            run_id: run_id.into(),
            recorded_at: "2025-01-01T00:00:00Z".into(),
            design_space: DesignSpace {
                concept: "elephant".into(),
                domain: "Image".into(),
                axes: vec![Axis {
                    name: "color".into(),
                    status: AxisStatus::Exploring,
                    value: "red".into(),
                }],
            },
            results: vec![Example {
                prompt: "a red elephant".into(),
                content: "…".into(),
                tags: vec![Tag {
                    dimension: "color".into(),
                    value: "red".into(),
                }],
            }],
        }
    }

    #[test]
    fn append_creates_key_on_first_use() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new(dir.path());

        store.append("elephant_Image", record("run-1")).unwrap();

        let records = store.load("elephant_Image").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].run_id, "run-1");
    }

    #[test]
    fn append_appends_instead_of_truncating() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new(dir.path());

        store.append("elephant_Image", record("run-1")).unwrap();
        store.append("elephant_Image", record("run-2")).unwrap();

        let records = store.load("elephant_Image").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].run_id, "run-1");
        assert_eq!(records[1].run_id, "run-2");
    }

    #[test]
    fn load_unknown_key_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new(dir.path());
        assert!(store.load("nothing_here").unwrap().is_empty());
    }

    #[test]
    fn records_round_trip_losslessly() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new(dir.path());
        let original = record("run-1");

        store.append("k", original.clone()).unwrap();
        let restored = store.load("k").unwrap();
        assert_eq!(restored[0], original);
    }

    #[test]
    fn keys_with_spaces_map_to_safe_filenames() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new(dir.path());

        store.append("baby elephant_Image", record("run-1")).unwrap();

        assert!(dir.path().join("baby_elephant_Image.json").exists());
        assert_eq!(store.load("baby elephant_Image").unwrap().len(), 1);
    }

    #[test]
    fn file_layout_matches_viewer_contract() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new(dir.path());
        store.append("k", record("run-1")).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("k.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["history"].is_array());
        assert_eq!(value["history"][0]["results"][0]["tags"][0]["value"], "red");
    }
}
