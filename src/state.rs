use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

/// Persisted set of listing ids that have already been notified.
///
/// Grows monotonically; a present id means "do not notify again". A missing
/// or unreadable file is treated as an empty set so the first run (and a
/// corrupted state file) simply notifies everything currently on the page.
#[derive(Debug)]
pub struct SeenStore {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl SeenStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match fs::read_to_string(&path) {
            Ok(raw) => parse_ids(&raw).unwrap_or_else(|| {
                warn!("State file {} is not in a known shape, starting empty", path.display());
                BTreeSet::new()
            }),
            Err(_) => BTreeSet::new(),
        };
        Self { path, ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the set back as a sorted JSON array, via a temp file and rename
    /// so a crash mid-write cannot leave a truncated state file behind.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(&self.ids)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Accepts the current shape (flat array of ids) and the legacy object shape
/// `{"seen_ids": [...]}`. Anything else is unknown.
fn parse_ids(raw: &str) -> Option<BTreeSet<String>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(map) => map.get("seen_ids")?.as_array()?,
        _ => return None,
    };
    Some(
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
    )
}
