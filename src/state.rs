use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StateError;

/// Set of listing ids already notified. Union-only: entries are never
/// removed, even when the upstream source stops returning them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet(BTreeSet<String>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, ids: I) {
        self.0.extend(ids);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// On-disk format. `sent_ids` matches the historical state files, so
/// existing deployments keep their seen history; duplicates in an old
/// file collapse on load.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    sent_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Durable SeenSet storage: loaded once at start, written at most once at
/// the end of a run.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file is a first run, not an error. An unparsable file is
    /// fatal: the caller must abort rather than re-notify everything.
    pub fn load(&self) -> Result<SeenSet, StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SeenSet::new()),
            Err(e) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let file: StateFile =
            serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(file.sent_ids.into_iter().collect())
    }

    /// Atomic with respect to a crash: write a temp file in the target
    /// directory, fsync, then rename over the destination.
    pub fn save(&self, seen: &SeenSet) -> Result<(), StateError> {
        let file = StateFile {
            sent_ids: seen.0.iter().cloned().collect(),
            updated_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&file).expect("state serializes");

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let write = |e: std::io::Error| StateError::Write {
            path: self.path.clone(),
            source: e,
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write)?;
        tmp.write_all(json.as_bytes()).map_err(write)?;
        tmp.flush().map_err(write)?;
        tmp.as_file_mut().sync_all().map_err(write)?;
        tmp.persist(&self.path).map_err(|e| write(e.error))?;
        Ok(())
    }
}
