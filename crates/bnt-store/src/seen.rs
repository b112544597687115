//! Persisted dedup index of article identities.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenEntry {
    /// Run that first accepted this key.
    pub run_id: Uuid,
    pub first_seen: DateTime<Utc>,
}

/// Keyed record of previously processed article identities.
///
/// Safe to share across fetch workers: `record` takes the interior lock, so
/// concurrent inserts for distinct keys cannot lose writes and repeated
/// inserts for the same key keep the first association (first-writer-wins,
/// which is deterministic here since the key decides the association).
/// Keys never expire.
#[derive(Debug, Default)]
pub struct SeenIndex {
    entries: Mutex<HashMap<String, SeenEntry>>,
}

impl SeenIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a JSON file. A missing file yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let entries: HashMap<String, SeenEntry> =
            serde_json::from_str(&content).map_err(|e| StoreError::Serialize {
                context: path.display().to_string(),
                source: e,
            })?;
        Ok(Self {
            entries: Mutex::new(entries),
        })
    }

    /// Write the index back to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure.
    pub fn persist(&self, path: &Path) -> Result<(), StoreError> {
        let entries = self.entries.lock().expect("seen index lock poisoned");
        let json =
            serde_json::to_string_pretty(&*entries).map_err(|e| StoreError::Serialize {
                context: path.display().to_string(),
                source: e,
            })?;
        std::fs::write(path, json).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    #[must_use]
    pub fn seen(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("seen index lock poisoned")
            .contains_key(key)
    }

    /// Record a key as processed. Idempotent: an existing entry keeps its
    /// original run association.
    pub fn record(&self, key: &str, run_id: Uuid) {
        self.entries
            .lock()
            .expect("seen index lock poisoned")
            .entry(key.to_string())
            .or_insert_with(|| SeenEntry {
                run_id,
                first_seen: Utc::now(),
            });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("seen index lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_seen() {
        let index = SeenIndex::new();
        let run = Uuid::new_v4();
        assert!(!index.seen("https://example.com/a"));
        index.record("https://example.com/a", run);
        assert!(index.seen("https://example.com/a"));
    }

    #[test]
    fn record_is_idempotent_and_keeps_first_run() {
        let index = SeenIndex::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        index.record("key", first);
        index.record("key", second);
        assert_eq!(index.len(), 1);
        let entries = index.entries.lock().unwrap();
        assert_eq!(entries.get("key").unwrap().run_id, first);
    }

    #[test]
    fn concurrent_records_do_not_lose_inserts() {
        use std::sync::Arc;
        let index = Arc::new(SeenIndex::new());
        let run = Uuid::new_v4();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        index.record(&format!("key-{i}-{j}"), run);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(index.len(), 400);
    }

    #[test]
    fn persist_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let run = Uuid::new_v4();

        let index = SeenIndex::new();
        index.record("https://example.com/a", run);
        index.record("https://example.com/b", run);
        index.persist(&path).unwrap();

        let reloaded = SeenIndex::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.seen("https://example.com/a"));
        assert!(!reloaded.seen("https://example.com/c"));
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = SeenIndex::load(&dir.path().join("nope.json")).unwrap();
        assert!(index.is_empty());
    }
}
