//! Run storage backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;

use crate::runs::{PipelineRun, RunSummary};
use crate::StoreError;

/// Capability contract the orchestrator commits runs through.
pub trait RunStore: Send + Sync {
    /// Persist one completed (possibly empty or cancelled) run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on persistence failure.
    fn commit(&self, run: &PipelineRun) -> Result<(), StoreError>;

    /// Summaries of stored runs, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on read failure.
    fn list_runs(&self) -> Result<Vec<RunSummary>, StoreError>;

    /// Full record of one run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RunNotFound`] for unknown ids.
    fn get_run(&self, id: Uuid) -> Result<PipelineRun, StoreError>;
}

/// File-backed store: one JSON document per run under `<root>/runs/`.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating directories as needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directories cannot be created.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let runs_dir = root.join("runs");
        std::fs::create_dir_all(&runs_dir).map_err(|e| StoreError::Io {
            path: runs_dir.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Path of the persisted dedup index for this store.
    #[must_use]
    pub fn seen_path(&self) -> PathBuf {
        self.root.join("seen.json")
    }

    fn run_path(&self, id: Uuid) -> PathBuf {
        self.root.join("runs").join(format!("{id}.json"))
    }
}

impl RunStore for FileStore {
    fn commit(&self, run: &PipelineRun) -> Result<(), StoreError> {
        let path = self.run_path(run.id);
        let json = serde_json::to_string_pretty(run).map_err(|e| StoreError::Serialize {
            context: format!("run {}", run.id),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(
            run_id = %run.id,
            articles = run.articles.len(),
            path = %path.display(),
            "run committed"
        );
        Ok(())
    }

    fn list_runs(&self) -> Result<Vec<RunSummary>, StoreError> {
        let runs_dir = self.root.join("runs");
        let mut summaries = Vec::new();
        let entries = std::fs::read_dir(&runs_dir).map_err(|e| StoreError::Io {
            path: runs_dir.display().to_string(),
            source: e,
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                path: runs_dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match read_run(&path) {
                Ok(run) => summaries.push(run.summary()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable run file");
                }
            }
        }
        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(summaries)
    }

    fn get_run(&self, id: Uuid) -> Result<PipelineRun, StoreError> {
        let path = self.run_path(id);
        if !path.exists() {
            return Err(StoreError::RunNotFound(id));
        }
        read_run(&path)
    }
}

fn read_run(path: &Path) -> Result<PipelineRun, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| StoreError::Serialize {
        context: path.display().to_string(),
        source: e,
    })
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    runs: Mutex<HashMap<Uuid, PipelineRun>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for MemoryStore {
    fn commit(&self, run: &PipelineRun) -> Result<(), StoreError> {
        self.runs
            .lock()
            .expect("memory store lock poisoned")
            .insert(run.id, run.clone());
        Ok(())
    }

    fn list_runs(&self) -> Result<Vec<RunSummary>, StoreError> {
        let runs = self.runs.lock().expect("memory store lock poisoned");
        let mut summaries: Vec<RunSummary> = runs.values().map(PipelineRun::summary).collect();
        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(summaries)
    }

    fn get_run(&self, id: Uuid) -> Result<PipelineRun, StoreError> {
        self.runs
            .lock()
            .expect("memory store lock poisoned")
            .get(&id)
            .cloned()
            .ok_or(StoreError::RunNotFound(id))
    }
}
