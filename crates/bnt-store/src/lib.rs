//! Persistence for BNT: the dedup index and the run store.
//!
//! Runs are committed as single JSON documents; the dedup index is a
//! persisted key set with first-seen run and timestamp. Persistence
//! technology is deliberately thin; the pipeline only depends on the
//! [`RunStore`] trait and [`SeenIndex`].

pub mod runs;
pub mod seen;
pub mod store;

use thiserror::Error;

pub use runs::{PipelineRun, RunCounters, RunStatus, RunSummary};
pub use seen::SeenIndex;
pub use store::{FileStore, MemoryStore, RunStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error for {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("run not found: {0}")]
    RunNotFound(uuid::Uuid),
}
