//! File-backed persistence for the gate.
//!
//! The gate keeps its state in a data directory laid out like the browser
//! storage areas it replaces:
//!
//! ```text
//! <data_dir>/profile.json                 durable visitor profile
//! <data_dir>/session/                     state that only matters mid-visit
//!     reload_snapshot.json                profile stash for a forced reload
//!     force_reload                        one-shot marker for the stash
//!     pending_verification_email          address awaiting verification
//! <data_dir>/contact_cache/<digest>.json  contact lookups, 1-hour freshness
//! ```
//!
//! Reads are tolerant: corrupt or unreadable state is logged and treated as
//! absent. Writes are atomic (staged file + rename) and report failures.

mod contact_cache;
mod profile;
mod session;

pub use contact_cache::ContactCacheStore;
pub use profile::ProfileStore;
pub use session::SessionStore;

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// State could not be serialized for writing.
    #[error("failed to encode stored state: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Write `bytes` to `path` atomically: stage under a unique temp name in the
/// same directory, then rename over the target. Creates parent directories
/// as needed.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    // Unique staging name so concurrent writers cannot clobber each other's
    // half-written file.
    let staged = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
    tokio::fs::write(&staged, bytes)
        .await
        .map_err(|e| StoreError::io(&staged, e))?;
    tokio::fs::rename(&staged, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Read a file, treating every failure as absence. `NotFound` is expected
/// and silent; anything else is logged.
async fn read_tolerant(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Some(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read stored state");
            None
        }
    }
}

/// Remove a file, ignoring `NotFound`.
async fn remove_quiet(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove stored state");
    }
}
