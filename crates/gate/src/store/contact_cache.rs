//! Persisted cache of contact lookup results.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stonebridge_core::Email;
use tracing::{debug, warn};

use crate::contacts::ContactRecord;

use super::{StoreError, read_tolerant, write_atomic};

const CACHE_DIR: &str = "contact_cache";

/// How long a cached lookup stays fresh.
const FRESHNESS_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct CachedContact {
    fetched_at: DateTime<Utc>,
    record: ContactRecord,
}

/// Per-email cache of verification-backend lookups.
///
/// Entries are keyed by a digest of the lowercased address, so addresses
/// never appear in filenames, and expire after an hour. Stale or corrupt
/// entries read as misses and get rewritten on the next lookup.
#[derive(Debug, Clone)]
pub struct ContactCacheStore {
    dir: PathBuf,
}

impl ContactCacheStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(CACHE_DIR),
        }
    }

    /// A fresh cached record for this address, if one exists.
    pub async fn get(&self, email: &Email) -> Option<ContactRecord> {
        let path = self.entry_path(email);
        let contents = read_tolerant(&path).await?;
        let cached: CachedContact = match serde_json::from_str(&contents) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "Corrupt contact cache entry; ignoring");
                return None;
            }
        };

        let age = Utc::now() - cached.fetched_at;
        if age > TimeDelta::seconds(FRESHNESS_SECS) {
            debug!(age_secs = age.num_seconds(), "Contact cache entry is stale");
            return None;
        }
        Some(cached.record)
    }

    /// Store a lookup result stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the entry cannot be written.
    pub async fn put(&self, email: &Email, record: &ContactRecord) -> Result<(), StoreError> {
        let cached = CachedContact {
            fetched_at: Utc::now(),
            record: record.clone(),
        };
        let bytes = serde_json::to_vec(&cached)?;
        write_atomic(&self.entry_path(email), &bytes).await
    }

    fn entry_path(&self, email: &Email) -> PathBuf {
        let digest = Sha256::digest(email.normalized().as_bytes());
        self.dir.join(format!("{digest:x}.json"))
    }
}
