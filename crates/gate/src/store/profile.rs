//! The durable profile slot.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::Profile;

use super::{StoreError, read_tolerant, remove_quiet, write_atomic};

const PROFILE_FILE: &str = "profile.json";

/// Durable storage for the visitor profile.
///
/// One JSON slot on disk. All mutations are serialized through an internal
/// lock, so concurrent interaction events apply one at a time in lock order
/// and a read-modify-write can never interleave with another writer.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ProfileStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PROFILE_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// Load the stored profile.
    ///
    /// Returns `None` when the slot is missing, unreadable, or does not
    /// parse; a corrupt slot is logged and treated as if no profile was ever
    /// saved. This never surfaces an error to the caller.
    pub async fn load(&self) -> Option<Profile> {
        let contents = read_tolerant(&self.path).await?;
        match serde_json::from_str(&contents) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Stored profile is corrupt; treating as absent");
                None
            }
        }
    }

    /// Persist the profile, replacing whatever the slot held.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the filesystem write fails.
    pub async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.persist(profile).await
    }

    /// Load-modify-save under the write lock.
    ///
    /// `mutate` receives the current profile, or a fresh default when none
    /// is stored. Returns the profile as saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the filesystem write fails.
    pub async fn update<F>(&self, mutate: F) -> Result<Profile, StoreError>
    where
        F: FnOnce(&mut Profile),
    {
        let _guard = self.write_lock.lock().await;
        let mut profile = self.load().await.unwrap_or_default();
        mutate(&mut profile);
        self.persist(&profile).await?;
        Ok(profile)
    }

    /// Remove the slot entirely.
    pub async fn clear(&self) {
        let _guard = self.write_lock.lock().await;
        remove_quiet(&self.path).await;
        debug!("Profile slot cleared");
    }

    async fn persist(&self, profile: &Profile) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(profile)?;
        write_atomic(&self.path, &bytes).await
    }
}
