//! Session-scoped state: survives a forced reload, not a new visit.

use std::path::{Path, PathBuf};

use stonebridge_core::Email;
use tracing::{debug, warn};

use crate::models::Profile;

use super::{StoreError, read_tolerant, remove_quiet, write_atomic};

const SESSION_DIR: &str = "session";
const SNAPSHOT_FILE: &str = "reload_snapshot.json";
const RELOAD_FLAG_FILE: &str = "force_reload";
const PENDING_EMAIL_FILE: &str = "pending_verification_email";

/// Small slots for state that only matters within one visit: the forced
/// reload snapshot and the email awaiting verification.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(SESSION_DIR),
        }
    }

    /// Stash the profile and raise the reload flag so the next init can
    /// restore it. The flag is what arms the restore; without it the
    /// snapshot is inert.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either file cannot be written.
    pub async fn stash_reload_snapshot(&self, profile: &Profile) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(profile)?;
        write_atomic(&self.dir.join(SNAPSHOT_FILE), &bytes).await?;
        write_atomic(&self.dir.join(RELOAD_FLAG_FILE), b"1").await?;
        debug!("Stashed profile for forced reload");
        Ok(())
    }

    /// Take the reload snapshot if the flag is raised. One-shot: the flag
    /// and the snapshot are consumed whether or not the snapshot parses.
    pub async fn take_reload_snapshot(&self) -> Option<Profile> {
        let flag = self.dir.join(RELOAD_FLAG_FILE);
        read_tolerant(&flag).await?;
        remove_quiet(&flag).await;

        let snapshot_path = self.dir.join(SNAPSHOT_FILE);
        let contents = read_tolerant(&snapshot_path).await;
        remove_quiet(&snapshot_path).await;

        match serde_json::from_str(&contents?) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Reload snapshot is corrupt; discarding");
                None
            }
        }
    }

    /// Remember the address a verification email was sent to.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the slot cannot be written.
    pub async fn set_pending_verification_email(&self, email: &Email) -> Result<(), StoreError> {
        write_atomic(&self.dir.join(PENDING_EMAIL_FILE), email.as_str().as_bytes()).await
    }

    /// The address awaiting verification, if any.
    pub async fn pending_verification_email(&self) -> Option<Email> {
        let contents = read_tolerant(&self.dir.join(PENDING_EMAIL_FILE)).await?;
        match Email::parse(&contents) {
            Ok(email) => Some(email),
            Err(e) => {
                warn!(error = %e, "Stored pending email is invalid; discarding");
                None
            }
        }
    }

    /// Drop all session state.
    pub async fn clear(&self) {
        for file in [SNAPSHOT_FILE, RELOAD_FLAG_FILE, PENDING_EMAIL_FILE] {
            remove_quiet(&self.dir.join(file)).await;
        }
    }
}
