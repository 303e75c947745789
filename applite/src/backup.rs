//! Backup restoration as a post-boot action.

use crate::errors::{AppliteError, AppliteResult};
use crate::readiness::PostBootAction;
use std::path::PathBuf;
use std::process::Command;

/// Restores a previously saved backup archive once the appliance is ready.
///
/// A missing archive is the common case and a no-op; a present archive that
/// fails to restore is fatal, because the appliance would otherwise report
/// ready in an inconsistent state.
#[derive(Debug, Clone)]
pub struct BackupRestore {
    archive: PathBuf,
    helper: PathBuf,
    username: String,
    password: String,
}

impl BackupRestore {
    pub fn new(
        archive: PathBuf,
        helper: PathBuf,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            archive,
            helper,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl PostBootAction for BackupRestore {
    fn run(&mut self) -> AppliteResult<()> {
        if !self.archive.exists() {
            tracing::trace!(archive = %self.archive.display(), "no backup archive, skipping restore");
            return Ok(());
        }

        tracing::info!(archive = %self.archive.display(), "restoring backup archive");
        let status = Command::new(&self.helper)
            .args(["-u", &self.username, "-p", &self.password, "restore"])
            .status()
            .map_err(|e| {
                AppliteError::PostBoot(format!(
                    "cannot run restore helper {}: {}",
                    self.helper.display(),
                    e
                ))
            })?;

        if !status.success() {
            return Err(AppliteError::PostBoot(format!(
                "restore helper exited with {status}"
            )));
        }
        Ok(())
    }
}
