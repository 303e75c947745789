//! Seed media creation seam.
//!
//! The synthesized documents are handed off as files; turning them into
//! attachable boot media is the collaborator's job. A `cloud-localds`
//! backed implementation is provided for hosts with cloud-image-utils.

use crate::errors::{AppliteError, AppliteResult};
use std::path::Path;
use std::process::Command;

/// Turns persisted boot-configuration documents into attachable media.
pub trait MediaBuilder {
    /// Create seed media at `output` from the boot-configuration document
    /// and, when present, the companion network-configuration document.
    fn create_media(
        &self,
        bootstrap: &Path,
        network: Option<&Path>,
        output: &Path,
    ) -> AppliteResult<()>;
}

/// Media builder shelling out to `cloud-localds`.
///
/// The spawned process is fire-and-forget: media creation races instance
/// launch harmlessly because the seed ISO is only read at first boot.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudLocalds;

impl MediaBuilder for CloudLocalds {
    fn create_media(
        &self,
        bootstrap: &Path,
        network: Option<&Path>,
        output: &Path,
    ) -> AppliteResult<()> {
        let mut cmd = Command::new("cloud-localds");
        cmd.arg("-v");
        if let Some(network) = network {
            cmd.arg(format!("--network-config={}", network.display()));
        }
        cmd.arg(output).arg(bootstrap);

        let child = cmd
            .spawn()
            .map_err(|e| AppliteError::Media(format!("cannot spawn cloud-localds: {e}")))?;
        tracing::debug!(pid = child.id(), output = %output.display(), "creating seed media");

        // Intentionally not waited on; the child detaches on drop.
        drop(child);
        Ok(())
    }
}
