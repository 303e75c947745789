//! Instance lifecycle seam.
//!
//! Spawning, QEMU argument construction, and tap plumbing live in the
//! VM-process collaborator; the core only ever asks for full stop/start
//! cycles (restart-on-silence) and pre-launch disk attachment.

use crate::errors::AppliteResult;
use serde::{Deserialize, Serialize};

/// Drive interface for an attached disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskInterface {
    Ide,
    Virtio,
}

impl DiskInterface {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskInterface::Ide => "ide",
            DiskInterface::Virtio => "virtio",
        }
    }
}

impl std::fmt::Display for DiskInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A disk the instance must carry before launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskRequest {
    /// Size spec understood by the image tooling (e.g. "50G").
    pub size_spec: String,

    /// Drive interface the disk is attached on.
    pub interface: DiskInterface,
}

/// Lifecycle control over the provisioned instance.
pub trait InstanceControl {
    /// Stop the instance process.
    fn stop(&mut self) -> AppliteResult<()>;

    /// Start (or relaunch) the instance process.
    fn start(&mut self) -> AppliteResult<()>;

    /// Attach an additional disk before launch.
    fn add_disk(&mut self, request: &DiskRequest) -> AppliteResult<()>;
}
