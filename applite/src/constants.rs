//! Constants for the applite runtime.
//!
//! Centralized location for well-known paths, environment names, and
//! provisioning defaults. Everything here is only a default: the effective
//! values live in [`crate::options::ProvisionOptions`] so tests and callers
//! can redirect them.

use std::time::Duration;

/// Well-known filesystem locations inside the provisioning container.
pub mod paths {
    /// Directory scanned for appliance disk images.
    pub const IMAGES_DIR: &str = "/";

    /// Directory holding persona sub-configuration templates.
    pub const TEMPLATES_DIR: &str = "/templates";

    /// Optional full user-supplied boot-configuration document.
    pub const USER_CONFIG_FILE: &str = "/config/cloud-init.yaml";

    /// Optional user-supplied persona sub-configuration fragment.
    pub const PERSONA_CONFIG_FILE: &str = "/config/zcloud.xml";

    /// Optional saved backup archive restored after boot.
    pub const BACKUP_FILE: &str = "/config/backup.tar.gz";

    /// Helper script driving backup restoration inside the guest.
    pub const BACKUP_HELPER: &str = "/backup.sh";

    /// Synthesized boot-configuration document.
    pub const BOOTSTRAP_CONFIG_FILE: &str = "bootstrap_config.yaml";

    /// Synthesized network-configuration document (generic-BSD family).
    pub const NETWORK_CONFIG_FILE: &str = "network_config.yaml";

    /// Attachable seed media produced from the documents.
    pub const SEED_IMAGE: &str = "cloud_init.iso";
}

/// Environment variables consumed by the provisioning pipeline.
pub mod envs {
    /// Size spec for an extra disk to attach before launch (e.g. "8G").
    pub const ADD_DISK: &str = "ADD_DISK";
}

/// Provisioning defaults.
pub mod defaults {
    /// Default guest account name.
    pub const USERNAME: &str = "admin";

    /// Default guest account password.
    pub const PASSWORD: &str = "admin";

    /// Default management address in CIDR form.
    pub const MGMT_CIDR: &str = "10.0.0.15/24";

    /// Default management gateway.
    pub const MGMT_GATEWAY: &str = "10.0.0.2";

    /// RAM in MiB when the persona could not be resolved.
    pub const RAM_FALLBACK_MIB: u32 = 4096;

    /// Size spec of the manager data volume.
    pub const MANAGER_DATA_DISK: &str = "50G";
}

/// Upper bound for a single console read inside a readiness tick.
pub const CONSOLE_READ_TIMEOUT: Duration = Duration::from_secs(1);
