//! Provisioning inputs resolved from flags and environment.

use crate::constants::{defaults, paths};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Inputs for one provisioning run.
///
/// Field defaults mirror the well-known container layout in
/// [`crate::constants::paths`]; tests and embedders override individual
/// fields to point at scratch directories.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvisionOptions {
    /// Guest hostname. `None` derives `sdwan-<kind>` (persona family) or
    /// `freebsd` (generic-BSD family) from the resolved profile.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Administrative account name written into the guest.
    #[serde(default = "default_username")]
    pub username: String,

    /// Administrative account password.
    #[serde(default = "default_password")]
    pub password: String,

    /// Management address in CIDR form (`address/prefix`).
    #[serde(default = "default_mgmt_cidr")]
    pub mgmt_cidr: String,

    /// Management gateway address.
    #[serde(default = "default_mgmt_gateway")]
    pub mgmt_gateway: String,

    /// Directory scanned for appliance disk images.
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Directory holding persona sub-configuration templates.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Optional full boot-configuration override document.
    #[serde(default = "default_user_config_file")]
    pub user_config_file: PathBuf,

    /// Optional persona sub-configuration override fragment.
    #[serde(default = "default_persona_config_file")]
    pub persona_config_file: PathBuf,

    /// Optional saved backup archive restored after boot.
    #[serde(default = "default_backup_file")]
    pub backup_file: PathBuf,

    /// Directory the synthesized documents and seed media are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Size spec for an extra disk requested via `ADD_DISK`.
    #[serde(default)]
    pub extra_disk: Option<String>,
}

impl ProvisionOptions {
    /// Path the boot-configuration document is written to.
    pub fn bootstrap_config_path(&self) -> PathBuf {
        self.output_dir.join(paths::BOOTSTRAP_CONFIG_FILE)
    }

    /// Path the network-configuration document is written to.
    pub fn network_config_path(&self) -> PathBuf {
        self.output_dir.join(paths::NETWORK_CONFIG_FILE)
    }

    /// Path the attachable seed media is written to.
    pub fn seed_image_path(&self) -> PathBuf {
        self.output_dir.join(paths::SEED_IMAGE)
    }
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            hostname: None,
            username: default_username(),
            password: default_password(),
            mgmt_cidr: default_mgmt_cidr(),
            mgmt_gateway: default_mgmt_gateway(),
            images_dir: default_images_dir(),
            template_dir: default_template_dir(),
            user_config_file: default_user_config_file(),
            persona_config_file: default_persona_config_file(),
            backup_file: default_backup_file(),
            output_dir: default_output_dir(),
            extra_disk: None,
        }
    }
}

fn default_username() -> String {
    defaults::USERNAME.to_string()
}

fn default_password() -> String {
    defaults::PASSWORD.to_string()
}

fn default_mgmt_cidr() -> String {
    defaults::MGMT_CIDR.to_string()
}

fn default_mgmt_gateway() -> String {
    defaults::MGMT_GATEWAY.to_string()
}

fn default_images_dir() -> PathBuf {
    PathBuf::from(paths::IMAGES_DIR)
}

fn default_template_dir() -> PathBuf {
    PathBuf::from(paths::TEMPLATES_DIR)
}

fn default_user_config_file() -> PathBuf {
    PathBuf::from(paths::USER_CONFIG_FILE)
}

fn default_persona_config_file() -> PathBuf {
    PathBuf::from(paths::PERSONA_CONFIG_FILE)
}

fn default_backup_file() -> PathBuf {
    PathBuf::from(paths::BACKUP_FILE)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wellknown_layout() {
        let opts = ProvisionOptions::default();
        assert_eq!(opts.username, "admin");
        assert_eq!(opts.mgmt_cidr, "10.0.0.15/24");
        assert_eq!(
            opts.bootstrap_config_path(),
            PathBuf::from("/bootstrap_config.yaml")
        );
        assert_eq!(opts.seed_image_path(), PathBuf::from("/cloud_init.iso"));
    }

    #[test]
    fn test_deserialize_partial_document() {
        let opts: ProvisionOptions =
            serde_yaml::from_str("hostname: r1\npassword: secret\n").unwrap();
        assert_eq!(opts.hostname.as_deref(), Some("r1"));
        assert_eq!(opts.password, "secret");
        // Unspecified fields fall back to the well-known defaults.
        assert_eq!(opts.username, "admin");
        assert_eq!(opts.template_dir, PathBuf::from("/templates"));
    }
}
