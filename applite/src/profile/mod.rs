//! Appliance personas and resource profiles.
//!
//! A [`ComponentKind`] names the functional role of a provisioned appliance;
//! the [`ComponentProfile`] resolved from it carries everything downstream
//! components consume as data (RAM, template, ready pattern, silence
//! threshold). Persona branching happens here once; the rest of the
//! pipeline never compares type strings.

mod classifier;

pub use classifier::{ClassifiedImage, classify};

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Functional role of a provisioned appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    /// SD-WAN manager node (highest-resource persona).
    Manager,

    /// SD-WAN controller node.
    Controller,

    /// SD-WAN validator node.
    Validator,

    /// Generic FreeBSD appliance (cloud-init family, no persona template).
    GenericBsd,
}

impl ComponentKind {
    /// String form used on the CLI and in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Manager => "manager",
            ComponentKind::Controller => "controller",
            ComponentKind::Validator => "validator",
            ComponentKind::GenericBsd => "generic-bsd",
        }
    }

    /// Persona label written into the guest.
    pub fn persona_label(&self) -> &'static str {
        match self {
            ComponentKind::Manager => "vmanage",
            ComponentKind::Controller => "vsmart",
            ComponentKind::Validator => "vbond",
            ComponentKind::GenericBsd => "freebsd",
        }
    }

    /// RAM allocation in MiB.
    pub fn ram_megabytes(&self) -> u32 {
        match self {
            ComponentKind::Manager => 16384,
            ComponentKind::Controller => 4096,
            ComponentKind::Validator => 2048,
            ComponentKind::GenericBsd => 512,
        }
    }

    /// Persona sub-configuration template, if the persona uses one.
    pub fn template_name(&self) -> Option<&'static str> {
        match self {
            ComponentKind::Manager => Some("manager-zcloud.xml.tmpl"),
            ComponentKind::Controller => Some("controller-zcloud.xml.tmpl"),
            ComponentKind::Validator => Some("validator-zcloud.xml.tmpl"),
            ComponentKind::GenericBsd => None,
        }
    }

    /// Console pattern whose appearance signals boot completion.
    pub fn ready_pattern(&self) -> &'static [u8] {
        match self {
            ComponentKind::GenericBsd => b"login: ",
            _ => b"System Ready",
        }
    }

    /// Consecutive silent ticks tolerated before a forced restart.
    pub fn silence_timeout_ticks(&self) -> u32 {
        match self {
            ComponentKind::GenericBsd => 600,
            _ => 6000,
        }
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(ComponentKind::Manager),
            "controller" => Ok(ComponentKind::Controller),
            "validator" => Ok(ComponentKind::Validator),
            "generic-bsd" => Ok(ComponentKind::GenericBsd),
            other => Err(format!(
                "unknown component kind '{other}' (expected manager, controller, validator or generic-bsd)"
            )),
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved identity and resource profile for one appliance instance.
///
/// Built exactly once per instance by [`ComponentProfile::resolve`] and
/// treated as immutable afterwards. `kind` is `None` when classification
/// found an image but could not infer a persona and no explicit override
/// was given; synthesis then falls back to the manager persona's template
/// while RAM uses the generic fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentProfile {
    /// Resolved persona, if classification determined one.
    pub kind: Option<ComponentKind>,

    /// Persona label written into the guest (e.g. "vmanage").
    pub persona_label: String,

    /// RAM allocation in MiB.
    pub ram_megabytes: u32,

    /// Persona sub-configuration template name.
    pub template_name: Option<String>,

    /// Console pattern whose appearance signals boot completion.
    pub ready_pattern: Vec<u8>,

    /// Consecutive silent ticks tolerated before a forced restart.
    pub silence_timeout_ticks: u32,

    /// Disk image the instance boots from.
    pub disk_image: PathBuf,
}

impl ComponentProfile {
    /// Resolve the fixed profile table for a classified image.
    pub fn resolve(kind: Option<ComponentKind>, disk_image: PathBuf) -> Self {
        match kind {
            Some(k) => Self {
                kind: Some(k),
                persona_label: k.persona_label().to_string(),
                ram_megabytes: k.ram_megabytes(),
                template_name: k.template_name().map(str::to_string),
                ready_pattern: k.ready_pattern().to_vec(),
                silence_timeout_ticks: k.silence_timeout_ticks(),
                disk_image,
            },
            // Persona unset: manager persona defaults, generic RAM fallback.
            None => Self {
                kind: None,
                persona_label: ComponentKind::Manager.persona_label().to_string(),
                ram_megabytes: defaults::RAM_FALLBACK_MIB,
                template_name: ComponentKind::Manager.template_name().map(str::to_string),
                ready_pattern: ComponentKind::Manager.ready_pattern().to_vec(),
                silence_timeout_ticks: ComponentKind::Manager.silence_timeout_ticks(),
                disk_image,
            },
        }
    }

    /// Whether this profile belongs to the generic-BSD appliance family.
    pub fn is_generic_bsd(&self) -> bool {
        matches!(self.kind, Some(ComponentKind::GenericBsd))
    }

    /// Whether manager-only extras (data volume, persona marker) apply.
    pub fn is_manager(&self) -> bool {
        matches!(self.kind, Some(ComponentKind::Manager))
    }

    /// Hostname used when the caller did not supply one.
    pub fn default_hostname(&self) -> String {
        match self.kind {
            Some(ComponentKind::GenericBsd) => "freebsd".to_string(),
            Some(k) => format!("sdwan-{}", k.as_str()),
            None => "sdwan-manager".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            ComponentKind::Manager,
            ComponentKind::Controller,
            ComponentKind::Validator,
            ComponentKind::GenericBsd,
        ] {
            assert_eq!(kind.as_str().parse::<ComponentKind>(), Ok(kind));
        }
        assert!("vmanage".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn test_resource_table() {
        assert_eq!(ComponentKind::Manager.ram_megabytes(), 16384);
        assert_eq!(ComponentKind::Controller.ram_megabytes(), 4096);
        assert_eq!(ComponentKind::Validator.ram_megabytes(), 2048);
        assert_eq!(ComponentKind::GenericBsd.ram_megabytes(), 512);
    }

    #[test]
    fn test_resolve_known_kind() {
        let profile = ComponentProfile::resolve(
            Some(ComponentKind::Validator),
            PathBuf::from("/vbond.qcow2"),
        );
        assert_eq!(profile.kind, Some(ComponentKind::Validator));
        assert_eq!(profile.persona_label, "vbond");
        assert_eq!(profile.ram_megabytes, 2048);
        assert_eq!(
            profile.template_name.as_deref(),
            Some("validator-zcloud.xml.tmpl")
        );
        assert_eq!(profile.ready_pattern, b"System Ready");
        assert_eq!(profile.silence_timeout_ticks, 6000);
        assert_eq!(profile.default_hostname(), "sdwan-validator");
    }

    #[test]
    fn test_resolve_unset_persona() {
        // Unset persona: manager template and label, but the generic RAM
        // fallback, and no manager-only extras.
        let profile = ComponentProfile::resolve(None, PathBuf::from("/appliance.qcow2"));
        assert_eq!(profile.kind, None);
        assert_eq!(profile.persona_label, "vmanage");
        assert_eq!(profile.ram_megabytes, 4096);
        assert!(!profile.is_manager());
        assert_eq!(profile.default_hostname(), "sdwan-manager");
    }

    #[test]
    fn test_resolve_generic_bsd() {
        let profile = ComponentProfile::resolve(
            Some(ComponentKind::GenericBsd),
            PathBuf::from("/freebsd.qcow2"),
        );
        assert!(profile.is_generic_bsd());
        assert_eq!(profile.ram_megabytes, 512);
        assert_eq!(profile.template_name, None);
        assert_eq!(profile.ready_pattern, b"login: ");
        assert_eq!(profile.silence_timeout_ticks, 600);
        assert_eq!(profile.default_hostname(), "freebsd");
    }
}
