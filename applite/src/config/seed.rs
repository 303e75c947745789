//! Boot-configuration synthesis.
//!
//! Turns a resolved [`ComponentProfile`] plus [`ProvisionOptions`] into the
//! final hand-off documents. Two appliance families exist:
//!
//! - persona family (manager/controller/validator): the document is
//!   assembled as literal text so the payload is bit-correct, embedding a
//!   rendered persona sub-configuration; a full user document replaces
//!   synthesis verbatim, a fragment override replaces only the rendered
//!   sub-configuration.
//! - generic-BSD family: a cloud-init mapping plus a companion network
//!   document; a user override document is deep-merged on top of the
//!   default, and a malformed override degrades to the default.

use crate::config::merge::merge_values;
use crate::errors::{AppliteError, AppliteResult};
use crate::options::ProvisionOptions;
use crate::profile::ComponentProfile;
use crate::template::{TemplateContext, load_template, render};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Data-volume setup attached to the manager persona only.
const MANAGER_DATA_VOLUME: &str = r#"disk_setup:
  /dev/vda:
    table_type: mbr
    layout: false
    overwrite: false
fs_setup:
- device: /dev/vda
  label: data
  partition: none
  filesystem: ext4
  overwrite: false
mounts:
- [ /dev/vda, /opt/data ]
"#;

/// Persona marker consumed by the manager web application.
const MANAGER_PERSONA_MARKER: &str = r#"- path: /opt/web-app/etc/persona
  owner: vmanage:vmanage-admin
  permissions: '0644'
  content: '{"persona":"COMPUTE_AND_DATA"}'
"#;

/// Synthesized hand-off artifacts.
///
/// Owned by the synthesizer until written out; the media collaborator only
/// ever sees the persisted files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDocuments {
    /// Primary boot-configuration document.
    pub bootstrap: String,

    /// Companion network-configuration document (generic-BSD family only).
    pub network: Option<String>,
}

impl SeedDocuments {
    /// Persist the documents to their well-known paths.
    pub fn write_to(&self, bootstrap_path: &Path, network_path: &Path) -> AppliteResult<()> {
        std::fs::write(bootstrap_path, &self.bootstrap)?;
        tracing::debug!(path = %bootstrap_path.display(), "wrote boot configuration");

        if let Some(network) = &self.network {
            std::fs::write(network_path, network)?;
            tracing::debug!(path = %network_path.display(), "wrote network configuration");
        }
        Ok(())
    }
}

/// Composes classifier, renderer, and merger into the final documents.
pub struct Synthesizer<'a> {
    profile: &'a ComponentProfile,
    options: &'a ProvisionOptions,
}

impl<'a> Synthesizer<'a> {
    pub fn new(profile: &'a ComponentProfile, options: &'a ProvisionOptions) -> Self {
        Self { profile, options }
    }

    /// Effective guest hostname.
    pub fn hostname(&self) -> String {
        self.options
            .hostname
            .clone()
            .unwrap_or_else(|| self.profile.default_hostname())
    }

    /// Produce the boot-configuration document(s) for this profile.
    pub fn synthesize(&self) -> AppliteResult<SeedDocuments> {
        if self.profile.is_generic_bsd() {
            self.generic_documents()
        } else {
            self.persona_documents()
        }
    }

    // ------------------------------------------------------------------
    // Persona family
    // ------------------------------------------------------------------

    fn persona_documents(&self) -> AppliteResult<SeedDocuments> {
        // A full user document short-circuits synthesis entirely, no merge.
        if let Some(full) = read_optional(&self.options.user_config_file)? {
            tracing::info!(
                path = %self.options.user_config_file.display(),
                "found full boot configuration, using it verbatim"
            );
            return Ok(SeedDocuments {
                bootstrap: full,
                network: None,
            });
        }

        // A fragment override replaces only the rendered sub-configuration.
        let fragment = match read_optional(&self.options.persona_config_file)? {
            Some(xml) => {
                tracing::info!(
                    path = %self.options.persona_config_file.display(),
                    "found persona sub-configuration override"
                );
                xml
            }
            None => self.rendered_fragment()?,
        };

        tracing::info!(persona = %self.profile.persona_label, "synthesizing boot configuration");
        Ok(SeedDocuments {
            bootstrap: self.persona_cloud_config(&fragment),
            network: None,
        })
    }

    /// Render the persona's sub-configuration template.
    fn rendered_fragment(&self) -> AppliteResult<String> {
        let name = self.profile.template_name.as_deref().ok_or_else(|| {
            AppliteError::Template(format!(
                "persona {} has no sub-configuration template",
                self.profile.persona_label
            ))
        })?;
        let template = load_template(&self.options.template_dir, name)?;
        let ctx = TemplateContext::builtin(
            &self.hostname(),
            &self.options.username,
            &self.options.password,
            &self.options.mgmt_cidr,
            &self.options.mgmt_gateway,
        );
        Ok(render(&template, &ctx))
    }

    /// Assemble the persona cloud-config text around a sub-configuration
    /// fragment. The fragment is embedded as a block scalar, every line
    /// indented four spaces.
    fn persona_cloud_config(&self, fragment: &str) -> String {
        let mut config = String::from("#cloud-config\n");

        if self.profile.is_manager() {
            config.push_str(MANAGER_DATA_VOLUME);
        }

        config.push_str("write_files:\n");

        if self.profile.is_manager() {
            config.push_str(MANAGER_PERSONA_MARKER);
        }

        let indented = fragment
            .split('\n')
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join("\n");

        config.push_str(&format!(
            "- path: /etc/default/personality\n  content: \"{label}\\n\"\n\
             - path: /etc/default/inited\n  content: \"1\\n\"\n\
             - path: /usr/share/viptela/symantec-root-ca.crt\n\
             - path: /etc/confd/init/zcloud.xml\n  content: |\n{indented}\n",
            label = self.profile.persona_label,
        ));

        config
    }

    // ------------------------------------------------------------------
    // Generic-BSD family
    // ------------------------------------------------------------------

    fn generic_documents(&self) -> AppliteResult<SeedDocuments> {
        let mut doc = serde_yaml::to_value(self.generic_defaults())?;

        // Layer the user override on top of the defaults; a malformed or
        // unreadable override degrades to the synthesized default.
        match read_optional(&self.options.user_config_file) {
            Ok(Some(text)) => match serde_yaml::from_str::<Value>(&text) {
                Ok(user) => {
                    tracing::debug!(
                        path = %self.options.user_config_file.display(),
                        "merging user boot configuration over defaults"
                    );
                    doc = merge_values(&doc, &user);
                }
                Err(e) => {
                    let err = AppliteError::Configuration(format!(
                        "cannot parse {}: {}",
                        self.options.user_config_file.display(),
                        e
                    ));
                    tracing::warn!(error = %err, "override ignored, using defaults");
                }
            },
            Ok(None) => {
                tracing::debug!(
                    path = %self.options.user_config_file.display(),
                    "no user boot configuration, using defaults"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot read override, using defaults");
            }
        }

        let bootstrap = format!("#cloud-config\n{}", to_stable_yaml(&doc)?);
        let network = to_stable_yaml(&serde_yaml::to_value(self.network_defaults())?)?;

        Ok(SeedDocuments {
            bootstrap,
            network: Some(network),
        })
    }

    fn generic_defaults(&self) -> GenericBootstrap {
        let hostname = self.hostname();
        GenericBootstrap {
            hostname: hostname.clone(),
            fqdn: hostname,
            users: vec![GuestUser {
                name: self.options.username.clone(),
                sudo: "ALL=(ALL) NOPASSWD: ALL".to_string(),
                groups: "wheel".to_string(),
                home: format!("/usr/home/{}", self.options.username),
                shell: "/bin/tcsh".to_string(),
                plain_text_passwd: self.options.password.clone(),
                lock_passwd: false,
            }],
            ssh_pwauth: true,
            disable_root: false,
            timezone: "UTC".to_string(),
            runcmd: vec![
                // Disable the bootstrap mechanism for subsequent boots so
                // the configuration applies exactly once per image lifetime.
                r#"sed -i '' '/cloudinit_enable="YES"/s/YES/NONE/' /etc/rc.conf"#.to_string(),
            ],
        }
    }

    fn network_defaults(&self) -> NetworkDocument {
        let mut ethernets = BTreeMap::new();
        ethernets.insert(
            "vtnet0".to_string(),
            Ethernet {
                addresses: vec![self.options.mgmt_cidr.clone()],
                gateway4: self.options.mgmt_gateway.clone(),
            },
        );
        NetworkDocument {
            version: 2,
            ethernets,
        }
    }
}

/// Default cloud-init payload for the generic-BSD appliance.
#[derive(Debug, Serialize)]
struct GenericBootstrap {
    hostname: String,
    fqdn: String,
    users: Vec<GuestUser>,
    ssh_pwauth: bool,
    disable_root: bool,
    timezone: String,
    runcmd: Vec<String>,
}

/// Administrative guest account.
#[derive(Debug, Serialize)]
struct GuestUser {
    name: String,
    sudo: String,
    groups: String,
    home: String,
    shell: String,
    plain_text_passwd: String,
    lock_passwd: bool,
}

/// Netplan-style companion network document.
#[derive(Debug, Serialize)]
struct NetworkDocument {
    version: u8,
    ethernets: BTreeMap<String, Ethernet>,
}

#[derive(Debug, Serialize)]
struct Ethernet {
    addresses: Vec<String>,
    gateway4: String,
}

/// Read a file that may legitimately be absent.
fn read_optional(path: &Path) -> AppliteResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(std::fs::read_to_string(path)?))
}

/// Serialize with mapping keys in sorted order at every level so repeated
/// runs (and merged overrides) produce identical documents.
fn to_stable_yaml(value: &Value) -> AppliteResult<String> {
    Ok(serde_yaml::to_string(&sorted_keys(value))?)
}

fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> = map
                .iter()
                .map(|(k, v)| (k.clone(), sorted_keys(v)))
                .collect();
            entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(&b.as_str()));
            Value::Mapping(entries.into_iter().collect())
        }
        Value::Sequence(seq) => Value::Sequence(seq.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}
