//! Literal placeholder substitution for persona sub-configuration templates.
//!
//! Templates carry placeholders in the exact lexical form `{{ name }}`.
//! Rendering is plain find/replace per known key: no expression language,
//! conditionals, or escaping. Placeholders with no matching context key are
//! left verbatim in the output.

use crate::errors::{AppliteError, AppliteResult};
use std::path::Path;

/// Placeholder values consumed by [`render`].
///
/// Keys keep insertion order so substitution is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: Vec<(String, String)>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the six documented placeholder keys from instance identity.
    ///
    /// The management address arrives in CIDR form and is split into
    /// separate address and prefix-length values here.
    pub fn builtin(
        hostname: &str,
        username: &str,
        password: &str,
        mgmt_cidr: &str,
        mgmt_gateway: &str,
    ) -> Self {
        let (mgmt_ip, mgmt_prefix) = split_cidr(mgmt_cidr);
        let mut ctx = Self::new();
        ctx.set("hostname", hostname);
        ctx.set("username", username);
        ctx.set("password", password);
        ctx.set("mgmt_ip", mgmt_ip);
        ctx.set("mgmt_prefix", mgmt_prefix);
        ctx.set("mgmt_gw", mgmt_gateway);
        ctx
    }

    /// Set a placeholder value, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.vars.retain(|(k, _)| *k != key);
        self.vars.push((key, value.into()));
    }

    /// Look up a placeholder value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Split a CIDR (`address/prefix`) into address and prefix length.
///
/// A bare address yields an empty prefix rather than an error.
pub fn split_cidr(cidr: &str) -> (&str, &str) {
    match cidr.split_once('/') {
        Some((addr, prefix)) => (addr, prefix),
        None => (cidr, ""),
    }
}

/// Replace every recognized `{{ key }}` placeholder with its context value.
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    let mut out = template.to_string();
    for (key, value) in ctx.iter() {
        out = out.replace(&format!("{{{{ {key} }}}}"), value);
    }
    out
}

/// Load a template fragment from the template directory.
pub fn load_template(template_dir: &Path, name: &str) -> AppliteResult<String> {
    let path = template_dir.join(name);
    std::fs::read_to_string(&path)
        .map_err(|e| AppliteError::Template(format!("cannot read {}: {}", path.display(), e)))
}
