//! Provisioning orchestration.
//!
//! Runs the one-shot pipeline executed before an instance launches:
//! classify the disk image, resolve the persona profile, synthesize the
//! boot-configuration documents, persist them, hand them to the media
//! collaborator, and request pre-launch disk attachments. Boot watching
//! ([`crate::readiness::BootMonitor`]) is separate because it runs
//! repeatedly afterwards under an external scheduler.

use crate::backup::BackupRestore;
use crate::config::{SeedDocuments, Synthesizer};
use crate::console::Console;
use crate::constants::{defaults, paths};
use crate::errors::AppliteResult;
use crate::instance::{DiskInterface, DiskRequest, InstanceControl};
use crate::media::MediaBuilder;
use crate::options::ProvisionOptions;
use crate::profile::{ComponentKind, ComponentProfile, classify};
use crate::readiness::BootMonitor;
use std::path::PathBuf;

/// Everything produced by one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionedInstance {
    /// Resolved persona profile, immutable for the instance's lifetime.
    pub profile: ComponentProfile,

    /// Synthesized hand-off documents.
    pub documents: SeedDocuments,

    /// Path of the seed media requested from the collaborator.
    pub seed_image: PathBuf,
}

/// One-shot provisioning pipeline.
pub struct Provisioner {
    options: ProvisionOptions,
}

impl Provisioner {
    pub fn new(options: ProvisionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProvisionOptions {
        &self.options
    }

    /// Classify, synthesize, persist, and request media creation.
    pub fn provision(
        &self,
        explicit: Option<ComponentKind>,
        media: &dyn MediaBuilder,
    ) -> AppliteResult<ProvisionedInstance> {
        let classified = classify(&self.options.images_dir, explicit)?;
        let profile = ComponentProfile::resolve(classified.kind, classified.disk_image);
        tracing::info!(
            persona = %profile.persona_label,
            image = %profile.disk_image.display(),
            ram_mib = profile.ram_megabytes,
            "provisioning appliance"
        );

        let documents = Synthesizer::new(&profile, &self.options).synthesize()?;
        let bootstrap_path = self.options.bootstrap_config_path();
        let network_path = self.options.network_config_path();
        documents.write_to(&bootstrap_path, &network_path)?;

        let seed_image = self.options.seed_image_path();
        let network = documents.network.as_ref().map(|_| network_path.as_path());
        media.create_media(&bootstrap_path, network, &seed_image)?;

        Ok(ProvisionedInstance {
            profile,
            documents,
            seed_image,
        })
    }

    /// Disks the instance must carry before launch: the manager data volume
    /// plus any environment-requested extra disk.
    pub fn disk_requests(&self, profile: &ComponentProfile) -> Vec<DiskRequest> {
        let mut requests = Vec::new();
        if profile.is_manager() {
            requests.push(DiskRequest {
                size_spec: defaults::MANAGER_DATA_DISK.to_string(),
                interface: DiskInterface::Virtio,
            });
        }
        if let Some(size_spec) = &self.options.extra_disk {
            requests.push(DiskRequest {
                size_spec: size_spec.clone(),
                interface: DiskInterface::Ide,
            });
        }
        requests
    }

    /// Full pipeline: provision, then apply disk requests to the instance.
    pub fn run(
        &self,
        explicit: Option<ComponentKind>,
        media: &dyn MediaBuilder,
        control: &mut dyn InstanceControl,
    ) -> AppliteResult<ProvisionedInstance> {
        let instance = self.provision(explicit, media)?;
        for request in self.disk_requests(&instance.profile) {
            tracing::debug!(size = %request.size_spec, interface = %request.interface, "attaching disk");
            control.add_disk(&request)?;
        }
        Ok(instance)
    }

    /// Build the boot monitor for a provisioned profile, wiring the backup
    /// restoration post-boot action for the generic-BSD family.
    pub fn boot_monitor(
        &self,
        profile: &ComponentProfile,
        console: Box<dyn Console>,
    ) -> BootMonitor {
        let monitor = BootMonitor::new(profile, console);
        if profile.is_generic_bsd() {
            monitor.with_post_boot(Box::new(BackupRestore::new(
                self.options.backup_file.clone(),
                PathBuf::from(paths::BACKUP_HELPER),
                self.options.username.clone(),
                self.options.password.clone(),
            )))
        } else {
            monitor
        }
    }
}
