use applite::media::{CloudLocalds, MediaBuilder};
use applite::{AppliteResult, ComponentKind, ProvisionOptions, Provisioner};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// VM hostname (default: sdwan-<component-type>, or freebsd)
    #[arg(long)]
    pub hostname: Option<String>,

    /// Guest account name
    #[arg(long, default_value = "admin")]
    pub username: String,

    /// Guest account password
    #[arg(long, default_value = "admin")]
    pub password: String,

    /// Appliance persona (auto-detected from the image name if not specified)
    #[arg(long)]
    pub component_type: Option<ComponentKind>,

    /// Management address in CIDR form
    #[arg(long, default_value = "10.0.0.15/24")]
    pub mgmt_cidr: String,

    /// Management gateway address
    #[arg(long, default_value = "10.0.0.2")]
    pub mgmt_gateway: String,

    /// Directory scanned for appliance disk images
    #[arg(long, default_value = "/")]
    pub images_dir: PathBuf,

    /// Directory holding persona sub-configuration templates
    #[arg(long, default_value = "/templates")]
    pub template_dir: PathBuf,

    /// Optional full boot-configuration override document
    #[arg(long, default_value = "/config/cloud-init.yaml")]
    pub user_config: PathBuf,

    /// Optional persona sub-configuration override fragment
    #[arg(long, default_value = "/config/zcloud.xml")]
    pub persona_config: PathBuf,

    /// Directory the documents and seed media are written to
    #[arg(long, default_value = "/")]
    pub output_dir: PathBuf,

    /// Size spec for an extra disk to attach before launch
    #[arg(long, env = applite::constants::envs::ADD_DISK)]
    pub add_disk: Option<String>,

    /// Write the documents but skip cloud-localds media creation
    #[arg(long)]
    pub skip_media: bool,
}

/// Media builder used with `--skip-media`.
struct SkipMedia;

impl MediaBuilder for SkipMedia {
    fn create_media(
        &self,
        _bootstrap: &Path,
        _network: Option<&Path>,
        output: &Path,
    ) -> AppliteResult<()> {
        tracing::debug!(output = %output.display(), "media creation skipped");
        Ok(())
    }
}

pub fn execute(args: SeedArgs) -> anyhow::Result<()> {
    let options = ProvisionOptions {
        hostname: args.hostname,
        username: args.username,
        password: args.password,
        mgmt_cidr: args.mgmt_cidr,
        mgmt_gateway: args.mgmt_gateway,
        images_dir: args.images_dir,
        template_dir: args.template_dir,
        user_config_file: args.user_config,
        persona_config_file: args.persona_config,
        output_dir: args.output_dir,
        extra_disk: args.add_disk,
        ..ProvisionOptions::default()
    };

    let provisioner = Provisioner::new(options);
    let media: Box<dyn MediaBuilder> = if args.skip_media {
        Box::new(SkipMedia)
    } else {
        Box::new(CloudLocalds)
    };

    let instance = provisioner.provision(args.component_type, media.as_ref())?;

    println!("persona:   {}", instance.profile.persona_label);
    println!("ram:       {} MiB", instance.profile.ram_megabytes);
    println!(
        "bootstrap: {}",
        provisioner.options().bootstrap_config_path().display()
    );
    if instance.documents.network.is_some() {
        println!(
            "network:   {}",
            provisioner.options().network_config_path().display()
        );
    }
    if !args.skip_media {
        println!("seed:      {}", instance.seed_image.display());
    }

    // Disk attachment belongs to the VM-process collaborator; report what
    // it must carry before launch.
    for request in provisioner.disk_requests(&instance.profile) {
        println!("disk:      {} ({})", request.size_spec, request.interface);
    }

    Ok(())
}
