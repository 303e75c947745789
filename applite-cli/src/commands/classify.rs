use applite::{ComponentKind, ComponentProfile, classify};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Directory scanned for appliance disk images
    #[arg(long, default_value = "/")]
    pub images_dir: PathBuf,

    /// Appliance persona (auto-detected from the image name if not specified)
    #[arg(long)]
    pub component_type: Option<ComponentKind>,

    /// Emit the resolved profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ClassifyArgs) -> anyhow::Result<()> {
    let classified = classify(&args.images_dir, args.component_type)?;
    let profile = ComponentProfile::resolve(classified.kind, classified.disk_image);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("image:    {}", profile.disk_image.display());
    println!(
        "kind:     {}",
        profile
            .kind
            .map(|k| k.as_str().to_string())
            .unwrap_or_else(|| "(unset)".to_string())
    );
    println!("persona:  {}", profile.persona_label);
    println!("ram:      {} MiB", profile.ram_megabytes);
    if let Some(template) = &profile.template_name {
        println!("template: {template}");
    }
    Ok(())
}
