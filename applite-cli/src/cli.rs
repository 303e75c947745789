//! Top-level CLI definition and logging setup.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Boot-config seeding and boot-readiness detection for virtual network appliances"
)]
pub struct Cli {
    /// Enable trace level logging
    #[arg(long, global = true)]
    pub trace: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect the appliance persona and resource profile from the image directory
    Classify(crate::commands::classify::ClassifyArgs),

    /// Synthesize boot-configuration documents and seed media
    Seed(crate::commands::seed::SeedArgs),
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise the floor is `info`, or `trace` with
/// the `--trace` flag.
pub fn init_logging(trace: bool) {
    let default_level = if trace { "trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
