//! applite command-line entry point.

mod cli;
mod commands;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.trace);

    match cli.command {
        cli::Command::Classify(args) => commands::classify::execute(args),
        cli::Command::Seed(args) => commands::seed::execute(args),
    }
}
