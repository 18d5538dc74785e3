//! Ligature CLI - render event scripts through the ligature voice engine.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ligature")]
#[command(author, version, about = "Ligature voice engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an event script and print per-voice control signals
    Render(commands::render::RenderArgs),

    /// Show engine constants and the effective settings
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered output can be piped
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
