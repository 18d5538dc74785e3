//! Shared helpers for CLI commands.

use anyhow::Context;
use clap::ValueEnum;
use ligature_config::EngineSettings;
use ligature_voice::Channel;
use std::path::Path;

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned, human-readable columns
    #[default]
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// Pretty-printed JSON
    Json,
}

/// Load and validate engine settings, or use the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<EngineSettings> {
    let settings = match path {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("loading engine settings from {}", path.display()))?,
        None => EngineSettings::default(),
    };
    settings.validate().context("invalid engine settings")?;
    Ok(settings)
}

/// Parse a channel name for clap.
pub fn parse_channel(s: &str) -> Result<Channel, String> {
    Channel::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = Channel::ALL.iter().map(|c| c.name()).collect();
        format!("unknown channel '{s}' (expected one of: {})", names.join(", "))
    })
}
