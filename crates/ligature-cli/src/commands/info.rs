//! Display engine constants and effective settings.

use clap::Args;
use ligature_config::EngineSettings;
use ligature_core::{BLOCK_SIZE, KEY_COUNT};
use ligature_voice::{
    CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_MOD_WHEEL, CC_X, CC_Y, CONTROLLER_GLIDE_SECONDS,
    Channel, DRIFT_TIME_SECONDS,
};
use std::path::PathBuf;

use super::common::{OutputFormat, load_settings};

/// Display engine information.
#[derive(Args)]
pub struct InfoArgs {
    /// Engine settings file (TOML); defaults are shown without one
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format (table or json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let source = args
        .config
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());

    match args.format {
        OutputFormat::Json => {
            let channels: Vec<&str> = Channel::ALL.iter().map(|c| c.name()).collect();
            let info = serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "block_size": BLOCK_SIZE,
                "key_count": KEY_COUNT,
                "channels": channels,
                "source": source,
                "settings": settings,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Table | OutputFormat::Csv => print_table(&settings, &source),
    }
    Ok(())
}

fn print_table(settings: &EngineSettings, source: &str) {
    let channels: Vec<&str> = Channel::ALL.iter().map(|c| c.name()).collect();
    let block_ms = BLOCK_SIZE as f64 * 1000.0 / f64::from(settings.sample_rate);

    println!("Ligature {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Block size:      {BLOCK_SIZE} samples ({block_ms:.3} ms)");
    println!("Keys:            {KEY_COUNT}");
    println!("Channels:        {}", channels.join(", "));
    println!(
        "Controllers:     {CC_MOD_WHEEL} mod, {CC_X} x, {CC_Y} y, \
         {CC_ALL_SOUND_OFF} all sound off, {CC_ALL_NOTES_OFF} all notes off"
    );
    println!(
        "Glides:          controllers {:.0} ms, drift {DRIFT_TIME_SECONDS:.1} s",
        CONTROLLER_GLIDE_SECONDS * 1000.0
    );
    println!();
    println!("Settings ({source}):");
    println!("  Sample rate:   {} Hz", settings.sample_rate);
    println!(
        "  Voices:        {} (polyphony {})",
        settings.max_voices,
        settings.polyphony.unwrap_or(settings.max_voices)
    );
    println!("  Queue:         {} events", settings.queue_capacity);
    println!("  Glide time:    {:.3} s", settings.glide_time);
    println!("  Drift amount:  {:.2}", settings.drift_amount);
    println!("  Bend range:    {:.1} semitones", settings.pitch_bend_semitones);
    println!(
        "  Unison:        {}",
        if settings.unison { "on" } else { "off" }
    );
    println!(
        "  Tuning:        {}-EDO, A440 at note {}",
        settings.tuning.divisions, settings.tuning.reference_note
    );
}
