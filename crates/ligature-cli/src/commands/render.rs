//! Offline rendering of event scripts.

use anyhow::Context;
use clap::Args;
use ligature_config::{EventScript, ScheduledEvent};
use ligature_core::{BLOCK_SIZE, EqualTemperament};
use ligature_voice::{Channel, Engine};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::common::{OutputFormat, load_settings, parse_channel};

/// Render an event script block by block.
#[derive(Args)]
pub struct RenderArgs {
    /// Event script (TOML)
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Engine settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Blocks to render (default: through the last scripted block)
    #[arg(short, long)]
    blocks: Option<usize>,

    /// Channel to print; repeat for several
    #[arg(long = "channel", value_parser = parse_channel, default_values = ["gate", "pitch"])]
    channels: Vec<Channel>,

    /// Only print this voice
    #[arg(long)]
    voice: Option<usize>,

    /// Print every Nth frame (table and CSV)
    #[arg(long, default_value = "1")]
    stride: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// One voice's outputs for one block.
#[derive(Debug, Serialize)]
struct VoiceFrames {
    voice: usize,
    owner: Option<u8>,
    channels: Vec<ChannelFrames>,
}

#[derive(Debug, Serialize)]
struct ChannelFrames {
    name: &'static str,
    frames: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct BlockFrames {
    block: usize,
    voices: Vec<VoiceFrames>,
}

/// Run the render command.
pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if args.stride == 0 {
        anyhow::bail!("--stride must be at least 1");
    }

    let settings = load_settings(args.config.as_deref())?;
    let script = EventScript::load(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;
    let schedule = script
        .to_schedule()
        .with_context(|| format!("invalid script {}", args.script.display()))?;

    let mut engine = settings.build_engine()?;
    if let Some(voice) = args.voice
        && voice >= engine.polyphony()
    {
        anyhow::bail!(
            "--voice {voice} is out of range (polyphony {})",
            engine.polyphony()
        );
    }

    let blocks = args.blocks.unwrap_or_else(|| script.block_count().max(1));
    tracing::info!(
        script = %args.script.display(),
        events = schedule.len(),
        blocks,
        polyphony = engine.polyphony(),
        "rendering"
    );

    let rendered = render(&mut engine, &schedule, blocks, &args.channels, args.voice);

    let diagnostics = engine.diagnostics();
    if diagnostics.is_clean() {
        tracing::info!(busy_voices = engine.busy_voice_count(), "render finished");
    } else {
        tracing::warn!(
            dropped_events = diagnostics.dropped_events,
            clamped_times = diagnostics.clamped_times,
            invalid_keys = diagnostics.invalid_keys,
            "render finished with event contract violations"
        );
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    match args.format {
        OutputFormat::Table => write_table(&mut out, &rendered, &args.channels, args.stride)?,
        OutputFormat::Csv => write_csv(&mut out, &rendered, &args.channels, args.stride)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &rendered)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if let Some(path) = &args.output {
        tracing::info!(path = %path.display(), "wrote output");
    }
    Ok(())
}

/// Run `blocks` blocks, queueing each scheduled event in its block.
fn render(
    engine: &mut Engine<EqualTemperament>,
    schedule: &[ScheduledEvent],
    blocks: usize,
    channels: &[Channel],
    only_voice: Option<usize>,
) -> Vec<BlockFrames> {
    let mut pending = schedule.iter().peekable();
    let mut rendered = Vec::with_capacity(blocks);

    for block in 0..blocks {
        while let Some(scheduled) = pending.next_if(|s| s.block <= block) {
            if !engine.add_event(scheduled.event) {
                tracing::warn!(
                    block,
                    kind = scheduled.event.kind.name(),
                    "event queue full, event dropped"
                );
            }
        }
        engine.process();

        let voices = engine
            .voices()
            .iter()
            .filter(|v| only_voice.is_none_or(|i| i == v.index()))
            .map(|v| VoiceFrames {
                voice: v.index(),
                owner: v.owner(),
                channels: channels
                    .iter()
                    .map(|&c| ChannelFrames {
                        name: c.name(),
                        frames: v.output(c).to_vec(),
                    })
                    .collect(),
            })
            .collect();
        rendered.push(BlockFrames { block, voices });
    }

    let skipped = pending.count();
    if skipped > 0 {
        tracing::warn!(skipped, blocks, "events after the last rendered block were not played");
    }
    rendered
}

fn write_table(
    out: &mut dyn Write,
    rendered: &[BlockFrames],
    channels: &[Channel],
    stride: usize,
) -> std::io::Result<()> {
    write!(out, "{:>6} {:>5} {:>5} {:>5}", "block", "frame", "voice", "owner")?;
    for channel in channels {
        write!(out, " {:>10}", channel.name())?;
    }
    writeln!(out)?;

    for block in rendered {
        for frame in (0..BLOCK_SIZE).step_by(stride) {
            for voice in &block.voices {
                let owner = voice.owner.map_or_else(|| "-".to_string(), |k| k.to_string());
                write!(
                    out,
                    "{:>6} {:>5} {:>5} {:>5}",
                    block.block, frame, voice.voice, owner
                )?;
                for channel in &voice.channels {
                    write!(out, " {:>10.6}", channel.frames[frame])?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn write_csv(
    out: &mut dyn Write,
    rendered: &[BlockFrames],
    channels: &[Channel],
    stride: usize,
) -> std::io::Result<()> {
    write!(out, "block,frame,voice,owner")?;
    for channel in channels {
        write!(out, ",{}", channel.name())?;
    }
    writeln!(out)?;

    for block in rendered {
        for frame in (0..BLOCK_SIZE).step_by(stride) {
            for voice in &block.voices {
                let owner = voice.owner.map(|k| k.to_string()).unwrap_or_default();
                write!(out, "{},{},{},{}", block.block, frame, voice.voice, owner)?;
                for channel in &voice.channels {
                    write!(out, ",{}", channel.frames[frame])?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
