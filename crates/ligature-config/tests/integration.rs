//! Integration tests for ligature-config.
//!
//! These tests verify file round-trips and that settings and scripts drive
//! the engine end to end.

use ligature_config::{ConfigError, EngineSettings, EventScript, ScheduledEvent, ValidationError};
use ligature_core::{BLOCK_SIZE, Event};
use ligature_voice::Channel;
use tempfile::TempDir;

const STEAL_SCRIPT: &str = r#"
name = "steal"

[[events]]
type = "note_on"
key = 60
velocity = 0.8

[[events]]
block = 1
time = 32
type = "note_on"
key = 61
velocity = 0.8
"#;

#[test]
fn settings_round_trip_through_disk() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("engine.toml");

    let settings = EngineSettings {
        max_voices: 8,
        polyphony: Some(2),
        glide_time: 0.03,
        drift_amount: 0.25,
        unison: true,
        ..EngineSettings::default()
    };
    settings.save(&path).expect("save creates parent dirs");

    let loaded = EngineSettings::load(&path).expect("load");
    assert_eq!(loaded, settings);
}

#[test]
fn script_round_trip_through_disk() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("script.toml");

    let script = EventScript::from_events([
        ScheduledEvent {
            block: 0,
            event: Event::note_on(0, 60, 1.0),
        },
        ScheduledEvent {
            block: 0,
            event: Event::controller(8, 74, 0.5),
        },
        ScheduledEvent {
            block: 3,
            event: Event::note_off(63, 60),
        },
    ]);
    script.save(&path).expect("save");

    let loaded = EventScript::load(&path).expect("load");
    assert_eq!(loaded, script);
    assert_eq!(loaded.block_count(), 4);
}

#[test]
fn missing_file_reports_path() {
    let err = EngineSettings::load("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("/definitely/not/here.toml"));
}

#[test]
fn invalid_script_reports_every_entry() {
    let script = EventScript::from_toml(
        r#"
        [[events]]
        type = "note_on"

        [[events]]
        type = "wobble"

        [[events]]
        type = "controller"
        number = 1
        value = 2.0
        "#,
    )
    .expect("valid TOML");

    let err = script.validate().unwrap_err();
    assert_eq!(err.count(), 3, "got {err}");
    assert!(matches!(err, ValidationError::Multiple(_)));
}

#[test]
fn scripted_steal_renders_retrigger() {
    let settings = EngineSettings {
        max_voices: 1,
        ..EngineSettings::default()
    };
    let mut engine = settings.build_engine().expect("valid settings");
    let script = EventScript::from_toml(STEAL_SCRIPT).expect("valid TOML");
    let schedule = script.to_schedule().expect("valid script");

    let mut gates = Vec::new();
    for block in 0..script.block_count() {
        for scheduled in schedule.iter().filter(|s| s.block == block) {
            assert!(engine.add_event(scheduled.event));
        }
        engine.process();
        gates.extend_from_slice(engine.voices()[0].output(Channel::Gate));
    }

    assert_eq!(gates.len(), 2 * BLOCK_SIZE);
    let zeros: Vec<usize> = (0..gates.len()).filter(|&i| gates[i] == 0.0).collect();
    assert_eq!(zeros, vec![BLOCK_SIZE + 31]);
    assert_eq!(engine.voices()[0].owner(), Some(61));
}

#[test]
fn tuning_changes_rendered_pitch() {
    let settings = EngineSettings::from_toml(
        r#"
        [tuning]
        reference_note = 60.0
        divisions = 24.0
        "#,
    )
    .expect("valid TOML");
    let mut engine = settings.build_engine().expect("valid settings");
    engine.add_event(Event::note_on(0, 84, 1.0));
    engine.process();

    let pitch = engine.voices()[0].output(Channel::Pitch)[BLOCK_SIZE - 1];
    assert!((pitch - 1.0).abs() < 1e-6, "24 quarter tones is one octave, got {pitch}");
}
