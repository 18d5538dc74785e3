//! Integration tests for ligature-voice.
//!
//! Tests cover block-level signal continuity, allocation and stealing,
//! unison note handling, the sustain pedal, resets and cross-thread event
//! delivery.

use ligature_core::{BLOCK_SIZE, DriftSource, EqualTemperament, Event, KeyStatus, Scale};
use ligature_voice::{
    CC_ALL_NOTES_OFF, Channel, DRIFT_SCALE, DRIFT_TIME_SECONDS, Engine, EngineConfig,
};

const SR: f32 = 48000.0;

fn log_pitch(key: u8) -> f32 {
    EqualTemperament::default().note_to_log_pitch(f32::from(key))
}

fn gate(engine: &Engine, voice: usize) -> [f32; BLOCK_SIZE] {
    *engine.voices()[voice].output(Channel::Gate)
}

fn pitch(engine: &Engine, voice: usize) -> [f32; BLOCK_SIZE] {
    *engine.voices()[voice].output(Channel::Pitch)
}

// ---------------------------------------------------------------------------
// 1. Block continuity
// ---------------------------------------------------------------------------

#[test]
fn empty_blocks_hold_previous_state() {
    let mut engine = Engine::new(SR, 4);
    engine.add_event(Event::note_on(10, 60, 0.7));
    engine.add_event(Event::note_on(20, 67, 0.9));
    engine.process();

    let last: Vec<(f32, f32)> = engine
        .voices()
        .iter()
        .map(|v| {
            (
                v.output(Channel::Gate)[BLOCK_SIZE - 1],
                v.output(Channel::Pitch)[BLOCK_SIZE - 1],
            )
        })
        .collect();

    for _ in 0..3 {
        engine.process();
        for (voice, &(g, p)) in engine.voices().iter().zip(&last) {
            assert!(
                voice.output(Channel::Gate).iter().all(|&x| x == g),
                "voice {} gate drifted from {g}",
                voice.index()
            );
            assert!(
                voice.output(Channel::Pitch).iter().all(|&x| x == p),
                "voice {} pitch drifted from {p}",
                voice.index()
            );
        }
    }
}

#[test]
fn every_voice_completes_every_block() {
    let mut engine = Engine::new(SR, 8);
    engine.set_polyphony(3);
    let events = [
        Event::note_on(0, 60, 1.0),
        Event::note_on(63, 62, 1.0),
        Event::note_off(64, 60),
        Event::note_on(5, 64, 1.0),
        Event::sustain_pedal(30, 1.0),
        Event::pitch_wheel(12, -0.5),
    ];

    for event in events {
        engine.add_event(event);
        engine.process();
        for voice in engine.voices() {
            assert_eq!(
                voice.frames_processed(),
                BLOCK_SIZE,
                "voice {} left frames unwritten after {}",
                voice.index(),
                event.kind.name()
            );
        }
    }
}

#[test]
fn elapsed_time_counts_from_note_start() {
    let mut engine = Engine::new(SR, 1);
    engine.add_event(Event::note_on(16, 60, 1.0));
    engine.process();

    let elapsed = engine.voices()[0].output(Channel::ElapsedTime);
    assert!(elapsed[..16].iter().all(|&t| t == 0.0));
    assert!((elapsed[16] - 1.0 / SR).abs() < 1e-9);
    assert!((elapsed[BLOCK_SIZE - 1] - 48.0 / SR).abs() < 1e-9);
}

#[test]
fn voice_index_channel_is_constant() {
    let mut engine = Engine::new(SR, 4);
    engine.add_event(Event::note_on(0, 60, 1.0));
    engine.process();
    for voice in engine.voices() {
        let expected = voice.index() as f32;
        assert!(
            voice
                .output(Channel::VoiceIndex)
                .iter()
                .all(|&v| v == expected)
        );
    }
}

// ---------------------------------------------------------------------------
// 2. Allocation and stealing
// ---------------------------------------------------------------------------

#[test]
fn round_robin_assigns_distinct_voices() {
    let mut engine = Engine::new(SR, 6);
    engine.set_polyphony(4);
    for key in [60, 62, 64, 65] {
        engine.add_event(Event::note_on(0, key, 1.0));
    }
    engine.process();

    let mut owners: Vec<u8> = engine.voices().iter().filter_map(|v| v.owner()).collect();
    owners.sort_unstable();
    assert_eq!(owners, vec![60, 62, 64, 65], "every voice owns a distinct key");
}

#[test]
fn stealing_retriggers_with_one_sample_gap() {
    let mut engine = Engine::new(SR, 1);
    engine.add_event(Event::note_on(0, 60, 1.0));
    engine.process();

    engine.add_event(Event::note_on(32, 61, 1.0));
    engine.process();

    let g = gate(&engine, 0);
    let zeros: Vec<usize> = (0..BLOCK_SIZE).filter(|&i| g[i] == 0.0).collect();
    assert_eq!(zeros, vec![31], "gate touches 0 for exactly one sample");

    let p = pitch(&engine, 0);
    assert!((p[30] - log_pitch(60)).abs() < 1e-6);
    assert!(
        (p[32] - log_pitch(61)).abs() < 1e-6,
        "pitch moves to key 61 at the event time"
    );
    assert_eq!(engine.voices()[0].owner(), Some(61));
}

#[test]
fn stealing_picks_nearest_key() {
    let mut engine = Engine::new(SR, 3);
    for key in [36, 60, 84] {
        engine.add_event(Event::note_on(0, key, 1.0));
    }
    engine.add_event(Event::note_on(8, 80, 1.0));
    engine.process();

    assert_eq!(engine.newest_voice(), Some(2));
    assert_eq!(engine.voices()[2].owner(), Some(80));
    assert_eq!(engine.busy_voice_count(), 3);
}

#[test]
fn key_zero_is_playable() {
    let mut engine = Engine::new(SR, 2);
    engine.add_event(Event::note_on(0, 0, 1.0));
    engine.add_event(Event::note_on(0, 1, 1.0));
    engine.process();
    assert_eq!(engine.busy_voice_count(), 2, "key 0 does not read as a free voice");

    engine.add_event(Event::note_off(0, 0));
    engine.process();
    assert_eq!(engine.busy_voice_count(), 1);
    assert_eq!(engine.voices()[1].owner(), Some(1));
}

#[test]
fn release_keeps_gliding_pitch() {
    let config = EngineConfig::new(SR).with_max_voices(1).with_glide_time(0.01);
    let mut engine = Engine::from_config(&config);
    engine.add_event(Event::note_on(0, 60, 1.0));
    engine.add_event(Event::note_on(32, 72, 1.0));
    engine.add_event(Event::note_off(40, 72));
    engine.process();

    let p = pitch(&engine, 0);
    assert!(
        p[BLOCK_SIZE - 1] > p[40],
        "pitch keeps moving toward 72 after release"
    );
    assert!(p[BLOCK_SIZE - 1] < log_pitch(72));
}

// ---------------------------------------------------------------------------
// 3. Unison
// ---------------------------------------------------------------------------

#[test]
fn unison_overlap_returns_to_held_key_without_gate_drop() {
    let mut engine = Engine::new(SR, 4);
    engine.set_unison(true);
    engine.add_event(Event::note_on(0, 60, 1.0));
    engine.add_event(Event::note_on(8, 64, 1.0));
    engine.process();
    for v in 0..4 {
        assert!((pitch(&engine, v)[BLOCK_SIZE - 1] - log_pitch(64)).abs() < 1e-6);
    }

    engine.add_event(Event::note_off(16, 64));
    engine.process();
    for v in 0..4 {
        assert!(
            gate(&engine, v).iter().all(|&g| g == 1.0),
            "voice {v}: no gate drop while a key is held"
        );
        let p = pitch(&engine, v);
        assert!((p[15] - log_pitch(64)).abs() < 1e-6);
        assert!((p[16] - log_pitch(60)).abs() < 1e-6, "voice {v} back on key 60");
        assert_eq!(engine.voices()[v].owner(), Some(60));
    }

    engine.add_event(Event::note_off(0, 60));
    engine.process();
    for v in 0..4 {
        assert!(gate(&engine, v).iter().all(|&g| g == 0.0));
    }
    assert_eq!(engine.busy_voice_count(), 0);
}

#[test]
fn unison_fallback_keeps_current_velocity() {
    let mut engine = Engine::new(SR, 2);
    engine.set_unison(true);
    engine.add_event(Event::note_on(0, 60, 0.3));
    engine.add_event(Event::note_on(0, 67, 0.9));
    engine.add_event(Event::note_off(10, 67));
    engine.process();

    assert_eq!(gate(&engine, 0)[BLOCK_SIZE - 1], 0.9);
    assert_eq!(engine.voices()[1].velocity(), 0.9);
}

// ---------------------------------------------------------------------------
// 4. Sustain
// ---------------------------------------------------------------------------

#[test]
fn sustain_holds_until_pedal_release() {
    let mut engine = Engine::new(SR, 4);
    engine.add_event(Event::sustain_pedal(0, 1.0));
    engine.add_event(Event::note_on(4, 60, 0.8));
    engine.add_event(Event::note_off(20, 60));
    engine.process();
    assert!(engine.is_sustain_active());
    assert!(gate(&engine, 0)[4..].iter().all(|&g| g == 0.8));
    assert_eq!(
        engine.key_state(60).map(|k| k.status),
        Some(KeyStatus::Sustain)
    );

    engine.process();
    assert!(gate(&engine, 0).iter().all(|&g| g == 0.8), "still sounding");

    engine.add_event(Event::sustain_pedal(24, 0.0));
    engine.process();
    let g = gate(&engine, 0);
    assert!(g[..24].iter().all(|&x| x == 0.8));
    assert!(g[24..].iter().all(|&x| x == 0.0));
    assert_eq!(engine.key_state(60).map(|k| k.status), Some(KeyStatus::Off));
}

#[test]
fn all_notes_off_ignores_pedal() {
    let mut engine = Engine::new(SR, 2);
    engine.add_event(Event::sustain_pedal(0, 1.0));
    engine.add_event(Event::note_on(0, 60, 1.0));
    engine.add_event(Event::note_off(0, 60));
    engine.add_event(Event::controller(8, CC_ALL_NOTES_OFF, 1.0));
    engine.process();

    assert_eq!(engine.busy_voice_count(), 0);
    assert!(gate(&engine, 0)[8..].iter().all(|&g| g == 0.0));
}

// ---------------------------------------------------------------------------
// 5. Reset and threading
// ---------------------------------------------------------------------------

#[test]
fn reset_twice_equals_reset_once() {
    let mut engine = Engine::new(SR, 4);
    engine.set_drift_amount(1.0);
    engine.add_event(Event::note_on(0, 60, 1.0));
    engine.add_event(Event::sustain_pedal(3, 1.0));
    engine.process();
    engine.add_event(Event::note_on(0, 62, 1.0));

    engine.reset();
    let once = format!("{engine:?}");
    engine.reset();
    assert_eq!(format!("{engine:?}"), once);

    assert_eq!(engine.busy_voice_count(), 0);
    assert_eq!(engine.pending_events(), 0);
    assert_eq!(engine.key_states().count_held(), 0);
    assert!(!engine.is_sustain_active());
}

#[test]
fn events_from_another_thread() {
    let mut engine = Engine::new(SR, 4);
    let mut sender = engine.event_sender().expect("fresh engine has a sender");

    let producer = std::thread::spawn(move || {
        for (i, key) in [60u8, 64, 67].into_iter().enumerate() {
            assert!(sender.push(Event::note_on(i * 8, key, 1.0)));
        }
    });
    producer.join().expect("producer thread panicked");

    engine.process();
    assert_eq!(engine.busy_voice_count(), 3);
    assert!(engine.diagnostics().is_clean());
}

// ---------------------------------------------------------------------------
// 6. Pitch bend and drift
// ---------------------------------------------------------------------------

/// Log-pitch offset of each active voice from its owner's note, last frame.
fn pitch_offsets(engine: &Engine) -> Vec<f32> {
    engine
        .voices()
        .iter()
        .map(|v| {
            let key = v.owner().expect("voice holds a note");
            v.output(Channel::Pitch)[BLOCK_SIZE - 1] - log_pitch(key)
        })
        .collect()
}

#[test]
fn pitch_wheel_bends_every_voice_by_range() {
    let mut engine = Engine::new(SR, 3);
    engine.set_pitch_bend_in_semitones(4.0);
    for key in [60, 64, 67] {
        engine.add_event(Event::note_on(0, key, 1.0));
    }
    engine.add_event(Event::pitch_wheel(0, 0.5));

    // Controller glide is 10 ms, under eight blocks
    for _ in 0..20 {
        engine.process();
    }

    for voice in engine.voices() {
        let key = voice.owner().expect("voice holds a note");
        for &p in voice.output(Channel::Pitch) {
            let bend = p - log_pitch(key);
            assert!(
                (bend - 1.0 / 6.0).abs() < 1e-6,
                "voice {} bent by {bend}, expected 1/6 octave",
                voice.index()
            );
        }
    }
}

#[test]
fn zero_drift_leaves_pitch_untouched() {
    let mut engine = Engine::new(SR, 4);
    for key in [60, 62, 64, 65] {
        engine.add_event(Event::note_on(0, key, 1.0));
    }
    for _ in 0..100 {
        engine.process();
    }

    for (i, offset) in pitch_offsets(&engine).into_iter().enumerate() {
        assert_eq!(offset, 0.0, "voice {i} drifted with drift amount 0");
    }
}

#[test]
fn drift_offsets_pitch_per_voice() {
    let mut engine = Engine::new(SR, 4);
    engine.set_drift_amount(1.0);
    for key in [60, 62, 64, 65] {
        engine.add_event(Event::note_on(0, key, 1.0));
    }

    // The first drift target is chosen in block 0 and held for at least one
    // drift time, which is also how long the drift glide takes to arrive.
    let blocks = (SR * DRIFT_TIME_SECONDS) as usize / BLOCK_SIZE;
    for _ in 0..blocks {
        engine.process();
    }

    let offsets = pitch_offsets(&engine);
    for (i, &offset) in offsets.iter().enumerate() {
        let expected = DriftSource::for_voice(i).next_value() * DRIFT_SCALE;
        assert!(
            (offset - expected).abs() < 1e-6,
            "voice {i}: offset {offset}, expected {expected}"
        );
        assert!(offset != 0.0 && offset.abs() <= DRIFT_SCALE);
    }
    for i in 0..offsets.len() {
        for j in i + 1..offsets.len() {
            assert_ne!(offsets[i], offsets[j], "voices {i} and {j} drift together");
        }
    }
}
