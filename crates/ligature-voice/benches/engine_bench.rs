//! Criterion benchmarks for the ligature voice engine
//!
//! Run with: cargo bench -p ligature-voice

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ligature_core::Event;
use ligature_voice::{Channel, Engine, EngineConfig};

const SAMPLE_RATE: f32 = 48000.0;
const POLYPHONIES: &[usize] = &[1, 4, 8, 16, 32];

// ============================================================================
// Engine benchmarks
// ============================================================================

fn bench_idle_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Engine/idle");

    for &voices in POLYPHONIES {
        let mut engine = Engine::new(SAMPLE_RATE, voices);
        for key in 0..voices {
            engine.add_event(Event::note_on(0, 48 + key as u8, 0.8));
        }
        engine.process();

        group.bench_with_input(BenchmarkId::from_parameter(voices), &voices, |b, _| {
            b.iter(|| {
                engine.process();
                black_box(engine.voices()[0].output(Channel::Pitch)[0])
            })
        });
    }

    group.finish();
}

fn bench_busy_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Engine/busy");

    for &voices in POLYPHONIES {
        let config = EngineConfig::new(SAMPLE_RATE)
            .with_max_voices(voices)
            .with_glide_time(0.05)
            .with_drift_amount(1.0);
        let mut engine = Engine::from_config(&config);
        let mut key = 36u8;

        group.bench_with_input(BenchmarkId::from_parameter(voices), &voices, |b, _| {
            b.iter(|| {
                // 16 note changes per block, stealing once the pool is full
                for i in 0..8 {
                    engine.add_event(Event::note_on(i * 8, key, 0.9));
                    engine.add_event(Event::note_off(i * 8 + 4, key.wrapping_sub(7) % 128));
                    key = 36 + (key - 35) % 48;
                }
                engine.add_event(Event::pitch_wheel(32, 0.25));
                engine.process();
                black_box(engine.voices()[0].output(Channel::Gate)[63])
            })
        });
    }

    group.finish();
}

fn bench_unison(c: &mut Criterion) {
    let mut engine = Engine::new(SAMPLE_RATE, 16);
    engine.set_unison(true);
    engine.add_event(Event::note_on(0, 60, 1.0));
    engine.process();

    c.bench_function("Engine/unison_legato", |b| {
        b.iter(|| {
            engine.add_event(Event::note_on(8, 64, 1.0));
            engine.add_event(Event::note_off(40, 64));
            engine.process();
            black_box(engine.voices()[15].output(Channel::Pitch)[63])
        })
    });
}

criterion_group!(benches, bench_idle_blocks, bench_busy_blocks, bench_unison);
criterion_main!(benches);
