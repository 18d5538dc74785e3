//! Voice allocation and note coordination across the pool.
//!
//! The [`VoiceAllocator`] decides which voice answers each key event and keeps
//! the key-state table in step with the voices.
//!
//! ## Polyphonic mode
//!
//! - **Note on**: the next free voice after the last one found (round robin).
//!   With no free voice, the voice whose owning key is nearest to the new key
//!   is stolen and receives a [`NoteCommand::Retrigger`].
//! - **Note off**: every voice owned by the released key is released, unless
//!   the sustain pedal is down, in which case only the key table changes.
//!
//! ## Unison mode
//!
//! All active voices play the same note.
//!
//! - **Note on**: broadcast to every voice.
//! - **Note off**: held keys are recounted from the table. With none left,
//!   every voice is released. Otherwise, if the released key was the sounding
//!   one, every voice moves to the most recently pressed held key at the
//!   current velocity, without a gate drop.
//!
//! ## Sustain
//!
//! Releasing the pedal releases every voice whose owning key is sustained.

use ligature_core::{KeyStateTable, KeyStatus, Scale};

use crate::voice::{NoteCommand, Voice};

/// The active slice of the voice pool plus what the writer needs to render
/// into it.
pub struct VoicePool<'a, S: Scale + ?Sized> {
    /// Active voices (`..polyphony`)
    pub voices: &'a mut [Voice],
    /// Note-to-pitch mapping
    pub scale: &'a S,
    /// Sample rate in Hz
    pub sample_rate: f32,
}

impl<S: Scale + ?Sized> VoicePool<'_, S> {
    /// Deliver `command` at `time` to the voice at `index`.
    #[inline]
    pub fn write(&mut self, index: usize, time: usize, command: NoteCommand) {
        if let Some(voice) = self.voices.get_mut(index) {
            voice.write_note_event(time, command, self.scale, self.sample_rate);
        }
    }

    /// Deliver `command` at `time` to every active voice.
    #[inline]
    pub fn broadcast(&mut self, time: usize, command: NoteCommand) {
        for voice in self.voices.iter_mut() {
            voice.write_note_event(time, command, self.scale, self.sample_rate);
        }
    }
}

/// Allocation policy and unison/sustain coordination.
#[derive(Debug, Clone, Default)]
pub struct VoiceAllocator {
    /// Index of the last free voice handed out; the next search starts after it
    last_free: Option<usize>,
    /// Voice that answered the latest note on
    newest: Option<usize>,
    unison: bool,
    sustain: bool,
}

impl VoiceAllocator {
    /// Create an allocator in polyphonic mode with the pedal up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the search cursor and the pedal; keeps the unison setting.
    pub fn reset(&mut self) {
        self.reset_cursor();
        self.newest = None;
        self.sustain = false;
    }

    /// Restart the round-robin search from the first voice.
    pub fn reset_cursor(&mut self) {
        self.last_free = None;
    }

    /// Switch unison mode.
    pub fn set_unison(&mut self, unison: bool) {
        self.unison = unison;
    }

    /// Check whether unison mode is on.
    pub fn is_unison(&self) -> bool {
        self.unison
    }

    /// Check whether the sustain pedal is down.
    pub fn is_sustain_active(&self) -> bool {
        self.sustain
    }

    /// Voice that answered the latest polyphonic note on.
    pub fn newest_voice(&self) -> Option<usize> {
        self.newest
    }

    /// Round-robin search for a free voice, starting after the last one found.
    pub fn find_free_voice(&mut self, voices: &[Voice]) -> Option<usize> {
        let len = voices.len();
        if len == 0 {
            return None;
        }

        let start = self.last_free.map_or(0, |i| i + 1);
        let found = (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&i| voices[i].is_free())?;
        self.last_free = Some(found);
        Some(found)
    }

    /// Voice whose owning key is numerically nearest to `key`.
    ///
    /// Ties go to the lowest index. Falls back to voice 0 when no voice is
    /// owned, so an answer always exists for a non-empty pool.
    pub fn find_nearest_voice(voices: &[Voice], key: u8) -> usize {
        voices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.owner().map(|owner| (i, owner.abs_diff(key))))
            .min_by_key(|&(i, distance)| (distance, i))
            .map_or(0, |(i, _)| i)
    }

    /// Handle a key press.
    pub fn note_on<S: Scale + ?Sized>(
        &mut self,
        pool: &mut VoicePool<'_, S>,
        keys: &mut KeyStateTable,
        time: usize,
        key: u8,
        note: f32,
        velocity: f32,
    ) {
        keys.press(key, note);
        let on = NoteCommand::On {
            key,
            note,
            velocity,
        };

        if self.unison {
            pool.broadcast(time, on);
            return;
        }

        let index = match self.find_free_voice(pool.voices) {
            Some(index) => {
                pool.write(index, time, on);
                index
            }
            None => {
                let index = Self::find_nearest_voice(pool.voices, key);
                pool.write(
                    index,
                    time,
                    NoteCommand::Retrigger {
                        key,
                        note,
                        velocity,
                    },
                );
                index
            }
        };
        self.newest = Some(index);
    }

    /// Restart a sounding note on a new key, stealing like [`note_on`](Self::note_on)
    /// but always with a gate drop.
    pub fn note_retrig<S: Scale + ?Sized>(
        &mut self,
        pool: &mut VoicePool<'_, S>,
        keys: &mut KeyStateTable,
        time: usize,
        key: u8,
        note: f32,
        velocity: f32,
    ) {
        keys.press(key, note);
        let retrig = NoteCommand::Retrigger {
            key,
            note,
            velocity,
        };

        if self.unison {
            pool.broadcast(time, retrig);
            return;
        }

        let index = pool
            .voices
            .iter()
            .position(|v| v.owner() == Some(key))
            .or_else(|| self.find_free_voice(pool.voices))
            .unwrap_or_else(|| Self::find_nearest_voice(pool.voices, key));
        pool.write(index, time, retrig);
        self.newest = Some(index);
    }

    /// Handle a key release.
    pub fn note_off<S: Scale + ?Sized>(
        &mut self,
        pool: &mut VoicePool<'_, S>,
        keys: &mut KeyStateTable,
        time: usize,
        key: u8,
    ) {
        keys.release(key, self.sustain);

        if self.unison {
            self.unison_note_off(pool, keys, time, key);
        } else if !self.sustain {
            for voice in pool.voices.iter_mut() {
                if voice.owner() == Some(key) {
                    voice.write_note_event(time, NoteCommand::Off, pool.scale, pool.sample_rate);
                }
            }
        }
    }

    fn unison_note_off<S: Scale + ?Sized>(
        &mut self,
        pool: &mut VoicePool<'_, S>,
        keys: &KeyStateTable,
        time: usize,
        key: u8,
    ) {
        if keys.count_held() == 0 {
            // With the pedal down the voices keep sounding; the sustained
            // owner is released with the pedal.
            if !self.sustain {
                pool.broadcast(time, NoteCommand::Off);
            }
            return;
        }

        let Some(sounding) = pool.voices.first() else {
            return;
        };
        if sounding.owner() != Some(key) {
            return;
        }

        let velocity = sounding.velocity();
        if let Some(recent) = keys.most_recent_held()
            && let Some(state) = keys.get(recent)
        {
            pool.broadcast(
                time,
                NoteCommand::On {
                    key: recent,
                    note: state.note,
                    velocity,
                },
            );
        }
    }

    /// Handle a sustain pedal move; the pedal is down when `value > 0.5`.
    pub fn sustain_pedal<S: Scale + ?Sized>(
        &mut self,
        pool: &mut VoicePool<'_, S>,
        keys: &mut KeyStateTable,
        time: usize,
        value: f32,
    ) {
        self.sustain = value > 0.5;
        if self.sustain {
            return;
        }

        for voice in pool.voices.iter_mut() {
            if let Some(owner) = voice.owner()
                && keys.status(owner) == KeyStatus::Sustain
            {
                voice.write_note_event(time, NoteCommand::Off, pool.scale, pool.sample_rate);
            }
        }
        keys.release_sustained();
    }

    /// Release every active voice and every key, regardless of the pedal.
    pub fn all_notes_off<S: Scale + ?Sized>(
        &mut self,
        pool: &mut VoicePool<'_, S>,
        keys: &mut KeyStateTable,
        time: usize,
    ) {
        pool.broadcast(time, NoteCommand::Off);
        keys.release_all();
    }
}
