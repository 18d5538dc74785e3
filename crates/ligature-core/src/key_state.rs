//! Logical state of every physical key.
//!
//! The table records whether each key is up, held, or held only by the
//! sustain pedal, together with a press-order index. The press order lets
//! unison mode fall back to the most recently pressed key that is still
//! down when the sounding key is released.
//!
//! Held keys are always recounted by scanning the table. A running counter
//! would drift, since duplicate key releases are common in practice.

use crate::KEY_COUNT;

/// Logical state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStatus {
    /// Key is up.
    #[default]
    Off,
    /// Key is held down.
    On,
    /// Key is up but its note is held by the sustain pedal.
    Sustain,
}

/// Table entry for one physical key.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyState {
    /// Current logical state
    pub status: KeyStatus,
    /// Press-order index of the latest press (0 = never pressed)
    pub note_on_index: u64,
    /// Note value of the latest press
    pub note: f32,
}

/// Fixed-size table indexed by key number.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyStateTable {
    keys: [KeyState; KEY_COUNT],
    /// Index handed to the next press; strictly increasing until [`clear`](Self::clear)
    next_note_on_index: u64,
}

impl KeyStateTable {
    /// Create a table with every key up.
    pub fn new() -> Self {
        Self {
            keys: [KeyState::default(); KEY_COUNT],
            next_note_on_index: 1,
        }
    }

    /// Return every key to `Off` and restart the press order.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Entry for `key`, or `None` when out of range.
    pub fn get(&self, key: u8) -> Option<&KeyState> {
        self.keys.get(usize::from(key))
    }

    /// Status of `key`; out-of-range keys read as `Off`.
    pub fn status(&self, key: u8) -> KeyStatus {
        self.get(key).map(|k| k.status).unwrap_or_default()
    }

    /// Record a press of `key` playing `note`.
    ///
    /// Returns `false` (and records nothing) when `key` is out of range.
    pub fn press(&mut self, key: u8, note: f32) -> bool {
        let index = self.next_note_on_index;
        let Some(entry) = self.keys.get_mut(usize::from(key)) else {
            return false;
        };
        entry.status = KeyStatus::On;
        entry.note_on_index = index;
        entry.note = note;
        self.next_note_on_index += 1;
        true
    }

    /// Record a release of `key`.
    ///
    /// With the pedal down the key moves to `Sustain`, otherwise to `Off`.
    pub fn release(&mut self, key: u8, sustain_active: bool) -> bool {
        let Some(entry) = self.keys.get_mut(usize::from(key)) else {
            return false;
        };
        entry.status = if sustain_active {
            KeyStatus::Sustain
        } else {
            KeyStatus::Off
        };
        true
    }

    /// Move every sustained key to `Off`; returns how many changed.
    pub fn release_sustained(&mut self) -> usize {
        self.release_where(|status| status == KeyStatus::Sustain)
    }

    /// Move every held or sustained key to `Off`; returns how many changed.
    pub fn release_all(&mut self) -> usize {
        self.release_where(|status| status != KeyStatus::Off)
    }

    /// Number of keys currently held down.
    pub fn count_held(&self) -> usize {
        self.keys
            .iter()
            .filter(|k| k.status == KeyStatus::On)
            .count()
    }

    /// The held key with the highest press index, if any key is down.
    pub fn most_recent_held(&self) -> Option<u8> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.status == KeyStatus::On)
            .max_by_key(|(_, k)| k.note_on_index)
            .map(|(i, _)| i as u8)
    }

    /// Press index that the next press will receive.
    pub fn next_note_on_index(&self) -> u64 {
        self.next_note_on_index
    }

    fn release_where(&mut self, predicate: impl Fn(KeyStatus) -> bool) -> usize {
        let mut count = 0;
        for entry in &mut self.keys {
            if predicate(entry.status) {
                entry.status = KeyStatus::Off;
                count += 1;
            }
        }
        count
    }
}

impl Default for KeyStateTable {
    fn default() -> Self {
        Self::new()
    }
}
