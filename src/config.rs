//! Engine configuration and musical constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sequencing::notes::Note;

/// Pitch rows in the grid.
pub const ROWS: usize = 4;
/// Steps per bar, one eighth note each.
pub const STEPS: usize = 8;
/// Steps that make up one beat (eighth notes per quarter).
pub const STEPS_PER_BEAT: u32 = 2;

pub const MIN_TEMPO: u32 = 60;
pub const MAX_TEMPO: u32 = 200;
pub const DEFAULT_TEMPO: u32 = 120;

/// Semitones above the root note for each grid row.
pub const ROW_INTERVALS: [i32; ROWS] = [0, 2, 4, 7];

/// Delay before a stopped filter LFO is restarted after a rate/depth change.
pub const FILTER_RESTART_DEBOUNCE_SECS: f64 = 0.1;
/// Offset added to the restart time so the LFO starts slightly after "now".
pub const FILTER_RESTART_OFFSET_SECS: f64 = 0.01;
/// Settle time between source and graph becoming ready and the actual wiring.
pub const CONNECT_SETTLE_SECS: f64 = 0.2;

/// What to do with a tempo outside `MIN_TEMPO..=MAX_TEMPO`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TempoPolicy {
    /// Pull the value into range.
    #[default]
    Clamp,
    /// Refuse the update with [`Error::TempoOutOfRange`](crate::Error::TempoOutOfRange).
    Reject,
}

impl TempoPolicy {
    pub fn apply(self, bpm: u32) -> crate::Result<u32> {
        if (MIN_TEMPO..=MAX_TEMPO).contains(&bpm) {
            return Ok(bpm);
        }
        match self {
            TempoPolicy::Clamp => Ok(bpm.clamp(MIN_TEMPO, MAX_TEMPO)),
            TempoPolicy::Reject => Err(crate::Error::TempoOutOfRange(bpm)),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub tempo_bpm: u32,
    pub root_note: Note,
    pub tempo_policy: TempoPolicy,
    /// Capacity of the control → audio command queue.
    pub command_capacity: usize,
    /// Capacity of the audio → control event queue.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            tempo_bpm: DEFAULT_TEMPO,
            root_note: Note::C4,
            tempo_policy: TempoPolicy::Clamp,
            command_capacity: 256,
            event_capacity: 1024,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Starting tempo after the policy. A tempo the policy refuses falls back
    /// to [`DEFAULT_TEMPO`]; engine and controller both start from this.
    pub fn initial_tempo(&self) -> u32 {
        match self.tempo_policy.apply(self.tempo_bpm) {
            Ok(tempo) => tempo,
            Err(err) => {
                log::warn!("{}; starting at {} BPM", err, DEFAULT_TEMPO);
                DEFAULT_TEMPO
            }
        }
    }

    /// Convert seconds to a whole number of samples at this config's rate.
    pub fn secs_to_samples(&self, secs: f64) -> u64 {
        secs_to_samples(self.sample_rate, secs)
    }
}

#[inline]
pub(crate) fn secs_to_samples(sample_rate: f32, secs: f64) -> u64 {
    (secs.max(0.0) * sample_rate as f64).round() as u64
}
