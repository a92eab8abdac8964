//! Transport / step scheduler.
//!
//! A two-state machine (`Stopped`, `Playing`) driven by one dispatch function,
//! [`Transport::handle`]. While playing it owns a single logical clock measured
//! in samples: the engine asks for [`Transport::next_tick_at`], renders audio up
//! to that sample, then calls [`Transport::tick`] to collect the step's events.
//!
//! Timing rules:
//! - A tick's sample time is fixed when the previous tick fires. Tempo changes
//!   therefore land on the tick *after* the one already scheduled.
//! - Grid, hi-hat, root and pitch edits rebuild the [`StepSequence`] but keep
//!   `current_step`, so the very next unplayed tick sees them and no step is
//!   played twice or skipped.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{MAX_TEMPO, MIN_TEMPO, STEPS, STEPS_PER_BEAT};
use crate::synth::message::NoteTrigger;

use super::grid::{Grid, HiHatPattern};
use super::notes::Note;
use super::sequence::{StepEvents, StepSequence};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    Stopped,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// Start (or restart) from step 0 at the given tempo.
    Play { tempo: u32 },
    Stop,
    UpdateTempo(u32),
}

/// Observable transport state.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportState {
    pub tempo_bpm: u32,
    pub status: TransportStatus,
    /// Step about to play / playing, or -1 when stopped.
    pub current_step: i32,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        self.status == TransportStatus::Playing
    }
}

/// One fired step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Column that fired
    pub step: usize,
    /// Scheduled sample time of the tick
    pub at: u64,
    /// Note length in samples (one step)
    pub duration: u64,
    pub events: StepEvents,
}

impl Tick {
    /// Melodic triggers for every active row in the column.
    pub fn note_triggers(&self) -> impl Iterator<Item = NoteTrigger> + '_ {
        self.events.melodic().map(move |note| NoteTrigger {
            note,
            duration: self.duration,
            at: self.at,
        })
    }

    /// Percussive trigger if the hi-hat is set on this step.
    pub fn hihat_trigger(&self) -> Option<NoteTrigger> {
        self.events.hihat.then_some(NoteTrigger {
            note: Note::C4,
            duration: self.duration,
            at: self.at,
        })
    }
}

pub struct Transport {
    sample_rate: f32,
    state: TransportState,
    grid: Grid,
    hihat: HiHatPattern,
    root: Note,
    pitch_offset: i32,
    sequence: StepSequence,
    /// Fractional sample position of the next tick while playing
    next_tick: Option<f64>,
    /// Step index the next tick will fire
    next_step: usize,
}

impl Transport {
    pub fn new(sample_rate: f32, tempo_bpm: u32, root: Note) -> Self {
        let grid = Grid::new();
        let hihat = HiHatPattern::new();

        Self {
            sample_rate,
            state: TransportState {
                tempo_bpm: tempo_bpm.clamp(MIN_TEMPO, MAX_TEMPO),
                status: TransportStatus::Stopped,
                current_step: -1,
            },
            grid,
            hihat,
            root,
            pitch_offset: 0,
            sequence: StepSequence::build(&grid, &hihat, root, 0),
            next_tick: None,
            next_step: 0,
        }
    }

    /// Dispatch a transport event. `now` is the engine's sample clock at the
    /// block boundary where the event is applied.
    pub fn handle(&mut self, event: TransportEvent, now: u64) {
        match (self.state.status, event) {
            (_, TransportEvent::Play { tempo }) => {
                self.set_tempo(tempo);
                self.state.status = TransportStatus::Playing;
                self.state.current_step = 0;
                self.next_step = 0;
                self.next_tick = Some(now as f64);
                log::debug!("transport playing at {} BPM", self.state.tempo_bpm);
            }
            (TransportStatus::Playing, TransportEvent::Stop) => {
                self.state.status = TransportStatus::Stopped;
                self.state.current_step = -1;
                self.next_tick = None;
                self.next_step = 0;
                log::debug!("transport stopped");
            }
            (TransportStatus::Stopped, TransportEvent::Stop) => {
                self.state.current_step = -1;
            }
            (_, TransportEvent::UpdateTempo(bpm)) => {
                self.set_tempo(bpm);
            }
        }
    }

    fn set_tempo(&mut self, bpm: u32) {
        self.state.tempo_bpm = bpm.clamp(MIN_TEMPO, MAX_TEMPO);
    }

    /// Length of one step (an eighth note) in samples at the current tempo.
    pub fn samples_per_step(&self) -> f64 {
        self.sample_rate as f64 * 60.0 / self.state.tempo_bpm as f64 / STEPS_PER_BEAT as f64
    }

    /// Sample time of the next tick, if playing.
    pub fn next_tick_at(&self) -> Option<u64> {
        self.next_tick.map(|t| t.ceil() as u64)
    }

    /// Fire the scheduled tick and schedule the following one.
    ///
    /// Returns `None` when stopped.
    pub fn tick(&mut self) -> Option<Tick> {
        let tick_pos = self.next_tick?;
        let step = self.next_step;
        let step_len = self.samples_per_step();

        let tick = Tick {
            step,
            at: tick_pos.ceil() as u64,
            duration: step_len.round() as u64,
            events: *self.sequence.step(step),
        };

        self.state.current_step = step as i32;
        self.next_step = (step + 1) % STEPS;
        self.next_tick = Some(tick_pos + step_len);

        Some(tick)
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> bool {
        let changed = self.grid.toggle_cell(row, col);
        if changed {
            self.rebuild();
        }
        changed
    }

    pub fn toggle_hihat(&mut self, step: usize) -> bool {
        let changed = self.hihat.toggle_step(step);
        if changed {
            self.rebuild();
        }
        changed
    }

    pub fn set_root_note(&mut self, root: Note) {
        self.root = root;
        self.rebuild();
    }

    /// Change the pitch offset. Notes already sounding are left alone.
    pub fn set_pitch_offset(&mut self, semitones: i32) {
        self.pitch_offset = semitones;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.sequence = StepSequence::build(&self.grid, &self.hihat, self.root, self.pitch_offset);
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn current_step(&self) -> i32 {
        self.state.current_step
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn hihat(&self) -> &HiHatPattern {
        &self.hihat
    }

    pub fn root_note(&self) -> Note {
        self.root
    }

    pub fn pitch_offset(&self) -> i32 {
        self.pitch_offset
    }

    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::notes::transpose;
    use crate::sequencing::sequence::row_base_note;

    const SR: f32 = 48_000.0;

    fn playing(tempo: u32) -> Transport {
        let mut t = Transport::new(SR, tempo, Note::C4);
        t.handle(TransportEvent::Play { tempo }, 0);
        t
    }

    #[test]
    fn starts_stopped_with_no_step() {
        let t = Transport::new(SR, 120, Note::C4);
        assert_eq!(t.state().status, TransportStatus::Stopped);
        assert_eq!(t.current_step(), -1);
        assert_eq!(t.next_tick_at(), None);
    }

    #[test]
    fn play_then_stop_reports_sentinel_and_stops_ticking() {
        let mut t = playing(120);
        assert!(t.tick().is_some());
        assert!(t.tick().is_some());

        t.handle(TransportEvent::Stop, 10_000);
        assert_eq!(t.current_step(), -1);
        assert!(!t.is_playing());
        assert_eq!(t.next_tick_at(), None);
        assert!(t.tick().is_none());
    }

    #[test]
    fn eighth_note_step_length() {
        let t = playing(120);
        // 120 BPM: quarter = 0.5s, eighth = 0.25s
        assert!((t.samples_per_step() - 12_000.0).abs() < 1e-6);
    }

    #[test]
    fn steps_wrap_after_a_bar() {
        let mut t = playing(120);
        let steps: Vec<usize> = (0..STEPS + 2).filter_map(|_| t.tick()).map(|k| k.step).collect();
        assert_eq!(steps, vec![0, 1, 2, 3, 4, 5, 6, 7, 0, 1]);
    }

    #[test]
    fn tempo_change_applies_after_scheduled_tick() {
        let mut t = playing(120);
        let first = t.tick().unwrap();
        assert_eq!(first.at, 0);
        // Tick 1 was scheduled at 12_000 when tick 0 fired
        t.handle(TransportEvent::UpdateTempo(60), 5_000);
        let second = t.tick().unwrap();
        assert_eq!(second.at, 12_000);
        // From here on steps are 24_000 samples long
        let third = t.tick().unwrap();
        assert_eq!(third.at, 36_000);
    }

    #[test]
    fn tempo_is_clamped_defensively() {
        let mut t = playing(120);
        t.handle(TransportEvent::UpdateTempo(250), 0);
        assert_eq!(t.state().tempo_bpm, 200);
        t.handle(TransportEvent::UpdateTempo(1), 0);
        assert_eq!(t.state().tempo_bpm, 60);
    }

    #[test]
    fn single_cell_with_offset_fires_only_on_step_zero() {
        let mut t = Transport::new(SR, 120, Note::C4);
        t.toggle_cell(0, 0);
        t.set_pitch_offset(2);
        t.handle(TransportEvent::Play { tempo: 120 }, 0);

        let tick0 = t.tick().unwrap();
        let notes: Vec<Note> = tick0.note_triggers().map(|n| n.note).collect();
        assert_eq!(notes, vec![transpose(row_base_note(Note::C4, 0), 2)]);

        for _ in 1..STEPS {
            let tick = t.tick().unwrap();
            assert_eq!(tick.note_triggers().count(), 0, "step {}", tick.step);
        }
    }

    #[test]
    fn grid_edit_is_seen_by_next_tick_without_skipping() {
        let mut t = playing(120);
        assert_eq!(t.tick().unwrap().step, 0);

        t.toggle_cell(2, 1);
        let tick = t.tick().unwrap();
        assert_eq!(tick.step, 1);
        assert_eq!(tick.note_triggers().count(), 1);
        assert_eq!(t.tick().unwrap().step, 2);
    }

    #[test]
    fn hihat_fires_alongside_melody() {
        let mut t = Transport::new(SR, 120, Note::C4);
        t.toggle_cell(1, 0);
        t.toggle_hihat(0);
        t.handle(TransportEvent::Play { tempo: 120 }, 0);

        let tick = t.tick().unwrap();
        assert_eq!(tick.note_triggers().count(), 1);
        assert!(tick.hihat_trigger().is_some());
        assert!(t.tick().unwrap().hihat_trigger().is_none());
    }

    #[test]
    fn replay_restarts_from_step_zero_at_now() {
        let mut t = playing(120);
        t.tick();
        t.tick();
        t.handle(TransportEvent::Play { tempo: 90 }, 50_000);
        assert_eq!(t.next_tick_at(), Some(50_000));
        let tick = t.tick().unwrap();
        assert_eq!(tick.step, 0);
        assert_eq!(t.state().tempo_bpm, 90);
    }
}
