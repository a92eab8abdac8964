use crate::graph::params::{EffectKind, EffectParam, EffectsSnapshot};
use crate::sequencing::{Grid, HiHatPattern, Note};
use crate::Error;

/// Control → audio messages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play { tempo: u32 },
    Stop,
    ToggleCell { row: usize, col: usize },
    ToggleHiHat { step: usize },
    UpdateTempo(u32),
    SetRootNote(Note),
    /// Semitone offset applied to every row
    UpdatePitch(i32),
    InitEffects,
    DisposeEffects,
    UpdateParam { param: EffectParam, value: f32 },
    ToggleEffect { effect: EffectKind, enabled: bool },
    ConnectToEffects,
}

/// Audio → control notifications. Dropped when the queue is full.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Step just fired, or -1 on stop
    StepChanged(i32),
    TransportChanged { playing: bool, tempo: u32 },
    GridChanged(Grid, HiHatPattern),
    /// Root note and pitch offset after a change
    PitchChanged { root: Note, offset: i32 },
    EffectsChanged(EffectsSnapshot),
    ConnectionChanged(bool),
    /// A command failed on the audio side; nothing was changed.
    Rejected(Error),
}
