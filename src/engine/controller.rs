//! Control-thread handle to a running [`Engine`](super::Engine).
//!
//! Every operation is a non-blocking push onto the command queue. The
//! controller keeps a mirror of the engine's observable state, refreshed by
//! [`Controller::poll`], so a UI can read it without touching the audio
//! thread.

use rtrb::{Consumer, Producer};

use crate::config::{EngineConfig, TempoPolicy};
use crate::engine::command::{Command, EngineEvent};
use crate::engine::gate::AudioGate;
use crate::graph::params::{ActiveEffects, EffectKind, EffectParam, EffectsSnapshot};
use crate::sequencing::{Grid, HiHatPattern, Note};
use crate::{Error, Result};

pub struct Controller {
    commands: Producer<Command>,
    events: Consumer<EngineEvent>,
    tempo_policy: TempoPolicy,
    tempo: u32,
    playing: bool,
    current_step: i32,
    grid: Grid,
    hihat: HiHatPattern,
    root_note: Note,
    pitch_offset: i32,
    effects: EffectsSnapshot,
    connected: bool,
    last_rejection: Option<Error>,
}

impl Controller {
    pub fn new(config: &EngineConfig, commands: Producer<Command>, events: Consumer<EngineEvent>) -> Self {
        Self {
            commands,
            events,
            tempo_policy: config.tempo_policy,
            tempo: config.initial_tempo(),
            playing: false,
            current_step: -1,
            grid: Grid::new(),
            hihat: HiHatPattern::new(),
            root_note: config.root_note,
            pitch_offset: 0,
            effects: EffectsSnapshot::default(),
            connected: false,
            last_rejection: None,
        }
    }

    fn send(&mut self, command: Command) -> Result<()> {
        self.commands.push(command).map_err(|_| {
            log::warn!("command queue full, dropping {:?}", command);
            Error::QueueFull
        })
    }

    /// Start playback from step 0 once the audio gate opens.
    ///
    /// If the gate refuses, nothing is queued, the transport stays stopped and
    /// the gate's error is returned.
    pub fn play<G: AudioGate + ?Sized>(&mut self, gate: &mut G) -> Result<()> {
        if let Err(err) = gate.resume() {
            log::error!("audio start failed: {}", err);
            self.playing = false;
            let err = match err {
                Error::AudioStart(_) => err,
                other => Error::AudioStart(other.to_string()),
            };
            return Err(err);
        }

        let tempo = self.tempo;
        self.send(Command::UpdateTempo(tempo))?;
        self.send(Command::Play { tempo })
    }

    pub fn stop(&mut self) -> Result<()> {
        self.send(Command::Stop)
    }

    /// Apply the tempo policy and queue the change. Returns the tempo that
    /// was queued.
    pub fn update_tempo(&mut self, bpm: u32) -> Result<u32> {
        let tempo = match self.tempo_policy.apply(bpm) {
            Ok(tempo) => tempo,
            Err(err) => {
                log::warn!("{}", err);
                return Err(err);
            }
        };
        self.send(Command::UpdateTempo(tempo))?;
        self.tempo = tempo;
        Ok(tempo)
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<()> {
        self.send(Command::ToggleCell { row, col })
    }

    pub fn toggle_hihat(&mut self, step: usize) -> Result<()> {
        self.send(Command::ToggleHiHat { step })
    }

    pub fn set_root_note(&mut self, root: Note) -> Result<()> {
        self.send(Command::SetRootNote(root))
    }

    pub fn update_pitch(&mut self, semitones: i32) -> Result<()> {
        self.send(Command::UpdatePitch(semitones))
    }

    pub fn init_effects(&mut self) -> Result<()> {
        self.send(Command::InitEffects)
    }

    pub fn dispose_effects(&mut self) -> Result<()> {
        self.send(Command::DisposeEffects)
    }

    pub fn update_param(&mut self, param: EffectParam, value: f32) -> Result<()> {
        self.send(Command::UpdateParam { param, value })
    }

    /// `update_param` addressed by name, e.g. `("filter", "depth", 0.8)`.
    pub fn update_param_named(&mut self, effect: &str, param: &str, value: f32) -> Result<()> {
        let param = EffectParam::lookup(effect, param)?;
        self.update_param(param, value)
    }

    pub fn toggle_effect(&mut self, effect: EffectKind, enabled: bool) -> Result<()> {
        self.send(Command::ToggleEffect { effect, enabled })
    }

    pub fn connect_to_effects(&mut self) -> Result<()> {
        self.send(Command::ConnectToEffects)
    }

    /// Drain engine events into the mirror and return them.
    pub fn poll(&mut self) -> Vec<EngineEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.pop() {
            self.observe(&event);
            drained.push(event);
        }
        drained
    }

    fn observe(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::StepChanged(step) => self.current_step = *step,
            EngineEvent::TransportChanged { playing, tempo } => {
                self.playing = *playing;
                self.tempo = *tempo;
                if !playing {
                    self.current_step = -1;
                }
            }
            EngineEvent::GridChanged(grid, hihat) => {
                self.grid = *grid;
                self.hihat = *hihat;
            }
            EngineEvent::PitchChanged { root, offset } => {
                self.root_note = *root;
                self.pitch_offset = *offset;
            }
            EngineEvent::EffectsChanged(snapshot) => {
                self.effects = *snapshot;
                if !snapshot.allocated {
                    self.connected = false;
                }
            }
            EngineEvent::ConnectionChanged(connected) => self.connected = *connected,
            EngineEvent::Rejected(err) => self.last_rejection = Some(err.clone()),
        }
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn tempo_policy(&self) -> TempoPolicy {
        self.tempo_policy
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_step(&self) -> i32 {
        self.current_step
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn hihat(&self) -> &HiHatPattern {
        &self.hihat
    }

    pub fn root_note(&self) -> Note {
        self.root_note
    }

    pub fn pitch_offset(&self) -> i32 {
        self.pitch_offset
    }

    pub fn active_effects(&self) -> ActiveEffects {
        self.effects.active
    }

    pub fn params_snapshot(&self) -> EffectsSnapshot {
        self.effects
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Most recent command the engine refused
    pub fn last_rejection(&self) -> Option<&Error> {
        self.last_rejection.as_ref()
    }
}
