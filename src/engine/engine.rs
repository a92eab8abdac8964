//! Audio-thread engine.
//!
//! Owns the transport, the sound sources, the effects graph and the
//! connection orchestrator, and keeps the one sample clock they all share.
//! Each `process` call drains the command queue first, then renders the
//! block in segments split at every tick and timer deadline, so triggers and
//! timers land on their exact sample.

use rtrb::{Consumer, Producer};

use crate::config::EngineConfig;
use crate::dsp::mix::sum_into;
use crate::engine::command::{Command, EngineEvent};
use crate::engine::connection::Connection;
use crate::graph::effects::EffectsGraph;
use crate::sequencing::{Tick, Transport, TransportEvent};
use crate::synth::{HiHat, MonoSynth, SoundSource};
use crate::MAX_BLOCK_SIZE;

pub struct Engine {
    now: u64,
    transport: Transport,
    synth: MonoSynth,
    hihat: HiHat,
    effects: EffectsGraph,
    connection: Connection,
    commands: Consumer<Command>,
    events: Producer<EngineEvent>,
    source_buf: Vec<f32>,
    voice_buf: Vec<f32>,
}

impl Engine {
    pub fn new(config: &EngineConfig, commands: Consumer<Command>, events: Producer<EngineEvent>) -> Self {
        let sample_rate = config.sample_rate;
        let tempo = config.initial_tempo();

        let mut connection = Connection::new(sample_rate);
        // The melodic source exists for the engine's whole life.
        connection.source_ready(true, 0);

        Self {
            now: 0,
            transport: Transport::new(sample_rate, tempo, config.root_note),
            synth: MonoSynth::new(sample_rate),
            hihat: HiHat::new(sample_rate),
            effects: EffectsGraph::new(sample_rate),
            connection,
            commands,
            events,
            source_buf: vec![0.0; MAX_BLOCK_SIZE],
            voice_buf: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Render one mono block. Call from the audio callback.
    pub fn process(&mut self, out: &mut [f32]) {
        self.drain_commands();

        let mut offset = 0;
        while offset < out.len() {
            self.fire_due();

            let mut len = (out.len() - offset).min(MAX_BLOCK_SIZE);
            if let Some(deadline) = self.next_deadline() {
                len = len.min((deadline - self.now) as usize);
            }

            self.render_segment(&mut out[offset..offset + len]);
            self.now += len as u64;
            offset += len;
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        log::trace!("command {:?} at sample {}", command, self.now);
        match command {
            Command::Play { tempo } => {
                self.transport.handle(TransportEvent::Play { tempo }, self.now);
                self.publish_transport();
            }
            Command::Stop => {
                self.transport.handle(TransportEvent::Stop, self.now);
                self.publish_transport();
                self.publish(EngineEvent::StepChanged(-1));
            }
            Command::UpdateTempo(bpm) => {
                self.transport.handle(TransportEvent::UpdateTempo(bpm), self.now);
                self.publish_transport();
            }
            Command::ToggleCell { row, col } => {
                if self.transport.toggle_cell(row, col) {
                    self.publish_grid();
                } else {
                    log::warn!("ignoring toggle of cell ({}, {})", row, col);
                }
            }
            Command::ToggleHiHat { step } => {
                if self.transport.toggle_hihat(step) {
                    self.publish_grid();
                } else {
                    log::warn!("ignoring toggle of hi-hat step {}", step);
                }
            }
            Command::SetRootNote(root) => {
                self.transport.set_root_note(root);
                self.publish_pitch();
            }
            Command::UpdatePitch(offset) => {
                self.transport.set_pitch_offset(offset);
                self.publish_pitch();
            }
            Command::InitEffects => {
                self.effects.init();
                self.connection.graph_ready(true, self.now);
                self.publish_effects();
            }
            Command::DisposeEffects => {
                let was_connected = self.connection.is_connected();
                self.connection.graph_ready(false, self.now);
                self.effects.dispose();
                self.publish_effects();
                if was_connected {
                    self.publish(EngineEvent::ConnectionChanged(false));
                }
            }
            Command::UpdateParam { param, value } => {
                match self.effects.update_param(param, value, self.now) {
                    Ok(()) => self.publish_effects(),
                    Err(err) => self.reject(err),
                }
            }
            Command::ToggleEffect { effect, enabled } => match self.effects.toggle_effect(effect, enabled) {
                Ok(()) => self.publish_effects(),
                Err(err) => self.reject(err),
            },
            Command::ConnectToEffects => {
                if self.connection.connect(self.effects.active_effects()) {
                    self.publish(EngineEvent::ConnectionChanged(true));
                }
            }
        }
    }

    /// Run every tick and timer scheduled at or before the current sample.
    fn fire_due(&mut self) {
        if self.connection.advance(self.now, self.effects.active_effects()) {
            self.publish(EngineEvent::ConnectionChanged(true));
        }
        self.effects.advance(self.now);

        while self.transport.next_tick_at().is_some_and(|at| at <= self.now) {
            if let Some(tick) = self.transport.tick() {
                self.dispatch(&tick);
            }
        }
    }

    fn dispatch(&mut self, tick: &Tick) {
        for trigger in tick.note_triggers() {
            self.synth.trigger(trigger);
        }
        if let Some(trigger) = tick.hihat_trigger() {
            self.hihat.trigger(trigger);
        }
        self.publish(EngineEvent::StepChanged(tick.step as i32));
    }

    /// Earliest pending tick or timer after the current sample.
    fn next_deadline(&self) -> Option<u64> {
        [
            self.transport.next_tick_at(),
            self.effects.next_deadline(),
            self.connection.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .filter(|&at| at > self.now)
        .min()
    }

    fn render_segment(&mut self, out: &mut [f32]) {
        let len = out.len();
        let source = &mut self.source_buf[..len];
        let voice = &mut self.voice_buf[..len];

        self.synth.render(source, self.now);
        self.hihat.render(voice, self.now);
        sum_into(source, voice);

        self.effects.render(source, self.connection.routing(), out, self.now);
    }

    fn reject(&mut self, err: crate::Error) {
        log::warn!("command rejected: {}", err);
        self.publish(EngineEvent::Rejected(err));
    }

    fn publish(&mut self, event: EngineEvent) {
        if self.events.push(event).is_err() {
            log::trace!("event queue full; dropping event");
        }
    }

    fn publish_transport(&mut self) {
        let state = self.transport.state();
        self.publish(EngineEvent::TransportChanged {
            playing: state.is_playing(),
            tempo: state.tempo_bpm,
        });
    }

    fn publish_grid(&mut self) {
        let event = EngineEvent::GridChanged(*self.transport.grid(), *self.transport.hihat());
        self.publish(event);
    }

    fn publish_pitch(&mut self) {
        let event = EngineEvent::PitchChanged {
            root: self.transport.root_note(),
            offset: self.transport.pitch_offset(),
        };
        self.publish(event);
    }

    fn publish_effects(&mut self) {
        let snapshot = self.effects.params_snapshot();
        self.publish(EngineEvent::EffectsChanged(snapshot));
    }

    /// Current sample clock
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn synth(&self) -> &MonoSynth {
        &self.synth
    }

    pub fn effects(&self) -> &EffectsGraph {
        &self.effects
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}
