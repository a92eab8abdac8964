use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::OscillatorBlock;
use crate::dsp::EnvelopeState;
use crate::synth::message::NoteTrigger;

/// Something the transport can trigger and the engine can render into the
/// source bus.
pub trait SoundSource: Send {
    /// Start a note now. The gate closes at `trigger.release_at()`.
    fn trigger(&mut self, trigger: NoteTrigger);

    /// Render one block starting at sample `now`, overwriting `out`.
    fn render(&mut self, out: &mut [f32], now: u64);

    /// Still producing sound (including release tails).
    fn is_active(&self) -> bool;
}

/// Allow boxed sources to be used as sources (for dynamic dispatch)
impl SoundSource for Box<dyn SoundSource> {
    fn trigger(&mut self, trigger: NoteTrigger) {
        (**self).trigger(trigger)
    }

    fn render(&mut self, out: &mut [f32], now: u64) {
        (**self).render(out, now)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Output level of the melodic voice
const SYNTH_GAIN: f32 = 0.3;

/// Monophonic triangle synth with an ADSR envelope.
///
/// A new trigger retunes and retriggers the single voice; the previous note
/// is cut. Notes released by the gate ring out through the release stage,
/// so stopping the transport never chops a sounding note.
pub struct MonoSynth {
    sample_rate: f32,
    osc: OscillatorBlock,
    env: Envelope,
    frequency: f32,
    release_at: Option<u64>,
}

impl MonoSynth {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_envelope(sample_rate, Envelope::adsr(0.005, 0.1, 0.3, 1.0))
    }

    pub fn with_envelope(sample_rate: f32, env: Envelope) -> Self {
        Self {
            sample_rate,
            osc: OscillatorBlock::triangle(),
            env,
            frequency: 0.0,
            release_at: None,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.env.state()
    }
}

impl SoundSource for MonoSynth {
    fn trigger(&mut self, trigger: NoteTrigger) {
        self.frequency = trigger.note.to_freq();
        self.release_at = Some(trigger.release_at());
        self.env.note_on();
    }

    fn render(&mut self, out: &mut [f32], now: u64) {
        for (i, sample) in out.iter_mut().enumerate() {
            if self.release_at.is_some_and(|at| now + i as u64 >= at) {
                self.env.note_off(self.sample_rate);
                self.release_at = None;
            }

            if !self.env.is_active() {
                *sample = 0.0;
                continue;
            }

            let level = self.env.next_sample(self.sample_rate);
            *sample = self.osc.next_sample(self.frequency, self.sample_rate) * level * SYNTH_GAIN;
        }
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}
