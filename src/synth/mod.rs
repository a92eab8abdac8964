// Purpose: sound sources the transport triggers
// This layer sits between the sequencer's note triggers and the effects input bus

pub mod hihat;
pub mod message;
pub mod voice;

pub use hihat::HiHat;
pub use message::NoteTrigger;
pub use voice::{MonoSynth, SoundSource};
