//! Error taxonomy for the sequencer core.
//!
//! Only [`Error::AudioStart`] is meant to reach the caller as something to act
//! on. Everything else is logged where it happens and reported back as an
//! [`EngineEvent::Rejected`](crate::engine::EngineEvent::Rejected) so the audio
//! path degrades instead of stopping.

use std::error;
use std::fmt;

use crate::graph::params::EffectKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A parameter update or toggle targeted an effect that is not allocated.
    NodeUnavailable(EffectKind),
    UnknownEffect(String),
    UnknownParam(String),
    /// Topology rebuild produced an invalid graph; the previous one is kept.
    Routing(&'static str),
    /// The gesture-gated audio output refused to start.
    AudioStart(String),
    TempoOutOfRange(u32),
    InvalidNote(String),
    /// The command queue to the audio thread is full.
    QueueFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NodeUnavailable(kind) => write!(f, "effect node `{}` is not available", kind),
            Error::UnknownEffect(name) => write!(f, "unknown effect `{}`", name),
            Error::UnknownParam(name) => write!(f, "unknown parameter `{}`", name),
            Error::Routing(reason) => write!(f, "routing failure: {}", reason),
            Error::AudioStart(msg) => write!(f, "audio output failed to start: {}", msg),
            Error::TempoOutOfRange(bpm) => {
                write!(f, "tempo {} BPM is outside the supported range", bpm)
            }
            Error::InvalidNote(text) => write!(f, "invalid note `{}`", text),
            Error::QueueFull => write!(f, "command queue is full"),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
