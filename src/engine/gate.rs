use crate::Result;

/// Gesture-gated audio start.
///
/// Output devices may refuse to run until the user has done something; the
/// controller asks the gate before queueing `Play`. Implementations report
/// refusal as [`Error::AudioStart`](crate::Error::AudioStart).
pub trait AudioGate {
    fn resume(&mut self) -> Result<()>;
}

impl<F> AudioGate for F
where
    F: FnMut() -> Result<()>,
{
    fn resume(&mut self) -> Result<()> {
        self()
    }
}

/// A gate that is always open, for offline rendering.
pub struct OpenGate;

impl AudioGate for OpenGate {
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }
}
