use crate::sequencing::Note;

/// A note start emitted by the transport for one sound source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteTrigger {
    pub note: Note,
    /// Gate length in samples
    pub duration: u64,
    /// Scheduled sample time of the note start
    pub at: u64,
}

impl NoteTrigger {
    /// Sample at which the gate closes.
    pub fn release_at(&self) -> u64 {
        self.at + self.duration
    }
}
