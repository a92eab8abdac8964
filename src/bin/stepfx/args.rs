use std::path::PathBuf;

use clap::Parser;
use stepfx::config::{TempoPolicy, DEFAULT_TEMPO};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Starting tempo in BPM (60-200)
    #[arg(long, default_value_t = DEFAULT_TEMPO)]
    pub bpm: u32,

    /// Root note of the bottom grid row, e.g. C4 or F#3
    #[arg(long, default_value = "C4")]
    pub root: String,

    /// Refuse out-of-range tempos instead of clamping them
    #[arg(long)]
    pub reject_tempo: bool,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long, default_value = "stepfx.log")]
    pub log_file: PathBuf,
}

impl Args {
    pub fn tempo_policy(&self) -> TempoPolicy {
        if self.reject_tempo {
            TempoPolicy::Reject
        } else {
            TempoPolicy::Clamp
        }
    }
}
