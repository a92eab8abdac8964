//! stepfx - terminal step sequencer with an effects rack
//!
//! Run with: cargo run -- --bpm 100 --root D3

mod args;
mod audio;
mod logging;
mod ui;

use clap::Parser;
use color_eyre::eyre::WrapErr;

use args::Args;
use audio::AudioOutput;
use stepfx::{config::EngineConfig, engine, sequencing::Note};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::init(&args.log_file).wrap_err("failed to set up logging")?;

    let root: Note = args.root.parse()?;
    let output = AudioOutput::open()?;

    let config = EngineConfig {
        sample_rate: output.sample_rate(),
        tempo_bpm: args.bpm,
        root_note: root,
        tempo_policy: args.tempo_policy(),
        ..EngineConfig::default()
    };
    log::info!("starting with {:?}", config);

    let (engine, controller) = engine::build(&config);
    let gate = output.start(engine)?;

    let mut terminal = ratatui::init();
    let result = ui::App::new(controller, gate).run(&mut terminal);
    ratatui::restore();
    result
}
