//! The audio-thread engine, its control-thread handle, and the queues
//! between them.

pub mod command;
pub mod connection;
pub mod controller;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod gate;

use rtrb::RingBuffer;

use crate::config::EngineConfig;

pub use command::{Command, EngineEvent};
pub use connection::Connection;
pub use controller::Controller;
pub use engine::Engine;
pub use gate::{AudioGate, OpenGate};

/// Create an engine (move it to the audio thread) and the controller that
/// drives it.
pub fn build(config: &EngineConfig) -> (Engine, Controller) {
    let (command_tx, command_rx) = RingBuffer::new(config.command_capacity);
    let (event_tx, event_rx) = RingBuffer::new(config.event_capacity);
    log::debug!(
        "engine at {} Hz, {} BPM, root {}",
        config.sample_rate,
        config.tempo_bpm,
        config.root_note
    );
    (
        Engine::new(config, command_rx, event_tx),
        Controller::new(config, command_tx, event_rx),
    )
}
