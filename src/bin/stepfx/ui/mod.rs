//! TUI for stepfx
//!
//! Draws the grid, transport and effects rack from the controller's mirror
//! and turns key presses into controller calls.

mod effects;
mod grid;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use std::time::Duration;

use stepfx::{
    config::{ROWS, STEPS},
    engine::{Controller, EngineEvent},
    graph::{EffectKind, EffectParam},
};

use super::audio::CpalGate;
use effects::render_effects;
use grid::render_grid;
use transport::render_transport;

const TEMPO_STEP: u32 = 5;
/// Fraction of a parameter's range moved per key press
const PARAM_NUDGE: f32 = 0.05;

/// Every parameter in rack order, for Tab selection.
const PARAMS: [EffectParam; 12] = [
    EffectParam::FilterFrequency,
    EffectParam::FilterDepth,
    EffectParam::FilterResonance,
    EffectParam::FilterWet,
    EffectParam::DelayTime,
    EffectParam::DelayFeedback,
    EffectParam::DelayWet,
    EffectParam::ReverbDecay,
    EffectParam::ReverbPreDelay,
    EffectParam::ReverbWet,
    EffectParam::DistortionAmount,
    EffectParam::DistortionWet,
];

/// Values sent to the engine but not yet seen in its events. Key presses
/// build on these so several presses within one frame accumulate.
#[derive(Debug, Default)]
struct PendingEdits {
    pitch: Option<i32>,
    params: [Option<f32>; PARAMS.len()],
}

impl PendingEdits {
    fn pitch(&self, mirrored: i32) -> i32 {
        self.pitch.unwrap_or(mirrored)
    }

    fn set_pitch(&mut self, offset: i32) {
        self.pitch = Some(offset);
    }

    fn param(&self, index: usize, mirrored: f32) -> f32 {
        self.params[index].unwrap_or(mirrored)
    }

    fn set_param(&mut self, index: usize, value: f32) {
        self.params[index] = Some(value);
    }

    /// Drop pending values once the engine reports them.
    fn observe(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::PitchChanged { offset, .. } => {
                if self.pitch == Some(*offset) {
                    self.pitch = None;
                }
            }
            EngineEvent::EffectsChanged(snapshot) if !snapshot.allocated => {
                self.params = [None; PARAMS.len()];
            }
            EngineEvent::EffectsChanged(snapshot) => {
                for (pending, param) in self.params.iter_mut().zip(PARAMS) {
                    if *pending == Some(snapshot.get(param)) {
                        *pending = None;
                    }
                }
            }
            EngineEvent::Rejected(_) => self.params = [None; PARAMS.len()],
            _ => {}
        }
    }
}

pub struct App {
    controller: Controller,
    gate: CpalGate,
    cursor_row: usize,
    cursor_col: usize,
    selected_param: usize,
    pending: PendingEdits,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(controller: Controller, gate: CpalGate) -> Self {
        Self {
            controller,
            gate,
            cursor_row: 0,
            cursor_col: 0,
            selected_param: 0,
            pending: PendingEdits::default(),
            status: String::from("press E to load effects, Space to play"),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_engine();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_engine(&mut self) {
        for event in self.controller.poll() {
            self.pending.observe(&event);
            if let EngineEvent::Rejected(err) = event {
                self.status = err.to_string();
            }
        }
    }

    fn shift_pitch(&mut self, semitones: i32) -> stepfx::Result<()> {
        let offset = self.pending.pitch(self.controller.pitch_offset()) + semitones;
        self.controller.update_pitch(offset)?;
        self.pending.set_pitch(offset);
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let result = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char(' ') => {
                if self.controller.is_playing() {
                    self.controller.stop()
                } else {
                    self.controller.play(&mut self.gate)
                }
            }
            KeyCode::Up => {
                self.cursor_row = (self.cursor_row + 1).min(ROWS - 1);
                Ok(())
            }
            KeyCode::Down => {
                self.cursor_row = self.cursor_row.saturating_sub(1);
                Ok(())
            }
            KeyCode::Left => {
                self.cursor_col = self.cursor_col.saturating_sub(1);
                Ok(())
            }
            KeyCode::Right => {
                self.cursor_col = (self.cursor_col + 1).min(STEPS - 1);
                Ok(())
            }
            KeyCode::Enter => self.controller.toggle_cell(self.cursor_row, self.cursor_col),
            KeyCode::Char('h') => self.controller.toggle_hihat(self.cursor_col),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let tempo = self.controller.tempo() + TEMPO_STEP;
                self.controller.update_tempo(tempo).map(|_| ())
            }
            KeyCode::Char('-') => {
                let tempo = self.controller.tempo().saturating_sub(TEMPO_STEP);
                self.controller.update_tempo(tempo).map(|_| ())
            }
            KeyCode::Char(']') => self.shift_pitch(1),
            KeyCode::Char('[') => self.shift_pitch(-1),
            KeyCode::Char('e') => self.controller.init_effects(),
            KeyCode::Char('d') => self.controller.dispose_effects(),
            KeyCode::Char('c') => self.controller.connect_to_effects(),
            KeyCode::Char(c @ '1'..='4') => {
                let kind = EffectKind::ALL[c as usize - '1' as usize];
                let enabled = !self.controller.active_effects().contains(kind);
                self.controller.toggle_effect(kind, enabled)
            }
            KeyCode::Tab => {
                self.selected_param = (self.selected_param + 1) % PARAMS.len();
                Ok(())
            }
            KeyCode::BackTab => {
                self.selected_param = (self.selected_param + PARAMS.len() - 1) % PARAMS.len();
                Ok(())
            }
            KeyCode::Char('.') => self.nudge_param(1.0),
            KeyCode::Char(',') => self.nudge_param(-1.0),
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.status = err.to_string();
        }
    }

    fn nudge_param(&mut self, direction: f32) -> stepfx::Result<()> {
        let param = PARAMS[self.selected_param];
        let range = param.range();
        let current = self
            .pending
            .param(self.selected_param, self.controller.params_snapshot().get(param));
        let value = range.clamp(current + direction * PARAM_NUDGE * (range.max - range.min));
        self.controller.update_param(param, value)?;
        self.pending.set_param(self.selected_param, value);
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: transport, grid, effects, help, status
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Length(ROWS as u16 + 4), // Grid + hi-hat
                Constraint::Min(8),    // Effects rack
                Constraint::Length(1), // Help bar
                Constraint::Length(1), // Status
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.controller);

        let grid_block = Block::default().title(" Grid ").borders(Borders::ALL);
        let grid_inner = grid_block.inner(chunks[1]);
        frame.render_widget(grid_block, chunks[1]);
        render_grid(frame, grid_inner, &self.controller, (self.cursor_row, self.cursor_col));

        render_effects(frame, chunks[2], &self.controller, PARAMS[self.selected_param]);

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Stop  [Enter] Cell  [H] Hat  [+/-] Tempo  [[/]] Pitch  \
             [E/D/C] Init/Dispose/Connect  [1-4] Effect  [Tab] Param  [,/.] Adjust",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);

        let status = Paragraph::new(format!(" {}", self.status)).style(Style::default().fg(Color::Yellow));
        frame.render_widget(status, chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepfx::{graph::EffectsSnapshot, sequencing::Note};

    #[test]
    fn repeated_pitch_presses_accumulate_until_confirmed() {
        let mut pending = PendingEdits::default();
        let mirrored = 0;

        let first = pending.pitch(mirrored) + 1;
        pending.set_pitch(first);
        let second = pending.pitch(mirrored) + 1;
        pending.set_pitch(second);
        assert_eq!(second, 2);

        // The first confirmation is stale; the second clears the pending value.
        pending.observe(&EngineEvent::PitchChanged { root: Note::C4, offset: 1 });
        assert_eq!(pending.pitch(1), 2);
        pending.observe(&EngineEvent::PitchChanged { root: Note::C4, offset: 2 });
        assert_eq!(pending.pitch(5), 5);
    }

    #[test]
    fn param_nudges_build_on_unconfirmed_value() {
        let delay_wet = PARAMS.iter().position(|p| *p == EffectParam::DelayWet).unwrap();
        let mut pending = PendingEdits::default();
        pending.set_param(delay_wet, 0.35);
        assert_eq!(pending.param(delay_wet, 0.3), 0.35);

        let mut snapshot = EffectsSnapshot {
            allocated: true,
            ..EffectsSnapshot::default()
        };
        snapshot.delay.wet = 0.35;
        pending.observe(&EngineEvent::EffectsChanged(snapshot));
        assert_eq!(pending.param(delay_wet, 0.4), 0.4);
    }

    #[test]
    fn rejection_drops_pending_params() {
        let mut pending = PendingEdits::default();
        pending.set_param(0, 2.0);
        pending.observe(&EngineEvent::Rejected(stepfx::Error::NodeUnavailable(EffectKind::Filter)));
        assert_eq!(pending.param(0, 1.0), 1.0);
    }
}
