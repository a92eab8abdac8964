//! Transport bar widget - shows BPM, play state, step, pitch and routing

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use stepfx::engine::Controller;

pub fn render_transport(frame: &mut Frame, area: Rect, controller: &Controller) {
    let block = Block::default().title(" stepfx ").borders(Borders::ALL);

    let playing = controller.is_playing();
    let play_symbol = if playing { "▶" } else { "■" };
    let play_state_str = if playing { "Playing" } else { "Stopped" };

    let step = match controller.current_step() {
        -1 => String::from("-"),
        step => (step + 1).to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {}  ", controller.tempo()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if playing { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(format!("Step {}  ", step), Style::default().fg(Color::White)),
        Span::styled(
            format!(
                "Root {}  Pitch {:+}  ",
                controller.root_note(),
                controller.pitch_offset()
            ),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            if controller.is_connected() { "FX connected" } else { "FX bypassed" },
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
