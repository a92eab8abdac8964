//! Effects rack widget - one column per effect with its parameters

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use stepfx::{
    engine::Controller,
    graph::{EffectKind, EffectParam},
};

pub fn render_effects(frame: &mut Frame, area: Rect, controller: &Controller, selected: EffectParam) {
    let snapshot = controller.params_snapshot();
    let title = if snapshot.allocated { " Effects " } else { " Effects (not loaded) " };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);

    for (i, kind) in EffectKind::ALL.into_iter().enumerate() {
        let enabled = snapshot.active.contains(kind);
        let header_style = match (snapshot.allocated, enabled) {
            (false, _) => Style::default().fg(Color::DarkGray),
            (true, true) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(Color::Red),
        };

        let mut lines = vec![Line::from(Span::styled(
            format!("[{}] {} {}", i + 1, kind, if enabled { "on" } else { "off" }),
            header_style,
        ))];

        for &param in kind.params() {
            let style = if param == selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(
                format!("{:<10}{:>6.2}", param.name(), snapshot.get(param)),
                style,
            )));
        }

        frame.render_widget(Paragraph::new(lines), columns[i]);
    }
}
