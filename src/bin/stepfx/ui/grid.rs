//! Grid widget - four melodic rows (top row highest) plus the hi-hat lane,
//! with the playing column highlighted

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use stepfx::{
    config::{ROWS, STEPS},
    engine::Controller,
    sequencing::row_base_note,
};

pub fn render_grid(frame: &mut Frame, area: Rect, controller: &Controller, cursor: (usize, usize)) {
    if area.height < 2 || area.width < 20 {
        return;
    }

    let grid = controller.grid();
    let current = usize::try_from(controller.current_step()).ok();
    let root = controller.root_note().transpose(controller.pitch_offset());

    let cell_style = |on: bool, col: usize, focused: bool| {
        let mut style = Style::default().fg(if on { Color::Green } else { Color::DarkGray });
        if Some(col) == current {
            style = style.bg(Color::Rgb(40, 40, 60));
        }
        if focused {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    };

    let mut lines = Vec::with_capacity(ROWS + 1);
    for row in (0..ROWS).rev() {
        let mut spans = vec![Span::styled(
            format!(" {:>4}  ", row_base_note(root, row).to_string()),
            Style::default().fg(Color::White),
        )];
        for col in 0..STEPS {
            let on = grid.get(row, col);
            let focused = cursor == (row, col);
            spans.push(Span::styled(if on { " ▓▓ " } else { " ░░ " }, cell_style(on, col, focused)));
        }
        lines.push(Line::from(spans));
    }

    let hihat = controller.hihat();
    let mut spans = vec![Span::styled("  hat  ", Style::default().fg(Color::White))];
    for col in 0..STEPS {
        let on = hihat.get(col);
        spans.push(Span::styled(if on { " xx " } else { " .. " }, cell_style(on, col, false)));
    }
    lines.push(Line::from(spans));

    frame.render_widget(Paragraph::new(lines), area);
}
