pub mod board_view;
pub mod detail_view;
pub mod help_overlay;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;

use super::app::{App, View};
use super::text_input::TextInput;

/// Main render function: dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    match app.view {
        View::Board => board_view::render_board_view(frame, app, chunks[0]),
        View::Detail => detail_view::render_detail_view(frame, app, chunks[0]),
    }

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }

    status_row::render_status_row(frame, app, chunks[1]);
}

/// Spans for a single-line input buffer with a block cursor
pub(super) fn input_spans(input: &TextInput, style: Style, cursor_style: Style) -> Vec<Span<'static>> {
    let value = input.value();
    let (before, after) = value.split_at(input.cursor());
    vec![
        Span::styled(before.to_string(), style),
        Span::styled("\u{258C}", cursor_style), // ▌ cursor
        Span::styled(after.to_string(), style),
    ]
}
