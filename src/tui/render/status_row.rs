use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, StatusMessage, View};
use crate::tui::board::BoardMode;
use crate::tui::detail::DetailMode;
use crate::util::unicode::display_width;

use super::input_spans;

/// Render the status row (bottom of screen): prompt, message, or key hints
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let text_style = Style::default().fg(theme.text_bright).bg(bg);
    let cursor_style = Style::default().fg(theme.highlight).bg(bg);
    let prompt_style = Style::default().fg(theme.yellow).bg(bg);

    let (mut spans, hint) = match app.view {
        View::Board => {
            let board = &app.board;
            match board.mode {
                BoardMode::Input => {
                    let mut spans = vec![Span::styled("New task: ", prompt_style)];
                    spans.extend(input_spans(&board.input, text_style, cursor_style));
                    (spans, "Enter create  Esc cancel")
                }
                BoardMode::Confirm => (
                    confirm_spans(app, board.confirm.as_ref().map(|c| c.prompt.as_str())),
                    "",
                ),
                BoardMode::Normal => (
                    message_spans(app, board.message.as_ref()),
                    "n new  Enter open  H/L move  dd delete  ? help  q quit",
                ),
            }
        }
        View::Detail => match app.detail.as_ref() {
            Some(detail) => match detail.mode {
                DetailMode::Input => {
                    let mut spans = vec![Span::styled("New item: ", prompt_style)];
                    spans.extend(input_spans(&detail.input, text_style, cursor_style));
                    (spans, "Enter add  Esc cancel")
                }
                DetailMode::EditDescription => (
                    message_spans(app, detail.message.as_ref()),
                    "Enter done  Alt+Enter newline  Esc cancel",
                ),
                DetailMode::Confirm => {
                    (confirm_spans(app, detail.confirm.as_ref().map(|c| c.prompt.as_str())), "")
                }
                DetailMode::Normal => (
                    message_spans(app, detail.message.as_ref()),
                    "Space toggle  o/O add  x delete  e edit  s save  Esc back",
                ),
            },
            None => (Vec::new(), ""),
        },
    };

    // Right-align the hint if it fits
    let width = area.width as usize;
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if !hint.is_empty() && content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn message_spans(app: &App, message: Option<&StatusMessage>) -> Vec<Span<'static>> {
    match message {
        Some(message) => vec![Span::styled(
            message.text.clone(),
            Style::default()
                .fg(app.theme.message_color(message.kind))
                .bg(app.theme.background),
        )],
        None => Vec::new(),
    }
}

fn confirm_spans(app: &App, prompt: Option<&str>) -> Vec<Span<'static>> {
    vec![Span::styled(
        prompt.unwrap_or_default().to_string(),
        Style::default().fg(app.theme.yellow).bg(app.theme.background),
    )]
}
