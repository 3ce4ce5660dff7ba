use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::{INDENT_WIDTH, Task};
use crate::tui::app::App;
use crate::tui::detail::{DetailMode, DetailState};
use crate::util::unicode::truncate_to_width;

/// Render one task: header, description, checklist
pub fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = app.detail.as_ref() else {
        return;
    };
    let Some(task) = app.board.board.tasks.get(detail.task) else {
        return;
    };

    let description = description_lines(app, detail, task);
    let description_height = (description.len() as u16).min(area.height / 2).max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),                  // title + status
            Constraint::Length(1),                  // separator
            Constraint::Length(description_height), // description
            Constraint::Length(1),                  // separator
            Constraint::Min(1),                     // checklist
        ])
        .split(area);

    frame.render_widget(Paragraph::new(header_lines(app, detail, task)), chunks[0]);
    frame.render_widget(separator(app, area.width), chunks[1]);
    frame.render_widget(Paragraph::new(description), chunks[2]);
    frame.render_widget(separator(app, area.width), chunks[3]);
    render_checklist(frame, app, detail, task, chunks[4]);
}

fn header_lines<'a>(app: &App, detail: &DetailState, task: &Task) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let bg = theme.background;

    let mut title = vec![Span::styled(
        format!(" {}", task.title),
        Style::default()
            .fg(theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if detail.modified {
        title.push(Span::styled(" [*]", Style::default().fg(theme.yellow).bg(bg)));
    }

    let columns = &app.board.board.columns;
    let status_color = match columns.iter().position(|c| *c == task.status) {
        Some(idx) => theme.column_color(idx, columns.len()),
        None => theme.red,
    };
    let (done, total) = task.progress();
    let status = vec![
        Span::styled(format!(" [{}]", task.status), Style::default().fg(status_color).bg(bg)),
        Span::styled(
            format!("  {}/{} done", done, total),
            Style::default().fg(theme.dim).bg(bg),
        ),
    ];

    vec![Line::from(title), Line::from(status)]
}

fn separator<'a>(app: &App, width: u16) -> Paragraph<'a> {
    Paragraph::new(Line::from(Span::styled(
        "\u{2500}".repeat(width as usize),
        Style::default().fg(app.theme.border).bg(app.theme.background),
    )))
}

/// The stored description, or the edit buffer with its cursor while editing
fn description_lines<'a>(app: &App, detail: &DetailState, task: &Task) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let bg = theme.background;
    let style = Style::default().fg(theme.text).bg(bg);

    if detail.mode == DetailMode::EditDescription {
        let cursor_style = Style::default().fg(theme.highlight).bg(bg);
        let value = detail.description.value();
        let before = &value[..detail.description.cursor()];
        let cursor_line = before.matches('\n').count();
        let cursor_col = before.len() - before.rfind('\n').map_or(0, |i| i + 1);
        return value
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                if i != cursor_line {
                    return Line::from(Span::styled(format!(" {}", line), style));
                }
                let (l, r) = line.split_at(cursor_col);
                Line::from(vec![
                    Span::styled(format!(" {}", l), style),
                    Span::styled("\u{258C}", cursor_style), // ▌ cursor
                    Span::styled(r.to_string(), style),
                ])
            })
            .collect();
    }

    if task.description.is_empty() {
        return vec![Line::from(Span::styled(
            " (no description)",
            Style::default().fg(theme.dim).bg(bg),
        ))];
    }
    task.description
        .lines()
        .map(|line| Line::from(Span::styled(format!(" {}", line), style)))
        .collect()
}

fn render_checklist(frame: &mut Frame, app: &App, detail: &DetailState, task: &Task, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let width = area.width as usize;
    let rows = (area.height as usize).max(1);

    if task.checklist.is_empty() {
        let hint = Line::from(Span::styled(
            " No checklist items (o to add)",
            Style::default().fg(theme.dim).bg(bg),
        ));
        frame.render_widget(Paragraph::new(hint), area);
        return;
    }

    // The state's offset assumes a one-line description; correct for the real height
    let mut offset = detail.scroll_offset.min(detail.cursor);
    if detail.cursor >= offset + rows {
        offset = detail.cursor + 1 - rows;
    }

    let lines: Vec<Line> = task
        .checklist
        .iter()
        .enumerate()
        .skip(offset)
        .take(rows)
        .map(|(i, item)| {
            let selected = i == detail.cursor;
            let row_bg = if selected { theme.selection_bg } else { bg };
            let box_color = if item.checked { theme.green } else { theme.dim };
            let mut text_style = Style::default().fg(theme.text).bg(row_bg);
            if item.checked {
                text_style = text_style.fg(theme.dim).add_modifier(Modifier::CROSSED_OUT);
            }
            if selected {
                text_style = text_style.add_modifier(Modifier::BOLD);
            }

            let indent = " ".repeat(1 + item.indent * INDENT_WIDTH);
            let prefix_width = indent.len() + 4;
            let text = truncate_to_width(&item.text, width.saturating_sub(prefix_width));
            Line::from(vec![
                Span::styled(indent, Style::default().bg(row_bg)),
                Span::styled(item.checkbox(), Style::default().fg(box_color).bg(row_bg)),
                Span::styled(" ", Style::default().bg(row_bg)),
                Span::styled(text, text_style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}
