use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::task::Task;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the board: one bordered block per lane (configured columns, then
/// the unknown-status lane when it has tasks)
pub fn render_board_view(frame: &mut Frame, app: &App, area: Rect) {
    let board = &app.board.board;
    let lanes = board.lane_count();
    if lanes == 0 {
        return;
    }

    let constraints: Vec<Constraint> = (0..lanes)
        .map(|_| Constraint::Ratio(1, lanes as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for col in 0..lanes {
        let name = board.lane_name(col).unwrap_or_default();
        render_column(frame, app, col, name, chunks[col]);
    }
}

fn render_column(frame: &mut Frame, app: &App, col: usize, name: &str, area: Rect) {
    let state = &app.board;
    let theme = &app.theme;
    let bg = theme.background;
    let is_current = state.cursor.column == col;
    let unplaced = state.board.is_unplaced_lane(col);
    let indices = state.board.column_indices(col);

    let border_color = if is_current { theme.highlight } else { theme.border };
    let title_color = if unplaced {
        theme.red
    } else {
        theme.column_color(col, state.board.columns.len())
    };
    let title = Span::styled(
        format!(" {} ({}) ", name, indices.len()),
        Style::default()
            .fg(title_color)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color).bg(bg))
        .title(title)
        .style(Style::default().bg(bg));
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    if indices.is_empty() {
        lines.push(Line::from(Span::styled(
            " (empty)",
            Style::default().fg(theme.dim).bg(bg),
        )));
    }

    let offset = state.scroll_offset(col);
    for (row, &idx) in indices.iter().enumerate().skip(offset).take(inner_height) {
        let selected = is_current && row == state.cursor.row;
        lines.push(task_line(app, &state.board.tasks[idx], selected, unplaced, inner_width));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// ` title        1/3`, with the progress right-aligned when there is a checklist.
/// Tasks in the unknown-status lane show their status in red instead.
fn task_line<'a>(app: &App, task: &Task, selected: bool, unplaced: bool, width: usize) -> Line<'a> {
    let theme = &app.theme;
    let bg = if selected { theme.selection_bg } else { theme.background };
    let mut title_style = Style::default().fg(theme.text).bg(bg);
    if selected {
        title_style = title_style.fg(theme.text_bright).add_modifier(Modifier::BOLD);
    }

    let (done, total) = task.progress();
    let progress = if unplaced {
        format!(" {} ", task.status)
    } else if total > 0 {
        format!(" {}/{} ", done, total)
    } else {
        String::new()
    };
    let progress_color = if unplaced {
        theme.red
    } else if total > 0 && done == total {
        theme.green
    } else {
        theme.dim
    };

    let title_budget = width.saturating_sub(1 + display_width(&progress));
    let title = truncate_to_width(&task.title, title_budget);
    let padding = width.saturating_sub(1 + display_width(&title) + display_width(&progress));

    Line::from(vec![
        Span::styled(" ", title_style),
        Span::styled(title, title_style),
        Span::styled(" ".repeat(padding), title_style),
        Span::styled(progress, Style::default().fg(progress_color).bg(bg)),
    ])
}
