use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::TaskStore;
use crate::model::Config;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over a scratch store seeded with `(title, status)` tasks, using
/// the default columns. Ids are `<n>-task` so listing order is seed order.
pub fn app_with_tasks(seed: &[(&str, &str)]) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let store = TaskStore::new(tmp.path());
    for (n, (title, status)) in seed.iter().enumerate() {
        let id = format!("{}-task", n + 1);
        let task = crate::model::Task::new(id.clone(), *title, *status)
            .with_location(id.clone(), store.task_path(&id));
        store.save(&task).unwrap();
    }
    let listing = store.list().unwrap();
    let app = App::new(&Config::default(), store, listing);
    (tmp, app)
}
