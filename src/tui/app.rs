use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{debug, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io::load_config;
use crate::io::store::{Listing, TaskStore};
use crate::io::watcher::TasksWatcher;
use crate::model::{Board, Config};

use super::board::{BoardMode, BoardSignal, BoardState};
use super::detail::{DetailSignal, DetailState};
use super::render;
use super::theme::Theme;

/// Last known terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 80,
            height: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
}

/// A transient message for the status row, cleared on the next key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            kind: MessageKind::Info,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            kind: MessageKind::Warning,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            kind: MessageKind::Error,
        }
    }
}

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Board,
    Detail,
}

/// Everything the event loop feeds into the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Task files changed on disk
    FilesChanged,
}

/// Main application state: routes events between the board and detail views
pub struct App {
    pub store: TaskStore,
    pub board: BoardState,
    /// The open editing session, present while `view` is `Detail`
    pub detail: Option<DetailState>,
    pub view: View,
    pub show_help: bool,
    pub should_quit: bool,
    pub theme: Theme,
    /// Disk changed while a reload was not safe to apply
    pub reload_pending: bool,
}

impl App {
    pub fn new(config: &Config, store: TaskStore, listing: Listing) -> Self {
        let warnings = listing.warnings(&config.board.columns);
        let board = Board::new(config.board.columns.clone(), listing.tasks);
        App {
            store,
            board: BoardState::new(board, warnings),
            detail: None,
            view: View::Board,
            show_help: false,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            reload_pending: false,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize(width, height) => self.resize(width, height),
            AppEvent::FilesChanged => {
                debug!("task files changed on disk");
                self.reload_pending = true;
            }
        }
        self.apply_pending_reload();
    }

    /// Whether a text field owns the keyboard in the active view
    pub fn is_editing_text(&self) -> bool {
        match self.view {
            View::Board => self.board.mode == BoardMode::Input,
            View::Detail => self.detail.as_ref().is_some_and(|d| d.is_editing_text()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        if matches!(
            (key.modifiers, key.code),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('?'))
        ) && !self.is_editing_text()
        {
            self.show_help = true;
            return;
        }

        match self.view {
            View::Board => match self.board.handle_key(key, &self.store) {
                BoardSignal::Quit => {
                    info!("quit");
                    self.should_quit = true;
                }
                BoardSignal::OpenDetail(idx) => self.open_detail(idx),
                BoardSignal::None => {}
            },
            View::Detail => self.handle_detail_key(key),
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(detail) = self.detail.as_mut() else {
            self.view = View::Board;
            return;
        };
        let Some(task) = self.board.board.tasks.get_mut(detail.task) else {
            warn!("detail view lost its task, returning to board");
            self.close_detail(true);
            return;
        };

        let mut signal = detail.handle_key(key, task, &self.store);
        if signal == DetailSignal::RequestExit {
            signal = detail.request_exit();
        }
        if let DetailSignal::Exit { discarded } = signal {
            self.close_detail(discarded);
        }
    }

    /// Start an editing session on the task at `idx` in the board arena
    pub fn open_detail(&mut self, idx: usize) {
        if let Some(task) = self.board.board.tasks.get(idx) {
            info!("opening detail for {}", task.id);
        }
        self.detail = Some(DetailState::new(idx, self.board.viewport));
        self.view = View::Detail;
    }

    /// Return to the board. A discard leaves the detail session's edits in
    /// the arena record, which then no longer matches its file; the board is
    /// reloaded from disk so the unsaved changes are dropped rather than
    /// shown as if they were kept.
    fn close_detail(&mut self, discarded: bool) {
        let id = self
            .detail
            .take()
            .and_then(|d| self.board.board.tasks.get(d.task))
            .map(|t| t.id.clone());
        self.view = View::Board;
        if discarded {
            debug!("reloading after discard");
            self.board.reload(&self.store, id.as_deref());
            self.reload_pending = false;
        }
    }

    /// Resize both views so switching keeps consistent geometry
    fn resize(&mut self, width: u16, height: u16) {
        self.board.resize(width, height);
        if let Some(detail) = self.detail.as_mut()
            && let Some(task) = self.board.board.tasks.get(detail.task)
        {
            detail.resize(width, height, task);
        }
    }

    /// Apply a deferred reload once the board is idle. The arena is never
    /// rebuilt while a detail session holds an index into it.
    fn apply_pending_reload(&mut self) {
        if !self.reload_pending || self.view != View::Board || self.board.mode != BoardMode::Normal {
            return;
        }
        self.reload_pending = false;
        let follow = self.board.selected_task().map(|t| t.id.clone());
        self.board.reload(&self.store, follow.as_deref());
    }
}

/// Run the TUI application on the given tasks directory
pub fn run(tasks_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(tasks_dir)?;
    let store = TaskStore::new(tasks_dir);
    let listing = store.list()?;
    let mut app = App::new(&config, store, listing);

    let watcher = match TasksWatcher::start(tasks_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("file watching disabled: {}", e);
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let size = terminal.size()?;
    app.handle_event(AppEvent::Resize(size.width, size.height));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&TasksWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_event(AppEvent::Key(key));
                }
                Event::Resize(width, height) => {
                    app.handle_event(AppEvent::Resize(width, height));
                }
                _ => {}
            }
        }

        if let Some(watcher) = watcher
            && watcher.changed()
        {
            app.handle_event(AppEvent::FilesChanged);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
