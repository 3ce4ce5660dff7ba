use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};

use crate::io::store::TaskStore;
use crate::model::board::Board;
use crate::model::task::Task;

use super::app::{StatusMessage, Viewport};
use super::confirm::{ConfirmAction, ConfirmAnswer, ConfirmState, answer_for};
use super::text_input::TextInput;

/// Rows taken by the column border and the status row
const BOARD_CHROME_ROWS: u16 = 3;

/// Board cursor: column index and row within that column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub column: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardMode {
    Normal,
    /// Typing the title of a new task
    Input,
    /// Waiting for y/n on `confirm`
    Confirm,
}

/// What the router should do after a board key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSignal {
    None,
    Quit,
    /// Open the detail view on this arena index
    OpenDetail(usize),
}

/// Multi-column overview: grouping, cursor, and the Normal/Input/Confirm modes
#[derive(Debug)]
pub struct BoardState {
    pub board: Board,
    pub cursor: Cursor,
    pub mode: BoardMode,
    pub input: TextInput,
    pub confirm: Option<ConfirmState>,
    pub message: Option<StatusMessage>,
    /// Parse failures and unknown statuses from the last listing
    pub warnings: Vec<String>,
    pub viewport: Viewport,
    /// First visible row per column
    scroll: Vec<usize>,
    /// First key of a two-key chord (`gg`, `dd`)
    pending_key: Option<char>,
}

impl BoardState {
    pub fn new(board: Board, warnings: Vec<String>) -> Self {
        let lanes = board.lane_count();
        let message = if warnings.is_empty() {
            None
        } else {
            Some(StatusMessage::warning(startup_warning(&warnings)))
        };
        BoardState {
            board,
            cursor: Cursor::default(),
            mode: BoardMode::Normal,
            input: TextInput::new(),
            confirm: None,
            message,
            warnings,
            viewport: Viewport::default(),
            scroll: vec![0; lanes],
            pending_key: None,
        }
    }

    /// Arena index of the task under the cursor
    pub fn selected_index(&self) -> Option<usize> {
        self.board.index_at(self.cursor.column, self.cursor.row)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.board.task_at(self.cursor.column, self.cursor.row)
    }

    /// Name of the lane under the cursor
    pub fn current_column(&self) -> &str {
        self.board.lane_name(self.cursor.column).unwrap_or("")
    }

    /// First visible row of column `col`
    pub fn scroll_offset(&self, col: usize) -> usize {
        self.scroll.get(col).copied().unwrap_or(0)
    }

    /// Task rows that fit in one column at the current size
    pub fn visible_rows(&self) -> usize {
        self.viewport.height.saturating_sub(BOARD_CHROME_ROWS).max(1) as usize
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
        self.ensure_visible();
    }

    pub fn handle_key(&mut self, key: KeyEvent, store: &TaskStore) -> BoardSignal {
        match self.mode {
            BoardMode::Normal => self.handle_normal(key, store),
            BoardMode::Input => {
                self.handle_input(key, store);
                BoardSignal::None
            }
            BoardMode::Confirm => {
                self.handle_confirm(key, store);
                BoardSignal::None
            }
        }
    }

    fn handle_normal(&mut self, key: KeyEvent, store: &TaskStore) -> BoardSignal {
        self.message = None;
        let pending = self.pending_key.take();

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c')) => return BoardSignal::Quit,

            (KeyModifiers::NONE, KeyCode::Char('h') | KeyCode::Left) => {
                self.move_column(-1);
            }
            (KeyModifiers::NONE, KeyCode::Char('l') | KeyCode::Right) => {
                self.move_column(1);
            }
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if self.cursor.row + 1 < self.board.column_len(self.cursor.column) {
                    self.cursor.row += 1;
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.cursor.row = self.cursor.row.saturating_sub(1);
            }
            (KeyModifiers::NONE, KeyCode::Char('g')) => {
                if pending == Some('g') {
                    self.cursor.row = 0;
                } else {
                    self.pending_key = Some('g');
                }
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                self.cursor.row = self.board.column_len(self.cursor.column).saturating_sub(1);
            }

            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('H'))
            | (KeyModifiers::SHIFT, KeyCode::Left) => {
                self.move_task(-1, store);
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('L'))
            | (KeyModifiers::SHIFT, KeyCode::Right) => {
                self.move_task(1, store);
            }

            (KeyModifiers::NONE, KeyCode::Char('n' | 'i')) => {
                self.input.clear();
                self.mode = BoardMode::Input;
            }
            (KeyModifiers::NONE, KeyCode::Char('d')) => {
                if pending == Some('d') {
                    self.confirm_delete();
                } else {
                    self.pending_key = Some('d');
                }
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                if let Some(idx) = self.selected_index() {
                    return BoardSignal::OpenDetail(idx);
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                let follow = self.selected_task().map(|t| t.id.clone());
                self.reload(store, follow.as_deref());
                if self.message.is_none() {
                    self.message = Some(StatusMessage::info("Reloaded"));
                }
            }
            _ => {}
        }

        self.ensure_visible();
        BoardSignal::None
    }

    fn handle_input(&mut self, key: KeyEvent, store: &TaskStore) {
        match key.code {
            KeyCode::Enter => {
                let title = self.input.take();
                self.mode = BoardMode::Normal;
                if !title.trim().is_empty() {
                    self.create_task(&title, store);
                }
            }
            KeyCode::Esc => {
                self.input.clear();
                self.mode = BoardMode::Normal;
            }
            _ => {
                self.input.handle_key(key);
            }
        }
    }

    fn handle_confirm(&mut self, key: KeyEvent, store: &TaskStore) {
        let Some(answer) = answer_for(key, false) else {
            return;
        };
        let confirm = self.confirm.take();
        self.mode = BoardMode::Normal;
        if answer != ConfirmAnswer::Yes {
            debug!("board confirmation declined");
            return;
        }
        if let Some(ConfirmState {
            action: ConfirmAction::DeleteTask { id },
            ..
        }) = confirm
        {
            self.delete_task(&id, store);
        }
    }

    /// Step the column cursor by `delta`, clamping the row to the new lane
    fn move_column(&mut self, delta: isize) {
        let target = self.cursor.column as isize + delta;
        if target < 0 || target as usize >= self.board.lane_count() {
            return;
        }
        self.cursor.column = target as usize;
        self.clamp_cursor();
    }

    /// Set the selected task's status to the adjacent column, persist, reload.
    /// Only configured columns are targets, so `H` from the unplaced lane
    /// puts its task into the last column.
    fn move_task(&mut self, delta: isize, store: &TaskStore) {
        let Some(idx) = self.selected_index() else {
            return;
        };
        let target = self.cursor.column as isize + delta;
        if target < 0 || target as usize >= self.board.columns.len() {
            return;
        }
        let new_status = self.board.columns[target as usize].clone();

        let task = &mut self.board.tasks[idx];
        let old_status = std::mem::replace(&mut task.status, new_status);
        if let Err(e) = store.save(task) {
            warn!("move of {} failed: {}", task.id, e);
            task.status = old_status;
            self.message = Some(StatusMessage::error(e.to_string()));
            return;
        }
        info!("moved task {} from {} to {}", task.id, old_status, task.status);
        let id = task.id.clone();
        self.reload(store, Some(&id));
    }

    fn create_task(&mut self, title: &str, store: &TaskStore) {
        let Some(status) = self.board.columns.first().cloned() else {
            return;
        };
        match store.create(title, &status) {
            Ok(task) => {
                self.cursor = Cursor::default();
                self.reload(store, Some(&task.id));
                self.message = Some(StatusMessage::info(format!("Created '{}'", task.title)));
            }
            Err(e) => {
                self.message = Some(StatusMessage::error(e.to_string()));
            }
        }
    }

    fn confirm_delete(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        self.confirm = Some(ConfirmState::new(
            format!("Delete '{}'? (y/n)", task.title),
            ConfirmAction::DeleteTask {
                id: task.id.clone(),
            },
        ));
        self.mode = BoardMode::Confirm;
    }

    fn delete_task(&mut self, id: &str, store: &TaskStore) {
        let Some(task) = self.board.tasks.iter().find(|t| t.id == id) else {
            return;
        };
        match store.delete(task) {
            Ok(()) => {
                let title = task.title.clone();
                self.cursor.row = self.cursor.row.saturating_sub(1);
                self.reload(store, None);
                self.message = Some(StatusMessage::info(format!("Deleted '{}'", title)));
            }
            Err(e) => {
                self.message = Some(StatusMessage::error(e.to_string()));
            }
        }
    }

    /// Re-list the store and regroup from scratch.
    ///
    /// With `follow`, the cursor lands on that task if it is still on the
    /// board; otherwise the numeric position is kept and clamped. If the
    /// directory cannot be listed, the in-memory tasks are regrouped instead
    /// so a status changed just before stays consistent with its lane.
    pub fn reload(&mut self, store: &TaskStore, follow: Option<&str>) {
        let tasks = match store.list() {
            Ok(listing) => {
                self.warnings = listing.warnings(&self.board.columns);
                listing.tasks
            }
            Err(e) => {
                warn!("reload failed: {}", e);
                self.message = Some(StatusMessage::error(e.to_string()));
                std::mem::take(&mut self.board.tasks)
            }
        };
        self.board.replace_tasks(tasks);
        self.scroll.resize(self.board.lane_count(), 0);

        match follow.and_then(|id| self.board.position_of(id)) {
            Some((column, row)) => self.cursor = Cursor { column, row },
            None => self.clamp_cursor(),
        }
        self.ensure_visible();
        debug!(
            "board reloaded: {} tasks, cursor {:?}",
            self.board.tasks.len(),
            self.cursor
        );
    }

    /// Keep the cursor inside the board and the current column
    pub fn clamp_cursor(&mut self) {
        let lanes = self.board.lane_count();
        self.cursor.column = self.cursor.column.min(lanes.saturating_sub(1));
        let len = self.board.column_len(self.cursor.column);
        self.cursor.row = self.cursor.row.min(len.saturating_sub(1));
    }

    /// Scroll the current column so the cursor row is on screen
    fn ensure_visible(&mut self) {
        let height = self.visible_rows();
        let col = self.cursor.column;
        let Some(offset) = self.scroll.get_mut(col) else {
            return;
        };
        if self.cursor.row < *offset {
            *offset = self.cursor.row;
        } else if self.cursor.row >= *offset + height {
            *offset = self.cursor.row + 1 - height;
        }
    }
}

fn startup_warning(warnings: &[String]) -> String {
    match warnings {
        [only] => only.clone(),
        [first, rest @ ..] => format!("{} (+{} more, see `doings list`)", first, rest.len()),
        [] => String::new(),
    }
}
