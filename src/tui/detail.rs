use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};

use crate::io::store::TaskStore;
use crate::model::task::{CheckItem, Task};
use crate::parse::task_parser::{is_delimiter, trim_blank_lines};

use super::app::{StatusMessage, Viewport};
use super::confirm::{ConfirmAction, ConfirmAnswer, ConfirmState, answer_for};
use super::text_input::TextInput;

/// Rows above the checklist: title, status, separators, and the status row
const DETAIL_CHROME_ROWS: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailMode {
    Normal,
    /// Typing a new checklist item
    Input,
    EditDescription,
    /// Unsaved-changes prompt
    Confirm,
}

/// Where a new checklist item goes relative to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Above,
    Below,
}

/// What the router should do after a detail key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSignal {
    Stay,
    /// The user asked to go back; the router must call `request_exit`
    RequestExit,
    /// Leaving is allowed. `discarded` means the record differs from disk.
    Exit { discarded: bool },
}

/// One task's editing session. The task itself stays in the board arena;
/// this holds its index and the editing state around it.
#[derive(Debug)]
pub struct DetailState {
    /// Arena index of the task being edited
    pub task: usize,
    pub cursor: usize,
    pub mode: DetailMode,
    pub modified: bool,
    pub insert: InsertPosition,
    pub input: TextInput,
    pub description: TextInput,
    pub confirm: Option<ConfirmState>,
    pub message: Option<StatusMessage>,
    pub viewport: Viewport,
    pub scroll_offset: usize,
    pending_key: Option<char>,
}

impl DetailState {
    pub fn new(task: usize, viewport: Viewport) -> Self {
        DetailState {
            task,
            cursor: 0,
            mode: DetailMode::Normal,
            modified: false,
            insert: InsertPosition::Below,
            input: TextInput::new(),
            description: TextInput::multiline(),
            confirm: None,
            message: None,
            viewport,
            scroll_offset: 0,
            pending_key: None,
        }
    }

    /// Whether a text field currently owns the keyboard
    pub fn is_editing_text(&self) -> bool {
        matches!(self.mode, DetailMode::Input | DetailMode::EditDescription)
    }

    /// Checklist rows that fit below the header at the current size
    pub fn visible_rows(&self) -> usize {
        self.viewport.height.saturating_sub(DETAIL_CHROME_ROWS).max(1) as usize
    }

    pub fn resize(&mut self, width: u16, height: u16, task: &Task) {
        self.viewport = Viewport { width, height };
        self.ensure_visible(task);
    }

    pub fn handle_key(&mut self, key: KeyEvent, task: &mut Task, store: &TaskStore) -> DetailSignal {
        let signal = match self.mode {
            DetailMode::Normal => self.handle_normal(key, task, store),
            DetailMode::Input => {
                self.handle_input(key, task);
                DetailSignal::Stay
            }
            DetailMode::EditDescription => {
                self.handle_description(key, task);
                DetailSignal::Stay
            }
            DetailMode::Confirm => self.handle_confirm(key, task, store),
        };
        self.ensure_visible(task);
        signal
    }

    /// The exit guard: with unsaved changes, arm the save/discard/cancel
    /// prompt and stay; otherwise allow the exit.
    pub fn request_exit(&mut self) -> DetailSignal {
        if !self.modified {
            return DetailSignal::Exit { discarded: false };
        }
        debug!("exit with unsaved changes, asking");
        self.confirm = Some(ConfirmState::new(
            "Unsaved changes. Save? (y/n/c)",
            ConfirmAction::LeaveDetail,
        ));
        self.mode = DetailMode::Confirm;
        DetailSignal::Stay
    }

    fn handle_normal(&mut self, key: KeyEvent, task: &mut Task, store: &TaskStore) -> DetailSignal {
        self.message = None;
        let pending = self.pending_key.take();
        let len = task.checklist.len();

        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => return DetailSignal::RequestExit,

            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            (KeyModifiers::NONE, KeyCode::Char('g')) => {
                if pending == Some('g') {
                    self.cursor = 0;
                } else {
                    self.pending_key = Some('g');
                }
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                self.cursor = len.saturating_sub(1);
            }

            (KeyModifiers::NONE, KeyCode::Char(' ')) => {
                if let Some(item) = task.checklist.get_mut(self.cursor) {
                    item.checked = !item.checked;
                    self.modified = true;
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('o')) => self.start_input(InsertPosition::Below),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('O')) => {
                self.start_input(InsertPosition::Above)
            }
            (KeyModifiers::NONE, KeyCode::Char('x')) => {
                if self.cursor < len {
                    task.checklist.remove(self.cursor);
                    self.cursor = self.cursor.min(task.checklist.len().saturating_sub(1));
                    self.modified = true;
                }
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('J')) => {
                if self.cursor + 1 < len {
                    task.checklist.swap(self.cursor, self.cursor + 1);
                    self.cursor += 1;
                    self.modified = true;
                }
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('K')) => {
                if self.cursor > 0 && self.cursor < len {
                    task.checklist.swap(self.cursor, self.cursor - 1);
                    self.cursor -= 1;
                    self.modified = true;
                }
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                if let Some(item) = task.checklist.get_mut(self.cursor) {
                    item.indent += 1;
                    self.modified = true;
                }
            }
            (_, KeyCode::BackTab) => {
                if let Some(item) = task.checklist.get_mut(self.cursor)
                    && item.indent > 0
                {
                    item.indent -= 1;
                    self.modified = true;
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('e')) => {
                self.description.set(&task.description);
                self.mode = DetailMode::EditDescription;
            }
            (KeyModifiers::NONE, KeyCode::Char('s'))
            | (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.save(task, store);
            }
            _ => {}
        }
        DetailSignal::Stay
    }

    fn start_input(&mut self, position: InsertPosition) {
        self.insert = position;
        self.input.clear();
        self.mode = DetailMode::Input;
    }

    fn handle_input(&mut self, key: KeyEvent, task: &mut Task) {
        match key.code {
            KeyCode::Enter => {
                let text = self.input.take();
                self.mode = DetailMode::Normal;
                let text = text.trim();
                if !text.is_empty() {
                    self.insert_item(text, task);
                }
            }
            KeyCode::Esc => {
                self.input.clear();
                self.mode = DetailMode::Normal;
            }
            _ => {
                self.input.handle_key(key);
            }
        }
    }

    /// Insert at the recorded position, inheriting the anchor item's indent
    fn insert_item(&mut self, text: &str, task: &mut Task) {
        let Some(anchor) = task.checklist.get(self.cursor) else {
            task.checklist.push(CheckItem::new(text, 0));
            self.cursor = task.checklist.len() - 1;
            self.modified = true;
            return;
        };
        let item = CheckItem::new(text, anchor.indent);
        let at = match self.insert {
            InsertPosition::Above => self.cursor,
            InsertPosition::Below => self.cursor + 1,
        };
        task.checklist.insert(at, item);
        self.cursor = at;
        self.modified = true;
    }

    fn handle_description(&mut self, key: KeyEvent, task: &mut Task) {
        match key.code {
            KeyCode::Enter if key.modifiers != KeyModifiers::ALT => {
                let lines: Vec<&str> = self.description.value().lines().collect();
                if lines.iter().any(|l| is_delimiter(l)) {
                    self.message = Some(StatusMessage::error(
                        "A description line cannot be '---'",
                    ));
                    return;
                }
                let text = trim_blank_lines(&lines);
                if text != task.description {
                    task.description = text;
                    self.modified = true;
                }
                self.description.clear();
                self.mode = DetailMode::Normal;
            }
            KeyCode::Esc => {
                self.description.clear();
                self.mode = DetailMode::Normal;
            }
            _ => {
                self.message = None;
                self.description.handle_key(key);
            }
        }
    }

    fn handle_confirm(&mut self, key: KeyEvent, task: &Task, store: &TaskStore) -> DetailSignal {
        let Some(answer) = answer_for(key, true) else {
            return DetailSignal::Stay;
        };
        self.confirm = None;
        self.mode = DetailMode::Normal;
        match answer {
            ConfirmAnswer::Yes => {
                if self.save(task, store) {
                    DetailSignal::Exit { discarded: false }
                } else {
                    DetailSignal::Stay
                }
            }
            ConfirmAnswer::No => {
                info!("discarding unsaved changes to {}", task.id);
                DetailSignal::Exit { discarded: true }
            }
            ConfirmAnswer::Cancel => DetailSignal::Stay,
        }
    }

    /// Persist the task. On failure `modified` stays set so the user can
    /// retry or discard.
    fn save(&mut self, task: &Task, store: &TaskStore) -> bool {
        match store.save(task) {
            Ok(()) => {
                self.modified = false;
                self.message = Some(StatusMessage::info("Saved!"));
                true
            }
            Err(e) => {
                warn!("save of {} failed: {}", task.id, e);
                self.message = Some(StatusMessage::error(format!("Error saving: {}", e)));
                false
            }
        }
    }

    fn ensure_visible(&mut self, task: &Task) {
        self.cursor = self.cursor.min(task.checklist.len().saturating_sub(1));
        let height = self.visible_rows();
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + height {
            self.scroll_offset = self.cursor + 1 - height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
    }

    fn setup(items: &[(&str, bool, usize)]) -> (TempDir, TaskStore, Task, DetailState) {
        let tmp = TempDir::new().unwrap();
        let store = TaskStore::new(tmp.path());
        let mut task = Task::new("1-a", "A", "TODO").with_location("1-a", store.task_path("1-a"));
        for (text, checked, indent) in items {
            let mut item = CheckItem::new(*text, *indent);
            item.checked = *checked;
            task.checklist.push(item);
        }
        store.save(&task).unwrap();
        let state = DetailState::new(0, Viewport { width: 80, height: 24 });
        (tmp, store, task, state)
    }

    fn press(state: &mut DetailState, task: &mut Task, store: &TaskStore, keys: &[KeyEvent]) -> DetailSignal {
        let mut last = DetailSignal::Stay;
        for k in keys {
            last = state.handle_key(*k, task, store);
        }
        last
    }

    fn type_text(state: &mut DetailState, task: &mut Task, store: &TaskStore, text: &str) {
        for c in text.chars() {
            state.handle_key(key(KeyCode::Char(c)), task, store);
        }
    }

    fn texts(task: &Task) -> Vec<&str> {
        task.checklist.iter().map(|i| i.text.as_str()).collect()
    }

    #[test]
    fn test_toggle_marks_modified() {
        let (_tmp, store, mut task, mut state) = setup(&[("one", false, 0), ("two", false, 0)]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('j')), key(KeyCode::Char(' '))]);
        assert!(task.checklist[1].checked);
        assert!(state.modified);
    }

    #[test]
    fn test_unsaved_changes_guard() {
        let (_tmp, store, mut task, mut state) = setup(&[("one", false, 0)]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char(' '))]);

        // Leaving must go through the prompt
        assert_eq!(press(&mut state, &mut task, &store, &[key(KeyCode::Esc)]), DetailSignal::RequestExit);
        assert_eq!(state.request_exit(), DetailSignal::Stay);
        assert_eq!(state.mode, DetailMode::Confirm);

        // Cancel stays with the change pending
        assert_eq!(press(&mut state, &mut task, &store, &[key(KeyCode::Char('c'))]), DetailSignal::Stay);
        assert_eq!(state.mode, DetailMode::Normal);
        assert!(state.modified);

        // Discard leaves the in-memory toggle alone and does not write
        state.request_exit();
        assert_eq!(
            press(&mut state, &mut task, &store, &[key(KeyCode::Char('n'))]),
            DetailSignal::Exit { discarded: true }
        );
        assert!(task.checklist[0].checked);
        assert!(!TaskStore::load(&task.path).unwrap().checklist[0].checked);
    }

    #[test]
    fn test_unsaved_changes_save_then_exit() {
        let (_tmp, store, mut task, mut state) = setup(&[("one", false, 0)]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char(' '))]);
        state.request_exit();
        assert_eq!(
            press(&mut state, &mut task, &store, &[key(KeyCode::Char('y'))]),
            DetailSignal::Exit { discarded: false }
        );
        assert!(!state.modified);
        assert!(TaskStore::load(&task.path).unwrap().checklist[0].checked);
    }

    #[test]
    fn test_clean_exit_needs_no_prompt() {
        let (_tmp, _store, _task, mut state) = setup(&[]);
        assert_eq!(state.request_exit(), DetailSignal::Exit { discarded: false });
        assert!(state.confirm.is_none());
    }

    #[test]
    fn test_failed_save_keeps_modified() {
        let (tmp, store, mut task, mut state) = setup(&[("one", false, 0)]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char(' '))]);
        task.path = tmp.path().join("missing").join("1-a.md");

        press(&mut state, &mut task, &store, &[key(KeyCode::Char('s'))]);
        assert!(state.modified);
        assert!(state.message.as_ref().unwrap().text.starts_with("Error saving"));

        // Confirmed save that fails keeps the session open
        state.request_exit();
        assert_eq!(press(&mut state, &mut task, &store, &[key(KeyCode::Char('y'))]), DetailSignal::Stay);
        assert!(state.modified);
    }

    #[test]
    fn test_save_clears_modified() {
        let (_tmp, store, mut task, mut state) = setup(&[("one", false, 0)]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char(' '))]);
        press(&mut state, &mut task, &store, &[KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)]);
        assert!(!state.modified);
        assert_eq!(state.message.as_ref().unwrap().text, "Saved!");
    }

    #[test]
    fn test_add_items_above_and_below_inherit_indent() {
        let (_tmp, store, mut task, mut state) = setup(&[("top", false, 0), ("nested", false, 1)]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('j')), key(KeyCode::Char('o'))]);
        assert_eq!(state.mode, DetailMode::Input);
        type_text(&mut state, &mut task, &store, "after");
        press(&mut state, &mut task, &store, &[key(KeyCode::Enter)]);
        assert_eq!(texts(&task), vec!["top", "nested", "after"]);
        assert_eq!(task.checklist[2].indent, 1);
        assert_eq!(state.cursor, 2);

        press(&mut state, &mut task, &store, &[key(KeyCode::Char('g')), key(KeyCode::Char('g')), shift('O')]);
        type_text(&mut state, &mut task, &store, "first");
        press(&mut state, &mut task, &store, &[key(KeyCode::Enter)]);
        assert_eq!(texts(&task), vec!["first", "top", "nested", "after"]);
        assert_eq!(task.checklist[0].indent, 0);
        assert_eq!(state.cursor, 0);
        assert!(state.modified);
    }

    #[test]
    fn test_add_to_empty_checklist_and_cancel() {
        let (_tmp, store, mut task, mut state) = setup(&[]);
        press(&mut state, &mut task, &store, &[shift('O')]);
        type_text(&mut state, &mut task, &store, "only");
        press(&mut state, &mut task, &store, &[key(KeyCode::Enter)]);
        assert_eq!(texts(&task), vec!["only"]);
        assert_eq!(task.checklist[0].indent, 0);

        press(&mut state, &mut task, &store, &[key(KeyCode::Char('o'))]);
        type_text(&mut state, &mut task, &store, "nope");
        press(&mut state, &mut task, &store, &[key(KeyCode::Esc)]);
        assert_eq!(state.mode, DetailMode::Normal);
        assert_eq!(texts(&task), vec!["only"]);
    }

    #[test]
    fn test_delete_item_reclamps_cursor() {
        let (_tmp, store, mut task, mut state) = setup(&[("a", false, 0), ("b", false, 0)]);
        press(&mut state, &mut task, &store, &[shift('G'), key(KeyCode::Char('x'))]);
        assert_eq!(texts(&task), vec!["a"]);
        assert_eq!(state.cursor, 0);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('x'))]);
        assert!(task.checklist.is_empty());
        assert_eq!(state.cursor, 0);

        // Nothing left to delete
        state.modified = false;
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('x'))]);
        assert!(!state.modified);
    }

    #[test]
    fn test_reorder_and_indent() {
        let (_tmp, store, mut task, mut state) = setup(&[("a", false, 0), ("b", false, 0), ("c", false, 0)]);
        press(&mut state, &mut task, &store, &[shift('J')]);
        assert_eq!(texts(&task), vec!["b", "a", "c"]);
        assert_eq!(state.cursor, 1);

        press(&mut state, &mut task, &store, &[shift('G'), shift('K'), shift('K')]);
        assert_eq!(texts(&task), vec!["c", "b", "a"]);
        assert_eq!(state.cursor, 0);
        press(&mut state, &mut task, &store, &[shift('K')]);
        assert_eq!(state.cursor, 0);

        press(&mut state, &mut task, &store, &[key(KeyCode::Tab), key(KeyCode::Tab)]);
        assert_eq!(task.checklist[0].indent, 2);
        press(&mut state, &mut task, &store, &[KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)]);
        assert_eq!(task.checklist[0].indent, 1);
    }

    #[test]
    fn test_edit_description_commit_and_discard() {
        let (_tmp, store, mut task, mut state) = setup(&[]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('e'))]);
        assert_eq!(state.mode, DetailMode::EditDescription);
        assert!(state.is_editing_text());
        type_text(&mut state, &mut task, &store, "line one");
        press(&mut state, &mut task, &store, &[KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)]);
        type_text(&mut state, &mut task, &store, "line two");
        press(&mut state, &mut task, &store, &[key(KeyCode::Enter)]);
        assert_eq!(task.description, "line one\nline two");
        assert!(state.modified);

        state.modified = false;
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('e'))]);
        assert_eq!(state.description.value(), "line one\nline two");
        type_text(&mut state, &mut task, &store, " more");
        press(&mut state, &mut task, &store, &[key(KeyCode::Esc)]);
        assert_eq!(task.description, "line one\nline two");
        assert!(!state.modified);

        // Unchanged text is not a modification
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('e')), key(KeyCode::Enter)]);
        assert!(!state.modified);
    }

    #[test]
    fn test_edit_description_rejects_delimiter_line() {
        let (_tmp, store, mut task, mut state) = setup(&[]);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('e'))]);
        state.description.set("above\n---\nbelow");
        press(&mut state, &mut task, &store, &[key(KeyCode::Enter)]);
        assert_eq!(state.mode, DetailMode::EditDescription);
        assert!(state.message.as_ref().unwrap().text.contains("---"));
        assert_eq!(task.description, "");
    }

    #[test]
    fn test_checklist_scrolls_with_cursor() {
        let items: Vec<String> = (0..20).map(|i| format!("item {i}")).collect();
        let items: Vec<(&str, bool, usize)> = items.iter().map(|t| (t.as_str(), false, 0)).collect();
        let (_tmp, store, mut task, mut state) = setup(&items);
        state.resize(80, 10, &task);
        assert_eq!(state.visible_rows(), 4);

        press(&mut state, &mut task, &store, &[shift('G')]);
        assert_eq!(state.scroll_offset, 16);
        press(&mut state, &mut task, &store, &[key(KeyCode::Char('g')), key(KeyCode::Char('g'))]);
        assert_eq!(state.scroll_offset, 0);
    }
}
