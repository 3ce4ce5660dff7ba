use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The action a confirmation prompt is guarding, run on an affirmative answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete the task with this id from the store, then reload
    DeleteTask { id: String },
    /// Leave the detail view with unsaved changes (yes = save, no = discard)
    LeaveDetail,
}

/// A pending confirmation: the prompt shown and what it guards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmState {
    pub prompt: String,
    pub action: ConfirmAction,
}

impl ConfirmState {
    pub fn new(prompt: impl Into<String>, action: ConfirmAction) -> Self {
        ConfirmState {
            prompt: prompt.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAnswer {
    Yes,
    No,
    Cancel,
}

/// Map a key to an answer. `n` and `Esc` both mean no when the prompt has no
/// separate cancel choice.
pub fn answer_for(key: KeyEvent, with_cancel: bool) -> Option<ConfirmAnswer> {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('y' | 'Y')) => {
            Some(ConfirmAnswer::Yes)
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('n' | 'N')) => {
            Some(ConfirmAnswer::No)
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('c' | 'C')) if with_cancel => {
            Some(ConfirmAnswer::Cancel)
        }
        (_, KeyCode::Esc) if with_cancel => Some(ConfirmAnswer::Cancel),
        (_, KeyCode::Esc) => Some(ConfirmAnswer::No),
        _ => None,
    }
}
