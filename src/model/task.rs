use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Number of spaces per checklist nesting level
pub const INDENT_WIDTH: usize = 4;

/// A single checklist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub text: String,
    pub checked: bool,
    /// Nesting level (0 = top-level)
    pub indent: usize,
}

impl CheckItem {
    /// Create an unchecked item at the given nesting level
    pub fn new(text: impl Into<String>, indent: usize) -> Self {
        CheckItem {
            text: text.into(),
            checked: false,
            indent,
        }
    }

    pub fn checkbox(&self) -> &'static str {
        if self.checked { "[x]" } else { "[ ]" }
    }
}

/// A task backed by one file in the tasks directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// File stem; assigned once at creation and never regenerated
    pub id: String,
    pub title: String,
    /// Column name this task currently sits in
    pub status: String,
    /// Free text between the `---` delimiters (may be empty)
    pub description: String,
    pub checklist: Vec<CheckItem>,

    // --- Source tracking ---
    /// Where the task is persisted
    #[serde(skip)]
    pub path: PathBuf,
}

impl Task {
    /// Create a task with no description or checklist
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            status: status.into(),
            description: String::new(),
            checklist: Vec::new(),
            path: PathBuf::new(),
        }
    }

    /// Attach identity and location (used by the store after decoding)
    pub fn with_location(mut self, id: impl Into<String>, path: PathBuf) -> Self {
        self.id = id.into();
        self.path = path;
        self
    }

    /// `(checked, total)` checklist counts
    pub fn progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|i| i.checked).count();
        (done, self.checklist.len())
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.status == other.status
            && self.description == other.description
            && self.checklist == other.checklist
    }
}

impl Eq for Task {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts_checked_items() {
        let mut task = Task::new("1-a", "A", "TODO");
        task.checklist = vec![CheckItem::new("one", 0), CheckItem::new("two", 1)];
        task.checklist[1].checked = true;
        assert_eq!(task.progress(), (1, 2));
    }

    #[test]
    fn test_equality_ignores_location() {
        let a = Task::new("1-a", "A", "TODO").with_location("1-a", PathBuf::from("/x/1-a.md"));
        let b = Task::new("1-a", "A", "TODO");
        assert_eq!(a, b);
    }
}
