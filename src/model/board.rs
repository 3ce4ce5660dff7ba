use indexmap::IndexMap;

use super::task::Task;

/// Name of the lane after the configured columns that holds tasks whose
/// status matches none of them
pub const UNPLACED_LANE: &str = "UNKNOWN";

/// All loaded tasks plus their grouping by column.
///
/// Tasks live in a flat arena; columns hold indices into it. The grouping is
/// derived and rebuilt from scratch whenever the task set is replaced.
///
/// Lanes are the configured columns followed, when any task has an
/// unknown status, by one extra lane for those tasks.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub columns: Vec<String>,
    pub tasks: Vec<Task>,
    groups: IndexMap<String, Vec<usize>>,
    unplaced: Vec<usize>,
}

impl Board {
    pub fn new(columns: Vec<String>, tasks: Vec<Task>) -> Self {
        let mut board = Board {
            columns,
            tasks: Vec::new(),
            groups: IndexMap::new(),
            unplaced: Vec::new(),
        };
        board.replace_tasks(tasks);
        board
    }

    /// Swap in a freshly listed task set and regroup
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.groups.clear();
        self.unplaced.clear();
        for column in &self.columns {
            self.groups.insert(column.clone(), Vec::new());
        }
        for (idx, task) in self.tasks.iter().enumerate() {
            match self.groups.get_mut(&task.status) {
                Some(group) => group.push(idx),
                None => self.unplaced.push(idx),
            }
        }
    }

    /// Configured columns, plus the unplaced lane when it has tasks
    pub fn lane_count(&self) -> usize {
        self.columns.len() + usize::from(!self.unplaced.is_empty())
    }

    pub fn is_unplaced_lane(&self, col: usize) -> bool {
        col == self.columns.len() && !self.unplaced.is_empty()
    }

    /// Column name, or `UNPLACED_LANE` for the trailing lane
    pub fn lane_name(&self, col: usize) -> Option<&str> {
        match self.columns.get(col) {
            Some(name) => Some(name.as_str()),
            None => self.is_unplaced_lane(col).then_some(UNPLACED_LANE),
        }
    }

    /// Arena indices of the tasks in lane `col`, in listing order
    pub fn column_indices(&self, col: usize) -> &[usize] {
        match self.columns.get(col) {
            Some(name) => self.groups.get(name).map(|v| v.as_slice()).unwrap_or(&[]),
            None if col == self.columns.len() => &self.unplaced,
            None => &[],
        }
    }

    pub fn column_len(&self, col: usize) -> usize {
        self.column_indices(col).len()
    }

    /// Arena index of the task at `(col, row)`
    pub fn index_at(&self, col: usize, row: usize) -> Option<usize> {
        self.column_indices(col).get(row).copied()
    }

    pub fn task_at(&self, col: usize, row: usize) -> Option<&Task> {
        self.index_at(col, row).map(|idx| &self.tasks[idx])
    }

    /// `(lane, row)` of the task with the given id
    pub fn position_of(&self, id: &str) -> Option<(usize, usize)> {
        (0..self.lane_count()).find_map(|col| {
            self.column_indices(col)
                .iter()
                .position(|&idx| self.tasks[idx].id == id)
                .map(|row| (col, row))
        })
    }

    /// Tasks whose status matches no configured column
    pub fn unknown_status_tasks(&self) -> Vec<&Task> {
        self.unplaced.iter().map(|&idx| &self.tasks[idx]).collect()
    }
}
