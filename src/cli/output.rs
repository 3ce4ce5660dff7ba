use serde::Serialize;

use crate::model::board::Board;
use crate::model::task::Task;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub columns: Vec<ColumnJson<'a>>,
    /// Tasks whose status matches no column
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<&'a Task>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    pub name: &'a str,
    pub tasks: Vec<&'a Task>,
}

pub fn board_to_json<'a>(board: &'a Board, warnings: Vec<String>) -> BoardJson<'a> {
    let columns = board
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| ColumnJson {
            name,
            tasks: board
                .column_indices(col)
                .iter()
                .map(|&idx| &board.tasks[idx])
                .collect(),
        })
        .collect();
    BoardJson {
        columns,
        unplaced: board.unknown_status_tasks(),
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// One header line per lane, then one indented line per task. Tasks with an
/// unknown status are listed last along with that status.
pub fn format_board_listing(board: &Board) -> Vec<String> {
    let mut lines = Vec::new();
    for col in 0..board.lane_count() {
        let indices = board.column_indices(col);
        let name = board.lane_name(col).unwrap_or_default();
        lines.push(format!("{} ({})", name, indices.len()));
        for &idx in indices {
            let task = &board.tasks[idx];
            if board.is_unplaced_lane(col) {
                lines.push(format!(
                    "  {}  (status \"{}\")",
                    format_task_line(task),
                    task.status
                ));
            } else {
                lines.push(format!("  {}", format_task_line(task)));
            }
        }
    }
    lines
}

/// `<id>  <title>  [done/total]`, the progress only when there is a checklist
pub fn format_task_line(task: &Task) -> String {
    let (done, total) = task.progress();
    if total == 0 {
        format!("{}  {}", task.id, task.title)
    } else {
        format!("{}  {}  [{}/{}]", task.id, task.title, done, total)
    }
}
