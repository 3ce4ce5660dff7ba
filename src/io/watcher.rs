use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use log::debug;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::store::TASK_EXT;

/// Watches the tasks directory for task files appearing, changing or
/// disappearing. The TUI polls it once per tick.
pub struct TasksWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

impl TasksWatcher {
    pub fn start(tasks_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) if touches_task_file(&event) => {
                    let _ = tx.send(());
                }
                Ok(_) => {}
                Err(e) => debug!("watch error: {}", e),
            },
            Config::default(),
        )?;
        watcher.watch(tasks_dir, RecursiveMode::NonRecursive)?;
        debug!("watching {}", tasks_dir.display());

        Ok(TasksWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain queued notifications without blocking. True if any task file
    /// changed since the last call.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(()) => changed = true,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return changed,
            }
        }
    }
}

fn touches_task_file(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| is_task_file(p))
}

/// Only `*.md` files count; temp files from atomic writes do not
fn is_task_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TASK_EXT)
}
