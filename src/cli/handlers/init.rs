use std::path::Path;

use crate::io::config_io::{self, TASKS_DIR};

/// Create `<start>/.tasks` with a default config. Safe to run twice; an
/// existing config is never overwritten.
pub fn cmd_init(start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Check for an enclosing board and mention it
    if let Some(parent) = start.parent()
        && let Some(existing) = config_io::discover_tasks_dir(parent)
    {
        eprintln!("Note: a tasks directory already exists at {}", existing.display());
    }

    let tasks_dir = start.join(TASKS_DIR);
    if config_io::initialize(&tasks_dir)? {
        println!("Initialized {}", tasks_dir.display());
    } else {
        println!("Already initialized: {}", tasks_dir.display());
    }
    Ok(())
}
